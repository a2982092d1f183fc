//! Application setup and initialization
//!
//! This module contains all application initialization logic extracted from main.rs
//! for better organization and testability.

pub mod routes;
pub mod server;
pub mod services;
pub mod storage;
pub mod validation;

use crate::state::AppState;
use anyhow::{Context, Result};
use quickdrop_core::Config;
use quickdrop_services::SweeperHandle;
use std::sync::Arc;

/// Everything `main` needs to serve and later shut down
pub struct App {
    pub state: Arc<AppState>,
    pub router: axum::Router,
    /// Running retention sweeper, when retention is enabled
    pub sweeper: Option<SweeperHandle>,
}

/// Initialize the entire application
pub async fn initialize_app(config: Config) -> Result<App> {
    // Initialize telemetry first so validation warnings are visible
    crate::telemetry::init_telemetry(crate::telemetry::LogFormat::from_env())
        .map_err(|e| anyhow::anyhow!("Failed to initialize telemetry: {}", e))?;

    // Validate configuration - fail fast on misconfiguration
    validation::validate_config(&config).context("Configuration validation failed")?;

    tracing::info!("Configuration loaded and validated successfully");

    // Setup storage
    let storage = storage::setup_storage(&config).await?;

    // Start background services
    let sweeper = services::start_retention_sweeper(&config, storage.clone());

    let state = Arc::new(AppState::new(config.clone(), storage));

    // Setup routes
    let router = routes::setup_routes(&config, state.clone())?;

    Ok(App {
        state,
        router,
        sweeper,
    })
}
