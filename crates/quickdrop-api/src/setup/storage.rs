//! Storage setup and initialization

use anyhow::{Context, Result};
use quickdrop_core::Config;
use quickdrop_storage::{create_storage, Storage};
use std::sync::Arc;

/// Create the storage root and verify it is usable
pub async fn setup_storage(config: &Config) -> Result<Arc<dyn Storage>> {
    tracing::info!(
        root = %config.storage_root().display(),
        "Initializing storage..."
    );

    let storage = create_storage(config)
        .await
        .context("Failed to initialize storage")?;
    storage
        .health_check()
        .await
        .context("Storage root is not usable")?;

    tracing::info!(
        root = %storage.root().display(),
        public_path = %config.upload.public_path,
        "Storage initialized successfully"
    );

    Ok(storage)
}
