//! Test helpers: build AppState and router for integration tests.
//!
//! Run from workspace root: `cargo test -p quickdrop-api`.

#![allow(dead_code)]

use axum_test::multipart::{MultipartForm, Part};
use axum_test::TestServer;
use bytes::Bytes;
use quickdrop_api::setup::routes;
use quickdrop_api::state::AppState;
use quickdrop_core::{BaseConfig, Config, RetentionPolicy, UploadConfig};
use quickdrop_storage::{create_storage, Storage};
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;

/// Test application: server plus the storage root it writes to.
pub struct TestApp {
    pub server: TestServer,
    pub storage: Arc<dyn Storage>,
    pub root: PathBuf,
    pub _temp_dir: TempDir,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }

    /// Names currently in the storage root, sorted
    pub fn stored_files(&self) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(&self.root)
            .expect("storage root should exist")
            .map(|entry| entry.unwrap().file_name().into_string().unwrap())
            .collect();
        names.sort();
        names
    }
}

pub fn test_config(root: PathBuf) -> Config {
    Config {
        base: BaseConfig {
            server_port: 0,
            cors_origins: vec!["*".to_string()],
            environment: "test".to_string(),
        },
        upload: UploadConfig {
            storage_root: root,
            ..UploadConfig::default()
        },
        retention: RetentionPolicy {
            enabled: false,
            ..RetentionPolicy::default()
        },
    }
}

/// Setup test app with default limits and an isolated storage root.
pub async fn setup_test_app() -> TestApp {
    setup_test_app_with(|_| {}).await
}

/// Setup test app, letting the caller adjust the configuration first.
pub async fn setup_test_app_with(configure: impl FnOnce(&mut Config)) -> TestApp {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let root = temp_dir.path().join("uploads");

    let mut config = test_config(root.clone());
    configure(&mut config);

    let storage = create_storage(&config)
        .await
        .expect("Failed to create storage");
    let state = Arc::new(AppState::new(config.clone(), storage.clone()));
    let app = routes::setup_routes(&config, state).expect("Failed to setup routes");
    let server = TestServer::new(app).expect("Failed to create test server");

    TestApp {
        server,
        storage,
        root,
        _temp_dir: temp_dir,
    }
}

/// Multipart form with a single `file` part
pub fn file_form(data: Vec<u8>, file_name: &str, mime_type: &str) -> MultipartForm {
    let part = Part::bytes(Bytes::from(data))
        .file_name(file_name.to_string())
        .mime_type(mime_type.to_string());
    MultipartForm::new().add_part("file", part)
}

/// Whether `name` looks like `{tag}_{digits}_{digits}{ext}`
pub fn is_stored_name(name: &str, tag: &str, ext: &str) -> bool {
    let Some(rest) = name
        .strip_prefix(&format!("{}_", tag))
        .and_then(|rest| rest.strip_suffix(ext))
    else {
        return false;
    };
    let parts: Vec<&str> = rest.split('_').collect();
    parts.len() == 2
        && parts
            .iter()
            .all(|p| !p.is_empty() && p.chars().all(|c| c.is_ascii_digit()))
}
