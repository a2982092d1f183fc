use quickdrop_core::Config;
use quickdrop_services::IngestService;
use quickdrop_storage::Storage;
use std::sync::Arc;

/// Shared application state handed to every handler
pub struct AppState {
    pub config: Config,
    pub storage: Arc<dyn Storage>,
    pub ingest: Arc<IngestService>,
}

impl AppState {
    pub fn new(config: Config, storage: Arc<dyn Storage>) -> Self {
        let ingest = Arc::new(IngestService::new(storage.clone(), config.upload.clone()));
        Self {
            config,
            storage,
            ingest,
        }
    }
}
