//! Background services

use quickdrop_core::Config;
use quickdrop_services::{RetentionSweeper, SweeperHandle};
use quickdrop_storage::Storage;
use std::sync::Arc;

/// Start the retention sweeper unless retention is disabled
pub fn start_retention_sweeper(
    config: &Config,
    storage: Arc<dyn Storage>,
) -> Option<SweeperHandle> {
    if !config.retention.enabled {
        tracing::info!("Retention disabled, uploaded files are kept indefinitely");
        return None;
    }

    tracing::info!("Starting retention sweeper...");
    let sweeper = Arc::new(RetentionSweeper::new(storage, config.retention));
    Some(sweeper.start())
}
