use crate::{LocalStorage, Storage, StorageResult};
use quickdrop_core::Config;
use std::sync::Arc;

/// Create the storage backend described by the configuration
pub async fn create_storage(config: &Config) -> StorageResult<Arc<dyn Storage>> {
    let storage = LocalStorage::new(
        config.upload.storage_root.clone(),
        config.upload.public_path.clone(),
    )
    .await?;

    Ok(Arc::new(storage))
}
