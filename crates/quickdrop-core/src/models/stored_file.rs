use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Durable record of one accepted upload.
///
/// Created once at ingest time and never updated in place; its only mutation is
/// deletion of the underlying file by the retention sweeper.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredFile {
    /// Synthesized name, unique within the storage root
    pub stored_name: String,
    /// Client supplied filename, kept for display only
    pub original_name: String,
    pub mime_type: String,
    pub size_bytes: u64,
    /// Path of the file relative to the storage root
    pub relative_path: String,
    pub created_at: DateTime<Utc>,
}

impl StoredFile {
    /// Media family of the file ("image", "video", ...)
    pub fn type_tag(&self) -> &str {
        crate::validation::type_tag(&self.mime_type)
    }
}
