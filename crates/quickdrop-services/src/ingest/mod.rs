//! Upload ingest: validate, name and persist one uploaded file.

mod service;
mod types;

pub use service::{IngestService, MAX_NAME_ATTEMPTS};
pub use types::{IngestError, UploadCandidate, UploadLimitExceeded};
