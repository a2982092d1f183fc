use quickdrop_core::{validation, AppError};
use quickdrop_storage::{ByteStream, StorageError};
use thiserror::Error;

/// One file as handed over by the HTTP layer. Consumed by a single ingest call.
pub struct UploadCandidate<'a> {
    /// MIME type declared by the client, parameters included
    pub declared_mime_type: String,
    /// Client supplied filename; only a sanitized extension is ever derived from it
    pub original_filename: String,
    /// Declared size, when the transport knows it up front
    pub size_hint: Option<u64>,
    pub content: ByteStream<'a>,
}

impl std::fmt::Debug for UploadCandidate<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UploadCandidate")
            .field("declared_mime_type", &self.declared_mime_type)
            .field("original_filename", &self.original_filename)
            .field("size_hint", &self.size_hint)
            .finish_non_exhaustive()
    }
}

/// Marker carried inside the content stream's `io::Error` when the transport
/// itself gave up because the request body grew past its limit.
#[derive(Debug, Error)]
#[error("request body exceeds the configured limit")]
pub struct UploadLimitExceeded;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("No file uploaded")]
    NoFileProvided,

    #[error("Unsupported file type '{mime_type}'")]
    UnsupportedType {
        mime_type: String,
        allowed: Vec<String>,
    },

    #[error("File exceeds the maximum size of {limit} bytes")]
    PayloadTooLarge { limit: u64 },

    #[error("Failed to read upload content: {0}")]
    ContentRead(#[source] std::io::Error),

    #[error("Failed to store file: {0}")]
    StorageWriteFailed(#[source] StorageError),
}

impl IngestError {
    /// Classify a storage failure raised while persisting an upload.
    pub(crate) fn from_storage(err: StorageError, limit: u64) -> Self {
        match err {
            StorageError::LimitExceeded { limit } => IngestError::PayloadTooLarge { limit },
            StorageError::ContentStream(io_err) => {
                let transport_limit = io_err
                    .get_ref()
                    .is_some_and(|inner| inner.is::<UploadLimitExceeded>());
                if transport_limit {
                    IngestError::PayloadTooLarge { limit }
                } else {
                    IngestError::ContentRead(io_err)
                }
            }
            other => IngestError::StorageWriteFailed(other),
        }
    }
}

impl From<IngestError> for AppError {
    fn from(err: IngestError) -> Self {
        match err {
            IngestError::NoFileProvided => AppError::NoFileProvided,
            IngestError::UnsupportedType { allowed, .. } => validation::unsupported_type(&allowed),
            IngestError::PayloadTooLarge { limit } => validation::payload_too_large(limit),
            IngestError::ContentRead(e) => {
                AppError::InvalidInput(format!("Failed to read file data: {}", e))
            }
            IngestError::StorageWriteFailed(e) => AppError::StorageWriteFailed(e.to_string()),
        }
    }
}
