use std::sync::Arc;

use quickdrop_core::{validation, Clock, StoredFile, SystemClock, UploadConfig};
use quickdrop_storage::{keys, ByteStream, Storage, StorageError};

use super::types::{IngestError, UploadCandidate};

/// Fresh names tried before giving up on a colliding upload
pub const MAX_NAME_ATTEMPTS: usize = 5;

/// Upload pipeline: validate -> name -> stream to storage.
///
/// Nothing reaches the storage root unless the type is allowed and the content
/// stayed within the size limit.
pub struct IngestService {
    storage: Arc<dyn Storage>,
    config: UploadConfig,
    clock: Arc<dyn Clock>,
}

impl IngestService {
    pub fn new(storage: Arc<dyn Storage>, config: UploadConfig) -> Self {
        Self {
            storage,
            config,
            clock: Arc::new(SystemClock),
        }
    }

    /// Replace the time source used for names and `created_at`
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn config(&self) -> &UploadConfig {
        &self.config
    }

    pub fn storage(&self) -> &Arc<dyn Storage> {
        &self.storage
    }

    /// Accept or reject one upload.
    #[tracing::instrument(
        skip(self, candidate),
        fields(mime_type = tracing::field::Empty, stored_name = tracing::field::Empty)
    )]
    pub async fn ingest(
        &self,
        candidate: Option<UploadCandidate<'_>>,
    ) -> Result<StoredFile, IngestError> {
        let Some(UploadCandidate {
            declared_mime_type,
            original_filename,
            size_hint,
            content,
        }) = candidate
        else {
            tracing::debug!("Upload rejected: no file part");
            return Err(IngestError::NoFileProvided);
        };

        let mime_type = validation::normalize_mime_type(&declared_mime_type);
        tracing::Span::current().record("mime_type", mime_type.as_str());

        if !validation::is_content_type_allowed(&mime_type, &self.config.allowed_content_types) {
            tracing::debug!(original_filename = %original_filename, "Upload rejected: type not allowed");
            return Err(IngestError::UnsupportedType {
                mime_type,
                allowed: self.config.allowed_content_types.clone(),
            });
        }

        let limit = self.config.max_file_size_bytes;
        if let Some(declared) = size_hint {
            if declared > limit {
                tracing::debug!(declared, limit, "Upload rejected: declared size over limit");
                return Err(IngestError::PayloadTooLarge { limit });
            }
        }

        let (stored_name, size_bytes) = self
            .store_under_fresh_name(&mime_type, &original_filename, content, limit)
            .await
            .map_err(|e| {
                match &e {
                    IngestError::StorageWriteFailed(source) => {
                        tracing::error!(error = %source, "Failed to persist upload")
                    }
                    other => tracing::debug!(error = %other, "Upload rejected while streaming"),
                }
                e
            })?;

        let stored = StoredFile {
            relative_path: stored_name.clone(),
            stored_name,
            original_name: original_filename,
            mime_type,
            size_bytes,
            created_at: self.clock.now(),
        };

        tracing::info!(size_bytes, "Upload accepted");

        Ok(stored)
    }

    /// Stream `content` under a stored name nothing in the root uses yet.
    ///
    /// A name taken before any content was read (seen by the existence check, or
    /// claimed by a concurrent writer) is retried with a fresh random suffix.
    async fn store_under_fresh_name(
        &self,
        mime_type: &str,
        original_filename: &str,
        mut content: ByteStream<'_>,
        limit: u64,
    ) -> Result<(String, u64), IngestError> {
        for attempt in 1..=MAX_NAME_ATTEMPTS {
            let name = keys::generate_stored_name(
                mime_type,
                original_filename,
                self.clock.now().timestamp_millis(),
                keys::random_suffix(),
            );

            if self
                .storage
                .exists(&name)
                .await
                .map_err(IngestError::StorageWriteFailed)?
            {
                tracing::warn!(attempt, stored_name = %name, "Stored name collision, retrying");
                continue;
            }

            let attempt_content: ByteStream<'_> = Box::pin(&mut content);
            match self.storage.upload_stream(&name, attempt_content, limit).await {
                Ok(size_bytes) => {
                    tracing::Span::current().record("stored_name", name.as_str());
                    return Ok((name, size_bytes));
                }
                // Returned before any content is consumed
                Err(StorageError::AlreadyExists(_)) => {
                    tracing::warn!(attempt, stored_name = %name, "Stored name claimed concurrently, retrying")
                }
                Err(e) => return Err(IngestError::from_storage(e, limit)),
            }
        }

        Err(IngestError::StorageWriteFailed(StorageError::AlreadyExists(
            format!("no free stored name after {} attempts", MAX_NAME_ATTEMPTS),
        )))
    }
}
