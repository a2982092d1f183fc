//! Storage abstraction trait
//!
//! This module defines the Storage trait that the ingest service, the file server
//! and the retention sweeper work against.

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use futures::stream::BoxStream;
use std::path::Path;
use thiserror::Error;

/// Stream of file content chunks
pub type ByteStream<'a> = BoxStream<'a, std::io::Result<Bytes>>;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Write failed: {0}")]
    WriteFailed(String),

    #[error("Read failed: {0}")]
    ReadFailed(String),

    #[error("List failed: {0}")]
    ListFailed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("File already exists: {0}")]
    AlreadyExists(String),

    #[error("Content exceeds limit of {limit} bytes")]
    LimitExceeded { limit: u64 },

    #[error("Failed to read upload content: {0}")]
    ContentStream(#[source] std::io::Error),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Storage abstraction trait
///
/// The store is a single flat namespace: every key is a bare stored name, never a
/// path. Implementations must never make a partially written file visible under
/// its final name.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Stream `content` into a new file called `name` and return the byte count.
    ///
    /// Fails with `AlreadyExists` if `name` is taken and with `LimitExceeded` as soon
    /// as more than `max_bytes` have been received; in both cases nothing is left
    /// behind. `AlreadyExists` is only returned before any content has been read,
    /// so the caller may retry the same stream under another name. An existing
    /// file is never replaced.
    async fn upload_stream(
        &self,
        name: &str,
        content: ByteStream<'_>,
        max_bytes: u64,
    ) -> StorageResult<u64>;

    /// Open a stored file for streaming; returns its length and content.
    async fn download_stream(&self, name: &str) -> StorageResult<(u64, ByteStream<'static>)>;

    /// Names of all files directly under the root (non-recursive).
    async fn list(&self) -> StorageResult<Vec<String>>;

    /// Creation time of a stored file
    async fn created_at(&self, name: &str) -> StorageResult<DateTime<Utc>>;

    /// Delete a stored file. Deleting a missing file is not an error.
    async fn delete(&self, name: &str) -> StorageResult<()>;

    /// Check if a file exists
    async fn exists(&self, name: &str) -> StorageResult<bool>;

    /// Public URL path for a stored name
    fn url_for(&self, name: &str) -> String;

    /// Storage root directory
    fn root(&self) -> &Path;

    /// Verify the backend is usable
    async fn health_check(&self) -> StorageResult<()>;
}
