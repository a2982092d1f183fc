use crate::keys;
use crate::traits::{ByteStream, Storage, StorageError, StorageResult};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::StreamExt;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// Local filesystem storage implementation
///
/// All files live directly in `base_path`. Uploads are written to a hidden
/// temporary file next to their destination and linked into place once complete;
/// an existing file is never replaced.
#[derive(Clone, Debug)]
pub struct LocalStorage {
    base_path: PathBuf,
    base_url: String,
}

impl LocalStorage {
    /// Create a new LocalStorage instance
    ///
    /// # Arguments
    /// * `base_path` - Root directory for file storage (e.g., "uploads")
    /// * `base_url` - Base URL path for serving files (e.g., "/uploads")
    pub async fn new(base_path: impl Into<PathBuf>, base_url: String) -> StorageResult<Self> {
        let base_path = base_path.into();

        fs::create_dir_all(&base_path).await.map_err(|e| {
            StorageError::ConfigError(format!(
                "Failed to create storage directory {}: {}",
                base_path.display(),
                e
            ))
        })?;

        Ok(LocalStorage {
            base_path,
            base_url,
        })
    }

    /// Convert a stored name to a filesystem path.
    ///
    /// The store is flat, so any separator or parent reference is refused outright.
    fn key_to_path(&self, name: &str) -> StorageResult<PathBuf> {
        if name.is_empty()
            || name == "."
            || name.contains("..")
            || name.contains('/')
            || name.contains('\\')
            || name.contains('\0')
        {
            return Err(StorageError::InvalidKey(
                "Storage key contains invalid characters".to_string(),
            ));
        }

        Ok(self.base_path.join(name))
    }

    fn temp_path(&self, name: &str) -> PathBuf {
        self.base_path.join(keys::partial_upload_name(name))
    }

    /// Storage root is recreated if it was removed underneath us
    async fn ensure_root(&self) -> StorageResult<()> {
        fs::create_dir_all(&self.base_path).await.map_err(|e| {
            StorageError::WriteFailed(format!(
                "Failed to create storage directory {}: {}",
                self.base_path.display(),
                e
            ))
        })
    }
}

/// Copy `content` into `file`, failing once more than `max_bytes` were received.
async fn write_limited(
    file: &mut fs::File,
    mut content: ByteStream<'_>,
    max_bytes: u64,
) -> StorageResult<u64> {
    let mut written: u64 = 0;

    while let Some(chunk) = content.next().await {
        let chunk = chunk.map_err(StorageError::ContentStream)?;

        written += chunk.len() as u64;
        if written > max_bytes {
            return Err(StorageError::LimitExceeded { limit: max_bytes });
        }

        file.write_all(&chunk)
            .await
            .map_err(|e| StorageError::WriteFailed(format!("Failed to write chunk: {}", e)))?;
    }

    file.flush()
        .await
        .map_err(|e| StorageError::WriteFailed(format!("Failed to flush file: {}", e)))?;
    file.sync_all()
        .await
        .map_err(|e| StorageError::WriteFailed(format!("Failed to sync file: {}", e)))?;

    Ok(written)
}

#[async_trait]
impl Storage for LocalStorage {
    async fn upload_stream(
        &self,
        name: &str,
        content: ByteStream<'_>,
        max_bytes: u64,
    ) -> StorageResult<u64> {
        let path = self.key_to_path(name)?;
        let start = std::time::Instant::now();

        self.ensure_root().await?;

        if fs::try_exists(&path).await? {
            return Err(StorageError::AlreadyExists(name.to_string()));
        }

        let temp = self.temp_path(name);
        let mut file = fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&temp)
            .await
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::AlreadyExists => StorageError::AlreadyExists(name.to_string()),
                _ => StorageError::WriteFailed(format!(
                    "Failed to create file {}: {}",
                    temp.display(),
                    e
                )),
            })?;

        let written = match write_limited(&mut file, content, max_bytes).await {
            Ok(written) => written,
            Err(e) => {
                drop(file);
                if let Err(cleanup_err) = fs::remove_file(&temp).await {
                    tracing::warn!(
                        error = %cleanup_err,
                        path = %temp.display(),
                        "Failed to remove partial upload"
                    );
                }
                return Err(e);
            }
        };
        drop(file);

        // Linking fails instead of replacing a file that appeared meanwhile
        let linked = fs::hard_link(&temp, &path).await;
        if let Err(e) = fs::remove_file(&temp).await {
            tracing::warn!(error = %e, path = %temp.display(), "Failed to remove upload temp file");
        }
        if let Err(e) = linked {
            return Err(StorageError::WriteFailed(format!(
                "Failed to move upload into place {}: {}",
                path.display(),
                e
            )));
        }

        tracing::info!(
            path = %path.display(),
            key = %name,
            size_bytes = written,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local storage stream upload successful"
        );

        Ok(written)
    }

    async fn download_stream(&self, name: &str) -> StorageResult<(u64, ByteStream<'static>)> {
        let path = self.key_to_path(name)?;

        let file = match fs::File::open(&path).await {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StorageError::NotFound(name.to_string()));
            }
            Err(e) => {
                return Err(StorageError::ReadFailed(format!(
                    "Failed to open file {}: {}",
                    path.display(),
                    e
                )));
            }
        };

        let meta = file
            .metadata()
            .await
            .map_err(|e| StorageError::ReadFailed(e.to_string()))?;
        if !meta.is_file() {
            return Err(StorageError::NotFound(name.to_string()));
        }

        let key = name.to_string();
        let stream = tokio_util::io::ReaderStream::new(file).map(move |item| {
            if let Err(ref e) = item {
                tracing::error!(error = %e, key = %key, "Local storage stream download error");
            }
            item
        });

        Ok((meta.len(), Box::pin(stream)))
    }

    async fn list(&self) -> StorageResult<Vec<String>> {
        let mut dir = fs::read_dir(&self.base_path).await.map_err(|e| {
            StorageError::ListFailed(format!(
                "Failed to read directory {}: {}",
                self.base_path.display(),
                e
            ))
        })?;

        let mut names = Vec::new();
        while let Some(entry) = dir
            .next_entry()
            .await
            .map_err(|e| StorageError::ListFailed(e.to_string()))?
        {
            // An entry whose type cannot be read is still reported; the caller's
            // per-entry handling deals with it.
            if let Ok(file_type) = entry.file_type().await {
                if file_type.is_dir() {
                    continue;
                }
            }

            match entry.file_name().into_string() {
                Ok(name) => names.push(name),
                Err(raw) => {
                    tracing::warn!(name = ?raw, "Skipping non UTF-8 entry in storage root");
                }
            }
        }

        Ok(names)
    }

    async fn created_at(&self, name: &str) -> StorageResult<DateTime<Utc>> {
        let path = self.key_to_path(name)?;
        let meta = fs::metadata(&path).await.map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => StorageError::NotFound(name.to_string()),
            _ => StorageError::ReadFailed(format!(
                "Failed to stat {}: {}",
                path.display(),
                e
            )),
        })?;

        // Not every filesystem records birth time
        let time = meta
            .created()
            .or_else(|_| meta.modified())
            .map_err(|e| StorageError::ReadFailed(e.to_string()))?;

        Ok(DateTime::<Utc>::from(time))
    }

    async fn delete(&self, name: &str) -> StorageResult<()> {
        let path = self.key_to_path(name)?;
        let start = std::time::Instant::now();

        match fs::remove_file(&path).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
            Err(e) => {
                return Err(StorageError::DeleteFailed(format!(
                    "Failed to delete file {}: {}",
                    path.display(),
                    e
                )));
            }
        }

        tracing::info!(
            path = %path.display(),
            key = %name,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local storage delete successful"
        );

        Ok(())
    }

    async fn exists(&self, name: &str) -> StorageResult<bool> {
        let path = self.key_to_path(name)?;
        Ok(fs::try_exists(&path).await?)
    }

    fn url_for(&self, name: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), name)
    }

    fn root(&self) -> &Path {
        &self.base_path
    }

    async fn health_check(&self) -> StorageResult<()> {
        let meta = fs::metadata(&self.base_path).await?;
        if !meta.is_dir() {
            return Err(StorageError::ConfigError(format!(
                "{} is not a directory",
                self.base_path.display()
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use futures::stream;
    use tempfile::tempdir;

    fn chunks(parts: Vec<&'static [u8]>) -> ByteStream<'static> {
        Box::pin(stream::iter(
            parts.into_iter().map(|p| Ok(Bytes::from_static(p))),
        ))
    }

    async fn collect(mut stream: ByteStream<'static>) -> Vec<u8> {
        let mut out = Vec::new();
        while let Some(chunk) = stream.next().await {
            out.extend_from_slice(&chunk.unwrap());
        }
        out
    }

    async fn storage() -> (tempfile::TempDir, LocalStorage) {
        let dir = tempdir().unwrap();
        let storage = LocalStorage::new(dir.path().join("uploads"), "/uploads".to_string())
            .await
            .unwrap();
        (dir, storage)
    }

    #[tokio::test]
    async fn test_local_storage_upload_download() {
        let (_dir, storage) = storage().await;

        let written = storage
            .upload_stream("image_1_2.png", chunks(vec![b"test ", b"data"]), 1024)
            .await
            .unwrap();
        assert_eq!(written, 9);

        let (len, stream) = storage.download_stream("image_1_2.png").await.unwrap();
        assert_eq!(len, 9);
        assert_eq!(collect(stream).await, b"test data".to_vec());
        assert_eq!(storage.url_for("image_1_2.png"), "/uploads/image_1_2.png");
    }

    #[tokio::test]
    async fn test_limit_exceeded_leaves_nothing_behind() {
        let (_dir, storage) = storage().await;

        let result = storage
            .upload_stream("image_1_2.png", chunks(vec![b"12345", b"67890"]), 8)
            .await;
        assert!(matches!(result, Err(StorageError::LimitExceeded { limit: 8 })));
        assert!(storage.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_upload_refuses_to_overwrite() {
        let (_dir, storage) = storage().await;

        storage
            .upload_stream("video_1_2.mp4", chunks(vec![b"first"]), 1024)
            .await
            .unwrap();
        let result = storage
            .upload_stream("video_1_2.mp4", chunks(vec![b"second"]), 1024)
            .await;
        assert!(matches!(result, Err(StorageError::AlreadyExists(_))));

        let (_, stream) = storage.download_stream("video_1_2.mp4").await.unwrap();
        assert_eq!(collect(stream).await, b"first".to_vec());
    }

    #[tokio::test]
    async fn test_claimed_temp_name_is_already_exists_before_reading() {
        let (_dir, storage) = storage().await;
        fs::write(storage.root().join(".image_5_5.png.part"), b"other writer")
            .await
            .unwrap();

        // A read of this stream would surface as ContentStream
        let unread: ByteStream<'static> = Box::pin(stream::iter(vec![Err(
            std::io::Error::new(std::io::ErrorKind::Other, "content was read"),
        )]));
        let result = storage.upload_stream("image_5_5.png", unread, 1024).await;

        assert!(matches!(result, Err(StorageError::AlreadyExists(_))));
        assert!(!storage.exists("image_5_5.png").await.unwrap());
    }

    #[tokio::test]
    async fn test_exists_reports_io_errors() {
        let (_dir, storage) = storage().await;
        fs::remove_dir_all(storage.root()).await.unwrap();
        fs::write(storage.root(), b"not a directory").await.unwrap();

        let result = storage.exists("image_1_1.png").await;
        assert!(matches!(result, Err(StorageError::IoError(_))));
    }

    #[tokio::test]
    async fn test_failed_stream_leaves_nothing_behind() {
        let (_dir, storage) = storage().await;

        let failing: ByteStream<'static> = Box::pin(stream::iter(vec![
            Ok(Bytes::from_static(b"partial")),
            Err(std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset")),
        ]));
        let result = storage.upload_stream("image_1_2.gif", failing, 1024).await;
        assert!(matches!(result, Err(StorageError::ContentStream(_))));
        assert!(storage.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_path_traversal_rejected() {
        let (_dir, storage) = storage().await;

        let result = storage.download_stream("../../../etc/passwd").await;
        assert!(matches!(result, Err(StorageError::InvalidKey(_))));

        let result = storage.delete("../etc/passwd").await;
        assert!(matches!(result, Err(StorageError::InvalidKey(_))));

        let result = storage.exists("/etc/passwd").await;
        assert!(matches!(result, Err(StorageError::InvalidKey(_))));

        let result = storage
            .upload_stream("sub/evil.png", chunks(vec![b"x"]), 10)
            .await;
        assert!(matches!(result, Err(StorageError::InvalidKey(_))));
    }

    #[tokio::test]
    async fn test_local_storage_delete_nonexistent() {
        let (_dir, storage) = storage().await;
        assert!(storage.delete("image_9_9.png").await.is_ok());
    }

    #[tokio::test]
    async fn test_list_is_flat_and_reports_creation_time() {
        let (_dir, storage) = storage().await;
        let before = Utc::now() - chrono::Duration::seconds(5);

        storage
            .upload_stream("image_1_1.png", chunks(vec![b"a"]), 10)
            .await
            .unwrap();
        fs::create_dir(storage.root().join("nested")).await.unwrap();

        let names = storage.list().await.unwrap();
        assert_eq!(names, vec!["image_1_1.png".to_string()]);

        let created = storage.created_at("image_1_1.png").await.unwrap();
        assert!(created >= before);

        let missing = storage.created_at("image_2_2.png").await;
        assert!(matches!(missing, Err(StorageError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_root_recreated_on_upload() {
        let (_dir, storage) = storage().await;
        fs::remove_dir_all(storage.root()).await.unwrap();
        assert!(storage.health_check().await.is_err());

        storage
            .upload_stream("image_3_3.webp", chunks(vec![b"webp"]), 10)
            .await
            .unwrap();
        assert!(storage.exists("image_3_3.webp").await.unwrap());
        assert!(storage.health_check().await.is_ok());
    }
}
