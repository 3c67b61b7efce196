use std::path::PathBuf;

use async_trait::async_trait;
use sha2::{Digest, Sha256};
use tokio::fs;
use tokio::io::{AsyncReadExt, AsyncWriteExt, BufReader};

use super::error::StorageError;
use super::hash::ContentHash;
use super::{BlobStore, BoxReader};

/// Filesystem-backed content-addressed store for uploaded files.
///
/// Blobs are stored in a Git-style sharded directory layout:
/// `{upload_dir}/{first 2 hex chars}/{remaining 62 hex chars}`
///
/// Writes go through a uniquely named temp file and an atomic rename, so
/// concurrent uploads of the same content converge on one blob and a request
/// that disconnects mid-upload leaves at most an orphaned temp file.
pub struct FilesystemBlobStore {
    upload_dir: PathBuf,
    max_size: u64,
}

impl FilesystemBlobStore {
    /// Create a new store rooted at `upload_dir`, rejecting blobs over `max_size` bytes.
    pub async fn new(upload_dir: PathBuf, max_size: u64) -> Result<Self, StorageError> {
        fs::create_dir_all(&upload_dir).await?;
        fs::create_dir_all(upload_dir.join(".tmp")).await?;
        Ok(Self {
            upload_dir,
            max_size,
        })
    }

    /// Compute the filesystem path for a given content hash.
    fn blob_path(&self, hash: &ContentHash) -> PathBuf {
        self.upload_dir
            .join(hash.shard_prefix())
            .join(hash.shard_suffix())
    }

    /// Path for a temporary file during writes.
    fn temp_path(&self) -> PathBuf {
        self.upload_dir
            .join(".tmp")
            .join(uuid::Uuid::new_v4().to_string())
    }

    async fn commit_temp(
        &self,
        temp_path: &PathBuf,
        hash: &ContentHash,
    ) -> Result<(), StorageError> {
        let blob_path = self.blob_path(hash);

        if blob_path.exists() {
            let _ = fs::remove_file(temp_path).await;
            return Ok(());
        }

        if let Some(parent) = blob_path.parent() {
            fs::create_dir_all(parent).await?;
        }

        if let Err(e) = fs::rename(temp_path, &blob_path).await {
            let _ = fs::remove_file(temp_path).await;
            return Err(e.into());
        }

        Ok(())
    }
}

#[async_trait]
impl BlobStore for FilesystemBlobStore {
    async fn put_stream(&self, mut reader: BoxReader) -> Result<ContentHash, StorageError> {
        let temp_path = self.temp_path();
        let mut hasher = Sha256::new();
        let mut total_bytes: u64 = 0;

        let mut buf = vec![0u8; 64 * 1024]; // 64KB read buffer
        let mut temp_file = fs::File::create(&temp_path).await?;

        loop {
            let n = reader.read(&mut buf).await?;
            if n == 0 {
                break;
            }

            total_bytes += n as u64;
            if total_bytes > self.max_size {
                drop(temp_file);
                let _ = fs::remove_file(&temp_path).await;
                return Err(StorageError::SizeLimitExceeded {
                    actual: total_bytes,
                    limit: self.max_size,
                });
            }

            hasher.update(&buf[..n]);
            temp_file.write_all(&buf[..n]).await?;
        }

        temp_file.flush().await?;
        drop(temp_file);

        let hash = ContentHash::from_bytes(hasher.finalize().into());
        self.commit_temp(&temp_path, &hash).await?;

        Ok(hash)
    }

    async fn get_stream(&self, hash: &ContentHash) -> Result<BoxReader, StorageError> {
        let blob_path = self.blob_path(hash);
        match fs::File::open(&blob_path).await {
            Ok(file) => Ok(Box::new(BufReader::new(file))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::NotFound(hash.to_hex()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn size(&self, hash: &ContentHash) -> Result<u64, StorageError> {
        let blob_path = self.blob_path(hash);
        match fs::metadata(&blob_path).await {
            Ok(meta) => Ok(meta.len()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::NotFound(hash.to_hex()))
            }
            Err(e) => Err(e.into()),
        }
    }
}
