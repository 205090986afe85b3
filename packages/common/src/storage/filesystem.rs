use std::path::{Path, PathBuf};

use async_trait::async_trait;
use sha2::{Digest, Sha256};
use tokio::fs;
use tokio::io::{AsyncReadExt, AsyncWriteExt, BufReader};

use super::error::StorageError;
use super::hash::ContentHash;
use super::traits::{BlobStore, BoxReader};

/// Local-disk image store.
///
/// Layout: `{root}/{2 hex chars}/{62 hex chars}`, with in-flight uploads
/// written under `{root}/.incoming` and renamed into place once hashed.
pub struct FilesystemBlobStore {
    root: PathBuf,
    max_size: u64,
}

impl FilesystemBlobStore {
    pub async fn new(root: impl Into<PathBuf>, max_size: u64) -> Result<Self, StorageError> {
        let root = root.into();
        fs::create_dir_all(root.join(".incoming")).await?;
        Ok(Self { root, max_size })
    }

    fn blob_path(&self, hash: &ContentHash) -> PathBuf {
        self.root.join(hash.shard_prefix()).join(hash.shard_suffix())
    }

    fn incoming_path(&self) -> PathBuf {
        self.root
            .join(".incoming")
            .join(uuid::Uuid::new_v4().to_string())
    }

    /// Move a fully written upload to its content address. A blob that is
    /// already present wins and the upload is discarded.
    async fn settle(&self, incoming: &Path, hash: &ContentHash) -> Result<(), StorageError> {
        let target = self.blob_path(hash);
        if fs::try_exists(&target).await? {
            let _ = fs::remove_file(incoming).await;
            return Ok(());
        }
        if let Some(shard) = target.parent() {
            fs::create_dir_all(shard).await?;
        }
        if let Err(e) = fs::rename(incoming, &target).await {
            let _ = fs::remove_file(incoming).await;
            return Err(e.into());
        }
        Ok(())
    }
}

#[async_trait]
impl BlobStore for FilesystemBlobStore {
    fn max_size(&self) -> u64 {
        self.max_size
    }

    async fn put_stream(&self, mut reader: BoxReader) -> Result<ContentHash, StorageError> {
        let incoming = self.incoming_path();
        let mut file = fs::File::create(&incoming).await?;
        let mut hasher = Sha256::new();
        let mut written: u64 = 0;
        let mut buf = vec![0u8; 64 * 1024];

        loop {
            let n = match reader.read(&mut buf).await {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) => {
                    drop(file);
                    let _ = fs::remove_file(&incoming).await;
                    return Err(e.into());
                }
            };

            written += n as u64;
            if written > self.max_size {
                drop(file);
                let _ = fs::remove_file(&incoming).await;
                return Err(StorageError::SizeLimitExceeded {
                    actual: written,
                    limit: self.max_size,
                });
            }

            hasher.update(&buf[..n]);
            file.write_all(&buf[..n]).await?;
        }

        file.flush().await?;
        drop(file);

        let hash = ContentHash::from_bytes(hasher.finalize().into());
        self.settle(&incoming, &hash).await?;
        Ok(hash)
    }

    async fn get_stream(&self, hash: &ContentHash) -> Result<BoxReader, StorageError> {
        match fs::File::open(self.blob_path(hash)).await {
            Ok(file) => Ok(Box::new(BufReader::new(file))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::NotFound(hash.to_hex()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn exists(&self, hash: &ContentHash) -> Result<bool, StorageError> {
        Ok(fs::try_exists(self.blob_path(hash)).await?)
    }

    async fn delete(&self, hash: &ContentHash) -> Result<bool, StorageError> {
        match fs::remove_file(self.blob_path(hash)).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    async fn size(&self, hash: &ContentHash) -> Result<u64, StorageError> {
        match fs::metadata(self.blob_path(hash)).await {
            Ok(meta) => Ok(meta.len()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::NotFound(hash.to_hex()))
            }
            Err(e) => Err(e.into()),
        }
    }
}
