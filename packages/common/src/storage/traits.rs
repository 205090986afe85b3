use std::io::Cursor;

use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncReadExt};

use super::error::StorageError;
use super::hash::ContentHash;

pub type BoxReader = Box<dyn AsyncRead + Unpin + Send>;

/// Content-addressed storage for uploaded recipe, category and ingredient images.
///
/// Identical uploads collapse onto one blob; callers keep their own metadata
/// rows pointing at the returned [`ContentHash`].
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Largest blob this store accepts, in bytes.
    fn max_size(&self) -> u64;

    async fn put(&self, data: &[u8]) -> Result<ContentHash, StorageError> {
        let reader: BoxReader = Box::new(Cursor::new(data.to_vec()));
        self.put_stream(reader).await
    }

    /// Drain `reader` into the store. Fails with `SizeLimitExceeded` once more
    /// than [`BlobStore::max_size`] bytes have been read.
    async fn put_stream(&self, reader: BoxReader) -> Result<ContentHash, StorageError>;

    async fn get(&self, hash: &ContentHash) -> Result<Vec<u8>, StorageError> {
        let mut reader = self.get_stream(hash).await?;
        let mut buf = Vec::new();
        reader.read_to_end(&mut buf).await?;
        Ok(buf)
    }

    async fn get_stream(&self, hash: &ContentHash) -> Result<BoxReader, StorageError>;

    async fn exists(&self, hash: &ContentHash) -> Result<bool, StorageError>;

    /// Returns `false` when nothing was stored under `hash`.
    async fn delete(&self, hash: &ContentHash) -> Result<bool, StorageError>;

    async fn size(&self, hash: &ContentHash) -> Result<u64, StorageError>;
}

/// Read `reader` fully into memory, refusing to buffer more than `limit` bytes.
pub async fn read_limited(reader: BoxReader, limit: u64) -> Result<Vec<u8>, StorageError> {
    let mut buf = Vec::new();
    let read = reader
        .take(limit.saturating_add(1))
        .read_to_end(&mut buf)
        .await? as u64;
    if read > limit {
        return Err(StorageError::SizeLimitExceeded {
            actual: read,
            limit,
        });
    }
    Ok(buf)
}
