use async_trait::async_trait;
use s3::creds::Credentials;
use s3::error::S3Error;
use s3::{Bucket, Region};
use serde::Deserialize;
use tracing::debug;

use super::error::StorageError;
use super::hash::ContentHash;
use super::traits::{BlobStore, BoxReader, read_limited};

/// Connection settings for an S3-compatible bucket (AWS, MinIO, Yandex Object Storage, ...).
#[derive(Debug, Deserialize, Clone)]
pub struct S3Settings {
    pub bucket: String,
    pub region: String,
    pub endpoint: String,
    pub access_key: String,
    pub secret_key: String,
    /// Address the bucket as `{endpoint}/{bucket}` instead of `{bucket}.{endpoint}`.
    #[serde(default)]
    pub path_style: bool,
    /// Key prefix every image is stored under.
    #[serde(default = "default_prefix")]
    pub prefix: String,
}

fn default_prefix() -> String {
    "images".into()
}

pub struct S3BlobStore {
    bucket: Box<Bucket>,
    prefix: String,
    max_size: u64,
}

impl S3BlobStore {
    pub fn new(settings: &S3Settings, max_size: u64) -> Result<Self, StorageError> {
        let credentials = Credentials::new(
            Some(&settings.access_key),
            Some(&settings.secret_key),
            None,
            None,
            None,
        )
        .map_err(|e| StorageError::Backend(format!("invalid credentials: {e}")))?;

        let region = Region::Custom {
            region: settings.region.clone(),
            endpoint: settings.endpoint.clone(),
        };

        let mut bucket = Bucket::new(&settings.bucket, region, credentials).map_err(backend)?;
        if settings.path_style {
            bucket = bucket.with_path_style();
        }

        Ok(Self {
            bucket,
            prefix: settings.prefix.clone(),
            max_size,
        })
    }

    fn key(&self, hash: &ContentHash) -> String {
        hash.object_key(&self.prefix)
    }
}

fn backend(err: S3Error) -> StorageError {
    StorageError::Backend(err.to_string())
}

fn is_missing(err: &S3Error) -> bool {
    matches!(err, S3Error::HttpFailWithBody(404, _))
}

fn check_status(status: u16, key: &str) -> Result<(), StorageError> {
    match status {
        200..=299 => Ok(()),
        404 => Err(StorageError::NotFound(key.to_string())),
        other => Err(StorageError::Backend(format!(
            "unexpected status {other} for {key}"
        ))),
    }
}

#[async_trait]
impl BlobStore for S3BlobStore {
    fn max_size(&self) -> u64 {
        self.max_size
    }

    async fn put_stream(&self, reader: BoxReader) -> Result<ContentHash, StorageError> {
        let data = read_limited(reader, self.max_size).await?;
        let hash = ContentHash::compute(&data);

        if self.exists(&hash).await? {
            debug!(%hash, "image already stored, skipping upload");
            return Ok(hash);
        }

        let key = self.key(&hash);
        let response = self.bucket.put_object(&key, &data).await.map_err(backend)?;
        check_status(response.status_code(), &key)?;
        Ok(hash)
    }

    async fn get_stream(&self, hash: &ContentHash) -> Result<BoxReader, StorageError> {
        let key = self.key(hash);
        let response = match self.bucket.get_object(&key).await {
            Ok(r) => r,
            Err(e) if is_missing(&e) => return Err(StorageError::NotFound(hash.to_hex())),
            Err(e) => return Err(backend(e)),
        };
        check_status(response.status_code(), &key).map_err(|e| match e {
            StorageError::NotFound(_) => StorageError::NotFound(hash.to_hex()),
            other => other,
        })?;
        Ok(Box::new(std::io::Cursor::new(response.bytes().to_vec())))
    }

    async fn exists(&self, hash: &ContentHash) -> Result<bool, StorageError> {
        match self.bucket.head_object(self.key(hash)).await {
            Ok((_, 404)) => Ok(false),
            Ok((_, status)) => Ok((200..300).contains(&status)),
            Err(e) if is_missing(&e) => Ok(false),
            Err(e) => Err(backend(e)),
        }
    }

    async fn delete(&self, hash: &ContentHash) -> Result<bool, StorageError> {
        if !self.exists(hash).await? {
            return Ok(false);
        }
        let key = self.key(hash);
        let response = self.bucket.delete_object(&key).await.map_err(backend)?;
        check_status(response.status_code(), &key)?;
        Ok(true)
    }

    async fn size(&self, hash: &ContentHash) -> Result<u64, StorageError> {
        match self.bucket.head_object(self.key(hash)).await {
            Ok((_, 404)) => Err(StorageError::NotFound(hash.to_hex())),
            Ok((head, _)) => Ok(head
                .content_length
                .and_then(|len| u64::try_from(len).ok())
                .unwrap_or(0)),
            Err(e) if is_missing(&e) => Err(StorageError::NotFound(hash.to_hex())),
            Err(e) => Err(backend(e)),
        }
    }
}
