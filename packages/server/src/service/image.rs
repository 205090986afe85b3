use std::path::Path;
use std::sync::Arc;

use common::storage::{BlobStore, BoxReader, ContentHash, StorageError};
use sea_orm::{DatabaseConnection, Set};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::{Clock, begin, finish};
use crate::entity::image;
use crate::error::CatalogError;
use crate::repository::ImageRepository;
use crate::utils::filename::sanitize_filename;

/// Image metadata rows on top of the content-addressed blob store.
///
/// Rows sharing a blob are guarded by an advisory lock on the content hash:
/// an upload records its row and a delete drops the last row and the blob
/// without interleaving.
#[derive(Clone)]
pub struct ImageService {
    db: DatabaseConnection,
    store: Arc<dyn BlobStore>,
    clock: Arc<dyn Clock>,
}

impl ImageService {
    pub fn new(db: DatabaseConnection, store: Arc<dyn BlobStore>, clock: Arc<dyn Clock>) -> Self {
        Self { db, store, clock }
    }

    /// Store the file at `source` and record an image row for it.
    #[instrument(skip(self, source))]
    pub async fn upload(
        &self,
        filename: &str,
        source: &Path,
    ) -> Result<image::Model, CatalogError> {
        let filename = sanitize_filename(filename);
        let content_type = mime_guess::from_path(&filename)
            .first()
            .map(|m| m.to_string());

        let hash = self.put_file(source).await?;
        let content_hash = hash.to_hex();

        let txn = begin(&self.db).await?;
        let result = async {
            let repo = ImageRepository::new(&txn);
            repo.lock_hash(&content_hash).await?;

            // A delete of the last row sharing this blob may have removed it
            // after it was written above.
            if !self.store.exists(&hash).await? {
                self.put_file(source).await?;
            }
            let size = self.store.size(&hash).await?;

            let model = image::ActiveModel {
                id: Set(Uuid::now_v7()),
                content_hash: Set(content_hash.clone()),
                filename: Set(filename),
                content_type: Set(content_type),
                size: Set(i64::try_from(size).unwrap_or(i64::MAX)),
                created_at: Set(self.clock.now()),
            };
            repo.insert(model).await
        }
        .await;
        let saved = finish(txn, result).await?;

        info!(id = %saved.id, hash = %saved.content_hash, size = saved.size, "Image stored");
        Ok(saved)
    }

    async fn put_file(&self, source: &Path) -> Result<ContentHash, CatalogError> {
        let file = tokio::fs::File::open(source)
            .await
            .map_err(StorageError::from)?;
        Ok(self.store.put_stream(Box::new(file)).await?)
    }

    pub async fn list(&self) -> Result<Vec<image::Model>, CatalogError> {
        ImageRepository::new(&self.db).list().await
    }

    pub async fn get(&self, id: Uuid) -> Result<image::Model, CatalogError> {
        ImageRepository::new(&self.db).get(id).await
    }

    /// Metadata plus a reader over the stored bytes.
    pub async fn open(&self, id: Uuid) -> Result<(image::Model, BoxReader), CatalogError> {
        let image = self.get(id).await?;
        let hash = ContentHash::from_hex(&image.content_hash)?;
        let reader = self.store.get_stream(&hash).await?;
        Ok((image, reader))
    }

    /// Remove the image row. The blob goes too once no other row uses it.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: Uuid) -> Result<(), CatalogError> {
        let txn = begin(&self.db).await?;
        let result = async {
            let repo = ImageRepository::new(&txn);
            let content_hash = repo.get(id).await?.content_hash;
            repo.lock_hash(&content_hash).await?;

            // Re-read under the lock; a concurrent delete may have won.
            let removed = repo.delete(id).await?;
            let remaining = repo.count_by_hash(&removed.content_hash).await?;
            if remaining == 0 {
                let hash = ContentHash::from_hex(&removed.content_hash)?;
                if let Err(e) = self.store.delete(&hash).await {
                    warn!(hash = %removed.content_hash, error = %e, "Failed to delete blob");
                }
            }
            Ok::<_, CatalogError>(remaining)
        }
        .await;
        let remaining = finish(txn, result).await?;

        info!(shared = remaining > 0, "Image deleted");
        Ok(())
    }
}
