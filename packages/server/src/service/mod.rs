pub mod category;
pub mod image;
pub mod ingredient;
pub mod recipe;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use sea_orm::{DatabaseConnection, DatabaseTransaction, TransactionTrait};
use tracing::warn;
use uuid::Uuid;

use crate::error::CatalogError;

pub use category::CategoryService;
pub use image::ImageService;
pub use ingredient::IngredientService;
pub use recipe::RecipeService;

/// Source of identifiers for new rows.
pub trait IdGenerator: Send + Sync {
    fn next_id(&self) -> String;
}

/// UUIDv7 strings: unique, and sortable by creation time.
#[derive(Debug, Default, Clone, Copy)]
pub struct UuidV7Ids;

impl IdGenerator for UuidV7Ids {
    fn next_id(&self) -> String {
        Uuid::now_v7().to_string()
    }
}

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// All services sharing one pool, id source and clock.
#[derive(Clone)]
pub struct Services {
    pub recipes: RecipeService,
    pub categories: CategoryService,
    pub ingredients: IngredientService,
    pub images: ImageService,
}

impl Services {
    pub fn new(
        db: DatabaseConnection,
        blob_store: Arc<dyn common::storage::BlobStore>,
        ids: Arc<dyn IdGenerator>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            recipes: RecipeService::new(db.clone(), ids.clone(), clock.clone()),
            categories: CategoryService::new(db.clone(), ids.clone()),
            ingredients: IngredientService::new(db.clone(), ids),
            images: ImageService::new(db, blob_store, clock),
        }
    }
}

pub(crate) async fn begin(db: &DatabaseConnection) -> Result<DatabaseTransaction, CatalogError> {
    db.begin().await.map_err(CatalogError::transaction)
}

/// Commit on success. On failure roll back and hand back the original error.
pub(crate) async fn finish<T>(
    txn: DatabaseTransaction,
    result: Result<T, CatalogError>,
) -> Result<T, CatalogError> {
    match result {
        Ok(value) => {
            txn.commit().await.map_err(CatalogError::transaction)?;
            Ok(value)
        }
        Err(err) => {
            if let Err(rollback_err) = txn.rollback().await {
                warn!(error = %rollback_err, "Rollback failed");
            }
            Err(err)
        }
    }
}
