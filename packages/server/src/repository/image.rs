use sea_orm::*;
use uuid::Uuid;

use crate::entity::image;
use crate::error::CatalogError;

pub struct ImageRepository<'a, C: ConnectionTrait> {
    conn: &'a C,
}

impl<'a, C: ConnectionTrait> ImageRepository<'a, C> {
    pub fn new(conn: &'a C) -> Self {
        Self { conn }
    }

    pub async fn insert(&self, model: image::ActiveModel) -> Result<image::Model, CatalogError> {
        Ok(model.insert(self.conn).await?)
    }

    /// Newest first.
    pub async fn list(&self) -> Result<Vec<image::Model>, CatalogError> {
        Ok(image::Entity::find()
            .order_by_desc(image::Column::CreatedAt)
            .order_by_desc(image::Column::Id)
            .all(self.conn)
            .await?)
    }

    pub async fn get(&self, id: Uuid) -> Result<image::Model, CatalogError> {
        image::Entity::find_by_id(id)
            .one(self.conn)
            .await?
            .ok_or_else(|| CatalogError::not_found("Image"))
    }

    /// Remove the metadata row and return it.
    pub async fn delete(&self, id: Uuid) -> Result<image::Model, CatalogError> {
        let existing = self.get(id).await?;
        image::Entity::delete_by_id(id).exec(self.conn).await?;
        Ok(existing)
    }

    /// Number of image rows pointing at the blob `content_hash`.
    pub async fn count_by_hash(&self, content_hash: &str) -> Result<u64, CatalogError> {
        Ok(image::Entity::find()
            .filter(image::Column::ContentHash.eq(content_hash))
            .count(self.conn)
            .await?)
    }
}

impl ImageRepository<'_, DatabaseTransaction> {
    /// Take a transaction-scoped advisory lock on `content_hash`, released
    /// on commit or rollback. Uploads and deletes of one blob run one at a
    /// time while they hold it.
    pub async fn lock_hash(&self, content_hash: &str) -> Result<(), CatalogError> {
        self.conn
            .execute_raw(Statement::from_sql_and_values(
                ConnectionTrait::get_database_backend(self.conn),
                "SELECT pg_advisory_xact_lock(hashtextextended($1, 0))",
                [content_hash.into()],
            ))
            .await?;
        Ok(())
    }
}
