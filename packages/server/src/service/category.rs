use std::sync::Arc;

use sea_orm::DatabaseConnection;
use tracing::instrument;

use super::IdGenerator;
use crate::domain::Category;
use crate::error::CatalogError;
use crate::repository::CategoryRepository;

#[derive(Clone)]
pub struct CategoryService {
    db: DatabaseConnection,
    ids: Arc<dyn IdGenerator>,
}

impl CategoryService {
    pub fn new(db: DatabaseConnection, ids: Arc<dyn IdGenerator>) -> Self {
        Self { db, ids }
    }

    /// Create a category, or update the image of the existing one with the
    /// same name.
    #[instrument(skip(self, image_url))]
    pub async fn create(
        &self,
        name: &str,
        image_url: Option<String>,
    ) -> Result<Category, CatalogError> {
        CategoryRepository::new(&self.db)
            .upsert(self.ids.next_id(), name.trim(), image_url)
            .await
    }

    pub async fn list(&self) -> Result<Vec<Category>, CatalogError> {
        CategoryRepository::new(&self.db).list().await
    }

    pub async fn get(&self, id: &str) -> Result<Category, CatalogError> {
        CategoryRepository::new(&self.db).get(id).await
    }

    #[instrument(skip(self, image_url))]
    pub async fn update(
        &self,
        id: &str,
        name: &str,
        image_url: Option<String>,
    ) -> Result<Category, CatalogError> {
        CategoryRepository::new(&self.db)
            .update(id, name.trim(), image_url)
            .await
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: &str) -> Result<(), CatalogError> {
        CategoryRepository::new(&self.db).delete(id).await
    }
}
