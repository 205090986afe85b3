use std::sync::Arc;

use sea_orm::DatabaseConnection;
use tracing::instrument;

use super::IdGenerator;
use crate::domain::Ingredient;
use crate::error::CatalogError;
use crate::repository::IngredientRepository;

#[derive(Clone)]
pub struct IngredientService {
    db: DatabaseConnection,
    ids: Arc<dyn IdGenerator>,
}

impl IngredientService {
    pub fn new(db: DatabaseConnection, ids: Arc<dyn IdGenerator>) -> Self {
        Self { db, ids }
    }

    /// Upsert by name.
    #[instrument(skip(self, image_url))]
    pub async fn create(
        &self,
        name: &str,
        image_url: Option<String>,
    ) -> Result<Ingredient, CatalogError> {
        IngredientRepository::new(&self.db)
            .upsert(self.ids.next_id(), name.trim(), image_url)
            .await
    }

    pub async fn list(&self) -> Result<Vec<Ingredient>, CatalogError> {
        IngredientRepository::new(&self.db).list().await
    }

    pub async fn get(&self, id: &str) -> Result<Ingredient, CatalogError> {
        IngredientRepository::new(&self.db).get(id).await
    }

    #[instrument(skip(self, image_url))]
    pub async fn update(
        &self,
        id: &str,
        name: &str,
        image_url: Option<String>,
    ) -> Result<Ingredient, CatalogError> {
        IngredientRepository::new(&self.db)
            .update(id, name.trim(), image_url)
            .await
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: &str) -> Result<(), CatalogError> {
        IngredientRepository::new(&self.db).delete(id).await
    }
}
