use std::sync::Arc;

use sea_orm::DatabaseConnection;
use tracing::{info, instrument};

use super::{Clock, IdGenerator, begin, finish};
use crate::domain::{Recipe, RecipeAggregate, RecipeIngredientLine};
use crate::error::CatalogError;
use crate::repository::RecipeRepository;

/// Entry point for recipe writes. Each write runs in its own transaction
/// that is either committed whole or rolled back.
#[derive(Clone)]
pub struct RecipeService {
    db: DatabaseConnection,
    ids: Arc<dyn IdGenerator>,
    clock: Arc<dyn Clock>,
}

impl RecipeService {
    pub fn new(db: DatabaseConnection, ids: Arc<dyn IdGenerator>, clock: Arc<dyn Clock>) -> Self {
        Self { db, ids, clock }
    }

    /// Store a new recipe with its ingredient lines and return the stored
    /// aggregate. An empty `recipe.id` gets a fresh identifier; `created_at`
    /// is always taken from the clock.
    #[instrument(skip(self, recipe, lines), fields(title = %recipe.title, lines = lines.len()))]
    pub async fn create_with_ingredients(
        &self,
        mut recipe: Recipe,
        lines: Vec<RecipeIngredientLine>,
    ) -> Result<RecipeAggregate, CatalogError> {
        if recipe.id.is_empty() {
            recipe.id = self.ids.next_id();
        }
        recipe.created_at = self.clock.now();

        let txn = begin(&self.db).await?;
        let result = RecipeRepository::new(&txn)
            .create_with_lines(&recipe, &lines)
            .await;
        finish(txn, result).await?;

        info!(id = %recipe.id, "Recipe created");
        RecipeRepository::new(&self.db).get_by_id(&recipe.id).await
    }

    /// Overwrite a recipe and replace its ingredient lines. The stored
    /// creation timestamp is kept whatever `recipe.created_at` holds.
    #[instrument(skip(self, recipe, lines), fields(id = %recipe.id, lines = lines.len()))]
    pub async fn update_with_ingredients(
        &self,
        recipe: Recipe,
        lines: Vec<RecipeIngredientLine>,
    ) -> Result<(), CatalogError> {
        let txn = begin(&self.db).await?;
        let result = RecipeRepository::new(&txn)
            .update_with_lines(&recipe, &lines)
            .await;
        finish(txn, result).await?;

        info!("Recipe updated");
        Ok(())
    }

    pub async fn get_by_id(&self, id: &str) -> Result<RecipeAggregate, CatalogError> {
        RecipeRepository::new(&self.db).get_by_id(id).await
    }

    pub async fn get_all(
        &self,
        search: Option<&str>,
        category_id: Option<&str>,
    ) -> Result<Vec<RecipeAggregate>, CatalogError> {
        RecipeRepository::new(&self.db)
            .get_all(search, category_id)
            .await
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: &str) -> Result<(), CatalogError> {
        let txn = begin(&self.db).await?;
        let result = RecipeRepository::new(&txn).delete(id).await;
        finish(txn, result).await?;

        info!("Recipe deleted");
        Ok(())
    }
}
