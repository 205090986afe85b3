use sea_orm::sea_query::OnConflict;
use sea_orm::*;

use crate::domain::Ingredient;
use crate::entity::ingredient;
use crate::error::CatalogError;

pub struct IngredientRepository<'a, C: ConnectionTrait> {
    conn: &'a C,
}

impl<'a, C: ConnectionTrait> IngredientRepository<'a, C> {
    pub fn new(conn: &'a C) -> Self {
        Self { conn }
    }

    /// Insert an ingredient, or refresh the image of the one already carrying
    /// `name`.
    pub async fn upsert(
        &self,
        new_id: String,
        name: &str,
        image_url: Option<String>,
    ) -> Result<Ingredient, CatalogError> {
        let model = ingredient::ActiveModel {
            id: Set(new_id),
            name: Set(name.to_owned()),
            image_url: Set(image_url),
        };

        ingredient::Entity::insert(model)
            .on_conflict(
                OnConflict::column(ingredient::Column::Name)
                    .update_column(ingredient::Column::ImageUrl)
                    .to_owned(),
            )
            .exec_without_returning(self.conn)
            .await?;

        ingredient::Entity::find()
            .filter(ingredient::Column::Name.eq(name))
            .one(self.conn)
            .await?
            .map(Ingredient::from)
            .ok_or_else(|| CatalogError::not_found("Ingredient"))
    }

    pub async fn list(&self) -> Result<Vec<Ingredient>, CatalogError> {
        let rows = ingredient::Entity::find()
            .order_by_asc(ingredient::Column::Name)
            .all(self.conn)
            .await?;
        Ok(rows.into_iter().map(Ingredient::from).collect())
    }

    pub async fn get(&self, id: &str) -> Result<Ingredient, CatalogError> {
        self.find(id).await.map(Ingredient::from)
    }

    pub async fn update(
        &self,
        id: &str,
        name: &str,
        image_url: Option<String>,
    ) -> Result<Ingredient, CatalogError> {
        let mut active: ingredient::ActiveModel = self.find(id).await?.into();
        active.name = Set(name.to_owned());
        active.image_url = Set(image_url);

        let model = active.update(self.conn).await?;
        Ok(model.into())
    }

    pub async fn delete(&self, id: &str) -> Result<(), CatalogError> {
        let result = ingredient::Entity::delete_by_id(id.to_owned())
            .exec(self.conn)
            .await?;
        if result.rows_affected == 0 {
            return Err(CatalogError::not_found("Ingredient"));
        }
        Ok(())
    }

    async fn find(&self, id: &str) -> Result<ingredient::Model, CatalogError> {
        ingredient::Entity::find_by_id(id.to_owned())
            .one(self.conn)
            .await?
            .ok_or_else(|| CatalogError::not_found("Ingredient"))
    }
}
