use sea_orm::sea_query::OnConflict;
use sea_orm::*;

use crate::domain::Category;
use crate::entity::category;
use crate::error::CatalogError;

pub struct CategoryRepository<'a, C: ConnectionTrait> {
    conn: &'a C,
}

impl<'a, C: ConnectionTrait> CategoryRepository<'a, C> {
    pub fn new(conn: &'a C) -> Self {
        Self { conn }
    }

    /// Insert a category, or refresh the image of the one already carrying
    /// `name`. `new_id` is only used when the name is new.
    pub async fn upsert(
        &self,
        new_id: String,
        name: &str,
        image_url: Option<String>,
    ) -> Result<Category, CatalogError> {
        let model = category::ActiveModel {
            id: Set(new_id),
            name: Set(name.to_owned()),
            image_url: Set(image_url),
        };

        category::Entity::insert(model)
            .on_conflict(
                OnConflict::column(category::Column::Name)
                    .update_column(category::Column::ImageUrl)
                    .to_owned(),
            )
            .exec_without_returning(self.conn)
            .await?;

        category::Entity::find()
            .filter(category::Column::Name.eq(name))
            .one(self.conn)
            .await?
            .map(Category::from)
            .ok_or_else(|| CatalogError::not_found("Category"))
    }

    pub async fn list(&self) -> Result<Vec<Category>, CatalogError> {
        let rows = category::Entity::find()
            .order_by_asc(category::Column::Name)
            .all(self.conn)
            .await?;
        Ok(rows.into_iter().map(Category::from).collect())
    }

    pub async fn get(&self, id: &str) -> Result<Category, CatalogError> {
        self.find(id).await.map(Category::from)
    }

    pub async fn update(
        &self,
        id: &str,
        name: &str,
        image_url: Option<String>,
    ) -> Result<Category, CatalogError> {
        let mut active: category::ActiveModel = self.find(id).await?.into();
        active.name = Set(name.to_owned());
        active.image_url = Set(image_url);

        let model = active.update(self.conn).await?;
        Ok(model.into())
    }

    /// Fails with a foreign-key violation while any recipe still uses the
    /// category.
    pub async fn delete(&self, id: &str) -> Result<(), CatalogError> {
        let result = category::Entity::delete_by_id(id.to_owned())
            .exec(self.conn)
            .await?;
        if result.rows_affected == 0 {
            return Err(CatalogError::not_found("Category"));
        }
        Ok(())
    }

    async fn find(&self, id: &str) -> Result<category::Model, CatalogError> {
        category::Entity::find_by_id(id.to_owned())
            .one(self.conn)
            .await?
            .ok_or_else(|| CatalogError::not_found("Category"))
    }
}
