use std::collections::HashMap;

use sea_orm::prelude::Expr;
use sea_orm::sea_query::{BinOper, Func, LockType, Query as SeaQuery};
use sea_orm::*;

use crate::domain::{
    Ingredient, IngredientWithAmount, Recipe, RecipeAggregate, RecipeIngredientLine,
};
use crate::entity::{category, ingredient, recipe, recipe_ingredient};
use crate::error::CatalogError;
use crate::models::shared::escape_like;

/// Reads and writes recipe aggregates: the recipe row, its category and its
/// ingredient lines.
///
/// Reads work against any connection. Writes are only available on a
/// repository borrowed from a [`DatabaseTransaction`]; committing or rolling
/// back is the caller's job.
pub struct RecipeRepository<'a, C: ConnectionTrait> {
    conn: &'a C,
}

impl<'a, C: ConnectionTrait> RecipeRepository<'a, C> {
    pub fn new(conn: &'a C) -> Self {
        Self { conn }
    }

    /// Load one recipe with its category and ordered ingredient lines.
    pub async fn get_by_id(&self, id: &str) -> Result<RecipeAggregate, CatalogError> {
        let (recipe, category) = recipe::Entity::find_by_id(id.to_owned())
            .find_also_related(category::Entity)
            .one(self.conn)
            .await?
            .ok_or_else(|| CatalogError::not_found("Recipe"))?;

        let mut lines = self.lines_for(std::slice::from_ref(&recipe.id)).await?;
        assemble(recipe, category, &mut lines)
    }

    /// List recipes, newest first.
    ///
    /// A non-empty `search` keeps recipes whose title or any ingredient name
    /// contains the term, ignoring case. A non-empty `category_id` keeps only
    /// that category.
    pub async fn get_all(
        &self,
        search: Option<&str>,
        category_id: Option<&str>,
    ) -> Result<Vec<RecipeAggregate>, CatalogError> {
        let mut select = recipe::Entity::find();

        // Both sides are lowercased by the database. Postgres LIKE treats a
        // backslash as the escape character by default.
        if let Some(term) = search.filter(|t| !t.is_empty()) {
            let pattern = format!("%{}%", escape_like(term));
            select = select.filter(
                Condition::any()
                    .add(
                        Expr::expr(Func::lower(Expr::col((
                            recipe::Entity,
                            recipe::Column::Title,
                        ))))
                        .binary(BinOper::Like, Func::lower(Expr::val(pattern.clone()))),
                    )
                    .add(
                        recipe::Column::Id.in_subquery(
                            SeaQuery::select()
                                .column(recipe_ingredient::Column::RecipeId)
                                .from(recipe_ingredient::Entity)
                                .and_where(
                                    recipe_ingredient::Column::IngredientId.in_subquery(
                                        SeaQuery::select()
                                            .column(ingredient::Column::Id)
                                            .from(ingredient::Entity)
                                            .and_where(
                                                Expr::expr(Func::lower(Expr::col(
                                                    ingredient::Column::Name,
                                                )))
                                                .binary(
                                                    BinOper::Like,
                                                    Func::lower(Expr::val(pattern)),
                                                ),
                                            )
                                            .to_owned(),
                                    ),
                                )
                                .to_owned(),
                        ),
                    ),
            );
        }

        if let Some(category_id) = category_id.map(str::trim).filter(|c| !c.is_empty()) {
            select = select.filter(recipe::Column::CategoryId.eq(category_id));
        }

        let rows = select
            .find_also_related(category::Entity)
            .order_by_desc(recipe::Column::CreatedAt)
            .order_by_desc(recipe::Column::Id)
            .all(self.conn)
            .await?;

        let ids: Vec<String> = rows.iter().map(|(r, _)| r.id.clone()).collect();
        let mut lines = self.lines_for(&ids).await?;

        rows.into_iter()
            .map(|(recipe, category)| assemble(recipe, category, &mut lines))
            .collect()
    }

    /// Fetch the ingredient lines of every listed recipe in one query.
    async fn lines_for(
        &self,
        recipe_ids: &[String],
    ) -> Result<HashMap<String, Vec<IngredientWithAmount>>, CatalogError> {
        if recipe_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = recipe_ingredient::Entity::find()
            .filter(recipe_ingredient::Column::RecipeId.is_in(recipe_ids.iter().cloned()))
            .find_also_related(ingredient::Entity)
            .order_by_asc(recipe_ingredient::Column::RecipeId)
            .order_by_asc(recipe_ingredient::Column::Position)
            .all(self.conn)
            .await?;

        Ok(group_lines(rows.into_iter().filter_map(|(line, ingredient)| {
            let Some(ingredient) = ingredient else {
                tracing::warn!(
                    recipe_id = %line.recipe_id,
                    ingredient_id = %line.ingredient_id,
                    "Ingredient line without ingredient row"
                );
                return None;
            };
            Some((
                line.recipe_id,
                IngredientWithAmount {
                    ingredient: Ingredient::from(ingredient),
                    amount: line.amount,
                    unit: line.unit,
                },
            ))
        })))
    }
}

impl RecipeRepository<'_, DatabaseTransaction> {
    /// Insert the recipe row followed by one association row per line.
    pub async fn create_with_lines(
        &self,
        recipe: &Recipe,
        lines: &[RecipeIngredientLine],
    ) -> Result<(), CatalogError> {
        let mut model = active_model(recipe);
        model.created_at = Set(recipe.created_at);

        recipe::Entity::insert(model)
            .exec_without_returning(self.conn)
            .await?;
        self.insert_lines(&recipe.id, lines).await
    }

    /// Overwrite the recipe row and replace its whole line set.
    ///
    /// The row is locked first so concurrent updates of one recipe run one
    /// after another. `created_at` is never written.
    pub async fn update_with_lines(
        &self,
        recipe: &Recipe,
        lines: &[RecipeIngredientLine],
    ) -> Result<(), CatalogError> {
        recipe::Entity::find_by_id(recipe.id.clone())
            .lock(LockType::Update)
            .one(self.conn)
            .await?
            .ok_or_else(|| CatalogError::not_found("Recipe"))?;

        active_model(recipe).update(self.conn).await?;

        recipe_ingredient::Entity::delete_many()
            .filter(recipe_ingredient::Column::RecipeId.eq(recipe.id.as_str()))
            .exec(self.conn)
            .await?;
        self.insert_lines(&recipe.id, lines).await
    }

    /// Delete the recipe's lines, then the recipe itself.
    pub async fn delete(&self, id: &str) -> Result<(), CatalogError> {
        recipe_ingredient::Entity::delete_many()
            .filter(recipe_ingredient::Column::RecipeId.eq(id))
            .exec(self.conn)
            .await?;

        let result = recipe::Entity::delete_by_id(id.to_owned())
            .exec(self.conn)
            .await?;
        if result.rows_affected == 0 {
            return Err(CatalogError::not_found("Recipe"));
        }
        Ok(())
    }

    async fn insert_lines(
        &self,
        recipe_id: &str,
        lines: &[RecipeIngredientLine],
    ) -> Result<(), CatalogError> {
        if lines.is_empty() {
            return Ok(());
        }

        let rows = lines
            .iter()
            .enumerate()
            .map(|(position, line)| recipe_ingredient::ActiveModel {
                recipe_id: Set(recipe_id.to_owned()),
                ingredient_id: Set(line.ingredient_id.clone()),
                amount: Set(line.amount),
                unit: Set(line.unit.clone()),
                position: Set(position as i32),
            });

        recipe_ingredient::Entity::insert_many(rows)
            .exec_without_returning(self.conn)
            .await?;
        Ok(())
    }
}

/// Column values shared by insert and update. `created_at` is left unset.
fn active_model(recipe: &Recipe) -> recipe::ActiveModel {
    recipe::ActiveModel {
        id: Set(recipe.id.clone()),
        title: Set(recipe.title.clone()),
        category_id: Set(recipe.category_id.clone()),
        prep_time_min: Set(recipe.prep_time_min),
        cook_time_min: Set(recipe.cook_time_min),
        method: Set(recipe.method.clone()),
        image_url: Set(recipe.image_url.clone()),
        energy: Set(recipe.energy),
        fat: Set(recipe.fat),
        protein: Set(recipe.protein),
        created_at: NotSet,
    }
}

fn assemble(
    recipe: recipe::Model,
    category: Option<category::Model>,
    lines: &mut HashMap<String, Vec<IngredientWithAmount>>,
) -> Result<RecipeAggregate, CatalogError> {
    let category = category.ok_or_else(|| CatalogError::not_found("Category"))?;
    let ingredients = lines.remove(&recipe.id).unwrap_or_default();
    Ok(RecipeAggregate {
        recipe: recipe.into(),
        category: category.into(),
        ingredients,
    })
}

/// Group `(recipe_id, line)` pairs by recipe, keeping the input order within
/// each recipe.
pub(crate) fn group_lines<I>(rows: I) -> HashMap<String, Vec<IngredientWithAmount>>
where
    I: IntoIterator<Item = (String, IngredientWithAmount)>,
{
    let mut grouped: HashMap<String, Vec<IngredientWithAmount>> = HashMap::new();
    for (recipe_id, line) in rows {
        grouped.entry(recipe_id).or_default().push(line);
    }
    grouped
}
