use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{IngredientWithAmount, Recipe, RecipeAggregate, RecipeIngredientLine};
use crate::error::AppError;

use super::category::CategoryResponse;
use super::shared::{
    non_blank, validate_image_url, validate_ref_id, validate_title, validate_unique_ids,
};

/// One ingredient of a recipe request.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct RecipeIngredientRequest {
    /// Ingredient ID.
    #[schema(example = "0192f4a1-7c3e-7d10-9a6b-2f0c4e8b1a01")]
    pub id: String,
    #[schema(example = 200)]
    pub amount: i32,
    /// Free-text unit (g, ml, pcs, ...).
    #[schema(example = "g")]
    pub unit: String,
}

/// Body of recipe create and update. Updates replace every field and the
/// whole ingredient list.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct RecipeRequest {
    #[schema(example = "Tomato Soup")]
    pub title: String,
    pub category_id: String,
    /// Preparation time in minutes.
    #[schema(example = 15)]
    pub prep_time_min: i32,
    /// Cooking time in minutes.
    #[schema(example = 30)]
    pub cook_time_min: i32,
    pub method: String,
    #[schema(example = "/api/v1/images/0192f4a1-7c3e-7d10-9a6b-2f0c4e8b1a02")]
    pub image_url: Option<String>,
    /// Energy in kcal.
    #[schema(example = 320)]
    pub energy: i32,
    /// Fat in grams.
    #[schema(example = 12.5)]
    pub fat: f64,
    /// Protein in grams.
    #[schema(example = 8.0)]
    pub protein: f64,
    #[serde(default)]
    pub ingredients: Vec<RecipeIngredientRequest>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct RecipeIngredientResponse {
    /// Ingredient ID.
    pub id: String,
    pub name: String,
    pub image_url: Option<String>,
    pub amount: i32,
    pub unit: String,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct RecipeResponse {
    pub id: String,
    pub title: String,
    pub prep_time_min: i32,
    pub cook_time_min: i32,
    pub method: String,
    pub image_url: Option<String>,
    pub energy: i32,
    pub fat: f64,
    pub protein: f64,
    pub created_at: DateTime<Utc>,
    pub category: CategoryResponse,
    pub ingredients: Vec<RecipeIngredientResponse>,
}

#[derive(Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct RecipeListQuery {
    /// Case-insensitive match against the title or any ingredient name.
    pub search: Option<String>,
    /// Only recipes of this category.
    pub category_id: Option<String>,
}

impl RecipeRequest {
    /// Split into the recipe row and its ingredient lines. `created_at` is
    /// left at its default; the service or the stored row decides it.
    pub fn into_parts(self, id: String) -> (Recipe, Vec<RecipeIngredientLine>) {
        let lines = self
            .ingredients
            .into_iter()
            .map(|line| RecipeIngredientLine {
                ingredient_id: line.id.trim().to_string(),
                amount: line.amount,
                unit: line.unit.trim().to_string(),
            })
            .collect();

        let recipe = Recipe {
            id,
            title: self.title.trim().to_string(),
            category_id: self.category_id.trim().to_string(),
            prep_time_min: self.prep_time_min,
            cook_time_min: self.cook_time_min,
            method: self.method,
            image_url: non_blank(self.image_url),
            energy: self.energy,
            fat: self.fat,
            protein: self.protein,
            created_at: DateTime::<Utc>::default(),
        };

        (recipe, lines)
    }
}

impl From<IngredientWithAmount> for RecipeIngredientResponse {
    fn from(line: IngredientWithAmount) -> Self {
        Self {
            id: line.ingredient.id,
            name: line.ingredient.name,
            image_url: line.ingredient.image_url,
            amount: line.amount,
            unit: line.unit,
        }
    }
}

impl From<RecipeAggregate> for RecipeResponse {
    fn from(aggregate: RecipeAggregate) -> Self {
        let RecipeAggregate {
            recipe,
            category,
            ingredients,
        } = aggregate;

        Self {
            id: recipe.id,
            title: recipe.title,
            prep_time_min: recipe.prep_time_min,
            cook_time_min: recipe.cook_time_min,
            method: recipe.method,
            image_url: recipe.image_url,
            energy: recipe.energy,
            fat: recipe.fat,
            protein: recipe.protein,
            created_at: recipe.created_at,
            category: category.into(),
            ingredients: ingredients.into_iter().map(Into::into).collect(),
        }
    }
}

pub fn validate_recipe(req: &RecipeRequest) -> Result<(), AppError> {
    validate_title(&req.title)?;
    validate_ref_id(&req.category_id, "category_id")?;
    if req.method.len() > 100_000 {
        return Err(AppError::Validation(
            "Method must be at most 100000 bytes".into(),
        ));
    }
    validate_image_url(req.image_url.as_deref())?;

    if !(0..=10_000).contains(&req.prep_time_min) || !(0..=10_000).contains(&req.cook_time_min) {
        return Err(AppError::Validation(
            "Preparation and cooking times must be 0-10000 minutes".into(),
        ));
    }
    if req.energy < 0 {
        return Err(AppError::Validation("Energy must be >= 0".into()));
    }
    for (name, value) in [("Fat", req.fat), ("Protein", req.protein)] {
        if !value.is_finite() || value < 0.0 {
            return Err(AppError::Validation(format!(
                "{name} must be a non-negative number"
            )));
        }
    }

    for line in &req.ingredients {
        validate_ref_id(&line.id, "Ingredient id")?;
        if line.amount < 0 {
            return Err(AppError::Validation("Ingredient amount must be >= 0".into()));
        }
        if line.unit.trim().chars().count() > 32 {
            return Err(AppError::Validation(
                "Ingredient unit must be at most 32 characters".into(),
            ));
        }
    }
    validate_unique_ids(req.ingredients.iter().map(|l| l.id.as_str()), "ingredient id")?;

    Ok(())
}
