//! In-memory representation of the catalog, independent of the wire format.

use chrono::{DateTime, Utc};

use crate::entity::{category, ingredient, recipe};

#[derive(Debug, Clone, PartialEq)]
pub struct Recipe {
    /// Empty on create; the service assigns one.
    pub id: String,
    pub title: String,
    pub category_id: String,
    pub prep_time_min: i32,
    pub cook_time_min: i32,
    pub method: String,
    pub image_url: Option<String>,
    pub energy: i32,
    pub fat: f64,
    pub protein: f64,
    pub created_at: DateTime<Utc>,
}

/// One requested ingredient of a recipe, as submitted by the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipeIngredientLine {
    pub ingredient_id: String,
    pub amount: i32,
    pub unit: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    pub id: String,
    pub name: String,
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ingredient {
    pub id: String,
    pub name: String,
    pub image_url: Option<String>,
}

/// An ingredient together with the quantity a particular recipe uses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngredientWithAmount {
    pub ingredient: Ingredient,
    pub amount: i32,
    pub unit: String,
}

/// A recipe joined with its category and its ordered ingredient lines.
/// Built on every read; never stored.
#[derive(Debug, Clone, PartialEq)]
pub struct RecipeAggregate {
    pub recipe: Recipe,
    pub category: Category,
    pub ingredients: Vec<IngredientWithAmount>,
}

impl From<recipe::Model> for Recipe {
    fn from(m: recipe::Model) -> Self {
        Self {
            id: m.id,
            title: m.title,
            category_id: m.category_id,
            prep_time_min: m.prep_time_min,
            cook_time_min: m.cook_time_min,
            method: m.method,
            image_url: m.image_url,
            energy: m.energy,
            fat: m.fat,
            protein: m.protein,
            created_at: m.created_at,
        }
    }
}

impl From<category::Model> for Category {
    fn from(m: category::Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
            image_url: m.image_url,
        }
    }
}

impl From<ingredient::Model> for Ingredient {
    fn from(m: ingredient::Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
            image_url: m.image_url,
        }
    }
}
