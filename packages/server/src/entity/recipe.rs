use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "recipe")]
pub struct Model {
    /// UUIDv7 string, so ids sort by creation time.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    pub title: String,

    pub category_id: String,
    #[sea_orm(belongs_to, from = "category_id", to = "id")]
    pub category: HasOne<super::category::Entity>,

    pub prep_time_min: i32, // minutes
    pub cook_time_min: i32, // minutes
    #[sea_orm(column_type = "Text")]
    pub method: String,
    pub image_url: Option<String>,

    pub energy: i32,  // kcal
    pub fat: f64,     // grams
    pub protein: f64, // grams

    #[sea_orm(has_many, via = "recipe_ingredient")]
    pub ingredients: HasMany<super::ingredient::Entity>,

    /// Written once on insert; updates never touch it.
    #[sea_orm(indexed)]
    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
