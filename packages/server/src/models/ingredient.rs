use serde::{Deserialize, Serialize};

use crate::domain::Ingredient;
use crate::error::AppError;

use super::shared::{validate_image_url, validate_name};

#[derive(Deserialize, utoipa::ToSchema)]
pub struct IngredientRequest {
    #[schema(example = "Tomato")]
    pub name: String,
    pub image_url: Option<String>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct IngredientResponse {
    pub id: String,
    #[schema(example = "Tomato")]
    pub name: String,
    pub image_url: Option<String>,
}

impl From<Ingredient> for IngredientResponse {
    fn from(i: Ingredient) -> Self {
        Self {
            id: i.id,
            name: i.name,
            image_url: i.image_url,
        }
    }
}

pub fn validate_ingredient(req: &IngredientRequest) -> Result<(), AppError> {
    validate_name(&req.name)?;
    validate_image_url(req.image_url.as_deref())
}
