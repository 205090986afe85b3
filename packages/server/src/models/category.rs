use serde::{Deserialize, Serialize};

use crate::domain::Category;
use crate::error::AppError;

use super::shared::{validate_image_url, validate_name};

/// Create or update a category. Creating an existing name updates its image.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct CategoryRequest {
    #[schema(example = "Soups")]
    pub name: String,
    pub image_url: Option<String>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct CategoryResponse {
    pub id: String,
    #[schema(example = "Soups")]
    pub name: String,
    pub image_url: Option<String>,
}

impl From<Category> for CategoryResponse {
    fn from(c: Category) -> Self {
        Self {
            id: c.id,
            name: c.name,
            image_url: c.image_url,
        }
    }
}

pub fn validate_category(req: &CategoryRequest) -> Result<(), AppError> {
    validate_name(&req.name)?;
    validate_image_url(req.image_url.as_deref())
}
