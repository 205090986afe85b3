use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::entity::image;

/// Response DTO for a stored image.
#[derive(Serialize, utoipa::ToSchema)]
pub struct ImageResponse {
    /// Image ID (UUIDv7).
    #[schema(example = "01936f0e-1234-7abc-8000-000000000001")]
    pub id: String,
    /// Where the bytes are served; use this as `image_url` elsewhere.
    #[schema(example = "/api/v1/images/01936f0e-1234-7abc-8000-000000000001")]
    pub url: String,
    /// Sanitized upload filename.
    #[schema(example = "tomato-soup.jpg")]
    pub filename: String,
    #[schema(example = "image/jpeg")]
    pub content_type: Option<String>,
    /// Size in bytes.
    #[schema(example = 142857)]
    pub size: i64,
    /// SHA-256 content hash.
    pub content_hash: String,
    pub created_at: DateTime<Utc>,
}

/// Public URL of an image.
pub fn image_url(id: &uuid::Uuid) -> String {
    format!("/api/v1/images/{id}")
}

impl From<image::Model> for ImageResponse {
    fn from(model: image::Model) -> Self {
        Self {
            id: model.id.to_string(),
            url: image_url(&model.id),
            filename: model.filename,
            content_type: model.content_type,
            size: model.size,
            content_hash: model.content_hash,
            created_at: model.created_at,
        }
    }
}
