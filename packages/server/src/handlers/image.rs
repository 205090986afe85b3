use std::path::PathBuf;

use axum::extract::{DefaultBodyLimit, Multipart, Path, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::{Json, body::Body};
use tokio::io::AsyncWriteExt;
use tokio_util::io::ReaderStream;
use tracing::instrument;
use uuid::Uuid;

use crate::error::{AppError, ErrorBody};
use crate::models::image::ImageResponse;
use crate::state::AppState;
use crate::utils::filename::{DEFAULT_FILENAME, content_disposition_value};

/// Multipart overhead on top of `storage.max_blob_size`.
const MULTIPART_SLACK: u64 = 64 * 1024;

pub fn image_upload_body_limit(max_blob_size: u64) -> DefaultBodyLimit {
    let limit = max_blob_size.saturating_add(MULTIPART_SLACK);
    DefaultBodyLimit::max(usize::try_from(limit).unwrap_or(usize::MAX))
}

#[utoipa::path(
    post,
    path = "/",
    tag = "Images",
    operation_id = "uploadImage",
    summary = "Upload an image",
    description = "Stores the `image` multipart field and returns its metadata. The returned `url` is what recipes, categories and ingredients reference as `image_url`. Identical uploads share one stored blob.",
    request_body(content_type = "multipart/form-data", description = "Image file in the `image` field"),
    responses(
        (status = 201, description = "Image stored", body = ImageResponse),
        (status = 400, description = "Missing field or file too large (VALIDATION_ERROR)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, multipart))]
pub async fn upload_image(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let max_size = state.config.storage.max_blob_size;
    let mut stored = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Multipart error: {e}")))?
    {
        if field.name() != Some("image") {
            continue; // Ignore unknown fields.
        }

        let filename = field
            .file_name()
            .map(str::to_string)
            .unwrap_or_else(|| DEFAULT_FILENAME.to_string());
        let temp_path = spool_field(field, max_size).await?;

        let result = state.services.images.upload(&filename, &temp_path).await;

        // Best effort.
        let _ = tokio::fs::remove_file(&temp_path).await;

        stored = Some(result?);
        break;
    }

    let image = stored.ok_or_else(|| AppError::Validation("Missing 'image' field".into()))?;
    Ok((StatusCode::CREATED, Json(ImageResponse::from(image))))
}

#[utoipa::path(
    get,
    path = "/",
    tag = "Images",
    operation_id = "listImages",
    summary = "List uploaded images, newest first",
    responses(
        (status = 200, description = "Image list", body = Vec<ImageResponse>),
    ),
)]
pub async fn list_images(
    State(state): State<AppState>,
) -> Result<Json<Vec<ImageResponse>>, AppError> {
    let images = state.services.images.list().await?;
    Ok(Json(images.into_iter().map(ImageResponse::from).collect()))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Images",
    operation_id = "getImage",
    summary = "Download an image",
    description = "Streams the stored bytes with the content type guessed at upload.",
    params(("id" = String, Path, description = "Image ID (UUID)")),
    responses(
        (status = 200, description = "Image content"),
        (status = 400, description = "Malformed ID (VALIDATION_ERROR)", body = ErrorBody),
        (status = 404, description = "Image not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state), fields(id))]
pub async fn get_image(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let id = parse_image_id(&id)?;
    let (image, reader) = state.services.images.open(id).await?;

    let content_type = image
        .content_type
        .as_deref()
        .unwrap_or("application/octet-stream");

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type)
        .header(header::CONTENT_LENGTH, image.size.to_string())
        .header(
            header::CONTENT_DISPOSITION,
            content_disposition_value(&image.filename),
        )
        .header(header::ETAG, format!("\"{}\"", image.content_hash))
        .header(header::CACHE_CONTROL, "public, max-age=86400")
        .body(Body::from_stream(ReaderStream::new(reader)))
        .map_err(|e| AppError::Internal(format!("Failed to build response: {e}")))
}

#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Images",
    operation_id = "deleteImage",
    summary = "Delete an image",
    description = "Removes the image. Its stored bytes are removed too unless another image has identical content.",
    params(("id" = String, Path, description = "Image ID (UUID)")),
    responses(
        (status = 204, description = "Image deleted"),
        (status = 400, description = "Malformed ID (VALIDATION_ERROR)", body = ErrorBody),
        (status = 404, description = "Image not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state), fields(id))]
pub async fn delete_image(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_image_id(&id)?;
    state.services.images.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

fn parse_image_id(id: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(id).map_err(|_| AppError::Validation("Invalid image ID".into()))
}

/// Copy a multipart field into a temp file and return its path. Fails once
/// the field grows past `max_size`; the temp file is removed on failure.
async fn spool_field(
    mut field: axum::extract::multipart::Field<'_>,
    max_size: u64,
) -> Result<PathBuf, AppError> {
    let temp_path = std::env::temp_dir().join(format!("larder-upload-{}", Uuid::new_v4()));

    let result = async {
        let mut temp_file = tokio::fs::File::create(&temp_path)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to create temp file: {e}")))?;

        let mut total_size: u64 = 0;

        while let Some(chunk) = field
            .chunk()
            .await
            .map_err(|e| AppError::Validation(format!("Upload read error: {e}")))?
        {
            total_size += chunk.len() as u64;
            if total_size > max_size {
                return Err(AppError::Validation(format!(
                    "Image exceeds maximum size of {max_size} bytes"
                )));
            }
            temp_file
                .write_all(&chunk)
                .await
                .map_err(|e| AppError::Internal(format!("Temp file write failed: {e}")))?;
        }

        temp_file
            .flush()
            .await
            .map_err(|e| AppError::Internal(format!("Temp file flush failed: {e}")))
    }
    .await;

    if let Err(e) = result {
        let _ = tokio::fs::remove_file(&temp_path).await;
        return Err(e);
    }
    Ok(temp_path)
}
