use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use tracing::instrument;

use crate::error::{AppError, ErrorBody};
use crate::extractors::json::AppJson;
use crate::models::ingredient::*;
use crate::models::shared::non_blank;
use crate::state::AppState;

#[utoipa::path(
    post,
    path = "/",
    tag = "Ingredients",
    operation_id = "createIngredient",
    summary = "Create or refresh an ingredient",
    description = "Creates an ingredient, or updates the image of the existing ingredient with the same name.",
    request_body = IngredientRequest,
    responses(
        (status = 201, description = "Ingredient stored", body = IngredientResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload), fields(name = %payload.name))]
pub async fn create_ingredient(
    State(state): State<AppState>,
    AppJson(payload): AppJson<IngredientRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_ingredient(&payload)?;

    let ingredient = state
        .services
        .ingredients
        .create(&payload.name, non_blank(payload.image_url))
        .await?;

    Ok((StatusCode::CREATED, Json(IngredientResponse::from(ingredient))))
}

#[utoipa::path(
    get,
    path = "/",
    tag = "Ingredients",
    operation_id = "listIngredients",
    summary = "List ingredients by name",
    responses(
        (status = 200, description = "List of ingredients", body = Vec<IngredientResponse>),
    ),
)]
pub async fn list_ingredients(
    State(state): State<AppState>,
) -> Result<Json<Vec<IngredientResponse>>, AppError> {
    let ingredients = state.services.ingredients.list().await?;
    Ok(Json(ingredients.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Ingredients",
    operation_id = "getIngredient",
    summary = "Get an ingredient by ID",
    params(("id" = String, Path, description = "Ingredient ID")),
    responses(
        (status = 200, description = "Ingredient details", body = IngredientResponse),
        (status = 404, description = "Ingredient not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state), fields(id))]
pub async fn get_ingredient(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<IngredientResponse>, AppError> {
    let ingredient = state.services.ingredients.get(&id).await?;
    Ok(Json(ingredient.into()))
}

#[utoipa::path(
    put,
    path = "/{id}",
    tag = "Ingredients",
    operation_id = "updateIngredient",
    summary = "Update an ingredient",
    params(("id" = String, Path, description = "Ingredient ID")),
    request_body = IngredientRequest,
    responses(
        (status = 200, description = "Ingredient updated", body = IngredientResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 404, description = "Ingredient not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Name already taken (CONFLICT)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload), fields(id))]
pub async fn update_ingredient(
    State(state): State<AppState>,
    Path(id): Path<String>,
    AppJson(payload): AppJson<IngredientRequest>,
) -> Result<Json<IngredientResponse>, AppError> {
    validate_ingredient(&payload)?;

    let ingredient = state
        .services
        .ingredients
        .update(&id, &payload.name, non_blank(payload.image_url))
        .await?;

    Ok(Json(ingredient.into()))
}

#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Ingredients",
    operation_id = "deleteIngredient",
    summary = "Delete an ingredient",
    description = "Returns 409 CONFLICT while any recipe still lists the ingredient.",
    params(("id" = String, Path, description = "Ingredient ID")),
    responses(
        (status = 204, description = "Ingredient deleted"),
        (status = 404, description = "Ingredient not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Ingredient still in use (CONFLICT)", body = ErrorBody),
    ),
)]
#[instrument(skip(state), fields(id))]
pub async fn delete_ingredient(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    state.services.ingredients.delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
