use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use tracing::instrument;

use crate::error::{AppError, ErrorBody};
use crate::extractors::json::AppJson;
use crate::models::recipe::*;
use crate::state::AppState;

#[utoipa::path(
    post,
    path = "/",
    tag = "Recipes",
    operation_id = "createRecipe",
    summary = "Create a recipe with its ingredients",
    description = "Stores the recipe and all of its ingredient lines in one transaction and returns the stored recipe with its category and ingredients resolved. Returns 409 CONFLICT when the category or an ingredient does not exist.",
    request_body = RecipeRequest,
    responses(
        (status = 201, description = "Recipe created", body = RecipeResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 409, description = "Unknown category or ingredient (CONFLICT)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload), fields(title = %payload.title))]
pub async fn create_recipe(
    State(state): State<AppState>,
    AppJson(payload): AppJson<RecipeRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_recipe(&payload)?;

    let (recipe, lines) = payload.into_parts(String::new());
    let aggregate = state
        .services
        .recipes
        .create_with_ingredients(recipe, lines)
        .await?;

    Ok((StatusCode::CREATED, Json(RecipeResponse::from(aggregate))))
}

#[utoipa::path(
    get,
    path = "/",
    tag = "Recipes",
    operation_id = "listRecipes",
    summary = "List recipes",
    description = "Returns recipes newest first. `search` matches the title or any ingredient name, ignoring case; `category_id` restricts the list to one category. Each recipe appears once.",
    params(RecipeListQuery),
    responses(
        (status = 200, description = "List of recipes", body = Vec<RecipeResponse>),
    ),
)]
#[instrument(skip(state, query))]
pub async fn list_recipes(
    State(state): State<AppState>,
    Query(query): Query<RecipeListQuery>,
) -> Result<Json<Vec<RecipeResponse>>, AppError> {
    let recipes = state
        .services
        .recipes
        .get_all(query.search.as_deref(), query.category_id.as_deref())
        .await?;

    Ok(Json(recipes.into_iter().map(RecipeResponse::from).collect()))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Recipes",
    operation_id = "getRecipe",
    summary = "Get a recipe by ID",
    params(("id" = String, Path, description = "Recipe ID")),
    responses(
        (status = 200, description = "Recipe details", body = RecipeResponse),
        (status = 404, description = "Recipe not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state), fields(id))]
pub async fn get_recipe(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<RecipeResponse>, AppError> {
    let aggregate = state.services.recipes.get_by_id(&id).await?;
    Ok(Json(aggregate.into()))
}

#[utoipa::path(
    put,
    path = "/{id}",
    tag = "Recipes",
    operation_id = "updateRecipe",
    summary = "Replace a recipe and its ingredients",
    description = "Overwrites every recipe field and replaces the whole ingredient list; an empty `ingredients` array removes all of them. The creation timestamp is kept.",
    params(("id" = String, Path, description = "Recipe ID")),
    request_body = RecipeRequest,
    responses(
        (status = 204, description = "Recipe updated"),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 404, description = "Recipe not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Unknown category or ingredient (CONFLICT)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload), fields(id))]
pub async fn update_recipe(
    State(state): State<AppState>,
    Path(id): Path<String>,
    AppJson(payload): AppJson<RecipeRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_recipe(&payload)?;

    let (recipe, lines) = payload.into_parts(id);
    state
        .services
        .recipes
        .update_with_ingredients(recipe, lines)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Recipes",
    operation_id = "deleteRecipe",
    summary = "Delete a recipe",
    description = "Deletes the recipe together with its ingredient lines.",
    params(("id" = String, Path, description = "Recipe ID")),
    responses(
        (status = 204, description = "Recipe deleted"),
        (status = 404, description = "Recipe not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state), fields(id))]
pub async fn delete_recipe(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    state.services.recipes.delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
