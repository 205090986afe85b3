use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::config::AppConfig;
use crate::handlers;
use crate::state::AppState;

pub fn routes(config: &AppConfig) -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .nest("/recipes", recipe_routes())
        .nest("/categories", category_routes())
        .nest("/ingredients", ingredient_routes())
        .nest("/images", image_routes(config.storage.max_blob_size))
}

fn recipe_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(
            handlers::recipe::create_recipe,
            handlers::recipe::list_recipes
        ))
        .routes(routes!(
            handlers::recipe::get_recipe,
            handlers::recipe::update_recipe,
            handlers::recipe::delete_recipe
        ))
}

fn category_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(
            handlers::category::create_category,
            handlers::category::list_categories
        ))
        .routes(routes!(
            handlers::category::get_category,
            handlers::category::update_category,
            handlers::category::delete_category
        ))
}

fn ingredient_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(
            handlers::ingredient::create_ingredient,
            handlers::ingredient::list_ingredients
        ))
        .routes(routes!(
            handlers::ingredient::get_ingredient,
            handlers::ingredient::update_ingredient,
            handlers::ingredient::delete_ingredient
        ))
}

fn image_routes(max_blob_size: u64) -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(
            handlers::image::upload_image,
            handlers::image::list_images
        ))
        .routes(routes!(
            handlers::image::get_image,
            handlers::image::delete_image
        ))
        .layer(handlers::image::image_upload_body_limit(max_blob_size))
}
