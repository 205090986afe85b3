//! Query building for the catalog tables. Every repository borrows a
//! connection, which may be the pool or an open transaction.

pub mod category;
pub mod image;
pub mod ingredient;
pub mod recipe;

pub use category::CategoryRepository;
pub use image::ImageRepository;
pub use ingredient::IngredientRepository;
pub use recipe::RecipeRepository;
