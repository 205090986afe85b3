pub mod category;
pub mod image;
pub mod ingredient;
pub mod recipe;
pub mod shared;
