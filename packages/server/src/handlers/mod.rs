pub mod category;
pub mod health;
pub mod image;
pub mod ingredient;
pub mod metrics;
pub mod recipe;
