pub mod active_ingredient_links;
pub mod active_ingredients;
pub mod models;
pub mod views;
