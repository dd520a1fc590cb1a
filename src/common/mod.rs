pub mod errors;
pub mod models;
pub mod state;
pub mod validation;
pub mod views;

#[cfg(test)]
mod tests;
