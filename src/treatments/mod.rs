pub mod communications;
pub mod models;
pub mod parcels;
pub mod products;
pub mod scope;
pub mod services;
pub mod status;
pub mod views;
pub mod workflow;
