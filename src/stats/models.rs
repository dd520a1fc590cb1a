use crate::treatments::workflow::StatusSummary;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Row counts per resource and the hectares of every parcel, computed on request
#[derive(ToSchema, Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct DatabaseStats {
    pub clients: u64,
    pub farms: u64,
    pub parcels: u64,
    pub contractors: u64,
    pub contacts: u64,
    pub products: u64,
    pub active_ingredients: u64,
    pub total_area_hectares: Decimal,
    pub treatments: StatusSummary,
}
