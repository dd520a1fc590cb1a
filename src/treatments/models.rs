use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "treatments")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub client_id: Uuid,
    pub farm_id: Option<Uuid>,
    pub scope_level: ScopeLevel,
    pub status: TreatmentStatus,
    #[sea_orm(column_type = "Text")]
    pub notes: String,
    pub planned_date: Option<NaiveDate>,
    pub communicated_at: Option<DateTime<Utc>>,
    pub executed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "crate::clients::models::Entity",
        from = "Column::ClientId",
        to = "crate::clients::models::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Clients,
    #[sea_orm(
        belongs_to = "crate::farms::models::Entity",
        from = "Column::FarmId",
        to = "crate::farms::models::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Farms,
    #[sea_orm(has_many = "crate::treatments::parcels::models::Entity")]
    Parcels,
    #[sea_orm(has_many = "crate::treatments::products::models::Entity")]
    Products,
    #[sea_orm(has_many = "crate::treatments::communications::models::Entity")]
    Communications,
}

impl Related<crate::clients::models::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Clients.def()
    }
}

impl Related<crate::farms::models::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Farms.def()
    }
}

impl Related<crate::treatments::parcels::models::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Parcels.def()
    }
}

impl Related<crate::treatments::products::models::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Products.def()
    }
}

impl Related<crate::treatments::communications::models::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Communications.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Which node of the client → farm → parcel tree a treatment applies to
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, ToSchema, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "snake_case")]
pub enum ScopeLevel {
    #[sea_orm(string_value = "client")]
    Client,
    #[sea_orm(string_value = "farm")]
    Farm,
    #[sea_orm(string_value = "parcels")]
    Parcels,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, ToSchema, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "snake_case")]
pub enum TreatmentStatus {
    #[sea_orm(string_value = "scheduled")]
    Scheduled,
    #[sea_orm(string_value = "communicated")]
    Communicated,
    #[sea_orm(string_value = "in_execution")]
    InExecution,
    #[sea_orm(string_value = "completed")]
    Completed,
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
}

#[derive(ToSchema, Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ProductDosage {
    pub product_id: Uuid,
    pub dosage_per_hectare: Decimal,
}

#[derive(ToSchema, Deserialize, Debug, Clone)]
pub struct TreatmentCreate {
    pub scope_level: ScopeLevel,
    pub client_id: Uuid,
    #[serde(default)]
    pub farm_id: Option<Uuid>,
    /// Required (non-empty) for `parcels` scope, must be empty otherwise
    #[serde(default)]
    pub parcel_ids: Vec<Uuid>,
    #[serde(default)]
    pub products: Vec<ProductDosage>,
    #[serde(default)]
    pub planned_date: Option<NaiveDate>,
    #[serde(default)]
    pub notes: String,
}

/// Only notes and the planned date are editable; status has its own endpoint
#[derive(ToSchema, Deserialize, Debug, Clone, Default)]
pub struct TreatmentUpdate {
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<NaiveDate>)]
    pub planned_date: Option<Option<NaiveDate>>,
}

#[derive(ToSchema, Deserialize, Debug, Clone)]
pub struct StatusChange {
    pub status: TreatmentStatus,
}

#[derive(ToSchema, Deserialize, Debug, Clone)]
pub struct DosageChange {
    pub dosage_per_hectare: Decimal,
}

#[derive(Deserialize, IntoParams, Debug, Default)]
#[into_params(parameter_in = Query)]
pub struct TreatmentQuery {
    pub status: Option<TreatmentStatus>,
    pub client_id: Option<Uuid>,
}

/// Row of the treatment list
#[derive(ToSchema, Serialize, Deserialize, Debug, Clone)]
pub struct TreatmentSummary {
    pub id: Uuid,
    pub client_id: Uuid,
    pub client_name: String,
    pub scope_level: ScopeLevel,
    pub farm_id: Option<Uuid>,
    pub parcel_ids: Vec<Uuid>,
    pub status: TreatmentStatus,
    pub notes: String,
    pub planned_date: Option<NaiveDate>,
    pub communicated_at: Option<DateTime<Utc>>,
    pub executed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
}

#[derive(ToSchema, Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct TreatmentParcel {
    pub id: Uuid,
    pub name: String,
    pub farm_id: Uuid,
    pub area_hectares: Decimal,
}

#[derive(ToSchema, Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ResponsibleContractor {
    pub id: Uuid,
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
}

impl From<crate::contractors::models::Model> for ResponsibleContractor {
    fn from(model: crate::contractors::models::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            phone: model.phone,
            email: model.email,
        }
    }
}

/// A product of a treatment with the quantity it needs over the treated area
#[derive(ToSchema, Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct TreatmentProductLine {
    pub id: Uuid,
    pub product_id: Uuid,
    pub product_name: String,
    pub unit_of_measure: String,
    pub dosage_per_hectare: Decimal,
    /// Full precision
    pub total_quantity: Decimal,
    /// Rounded to two decimals, with unit
    pub total_quantity_display: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug, Clone)]
pub struct Treatment {
    pub id: Uuid,
    pub client_id: Uuid,
    pub client_name: String,
    pub scope_level: ScopeLevel,
    pub farm_id: Option<Uuid>,
    pub farm_name: Option<String>,
    pub parcels: Vec<TreatmentParcel>,
    pub status: TreatmentStatus,
    pub notes: String,
    pub planned_date: Option<NaiveDate>,
    pub communicated_at: Option<DateTime<Utc>>,
    pub executed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
    pub interested_area_hectares: Decimal,
    pub contractor: Option<ResponsibleContractor>,
    pub products: Vec<TreatmentProductLine>,
}

#[derive(ToSchema, Serialize, Deserialize, Debug, Clone)]
pub struct TreatmentArea {
    pub treatment_id: Uuid,
    pub scope_level: ScopeLevel,
    pub area_hectares: Decimal,
}
