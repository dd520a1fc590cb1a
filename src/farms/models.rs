use crate::parcels::models::Parcel;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "farms")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    pub client_id: Uuid,
    pub contractor_id: Option<Uuid>,
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
        belongs_to = "crate::contractors::models::Entity",
        from = "Column::ContractorId",
        to = "crate::contractors::models::Column::Id",
        on_update = "NoAction",
        on_delete = "SetNull"
    )]
    Contractors,
    #[sea_orm(has_many = "crate::parcels::models::Entity")]
    Parcels,
    #[sea_orm(has_many = "crate::treatments::models::Entity")]
    Treatments,
}

impl Related<crate::clients::models::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Clients.def()
    }
}

impl Related<crate::contractors::models::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Contractors.def()
    }
}

impl Related<crate::parcels::models::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Parcels.def()
    }
}

impl Related<crate::treatments::models::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Treatments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Farm as embedded in a client
#[derive(ToSchema, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct FarmSummary {
    pub id: Uuid,
    pub name: String,
    pub contractor_id: Option<Uuid>,
    pub area_hectares: Decimal,
}

impl FarmSummary {
    pub fn from_model(model: Model, area_hectares: Decimal) -> Self {
        Self {
            id: model.id,
            name: model.name,
            contractor_id: model.contractor_id,
            area_hectares,
        }
    }
}

#[derive(ToSchema, Serialize, Deserialize, Debug, Clone)]
pub struct Farm {
    pub id: Uuid,
    pub name: String,
    pub client_id: Uuid,
    pub contractor_id: Option<Uuid>,
    pub contractor_name: Option<String>,
    pub area_hectares: Decimal,
    pub created_at: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
    /// Only present on the detail endpoint
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parcels: Option<Vec<Parcel>>,
}

#[derive(ToSchema, Deserialize, Debug, Clone)]
pub struct FarmCreate {
    pub name: String,
    pub client_id: Uuid,
    #[serde(default)]
    pub contractor_id: Option<Uuid>,
}

/// Partial update; the owning client cannot change. Send
/// `"contractor_id": null` to unassign the contractor.
#[derive(ToSchema, Deserialize, Debug, Clone, Default)]
pub struct FarmUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<Uuid>)]
    pub contractor_id: Option<Option<Uuid>>,
}

#[derive(Deserialize, IntoParams, Debug, Default)]
#[into_params(parameter_in = Query)]
pub struct FarmQuery {
    pub client_id: Option<Uuid>,
    pub contractor_id: Option<Uuid>,
}

#[derive(ToSchema, Serialize, Deserialize, Debug, Clone)]
pub struct FarmArea {
    pub farm_id: Uuid,
    pub area_hectares: Decimal,
}
