use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// Smallest land unit; carries the authoritative area figure
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "parcels")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    pub farm_id: Uuid,
    #[sea_orm(column_type = "Decimal(Some((10, 2)))")]
    pub area_hectares: Decimal,
    pub created_at: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "crate::farms::models::Entity",
        from = "Column::FarmId",
        to = "crate::farms::models::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Farms,
}

impl Related<crate::farms::models::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Farms.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[derive(ToSchema, Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Parcel {
    pub id: Uuid,
    pub name: String,
    pub farm_id: Uuid,
    pub area_hectares: Decimal,
    pub created_at: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
}

impl From<Model> for Parcel {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            farm_id: model.farm_id,
            area_hectares: model.area_hectares,
            created_at: model.created_at,
            last_updated: model.last_updated,
        }
    }
}

#[derive(ToSchema, Deserialize, Debug, Clone)]
pub struct ParcelCreate {
    pub name: String,
    pub farm_id: Uuid,
    pub area_hectares: Decimal,
}

/// A parcel cannot be moved to another farm
#[derive(ToSchema, Deserialize, Debug, Clone, Default)]
pub struct ParcelUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub area_hectares: Option<Decimal>,
}

#[derive(Deserialize, IntoParams, Debug, Default)]
#[into_params(parameter_in = Query)]
pub struct ParcelQuery {
    pub farm_id: Option<Uuid>,
}
