use chrono::{DateTime, Utc};
use crudcrate::{CRUDResource, EntityToModels};
use sea_orm::entity::prelude::*;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, utoipa::ToSchema, serde::Serialize, serde::Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(30))")]
#[serde(rename_all = "snake_case")]
pub enum ActivityType {
    #[sea_orm(string_value = "client_created")]
    ClientCreated,
    #[sea_orm(string_value = "farm_created")]
    FarmCreated,
    #[sea_orm(string_value = "parcel_created")]
    ParcelCreated,
    #[sea_orm(string_value = "product_created")]
    ProductCreated,
    #[sea_orm(string_value = "contractor_created")]
    ContractorCreated,
    #[sea_orm(string_value = "contact_created")]
    ContactCreated,
    #[sea_orm(string_value = "treatment_created")]
    TreatmentCreated,
    #[sea_orm(string_value = "treatment_updated")]
    TreatmentUpdated,
    #[sea_orm(string_value = "communication_sent")]
    CommunicationSent,
}

/// One line of the activity feed. Rows are written by the services that
/// perform the action and are never edited afterwards.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, EntityToModels)]
#[sea_orm(table_name = "activity_log")]
#[crudcrate(
    api_struct = "ActivityEntry",
    name_singular = "activity",
    name_plural = "activity",
    description = "Read-only feed of what happened in the system: records created, treatments updated and communications sent. Newest first unless another sort is requested."
)]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    #[crudcrate(primary_key, update_model = false, create_model = false, on_create = Uuid::new_v4())]
    pub id: Uuid,
    #[crudcrate(sortable, filterable, enum_field)]
    pub activity_type: ActivityType,
    #[crudcrate(filterable)]
    pub title: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    #[crudcrate(sortable, filterable)]
    pub related_object_type: Option<String>,
    #[crudcrate(filterable)]
    pub related_object_id: Option<Uuid>,
    pub related_object_name: Option<String>,
    pub extra_data: Json,
    #[crudcrate(update_model = false, create_model = false, on_create = chrono::Utc::now(), sortable)]
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
