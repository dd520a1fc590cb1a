use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// One delivery attempt for one treatment, successful or not
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "treatment_communications")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub treatment_id: Uuid,
    pub sent_at: DateTime<Utc>,
    #[sea_orm(column_type = "Text")]
    pub recipients: String,
    pub subject: String,
    pub attachment_name: Option<String>,
    pub delivered: bool,
    #[sea_orm(column_type = "Text", nullable)]
    pub error: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "crate::treatments::models::Entity",
        from = "Column::TreatmentId",
        to = "crate::treatments::models::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Treatments,
}

impl Related<crate::treatments::models::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Treatments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[derive(ToSchema, Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct TreatmentCommunication {
    pub id: Uuid,
    pub treatment_id: Uuid,
    pub sent_at: DateTime<Utc>,
    pub recipients: Vec<String>,
    pub subject: String,
    pub attachment_name: Option<String>,
    pub delivered: bool,
    pub error: Option<String>,
}

impl From<Model> for TreatmentCommunication {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            treatment_id: model.treatment_id,
            sent_at: model.sent_at,
            recipients: model
                .recipients
                .split(',')
                .map(str::trim)
                .filter(|r| !r.is_empty())
                .map(str::to_string)
                .collect(),
            subject: model.subject,
            attachment_name: model.attachment_name,
            delivered: model.delivered,
            error: model.error,
        }
    }
}
