use sea_orm::entity::prelude::*;

/// Membership of a parcel in a parcel-set treatment; `position` keeps the
/// order in which parcels were given
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "treatment_parcels")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub treatment_id: Uuid,
    #[sea_orm(primary_key, auto_increment = false)]
    pub parcel_id: Uuid,
    pub position: i32,
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
    #[sea_orm(
        belongs_to = "crate::parcels::models::Entity",
        from = "Column::ParcelId",
        to = "crate::parcels::models::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Parcels,
}

impl Related<crate::treatments::models::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Treatments.def()
    }
}

impl Related<crate::parcels::models::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Parcels.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
