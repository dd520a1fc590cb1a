use crate::activity;
use crate::common::errors::BusinessError;
use crate::common::validation::{validate_name, validate_optional_email};
use chrono::{DateTime, Utc};
use crudcrate::{CRUDResource, EntityToModels, traits::MergeIntoActiveModel};
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveModelTrait, IntoActiveModel, QueryOrder, QuerySelect};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, EntityToModels)]
#[sea_orm(table_name = "contractors")]
#[crudcrate(
    generate_router,
    api_struct = "Contractor",
    name_singular = "contractor",
    name_plural = "contractors",
    description = "Contractors are external service providers that carry out treatments. A contractor can be assigned to many farms; deleting it leaves the farms unassigned.",
    fn_get_one = get_one_contractor,
    fn_get_all = get_all_contractors,
    fn_create = create_contractor,
    fn_update = update_contractor,
)]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    #[crudcrate(primary_key, update_model = false, create_model = false, on_create = Uuid::new_v4())]
    pub id: Uuid,
    #[crudcrate(sortable, filterable)]
    pub name: String,
    #[crudcrate(filterable)]
    pub phone: Option<String>,
    #[crudcrate(sortable, filterable)]
    pub email: Option<String>,
    #[crudcrate(update_model = false, create_model = false, on_create = chrono::Utc::now(), sortable)]
    pub created_at: DateTime<Utc>,
    #[crudcrate(update_model = false, create_model = false, on_update = chrono::Utc::now(), on_create = chrono::Utc::now(), sortable)]
    pub last_updated: DateTime<Utc>,
    #[sea_orm(ignore)]
    #[crudcrate(non_db_attr = true, default = 0, create_model = false, update_model = false)]
    pub farm_count: u64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "crate::farms::models::Entity")]
    Farms,
}

impl Related<crate::farms::models::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Farms.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

async fn count_farms(db: &DatabaseConnection, contractor_id: Uuid) -> Result<u64, DbErr> {
    crate::farms::models::Entity::find()
        .filter(crate::farms::models::Column::ContractorId.eq(contractor_id))
        .count(db)
        .await
}

async fn get_one_contractor(db: &DatabaseConnection, id: Uuid) -> Result<Contractor, DbErr> {
    let model = Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| DbErr::RecordNotFound(format!("Contractor with id '{id}' not found")))?;

    let mut contractor: Contractor = model.into();
    contractor.farm_count = count_farms(db, id).await?;
    Ok(contractor)
}

async fn get_all_contractors(
    db: &DatabaseConnection,
    condition: &sea_orm::Condition,
    order_column: Column,
    order_direction: sea_orm::Order,
    offset: u64,
    limit: u64,
) -> Result<Vec<ContractorList>, DbErr> {
    let models = Entity::find()
        .filter(condition.clone())
        .order_by(order_column, order_direction)
        .offset(offset)
        .limit(limit)
        .all(db)
        .await?;

    let mut contractors = Vec::with_capacity(models.len());
    for model in models {
        let farm_count = count_farms(db, model.id).await?;
        let mut contractor = ContractorList::from(model);
        contractor.farm_count = farm_count;
        contractors.push(contractor);
    }

    Ok(contractors)
}

/// Names must not be blank. The e-mail receives treatment communications,
/// so a present address must be well formed; a blank one is stored as null.
async fn create_contractor(
    db: &DatabaseConnection,
    create_data: ContractorCreate,
) -> Result<Contractor, DbErr> {
    let mut create_data = create_data;
    create_data.name = validate_name(&create_data.name).map_err(BusinessError::into_db_err)?;
    create_data.email = validate_optional_email(create_data.email.as_deref())
        .map_err(BusinessError::into_db_err)?;

    let active_model: ActiveModel = create_data.into();
    let inserted = active_model.insert(db).await?;
    activity::services::record(
        db,
        activity::services::contractor_created(
            inserted.id,
            &inserted.name,
            inserted.email.as_deref(),
        ),
    )
    .await;

    get_one_contractor(db, inserted.id).await
}

async fn update_contractor(
    db: &DatabaseConnection,
    id: Uuid,
    update_data: ContractorUpdate,
) -> Result<Contractor, DbErr> {
    let mut update_data = update_data;
    if let Some(name) = update_data.name.take() {
        let name = validate_name(name.as_deref().unwrap_or_default())
            .map_err(BusinessError::into_db_err)?;
        update_data.name = Some(Some(name));
    }
    if let Some(email) = update_data.email.take() {
        let email =
            validate_optional_email(email.as_deref()).map_err(BusinessError::into_db_err)?;
        update_data.email = Some(email);
    }

    let existing = Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| DbErr::RecordNotFound(format!("Contractor with id '{id}' not found")))?;
    update_data
        .merge_into_activemodel(existing.into_active_model())?
        .update(db)
        .await?;

    get_one_contractor(db, id).await
}
