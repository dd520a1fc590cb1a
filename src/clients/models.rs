use crate::activity;
use crate::clients::contacts::models::ClientContact;
use crate::common::errors::BusinessError;
use crate::common::validation::validate_name;
use crate::farms::models::FarmSummary;
use crate::services::area_service;
use chrono::{DateTime, Utc};
use crudcrate::{CRUDResource, EntityToModels, traits::MergeIntoActiveModel};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveModelTrait, IntoActiveModel, QueryOrder, QuerySelect};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, EntityToModels)]
#[sea_orm(table_name = "clients")]
#[crudcrate(
    generate_router,
    api_struct = "Client",
    name_singular = "client",
    name_plural = "clients",
    description = "Clients are the top level of the hierarchy. A client owns farms, which own parcels; the client's area is the sum of all of its parcels.",
    fn_get_one = get_one_client,
    fn_get_all = get_all_clients,
    fn_create = create_client,
    fn_update = update_client,
)]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    #[crudcrate(primary_key, update_model = false, create_model = false, on_create = Uuid::new_v4())]
    pub id: Uuid,
    #[crudcrate(sortable, filterable)]
    pub name: String,
    #[crudcrate(update_model = false, create_model = false, on_create = chrono::Utc::now(), sortable)]
    pub created_at: DateTime<Utc>,
    #[crudcrate(update_model = false, create_model = false, on_update = chrono::Utc::now(), on_create = chrono::Utc::now(), sortable)]
    pub last_updated: DateTime<Utc>,
    #[sea_orm(ignore)]
    #[crudcrate(non_db_attr = true, default = None, create_model = false, update_model = false)]
    pub area_hectares: Option<Decimal>,
    #[sea_orm(ignore)]
    #[crudcrate(non_db_attr = true, default = None, list_model = false, create_model = false, update_model = false)]
    pub farms: Option<Vec<FarmSummary>>,
    #[sea_orm(ignore)]
    #[crudcrate(non_db_attr = true, default = None, list_model = false, create_model = false, update_model = false)]
    pub contacts: Option<Vec<ClientContact>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "crate::farms::models::Entity")]
    Farms,
    #[sea_orm(has_many = "crate::clients::contacts::models::Entity")]
    Contacts,
    #[sea_orm(has_many = "crate::treatments::models::Entity")]
    Treatments,
}

impl Related<crate::farms::models::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Farms.def()
    }
}

impl Related<crate::clients::contacts::models::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Contacts.def()
    }
}

impl Related<crate::treatments::models::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Treatments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Area failures surface as `DbErr` inside crudcrate handlers
async fn area_or_db_err(db: &DatabaseConnection, id: Uuid) -> Result<Decimal, DbErr> {
    area_service::client_area(db, id)
        .await
        .map_err(|e| DbErr::Custom(e.to_string()))
}

/// Loads farms (with their areas), contacts ordered by name, and the total area
async fn get_one_client(db: &DatabaseConnection, id: Uuid) -> Result<Client, DbErr> {
    let model = Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| DbErr::RecordNotFound(format!("Client with id '{id}' not found")))?;

    let farm_models = model
        .find_related(crate::farms::models::Entity)
        .order_by_asc(crate::farms::models::Column::Name)
        .all(db)
        .await?;

    let mut farms = Vec::with_capacity(farm_models.len());
    for farm in farm_models {
        let area = area_service::farm_area(db, farm.id)
            .await
            .map_err(|e| DbErr::Custom(e.to_string()))?;
        farms.push(FarmSummary::from_model(farm, area));
    }

    let contacts = model
        .find_related(crate::clients::contacts::models::Entity)
        .order_by_asc(crate::clients::contacts::models::Column::Name)
        .all(db)
        .await?;

    let mut client: Client = model.into();
    client.area_hectares = Some(area_or_db_err(db, id).await?);
    client.farms = Some(farms);
    client.contacts = Some(contacts.into_iter().map(Into::into).collect());

    Ok(client)
}

async fn get_all_clients(
    db: &DatabaseConnection,
    condition: &sea_orm::Condition,
    order_column: Column,
    order_direction: sea_orm::Order,
    offset: u64,
    limit: u64,
) -> Result<Vec<ClientList>, DbErr> {
    let models = Entity::find()
        .filter(condition.clone())
        .order_by(order_column, order_direction)
        .offset(offset)
        .limit(limit)
        .all(db)
        .await?;

    let mut clients = Vec::with_capacity(models.len());
    for model in models {
        let area = area_or_db_err(db, model.id).await?;
        let mut client = ClientList::from(model);
        client.area_hectares = Some(area);
        clients.push(client);
    }

    Ok(clients)
}

async fn create_client(
    db: &DatabaseConnection,
    create_data: ClientCreate,
) -> Result<Client, DbErr> {
    let mut create_data = create_data;
    create_data.name = validate_name(&create_data.name).map_err(BusinessError::into_db_err)?;

    let active_model: ActiveModel = create_data.into();
    let inserted = active_model.insert(db).await?;
    activity::services::record(
        db,
        activity::services::client_created(inserted.id, &inserted.name),
    )
    .await;

    get_one_client(db, inserted.id).await
}

async fn update_client(
    db: &DatabaseConnection,
    id: Uuid,
    update_data: ClientUpdate,
) -> Result<Client, DbErr> {
    let mut update_data = update_data;
    if let Some(name) = update_data.name.take() {
        let name = validate_name(name.as_deref().unwrap_or_default())
            .map_err(BusinessError::into_db_err)?;
        update_data.name = Some(Some(name));
    }

    let existing = Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| DbErr::RecordNotFound(format!("Client with id '{id}' not found")))?;
    update_data
        .merge_into_activemodel(existing.into_active_model())?
        .update(db)
        .await?;

    get_one_client(db, id).await
}

#[derive(serde::Serialize, serde::Deserialize, utoipa::ToSchema, Debug, Clone)]
pub struct ClientArea {
    pub client_id: Uuid,
    pub area_hectares: Decimal,
}
