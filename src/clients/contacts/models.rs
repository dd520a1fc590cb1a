use crate::activity;
use crate::common::errors::BusinessError;
use crate::common::validation::{validate_email, validate_name};
use chrono::{DateTime, Utc};
use crudcrate::{CRUDResource, EntityToModels, traits::MergeIntoActiveModel};
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveModelTrait, IntoActiveModel};

/// Address that receives treatment communications on behalf of a client
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, EntityToModels)]
#[sea_orm(table_name = "client_contacts")]
#[crudcrate(
    generate_router,
    api_struct = "ClientContact",
    name_singular = "contact",
    name_plural = "contacts",
    description = "E-mail contacts of a client. Every contact receives the communications of the client's treatments.",
    fn_create = create_contact,
    fn_update = update_contact,
)]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    #[crudcrate(primary_key, update_model = false, create_model = false, on_create = Uuid::new_v4())]
    pub id: Uuid,
    #[crudcrate(sortable, filterable)]
    pub client_id: Uuid,
    #[crudcrate(sortable, filterable)]
    pub name: String,
    #[crudcrate(sortable, filterable)]
    pub email: String,
    #[crudcrate(update_model = false, create_model = false, on_create = chrono::Utc::now(), sortable)]
    pub created_at: DateTime<Utc>,
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
}

impl Related<crate::clients::models::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Clients.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

async fn create_contact(
    db: &DatabaseConnection,
    create_data: ClientContactCreate,
) -> Result<ClientContact, DbErr> {
    let mut create_data = create_data;
    create_data.name = validate_name(&create_data.name).map_err(BusinessError::into_db_err)?;
    create_data.email = validate_email(&create_data.email).map_err(BusinessError::into_db_err)?;

    let active_model: ActiveModel = create_data.into();
    let inserted = active_model.insert(db).await?;
    activity::services::record(
        db,
        activity::services::contact_created(
            inserted.id,
            &inserted.name,
            &inserted.email,
            inserted.client_id,
        ),
    )
    .await;

    Ok(inserted.into())
}

async fn update_contact(
    db: &DatabaseConnection,
    id: Uuid,
    update_data: ClientContactUpdate,
) -> Result<ClientContact, DbErr> {
    let mut update_data = update_data;
    if let Some(name) = update_data.name.take() {
        let name = validate_name(name.as_deref().unwrap_or_default())
            .map_err(BusinessError::into_db_err)?;
        update_data.name = Some(Some(name));
    }
    if let Some(email) = update_data.email.take() {
        let email = validate_email(email.as_deref().unwrap_or_default())
            .map_err(BusinessError::into_db_err)?;
        update_data.email = Some(Some(email));
    }

    let existing = Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| DbErr::RecordNotFound(format!("Contact with id '{id}' not found")))?;

    let updated = update_data
        .merge_into_activemodel(existing.into_active_model())?
        .update(db)
        .await?;
    Ok(updated.into())
}
