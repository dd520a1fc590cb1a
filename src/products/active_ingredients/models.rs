use crate::common::errors::BusinessError;
use crate::common::validation::validate_name;
use chrono::{DateTime, Utc};
use crudcrate::{CRUDResource, EntityToModels, traits::MergeIntoActiveModel};
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveModelTrait, IntoActiveModel};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, EntityToModels)]
#[sea_orm(table_name = "active_ingredients")]
#[crudcrate(
    generate_router,
    api_struct = "ActiveIngredient",
    name_singular = "active_ingredient",
    name_plural = "active_ingredients",
    description = "Active ingredients (unique by name) contained in phytosanitary products.",
    fn_create = create_active_ingredient,
    fn_update = update_active_ingredient,
)]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    #[crudcrate(primary_key, update_model = false, create_model = false, on_create = Uuid::new_v4())]
    pub id: Uuid,
    #[sea_orm(unique)]
    #[crudcrate(sortable, filterable)]
    pub name: String,
    #[sea_orm(column_type = "Text", nullable)]
    #[crudcrate(filterable)]
    pub description: Option<String>,
    #[crudcrate(update_model = false, create_model = false, on_create = chrono::Utc::now(), sortable)]
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "crate::products::active_ingredient_links::Entity")]
    ProductLinks,
}

impl Related<crate::products::active_ingredient_links::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ProductLinks.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

async fn create_active_ingredient(
    db: &DatabaseConnection,
    create_data: ActiveIngredientCreate,
) -> Result<ActiveIngredient, DbErr> {
    let mut create_data = create_data;
    create_data.name = validate_name(&create_data.name).map_err(BusinessError::into_db_err)?;
    let active_model: ActiveModel = create_data.into();
    Ok(active_model.insert(db).await?.into())
}

async fn update_active_ingredient(
    db: &DatabaseConnection,
    id: Uuid,
    update_data: ActiveIngredientUpdate,
) -> Result<ActiveIngredient, DbErr> {
    let mut update_data = update_data;
    if let Some(name) = update_data.name.take() {
        let name = validate_name(name.as_deref().unwrap_or_default())
            .map_err(BusinessError::into_db_err)?;
        update_data.name = Some(Some(name));
    }

    let existing = Entity::find_by_id(id).one(db).await?.ok_or_else(|| {
        DbErr::RecordNotFound(format!("Active ingredient with id '{id}' not found"))
    })?;
    let updated = update_data
        .merge_into_activemodel(existing.into_active_model())?
        .update(db)
        .await?;
    Ok(updated.into())
}
