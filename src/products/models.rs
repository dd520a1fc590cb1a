use crate::activity;
use crate::common::errors::BusinessError;
use crate::common::validation::validate_name;
use crate::products::{active_ingredient_links, active_ingredients};
use chrono::{DateTime, Utc};
use crudcrate::{CRUDResource, EntityToModels, traits::MergeIntoActiveModel};
use sea_orm::entity::prelude::*;
use sea_orm::{
    ActiveModelTrait, ConnectionTrait, IntoActiveModel, QueryOrder, QuerySelect, Set,
    TransactionTrait,
};

pub const DEFAULT_UNIT: &str = "L";

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, EntityToModels)]
#[sea_orm(table_name = "products")]
#[crudcrate(
    generate_router,
    api_struct = "Product",
    name_singular = "product",
    name_plural = "products",
    description = "Phytosanitary products. Each product has a unit of measure (L by default) and a set of active ingredients; treatments reference products with a dosage per hectare.",
    fn_get_one = get_one_product,
    fn_get_all = get_all_products,
    fn_create = create_product,
    fn_update = update_product,
)]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    #[crudcrate(primary_key, update_model = false, create_model = false, on_create = Uuid::new_v4())]
    pub id: Uuid,
    #[crudcrate(sortable, filterable)]
    pub name: String,
    #[crudcrate(sortable, filterable)]
    pub unit_of_measure: String,
    #[sea_orm(column_type = "Text", nullable)]
    #[crudcrate(filterable)]
    pub description: Option<String>,
    #[crudcrate(update_model = false, create_model = false, on_create = chrono::Utc::now(), sortable)]
    pub created_at: DateTime<Utc>,
    #[crudcrate(update_model = false, create_model = false, on_update = chrono::Utc::now(), on_create = chrono::Utc::now(), sortable)]
    pub last_updated: DateTime<Utc>,
    #[sea_orm(ignore)]
    #[crudcrate(non_db_attr = true, default = vec![], update_model = false)]
    pub active_ingredient_ids: Vec<Uuid>,
    #[sea_orm(ignore)]
    #[crudcrate(non_db_attr = true, default = vec![], create_model = false, update_model = false)]
    pub active_ingredients: Vec<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "crate::products::active_ingredient_links::Entity")]
    IngredientLinks,
    #[sea_orm(has_many = "crate::treatments::products::models::Entity")]
    TreatmentProducts,
}

impl Related<active_ingredient_links::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::IngredientLinks.def()
    }
}

impl Related<active_ingredients::models::Entity> for Entity {
    fn to() -> RelationDef {
        active_ingredient_links::Relation::ActiveIngredients.def()
    }

    fn via() -> Option<RelationDef> {
        Some(active_ingredient_links::Relation::Products.def().rev())
    }
}

impl Related<crate::treatments::products::models::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TreatmentProducts.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

pub fn normalize_unit(unit: &str) -> String {
    let trimmed = unit.trim();
    if trimmed.is_empty() {
        DEFAULT_UNIT.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Ingredient ids and names of a product, ordered by name
async fn load_ingredients<C: ConnectionTrait>(
    db: &C,
    model: &Model,
) -> Result<(Vec<Uuid>, Vec<String>), DbErr> {
    let ingredients = model
        .find_related(active_ingredients::models::Entity)
        .order_by_asc(active_ingredients::models::Column::Name)
        .all(db)
        .await?;

    Ok(ingredients.into_iter().map(|i| (i.id, i.name)).unzip())
}

pub(crate) async fn get_one_product(db: &DatabaseConnection, id: Uuid) -> Result<Product, DbErr> {
    let model = Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| DbErr::RecordNotFound(format!("Product with id '{id}' not found")))?;

    let (ids, names) = load_ingredients(db, &model).await?;
    let mut product: Product = model.into();
    product.active_ingredient_ids = ids;
    product.active_ingredients = names;
    Ok(product)
}

async fn get_all_products(
    db: &DatabaseConnection,
    condition: &sea_orm::Condition,
    order_column: Column,
    order_direction: sea_orm::Order,
    offset: u64,
    limit: u64,
) -> Result<Vec<ProductList>, DbErr> {
    let models = Entity::find()
        .filter(condition.clone())
        .order_by(order_column, order_direction)
        .offset(offset)
        .limit(limit)
        .all(db)
        .await?;

    let mut products = Vec::with_capacity(models.len());
    for model in models {
        let (ids, names) = load_ingredients(db, &model).await?;
        let mut product = ProductList::from(model);
        product.active_ingredient_ids = ids;
        product.active_ingredients = names;
        products.push(product);
    }

    Ok(products)
}

/// Inserts the product and links its ingredients in one transaction
async fn create_product(
    db: &DatabaseConnection,
    create_data: ProductCreate,
) -> Result<Product, DbErr> {
    let name = validate_name(&create_data.name).map_err(BusinessError::into_db_err)?;
    let ingredient_ids = create_data.active_ingredient_ids.clone();
    let unit = normalize_unit(&create_data.unit_of_measure);

    let mut active_model: ActiveModel = create_data.into();
    active_model.name = Set(name);
    active_model.unit_of_measure = Set(unit);

    let txn = db.begin().await?;
    let inserted = active_model.insert(&txn).await?;
    active_ingredient_links::replace_links(&txn, inserted.id, &ingredient_ids).await?;
    txn.commit().await?;

    let product = get_one_product(db, inserted.id).await?;
    activity::services::record(
        db,
        activity::services::product_created(
            product.id,
            &product.name,
            &product.unit_of_measure,
            &product.active_ingredients,
        ),
    )
    .await;
    Ok(product)
}

/// Same rules as creation: the name must not be blank and a blank unit
/// falls back to the default
async fn update_product(
    db: &DatabaseConnection,
    id: Uuid,
    update_data: ProductUpdate,
) -> Result<Product, DbErr> {
    let mut update_data = update_data;
    if let Some(name) = update_data.name.take() {
        let name = validate_name(name.as_deref().unwrap_or_default())
            .map_err(BusinessError::into_db_err)?;
        update_data.name = Some(Some(name));
    }
    if let Some(unit) = update_data.unit_of_measure.take() {
        let unit = normalize_unit(unit.as_deref().unwrap_or_default());
        update_data.unit_of_measure = Some(Some(unit));
    }

    let existing = Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| DbErr::RecordNotFound(format!("Product with id '{id}' not found")))?;
    update_data
        .merge_into_activemodel(existing.into_active_model())?
        .update(db)
        .await?;

    get_one_product(db, id).await
}
