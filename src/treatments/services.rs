use super::models::{
    ActiveModel, Column, Entity, Model, ProductDosage, ResponsibleContractor, ScopeLevel,
    Treatment, TreatmentCreate, TreatmentParcel, TreatmentProductLine, TreatmentQuery,
    TreatmentStatus, TreatmentSummary, TreatmentUpdate,
};
use super::parcels::models as treatment_parcels;
use super::products::models as treatment_products;
use super::scope::TreatmentScope;
use super::status::Lifecycle;
use crate::common::errors::{BusinessError, BusinessResult, DbErrorExt};
use crate::services::area_service;
use crate::{
    activity, clients, contractors, duplicate_resource, farms, not_found, parcels, products,
    validation_error,
};
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    IntoActiveModel, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, RelationTrait, Set,
    SqlErr, TransactionTrait,
};
use serde_json::json;
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

pub fn validate_dosage(dosage: Decimal) -> BusinessResult<Decimal> {
    if dosage <= Decimal::ZERO {
        return Err(validation_error!(
            "dosage_per_hectare",
            "must be greater than zero"
        ));
    }
    if dosage.round_dp(3) != dosage {
        return Err(validation_error!(
            "dosage_per_hectare",
            "must have at most three decimal places"
        ));
    }
    Ok(dosage)
}

/// Quantity of product for the whole treated area. Kept at full precision.
pub fn total_quantity(dosage_per_hectare: Decimal, area_hectares: Decimal) -> Decimal {
    dosage_per_hectare * area_hectares
}

pub fn display_quantity(quantity: Decimal, unit: &str) -> String {
    format!("{:.2} {unit}", quantity.round_dp(2))
}

pub async fn find_treatment<C: ConnectionTrait>(db: &C, id: Uuid) -> BusinessResult<Model> {
    Entity::find_by_id(id)
        .one(db)
        .await
        .map_err(|e| e.to_business_error("treatment"))?
        .ok_or_else(|| not_found!("Treatment", id))
}

/// Parcel ids of a treatment in insertion order
async fn parcel_ids_of<C: ConnectionTrait>(
    db: &C,
    treatment_id: Uuid,
) -> BusinessResult<Vec<Uuid>> {
    treatment_parcels::Entity::find()
        .select_only()
        .column(treatment_parcels::Column::ParcelId)
        .filter(treatment_parcels::Column::TreatmentId.eq(treatment_id))
        .order_by_asc(treatment_parcels::Column::Position)
        .into_tuple()
        .all(db)
        .await
        .map_err(|e| e.to_business_error("treatment_parcel"))
}

pub async fn load_scope<C: ConnectionTrait>(
    db: &C,
    treatment: &Model,
) -> BusinessResult<TreatmentScope> {
    let parcel_ids = if treatment.scope_level == ScopeLevel::Parcels {
        parcel_ids_of(db, treatment.id).await?
    } else {
        Vec::new()
    };
    TreatmentScope::from_stored(treatment.scope_level, treatment.farm_id, parcel_ids)
}

/// Checks that every reference of the scope exists and belongs to `client_id`
async fn check_scope_ownership<C: ConnectionTrait>(
    db: &C,
    client_id: Uuid,
    scope: &TreatmentScope,
) -> BusinessResult<()> {
    match scope {
        TreatmentScope::Client => Ok(()),
        TreatmentScope::Farm(farm_id) => {
            let farm = farms::models::Entity::find_by_id(*farm_id)
                .one(db)
                .await
                .map_err(|e| e.to_business_error("farm"))?
                .ok_or_else(|| not_found!("Farm", farm_id))?;
            if farm.client_id != client_id {
                return Err(validation_error!(
                    "farm_id",
                    format!("farm {farm_id} does not belong to client {client_id}")
                ));
            }
            Ok(())
        }
        TreatmentScope::Parcels(parcel_ids) => {
            let rows: Vec<(Uuid, Uuid)> = parcels::models::Entity::find()
                .select_only()
                .column(parcels::models::Column::Id)
                .column(farms::models::Column::ClientId)
                .join(
                    sea_orm::JoinType::InnerJoin,
                    parcels::models::Relation::Farms.def(),
                )
                .filter(parcels::models::Column::Id.is_in(parcel_ids.clone()))
                .into_tuple()
                .all(db)
                .await
                .map_err(|e| e.to_business_error("parcel"))?;
            let owners: HashMap<Uuid, Uuid> = rows.into_iter().collect();

            for parcel_id in parcel_ids {
                match owners.get(parcel_id) {
                    None => return Err(not_found!("Parcel", parcel_id)),
                    Some(owner) if *owner != client_id => {
                        return Err(validation_error!(
                            "parcel_ids",
                            format!("parcel {parcel_id} does not belong to client {client_id}")
                        ));
                    }
                    Some(_) => {}
                }
            }
            Ok(())
        }
    }
}

/// Dosages must be positive and each product may appear only once
fn check_product_list(products: &[ProductDosage]) -> BusinessResult<()> {
    let mut seen = HashSet::new();
    for item in products {
        validate_dosage(item.dosage_per_hectare)?;
        if !seen.insert(item.product_id) {
            return Err(duplicate_resource!("Treatment product", "product_id"));
        }
    }
    Ok(())
}

async fn ensure_product<C: ConnectionTrait>(db: &C, product_id: Uuid) -> BusinessResult<()> {
    let count = products::models::Entity::find_by_id(product_id)
        .count(db)
        .await
        .map_err(|e| e.to_business_error("product"))?;
    if count == 0 {
        return Err(not_found!("Product", product_id));
    }
    Ok(())
}

/// Creates the treatment, its parcel set and product rows atomically. Any
/// validation, ownership or existence failure leaves nothing behind.
pub async fn create_treatment(
    db: &DatabaseConnection,
    data: TreatmentCreate,
) -> BusinessResult<Model> {
    let scope = TreatmentScope::from_request(data.scope_level, data.farm_id, &data.parcel_ids)?;
    check_product_list(&data.products)?;

    let txn = db
        .begin()
        .await
        .map_err(|e| e.to_business_error("treatment"))?;

    let client_exists = clients::models::Entity::find_by_id(data.client_id)
        .count(&txn)
        .await
        .map_err(|e| e.to_business_error("client"))?;
    if client_exists == 0 {
        return Err(not_found!("Client", data.client_id));
    }
    check_scope_ownership(&txn, data.client_id, &scope).await?;

    let now = Utc::now();
    let treatment = ActiveModel {
        id: Set(Uuid::new_v4()),
        client_id: Set(data.client_id),
        farm_id: Set(scope.farm_id()),
        scope_level: Set(scope.level()),
        status: Set(TreatmentStatus::Scheduled),
        notes: Set(data.notes),
        planned_date: Set(data.planned_date),
        communicated_at: Set(None),
        executed_at: Set(None),
        created_at: Set(now),
        last_updated: Set(now),
    }
    .insert(&txn)
    .await
    .map_err(|e| e.to_business_error("treatment"))?;

    for (position, parcel_id) in (0_i32..).zip(scope.parcel_ids()) {
        treatment_parcels::ActiveModel {
            treatment_id: Set(treatment.id),
            parcel_id: Set(*parcel_id),
            position: Set(position),
        }
        .insert(&txn)
        .await
        .map_err(|e| e.to_business_error("treatment_parcel"))?;
    }

    for item in &data.products {
        ensure_product(&txn, item.product_id).await?;
        insert_product_row(&txn, treatment.id, item.product_id, item.dosage_per_hectare).await?;
    }

    txn.commit()
        .await
        .map_err(|e| e.to_business_error("treatment"))?;

    tracing::info!(
        treatment_id = %treatment.id,
        client_id = %treatment.client_id,
        scope = ?treatment.scope_level,
        products = data.products.len(),
        "Treatment created"
    );

    let client_name = client_name(db, treatment.client_id).await?;
    let area = interested_area(db, &treatment).await?;
    activity::services::record(
        db,
        activity::services::treatment_created(
            treatment.id,
            &client_name,
            area,
            treatment.scope_level.as_str(),
        ),
    )
    .await;
    Ok(treatment)
}

/// Relies on the unique (treatment, product) index to report duplicates
pub(super) async fn insert_product_row<C: ConnectionTrait>(
    db: &C,
    treatment_id: Uuid,
    product_id: Uuid,
    dosage: Decimal,
) -> BusinessResult<treatment_products::Model> {
    treatment_products::ActiveModel {
        id: Set(Uuid::new_v4()),
        treatment_id: Set(treatment_id),
        product_id: Set(product_id),
        dosage_per_hectare: Set(dosage),
        created_at: Set(Utc::now()),
    }
    .insert(db)
    .await
    .map_err(|e| match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => {
            duplicate_resource!("Treatment product", "product_id")
        }
        _ => e.to_business_error("treatment_product"),
    })
}

/// Writes the new status, latching `communicated_at` / `executed_at` on first arrival
pub async fn set_status<C: ConnectionTrait>(
    db: &C,
    id: Uuid,
    status: TreatmentStatus,
) -> BusinessResult<Model> {
    let treatment = find_treatment(db, id).await?;
    let previous = treatment.status;
    let next = Lifecycle {
        status: treatment.status,
        communicated_at: treatment.communicated_at,
        executed_at: treatment.executed_at,
    }
    .transition(status, Utc::now());

    let mut active = treatment.into_active_model();
    active.status = Set(next.status);
    active.communicated_at = Set(next.communicated_at);
    active.executed_at = Set(next.executed_at);
    active.last_updated = Set(Utc::now());

    let updated = active
        .update(db)
        .await
        .map_err(|e| e.to_business_error("treatment"))?;

    tracing::info!(
        treatment_id = %id,
        from = previous.as_str(),
        to = status.as_str(),
        "Treatment status changed"
    );
    Ok(updated)
}

pub async fn update_treatment(
    db: &DatabaseConnection,
    id: Uuid,
    data: TreatmentUpdate,
) -> BusinessResult<Model> {
    let treatment = find_treatment(db, id).await?;
    let mut changes = Vec::new();
    let mut active = treatment.into_active_model();
    if let Some(notes) = data.notes {
        active.notes = Set(notes);
        changes.push("notes");
    }
    if let Some(planned_date) = data.planned_date {
        active.planned_date = Set(planned_date);
        changes.push("planned_date");
    }
    active.last_updated = Set(Utc::now());

    let updated = active
        .update(db)
        .await
        .map_err(|e| e.to_business_error("treatment"))?;

    if !changes.is_empty() {
        let client_name = client_name(db, updated.client_id).await?;
        activity::services::record(
            db,
            activity::services::treatment_updated(
                id,
                &client_name,
                &changes,
                json!({ "planned_date": updated.planned_date }),
            ),
        )
        .await;
    }
    Ok(updated)
}

/// Status change requested by a user, recorded in the activity feed
pub async fn change_status(
    db: &DatabaseConnection,
    id: Uuid,
    status: TreatmentStatus,
) -> BusinessResult<Model> {
    let previous = find_treatment(db, id).await?.status;
    let updated = set_status(db, id, status).await?;

    let client_name = client_name(db, updated.client_id).await?;
    activity::services::record(
        db,
        activity::services::treatment_updated(
            id,
            &client_name,
            &["status"],
            json!({ "from": previous.as_str(), "to": status.as_str() }),
        ),
    )
    .await;
    Ok(updated)
}

pub async fn delete_treatment(db: &DatabaseConnection, id: Uuid) -> BusinessResult<()> {
    let result = Entity::delete_by_id(id)
        .exec(db)
        .await
        .map_err(|e| e.to_business_error("treatment"))?;
    if result.rows_affected == 0 {
        return Err(not_found!("Treatment", id));
    }
    tracing::info!(treatment_id = %id, "Treatment deleted");
    Ok(())
}

/// Removes parcel-scoped treatments whose set includes any of `parcel_ids`.
/// Used before parcels disappear so no parcel set ends up empty.
pub async fn delete_parcel_scoped_treatments<C: ConnectionTrait>(
    db: &C,
    parcel_ids: &[Uuid],
) -> BusinessResult<u64> {
    if parcel_ids.is_empty() {
        return Ok(0);
    }

    let treatment_ids: Vec<Uuid> = treatment_parcels::Entity::find()
        .select_only()
        .column(treatment_parcels::Column::TreatmentId)
        .distinct()
        .filter(treatment_parcels::Column::ParcelId.is_in(parcel_ids.to_vec()))
        .into_tuple()
        .all(db)
        .await
        .map_err(|e| e.to_business_error("treatment_parcel"))?;

    if treatment_ids.is_empty() {
        return Ok(0);
    }

    let result = Entity::delete_many()
        .filter(Column::Id.is_in(treatment_ids))
        .filter(Column::ScopeLevel.eq(ScopeLevel::Parcels))
        .exec(db)
        .await
        .map_err(|e| e.to_business_error("treatment"))?;
    Ok(result.rows_affected)
}

/// Hectares the treatment applies to, computed from current parcel rows
pub async fn interested_area<C: ConnectionTrait>(
    db: &C,
    treatment: &Model,
) -> BusinessResult<Decimal> {
    match load_scope(db, treatment).await? {
        TreatmentScope::Client => area_service::client_area(db, treatment.client_id).await,
        TreatmentScope::Farm(farm_id) => area_service::farm_area(db, farm_id).await,
        TreatmentScope::Parcels(parcel_ids) => area_service::parcels_area(db, &parcel_ids).await,
    }
}

/// Contractor of the farm the treatment runs on.
///
/// * farm scope: that farm's contractor
/// * client scope: contractor of the client's oldest farm (ties by id)
/// * parcel scope: contractor of the farm owning the first parcel of the set;
///   other farms of a multi-farm set are not consulted
pub async fn responsible_contractor<C: ConnectionTrait>(
    db: &C,
    treatment: &Model,
) -> BusinessResult<Option<contractors::models::Model>> {
    let farm = match load_scope(db, treatment).await? {
        TreatmentScope::Farm(farm_id) => farms::models::Entity::find_by_id(farm_id)
            .one(db)
            .await
            .map_err(|e| e.to_business_error("farm"))?,
        TreatmentScope::Client => farms::models::Entity::find()
            .filter(farms::models::Column::ClientId.eq(treatment.client_id))
            .order_by_asc(farms::models::Column::CreatedAt)
            .order_by_asc(farms::models::Column::Id)
            .one(db)
            .await
            .map_err(|e| e.to_business_error("farm"))?,
        TreatmentScope::Parcels(parcel_ids) => {
            let Some(&first_id) = parcel_ids.first() else {
                return Ok(None);
            };
            let first_parcel = parcels::models::Entity::find_by_id(first_id)
                .one(db)
                .await
                .map_err(|e| e.to_business_error("parcel"))?;
            match first_parcel {
                Some(parcel) => farms::models::Entity::find_by_id(parcel.farm_id)
                    .one(db)
                    .await
                    .map_err(|e| e.to_business_error("farm"))?,
                None => None,
            }
        }
    };

    let Some(contractor_id) = farm.and_then(|f| f.contractor_id) else {
        return Ok(None);
    };

    contractors::models::Entity::find_by_id(contractor_id)
        .one(db)
        .await
        .map_err(|e| e.to_business_error("contractor"))
}

pub async fn add_product(
    db: &DatabaseConnection,
    treatment_id: Uuid,
    item: &ProductDosage,
) -> BusinessResult<treatment_products::Model> {
    let dosage = validate_dosage(item.dosage_per_hectare)?;
    find_treatment(db, treatment_id).await?;
    ensure_product(db, item.product_id).await?;

    let existing = treatment_products::Entity::find()
        .filter(treatment_products::Column::TreatmentId.eq(treatment_id))
        .filter(treatment_products::Column::ProductId.eq(item.product_id))
        .count(db)
        .await
        .map_err(|e| e.to_business_error("treatment_product"))?;
    if existing > 0 {
        return Err(duplicate_resource!("Treatment product", "product_id"));
    }

    let row = insert_product_row(db, treatment_id, item.product_id, dosage).await?;
    tracing::info!(
        %treatment_id,
        product_id = %item.product_id,
        %dosage,
        "Product added to treatment"
    );
    Ok(row)
}

async fn find_product_row(
    db: &DatabaseConnection,
    treatment_id: Uuid,
    product_id: Uuid,
) -> BusinessResult<treatment_products::Model> {
    treatment_products::Entity::find()
        .filter(treatment_products::Column::TreatmentId.eq(treatment_id))
        .filter(treatment_products::Column::ProductId.eq(product_id))
        .one(db)
        .await
        .map_err(|e| e.to_business_error("treatment_product"))?
        .ok_or_else(|| not_found!("Treatment product", product_id))
}

pub async fn update_dosage(
    db: &DatabaseConnection,
    treatment_id: Uuid,
    product_id: Uuid,
    dosage: Decimal,
) -> BusinessResult<treatment_products::Model> {
    let dosage = validate_dosage(dosage)?;
    find_treatment(db, treatment_id).await?;
    let row = find_product_row(db, treatment_id, product_id).await?;

    let mut active = row.into_active_model();
    active.dosage_per_hectare = Set(dosage);
    active
        .update(db)
        .await
        .map_err(|e| e.to_business_error("treatment_product"))
}

pub async fn remove_product(
    db: &DatabaseConnection,
    treatment_id: Uuid,
    product_id: Uuid,
) -> BusinessResult<()> {
    find_treatment(db, treatment_id).await?;
    let row = find_product_row(db, treatment_id, product_id).await?;
    treatment_products::Entity::delete_by_id(row.id)
        .exec(db)
        .await
        .map_err(|e| e.to_business_error("treatment_product"))?;
    Ok(())
}

/// Product rows of a treatment with quantities for `area_hectares`, ordered
/// by product name
pub async fn product_lines<C: ConnectionTrait>(
    db: &C,
    treatment_id: Uuid,
    area_hectares: Decimal,
) -> BusinessResult<Vec<TreatmentProductLine>> {
    let rows = treatment_products::Entity::find()
        .filter(treatment_products::Column::TreatmentId.eq(treatment_id))
        .find_also_related(products::models::Entity)
        .all(db)
        .await
        .map_err(|e| e.to_business_error("treatment_product"))?;

    let mut lines = Vec::with_capacity(rows.len());
    for (row, product) in rows {
        let product = product.ok_or_else(|| BusinessError::InternalError {
            message: format!("treatment product {} references a missing product", row.id),
        })?;
        let quantity = total_quantity(row.dosage_per_hectare, area_hectares);
        lines.push(TreatmentProductLine {
            id: row.id,
            product_id: product.id,
            total_quantity_display: display_quantity(quantity, &product.unit_of_measure),
            product_name: product.name,
            unit_of_measure: product.unit_of_measure,
            dosage_per_hectare: row.dosage_per_hectare,
            total_quantity: quantity,
        });
    }
    lines.sort_by(|a, b| a.product_name.cmp(&b.product_name));
    Ok(lines)
}

pub async fn parcels_of<C: ConnectionTrait>(
    db: &C,
    parcel_ids: &[Uuid],
) -> BusinessResult<Vec<TreatmentParcel>> {
    if parcel_ids.is_empty() {
        return Ok(Vec::new());
    }
    let rows = parcels::models::Entity::find()
        .filter(parcels::models::Column::Id.is_in(parcel_ids.to_vec()))
        .all(db)
        .await
        .map_err(|e| e.to_business_error("parcel"))?;
    let mut by_id: HashMap<Uuid, parcels::models::Model> =
        rows.into_iter().map(|p| (p.id, p)).collect();

    Ok(parcel_ids
        .iter()
        .filter_map(|id| by_id.remove(id))
        .map(|p| TreatmentParcel {
            id: p.id,
            name: p.name,
            farm_id: p.farm_id,
            area_hectares: p.area_hectares,
        })
        .collect())
}

async fn client_name<C: ConnectionTrait>(db: &C, client_id: Uuid) -> BusinessResult<String> {
    clients::models::Entity::find_by_id(client_id)
        .one(db)
        .await
        .map_err(|e| e.to_business_error("client"))?
        .map(|c| c.name)
        .ok_or_else(|| not_found!("Client", client_id))
}

pub async fn farm_name<C: ConnectionTrait>(
    db: &C,
    farm_id: Option<Uuid>,
) -> BusinessResult<Option<String>> {
    let Some(farm_id) = farm_id else {
        return Ok(None);
    };
    Ok(farms::models::Entity::find_by_id(farm_id)
        .one(db)
        .await
        .map_err(|e| e.to_business_error("farm"))?
        .map(|f| f.name))
}

/// Full view of one treatment: scope, area, contractor and product quantities
pub async fn to_detail<C: ConnectionTrait>(db: &C, treatment: Model) -> BusinessResult<Treatment> {
    let scope = load_scope(db, &treatment).await?;
    let area = interested_area(db, &treatment).await?;
    let contractor = responsible_contractor(db, &treatment).await?;
    let products = product_lines(db, treatment.id, area).await?;
    let parcels = parcels_of(db, scope.parcel_ids()).await?;

    Ok(Treatment {
        id: treatment.id,
        client_name: client_name(db, treatment.client_id).await?,
        client_id: treatment.client_id,
        scope_level: treatment.scope_level,
        farm_name: farm_name(db, treatment.farm_id).await?,
        farm_id: treatment.farm_id,
        parcels,
        status: treatment.status,
        notes: treatment.notes,
        planned_date: treatment.planned_date,
        communicated_at: treatment.communicated_at,
        executed_at: treatment.executed_at,
        created_at: treatment.created_at,
        last_updated: treatment.last_updated,
        interested_area_hectares: area,
        contractor: contractor.map(ResponsibleContractor::from),
        products,
    })
}

pub async fn get_treatment(db: &DatabaseConnection, id: Uuid) -> BusinessResult<Treatment> {
    let treatment = find_treatment(db, id).await?;
    to_detail(db, treatment).await
}

/// Newest first, optionally filtered by status and client
pub async fn list_treatments(
    db: &DatabaseConnection,
    query: &TreatmentQuery,
) -> BusinessResult<Vec<TreatmentSummary>> {
    let mut select = Entity::find();
    if let Some(status) = query.status {
        select = select.filter(Column::Status.eq(status));
    }
    if let Some(client_id) = query.client_id {
        select = select.filter(Column::ClientId.eq(client_id));
    }

    let rows = select
        .find_also_related(clients::models::Entity)
        .order_by_desc(Column::CreatedAt)
        .order_by_asc(Column::Id)
        .all(db)
        .await
        .map_err(|e| e.to_business_error("treatment"))?;

    let mut summaries = Vec::with_capacity(rows.len());
    for (treatment, client) in rows {
        let parcel_ids = if treatment.scope_level == ScopeLevel::Parcels {
            parcel_ids_of(db, treatment.id).await?
        } else {
            Vec::new()
        };
        summaries.push(TreatmentSummary {
            id: treatment.id,
            client_id: treatment.client_id,
            client_name: client.map(|c| c.name).unwrap_or_default(),
            scope_level: treatment.scope_level,
            farm_id: treatment.farm_id,
            parcel_ids,
            status: treatment.status,
            notes: treatment.notes,
            planned_date: treatment.planned_date,
            communicated_at: treatment.communicated_at,
            executed_at: treatment.executed_at,
            created_at: treatment.created_at,
            last_updated: treatment.last_updated,
        });
    }
    Ok(summaries)
}
