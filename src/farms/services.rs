use super::models::{ActiveModel, Column, Entity, Farm, FarmCreate, FarmQuery, FarmUpdate, Model};
use crate::common::errors::{BusinessResult, DbErrorExt};
use crate::common::validation::validate_name;
use crate::services::area_service;
use crate::{activity, not_found, parcels, treatments};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    IntoActiveModel, ModelTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
    TransactionTrait,
};
use uuid::Uuid;

async fn ensure_client<C: ConnectionTrait>(db: &C, client_id: Uuid) -> BusinessResult<()> {
    let count = crate::clients::models::Entity::find_by_id(client_id)
        .count(db)
        .await
        .map_err(|e| e.to_business_error("client"))?;
    if count == 0 {
        return Err(not_found!("Client", client_id));
    }
    Ok(())
}

async fn ensure_contractor<C: ConnectionTrait>(db: &C, contractor_id: Uuid) -> BusinessResult<()> {
    let count = crate::contractors::models::Entity::find_by_id(contractor_id)
        .count(db)
        .await
        .map_err(|e| e.to_business_error("contractor"))?;
    if count == 0 {
        return Err(not_found!("Contractor", contractor_id));
    }
    Ok(())
}

async fn to_api<C: ConnectionTrait>(
    db: &C,
    model: Model,
    with_parcels: bool,
) -> BusinessResult<Farm> {
    let area_hectares = area_service::farm_area(db, model.id).await?;

    let contractor_name = match model.contractor_id {
        Some(contractor_id) => crate::contractors::models::Entity::find_by_id(contractor_id)
            .one(db)
            .await
            .map_err(|e| e.to_business_error("contractor"))?
            .map(|c| c.name),
        None => None,
    };

    let parcels = if with_parcels {
        let rows = model
            .find_related(parcels::models::Entity)
            .order_by_asc(parcels::models::Column::Name)
            .all(db)
            .await
            .map_err(|e| e.to_business_error("parcel"))?;
        Some(rows.into_iter().map(Into::into).collect())
    } else {
        None
    };

    Ok(Farm {
        id: model.id,
        name: model.name,
        client_id: model.client_id,
        contractor_id: model.contractor_id,
        contractor_name,
        area_hectares,
        created_at: model.created_at,
        last_updated: model.last_updated,
        parcels,
    })
}

pub async fn list_farms(db: &DatabaseConnection, query: &FarmQuery) -> BusinessResult<Vec<Farm>> {
    let mut select = Entity::find();
    if let Some(client_id) = query.client_id {
        select = select.filter(Column::ClientId.eq(client_id));
    }
    if let Some(contractor_id) = query.contractor_id {
        select = select.filter(Column::ContractorId.eq(contractor_id));
    }

    let models = select
        .order_by_asc(Column::Name)
        .order_by_asc(Column::Id)
        .all(db)
        .await
        .map_err(|e| e.to_business_error("farm"))?;

    let mut farms = Vec::with_capacity(models.len());
    for model in models {
        farms.push(to_api(db, model, false).await?);
    }
    Ok(farms)
}

pub async fn get_farm(db: &DatabaseConnection, id: Uuid) -> BusinessResult<Farm> {
    let model = Entity::find_by_id(id)
        .one(db)
        .await
        .map_err(|e| e.to_business_error("farm"))?
        .ok_or_else(|| not_found!("Farm", id))?;
    to_api(db, model, true).await
}

pub async fn create_farm(db: &DatabaseConnection, data: FarmCreate) -> BusinessResult<Farm> {
    let name = validate_name(&data.name)?;
    ensure_client(db, data.client_id).await?;
    if let Some(contractor_id) = data.contractor_id {
        ensure_contractor(db, contractor_id).await?;
    }

    let now = Utc::now();
    let model = ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(name),
        client_id: Set(data.client_id),
        contractor_id: Set(data.contractor_id),
        created_at: Set(now),
        last_updated: Set(now),
    }
    .insert(db)
    .await
    .map_err(|e| e.to_business_error("farm"))?;

    tracing::info!(farm_id = %model.id, client_id = %model.client_id, "Farm created");
    let client_name = crate::clients::models::Entity::find_by_id(model.client_id)
        .one(db)
        .await
        .map_err(|e| e.to_business_error("client"))?
        .map(|c| c.name)
        .unwrap_or_default();
    let farm = to_api(db, model, true).await?;
    activity::services::record(
        db,
        activity::services::farm_created(
            farm.id,
            &farm.name,
            &client_name,
            farm.contractor_name.as_deref(),
        ),
    )
    .await;
    Ok(farm)
}

pub async fn update_farm(
    db: &DatabaseConnection,
    id: Uuid,
    data: FarmUpdate,
) -> BusinessResult<Farm> {
    let existing = Entity::find_by_id(id)
        .one(db)
        .await
        .map_err(|e| e.to_business_error("farm"))?
        .ok_or_else(|| not_found!("Farm", id))?;

    let mut active = existing.into_active_model();
    if let Some(name) = data.name {
        active.name = Set(validate_name(&name)?);
    }
    if let Some(contractor_id) = data.contractor_id {
        if let Some(contractor_id) = contractor_id {
            ensure_contractor(db, contractor_id).await?;
        }
        active.contractor_id = Set(contractor_id);
    }
    active.last_updated = Set(Utc::now());

    let model = active
        .update(db)
        .await
        .map_err(|e| e.to_business_error("farm"))?;
    to_api(db, model, true).await
}

/// Deletes the farm with its parcels. Treatments scoped to the farm go with the
/// foreign key cascade; treatments scoped to a parcel set touching any of its
/// parcels are removed explicitly so none is left with an empty set.
pub async fn delete_farm(db: &DatabaseConnection, id: Uuid) -> BusinessResult<()> {
    let txn = db.begin().await.map_err(|e| e.to_business_error("farm"))?;

    let exists = Entity::find_by_id(id)
        .count(&txn)
        .await
        .map_err(|e| e.to_business_error("farm"))?;
    if exists == 0 {
        return Err(not_found!("Farm", id));
    }

    let parcel_ids: Vec<Uuid> = parcels::models::Entity::find()
        .select_only()
        .column(parcels::models::Column::Id)
        .filter(parcels::models::Column::FarmId.eq(id))
        .into_tuple()
        .all(&txn)
        .await
        .map_err(|e| e.to_business_error("parcel"))?;

    let removed = treatments::services::delete_parcel_scoped_treatments(&txn, &parcel_ids).await?;

    Entity::delete_by_id(id)
        .exec(&txn)
        .await
        .map_err(|e| e.to_business_error("farm"))?;

    txn.commit().await.map_err(|e| e.to_business_error("farm"))?;

    tracing::info!(
        farm_id = %id,
        parcels = parcel_ids.len(),
        parcel_treatments_removed = removed,
        "Farm deleted"
    );
    Ok(())
}
