//! Hectare totals over the client → farm → parcel tree.
//!
//! Totals are always computed from the current parcel rows, nothing is
//! cached or stored.

use crate::clients::models as clients;
use crate::common::errors::{BusinessResult, DbErrorExt};
use crate::farms::models as farms;
use crate::not_found;
use crate::parcels::models as parcels;
use rust_decimal::Decimal;
use sea_orm::{
    ColumnTrait, ConnectionTrait, EntityTrait, JoinType, PaginatorTrait, QueryFilter, QuerySelect,
    RelationTrait,
};
use uuid::Uuid;

pub fn sum_areas<I>(areas: I) -> Decimal
where
    I: IntoIterator<Item = Decimal>,
{
    areas.into_iter().fold(Decimal::ZERO, |acc, area| acc + area)
}

pub async fn parcel_area<C: ConnectionTrait>(db: &C, parcel_id: Uuid) -> BusinessResult<Decimal> {
    let parcel = parcels::Entity::find_by_id(parcel_id)
        .one(db)
        .await
        .map_err(|e| e.to_business_error("parcel"))?
        .ok_or_else(|| not_found!("Parcel", parcel_id))?;
    Ok(parcel.area_hectares)
}

pub async fn farm_area<C: ConnectionTrait>(db: &C, farm_id: Uuid) -> BusinessResult<Decimal> {
    let exists = farms::Entity::find_by_id(farm_id)
        .count(db)
        .await
        .map_err(|e| e.to_business_error("farm"))?;
    if exists == 0 {
        return Err(not_found!("Farm", farm_id));
    }

    let areas: Vec<Decimal> = parcels::Entity::find()
        .select_only()
        .column(parcels::Column::AreaHectares)
        .filter(parcels::Column::FarmId.eq(farm_id))
        .into_tuple()
        .all(db)
        .await
        .map_err(|e| e.to_business_error("parcel"))?;

    Ok(sum_areas(areas))
}

pub async fn client_area<C: ConnectionTrait>(db: &C, client_id: Uuid) -> BusinessResult<Decimal> {
    let exists = clients::Entity::find_by_id(client_id)
        .count(db)
        .await
        .map_err(|e| e.to_business_error("client"))?;
    if exists == 0 {
        return Err(not_found!("Client", client_id));
    }

    let areas: Vec<Decimal> = parcels::Entity::find()
        .select_only()
        .column(parcels::Column::AreaHectares)
        .join(JoinType::InnerJoin, parcels::Relation::Farms.def())
        .filter(farms::Column::ClientId.eq(client_id))
        .into_tuple()
        .all(db)
        .await
        .map_err(|e| e.to_business_error("parcel"))?;

    Ok(sum_areas(areas))
}

/// Sum over an explicit parcel set, regardless of which farms own them.
/// Ids that no longer exist contribute nothing.
pub async fn parcels_area<C: ConnectionTrait>(
    db: &C,
    parcel_ids: &[Uuid],
) -> BusinessResult<Decimal> {
    if parcel_ids.is_empty() {
        return Ok(Decimal::ZERO);
    }

    let areas: Vec<Decimal> = parcels::Entity::find()
        .select_only()
        .column(parcels::Column::AreaHectares)
        .filter(parcels::Column::Id.is_in(parcel_ids.to_vec()))
        .into_tuple()
        .all(db)
        .await
        .map_err(|e| e.to_business_error("parcel"))?;

    Ok(sum_areas(areas))
}

/// Hectares over every parcel in the database
pub async fn total_area<C: ConnectionTrait>(db: &C) -> BusinessResult<Decimal> {
    let areas: Vec<Decimal> = parcels::Entity::find()
        .select_only()
        .column(parcels::Column::AreaHectares)
        .into_tuple()
        .all(db)
        .await
        .map_err(|e| e.to_business_error("parcel"))?;

    Ok(sum_areas(areas))
}
