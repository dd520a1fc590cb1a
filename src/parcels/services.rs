use super::models::{ActiveModel, Column, Entity, Parcel, ParcelCreate, ParcelQuery, ParcelUpdate};
use crate::common::errors::{BusinessResult, DbErrorExt};
use crate::common::validation::validate_name;
use crate::{activity, not_found, treatments, validation_error};
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel,
    PaginatorTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use uuid::Uuid;

/// Area must be strictly positive and fit `DECIMAL(10,2)`
pub fn validate_area(area: Decimal) -> BusinessResult<Decimal> {
    if area <= Decimal::ZERO {
        return Err(validation_error!(
            "area_hectares",
            "must be greater than zero"
        ));
    }
    if area.round_dp(2) != area {
        return Err(validation_error!(
            "area_hectares",
            "must have at most two decimal places"
        ));
    }
    if area >= Decimal::from(100_000_000) {
        return Err(validation_error!("area_hectares", "is too large"));
    }
    Ok(area)
}

pub async fn list_parcels(
    db: &DatabaseConnection,
    query: &ParcelQuery,
) -> BusinessResult<Vec<Parcel>> {
    let mut select = Entity::find();
    if let Some(farm_id) = query.farm_id {
        select = select.filter(Column::FarmId.eq(farm_id));
    }
    let models = select
        .order_by_asc(Column::Name)
        .order_by_asc(Column::Id)
        .all(db)
        .await
        .map_err(|e| e.to_business_error("parcel"))?;
    Ok(models.into_iter().map(Into::into).collect())
}

pub async fn get_parcel(db: &DatabaseConnection, id: Uuid) -> BusinessResult<Parcel> {
    Entity::find_by_id(id)
        .one(db)
        .await
        .map_err(|e| e.to_business_error("parcel"))?
        .map(Into::into)
        .ok_or_else(|| not_found!("Parcel", id))
}

pub async fn create_parcel(db: &DatabaseConnection, data: ParcelCreate) -> BusinessResult<Parcel> {
    let name = validate_name(&data.name)?;
    let area = validate_area(data.area_hectares)?;

    let farm = crate::farms::models::Entity::find_by_id(data.farm_id)
        .one(db)
        .await
        .map_err(|e| e.to_business_error("farm"))?
        .ok_or_else(|| not_found!("Farm", data.farm_id))?;

    let now = Utc::now();
    let model = ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(name),
        farm_id: Set(data.farm_id),
        area_hectares: Set(area),
        created_at: Set(now),
        last_updated: Set(now),
    }
    .insert(db)
    .await
    .map_err(|e| e.to_business_error("parcel"))?;

    activity::services::record(
        db,
        activity::services::parcel_created(
            model.id,
            &model.name,
            model.area_hectares,
            &farm.name,
        ),
    )
    .await;
    Ok(model.into())
}

pub async fn update_parcel(
    db: &DatabaseConnection,
    id: Uuid,
    data: ParcelUpdate,
) -> BusinessResult<Parcel> {
    let existing = Entity::find_by_id(id)
        .one(db)
        .await
        .map_err(|e| e.to_business_error("parcel"))?
        .ok_or_else(|| not_found!("Parcel", id))?;

    let mut active = existing.into_active_model();
    if let Some(name) = data.name {
        active.name = Set(validate_name(&name)?);
    }
    if let Some(area) = data.area_hectares {
        active.area_hectares = Set(validate_area(area)?);
    }
    active.last_updated = Set(Utc::now());

    let model = active
        .update(db)
        .await
        .map_err(|e| e.to_business_error("parcel"))?;
    Ok(model.into())
}

/// Removing a parcel also removes every parcel-set treatment that includes it
pub async fn delete_parcel(db: &DatabaseConnection, id: Uuid) -> BusinessResult<()> {
    let txn = db.begin().await.map_err(|e| e.to_business_error("parcel"))?;

    let exists = Entity::find_by_id(id)
        .count(&txn)
        .await
        .map_err(|e| e.to_business_error("parcel"))?;
    if exists == 0 {
        return Err(not_found!("Parcel", id));
    }

    let removed = treatments::services::delete_parcel_scoped_treatments(&txn, &[id]).await?;
    Entity::delete_by_id(id)
        .exec(&txn)
        .await
        .map_err(|e| e.to_business_error("parcel"))?;

    txn.commit().await.map_err(|e| e.to_business_error("parcel"))?;

    tracing::info!(parcel_id = %id, parcel_treatments_removed = removed, "Parcel deleted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::validate_area;
    use rstest::rstest;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    #[rstest]
    #[case("0.01", true)]
    #[case("2.5", true)]
    #[case("0", false)]
    #[case("-1.00", false)]
    #[case("1.234", false)]
    #[case("100000000", false)]
    fn test_validate_area(#[case] area: &str, #[case] valid: bool) {
        assert_eq!(validate_area(Decimal::from_str(area).unwrap()).is_ok(), valid);
    }
}
