use super::models::DatabaseStats;
use crate::clients::{contacts::models as contacts, models as clients};
use crate::common::errors::{BusinessResult, DbErrorExt};
use crate::contractors::models as contractors;
use crate::farms::models as farms;
use crate::parcels::models as parcels;
use crate::products::{active_ingredients::models as active_ingredients, models as products};
use crate::services::area_service;
use crate::treatments::workflow;
use sea_orm::{DatabaseConnection, EntityTrait, PaginatorTrait};

async fn count<E>(db: &DatabaseConnection, context: &str) -> BusinessResult<u64>
where
    E: EntityTrait,
    E::Model: Sync + 'static,
{
    E::find()
        .count(db)
        .await
        .map_err(|e| e.to_business_error(context))
}

pub async fn database_stats(db: &DatabaseConnection) -> BusinessResult<DatabaseStats> {
    Ok(DatabaseStats {
        clients: count::<clients::Entity>(db, "client").await?,
        farms: count::<farms::Entity>(db, "farm").await?,
        parcels: count::<parcels::Entity>(db, "parcel").await?,
        contractors: count::<contractors::Entity>(db, "contractor").await?,
        contacts: count::<contacts::Entity>(db, "contact").await?,
        products: count::<products::Entity>(db, "product").await?,
        active_ingredients: count::<active_ingredients::Entity>(db, "active ingredient").await?,
        total_area_hectares: area_service::total_area(db).await?,
        treatments: workflow::status_summary(db).await?,
    })
}
