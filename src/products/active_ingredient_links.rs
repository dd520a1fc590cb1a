//! Join table between products and their active ingredients

use crate::products::{active_ingredients, models as products};
use sea_orm::entity::prelude::*;
use sea_orm::{ConnectionTrait, PaginatorTrait, Set};
use std::collections::HashSet;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "product_active_ingredients")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub product_id: Uuid,
    #[sea_orm(primary_key, auto_increment = false)]
    pub active_ingredient_id: Uuid,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "crate::products::models::Entity",
        from = "Column::ProductId",
        to = "crate::products::models::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Products,
    #[sea_orm(
        belongs_to = "crate::products::active_ingredients::models::Entity",
        from = "Column::ActiveIngredientId",
        to = "crate::products::active_ingredients::models::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    ActiveIngredients,
}

impl Related<products::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Products.def()
    }
}

impl Related<active_ingredients::models::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ActiveIngredients.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Replaces the ingredient set of a product. Duplicated ids collapse into one
/// link; unknown ids fail before anything is written.
pub async fn replace_links<C: ConnectionTrait>(
    db: &C,
    product_id: Uuid,
    ingredient_ids: &[Uuid],
) -> Result<(), DbErr> {
    let mut seen = HashSet::new();
    let unique: Vec<Uuid> = ingredient_ids
        .iter()
        .copied()
        .filter(|id| seen.insert(*id))
        .collect();

    for ingredient_id in &unique {
        let exists = active_ingredients::models::Entity::find_by_id(*ingredient_id)
            .count(db)
            .await?;
        if exists == 0 {
            return Err(DbErr::RecordNotFound(format!(
                "Active ingredient with id '{ingredient_id}' not found"
            )));
        }
    }

    Entity::delete_many()
        .filter(Column::ProductId.eq(product_id))
        .exec(db)
        .await?;

    if unique.is_empty() {
        return Ok(());
    }

    Entity::insert_many(unique.into_iter().map(|active_ingredient_id| ActiveModel {
        product_id: Set(product_id),
        active_ingredient_id: Set(active_ingredient_id),
    }))
    .exec_without_returning(db)
    .await?;

    Ok(())
}
