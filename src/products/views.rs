use super::active_ingredient_links;
use super::models::{Entity, Product, get_one_product, router as crudrouter};
use crate::common::errors::{BusinessError, DbErrorExt};
use crate::common::state::AppState;
use crate::not_found;
use axum::extract::{Path, State};
use axum::response::Json;
use sea_orm::{EntityTrait, PaginatorTrait, TransactionTrait};
use serde::Deserialize;
use utoipa::ToSchema;
use utoipa_axum::{router::OpenApiRouter, routes};
use uuid::Uuid;

pub fn router(state: &AppState) -> OpenApiRouter {
    let ingredient_router = OpenApiRouter::new()
        .routes(routes!(set_product_active_ingredients))
        .with_state(state.clone());

    crudrouter(&state.db.clone()).merge(ingredient_router)
}

#[derive(Deserialize, ToSchema, Debug)]
pub struct ActiveIngredientSet {
    pub active_ingredient_ids: Vec<Uuid>,
}

#[utoipa::path(
    put,
    path = "/{id}/active_ingredients",
    params(("id" = Uuid, Path, description = "Product ID")),
    request_body = ActiveIngredientSet,
    responses(
        (status = 200, description = "Product with its new ingredient set", body = Product),
        (status = 404, description = "Product or active ingredient not found")
    ),
    tag = "products",
    summary = "Replace product active ingredients"
)]
pub async fn set_product_active_ingredients(
    State(state): State<AppState>,
    Path(product_id): Path<Uuid>,
    Json(body): Json<ActiveIngredientSet>,
) -> Result<Json<Product>, BusinessError> {
    let exists = Entity::find_by_id(product_id)
        .count(&state.db)
        .await
        .map_err(|e| e.to_business_error("product"))?;
    if exists == 0 {
        return Err(not_found!("Product", product_id));
    }

    let txn = state
        .db
        .begin()
        .await
        .map_err(|e| e.to_business_error("product"))?;
    active_ingredient_links::replace_links(&txn, product_id, &body.active_ingredient_ids)
        .await
        .map_err(|e| e.to_business_error("active_ingredient"))?;
    txn.commit()
        .await
        .map_err(|e| e.to_business_error("product"))?;

    let product = get_one_product(&state.db, product_id)
        .await
        .map_err(|e| e.to_business_error("product"))?;
    Ok(Json(product))
}
