use super::models::{Farm, FarmArea, FarmCreate, FarmQuery, FarmUpdate};
use super::services;
use crate::common::errors::BusinessError;
use crate::common::state::AppState;
use crate::services::area_service;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Json;
use utoipa_axum::{router::OpenApiRouter, routes};
use uuid::Uuid;

pub fn router(state: &AppState) -> OpenApiRouter {
    OpenApiRouter::new()
        .routes(routes!(list_farms, create_farm))
        .routes(routes!(get_farm, update_farm, delete_farm))
        .routes(routes!(get_farm_area))
        .with_state(state.clone())
}

#[utoipa::path(
    get,
    path = "/",
    params(FarmQuery),
    responses((status = 200, description = "Farms with their areas", body = Vec<Farm>)),
    tag = "farms",
    summary = "List farms"
)]
pub async fn list_farms(
    State(state): State<AppState>,
    Query(query): Query<FarmQuery>,
) -> Result<Json<Vec<Farm>>, BusinessError> {
    Ok(Json(services::list_farms(&state.db, &query).await?))
}

#[utoipa::path(
    post,
    path = "/",
    request_body = FarmCreate,
    responses(
        (status = 201, description = "Farm created", body = Farm),
        (status = 400, description = "Invalid input"),
        (status = 404, description = "Client or contractor not found")
    ),
    tag = "farms",
    summary = "Create farm"
)]
pub async fn create_farm(
    State(state): State<AppState>,
    Json(data): Json<FarmCreate>,
) -> Result<(StatusCode, Json<Farm>), BusinessError> {
    let farm = services::create_farm(&state.db, data).await?;
    Ok((StatusCode::CREATED, Json(farm)))
}

#[utoipa::path(
    get,
    path = "/{id}",
    params(("id" = Uuid, Path, description = "Farm ID")),
    responses(
        (status = 200, description = "Farm with parcels and area", body = Farm),
        (status = 404, description = "Farm not found")
    ),
    tag = "farms",
    summary = "Get farm"
)]
pub async fn get_farm(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Farm>, BusinessError> {
    Ok(Json(services::get_farm(&state.db, id).await?))
}

#[utoipa::path(
    put,
    path = "/{id}",
    params(("id" = Uuid, Path, description = "Farm ID")),
    request_body = FarmUpdate,
    responses(
        (status = 200, description = "Farm updated", body = Farm),
        (status = 404, description = "Farm or contractor not found")
    ),
    tag = "farms",
    summary = "Update farm"
)]
pub async fn update_farm(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(data): Json<FarmUpdate>,
) -> Result<Json<Farm>, BusinessError> {
    Ok(Json(services::update_farm(&state.db, id, data).await?))
}

#[utoipa::path(
    delete,
    path = "/{id}",
    params(("id" = Uuid, Path, description = "Farm ID")),
    responses(
        (status = 204, description = "Farm, its parcels and dependent treatments deleted"),
        (status = 404, description = "Farm not found")
    ),
    tag = "farms",
    summary = "Delete farm"
)]
pub async fn delete_farm(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, BusinessError> {
    services::delete_farm(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/{id}/area",
    params(("id" = Uuid, Path, description = "Farm ID")),
    responses(
        (status = 200, description = "Total hectares of the farm's parcels", body = FarmArea),
        (status = 404, description = "Farm not found")
    ),
    tag = "farms",
    summary = "Get farm area"
)]
pub async fn get_farm_area(
    State(state): State<AppState>,
    Path(farm_id): Path<Uuid>,
) -> Result<Json<FarmArea>, BusinessError> {
    let area_hectares = area_service::farm_area(&state.db, farm_id).await?;
    Ok(Json(FarmArea {
        farm_id,
        area_hectares,
    }))
}
