use super::models::{Parcel, ParcelCreate, ParcelQuery, ParcelUpdate};
use super::services;
use crate::common::errors::BusinessError;
use crate::common::state::AppState;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Json;
use utoipa_axum::{router::OpenApiRouter, routes};
use uuid::Uuid;

pub fn router(state: &AppState) -> OpenApiRouter {
    OpenApiRouter::new()
        .routes(routes!(list_parcels, create_parcel))
        .routes(routes!(get_parcel, update_parcel, delete_parcel))
        .with_state(state.clone())
}

#[utoipa::path(
    get,
    path = "/",
    params(ParcelQuery),
    responses((status = 200, description = "Parcels", body = Vec<Parcel>)),
    tag = "parcels",
    summary = "List parcels"
)]
pub async fn list_parcels(
    State(state): State<AppState>,
    Query(query): Query<ParcelQuery>,
) -> Result<Json<Vec<Parcel>>, BusinessError> {
    Ok(Json(services::list_parcels(&state.db, &query).await?))
}

#[utoipa::path(
    post,
    path = "/",
    request_body = ParcelCreate,
    responses(
        (status = 201, description = "Parcel created", body = Parcel),
        (status = 400, description = "Area not positive or name empty"),
        (status = 404, description = "Farm not found")
    ),
    tag = "parcels",
    summary = "Create parcel"
)]
pub async fn create_parcel(
    State(state): State<AppState>,
    Json(data): Json<ParcelCreate>,
) -> Result<(StatusCode, Json<Parcel>), BusinessError> {
    let parcel = services::create_parcel(&state.db, data).await?;
    Ok((StatusCode::CREATED, Json(parcel)))
}

#[utoipa::path(
    get,
    path = "/{id}",
    params(("id" = Uuid, Path, description = "Parcel ID")),
    responses(
        (status = 200, description = "Parcel", body = Parcel),
        (status = 404, description = "Parcel not found")
    ),
    tag = "parcels",
    summary = "Get parcel"
)]
pub async fn get_parcel(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Parcel>, BusinessError> {
    Ok(Json(services::get_parcel(&state.db, id).await?))
}

#[utoipa::path(
    put,
    path = "/{id}",
    params(("id" = Uuid, Path, description = "Parcel ID")),
    request_body = ParcelUpdate,
    responses(
        (status = 200, description = "Parcel updated", body = Parcel),
        (status = 400, description = "Area not positive"),
        (status = 404, description = "Parcel not found")
    ),
    tag = "parcels",
    summary = "Update parcel"
)]
pub async fn update_parcel(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(data): Json<ParcelUpdate>,
) -> Result<Json<Parcel>, BusinessError> {
    Ok(Json(services::update_parcel(&state.db, id, data).await?))
}

#[utoipa::path(
    delete,
    path = "/{id}",
    params(("id" = Uuid, Path, description = "Parcel ID")),
    responses(
        (status = 204, description = "Parcel and the treatments scoped to it deleted"),
        (status = 404, description = "Parcel not found")
    ),
    tag = "parcels",
    summary = "Delete parcel"
)]
pub async fn delete_parcel(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, BusinessError> {
    services::delete_parcel(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
