use super::models::{ClientArea, router as crudrouter};
use crate::common::errors::BusinessError;
use crate::common::state::AppState;
use crate::services::area_service;
use axum::extract::{Path, State};
use axum::response::Json;
use utoipa_axum::{router::OpenApiRouter, routes};
use uuid::Uuid;

pub fn router(state: &AppState) -> OpenApiRouter {
    let area_router = OpenApiRouter::new()
        .routes(routes!(get_client_area))
        .with_state(state.clone());

    crudrouter(&state.db.clone()).merge(area_router)
}

#[utoipa::path(
    get,
    path = "/{id}/area",
    params(("id" = Uuid, Path, description = "Client ID")),
    responses(
        (status = 200, description = "Total hectares over all farms of the client", body = ClientArea),
        (status = 404, description = "Client not found")
    ),
    tag = "clients",
    summary = "Get client area"
)]
pub async fn get_client_area(
    Path(client_id): Path<Uuid>,
    State(state): State<AppState>,
) -> Result<Json<ClientArea>, BusinessError> {
    let area_hectares = area_service::client_area(&state.db, client_id).await?;
    Ok(Json(ClientArea {
        client_id,
        area_hectares,
    }))
}
