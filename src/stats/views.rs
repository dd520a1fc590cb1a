use super::{models::DatabaseStats, services};
use crate::common::errors::BusinessError;
use crate::common::state::AppState;
use axum::{extract::State, response::Json};
use utoipa_axum::{router::OpenApiRouter, routes};

pub fn router(state: &AppState) -> OpenApiRouter {
    OpenApiRouter::new()
        .routes(routes!(get_stats))
        .with_state(state.clone())
}

#[utoipa::path(
    get,
    path = "/",
    responses((status = 200, description = "Counts and total area", body = DatabaseStats)),
    tag = "stats",
    summary = "Database statistics",
    description = "Row counts per resource and the hectares of all parcels, computed from the current rows."
)]
pub async fn get_stats(
    State(state): State<AppState>,
) -> Result<Json<DatabaseStats>, BusinessError> {
    Ok(Json(services::database_stats(&state.db).await?))
}
