use super::models::{CurrentAdvisory, SprayAdvisory, WeatherConditions};
use super::services::spray_advisory;
use crate::common::errors::BusinessError;
use crate::common::state::AppState;
use axum::extract::{Query, State};
use axum::response::Json;
use serde::Deserialize;
use utoipa::IntoParams;
use utoipa_axum::{router::OpenApiRouter, routes};

pub fn router(state: &AppState) -> OpenApiRouter {
    OpenApiRouter::new()
        .routes(routes!(get_spray_advisory))
        .routes(routes!(get_current_advisory))
        .with_state(state.clone())
}

#[utoipa::path(
    post,
    path = "/",
    request_body = WeatherConditions,
    responses((status = 200, description = "Spraying advice for the given weather", body = SprayAdvisory)),
    tag = "advisory",
    summary = "Spray advisory"
)]
pub async fn get_spray_advisory(Json(weather): Json<WeatherConditions>) -> Json<SprayAdvisory> {
    let advice = spray_advisory(&weather);
    tracing::debug!(level = ?advice.level, "Spray advisory computed");
    Json(advice)
}

#[derive(Deserialize, IntoParams, Debug, Default)]
#[into_params(parameter_in = Query)]
pub struct LocationQuery {
    /// Defaults to the configured location
    pub location: Option<String>,
}

#[utoipa::path(
    get,
    path = "/current",
    params(LocationQuery),
    responses(
        (status = 200, description = "Live weather and the advice it leads to", body = CurrentAdvisory),
        (status = 400, description = "Location not found"),
        (status = 502, description = "Weather service unavailable or not configured")
    ),
    tag = "advisory",
    summary = "Spray advisory from live weather"
)]
pub async fn get_current_advisory(
    State(state): State<AppState>,
    Query(query): Query<LocationQuery>,
) -> Result<Json<CurrentAdvisory>, BusinessError> {
    let location = query
        .location
        .filter(|l| !l.trim().is_empty())
        .unwrap_or_else(|| state.config.weather_location.clone());
    let weather = state.weather.current(&location).await?;
    let advisory = spray_advisory(&weather.conditions);
    Ok(Json(CurrentAdvisory { weather, advisory }))
}
