pub mod models;

use crate::common::state::AppState;
use utoipa_axum::router::OpenApiRouter;

pub fn router(state: &AppState) -> OpenApiRouter {
    models::router(&state.db.clone())
}
