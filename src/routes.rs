use crate::common::state::AppState;
use crate::config::Config;
use crate::{
    activity, advisory, clients, contractors, farms, parcels, products, stats, treatments,
};
use axum::{Router, extract::DefaultBodyLimit};
use sea_orm::DatabaseConnection;
use utoipa::OpenApi;
use utoipa_axum::router::OpenApiRouter;
use utoipa_scalar::{Scalar, Servable};

pub fn build_router(db: &DatabaseConnection, config: &Config) -> Router {
    build_router_with_state(AppState::new(db.clone(), config.clone()))
}

pub fn build_router_with_state(app_state: AppState) -> Router {
    #[derive(OpenApi)]
    #[openapi(info(
        title = "AgroDesk API",
        description = "Clients, farms, parcels and the scheduling and communication of phytosanitary treatments"
    ))]
    struct ApiDoc;

    let (router, api) = OpenApiRouter::with_openapi(ApiDoc::openapi())
        .merge(crate::common::views::router(&app_state))
        .nest("/api/clients", clients::views::router(&app_state))
        .nest("/api/contacts", clients::contacts::router(&app_state))
        .nest("/api/contractors", contractors::views::router(&app_state))
        .nest("/api/farms", farms::views::router(&app_state))
        .nest("/api/parcels", parcels::views::router(&app_state))
        .nest(
            "/api/active_ingredients",
            products::active_ingredients::router(&app_state),
        )
        .nest("/api/products", products::views::router(&app_state))
        .nest("/api/treatments", treatments::views::router(&app_state))
        .nest("/api/advisory", advisory::views::router(&app_state))
        .nest("/api/activity", activity::views::router(&app_state))
        .nest("/api/stats", stats::views::router(&app_state))
        .split_for_parts();

    router
        .merge(Scalar::with_url("/api/docs", api))
        .layer(DefaultBodyLimit::max(2 * 1024 * 1024))
}
