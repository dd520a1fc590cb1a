use super::services::database_stats;
use crate::config::test_helpers::{setup_test_app_with_state, setup_test_db};
use crate::parcels::models as parcels;
use crate::test_helpers::{
    dec, decimal_of, get_json, insert_contact, insert_contractor, insert_product, post_json,
    seed_acme,
};
use axum::http::StatusCode;
use rust_decimal::Decimal;
use sea_orm::EntityTrait;
use serde_json::json;

#[tokio::test]
async fn test_empty_database_has_zero_counts() {
    let db = setup_test_db().await;
    let stats = database_stats(&db).await.unwrap();
    assert_eq!(stats.clients, 0);
    assert_eq!(stats.parcels, 0);
    assert_eq!(stats.active_ingredients, 0);
    assert_eq!(stats.total_area_hectares, Decimal::ZERO);
    assert_eq!(stats.treatments.total, 0);
}

#[tokio::test]
async fn test_stats_endpoint_counts_current_rows() {
    let (app, state) = setup_test_app_with_state().await;
    let contractor = insert_contractor(&state.db, "Rossi Servizi", None).await;
    let acme = seed_acme(&state.db, Some(contractor)).await;
    insert_contact(&state.db, acme.client, "Anna", "anna@acme.example").await;
    insert_product(&state.db, "Cuprofix", "kg").await;
    insert_product(&state.db, "Thiovit", "kg").await;
    let (status, _) = post_json(&app, "/api/active_ingredients", json!({ "name": "Copper" })).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = get_json(&app, "/api/stats").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["clients"], 1);
    assert_eq!(body["farms"], 2);
    assert_eq!(body["parcels"], 3);
    assert_eq!(body["contractors"], 1);
    assert_eq!(body["contacts"], 1);
    assert_eq!(body["products"], 2);
    assert_eq!(body["active_ingredients"], 1);
    assert_eq!(decimal_of(&body["total_area_hectares"]), dec("9.0"));
    assert_eq!(body["treatments"]["total"], 0);

    // Nothing is cached: removing a parcel shows up on the next request
    parcels::Entity::delete_by_id(acme.parcel_c)
        .exec(&state.db)
        .await
        .unwrap();
    let (_, body) = get_json(&app, "/api/stats").await;
    assert_eq!(body["parcels"], 2);
    assert_eq!(decimal_of(&body["total_area_hectares"]), dec("5.0"));
}
