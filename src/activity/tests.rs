use super::models::{ActivityType, Entity as ActivityLog};
use super::services::{self, record};
use crate::config::test_helpers::{setup_test_db, setup_test_state};
use crate::routes::build_router_with_state;
use crate::test_helpers::{
    RecordingNotifier, create_test_client, create_test_farm, create_test_parcel, create_via_api,
    get_json, post_json, send_json,
};
use axum::http::StatusCode;
use rust_decimal::Decimal;
use sea_orm::{EntityTrait, PaginatorTrait};
use serde_json::{Value, json};
use uuid::Uuid;

fn types_of(feed: &Value) -> Vec<&str> {
    feed.as_array()
        .unwrap()
        .iter()
        .map(|entry| entry["activity_type"].as_str().unwrap())
        .collect()
}

#[tokio::test]
async fn test_actions_fill_the_feed_newest_first() {
    let notifier = RecordingNotifier::new();
    let state = setup_test_state().await.with_notifier(notifier.clone());
    let app = build_router_with_state(state);

    let client_id = create_test_client(&app, "Acme").await;
    let farm_id = create_test_farm(&app, &client_id, "North").await;
    create_test_parcel(&app, &farm_id, "A", "2.5").await;
    create_via_api(&app, "/api/contractors", json!({ "name": "Rossi Servizi" }))
        .await
        .unwrap();
    create_via_api(
        &app,
        "/api/contacts",
        json!({ "client_id": client_id, "name": "Anna", "email": "anna@acme.test" }),
    )
    .await
    .unwrap();
    let (product_id, _) = create_via_api(
        &app,
        "/api/products",
        json!({ "name": "Fungicide-X", "unit_of_measure": "L" }),
    )
    .await
    .unwrap();
    let (treatment_id, _) = create_via_api(
        &app,
        "/api/treatments",
        json!({
            "scope_level": "client",
            "client_id": client_id,
            "products": [{ "product_id": product_id, "dosage_per_hectare": "1.0" }]
        }),
    )
    .await
    .unwrap();

    let uri = format!("/api/treatments/{treatment_id}");
    let (status, _) = send_json(&app, "PATCH", &uri, Some(json!({ "notes": "After rain" }))).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = post_json(&app, &format!("{uri}/communicate"), json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(notifier.count(), 1);
    let (status, _) =
        post_json(&app, &format!("{uri}/status"), json!({ "status": "in_execution" })).await;
    assert_eq!(status, StatusCode::OK);

    let (status, feed) = get_json(&app, "/api/activity?range=%5B0%2C49%5D").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        types_of(&feed),
        vec![
            "treatment_updated",
            "communication_sent",
            "treatment_updated",
            "treatment_created",
            "product_created",
            "contact_created",
            "contractor_created",
            "parcel_created",
            "farm_created",
            "client_created",
        ]
    );

    assert_eq!(feed[0]["related_object_type"], "treatment");
    assert_eq!(feed[0]["related_object_id"], treatment_id);
    assert_eq!(feed[0]["extra_data"]["details"]["to"], "in_execution");
    assert_eq!(feed[2]["extra_data"]["changes"], json!(["notes"]));
    assert_eq!(feed[7]["description"], "Parcel A (2.5 ha) was added to farm North");
    assert_eq!(feed[9]["title"], "New client: Acme");

    // Default page is the ten newest
    let (_, page) = get_json(&app, "/api/activity").await;
    assert_eq!(page.as_array().unwrap().len(), 10);

    let (status, clients_only) = get_json(
        &app,
        "/api/activity?filter=%7B%22activity_type%22%3A%22client_created%22%7D",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(types_of(&clients_only), vec!["client_created"]);
}

#[tokio::test]
async fn test_rejected_actions_leave_no_trace() {
    let state = setup_test_state().await;
    let app = build_router_with_state(state.clone());

    let (status, _) = post_json(&app, "/api/clients", json!({ "name": " " })).await;
    assert!(!status.is_success());
    let (status, _) = post_json(
        &app,
        "/api/treatments",
        json!({ "scope_level": "client", "client_id": Uuid::new_v4() }),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    assert_eq!(ActivityLog::find().count(&state.db).await.unwrap(), 0);
}

#[tokio::test]
async fn test_record_stores_related_object() {
    let db = setup_test_db().await;
    let id = Uuid::new_v4();
    record(&db, services::parcel_created(id, "A", Decimal::new(25, 1), "North")).await;

    let rows = ActivityLog::find().all(&db).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].activity_type, ActivityType::ParcelCreated);
    assert_eq!(rows[0].related_object_type.as_deref(), Some("parcel"));
    assert_eq!(rows[0].related_object_id, Some(id));
    assert_eq!(rows[0].extra_data["area_hectares"], "2.5");
}

#[test]
fn test_communication_title_uses_short_id() {
    let id = Uuid::parse_str("0f1e2d3c-4b5a-6978-8796-a5b4c3d2e1f0").unwrap();
    let activity = services::communication_sent(id, "Acme", 2);
    assert_eq!(activity.title, "Communication sent for treatment #0f1e2d3c");
    assert_eq!(activity.extra_data["recipient_count"], 2);
}
