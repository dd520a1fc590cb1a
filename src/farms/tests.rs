use crate::config::test_helpers::{setup_test_app, setup_test_app_with_state};
use crate::test_helpers::{
    create_test_client, create_test_farm, create_test_parcel, dec, decimal_of, get_json,
    insert_contractor, post_json, send_json,
};
use axum::http::StatusCode;
use serde_json::json;
use uuid::Uuid;

#[tokio::test]
async fn test_farm_crud_operations() {
    let app = setup_test_app().await;
    let client_id = create_test_client(&app, "Acme").await;

    let (status, farm) = post_json(
        &app,
        "/api/farms",
        json!({ "name": "  North  ", "client_id": client_id }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "Failed to create farm: {farm}");
    assert_eq!(farm["name"], "North");
    assert_eq!(farm["client_id"], client_id);
    assert!(farm["contractor_id"].is_null());
    assert_eq!(decimal_of(&farm["area_hectares"]), dec("0"));
    let farm_id = farm["id"].as_str().unwrap();

    let (status, updated) = send_json(
        &app,
        "PUT",
        &format!("/api/farms/{farm_id}"),
        Some(json!({ "name": "North Ridge" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["name"], "North Ridge");

    let (status, list) = get_json(&app, "/api/farms").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list.as_array().unwrap().len(), 1);
    assert!(list[0]["parcels"].is_null());

    let (status, _) = send_json(&app, "DELETE", &format!("/api/farms/{farm_id}"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = get_json(&app, &format!("/api/farms/{farm_id}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = send_json(&app, "DELETE", &format!("/api/farms/{farm_id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_farm_detail_includes_parcels_and_area() {
    let app = setup_test_app().await;
    let client_id = create_test_client(&app, "Acme").await;
    let farm_id = create_test_farm(&app, &client_id, "North").await;
    create_test_parcel(&app, &farm_id, "B", "3.0").await;
    create_test_parcel(&app, &farm_id, "A", "2.0").await;

    let (status, farm) = get_json(&app, &format!("/api/farms/{farm_id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(decimal_of(&farm["area_hectares"]), dec("5.0"));
    let names: Vec<&str> = farm["parcels"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["A", "B"]);

    let (status, area) = get_json(&app, &format!("/api/farms/{farm_id}/area")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(area["farm_id"], farm_id);
    assert_eq!(decimal_of(&area["area_hectares"]), dec("5.0"));

    let (status, _) = get_json(&app, &format!("/api/farms/{}/area", Uuid::new_v4())).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_farm_contractor_assignment() {
    let (app, state) = setup_test_app_with_state().await;
    let contractor = insert_contractor(&state.db, "Rossi Servizi", None).await;
    let client_id = create_test_client(&app, "Acme").await;

    let (status, farm) = post_json(
        &app,
        "/api/farms",
        json!({ "name": "North", "client_id": client_id, "contractor_id": contractor }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(farm["contractor_name"], "Rossi Servizi");
    let farm_id = farm["id"].as_str().unwrap();

    let (_, filtered) = get_json(&app, &format!("/api/farms?contractor_id={contractor}")).await;
    assert_eq!(filtered.as_array().unwrap().len(), 1);

    // Omitting the field keeps the contractor, an explicit null clears it
    let uri = format!("/api/farms/{farm_id}");
    let (_, kept) = send_json(&app, "PUT", &uri, Some(json!({ "name": "North" }))).await;
    assert_eq!(kept["contractor_id"], contractor.to_string());
    let (_, cleared) = send_json(&app, "PUT", &uri, Some(json!({ "contractor_id": null }))).await;
    assert!(cleared["contractor_id"].is_null());
    assert!(cleared["contractor_name"].is_null());

    let (status, _) = send_json(&app, "PUT", &uri, Some(json!({ "contractor_id": Uuid::new_v4() }))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_farm_validation() {
    let app = setup_test_app().await;
    let client_id = create_test_client(&app, "Acme").await;

    let (status, body) = post_json(&app, "/api/farms", json!({ "name": "  ", "client_id": client_id })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

    let (status, _) = post_json(
        &app,
        "/api/farms",
        json!({ "name": "Orphan", "client_id": Uuid::new_v4() }),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = post_json(&app, "/api/farms", json!({ "client_id": client_id })).await;
    assert!(status.is_client_error());
}

#[tokio::test]
async fn test_farm_list_filters_by_client() {
    let app = setup_test_app().await;
    let acme = create_test_client(&app, "Acme").await;
    let other = create_test_client(&app, "Other").await;
    create_test_farm(&app, &acme, "North").await;
    create_test_farm(&app, &acme, "South").await;
    create_test_farm(&app, &other, "Lone").await;

    let (status, farms) = get_json(&app, &format!("/api/farms?client_id={acme}")).await;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<&str> = farms
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["North", "South"]);
}
