use crate::config::test_helpers::setup_test_app;
use crate::test_helpers::{
    create_test_client, create_test_farm, create_test_parcel, dec, decimal_of, get_json, post_json,
    send_json,
};
use axum::http::StatusCode;
use serde_json::json;
use uuid::Uuid;

#[tokio::test]
async fn test_parcel_crud_operations() {
    let app = setup_test_app().await;
    let client_id = create_test_client(&app, "Acme").await;
    let farm_id = create_test_farm(&app, &client_id, "North").await;

    let (status, parcel) = post_json(
        &app,
        "/api/parcels",
        json!({ "name": "A", "farm_id": farm_id, "area_hectares": "2.50" }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "Failed to create parcel: {parcel}");
    assert_eq!(parcel["farm_id"], farm_id);
    assert_eq!(decimal_of(&parcel["area_hectares"]), dec("2.5"));
    let parcel_id = parcel["id"].as_str().unwrap();

    let uri = format!("/api/parcels/{parcel_id}");
    let (status, fetched) = get_json(&app, &uri).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["name"], "A");

    let (status, updated) = send_json(&app, "PUT", &uri, Some(json!({ "name": "A1", "area_hectares": 3 }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["name"], "A1");
    assert_eq!(decimal_of(&updated["area_hectares"]), dec("3"));

    let (status, _) = send_json(&app, "DELETE", &uri, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = get_json(&app, &uri).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_parcel_area_must_be_positive() {
    let app = setup_test_app().await;
    let client_id = create_test_client(&app, "Acme").await;
    let farm_id = create_test_farm(&app, &client_id, "North").await;

    for area in ["0", "-1.5", "1.234"] {
        let (status, body) = post_json(
            &app,
            "/api/parcels",
            json!({ "name": "Bad", "farm_id": farm_id, "area_hectares": area }),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "area {area} accepted: {body}");
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }

    let parcel_id = create_test_parcel(&app, &farm_id, "Good", "1.0").await;
    let (status, _) = send_json(
        &app,
        "PUT",
        &format!("/api/parcels/{parcel_id}"),
        Some(json!({ "area_hectares": "0" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, parcel) = get_json(&app, &format!("/api/parcels/{parcel_id}")).await;
    assert_eq!(decimal_of(&parcel["area_hectares"]), dec("1.0"));
}

#[tokio::test]
async fn test_parcel_requires_existing_farm() {
    let app = setup_test_app().await;
    let (status, body) = post_json(
        &app,
        "/api/parcels",
        json!({ "name": "Nowhere", "farm_id": Uuid::new_v4(), "area_hectares": "1.0" }),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "RESOURCE_NOT_FOUND");
}

#[tokio::test]
async fn test_parcel_list_by_farm() {
    let app = setup_test_app().await;
    let client_id = create_test_client(&app, "Acme").await;
    let north = create_test_farm(&app, &client_id, "North").await;
    let south = create_test_farm(&app, &client_id, "South").await;
    create_test_parcel(&app, &north, "B", "3.0").await;
    create_test_parcel(&app, &north, "A", "2.0").await;
    create_test_parcel(&app, &south, "C", "4.0").await;

    let (status, all) = get_json(&app, "/api/parcels").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(all.as_array().unwrap().len(), 3);

    let (_, north_parcels) = get_json(&app, &format!("/api/parcels?farm_id={north}")).await;
    let names: Vec<&str> = north_parcels
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["A", "B"]);

    let (_, area) = get_json(&app, &format!("/api/clients/{client_id}/area")).await;
    assert_eq!(decimal_of(&area["area_hectares"]), dec("9.0"));
}
