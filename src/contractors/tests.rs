use crate::config::test_helpers::setup_test_app;
use crate::test_helpers::{create_test_client, get_json, post_json, send_json};
use axum::http::StatusCode;
use serde_json::json;

#[tokio::test]
async fn test_contractor_crud_operations() {
    let app = setup_test_app().await;

    let (status, contractor) = post_json(
        &app,
        "/api/contractors",
        json!({ "name": "Rossi Servizi", "phone": "+39 02 1234567", "email": "rossi@example.com" }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "Failed to create contractor: {contractor}");
    assert_eq!(contractor["farm_count"], 0);
    let id = contractor["id"].as_str().unwrap();

    let uri = format!("/api/contractors/{id}");
    let (status, updated) = send_json(&app, "PUT", &uri, Some(json!({ "phone": "+39 02 7654321" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["phone"], "+39 02 7654321");
    assert_eq!(updated["name"], "Rossi Servizi");

    let (status, _) = send_json(&app, "DELETE", &uri, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = get_json(&app, &uri).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_contractor_farm_count() {
    let app = setup_test_app().await;
    let client_id = create_test_client(&app, "Acme").await;
    let (_, contractor) = post_json(&app, "/api/contractors", json!({ "name": "Bianchi Agro" })).await;
    let contractor_id = contractor["id"].as_str().unwrap();

    for name in ["North", "South"] {
        let (status, _) = post_json(
            &app,
            "/api/farms",
            json!({ "name": name, "client_id": client_id, "contractor_id": contractor_id }),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (_, fetched) = get_json(&app, &format!("/api/contractors/{contractor_id}")).await;
    assert_eq!(fetched["farm_count"], 2);

    let (status, list) = get_json(&app, "/api/contractors").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list[0]["farm_count"], 2);

    // Farms survive their contractor
    let (status, _) = send_json(&app, "DELETE", &format!("/api/contractors/{contractor_id}"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (_, farms) = get_json(&app, &format!("/api/farms?client_id={client_id}")).await;
    let farms = farms.as_array().unwrap();
    assert_eq!(farms.len(), 2);
    assert!(farms.iter().all(|f| f["contractor_id"].is_null()));
}

#[tokio::test]
async fn test_contractor_email_validated() {
    let app = setup_test_app().await;

    let (status, _) = post_json(
        &app,
        "/api/contractors",
        json!({ "name": "Rossi Servizi", "email": "not-an-email" }),
    )
    .await;
    assert!(!status.is_success());
    let (_, list) = get_json(&app, "/api/contractors").await;
    assert!(list.as_array().unwrap().is_empty());

    let (status, contractor) = post_json(
        &app,
        "/api/contractors",
        json!({ "name": "  Rossi Servizi ", "email": " rossi@example.com " }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "Failed to create contractor: {contractor}");
    assert_eq!(contractor["name"], "Rossi Servizi");
    assert_eq!(contractor["email"], "rossi@example.com");

    let uri = format!("/api/contractors/{}", contractor["id"].as_str().unwrap());
    let (status, _) = send_json(&app, "PUT", &uri, Some(json!({ "email": "rossi@" }))).await;
    assert!(!status.is_success());
    let (status, updated) = send_json(&app, "PUT", &uri, Some(json!({ "email": "   " }))).await;
    assert_eq!(status, StatusCode::OK);
    assert!(updated["email"].is_null());
}

#[tokio::test]
async fn test_blank_contractor_name_rejected() {
    let app = setup_test_app().await;
    let (status, _) = post_json(&app, "/api/contractors", json!({ "name": "   " })).await;
    assert!(!status.is_success());
    let (_, list) = get_json(&app, "/api/contractors").await;
    assert!(list.as_array().unwrap().is_empty());
}
