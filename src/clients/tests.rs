use crate::config::test_helpers::{setup_test_app, setup_test_app_with_state};
use crate::test_helpers::{
    create_test_client, create_test_farm, create_test_parcel, create_via_api, dec, decimal_of,
    get_json, insert_contractor, post_json, send_json,
};
use axum::http::StatusCode;
use serde_json::json;
use uuid::Uuid;

#[tokio::test]
async fn test_client_crud_operations() {
    let app = setup_test_app().await;

    let (status, client) = post_json(&app, "/api/clients", json!({ "name": "Acme" })).await;
    assert_eq!(status, StatusCode::CREATED, "Failed to create client: {client}");
    assert_eq!(client["name"], "Acme");
    let client_id = client["id"].as_str().unwrap();

    let uri = format!("/api/clients/{client_id}");
    let (status, updated) = send_json(&app, "PUT", &uri, Some(json!({ "name": "Acme Srl" }))).await;
    assert_eq!(status, StatusCode::OK, "Failed to update client: {updated}");
    assert_eq!(updated["name"], "Acme Srl");

    let (status, list) = get_json(&app, "/api/clients").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list.as_array().unwrap().len(), 1);
    assert_eq!(decimal_of(&list[0]["area_hectares"]), dec("0"));

    let (status, _) = send_json(&app, "DELETE", &uri, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = get_json(&app, &uri).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_client_detail_rolls_up_area() {
    let (app, state) = setup_test_app_with_state().await;
    let contractor = insert_contractor(&state.db, "Rossi Servizi", None).await;
    let client_id = create_test_client(&app, "Acme").await;
    let north = create_test_farm(&app, &client_id, "North").await;
    let (_, south) = create_via_api(
        &app,
        "/api/farms",
        json!({ "name": "South", "client_id": client_id, "contractor_id": contractor }),
    )
    .await
    .unwrap();
    let south = south["id"].as_str().unwrap().to_string();
    create_test_parcel(&app, &north, "A", "2.0").await;
    create_test_parcel(&app, &north, "B", "3.0").await;
    create_test_parcel(&app, &south, "C", "4.0").await;

    let (status, client) = get_json(&app, &format!("/api/clients/{client_id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(decimal_of(&client["area_hectares"]), dec("9.0"));

    let farms = client["farms"].as_array().unwrap();
    assert_eq!(farms.len(), 2);
    assert_eq!(farms[0]["name"], "North");
    assert_eq!(decimal_of(&farms[0]["area_hectares"]), dec("5.0"));
    assert_eq!(farms[1]["contractor_id"], contractor.to_string());
    assert_eq!(decimal_of(&farms[1]["area_hectares"]), dec("4.0"));

    let (status, area) = get_json(&app, &format!("/api/clients/{client_id}/area")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(area["client_id"], client_id);
    assert_eq!(decimal_of(&area["area_hectares"]), dec("9.0"));
}

#[tokio::test]
async fn test_client_area_not_found() {
    let app = setup_test_app().await;
    let (status, body) = get_json(&app, &format!("/api/clients/{}/area", Uuid::new_v4())).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "RESOURCE_NOT_FOUND");
}

#[tokio::test]
async fn test_client_deletion_cascades_to_farms() {
    let app = setup_test_app().await;
    let client_id = create_test_client(&app, "Acme").await;
    let farm_id = create_test_farm(&app, &client_id, "North").await;
    let parcel_id = create_test_parcel(&app, &farm_id, "A", "2.0").await;
    let survivor = create_test_client(&app, "Other").await;
    let survivor_farm = create_test_farm(&app, &survivor, "Lone").await;

    let (status, _) = send_json(&app, "DELETE", &format!("/api/clients/{client_id}"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = get_json(&app, &format!("/api/farms/{farm_id}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = get_json(&app, &format!("/api/parcels/{parcel_id}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = get_json(&app, &format!("/api/farms/{survivor_farm}")).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_client_contacts() {
    let app = setup_test_app().await;
    let client_id = create_test_client(&app, "Acme").await;

    for (name, email) in [("Zoe", "zoe@acme.test"), ("Anna", "anna@acme.test")] {
        let (status, contact) = post_json(
            &app,
            "/api/contacts",
            json!({ "client_id": client_id, "name": name, "email": email }),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED, "Failed to create contact: {contact}");
    }

    let (status, _) = post_json(
        &app,
        "/api/contacts",
        json!({ "client_id": client_id, "name": "Broken", "email": "not-an-address" }),
    )
    .await;
    assert!(!status.is_success(), "Invalid e-mail accepted");

    let (_, client) = get_json(&app, &format!("/api/clients/{client_id}")).await;
    let names: Vec<&str> = client["contacts"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Anna", "Zoe"]);
}

#[tokio::test]
async fn test_blank_client_name_rejected() {
    let app = setup_test_app().await;

    let (status, _) = post_json(&app, "/api/clients", json!({ "name": "   " })).await;
    assert!(!status.is_success());
    let (_, list) = get_json(&app, "/api/clients").await;
    assert!(list.as_array().unwrap().is_empty());

    let (status, client) = post_json(&app, "/api/clients", json!({ "name": " Acme " })).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(client["name"], "Acme");

    let uri = format!("/api/clients/{}", client["id"].as_str().unwrap());
    let (status, _) = send_json(&app, "PUT", &uri, Some(json!({ "name": "" }))).await;
    assert!(!status.is_success());
    let (_, fetched) = get_json(&app, &uri).await;
    assert_eq!(fetched["name"], "Acme");
}
