/// Shared helpers for the test suite.
///
/// Two families of builders: direct inserts for tests that work on the
/// service layer, and HTTP requests for tests that drive the router. Both
/// follow the hierarchy Clients → Farms → Parcels, with Contractors and
/// Products on the side.
use crate::external::notifier::{Notifier, OutgoingMessage};
use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set};
use serde_json::{Value, json};
use std::str::FromStr;
use std::sync::{Arc, Mutex};
use tower::ServiceExt;
use uuid::Uuid;

/// Extract response body as JSON for testing
pub async fn extract_response_body(response: axum::response::Response) -> (StatusCode, Value) {
    use axum::body::to_bytes;

    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read response body");
    let body: Value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| json!({"error": "Invalid JSON response"}))
    };
    (status, body)
}

/// Decimals travel as strings, but accept numbers too
pub fn decimal_of(value: &Value) -> Decimal {
    match value {
        Value::String(s) => Decimal::from_str(s).expect("decimal string"),
        Value::Number(n) => Decimal::from_str(&n.to_string()).expect("decimal number"),
        other => panic!("Expected a decimal, got {other}"),
    }
}

pub fn dec(value: &str) -> Decimal {
    Decimal::from_str(value).expect("valid decimal literal")
}

pub async fn insert_client(db: &DatabaseConnection, name: &str) -> Uuid {
    let now = Utc::now();
    crate::clients::models::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(name.to_string()),
        created_at: Set(now),
        last_updated: Set(now),
    }
    .insert(db)
    .await
    .expect("Failed to insert client")
    .id
}

pub async fn insert_contractor(db: &DatabaseConnection, name: &str, email: Option<&str>) -> Uuid {
    let now = Utc::now();
    crate::contractors::models::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(name.to_string()),
        phone: Set(None),
        email: Set(email.map(str::to_string)),
        created_at: Set(now),
        last_updated: Set(now),
    }
    .insert(db)
    .await
    .expect("Failed to insert contractor")
    .id
}

pub async fn insert_farm(
    db: &DatabaseConnection,
    client_id: Uuid,
    name: &str,
    contractor_id: Option<Uuid>,
) -> Uuid {
    let now = Utc::now();
    crate::farms::models::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(name.to_string()),
        client_id: Set(client_id),
        contractor_id: Set(contractor_id),
        created_at: Set(now),
        last_updated: Set(now),
    }
    .insert(db)
    .await
    .expect("Failed to insert farm")
    .id
}

pub async fn insert_parcel(db: &DatabaseConnection, farm_id: Uuid, name: &str, area: &str) -> Uuid {
    let now = Utc::now();
    crate::parcels::models::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(name.to_string()),
        farm_id: Set(farm_id),
        area_hectares: Set(dec(area)),
        created_at: Set(now),
        last_updated: Set(now),
    }
    .insert(db)
    .await
    .expect("Failed to insert parcel")
    .id
}

pub async fn insert_product(db: &DatabaseConnection, name: &str, unit: &str) -> Uuid {
    let now = Utc::now();
    crate::products::models::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(name.to_string()),
        unit_of_measure: Set(unit.to_string()),
        description: Set(None),
        created_at: Set(now),
        last_updated: Set(now),
    }
    .insert(db)
    .await
    .expect("Failed to insert product")
    .id
}

pub async fn insert_contact(db: &DatabaseConnection, client_id: Uuid, name: &str, email: &str) -> Uuid {
    crate::clients::contacts::models::ActiveModel {
        id: Set(Uuid::new_v4()),
        client_id: Set(client_id),
        name: Set(name.to_string()),
        email: Set(email.to_string()),
        created_at: Set(Utc::now()),
    }
    .insert(db)
    .await
    .expect("Failed to insert contact")
    .id
}

/// Ids of the reference hierarchy: Acme with North (A 2.0, B 3.0) and South (C 4.0)
pub struct Acme {
    pub client: Uuid,
    pub north: Uuid,
    pub south: Uuid,
    pub parcel_a: Uuid,
    pub parcel_b: Uuid,
    pub parcel_c: Uuid,
}

pub async fn seed_acme(db: &DatabaseConnection, contractor: Option<Uuid>) -> Acme {
    let client = insert_client(db, "Acme").await;
    let north = insert_farm(db, client, "North", contractor).await;
    let south = insert_farm(db, client, "South", None).await;
    Acme {
        client,
        north,
        south,
        parcel_a: insert_parcel(db, north, "A", "2.0").await,
        parcel_b: insert_parcel(db, north, "B", "3.0").await,
        parcel_c: insert_parcel(db, south, "C", "4.0").await,
    }
}

/// Sends a JSON request through the router and returns status and body
pub async fn send_json(app: &axum::Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(value) => {
            builder = builder.header("content-type", "application/json");
            Body::from(value.to_string())
        }
        None => Body::empty(),
    };

    let response = app
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();
    extract_response_body(response).await
}

pub async fn get_json(app: &axum::Router, uri: &str) -> (StatusCode, Value) {
    send_json(app, "GET", uri, None).await
}

pub async fn post_json(app: &axum::Router, uri: &str, body: Value) -> (StatusCode, Value) {
    send_json(app, "POST", uri, Some(body)).await
}

/// Create a resource through the API and return its id
pub async fn create_via_api(app: &axum::Router, uri: &str, body: Value) -> Result<(String, Value), String> {
    let (status, body) = post_json(app, uri, body).await;
    if status == StatusCode::CREATED {
        let id = body["id"].as_str().unwrap().to_string();
        Ok((id, body))
    } else {
        Err(format!("Failed to create {uri}: Status {status}, Body: {body}"))
    }
}

pub async fn create_test_client(app: &axum::Router, name: &str) -> String {
    create_via_api(app, "/api/clients", json!({ "name": name }))
        .await
        .unwrap()
        .0
}

pub async fn create_test_farm(app: &axum::Router, client_id: &str, name: &str) -> String {
    create_via_api(app, "/api/farms", json!({ "name": name, "client_id": client_id }))
        .await
        .unwrap()
        .0
}

pub async fn create_test_parcel(app: &axum::Router, farm_id: &str, name: &str, area: &str) -> String {
    create_via_api(
        app,
        "/api/parcels",
        json!({ "name": name, "farm_id": farm_id, "area_hectares": area }),
    )
    .await
    .unwrap()
    .0
}

/// Notifier that keeps every message it is given
#[derive(Default)]
pub struct RecordingNotifier {
    pub sent: Mutex<Vec<OutgoingMessage>>,
}

impl RecordingNotifier {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, message: &OutgoingMessage) -> Result<(), String> {
        self.sent.lock().unwrap().push(message.clone());
        Ok(())
    }
}

/// Notifier whose deliveries always fail with the given reason
pub struct FailingNotifier(pub &'static str);

#[async_trait]
impl Notifier for FailingNotifier {
    async fn send(&self, _message: &OutgoingMessage) -> Result<(), String> {
        Err(self.0.to_string())
    }
}
