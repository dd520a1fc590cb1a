use super::errors::BusinessError;
use super::models::HealthCheck;
use crate::config::test_helpers::setup_test_app;
use crate::test_helpers::extract_response_body;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::response::IntoResponse;
use tower::ServiceExt;

#[test]
fn test_health_check_serialization() {
    let check = HealthCheck {
        status: "ok".to_string(),
    };
    let json = serde_json::to_value(&check).unwrap();
    assert_eq!(json["status"], "ok");
}

#[tokio::test]
async fn test_healthz_endpoint() {
    let app = setup_test_app().await;

    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/healthz")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let (status, body) = extract_response_body(response).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_business_error_response_shape() {
    let response = BusinessError::Duplicate {
        resource: "treatment product".to_string(),
        field: "product_id".to_string(),
    }
    .into_response();

    let (status, body) = extract_response_body(response).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "DUPLICATE_RESOURCE");
    assert_eq!(body["error"]["type"], "Duplicate");
    assert!(
        body["error"]["message"]
            .as_str()
            .unwrap()
            .contains("product_id")
    );
}

#[tokio::test]
async fn test_unknown_route_is_not_found() {
    let app = setup_test_app().await;

    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/api/nonexistent")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
