use super::models::{AdvisoryLevel, WeatherConditions};
use super::services::{is_rain_condition, spray_advisory};
use crate::config::test_helpers::{setup_test_app, setup_test_state};
use crate::external::weather::{WeatherError, WeatherProvider};
use crate::routes::build_router_with_state;
use crate::test_helpers::{extract_response_body, get_json};
use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use rstest::rstest;
use serde_json::json;
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

fn weather(wind: f64, humidity: f64, temperature: f64, is_day: bool, code: u16) -> WeatherConditions {
    WeatherConditions {
        wind_kph: wind,
        humidity,
        temperature_c: temperature,
        is_day,
        condition_code: code,
    }
}

#[rstest]
#[case::strong_wind(weather(20.0, 50.0, 18.0, true, 1000), AdvisoryLevel::Bad)]
#[case::wind_beats_humidity(weather(16.0, 95.0, 18.0, true, 1000), AdvisoryLevel::Bad)]
#[case::humid(weather(3.0, 90.0, 18.0, true, 1000), AdvisoryLevel::Warning)]
#[case::cold(weather(3.0, 50.0, 4.0, true, 1000), AdvisoryLevel::Warning)]
#[case::hot(weather(3.0, 50.0, 31.0, true, 1000), AdvisoryLevel::Warning)]
#[case::night(weather(3.0, 50.0, 18.0, false, 1000), AdvisoryLevel::Warning)]
#[case::night_beats_rain(weather(3.0, 50.0, 18.0, false, 1183), AdvisoryLevel::Warning)]
#[case::rain(weather(3.0, 50.0, 18.0, true, 1183), AdvisoryLevel::Bad)]
#[case::ideal(weather(3.0, 50.0, 18.0, true, 1000), AdvisoryLevel::Good)]
#[case::ideal_bounds(weather(4.9, 69.0, 10.0, true, 1000), AdvisoryLevel::Good)]
#[case::breezy(weather(10.0, 50.0, 18.0, true, 1000), AdvisoryLevel::Neutral)]
#[case::warm(weather(3.0, 50.0, 27.0, true, 1003), AdvisoryLevel::Neutral)]
#[case::exactly_fifteen(weather(15.0, 50.0, 18.0, true, 1000), AdvisoryLevel::Neutral)]
fn test_decision_table(#[case] conditions: WeatherConditions, #[case] expected: AdvisoryLevel) {
    assert_eq!(spray_advisory(&conditions).level, expected);
}

#[rstest]
#[case(1063, true)]
#[case(1276, true)]
#[case(1000, false)]
#[case(1003, false)]
#[case(1087, false)]
fn test_rain_codes(#[case] code: u16, #[case] rain: bool) {
    assert_eq!(is_rain_condition(code), rain);
}

#[test]
fn test_details_mention_readings() {
    let advice = spray_advisory(&weather(22.5, 40.0, 15.0, true, 1000));
    assert!(advice.details.contains("22.5 km/h"));
}

#[tokio::test]
async fn test_advisory_endpoint() {
    let app = setup_test_app().await;

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/advisory")
                .header("content-type", "application/json")
                .body(Body::from(
                    json!({"wind_kph": 2.0, "humidity": 55.0, "temperature_c": 20.0})
                        .to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    let (status, body) = extract_response_body(response).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["level"], "good");
    assert!(body["text"].as_str().unwrap().contains("Ideal"));
}

/// Fixed reading that remembers which locations were asked for
struct FixedWeather {
    conditions: WeatherConditions,
    asked: Mutex<Vec<String>>,
}

#[async_trait]
impl WeatherProvider for FixedWeather {
    async fn current(&self, location: &str) -> Result<WeatherConditions, WeatherError> {
        self.asked.lock().unwrap().push(location.to_string());
        if location == "Atlantis" {
            return Err(WeatherError::LocationNotFound(location.to_string()));
        }
        Ok(self.conditions.clone())
    }
}

#[tokio::test]
async fn test_current_advisory_uses_live_weather() {
    let provider = Arc::new(FixedWeather {
        conditions: weather(3.0, 50.0, 18.0, true, 1183),
        asked: Mutex::new(Vec::new()),
    });
    let state = setup_test_state().await.with_weather(provider.clone());
    let app = build_router_with_state(state);

    let (status, body) = get_json(&app, "/api/advisory/current").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["advisory"]["level"], "bad");
    assert_eq!(body["weather"]["location"], "Alba, Piemonte, Italy");
    assert_eq!(body["weather"]["conditions"]["condition_code"], 1183);
    assert_eq!(body["weather"]["from_cache"], false);

    let (_, body) = get_json(&app, "/api/advisory/current").await;
    assert_eq!(body["weather"]["from_cache"], true);
    assert_eq!(provider.asked.lock().unwrap().len(), 1);

    let (status, _) = get_json(&app, "/api/advisory/current?location=Atlantis").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_current_advisory_without_api_key() {
    let app = setup_test_app().await;
    let (status, _) = get_json(&app, "/api/advisory/current").await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
}
