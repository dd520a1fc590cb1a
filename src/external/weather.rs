//! Current weather from WeatherAPI.com, cached per location.
//!
//! [`WeatherProvider`] is the network seam; [`WeatherService`] adds the
//! cache and falls back to an older reading when the provider fails.

use crate::advisory::models::WeatherConditions;
use crate::common::errors::BusinessError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use utoipa::ToSchema;

pub const DEFAULT_BASE_URL: &str = "https://api.weatherapi.com/v1/current.json";
pub const CACHE_TTL: Duration = Duration::from_secs(600);
/// How long an expired reading may still stand in for a failed fetch
pub const STALE_TTL: Duration = Duration::from_secs(3600);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WeatherError {
    NotConfigured,
    InvalidKey,
    LocationNotFound(String),
    Upstream(String),
}

impl std::fmt::Display for WeatherError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotConfigured => write!(f, "weather API key is not configured"),
            Self::InvalidKey => write!(f, "weather API key was rejected"),
            Self::LocationNotFound(location) => write!(f, "location '{location}' not found"),
            Self::Upstream(message) => write!(f, "{message}"),
        }
    }
}

impl From<WeatherError> for BusinessError {
    fn from(err: WeatherError) -> Self {
        match err {
            WeatherError::LocationNotFound(_) => BusinessError::ValidationError {
                field: "location".to_string(),
                message: err.to_string(),
            },
            other => BusinessError::ExternalServiceError {
                service: "weather".to_string(),
                message: other.to_string(),
            },
        }
    }
}

#[async_trait]
pub trait WeatherProvider: Send + Sync {
    async fn current(&self, location: &str) -> Result<WeatherConditions, WeatherError>;
}

#[derive(Deserialize)]
struct ApiResponse {
    current: ApiCurrent,
}

#[derive(Deserialize)]
struct ApiCurrent {
    wind_kph: f64,
    humidity: f64,
    temp_c: f64,
    is_day: u8,
    condition: ApiCondition,
}

#[derive(Deserialize)]
struct ApiCondition {
    code: u16,
}

impl From<ApiCurrent> for WeatherConditions {
    fn from(current: ApiCurrent) -> Self {
        WeatherConditions {
            wind_kph: current.wind_kph,
            humidity: current.humidity,
            temperature_c: current.temp_c,
            is_day: current.is_day == 1,
            condition_code: current.condition.code,
        }
    }
}

fn parse_current(body: &str) -> Result<WeatherConditions, WeatherError> {
    serde_json::from_str::<ApiResponse>(body)
        .map(|response| response.current.into())
        .map_err(|e| WeatherError::Upstream(format!("unexpected weather payload: {e}")))
}

fn error_for_status(status: reqwest::StatusCode, location: &str) -> WeatherError {
    match status {
        reqwest::StatusCode::UNAUTHORIZED => WeatherError::InvalidKey,
        reqwest::StatusCode::BAD_REQUEST => WeatherError::LocationNotFound(location.to_string()),
        other => WeatherError::Upstream(format!("weather API answered {other}")),
    }
}

/// Client for the WeatherAPI.com `current.json` endpoint
pub struct WeatherApiClient {
    http: reqwest::Client,
    api_key: Option<String>,
    base_url: String,
}

impl WeatherApiClient {
    pub fn new(api_key: Option<String>, base_url: String) -> Self {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_default();
        Self {
            http,
            api_key: api_key.filter(|key| !key.trim().is_empty()),
            base_url,
        }
    }
}

#[async_trait]
impl WeatherProvider for WeatherApiClient {
    async fn current(&self, location: &str) -> Result<WeatherConditions, WeatherError> {
        let api_key = self.api_key.as_deref().ok_or(WeatherError::NotConfigured)?;

        let response = self
            .http
            .get(&self.base_url)
            .query(&[("key", api_key), ("q", location), ("lang", "it"), ("aqi", "no")])
            .send()
            .await
            .map_err(|e| WeatherError::Upstream(format!("weather request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(error_for_status(status, location));
        }
        let body = response
            .text()
            .await
            .map_err(|e| WeatherError::Upstream(format!("weather response unreadable: {e}")))?;
        parse_current(&body)
    }
}

#[derive(ToSchema, Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct WeatherReport {
    pub location: String,
    pub conditions: WeatherConditions,
    pub fetched_at: DateTime<Utc>,
    pub from_cache: bool,
    /// Set when the provider failed and an expired reading was served instead
    pub is_stale: bool,
}

struct CachedReading {
    conditions: WeatherConditions,
    fetched_at: DateTime<Utc>,
    stored: Instant,
}

pub struct WeatherService {
    provider: Arc<dyn WeatherProvider>,
    ttl: Duration,
    stale_ttl: Duration,
    cache: RwLock<HashMap<String, CachedReading>>,
}

impl WeatherService {
    pub fn new(provider: Arc<dyn WeatherProvider>) -> Self {
        Self::with_ttl(provider, CACHE_TTL, STALE_TTL)
    }

    pub fn with_ttl(
        provider: Arc<dyn WeatherProvider>,
        ttl: Duration,
        stale_ttl: Duration,
    ) -> Self {
        Self {
            provider,
            ttl,
            stale_ttl,
            cache: RwLock::new(HashMap::new()),
        }
    }

    async fn cached(
        &self,
        key: &str,
        max_age: Duration,
    ) -> Option<(WeatherConditions, DateTime<Utc>)> {
        let cache = self.cache.read().await;
        cache
            .get(key)
            .filter(|reading| reading.stored.elapsed() < max_age)
            .map(|reading| (reading.conditions.clone(), reading.fetched_at))
    }

    pub async fn current(&self, location: &str) -> Result<WeatherReport, WeatherError> {
        let location = location.trim();
        if location.is_empty() {
            return Err(WeatherError::LocationNotFound(String::new()));
        }
        let key = location.to_lowercase();

        if let Some((conditions, fetched_at)) = self.cached(&key, self.ttl).await {
            tracing::debug!(location, "Weather served from cache");
            return Ok(WeatherReport {
                location: location.to_string(),
                conditions,
                fetched_at,
                from_cache: true,
                is_stale: false,
            });
        }

        match self.provider.current(location).await {
            Ok(conditions) => {
                let fetched_at = Utc::now();
                self.cache.write().await.insert(
                    key,
                    CachedReading {
                        conditions: conditions.clone(),
                        fetched_at,
                        stored: Instant::now(),
                    },
                );
                tracing::info!(location, "Weather fetched");
                Ok(WeatherReport {
                    location: location.to_string(),
                    conditions,
                    fetched_at,
                    from_cache: false,
                    is_stale: false,
                })
            }
            Err(err) => match self.cached(&key, self.stale_ttl).await {
                Some((conditions, fetched_at)) => {
                    tracing::warn!(
                        location,
                        error = %err,
                        "Weather fetch failed, serving stale reading"
                    );
                    Ok(WeatherReport {
                        location: location.to_string(),
                        conditions,
                        fetched_at,
                        from_cache: true,
                        is_stale: true,
                    })
                }
                None => {
                    tracing::warn!(location, error = %err, "Weather fetch failed");
                    Err(err)
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Answers the first `successes` calls, then fails
    struct Scripted {
        calls: AtomicUsize,
        successes: usize,
    }

    impl Scripted {
        fn new(successes: usize) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                successes,
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl WeatherProvider for Scripted {
        async fn current(&self, _location: &str) -> Result<WeatherConditions, WeatherError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call < self.successes {
                Ok(WeatherConditions {
                    wind_kph: 3.0,
                    humidity: 50.0,
                    temperature_c: 18.0,
                    is_day: true,
                    condition_code: 1000,
                })
            } else {
                Err(WeatherError::Upstream("weather API answered 503".to_string()))
            }
        }
    }

    #[test]
    fn test_parse_current() {
        let body = json!({
            "location": { "name": "Alba" },
            "current": {
                "temp_c": 21.5,
                "is_day": 0,
                "wind_kph": 7.2,
                "humidity": 64,
                "condition": { "text": "Pioggia leggera", "code": 1183 }
            }
        })
        .to_string();

        let conditions = parse_current(&body).unwrap();
        assert_eq!(conditions.temperature_c, 21.5);
        assert_eq!(conditions.humidity, 64.0);
        assert!(!conditions.is_day);
        assert_eq!(conditions.condition_code, 1183);
    }

    #[test]
    fn test_parse_rejects_missing_current() {
        assert!(matches!(
            parse_current(r#"{"error":{"code":1006}}"#),
            Err(WeatherError::Upstream(_))
        ));
    }

    #[rstest]
    #[case(reqwest::StatusCode::UNAUTHORIZED, WeatherError::InvalidKey)]
    #[case(reqwest::StatusCode::BAD_REQUEST, WeatherError::LocationNotFound("Atlantis".to_string()))]
    #[case(
        reqwest::StatusCode::SERVICE_UNAVAILABLE,
        WeatherError::Upstream("weather API answered 503 Service Unavailable".to_string())
    )]
    fn test_status_mapping(#[case] status: reqwest::StatusCode, #[case] expected: WeatherError) {
        assert_eq!(error_for_status(status, "Atlantis"), expected);
    }

    #[test]
    fn test_business_error_mapping() {
        let err: BusinessError = WeatherError::LocationNotFound("Atlantis".to_string()).into();
        assert!(matches!(
            err,
            BusinessError::ValidationError { ref field, .. } if field == "location"
        ));
        let err: BusinessError = WeatherError::NotConfigured.into();
        assert!(matches!(err, BusinessError::ExternalServiceError { .. }));
    }

    #[tokio::test]
    async fn test_missing_key_is_not_configured() {
        let client = WeatherApiClient::new(Some("  ".to_string()), DEFAULT_BASE_URL.to_string());
        assert_eq!(client.current("Alba").await, Err(WeatherError::NotConfigured));
    }

    #[tokio::test]
    async fn test_second_read_comes_from_cache() {
        let provider = Scripted::new(usize::MAX);
        let service = WeatherService::new(provider.clone());

        let first = service.current("Alba, Piemonte, Italy").await.unwrap();
        assert!(!first.from_cache);
        let second = service.current("  alba, piemonte, italy ").await.unwrap();
        assert!(second.from_cache);
        assert!(!second.is_stale);
        assert_eq!(second.fetched_at, first.fetched_at);
        assert_eq!(provider.calls(), 1);
    }

    #[tokio::test]
    async fn test_failed_fetch_falls_back_to_stale_reading() {
        let provider = Scripted::new(1);
        let service = WeatherService::with_ttl(provider.clone(), Duration::ZERO, STALE_TTL);

        service.current("Alba").await.unwrap();
        let report = service.current("Alba").await.unwrap();
        assert!(report.is_stale);
        assert!(report.from_cache);
        assert_eq!(provider.calls(), 2);
    }

    #[tokio::test]
    async fn test_failure_without_reading_is_an_error() {
        let service = WeatherService::with_ttl(Scripted::new(1), Duration::ZERO, Duration::ZERO);
        service.current("Alba").await.unwrap();
        assert!(matches!(service.current("Alba").await, Err(WeatherError::Upstream(_))));
    }
}
