use crate::external::weather;
use dotenvy::dotenv;
use serde::Deserialize;
use std::env;

#[derive(Deserialize, Debug, Clone)]
pub struct Config {
    pub db_url: String,
    pub app_name: String,
    pub deployment: String,
    pub notify_sender: String,
    pub bind_address: String,
    pub weather_api_key: Option<String>,
    pub weather_location: String,
    pub weather_base_url: String,
}

impl Config {
    /// Reads the environment (and `.env` if present). Panics on missing
    /// required variables, which only happens at startup.
    pub fn from_env() -> Self {
        dotenv().ok();
        let db_url = env::var("DB_URL").unwrap_or_else(|_| {
            format!(
                "{}://{}:{}@{}:{}/{}",
                env::var("DB_PREFIX").unwrap_or_else(|_| "postgresql".to_string()),
                env::var("DB_USER").expect("DB_USER must be set"),
                env::var("DB_PASSWORD").expect("DB_PASSWORD must be set"),
                env::var("DB_HOST").expect("DB_HOST must be set"),
                env::var("DB_PORT").unwrap_or_else(|_| "5432".to_string()),
                env::var("DB_NAME").expect("DB_NAME must be set"),
            )
        });

        Config {
            db_url,
            app_name: env::var("APP_NAME").expect("APP_NAME must be set"),
            deployment: env::var("DEPLOYMENT")
                .expect("DEPLOYMENT must be set, this can be local, dev, stage, or prod"),
            notify_sender: env::var("NOTIFY_SENDER")
                .unwrap_or_else(|_| "noreply@agrodesk.local".to_string()),
            bind_address: env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:3000".to_string()),
            weather_api_key: env::var("WEATHER_API_KEY").ok(),
            weather_location: env::var("WEATHER_LOCATION")
                .unwrap_or_else(|_| "Alba, Piemonte, Italy".to_string()),
            weather_base_url: env::var("WEATHER_BASE_URL")
                .unwrap_or_else(|_| weather::DEFAULT_BASE_URL.to_string()),
        }
    }

    #[cfg(test)]
    pub fn for_tests() -> Self {
        Config {
            db_url: env::var("DB_URL").unwrap_or_else(|_| "sqlite::memory:".to_string()),
            app_name: "agrodesk-api-test".to_string(),
            deployment: "test".to_string(),
            notify_sender: "noreply@agrodesk.test".to_string(),
            bind_address: "127.0.0.1:0".to_string(),
            weather_api_key: None,
            weather_location: "Alba, Piemonte, Italy".to_string(),
            weather_base_url: weather::DEFAULT_BASE_URL.to_string(),
        }
    }
}

#[cfg(test)]
pub mod test_helpers {
    use super::Config;
    use crate::common::state::AppState;
    use crate::external::notifier::Notifier;
    use crate::routes::build_router_with_state;
    use axum::Router;
    use migration::{Migrator, MigratorTrait};
    use sea_orm::{ConnectOptions, Database, DatabaseConnection};
    use std::sync::Arc;

    /// Fresh database per test. In-memory SQLite only lives as long as its
    /// connection, so the pool is pinned to a single one.
    pub async fn setup_test_db() -> DatabaseConnection {
        let config = Config::for_tests();
        let mut options = ConnectOptions::new(config.db_url);
        options
            .max_connections(1)
            .min_connections(1)
            .sqlx_logging(false);

        let db = Database::connect(options)
            .await
            .expect("Failed to connect to test database");

        Migrator::up(&db, None)
            .await
            .expect("Failed to run database migrations");

        db
    }

    pub async fn setup_test_state() -> AppState {
        let db = setup_test_db().await;
        AppState::new(db, Config::for_tests())
    }

    pub async fn setup_test_app() -> Router {
        build_router_with_state(setup_test_state().await)
    }

    /// Router sharing its database with the returned state, for tests that
    /// need to inspect rows directly
    pub async fn setup_test_app_with_state() -> (Router, AppState) {
        let state = setup_test_state().await;
        (build_router_with_state(state.clone()), state)
    }

    pub async fn setup_test_app_with_notifier(notifier: Arc<dyn Notifier>) -> Router {
        build_router_with_state(setup_test_state().await.with_notifier(notifier))
    }
}
