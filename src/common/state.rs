use crate::config::Config;
use crate::external::documents::{DocumentRenderer, PlainTextRenderer};
use crate::external::notifier::{LogNotifier, Notifier};
use crate::external::weather::{WeatherApiClient, WeatherProvider, WeatherService};
use sea_orm::DatabaseConnection;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub config: Config,
    pub notifier: Arc<dyn Notifier>,
    pub renderer: Arc<dyn DocumentRenderer>,
    pub weather: Arc<WeatherService>,
}

impl AppState {
    /// State with the built-in collaborators: deliveries are logged, documents
    /// are plain text and weather comes from WeatherAPI.com
    pub fn new(db: DatabaseConnection, config: Config) -> Self {
        let notifier = Arc::new(LogNotifier::new(config.notify_sender.clone()));
        let weather = Arc::new(WeatherApiClient::new(
            config.weather_api_key.clone(),
            config.weather_base_url.clone(),
        ));
        Self {
            db,
            config,
            notifier,
            renderer: Arc::new(PlainTextRenderer),
            weather: Arc::new(WeatherService::new(weather)),
        }
    }

    #[must_use]
    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    #[must_use]
    pub fn with_weather(mut self, provider: Arc<dyn WeatherProvider>) -> Self {
        self.weather = Arc::new(WeatherService::new(provider));
        self
    }
}
