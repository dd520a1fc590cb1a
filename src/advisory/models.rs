use crate::external::weather::WeatherReport;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Current weather at the treatment site. Missing readings default to a calm,
/// dry daytime observation.
#[derive(ToSchema, Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct WeatherConditions {
    #[serde(default)]
    pub wind_kph: f64,
    /// Relative humidity, percent
    #[serde(default)]
    pub humidity: f64,
    #[serde(default)]
    pub temperature_c: f64,
    #[serde(default = "default_is_day")]
    pub is_day: bool,
    /// WeatherAPI condition code; 1000 is "clear"
    #[serde(default = "default_condition_code")]
    pub condition_code: u16,
}

fn default_is_day() -> bool {
    true
}

fn default_condition_code() -> u16 {
    1000
}

#[derive(ToSchema, Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AdvisoryLevel {
    Good,
    Neutral,
    Warning,
    Bad,
}

#[derive(ToSchema, Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SprayAdvisory {
    pub level: AdvisoryLevel,
    pub text: String,
    pub details: String,
}

#[derive(ToSchema, Serialize, Debug, Clone, PartialEq)]
pub struct CurrentAdvisory {
    pub weather: WeatherReport,
    pub advisory: SprayAdvisory,
}
