use super::models::{AdvisoryLevel, SprayAdvisory, WeatherConditions};

/// WeatherAPI condition codes that mean rain, drizzle or sleet
pub const RAIN_CODES: [u16; 18] = [
    1063, 1150, 1153, 1168, 1171, 1180, 1183, 1186, 1189, 1192, 1195, 1198, 1201, 1240, 1243,
    1246, 1273, 1276,
];

pub fn is_rain_condition(code: u16) -> bool {
    RAIN_CODES.contains(&code)
}

fn advisory(level: AdvisoryLevel, text: &str, details: String) -> SprayAdvisory {
    SprayAdvisory {
        level,
        text: text.to_string(),
        details,
    }
}

/// Spraying advice from current weather. Rules are checked in order and the
/// first one that matches decides.
pub fn spray_advisory(weather: &WeatherConditions) -> SprayAdvisory {
    let WeatherConditions {
        wind_kph: wind,
        humidity,
        temperature_c: temperature,
        is_day,
        condition_code,
    } = *weather;

    if wind > 15.0 {
        advisory(
            AdvisoryLevel::Bad,
            "Strong wind - avoid treatments",
            format!("Wind at {wind} km/h is too strong for spraying"),
        )
    } else if humidity > 85.0 {
        advisory(
            AdvisoryLevel::Warning,
            "High humidity - wait for better conditions",
            format!("Humidity at {humidity}% may reduce effectiveness"),
        )
    } else if !(5.0..=30.0).contains(&temperature) {
        advisory(
            AdvisoryLevel::Warning,
            "Temperature not suitable for treatments",
            format!("Temperature of {temperature}°C is not ideal"),
        )
    } else if !is_day {
        advisory(
            AdvisoryLevel::Warning,
            "Prefer treating during daylight hours",
            "Avoid night treatments when possible".to_string(),
        )
    } else if is_rain_condition(condition_code) {
        advisory(
            AdvisoryLevel::Bad,
            "Rain - postpone treatments",
            "Precipitation in progress or expected".to_string(),
        )
    } else if wind < 5.0 && humidity < 70.0 && (10.0..=25.0).contains(&temperature) {
        advisory(
            AdvisoryLevel::Good,
            "Ideal conditions for treatments",
            format!("Wind: {wind} km/h, Humidity: {humidity}%, Temp: {temperature}°C"),
        )
    } else {
        advisory(
            AdvisoryLevel::Neutral,
            "Acceptable conditions for treatments",
            "Check local conditions before treating".to_string(),
        )
    }
}
