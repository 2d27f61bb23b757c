//! Current weather snapshot model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ConditionGroup;
use crate::error::SkySentryError;

/// Current weather at one location, parsed from the provider payload
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct WeatherSnapshot {
    /// City name as reported by the provider
    pub city: String,
    /// Temperature in Celsius
    pub temperature: f64,
    /// Perceived temperature in Celsius
    pub feels_like: f64,
    /// Condition group (rain, snow, ...)
    pub condition: ConditionGroup,
    /// Human-readable description of conditions
    pub description: String,
    /// Relative humidity percentage (0-100)
    pub humidity: u8,
    /// Atmospheric pressure in hPa
    pub pressure: u32,
    /// Wind speed in m/s
    pub wind_speed: f64,
    /// Wind direction in degrees (0-360, where 0/360 is North)
    pub wind_direction: u16,
    /// Observation timestamp
    pub observed_at: DateTime<Utc>,
}

impl WeatherSnapshot {
    /// Convert wind direction from degrees to cardinal direction
    #[must_use]
    pub fn wind_direction_to_cardinal(degrees: u16) -> &'static str {
        match degrees {
            0..=22 | 338..=360 => "N",
            23..=67 => "NE",
            68..=112 => "E",
            113..=157 => "SE",
            158..=202 => "S",
            203..=247 => "SW",
            248..=292 => "W",
            293..=337 => "NW",
            _ => "Unknown",
        }
    }

    /// Format temperature with unit
    #[must_use]
    pub fn format_temperature(&self) -> String {
        format!("{:.1}°C", self.temperature)
    }

    /// Format wind information
    #[must_use]
    pub fn format_wind(&self) -> String {
        let direction = Self::wind_direction_to_cardinal(self.wind_direction);
        format!("{:.1} m/s {}", self.wind_speed, direction)
    }

    /// Parse and validate a raw provider payload.
    ///
    /// # Errors
    /// Returns a validation error when the payload does not carry the
    /// expected current-weather shape.
    pub fn from_api_value(value: &serde_json::Value) -> crate::Result<Self> {
        let response: wire::WeatherResponse = serde_json::from_value(value.clone())
            .map_err(|e| SkySentryError::validation(format!("malformed weather payload: {e}")))?;

        let (main, description) = response
            .weather
            .first()
            .map(|w| (w.main.clone(), w.description.clone()))
            .unwrap_or_default();

        Ok(Self {
            city: response.name.unwrap_or_default(),
            temperature: response.main.temp,
            feels_like: response.main.feels_like,
            condition: ConditionGroup::classify(&main, &description),
            description,
            humidity: response.main.humidity,
            pressure: response.main.pressure,
            wind_speed: response.wind.as_ref().map_or(0.0, |w| w.speed),
            wind_direction: response.wind.as_ref().map_or(0, |w| w.deg),
            observed_at: DateTime::from_timestamp(response.dt, 0).unwrap_or_default(),
        })
    }
}

/// Wire-format structs matching the provider's current-weather response
mod wire {
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    pub struct WeatherResponse {
        pub name: Option<String>,
        pub dt: i64,
        pub main: MainInfo,
        #[serde(default)]
        pub weather: Vec<ConditionInfo>,
        pub wind: Option<WindInfo>,
    }

    #[derive(Debug, Deserialize)]
    pub struct MainInfo {
        pub temp: f64,
        #[serde(default)]
        pub feels_like: f64,
        #[serde(default)]
        pub humidity: u8,
        #[serde(default)]
        pub pressure: u32,
    }

    #[derive(Debug, Deserialize, Default)]
    pub struct ConditionInfo {
        #[serde(default)]
        pub main: String,
        #[serde(default)]
        pub description: String,
    }

    #[derive(Debug, Deserialize)]
    pub struct WindInfo {
        #[serde(default)]
        pub speed: f64,
        #[serde(default)]
        pub deg: u16,
    }
}
