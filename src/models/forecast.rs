//! Forecast models and condition grouping

use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};

use crate::error::SkySentryError;

/// Broad weather condition group derived from the provider payload.
///
/// The provider reports a coarse `main` group plus a free-text, possibly
/// localized description; classification checks the group first and falls
/// back to description keywords so localized payloads still classify.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum ConditionGroup {
    Thunderstorm,
    Rain,
    Snow,
    Clear,
    Clouds,
    Other,
}

impl ConditionGroup {
    /// Classify a provider condition from its group name and description
    #[must_use]
    pub fn classify(main: &str, description: &str) -> Self {
        let main = main.to_lowercase();
        let description = description.to_lowercase();

        if main.contains("thunderstorm") || description.contains("thunder") || description.contains("гроз") {
            Self::Thunderstorm
        } else if main.contains("snow") || description.contains("снег") {
            Self::Snow
        } else if main.contains("rain")
            || main.contains("drizzle")
            || description.contains("shower")
            || description.contains("дождь")
        {
            Self::Rain
        } else if main.contains("clear") {
            Self::Clear
        } else if main.contains("cloud") {
            Self::Clouds
        } else {
            Self::Other
        }
    }
}

/// One forecast step (3-hour granularity from the provider)
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ForecastSlot {
    /// Timestamp of the slot
    pub timestamp: DateTime<Utc>,
    /// Temperature in Celsius
    pub temperature: f64,
    /// Condition group for alerting
    pub condition: ConditionGroup,
    /// Human-readable description of conditions
    pub description: String,
}

impl ForecastSlot {
    /// Local-time label used in alert messages (`%H:%M`)
    #[must_use]
    pub fn time_label(&self) -> String {
        self.timestamp
            .with_timezone(&Local)
            .format("%H:%M")
            .to_string()
    }
}

/// Hourly (3-hourly) forecast for one location
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct HourlyForecast {
    /// City name as reported by the provider
    pub city: String,
    /// Forecast slots sorted by timestamp
    pub slots: Vec<ForecastSlot>,
}

impl HourlyForecast {
    /// Parse and validate a raw provider payload.
    ///
    /// # Errors
    /// Returns a validation error when the payload does not carry the
    /// expected forecast shape.
    pub fn from_api_value(value: &serde_json::Value) -> crate::Result<Self> {
        let response: wire::ForecastResponse = serde_json::from_value(value.clone())
            .map_err(|e| SkySentryError::validation(format!("malformed forecast payload: {e}")))?;

        let slots = response
            .list
            .into_iter()
            .map(|item| {
                let (main, description) = item
                    .weather
                    .first()
                    .map(|w| (w.main.clone(), w.description.clone()))
                    .unwrap_or_default();
                ForecastSlot {
                    timestamp: DateTime::from_timestamp(item.dt, 0).unwrap_or_default(),
                    temperature: item.main.temp,
                    condition: ConditionGroup::classify(&main, &description),
                    description,
                }
            })
            .collect();

        Ok(Self {
            city: response.city.map(|c| c.name).unwrap_or_default(),
            slots,
        })
    }
}

/// Wire-format structs matching the provider's forecast response
mod wire {
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    pub struct ForecastResponse {
        pub list: Vec<ForecastItem>,
        pub city: Option<CityInfo>,
    }

    #[derive(Debug, Deserialize)]
    pub struct CityInfo {
        pub name: String,
    }

    #[derive(Debug, Deserialize)]
    pub struct ForecastItem {
        pub dt: i64,
        pub main: MainInfo,
        #[serde(default)]
        pub weather: Vec<ConditionInfo>,
    }

    #[derive(Debug, Deserialize)]
    pub struct MainInfo {
        pub temp: f64,
    }

    #[derive(Debug, Deserialize, Default)]
    pub struct ConditionInfo {
        #[serde(default)]
        pub main: String,
        #[serde(default)]
        pub description: String,
    }
}
