//! Raw pollutant concentration model

use serde::{Deserialize, Serialize};

use crate::error::SkySentryError;

/// Pollutant concentrations in µg/m³ from one air-pollution measurement.
///
/// NO and NH₃ are measured and reported but excluded from AQI indexing.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Default)]
pub struct PollutantReadings {
    #[serde(default)]
    pub so2: f64,
    #[serde(default)]
    pub no2: f64,
    #[serde(default)]
    pub pm10: f64,
    #[serde(default)]
    pub pm2_5: f64,
    #[serde(default)]
    pub o3: f64,
    #[serde(default)]
    pub co: f64,
    #[serde(default)]
    pub no: f64,
    #[serde(default)]
    pub nh3: f64,
}

impl PollutantReadings {
    /// Parse and validate a raw provider payload.
    ///
    /// The provider wraps readings as `{"list": [{"components": {...}}]}`.
    ///
    /// # Errors
    /// Returns a validation error when the payload carries no measurement.
    pub fn from_api_value(value: &serde_json::Value) -> crate::Result<Self> {
        let response: wire::AirPollutionResponse = serde_json::from_value(value.clone())
            .map_err(|e| {
                SkySentryError::validation(format!("malformed air pollution payload: {e}"))
            })?;

        response
            .list
            .into_iter()
            .next()
            .map(|entry| entry.components)
            .ok_or_else(|| SkySentryError::validation("air pollution payload has no measurements"))
    }
}

mod wire {
    use super::PollutantReadings;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    pub struct AirPollutionResponse {
        pub list: Vec<Measurement>,
    }

    #[derive(Debug, Deserialize)]
    pub struct Measurement {
        pub components: PollutantReadings,
    }
}
