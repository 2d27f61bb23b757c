//! OpenWeatherMap fetch collaborator
//!
//! Thin HTTP client implementing [`WeatherProvider`]. Transient failures
//! are retried by middleware; any non-success outcome surfaces as an error,
//! which the gateway collapses to an unavailable result. No caching here.

use async_trait::async_trait;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{RetryTransientMiddleware, policies::ExponentialBackoff};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::config::ProviderConfig;
use crate::error::SkySentryError;
use crate::gateway::WeatherProvider;
use crate::models::Location;

/// HTTP client for the OpenWeatherMap data and geocoding APIs
pub struct OpenWeatherClient {
    client: ClientWithMiddleware,
    config: ProviderConfig,
}

impl OpenWeatherClient {
    /// Build a client with retry middleware from provider configuration
    #[must_use]
    pub fn new(config: ProviderConfig) -> Self {
        let retry_policy =
            ExponentialBackoff::builder().build_with_max_retries(config.max_retries);
        let client = ClientBuilder::new(reqwest::Client::new())
            .with(RetryTransientMiddleware::new_with_policy(retry_policy))
            .build();

        Self { client, config }
    }

    fn api_key(&self) -> crate::Result<&str> {
        self.config
            .api_key
            .as_deref()
            .ok_or_else(|| SkySentryError::config("missing OpenWeather API key"))
    }

    fn data_url(&self, path: &str, lat: f64, lon: f64) -> crate::Result<String> {
        Ok(format!(
            "{}/{}?lat={}&lon={}&appid={}&units=metric&lang={}",
            self.config.data_base_url,
            path,
            lat,
            lon,
            self.api_key()?,
            self.config.language
        ))
    }

    async fn get_json(&self, url: &str) -> crate::Result<Value> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| SkySentryError::provider(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SkySentryError::provider(format!(
                "unexpected status {status}"
            )));
        }

        response
            .json()
            .await
            .map_err(|e| SkySentryError::provider(format!("invalid JSON body: {e}")))
    }
}

#[derive(Debug, Deserialize)]
struct GeocodingEntry {
    lat: f64,
    lon: f64,
    #[serde(default)]
    name: String,
}

#[async_trait]
impl WeatherProvider for OpenWeatherClient {
    async fn fetch_current(&self, lat: f64, lon: f64) -> crate::Result<Value> {
        debug!("Fetching current weather for ({:.4}, {:.4})", lat, lon);
        let url = self.data_url("weather", lat, lon)?;
        self.get_json(&url).await
    }

    async fn fetch_forecast(&self, lat: f64, lon: f64) -> crate::Result<Value> {
        debug!("Fetching forecast for ({:.4}, {:.4})", lat, lon);
        let url = self.data_url("forecast", lat, lon)?;
        self.get_json(&url).await
    }

    async fn fetch_air_pollution(&self, lat: f64, lon: f64) -> crate::Result<Value> {
        debug!("Fetching air pollution for ({:.4}, {:.4})", lat, lon);
        let url = self.data_url("air_pollution", lat, lon)?;
        self.get_json(&url).await
    }

    async fn geocode(&self, city: &str) -> crate::Result<Option<Location>> {
        debug!("Geocoding city: {}", city);
        let url = format!(
            "{}/direct?q={}&appid={}&limit=1",
            self.config.geo_base_url,
            urlencoding::encode(city),
            self.api_key()?
        );

        let body = self.get_json(&url).await?;
        let entries: Vec<GeocodingEntry> = serde_json::from_value(body)
            .map_err(|e| SkySentryError::provider(format!("invalid geocoding body: {e}")))?;

        Ok(entries.into_iter().next().map(|entry| {
            // The geocoder may echo a canonical name; fall back to the query
            let name = if entry.name.is_empty() {
                city.to_string()
            } else {
                entry.name
            };
            let location = Location::new(entry.lat, entry.lon, name);
            debug!("Resolved {} to {}", city, location.format_coordinates());
            location
        }))
    }
}
