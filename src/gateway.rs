//! Cached weather gateway
//!
//! Wraps the three fetch endpoints with the cache store: cache hit returns
//! immediately, a miss delegates to the provider and populates the cache on
//! success only. Absence is never cached, so a transient upstream failure
//! self-heals on the next call instead of waiting out the TTL. Provider
//! errors never escape this boundary; they collapse to `Unavailable`.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing::warn;

use crate::cache::{Endpoint, WeatherCache};
use crate::models::{HourlyForecast, Location, PollutantReadings, WeatherSnapshot};

/// External fetch collaborator talking to the weather provider API
#[async_trait]
pub trait WeatherProvider: Send + Sync {
    /// Fetch the raw current-weather payload for a coordinate pair
    async fn fetch_current(&self, lat: f64, lon: f64) -> crate::Result<Value>;

    /// Fetch the raw multi-slot forecast payload for a coordinate pair
    async fn fetch_forecast(&self, lat: f64, lon: f64) -> crate::Result<Value>;

    /// Fetch the raw air-pollution payload for a coordinate pair
    async fn fetch_air_pollution(&self, lat: f64, lon: f64) -> crate::Result<Value>;

    /// Resolve a city name to a location; `None` when the city is unknown
    async fn geocode(&self, city: &str) -> crate::Result<Option<Location>>;
}

/// Outcome of a gateway lookup.
///
/// Distinguishes a cache hit from a fresh fetch so tests and diagnostics can
/// see where data came from; callers that only care about presence use
/// [`FetchOutcome::into_option`].
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome<T> {
    /// Served from cache
    Hit(T),
    /// Fetched from the provider and cached
    Fetched(T),
    /// No data available this call (upstream failure or invalid payload)
    Unavailable,
}

impl<T> FetchOutcome<T> {
    /// Collapse to the data, dropping the provenance
    pub fn into_option(self) -> Option<T> {
        match self {
            FetchOutcome::Hit(data) | FetchOutcome::Fetched(data) => Some(data),
            FetchOutcome::Unavailable => None,
        }
    }

    /// True when no data was available
    #[must_use]
    pub fn is_unavailable(&self) -> bool {
        matches!(self, FetchOutcome::Unavailable)
    }
}

/// Weather gateway backed by the file cache
pub struct CachedWeatherGateway {
    cache: WeatherCache,
    provider: Arc<dyn WeatherProvider>,
}

impl CachedWeatherGateway {
    /// Create a gateway over a cache store and a fetch collaborator
    pub fn new(cache: WeatherCache, provider: Arc<dyn WeatherProvider>) -> Self {
        Self { cache, provider }
    }

    /// Access the underlying cache store (stats, sweeps)
    #[must_use]
    pub fn cache(&self) -> &WeatherCache {
        &self.cache
    }

    async fn fetch_raw(&self, lat: f64, lon: f64, endpoint: Endpoint) -> FetchOutcome<Value> {
        if let Some(data) = self.cache.get(lat, lon, endpoint) {
            return FetchOutcome::Hit(data);
        }

        let fetched = match endpoint {
            Endpoint::Weather => self.provider.fetch_current(lat, lon).await,
            Endpoint::Forecast => self.provider.fetch_forecast(lat, lon).await,
            Endpoint::AirPollution => self.provider.fetch_air_pollution(lat, lon).await,
        };

        match fetched {
            Ok(data) => {
                self.cache.set(lat, lon, endpoint, data.clone());
                FetchOutcome::Fetched(data)
            }
            Err(e) => {
                warn!(
                    "Provider fetch failed for {} at ({:.4}, {:.4}): {}",
                    endpoint.as_str(),
                    lat,
                    lon,
                    e
                );
                FetchOutcome::Unavailable
            }
        }
    }

    fn validate<T>(
        outcome: FetchOutcome<Value>,
        endpoint: Endpoint,
        parse: impl FnOnce(&Value) -> crate::Result<T>,
    ) -> FetchOutcome<T> {
        let wrap: fn(T) -> FetchOutcome<T> = match &outcome {
            FetchOutcome::Hit(_) => FetchOutcome::Hit,
            FetchOutcome::Fetched(_) => FetchOutcome::Fetched,
            FetchOutcome::Unavailable => return FetchOutcome::Unavailable,
        };

        match outcome.into_option().as_ref().map(parse) {
            Some(Ok(parsed)) => wrap(parsed),
            Some(Err(e)) => {
                warn!("Invalid {} payload: {}", endpoint.as_str(), e);
                FetchOutcome::Unavailable
            }
            None => FetchOutcome::Unavailable,
        }
    }

    /// Current weather for a coordinate pair, validated at the boundary
    pub async fn current_weather(&self, lat: f64, lon: f64) -> FetchOutcome<WeatherSnapshot> {
        let raw = self.fetch_raw(lat, lon, Endpoint::Weather).await;
        Self::validate(raw, Endpoint::Weather, WeatherSnapshot::from_api_value)
    }

    /// Multi-slot forecast for a coordinate pair, validated at the boundary
    pub async fn hourly_forecast(&self, lat: f64, lon: f64) -> FetchOutcome<HourlyForecast> {
        let raw = self.fetch_raw(lat, lon, Endpoint::Forecast).await;
        Self::validate(raw, Endpoint::Forecast, HourlyForecast::from_api_value)
    }

    /// Air pollution readings for a coordinate pair, validated at the boundary
    pub async fn air_pollution(&self, lat: f64, lon: f64) -> FetchOutcome<PollutantReadings> {
        let raw = self.fetch_raw(lat, lon, Endpoint::AirPollution).await;
        Self::validate(raw, Endpoint::AirPollution, PollutantReadings::from_api_value)
    }

    /// Resolve a city name to a [`Location`].
    ///
    /// Deliberately uncached: geocoding volume is low and a string-keyed
    /// scheme would not fit the coordinate-keyed store.
    pub async fn resolve_city(&self, city: &str) -> crate::Result<Option<Location>> {
        self.provider.geocode(city).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SkySentryError;
    use serde_json::json;
    use std::sync::Mutex;
    use std::time::Duration;
    use tempfile::TempDir;

    /// Scripted provider: a queue of responses per endpoint plus call counts
    #[derive(Default)]
    struct ScriptedProvider {
        current: Mutex<Vec<crate::Result<Value>>>,
        forecast: Mutex<Vec<crate::Result<Value>>>,
        calls: Mutex<usize>,
    }

    impl ScriptedProvider {
        fn push_current(&self, response: crate::Result<Value>) {
            self.current.lock().unwrap().push(response);
        }

        fn push_forecast(&self, response: crate::Result<Value>) {
            self.forecast.lock().unwrap().push(response);
        }

        fn calls(&self) -> usize {
            *self.calls.lock().unwrap()
        }

        fn pop(queue: &Mutex<Vec<crate::Result<Value>>>) -> crate::Result<Value> {
            queue
                .lock()
                .unwrap()
                .pop()
                .unwrap_or_else(|| Err(SkySentryError::provider("no scripted response")))
        }
    }

    #[async_trait]
    impl WeatherProvider for ScriptedProvider {
        async fn fetch_current(&self, _lat: f64, _lon: f64) -> crate::Result<Value> {
            *self.calls.lock().unwrap() += 1;
            Self::pop(&self.current)
        }

        async fn fetch_forecast(&self, _lat: f64, _lon: f64) -> crate::Result<Value> {
            *self.calls.lock().unwrap() += 1;
            Self::pop(&self.forecast)
        }

        async fn fetch_air_pollution(&self, _lat: f64, _lon: f64) -> crate::Result<Value> {
            *self.calls.lock().unwrap() += 1;
            Err(SkySentryError::provider("not scripted"))
        }

        async fn geocode(&self, city: &str) -> crate::Result<Option<Location>> {
            *self.calls.lock().unwrap() += 1;
            Ok(Some(Location::new(51.5074, -0.1278, city)))
        }
    }

    fn weather_payload(temp: f64) -> Value {
        json!({
            "name": "London",
            "dt": 1_700_000_000,
            "main": {"temp": temp, "feels_like": temp, "humidity": 70, "pressure": 1012},
            "weather": [{"main": "Clouds", "description": "overcast clouds"}],
            "wind": {"speed": 3.0, "deg": 90}
        })
    }

    fn gateway(dir: &TempDir, provider: Arc<ScriptedProvider>) -> CachedWeatherGateway {
        let cache = WeatherCache::new(dir.path(), Duration::from_secs(600));
        CachedWeatherGateway::new(cache, provider)
    }

    #[tokio::test]
    async fn test_miss_then_hit() {
        let dir = TempDir::new().unwrap();
        let provider = Arc::new(ScriptedProvider::default());
        provider.push_current(Ok(weather_payload(12.0)));
        let gateway = gateway(&dir, provider.clone());

        let first = gateway.current_weather(51.5, -0.12).await;
        assert!(matches!(first, FetchOutcome::Fetched(_)));

        let second = gateway.current_weather(51.5, -0.12).await;
        match second {
            FetchOutcome::Hit(snapshot) => assert_eq!(snapshot.temperature, 12.0),
            other => panic!("expected cache hit, got {other:?}"),
        }

        // Only the first call reached the provider
        assert_eq!(provider.calls(), 1);
    }

    #[tokio::test]
    async fn test_absence_is_never_cached() {
        let dir = TempDir::new().unwrap();
        let provider = Arc::new(ScriptedProvider::default());
        let gateway = gateway(&dir, provider.clone());

        // Upstream down: unavailable, nothing written
        let outcome = gateway.current_weather(51.5, -0.12).await;
        assert!(outcome.is_unavailable());
        assert_eq!(gateway.cache().stats().total, 0);

        // Upstream recovers on the very next call, no TTL wait
        provider.push_current(Ok(weather_payload(8.0)));
        let outcome = gateway.current_weather(51.5, -0.12).await;
        assert!(matches!(outcome, FetchOutcome::Fetched(_)));
        assert_eq!(provider.calls(), 2);
    }

    #[tokio::test]
    async fn test_invalid_payload_is_unavailable() {
        let dir = TempDir::new().unwrap();
        let provider = Arc::new(ScriptedProvider::default());
        provider.push_forecast(Ok(json!({"surprise": true})));
        let gateway = gateway(&dir, provider);

        let outcome = gateway.hourly_forecast(51.5, -0.12).await;
        assert!(outcome.is_unavailable());
    }

    #[tokio::test]
    async fn test_resolve_city_is_uncached() {
        let dir = TempDir::new().unwrap();
        let provider = Arc::new(ScriptedProvider::default());
        let gateway = gateway(&dir, provider.clone());

        let first = gateway.resolve_city("London").await.unwrap().unwrap();
        assert_eq!(first.coordinates(), (51.5074, -0.1278));
        assert_eq!(first.name, "London");

        let second = gateway.resolve_city("London").await.unwrap().unwrap();
        assert_eq!(second, first);
        assert_eq!(provider.calls(), 2);
        assert_eq!(gateway.cache().stats().total, 0);
    }
}
