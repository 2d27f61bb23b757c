//! Configuration for the `SkySentry` core
//!
//! Settings are serde-deserializable so an embedding application can load
//! them from its own config file; `from_env` covers the common case of
//! environment-variable deployment.

use crate::error::SkySentryError;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Root configuration structure for the `SkySentry` core
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SkySentryConfig {
    /// Weather provider configuration
    #[serde(default)]
    pub provider: ProviderConfig,
    /// Cache configuration
    #[serde(default)]
    pub cache: CacheConfig,
    /// Alert loop configuration
    #[serde(default)]
    pub alerts: AlertConfig,
}

/// Weather provider (OpenWeatherMap) settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// API key; required for live fetches
    pub api_key: Option<String>,
    /// Base URL for the data API
    #[serde(default = "default_data_base_url")]
    pub data_base_url: String,
    /// Base URL for the geocoding API
    #[serde(default = "default_geo_base_url")]
    pub geo_base_url: String,
    /// Language code passed to the provider for descriptions
    #[serde(default = "default_language")]
    pub language: String,
    /// Maximum number of retries for transient request failures
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

/// Cache store settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Directory holding one JSON file per cache entry
    #[serde(default = "default_cache_dir")]
    pub directory: PathBuf,
    /// Entry time-to-live in seconds
    #[serde(default = "default_cache_ttl_secs")]
    pub ttl_secs: u64,
}

/// Alert loop settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertConfig {
    /// Fixed cadence between scans, in seconds
    #[serde(default = "default_scan_interval_secs")]
    pub scan_interval_secs: u64,
    /// Number of forecast slots inspected per cycle
    #[serde(default = "default_look_ahead_slots")]
    pub look_ahead_slots: usize,
    /// Absolute temperature delta (°C) that triggers a swing alert
    #[serde(default = "default_temp_swing_threshold")]
    pub temp_swing_threshold: f64,
    /// Maximum alerts delivered per user per cycle
    #[serde(default = "default_max_alerts")]
    pub max_alerts: usize,
}

// Default value functions
fn default_data_base_url() -> String {
    "https://api.openweathermap.org/data/2.5".to_string()
}

fn default_geo_base_url() -> String {
    "https://api.openweathermap.org/geo/1.0".to_string()
}

fn default_language() -> String {
    "en".to_string()
}

fn default_max_retries() -> u32 {
    3
}

fn default_cache_dir() -> PathBuf {
    PathBuf::from(".cache")
}

// Weather data updates roughly every 10 minutes upstream.
fn default_cache_ttl_secs() -> u64 {
    600
}

fn default_scan_interval_secs() -> u64 {
    2 * 60 * 60
}

fn default_look_ahead_slots() -> usize {
    4
}

fn default_temp_swing_threshold() -> f64 {
    5.0
}

fn default_max_alerts() -> usize {
    5
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            data_base_url: default_data_base_url(),
            geo_base_url: default_geo_base_url(),
            language: default_language(),
            max_retries: default_max_retries(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            directory: default_cache_dir(),
            ttl_secs: default_cache_ttl_secs(),
        }
    }
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            scan_interval_secs: default_scan_interval_secs(),
            look_ahead_slots: default_look_ahead_slots(),
            temp_swing_threshold: default_temp_swing_threshold(),
            max_alerts: default_max_alerts(),
        }
    }
}

impl CacheConfig {
    /// Entry time-to-live as a `Duration`
    #[must_use]
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

impl AlertConfig {
    /// Scan cadence as a `Duration`
    #[must_use]
    pub fn scan_interval(&self) -> Duration {
        Duration::from_secs(self.scan_interval_secs)
    }
}

impl SkySentryConfig {
    /// Build a configuration from environment variables, falling back to
    /// defaults for everything except the API key.
    ///
    /// Recognized variables: `OPENWEATHER_API_KEY`, `SKYSENTRY_CACHE_DIR`,
    /// `SKYSENTRY_CACHE_TTL_SECS`, `SKYSENTRY_SCAN_INTERVAL_SECS`,
    /// `SKYSENTRY_LANG`.
    pub fn from_env() -> crate::Result<Self> {
        let mut config = Self::default();

        config.provider.api_key = env::var("OPENWEATHER_API_KEY").ok();
        if let Ok(lang) = env::var("SKYSENTRY_LANG") {
            config.provider.language = lang;
        }
        if let Ok(dir) = env::var("SKYSENTRY_CACHE_DIR") {
            config.cache.directory = PathBuf::from(dir);
        }
        if let Ok(ttl) = env::var("SKYSENTRY_CACHE_TTL_SECS") {
            config.cache.ttl_secs = ttl.parse().map_err(|_| {
                SkySentryError::config(format!("invalid SKYSENTRY_CACHE_TTL_SECS: {ttl}"))
            })?;
        }
        if let Ok(interval) = env::var("SKYSENTRY_SCAN_INTERVAL_SECS") {
            config.alerts.scan_interval_secs = interval.parse().map_err(|_| {
                SkySentryError::config(format!("invalid SKYSENTRY_SCAN_INTERVAL_SECS: {interval}"))
            })?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> crate::Result<()> {
        if self.cache.ttl_secs == 0 {
            return Err(SkySentryError::config("cache TTL must be positive"));
        }
        if self.alerts.scan_interval_secs == 0 {
            return Err(SkySentryError::config("scan interval must be positive"));
        }
        if self.alerts.max_alerts == 0 {
            return Err(SkySentryError::config("max alerts must be positive"));
        }
        Ok(())
    }
}
