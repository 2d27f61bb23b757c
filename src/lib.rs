//! `SkySentry` - weather caching and alerting core for chat assistants
//!
//! This library provides the core functionality behind a weather chat-bot:
//! a geo-keyed TTL cache in front of the weather provider API, a cached
//! gateway with typed validation at the boundary, air-quality
//! classification, and the resident alert-evaluation loop that notifies
//! subscribed users.

pub mod air_quality;
pub mod alerts;
pub mod cache;
pub mod config;
pub mod error;
pub mod gateway;
pub mod logging;
pub mod models;
pub mod notifier;
pub mod profiles;
pub mod provider;

// Re-export core types for public API
pub use air_quality::{AirQualityAnalysis, analyze_air_quality};
pub use alerts::{Alert, AlertKind, evaluate_alerts};
pub use cache::{CacheStats, Clock, Endpoint, SystemClock, WeatherCache};
pub use config::SkySentryConfig;
pub use error::SkySentryError;
pub use gateway::{CachedWeatherGateway, FetchOutcome, WeatherProvider};
pub use models::{HourlyForecast, Location, PollutantReadings, WeatherSnapshot};
pub use notifier::{AlertScheduler, CycleReport, NotificationSink};
pub use profiles::{JsonProfileStore, ProfileStore, UserProfile};
pub use provider::OpenWeatherClient;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, SkySentryError>;
