//! Data models for the `SkySentry` core
//!
//! This module contains the typed records parsed at the gateway boundary,
//! organized by concern:
//! - Location: Geographic coordinates and metadata
//! - Weather: Current weather snapshot
//! - Forecast: Multi-slot forecast and condition grouping
//! - Air: Raw pollutant concentrations

pub mod air;
pub mod forecast;
pub mod location;
pub mod weather;

// Re-export all public types for convenient access
pub use air::PollutantReadings;
pub use forecast::{ConditionGroup, ForecastSlot, HourlyForecast};
pub use location::Location;
pub use weather::WeatherSnapshot;
