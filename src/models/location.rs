//! Geographic location record

use serde::{Deserialize, Serialize};

/// A named coordinate pair, as resolved by city geocoding
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Location {
    /// Latitude in decimal degrees
    pub latitude: f64,
    /// Longitude in decimal degrees
    pub longitude: f64,
    /// Resolved place name
    pub name: String,
}

impl Location {
    /// Create a new location
    pub fn new(latitude: f64, longitude: f64, name: impl Into<String>) -> Self {
        Self {
            latitude,
            longitude,
            name: name.into(),
        }
    }

    /// Coordinate pair in the shape the fetch operations take
    #[must_use]
    pub fn coordinates(&self) -> (f64, f64) {
        (self.latitude, self.longitude)
    }

    /// Coordinates as a display string, at cache-key precision
    #[must_use]
    pub fn format_coordinates(&self) -> String {
        format!("{:.4}, {:.4}", self.latitude, self.longitude)
    }
}
