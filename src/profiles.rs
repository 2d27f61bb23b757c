//! User profile store
//!
//! The alerting core consumes profiles through a small read/write contract;
//! the flat-file implementation mirrors the bot's single `user_data.json`
//! map keyed by chat user id.

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::error::SkySentryError;

/// Per-user notification preferences.
///
/// `interval_h`, `start_hour` and `end_hour` are stored and round-tripped
/// but not honored by the alert loop, which runs on a single fixed cadence.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct NotificationSettings {
    pub enabled: bool,
    pub interval_h: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_hour: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_hour: Option<u8>,
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            interval_h: 2,
            start_hour: None,
            end_hour: None,
        }
    }
}

/// One user's stored state
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct UserProfile {
    pub city: Option<String>,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    #[serde(default)]
    pub notifications: NotificationSettings,
    #[serde(default)]
    pub last_weather: Option<Value>,
}

impl UserProfile {
    /// Coordinate pair when both components are present
    #[must_use]
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        match (self.lat, self.lon) {
            (Some(lat), Some(lon)) => Some((lat, lon)),
            _ => None,
        }
    }

    /// True when the user has a usable location (coordinates or city)
    #[must_use]
    pub fn has_location(&self) -> bool {
        self.coordinates().is_some() || self.city.is_some()
    }
}

/// Read/write contract over the profile store
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Load a user's profile, creating and persisting a default for new users
    async fn load(&self, user_id: i64) -> crate::Result<UserProfile>;

    /// Save a user's profile
    async fn save(&self, user_id: i64, profile: &UserProfile) -> crate::Result<()>;

    /// All users with notifications enabled
    async fn list_subscribed(&self) -> crate::Result<BTreeMap<i64, UserProfile>>;

    /// Update a user's location fields, leaving unset arguments untouched
    async fn update_location(
        &self,
        user_id: i64,
        city: Option<String>,
        lat: Option<f64>,
        lon: Option<f64>,
    ) -> crate::Result<()> {
        let mut profile = self.load(user_id).await?;
        if let Some(city) = city {
            profile.city = Some(city);
        }
        if let Some(lat) = lat {
            profile.lat = Some(lat);
        }
        if let Some(lon) = lon {
            profile.lon = Some(lon);
        }
        self.save(user_id, &profile).await
    }

    /// Update a user's notification settings, leaving unset arguments untouched
    async fn update_notifications(
        &self,
        user_id: i64,
        enabled: Option<bool>,
        interval_h: Option<u32>,
    ) -> crate::Result<()> {
        let mut profile = self.load(user_id).await?;
        if let Some(enabled) = enabled {
            profile.notifications.enabled = enabled;
        }
        if let Some(interval_h) = interval_h {
            profile.notifications.interval_h = interval_h;
        }
        self.save(user_id, &profile).await
    }
}

/// Flat-file JSON profile store: the whole user map in one file
pub struct JsonProfileStore {
    path: PathBuf,
}

impl JsonProfileStore {
    /// Create a store over the given JSON file
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Read the whole map; a missing or unreadable file degrades to empty
    fn load_all(&self) -> BTreeMap<i64, UserProfile> {
        match fs::read(&self.path) {
            Ok(bytes) => serde_json::from_slice(&bytes).unwrap_or_else(|e| {
                warn!("Unreadable profile file {:?}: {}", self.path, e);
                BTreeMap::new()
            }),
            Err(_) => BTreeMap::new(),
        }
    }

    fn save_all(&self, data: &BTreeMap<i64, UserProfile>) -> crate::Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let bytes = serde_json::to_vec_pretty(data)
            .map_err(|e| SkySentryError::storage(format!("serialize profiles: {e}")))?;
        fs::write(&self.path, bytes)?;
        Ok(())
    }
}

#[async_trait]
impl ProfileStore for JsonProfileStore {
    async fn load(&self, user_id: i64) -> crate::Result<UserProfile> {
        let mut data = self.load_all();
        if let Some(profile) = data.get(&user_id) {
            return Ok(profile.clone());
        }

        let profile = UserProfile::default();
        data.insert(user_id, profile.clone());
        self.save_all(&data)?;
        Ok(profile)
    }

    async fn save(&self, user_id: i64, profile: &UserProfile) -> crate::Result<()> {
        let mut data = self.load_all();
        data.insert(user_id, profile.clone());
        self.save_all(&data)
    }

    async fn list_subscribed(&self) -> crate::Result<BTreeMap<i64, UserProfile>> {
        Ok(self
            .load_all()
            .into_iter()
            .filter(|(_, profile)| profile.notifications.enabled)
            .collect())
    }
}
