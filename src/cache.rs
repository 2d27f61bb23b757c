//! File-backed TTL cache for weather provider responses
//!
//! One JSON file per `(rounded lat, rounded lon, endpoint)` triple. Expiry
//! is read-triggered; an unreadable or malformed entry is deleted and
//! reported as a miss, never surfaced as an error. Writes are best-effort:
//! a failed write must not fail the fetch that produced the data.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use md5::{Digest, Md5};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

/// Weather API endpoint kind, part of the cache key
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Weather,
    Forecast,
    AirPollution,
}

impl Endpoint {
    /// Stable string form used in key derivation and persisted entries
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Endpoint::Weather => "weather",
            Endpoint::Forecast => "forecast",
            Endpoint::AirPollution => "air_pollution",
        }
    }
}

/// Time source injected into the store so TTL behavior is testable
pub trait Clock: Send + Sync {
    /// Current time as Unix seconds
    fn now_unix(&self) -> f64;
}

/// Wall-clock time source used in production
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_unix(&self) -> f64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs_f64())
            .unwrap_or(0.0)
    }
}

/// Persisted cache entry. `cached_at` is the write time, never the read time.
#[derive(Debug, Serialize, Deserialize)]
struct CacheEntry {
    cached_at: f64,
    lat: f64,
    lon: f64,
    endpoint: String,
    data: Value,
}

/// Diagnostic snapshot of the cache directory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CacheStats {
    /// Number of entry files present
    pub total: usize,
    /// Entries within the TTL
    pub valid: usize,
    /// Entries past the TTL
    pub expired: usize,
    /// Combined size of all entry files in bytes
    pub total_size_bytes: u64,
}

/// File-backed weather response cache
pub struct WeatherCache {
    directory: PathBuf,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl WeatherCache {
    /// Create a cache over the given directory with the given TTL
    pub fn new(directory: impl Into<PathBuf>, ttl: Duration) -> Self {
        Self::with_clock(directory, ttl, Arc::new(SystemClock))
    }

    /// Create a cache with an injected time source (used by tests)
    pub fn with_clock(directory: impl Into<PathBuf>, ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            directory: directory.into(),
            ttl,
            clock,
        }
    }

    /// Derive the cache key for a coordinate pair and endpoint.
    ///
    /// Coordinates are rounded to 4 decimal places before hashing, so
    /// requests differing only beyond the 4th decimal share a cache slot.
    #[must_use]
    pub fn cache_key(lat: f64, lon: f64, endpoint: Endpoint) -> String {
        let key_string = format!("{lat:.4}_{lon:.4}_{}", endpoint.as_str());
        let mut hasher = Md5::new();
        hasher.update(key_string.as_bytes());
        hex::encode(hasher.finalize())
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        self.directory.join(format!("{key}.json"))
    }

    fn ensure_directory(&self) {
        if let Err(e) = fs::create_dir_all(&self.directory) {
            warn!("Failed to create cache directory {:?}: {}", self.directory, e);
        }
    }

    fn remove_entry(path: &Path) {
        if let Err(e) = fs::remove_file(path) {
            debug!("Failed to remove cache entry {:?}: {}", path, e);
        }
    }

    fn is_expired(&self, cached_at: f64) -> bool {
        self.clock.now_unix() - cached_at > self.ttl.as_secs_f64()
    }

    /// Get cached data for a coordinate pair and endpoint.
    ///
    /// Returns `None` on a miss; an expired or corrupt entry is deleted on
    /// the way out. Corruption never propagates to the caller.
    pub fn get(&self, lat: f64, lon: f64, endpoint: Endpoint) -> Option<Value> {
        let key = Self::cache_key(lat, lon, endpoint);
        let path = self.entry_path(&key);

        if !path.exists() {
            return None;
        }

        let entry = match fs::read(&path)
            .ok()
            .and_then(|bytes| serde_json::from_slice::<CacheEntry>(&bytes).ok())
        {
            Some(entry) => entry,
            None => {
                debug!("Corrupt cache entry for key {}, evicting", key);
                Self::remove_entry(&path);
                return None;
            }
        };

        if self.is_expired(entry.cached_at) {
            debug!("Expired cache entry for key {}, evicting", key);
            Self::remove_entry(&path);
            return None;
        }

        debug!("Cache hit for {} at ({:.4}, {:.4})", endpoint.as_str(), lat, lon);
        Some(entry.data)
    }

    /// Store data for a coordinate pair and endpoint, stamping the current
    /// time. Overwrites any existing entry. Caching is best-effort: write
    /// failures are logged and swallowed.
    pub fn set(&self, lat: f64, lon: f64, endpoint: Endpoint, data: Value) {
        self.ensure_directory();

        let key = Self::cache_key(lat, lon, endpoint);
        let entry = CacheEntry {
            cached_at: self.clock.now_unix(),
            lat,
            lon,
            endpoint: endpoint.as_str().to_string(),
            data,
        };

        let path = self.entry_path(&key);
        let result = serde_json::to_vec_pretty(&entry)
            .map_err(std::io::Error::other)
            .and_then(|bytes| fs::write(&path, bytes));

        if let Err(e) = result {
            warn!("Failed to write cache entry {:?}: {}", path, e);
        }
    }

    fn entry_files(&self) -> Vec<PathBuf> {
        let Ok(read_dir) = fs::read_dir(&self.directory) else {
            return Vec::new();
        };

        read_dir
            .flatten()
            .map(|e| e.path())
            .filter(|p| p.extension().is_some_and(|ext| ext == "json"))
            .collect()
    }

    /// Remove every expired or corrupt entry. Returns the number removed.
    pub fn sweep_expired(&self) -> usize {
        let mut removed = 0;

        for path in self.entry_files() {
            let entry = fs::read(&path)
                .ok()
                .and_then(|bytes| serde_json::from_slice::<CacheEntry>(&bytes).ok());

            let stale = match entry {
                Some(entry) => self.is_expired(entry.cached_at),
                None => true,
            };

            if stale && fs::remove_file(&path).is_ok() {
                removed += 1;
            }
        }

        if removed > 0 {
            debug!("Swept {} stale cache entries", removed);
        }
        removed
    }

    /// Remove every entry unconditionally. Returns the number removed.
    pub fn clear_all(&self) -> usize {
        let mut removed = 0;
        for path in self.entry_files() {
            if fs::remove_file(&path).is_ok() {
                removed += 1;
            }
        }
        removed
    }

    /// Diagnostic snapshot. "Expired" follows the same TTL rule as `get`;
    /// corrupt entries count toward the total only.
    #[must_use]
    pub fn stats(&self) -> CacheStats {
        let mut stats = CacheStats::default();

        for path in self.entry_files() {
            stats.total += 1;
            if let Ok(metadata) = fs::metadata(&path) {
                stats.total_size_bytes += metadata.len();
            }

            let entry = fs::read(&path)
                .ok()
                .and_then(|bytes| serde_json::from_slice::<CacheEntry>(&bytes).ok());

            if let Some(entry) = entry {
                if self.is_expired(entry.cached_at) {
                    stats.expired += 1;
                } else {
                    stats.valid += 1;
                }
            }
        }

        stats
    }
}
