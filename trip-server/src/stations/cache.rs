//! Disk cache for the station list.

use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use serde::{Deserialize, Serialize};

use crate::domain::Station;

use super::error::StationError;

/// Default cache TTL: 24 hours.
const DEFAULT_TTL: Duration = Duration::from_secs(24 * 60 * 60);

#[derive(Debug, Serialize, Deserialize)]
struct CachedStations {
    /// Unix timestamp when the cache was written.
    cached_at_secs: u64,
    stations: Vec<Station>,
}

/// Configuration for the station disk cache.
#[derive(Debug, Clone)]
pub struct StationCacheConfig {
    pub path: PathBuf,
    pub ttl: Duration,
}

impl StationCacheConfig {
    /// Create a new cache config with the given path and default TTL (24 hours).
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ttl: DEFAULT_TTL,
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }
}

impl Default for StationCacheConfig {
    fn default() -> Self {
        Self::new("stations_cache.json")
    }
}

/// Disk cache for the station list.
#[derive(Debug, Clone)]
pub struct StationCache {
    config: StationCacheConfig,
}

impl StationCache {
    pub fn new(config: StationCacheConfig) -> Self {
        Self { config }
    }

    /// Load stations if the cache exists, parses and is younger than the TTL.
    pub fn load(&self) -> Option<Vec<Station>> {
        let contents = std::fs::read_to_string(&self.config.path).ok()?;
        let cached: CachedStations = serde_json::from_str(&contents).ok()?;

        let age_secs = unix_now().ok()?.saturating_sub(cached.cached_at_secs);
        if age_secs >= self.config.ttl.as_secs() || cached.stations.is_empty() {
            return None;
        }

        Some(cached.stations)
    }

    /// Write stations to the cache, creating parent directories as needed.
    pub fn save(&self, stations: &[Station]) -> Result<(), StationError> {
        let cached = CachedStations {
            cached_at_secs: unix_now()?,
            stations: stations.to_vec(),
        };

        if let Some(parent) = self.config.path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(|e| StationError::Cache {
                message: format!("failed to create cache directory: {e}"),
            })?;
        }

        let json = serde_json::to_string(&cached).map_err(|e| StationError::Cache {
            message: format!("failed to serialize cache: {e}"),
        })?;

        std::fs::write(&self.config.path, json).map_err(|e| StationError::Cache {
            message: format!("failed to write cache file: {e}"),
        })
    }

    pub fn path(&self) -> &Path {
        &self.config.path
    }
}

fn unix_now() -> Result<u64, StationError> {
    SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .map_err(|_| StationError::Cache {
            message: "system time before unix epoch".to_string(),
        })
}
