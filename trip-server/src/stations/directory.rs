//! Shared, refreshable station list.

use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::domain::{Station, StationId};

use super::cache::StationCache;
use super::error::StationError;
use super::source::StationSource;

/// Thread-safe station list with background refresh.
///
/// Readers get a shared snapshot; a refresh swaps in a new list without
/// disturbing requests that still hold the old one.
#[derive(Clone)]
pub struct StationDirectory<S> {
    inner: Arc<RwLock<Arc<Vec<Station>>>>,
    source: S,
    cache: Option<StationCache>,
}

impl<S: StationSource> StationDirectory<S> {
    /// Load the station list, preferring a fresh disk cache.
    ///
    /// Fails if there is no usable cache and the provider is unreachable.
    pub async fn load(source: S, cache: Option<StationCache>) -> Result<Self, StationError> {
        let cached = cache.as_ref().and_then(StationCache::load);

        let stations = match cached {
            Some(stations) => {
                info!(count = stations.len(), "Loaded stations from disk cache");
                stations
            }
            None => {
                let stations = fetch_nonempty(&source).await?;
                info!(count = stations.len(), "Fetched stations from provider");
                save(cache.as_ref(), &stations);
                stations
            }
        };

        Ok(Self::with_stations(source, cache, stations))
    }

    /// Create a directory over a known list without touching the provider.
    pub fn with_stations(source: S, cache: Option<StationCache>, stations: Vec<Station>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Arc::new(stations))),
            source,
            cache,
        }
    }

    /// The current station list.
    pub async fn all(&self) -> Arc<Vec<Station>> {
        self.inner.read().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }

    /// Look up a station by id.
    pub async fn get(&self, id: &StationId) -> Option<Station> {
        self.inner.read().await.iter().find(|s| &s.id == id).cloned()
    }

    /// Refetch the list from the provider.
    ///
    /// On failure the current list is kept and the error returned.
    pub async fn refresh(&self) -> Result<usize, StationError> {
        let stations = fetch_nonempty(&self.source).await?;
        let count = stations.len();

        save(self.cache.as_ref(), &stations);
        *self.inner.write().await = Arc::new(stations);

        Ok(count)
    }

    /// Stations whose name or standard name contains `query`, ignoring case.
    ///
    /// Names starting with the query come first; otherwise list order is
    /// kept. A blank query matches nothing.
    pub async fn search(&self, query: &str, limit: usize) -> Vec<Station> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() || limit == 0 {
            return Vec::new();
        }

        let stations = self.all().await;

        let mut prefix = Vec::new();
        let mut contains = Vec::new();
        for station in stations.iter() {
            let name = station.name.to_lowercase();
            let standard = station.standard_name.to_lowercase();
            if name.starts_with(&needle) || standard.starts_with(&needle) {
                prefix.push(station);
            } else if name.contains(&needle) || standard.contains(&needle) {
                contains.push(station);
            }
        }

        prefix
            .into_iter()
            .chain(contains)
            .take(limit)
            .cloned()
            .collect()
    }
}

async fn fetch_nonempty<S: StationSource>(source: &S) -> Result<Vec<Station>, StationError> {
    let stations = source.fetch_stations().await?;
    if stations.is_empty() {
        return Err(StationError::Empty);
    }
    Ok(stations)
}

/// Write the disk cache; a failed write only costs a refetch next start.
fn save(cache: Option<&StationCache>, stations: &[Station]) {
    if let Some(cache) = cache
        && let Err(e) = cache.save(stations)
    {
        warn!(path = %cache.path().display(), error = %e, "Failed to write station cache");
    }
}
