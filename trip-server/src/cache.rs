//! In-memory caching for oracle lookups.
//!
//! Connection lookups are keyed by the query with its anchor time rounded
//! down to a bucket (5 minutes by default). The rounded query is what gets
//! sent upstream, so a cached answer is exactly the answer to the key.
//! Rounding an "arrive by" anchor down only ever asks for an earlier
//! arrival.
//!
//! Failed lookups are never cached.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use moka::future::Cache as MokaCache;
use tracing::trace;

use crate::domain::{Connection, ConnectionQuery, Point, TimeAnchor};
use crate::planner::{ConnectionLookupError, ConnectionOracle, GeocodeError, Geocoder};

/// Configuration for the caches.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// TTL for cached connection lists.
    pub ttl: Duration,

    /// TTL for geocoded addresses.
    pub geocode_ttl: Duration,

    /// Maximum number of entries per cache.
    pub max_capacity: u64,

    /// Anchor time bucket size in minutes.
    pub bucket_mins: u16,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(60),
            geocode_ttl: Duration::from_secs(60 * 60),
            max_capacity: 1000,
            bucket_mins: 5,
        }
    }
}

/// Round `time` down to the start of its bucket.
fn bucket_start(time: DateTime<Utc>, bucket_mins: u16) -> DateTime<Utc> {
    let size = i64::from(bucket_mins.max(1)) * 60;
    let secs = time.timestamp();
    DateTime::from_timestamp(secs - secs.rem_euclid(size), 0).unwrap_or(time)
}

/// Connection oracle with caching.
pub struct CachedConnectionOracle<C> {
    inner: C,
    cache: MokaCache<ConnectionQuery, Arc<Vec<Connection>>>,
    bucket_mins: u16,
}

impl<C: ConnectionOracle + Sync> CachedConnectionOracle<C> {
    pub fn new(inner: C, config: &CacheConfig) -> Self {
        let cache = MokaCache::builder()
            .time_to_live(config.ttl)
            .max_capacity(config.max_capacity)
            .build();

        Self {
            inner,
            cache,
            bucket_mins: config.bucket_mins,
        }
    }

    /// The query actually sent upstream for `query`.
    fn normalize(&self, query: &ConnectionQuery) -> ConnectionQuery {
        let mut key = query.clone();
        key.anchor = query.anchor.map(|anchor| TimeAnchor {
            time: bucket_start(anchor.time, self.bucket_mins),
            ..anchor
        });
        key
    }

    /// Access the wrapped oracle for lookups that bypass the cache.
    pub fn inner(&self) -> &C {
        &self.inner
    }

    /// Number of cached connection lists. Moka updates this lazily, so it
    /// can lag behind recent inserts.
    pub fn cache_entry_count(&self) -> u64 {
        self.cache.entry_count()
    }
}

impl<C: ConnectionOracle + Sync> ConnectionOracle for CachedConnectionOracle<C> {
    async fn connections(
        &self,
        query: &ConnectionQuery,
    ) -> Result<Vec<Connection>, ConnectionLookupError> {
        let key = self.normalize(query);

        // Concurrent misses on the same key share one upstream request
        let entry = self
            .cache
            .try_get_with(key.clone(), async {
                trace!(from = %key.from, to = %key.to, "Connection cache miss");
                self.inner.connections(&key).await.map(Arc::new)
            })
            .await
            .map_err(|e| (*e).clone())?;

        Ok(entry.as_ref().clone())
    }
}

/// Geocoder with caching.
///
/// Addresses are trimmed and lower-cased before lookup, so `" Gent "` and
/// `"gent"` share an entry.
pub struct CachedGeocoder<G> {
    inner: G,
    cache: MokaCache<String, Point>,
}

impl<G: Geocoder + Sync> CachedGeocoder<G> {
    pub fn new(inner: G, config: &CacheConfig) -> Self {
        let cache = MokaCache::builder()
            .time_to_live(config.geocode_ttl)
            .max_capacity(config.max_capacity)
            .build();

        Self { inner, cache }
    }

    /// Access the wrapped geocoder.
    pub fn inner(&self) -> &G {
        &self.inner
    }

    /// Number of cached addresses.
    pub fn cache_entry_count(&self) -> u64 {
        self.cache.entry_count()
    }
}

impl<G: Geocoder + Sync> Geocoder for CachedGeocoder<G> {
    async fn geocode(&self, address: &str) -> Result<Point, GeocodeError> {
        let key = address.trim().to_lowercase();

        if let Some(point) = self.cache.get(&key).await {
            return Ok(point);
        }

        let point = self.inner.geocode(address.trim()).await?;
        self.cache.insert(key, point).await;

        Ok(point)
    }
}
