//! Caching layer for departure responses.
//!
//! The watch loop re-runs the pipeline on a short interval, usually for the
//! same handful of stops. Responses are cached per (token, query) for a
//! short TTL so a tick inside the TTL costs no upstream requests. Failures
//! are never cached.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache as MokaCache;
use tracing::trace;

use crate::domain::{Departure, Query};
use crate::pipeline::DepartureProvider;
use crate::ptv::PtvError;

/// Cache key: token plus query, so different accounts never share entries.
type DepartureKey = (String, Query);

/// Cached response.
type DepartureEntry = Arc<Vec<Departure>>;

/// Configuration for the cache.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// TTL for cached entries.
    pub ttl: Duration,

    /// Maximum number of cached entries.
    pub max_capacity: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(30),
            max_capacity: 256,
        }
    }
}

/// Departure provider with caching.
///
/// Wraps any provider and caches its successful responses.
pub struct CachedProvider<P> {
    inner: P,
    cache: MokaCache<DepartureKey, DepartureEntry>,
}

impl<P: DepartureProvider> CachedProvider<P> {
    /// Create a new cached provider.
    pub fn new(inner: P, config: &CacheConfig) -> Self {
        let cache = MokaCache::builder()
            .time_to_live(config.ttl)
            .max_capacity(config.max_capacity)
            .build();

        Self { inner, cache }
    }

    /// Get cache statistics (for monitoring).
    pub fn entry_count(&self) -> u64 {
        self.cache.entry_count()
    }

    /// Invalidate all cached entries.
    pub fn invalidate_all(&self) {
        self.cache.invalidate_all();
    }
}

impl<P: DepartureProvider> DepartureProvider for CachedProvider<P> {
    async fn departures(&self, token: &str, query: &Query) -> Result<Vec<Departure>, PtvError> {
        let key = (token.to_string(), query.clone());

        if let Some(cached) = self.cache.get(&key).await {
            trace!(%query, "Departure cache hit");
            return Ok(cached.as_ref().clone());
        }

        let departures = self.inner.departures(token, query).await?;
        self.cache
            .insert(key, Arc::new(departures.clone()))
            .await;

        Ok(departures)
    }
}
