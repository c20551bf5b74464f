//! Bounded LRU result cache.
//!
//! Least recently used values are evicted once `max_entries` is reached.
//! Lookups promote the entry, so they take the write lock.

use ::lru::LruCache;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::convert::Infallible;
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};

use super::{CacheKey, CachedMetric, ResultCache};

/// Configuration for the bounded cache.
#[derive(Debug, Clone)]
pub struct LruCacheConfig {
    /// Maximum number of entries in the cache.
    pub max_entries: usize,
}

impl Default for LruCacheConfig {
    fn default() -> Self {
        Self { max_entries: 10_000 }
    }
}

impl LruCacheConfig {
    /// Read `RISK_CACHE_CAPACITY` from the environment, keeping the default
    /// when unset or unparsable.
    pub fn from_env() -> Self {
        std::env::var("RISK_CACHE_CAPACITY")
            .ok()
            .and_then(|s| s.parse().ok())
            .map(|max_entries| Self { max_entries })
            .unwrap_or_default()
    }
}

/// Hit/miss counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LruCacheStats {
    /// Lookups answered from the cache.
    pub hits: u64,
    /// Lookups that found nothing.
    pub misses: u64,
    /// Current number of entries.
    pub entries: usize,
}

/// Thread-safe LRU result cache.
pub struct LruResultCache {
    entries: Mutex<LruCache<CacheKey, CachedMetric>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl LruResultCache {
    /// Create a cache with the given configuration.
    pub fn new(config: LruCacheConfig) -> Self {
        let size = NonZeroUsize::new(config.max_entries).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Mutex::new(LruCache::new(size)),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Snapshot of the counters.
    pub fn stats(&self) -> LruCacheStats {
        LruCacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries: self.entries.lock().len(),
        }
    }
}

impl Default for LruResultCache {
    fn default() -> Self {
        Self::new(LruCacheConfig::default())
    }
}

#[async_trait]
impl ResultCache for LruResultCache {
    type Error = Infallible;

    async fn get(&self, key: &CacheKey) -> Result<Option<CachedMetric>, Self::Error> {
        let value = self.entries.lock().get(key).cloned();
        let counter = if value.is_some() { &self.hits } else { &self.misses };
        counter.fetch_add(1, Ordering::Relaxed);
        Ok(value)
    }

    async fn put(&self, key: &CacheKey, value: CachedMetric) -> Result<(), Self::Error> {
        self.entries.lock().put(key.clone(), value);
        Ok(())
    }

    async fn delete(&self, key: &CacheKey) -> Result<(), Self::Error> {
        self.entries.lock().pop(key);
        Ok(())
    }
}
