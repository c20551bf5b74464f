//! Unbounded in-memory result cache.

use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::convert::Infallible;

use super::{CacheKey, CachedMetric, ResultCache};

/// In-memory result cache for tests and single-process use.
#[derive(Debug, Default)]
pub struct InMemoryResultCache {
    entries: RwLock<HashMap<CacheKey, CachedMetric>>,
}

impl InMemoryResultCache {
    /// Create a new empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of cached values.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Check if the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Metric names cached for any graph, sorted.
    pub fn metrics(&self) -> Vec<String> {
        let mut metrics: Vec<String> = self.entries.read().keys().map(|k| k.metric.clone()).collect();
        metrics.sort();
        metrics.dedup();
        metrics
    }

    /// Drop every value.
    pub fn clear(&self) {
        self.entries.write().clear();
    }
}

#[async_trait]
impl ResultCache for InMemoryResultCache {
    type Error = Infallible;

    async fn get(&self, key: &CacheKey) -> Result<Option<CachedMetric>, Self::Error> {
        Ok(self.entries.read().get(key).cloned())
    }

    async fn put(&self, key: &CacheKey, value: CachedMetric) -> Result<(), Self::Error> {
        self.entries.write().insert(key.clone(), value);
        Ok(())
    }

    async fn delete(&self, key: &CacheKey) -> Result<(), Self::Error> {
        self.entries.write().remove(key);
        Ok(())
    }
}
