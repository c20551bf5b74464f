//! Result cache backends.
//!
//! The engine only depends on [`ResultCache`]: get, put and delete keyed by a
//! graph identity plus a metric name. Stored values are returned exactly as
//! they were written; the engine never re-validates them.

pub mod memory;
pub mod lru;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::types::{EntityId, GraphIdentity, MinimalCutsets, SystemGraph};

/// Cache key: graph identity plus metric name.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CacheKey {
    /// Identity of the graph the value was computed for.
    pub graph: GraphIdentity,
    /// Metric name, e.g. `cutsets` or `risk`.
    pub metric: String,
}

impl CacheKey {
    /// Key for a metric of a graph.
    pub fn new(graph: &SystemGraph, metric: impl Into<String>) -> Self {
        Self::for_identity(graph.identity(), metric)
    }

    /// Key for a metric of an already computed identity.
    pub fn for_identity(graph: GraphIdentity, metric: impl Into<String>) -> Self {
        Self {
            graph,
            metric: metric.into(),
        }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.graph, self.metric)
    }
}

/// A cached metric value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum CachedMetric {
    /// Minimal cutsets.
    Cutsets(MinimalCutsets),
    /// A single probability such as the system risk.
    Probability(f64),
    /// Per-entity importances.
    Importances(BTreeMap<EntityId, f64>),
    /// Named scalar results such as selected importances.
    Selected(BTreeMap<String, f64>),
}

impl CachedMetric {
    /// Variant name, for diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Cutsets(_) => "cutsets",
            Self::Probability(_) => "probability",
            Self::Importances(_) => "importances",
            Self::Selected(_) => "selected",
        }
    }
}

/// Trait for result cache backends.
///
/// All methods are async so that remote stores fit behind the same seam.
#[async_trait]
pub trait ResultCache: Send + Sync {
    /// Error type for cache operations.
    type Error: std::error::Error + Send + Sync;

    /// Fetch a cached value.
    async fn get(&self, key: &CacheKey) -> Result<Option<CachedMetric>, Self::Error>;

    /// Store a value, replacing any previous one.
    async fn put(&self, key: &CacheKey, value: CachedMetric) -> Result<(), Self::Error>;

    /// Remove a value. Removing a missing key is not an error.
    async fn delete(&self, key: &CacheKey) -> Result<(), Self::Error>;
}

pub use memory::InMemoryResultCache;
pub use self::lru::LruResultCache;
