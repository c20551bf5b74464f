//! Service state management.
//!
//! Contains the shared engine and the per-graph compute locks.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

use crate::engine::RiskEngine;
use crate::policy::EnginePolicy;
use crate::store::lru::LruCacheConfig;
use crate::store::{LruResultCache, ResultCache};
use crate::types::GraphIdentity;

/// Single-flight guards keyed by graph identity.
///
/// Requests for the same graph run one after another, so the second one
/// finds the cutsets written by the first. Different graphs never wait on
/// each other.
#[derive(Debug, Default)]
pub struct ComputeLocks {
    locks: Mutex<HashMap<GraphIdentity, Arc<AsyncMutex<()>>>>,
}

impl ComputeLocks {
    /// Create an empty lock table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive use of a graph identity.
    pub async fn acquire(&self, identity: GraphIdentity) -> ComputeGuard<'_> {
        // The table lock is released before awaiting.
        let lock = Arc::clone(self.locks.lock().entry(identity).or_default());
        let guard = lock.lock_owned().await;
        ComputeGuard {
            owner: self,
            identity,
            guard: Some(guard),
        }
    }

    /// Number of identities with an entry in the table.
    pub fn len(&self) -> usize {
        self.locks.lock().len()
    }

    /// Check if no identity holds an entry.
    pub fn is_empty(&self) -> bool {
        self.locks.lock().is_empty()
    }

    fn release(&self, identity: GraphIdentity) {
        let mut locks = self.locks.lock();
        // Only the table holds the mutex once nobody waits on it.
        if locks.get(&identity).is_some_and(|lock| Arc::strong_count(lock) == 1) {
            locks.remove(&identity);
        }
    }
}

/// Held while a graph is being computed.
pub struct ComputeGuard<'a> {
    owner: &'a ComputeLocks,
    identity: GraphIdentity,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for ComputeGuard<'_> {
    fn drop(&mut self) {
        // Drop the owned guard first so its Arc no longer counts.
        self.guard.take();
        self.owner.release(self.identity);
    }
}

/// Shared service state.
pub struct ServiceState<C: ResultCache> {
    /// The engine, sharing one cache across requests.
    pub engine: RiskEngine<C>,
    /// Single-flight table.
    pub locks: Arc<ComputeLocks>,
    started: Instant,
}

impl<C: ResultCache> ServiceState<C> {
    /// Create service state over a cache.
    pub fn new(cache: C, policy: EnginePolicy) -> Self {
        Self {
            engine: RiskEngine::new(Arc::new(cache), policy),
            locks: Arc::new(ComputeLocks::new()),
            started: Instant::now(),
        }
    }

    /// Seconds since the state was created.
    pub fn uptime_secs(&self) -> u64 {
        self.started.elapsed().as_secs()
    }
}

impl ServiceState<LruResultCache> {
    /// Create service state from environment variables.
    ///
    /// Reads `RISK_CACHE_CAPACITY`, `RISK_STRUCTURAL_NORMALIZATION` and
    /// `RISK_BRUTE_FORCE_MAX`.
    pub fn from_env() -> Self {
        let config = LruCacheConfig::from_env();
        tracing::info!(max_entries = config.max_entries, "result cache configured");
        Self::new(LruResultCache::new(config), EnginePolicy::from_env())
    }
}

impl<C: ResultCache> Clone for ServiceState<C> {
    fn clone(&self) -> Self {
        Self {
            engine: self.engine.clone(),
            locks: Arc::clone(&self.locks),
            started: self.started,
        }
    }
}
