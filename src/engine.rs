//! Cached risk engine.
//!
//! Every entry point validates the graph, then consults the injected
//! [`ResultCache`] before computing. Cutsets are shared between metrics:
//! the risk and importance paths all read the `cutsets` entry first, so a
//! cutset value written by anyone is honoured until it is deleted.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::{debug, info};

use crate::cutset::{brute_force_find_cutsets_bounded, minimal_cutsets, MocusError};
use crate::metrics::{
    aggregate_risk, birnbaum_importances, birnbaum_structural_importances,
    fractional_importance_traits, group_birnbaum_importance, group_structural_importance,
    ProbabilityTable, Selector, SelectorError, BIRNBAUM_IMPORTANCES,
    BIRNBAUM_STRUCTURAL_IMPORTANCES,
};
use crate::offering::apply_singular_offerings;
use crate::policy::{EnginePolicy, StructuralNormalization};
use crate::store::{CacheKey, CachedMetric, ResultCache};
use crate::types::{EntityId, GraphError, GraphIdentity, MinimalCutsets, SystemGraph};

/// Cache metric name of the minimal cutsets.
pub const CUTSETS: &str = "cutsets";

/// Cache metric name of the system risk.
pub const RISK: &str = "risk";

/// Error type for engine operations.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// The graph failed validation.
    #[error("Invalid graph: {0}")]
    InvalidGraph(#[from] GraphError),
    /// Cutset enumeration failed.
    #[error("Cutset enumeration failed: {0}")]
    Mocus(#[from] MocusError),
    /// The attribute selector could not be built.
    #[error("Invalid selector: {0}")]
    Selector(#[from] SelectorError),
    /// Cache backend error.
    #[error("Cache error: {0}")]
    Cache(String),
    /// A cached value has an unexpected shape.
    #[error("Cached {key} is {found}, expected {expected}")]
    CacheTypeMismatch {
        /// Offending key.
        key: CacheKey,
        /// Variant the engine needed.
        expected: &'static str,
        /// Variant found in the cache.
        found: &'static str,
    },
}

impl EngineError {
    /// Create a cache error from any error type.
    pub fn from_cache<E: std::error::Error>(e: E) -> Self {
        Self::Cache(e.to_string())
    }

    fn mismatch(key: CacheKey, expected: &'static str, found: &CachedMetric) -> Self {
        Self::CacheTypeMismatch {
            key,
            expected,
            found: found.kind(),
        }
    }
}

/// Risk and importance engine over a result cache.
pub struct RiskEngine<C: ResultCache> {
    cache: Arc<C>,
    policy: EnginePolicy,
}

impl<C: ResultCache> Clone for RiskEngine<C> {
    fn clone(&self) -> Self {
        Self {
            cache: Arc::clone(&self.cache),
            policy: self.policy.clone(),
        }
    }
}

impl<C: ResultCache> RiskEngine<C> {
    /// Create an engine over a shared cache.
    pub fn new(cache: Arc<C>, policy: EnginePolicy) -> Self {
        Self { cache, policy }
    }

    /// Engine policy.
    pub fn policy(&self) -> &EnginePolicy {
        &self.policy
    }

    /// Underlying cache.
    pub fn cache(&self) -> &Arc<C> {
        &self.cache
    }

    /// Minimal cutsets of the graph after singular offerings are folded.
    pub async fn get_cutsets(&self, graph: &SystemGraph) -> Result<MinimalCutsets, EngineError> {
        graph.validate()?;
        self.cutsets(graph, graph.identity()).await
    }

    /// System failure probability.
    pub async fn get_risk(&self, graph: &SystemGraph) -> Result<f64, EngineError> {
        graph.validate()?;
        let identity = graph.identity();
        let key = CacheKey::for_identity(identity, RISK);

        match self.lookup(&key).await? {
            Some(CachedMetric::Probability(risk)) => {
                debug!(graph = %identity, "risk cache hit");
                return Ok(risk);
            }
            Some(other) => return Err(EngineError::mismatch(key, "probability", &other)),
            None => {}
        }

        let cutsets = self.cutsets(graph, identity).await?;
        let risk = aggregate_risk(&cutsets, &probabilities(graph));
        self.store(&key, CachedMetric::Probability(risk)).await?;

        info!(graph = %identity, name = %graph.name, risk, "computed risk");
        Ok(risk)
    }

    /// Structural importance of every component and supplier.
    pub async fn get_birnbaum_structural_importances(
        &self,
        graph: &SystemGraph,
    ) -> Result<BTreeMap<EntityId, f64>, EngineError> {
        graph.validate()?;
        let normalization = self.policy.structural_normalization;
        let cached_as = structural_cache_name(BIRNBAUM_STRUCTURAL_IMPORTANCES, normalization);
        self.importances(graph, &cached_as, |graph, cutsets| {
            birnbaum_structural_importances(graph, cutsets, normalization)
        })
        .await
    }

    /// Birnbaum importance of every component and supplier.
    pub async fn get_birnbaum_importances(
        &self,
        graph: &SystemGraph,
    ) -> Result<BTreeMap<EntityId, f64>, EngineError> {
        graph.validate()?;
        self.importances(graph, BIRNBAUM_IMPORTANCES, |graph, cutsets| {
            birnbaum_importances(graph, cutsets, &probabilities(graph))
        })
        .await
    }

    /// Structural importance of the entities picked by `selector`, as a
    /// single entry keyed `birnbaum_structural_importances_select_<attr>_<value>`.
    pub async fn get_birnbaum_structural_importances_select(
        &self,
        graph: &SystemGraph,
        selector: &Selector,
    ) -> Result<BTreeMap<String, f64>, EngineError> {
        graph.validate()?;
        let normalization = self.policy.structural_normalization;
        let name = selector.key(BIRNBAUM_STRUCTURAL_IMPORTANCES);
        let cached_as = structural_cache_name(&name, normalization);
        self.selected(graph, name, &cached_as, |graph, cutsets| {
            group_structural_importance(cutsets, selector.select(graph), normalization)
        })
        .await
    }

    /// Birnbaum importance of the entities picked by `selector`, as a single
    /// entry keyed `birnbaum_importances_select_<attr>_<value>`.
    pub async fn get_birnbaum_importances_select(
        &self,
        graph: &SystemGraph,
        selector: &Selector,
    ) -> Result<BTreeMap<String, f64>, EngineError> {
        graph.validate()?;
        let name = selector.key(BIRNBAUM_IMPORTANCES);
        let cached_as = name.clone();
        self.selected(graph, name, &cached_as, |graph, cutsets| {
            group_birnbaum_importance(cutsets, &probabilities(graph), selector.select(graph))
        })
        .await
    }

    /// Share of system risk carried by each attribute value. Not cached.
    pub async fn get_fractional_importance_traits(
        &self,
        graph: &SystemGraph,
    ) -> Result<BTreeMap<String, f64>, EngineError> {
        graph.validate()?;
        let cutsets = self.cutsets(graph, graph.identity()).await?;
        Ok(fractional_importance_traits(graph, &cutsets, &probabilities(graph)))
    }

    /// Check MOCUS against exhaustive enumeration on the folded graph.
    ///
    /// Bypasses the cache. Fails with [`MocusError::TooManyEntities`] above
    /// the policy's brute-force bound.
    pub fn verify_cutsets(&self, graph: &SystemGraph) -> Result<bool, EngineError> {
        graph.validate()?;
        let folded = apply_singular_offerings(graph);
        let fast = minimal_cutsets(&folded, true)?;
        let exhaustive = brute_force_find_cutsets_bounded(&folded, true, self.policy.brute_force_max_entities)?;
        Ok(fast == exhaustive)
    }

    async fn cutsets(&self, graph: &SystemGraph, identity: GraphIdentity) -> Result<MinimalCutsets, EngineError> {
        let key = CacheKey::for_identity(identity, CUTSETS);

        match self.lookup(&key).await? {
            Some(CachedMetric::Cutsets(cutsets)) => {
                debug!(graph = %identity, count = cutsets.len(), "cutsets cache hit");
                return Ok(cutsets);
            }
            Some(other) => return Err(EngineError::mismatch(key, "cutsets", &other)),
            None => {}
        }

        let folded = apply_singular_offerings(graph);
        let cutsets = minimal_cutsets(&folded, true)?;
        self.store(&key, CachedMetric::Cutsets(cutsets.clone())).await?;

        debug!(graph = %identity, count = cutsets.len(), "computed cutsets");
        Ok(cutsets)
    }

    async fn importances<F>(
        &self,
        graph: &SystemGraph,
        metric: &str,
        compute: F,
    ) -> Result<BTreeMap<EntityId, f64>, EngineError>
    where
        F: FnOnce(&SystemGraph, &MinimalCutsets) -> BTreeMap<EntityId, f64>,
    {
        let identity = graph.identity();
        let key = CacheKey::for_identity(identity, metric);

        match self.lookup(&key).await? {
            Some(CachedMetric::Importances(importances)) => {
                debug!(graph = %identity, metric, "importance cache hit");
                return Ok(importances);
            }
            Some(other) => return Err(EngineError::mismatch(key, "importances", &other)),
            None => {}
        }

        let cutsets = self.cutsets(graph, identity).await?;
        let importances = compute(graph, &cutsets);
        self.store(&key, CachedMetric::Importances(importances.clone())).await?;
        Ok(importances)
    }

    /// Single-entry result under `name`, cached under `cached_as`.
    async fn selected<F>(
        &self,
        graph: &SystemGraph,
        name: String,
        cached_as: &str,
        compute: F,
    ) -> Result<BTreeMap<String, f64>, EngineError>
    where
        F: FnOnce(&SystemGraph, &MinimalCutsets) -> f64,
    {
        let identity = graph.identity();
        let key = CacheKey::for_identity(identity, cached_as);

        match self.lookup(&key).await? {
            Some(CachedMetric::Selected(values)) => {
                debug!(graph = %identity, metric = %name, "selected importance cache hit");
                return Ok(values);
            }
            Some(other) => return Err(EngineError::mismatch(key, "selected", &other)),
            None => {}
        }

        let cutsets = self.cutsets(graph, identity).await?;
        let value = compute(graph, &cutsets);
        let values = BTreeMap::from([(name, value)]);
        self.store(&key, CachedMetric::Selected(values.clone())).await?;
        Ok(values)
    }

    async fn lookup(&self, key: &CacheKey) -> Result<Option<CachedMetric>, EngineError> {
        self.cache.get(key).await.map_err(EngineError::from_cache)
    }

    async fn store(&self, key: &CacheKey, value: CachedMetric) -> Result<(), EngineError> {
        self.cache.put(key, value).await.map_err(EngineError::from_cache)
    }
}

/// Cache metric name of a structural result.
///
/// Normalization is part of the name so engines with different policies can
/// share one cache.
fn structural_cache_name(metric: &str, normalization: StructuralNormalization) -> String {
    format!("{}@{}", metric, normalization.as_str())
}

/// Probabilities after folding, which may replace component risks with
/// offering probabilities.
fn probabilities(graph: &SystemGraph) -> ProbabilityTable {
    ProbabilityTable::from_graph(&apply_singular_offerings(graph))
}
