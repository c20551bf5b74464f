//! # supply-risk-kernel
//!
//! Minimal cutsets and importance measures for supply-chain dependency graphs.
//!
//! The kernel answers one question:
//!
//! > Which combinations of component and supplier failures bring the system down,
//! > and how much does each part contribute to that risk?
//!
//! ## Core Contract
//!
//! 1. Fold single-source offerings into the dependency graph
//! 2. Enumerate the minimal cutsets of the indicator with MOCUS
//! 3. Derive system risk and Birnbaum / fractional importances from the cutsets
//!
//! ## Architecture
//!
//! ```text
//! SystemGraph → Offering Folder → MOCUS → MinimalCutsets → Risk / Importances
//!                                   ↓
//!                       ResultCache (LRU or Memory)
//! ```
//!
//! ## Determinism Guarantees
//!
//! - Same graph content → identical `GraphIdentity`, regardless of member order
//! - Cutsets are ordered sets; their enumeration order never leaks into results
//! - Cached values are returned exactly as stored until deleted

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod types;
pub mod canonical;
pub mod cutset;
pub mod offering;
pub mod metrics;
pub mod policy;
pub mod store;
pub mod engine;

#[cfg(feature = "service")]
pub mod service;

// Re-exports
pub use types::{
    Component, Supplier, EntityId, Gate, DEFAULT_RISK,
    RiskRelation, Offering, Indicator, INDICATOR_TARGET,
    SystemGraph, GraphError, GraphIdentity, GraphStructure,
    Cutset, MinimalCutsets,
};
pub use canonical::{to_canonical_bytes, canonical_hash, quantize_probability};
pub use cutset::{
    minimal_cutsets, brute_force_find_cutsets, brute_force_find_cutsets_bounded,
    MocusError, BRUTE_FORCE_ENTITY_CEILING, MAX_BRUTE_FORCE_ENTITIES,
};
pub use offering::apply_singular_offerings;
pub use metrics::{
    aggregate_risk, cutset_probability, risk, ProbabilityTable,
    selector, Selector, SelectorError,
};
pub use policy::{EnginePolicy, StructuralNormalization};
pub use store::{ResultCache, CacheKey, CachedMetric, InMemoryResultCache, LruResultCache};
pub use store::lru::{LruCacheConfig, LruCacheStats};
pub use engine::{RiskEngine, EngineError};

// Service re-exports (when service feature is enabled)
#[cfg(feature = "service")]
pub use service::{create_router, ServiceState};

/// Schema version of the graph input format.
/// Increment on breaking changes to any schema type.
pub const RISK_KERNEL_SCHEMA_VERSION: &str = "1.0.0";
