//! Minimal cutset enumeration.
//!
//! Two independent routes produce the same [`MinimalCutsets`]:
//!
//! - [`minimal_cutsets`]: MOCUS-style top-down gate substitution, the
//!   production path.
//! - [`brute_force_find_cutsets`]: exhaustive subset evaluation, exponential
//!   in the number of reachable entities and kept for cross-validation.
//!
//! [`MinimalCutsets`]: crate::types::MinimalCutsets

mod model;
pub mod mocus;
pub mod brute_force;

pub use mocus::minimal_cutsets;
pub use brute_force::{
    brute_force_find_cutsets, brute_force_find_cutsets_bounded, BRUTE_FORCE_ENTITY_CEILING,
    MAX_BRUTE_FORCE_ENTITIES,
};

use crate::types::EntityId;

/// Error type for cutset enumeration.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MocusError {
    /// A component feeding the indicator has neither dependencies nor an
    /// offering to fall back on.
    #[error("No dependency or offering resolves component: {0}")]
    UnresolvedSupply(EntityId),
    /// The graph references an id that is not declared.
    #[error("Unknown entity: {0}")]
    UnknownEntity(EntityId),
    /// Gate expansion re-entered a node it is still expanding.
    #[error("Dependency cycle through: {0}")]
    Cycle(EntityId),
    /// Too many entities for exhaustive enumeration.
    #[error("Brute force over {count} entities exceeds the limit of {max}")]
    TooManyEntities {
        /// Reachable entities.
        count: usize,
        /// Effective limit.
        max: usize,
    },
}
