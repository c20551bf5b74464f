//! System failure probability from minimal cutsets.
//!
//! Formula:
//! ```text
//! P(c)  = Π_{i ∈ c} p_i
//! risk  = 1 − Π_{c ∈ cutsets} (1 − P(c))
//! ```
//!
//! Cutsets are treated as independent failure modes. No inclusion–exclusion
//! correction is applied for entities shared between cutsets, so the value is
//! an approximation whenever cutsets overlap.

use std::collections::BTreeMap;

use crate::cutset::{minimal_cutsets, MocusError};
use crate::offering::apply_singular_offerings;
use crate::types::{Cutset, EntityId, MinimalCutsets, SystemGraph, DEFAULT_RISK};

/// Failure probability per entity, with optional overrides.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProbabilityTable {
    probabilities: BTreeMap<EntityId, f64>,
}

impl ProbabilityTable {
    /// Take every component and supplier risk from the graph.
    pub fn from_graph(graph: &SystemGraph) -> Self {
        let probabilities = graph
            .components
            .iter()
            .map(|c| (c.id.clone(), c.risk))
            .chain(graph.suppliers.iter().map(|s| (s.id.clone(), s.risk)))
            .collect();
        Self { probabilities }
    }

    /// Copy of the table with one entity's probability replaced.
    pub fn with_override(&self, id: &EntityId, probability: f64) -> Self {
        let mut table = self.clone();
        table.probabilities.insert(id.clone(), probability);
        table
    }

    /// Copy of the table with several entities' probabilities replaced.
    pub fn with_overrides<'a>(&self, ids: impl IntoIterator<Item = &'a EntityId>, probability: f64) -> Self {
        let mut table = self.clone();
        for id in ids {
            table.probabilities.insert(id.clone(), probability);
        }
        table
    }

    /// Probability of an entity.
    ///
    /// Unknown ids can appear when cached cutsets were produced for another
    /// graph; they fall back to [`DEFAULT_RISK`].
    pub fn get(&self, id: &EntityId) -> f64 {
        match self.probabilities.get(id) {
            Some(&p) => p,
            None => {
                tracing::warn!(entity = %id, "no probability for entity, using default");
                DEFAULT_RISK
            }
        }
    }
}

/// Probability that every entity of the cutset fails.
pub fn cutset_probability(cutset: &Cutset, probabilities: &ProbabilityTable) -> f64 {
    cutset.iter().map(|id| probabilities.get(id)).product()
}

/// Aggregate cutset probabilities into a system failure probability.
pub fn aggregate_risk<'a>(
    cutsets: impl IntoIterator<Item = &'a Cutset>,
    probabilities: &ProbabilityTable,
) -> f64 {
    let survive: f64 = cutsets
        .into_iter()
        .map(|c| 1.0 - cutset_probability(c, probabilities))
        .product();
    (1.0 - survive).clamp(0.0, 1.0)
}

/// Fold singular offerings and enumerate cutsets with suppliers ignored.
///
/// Returns the folded graph alongside its cutsets; probabilities must be
/// read from the folded graph.
pub fn folded_cutsets(graph: &SystemGraph) -> Result<(SystemGraph, MinimalCutsets), MocusError> {
    let folded = apply_singular_offerings(graph);
    let cutsets = minimal_cutsets(&folded, true)?;
    Ok((folded, cutsets))
}

/// System failure probability of a graph, computed from scratch.
pub fn risk(graph: &SystemGraph) -> Result<f64, MocusError> {
    let (folded, cutsets) = folded_cutsets(graph)?;
    Ok(aggregate_risk(&cutsets, &ProbabilityTable::from_graph(&folded)))
}
