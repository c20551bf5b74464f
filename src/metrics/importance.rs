//! Importance measures over minimal cutsets.
//!
//! - Birnbaum structural importance: how often an entity appears among the
//!   minimal cutsets, independent of probabilities.
//! - Birnbaum importance: `risk(p_e = 1) − risk(p_e = 0)` with every other
//!   probability held fixed.
//! - Fractional importance of a trait: share of system risk carried by the
//!   cutsets that touch an entity with that trait (Fussell–Vesely style).
//!
//! Group variants treat a set of entities as one: a cutset counts when it
//! contains any member, and all members are forced to 1 or 0 together.

use std::collections::{BTreeMap, BTreeSet};

use crate::policy::StructuralNormalization;
use crate::types::{EntityId, MinimalCutsets, SystemGraph};
use super::risk::{aggregate_risk, ProbabilityTable};

/// Metric name of the structural importance map.
pub const BIRNBAUM_STRUCTURAL_IMPORTANCES: &str = "birnbaum_structural_importances";

/// Metric name of the probabilistic importance map.
pub const BIRNBAUM_IMPORTANCES: &str = "birnbaum_importances";

/// Key prefix of fractional trait importances.
pub const FRACTIONAL_IMPORTANCE: &str = "fractional_importance";

/// Structural importance of every component and supplier of the graph.
pub fn birnbaum_structural_importances(
    graph: &SystemGraph,
    cutsets: &MinimalCutsets,
    normalization: StructuralNormalization,
) -> BTreeMap<EntityId, f64> {
    graph
        .entity_ids()
        .map(|id| (id.clone(), normalization.apply(cutsets.occurrences(id), cutsets.len())))
        .collect()
}

/// Birnbaum importance of every component and supplier of the graph.
pub fn birnbaum_importances(
    graph: &SystemGraph,
    cutsets: &MinimalCutsets,
    probabilities: &ProbabilityTable,
) -> BTreeMap<EntityId, f64> {
    graph
        .entity_ids()
        .map(|id| {
            let importance = if cutsets.occurrences(id) == 0 {
                0.0
            } else {
                group_birnbaum_importance(cutsets, probabilities, [id])
            };
            (id.clone(), importance)
        })
        .collect()
}

/// Structural importance of a group of entities.
pub fn group_structural_importance<'a>(
    cutsets: &MinimalCutsets,
    members: impl IntoIterator<Item = &'a EntityId>,
    normalization: StructuralNormalization,
) -> f64 {
    let members: BTreeSet<&EntityId> = members.into_iter().collect();
    if members.is_empty() {
        return 0.0;
    }
    let touching = cutsets
        .iter()
        .filter(|c| c.iter().any(|id| members.contains(id)))
        .count();
    normalization.apply(touching, cutsets.len())
}

/// Birnbaum importance of a group of entities.
pub fn group_birnbaum_importance<'a>(
    cutsets: &MinimalCutsets,
    probabilities: &ProbabilityTable,
    members: impl IntoIterator<Item = &'a EntityId>,
) -> f64 {
    let members: Vec<&EntityId> = members.into_iter().collect();
    if members.is_empty() {
        return 0.0;
    }
    let failed = probabilities.with_overrides(members.iter().copied(), 1.0);
    let working = probabilities.with_overrides(members.iter().copied(), 0.0);
    aggregate_risk(cutsets, &failed) - aggregate_risk(cutsets, &working)
}

/// Fractional importance of every `(attribute, value)` trait carried by some
/// entity, keyed `fractional_importance_<attribute>_<value>`.
pub fn fractional_importance_traits(
    graph: &SystemGraph,
    cutsets: &MinimalCutsets,
    probabilities: &ProbabilityTable,
) -> BTreeMap<String, f64> {
    let mut carriers: BTreeMap<(&str, bool), BTreeSet<&EntityId>> = BTreeMap::new();
    for id in graph.entity_ids() {
        if let Some(attributes) = graph.attributes_of(id) {
            for (name, &value) in attributes {
                carriers.entry((name.as_str(), value)).or_default().insert(id);
            }
        }
    }

    let total = aggregate_risk(cutsets, probabilities);
    carriers
        .into_iter()
        .map(|((name, value), members)| {
            let fraction = if total > 0.0 {
                let touching = cutsets
                    .iter()
                    .filter(|c| c.iter().any(|id| members.contains(id)));
                aggregate_risk(touching, probabilities) / total
            } else {
                0.0
            };
            (format!("{}_{}_{}", FRACTIONAL_IMPORTANCE, name, value), fraction)
        })
        .collect()
}
