//! Exhaustive reference enumeration.
//!
//! Evaluates the indicator for every subset of the entities reachable from
//! it, smallest subsets first. A failing subset that contains no previously
//! found failing subset is minimal. Exponential; only for small graphs.

use crate::types::{Cutset, Gate, MinimalCutsets, SystemGraph};
use super::model::{FaultModel, Node};
use super::MocusError;

/// Default bound on the number of reachable entities.
pub const MAX_BRUTE_FORCE_ENTITIES: usize = 20;

/// Hard ceiling on the bound, whatever the caller configures.
pub const BRUTE_FORCE_ENTITY_CEILING: usize = 25;

/// Enumerate minimal cutsets by exhaustive search with the default bound.
pub fn brute_force_find_cutsets(graph: &SystemGraph, ignore_suppliers: bool) -> Result<MinimalCutsets, MocusError> {
    brute_force_find_cutsets_bounded(graph, ignore_suppliers, MAX_BRUTE_FORCE_ENTITIES)
}

/// Enumerate minimal cutsets by exhaustive search over at most
/// `max_entities` reachable entities.
///
/// Bounds above [`BRUTE_FORCE_ENTITY_CEILING`] are lowered to it.
pub fn brute_force_find_cutsets_bounded(
    graph: &SystemGraph,
    ignore_suppliers: bool,
    max_entities: usize,
) -> Result<MinimalCutsets, MocusError> {
    let model = FaultModel::build(graph, ignore_suppliers)?;
    if model.top_inputs.is_empty() {
        return Ok(MinimalCutsets::never());
    }

    let order = model.post_order()?;
    let count = order.len();
    let max = max_entities.min(BRUTE_FORCE_ENTITY_CEILING);
    if count > max {
        return Err(MocusError::TooManyEntities { count, max });
    }

    // Bit positions follow node index; unreachable nodes never fail.
    let mut failable = order.clone();
    failable.sort_unstable();
    let mut bit: Vec<Option<u32>> = vec![None; model.nodes.len()];
    for (position, &node) in failable.iter().enumerate() {
        bit[node] = Some(position as u32);
    }

    let mut minimal: Vec<u64> = Vec::new();
    let mut failed = vec![false; model.nodes.len()];
    for mask in masks_by_size(count) {
        if minimal.iter().any(|&m| m & mask == m) {
            continue;
        }
        if top_fails(&model, &order, &bit, mask, &mut failed) {
            minimal.push(mask);
        }
    }

    tracing::debug!(
        graph = %graph.name,
        entities = count,
        cutsets = minimal.len(),
        "brute force enumeration complete"
    );

    Ok(MinimalCutsets::absorb(minimal.into_iter().map(|mask| {
        failable
            .iter()
            .enumerate()
            .filter(|(position, _)| mask & (1u64 << position) != 0)
            .map(|(_, &node)| model.nodes[node].id().clone())
            .collect::<Cutset>()
    })))
}

/// Every `count`-bit mask, by ascending popcount and then ascending value.
///
/// Same-size masks are stepped with Gosper's hack, so nothing is collected.
fn masks_by_size(count: usize) -> impl Iterator<Item = u64> {
    let limit = 1u64 << count;
    (0..=count).flat_map(move |size| {
        let first = (1u64 << size) - 1;
        std::iter::successors(Some(first), move |&mask| {
            if mask == 0 {
                return None;
            }
            let low = mask & mask.wrapping_neg();
            let ripple = mask + low;
            let next = (((ripple ^ mask) >> 2) / low) | ripple;
            (next < limit).then_some(next)
        })
    })
}

/// Evaluate the indicator with the entities in `mask` failed.
///
/// `order` lists every reachable node after its inputs, so one pass fills
/// `failed` bottom-up.
fn top_fails(model: &FaultModel<'_>, order: &[usize], bit: &[Option<u32>], mask: u64, failed: &mut [bool]) -> bool {
    for &i in order {
        let own = bit[i].is_some_and(|b| mask & (1u64 << b) != 0);
        let value = own
            || match &model.nodes[i] {
                Node::Leaf { .. } | Node::SupplierLeaf { .. } => false,
                Node::AndGate { inputs, .. } => gate_fails(Gate::And, inputs, failed),
                Node::OrGate { inputs, .. } => gate_fails(Gate::Or, inputs, failed),
            };
        failed[i] = value;
    }
    gate_fails(model.top_gate, &model.top_inputs, failed)
}

fn gate_fails(gate: Gate, inputs: &[usize], failed: &[bool]) -> bool {
    match gate {
        Gate::And => inputs.iter().all(|&i| failed[i]),
        Gate::Or => inputs.iter().any(|&i| failed[i]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Component, Indicator, RiskRelation};

    #[test]
    fn test_bound_is_enforced() {
        let components: Vec<Component> = (0..5).map(|i| Component::new(i.to_string().as_str(), "")).collect();
        let ids: Vec<String> = (0..5).map(|i| i.to_string()).collect();
        let g = SystemGraph::new(
            "wide",
            components,
            vec![],
            vec![],
            vec![],
            Indicator::over(Gate::Or, ids.iter().map(|s| s.as_str())),
        );

        assert!(matches!(
            brute_force_find_cutsets_bounded(&g, true, 4),
            Err(MocusError::TooManyEntities { count: 5, max: 4 })
        ));
        assert_eq!(brute_force_find_cutsets_bounded(&g, true, 5).unwrap().len(), 5);
    }

    #[test]
    fn test_configured_bound_is_capped() {
        let g = SystemGraph::new(
            "wider",
            (0..30i64).map(|i| Component::new(i, "")).collect(),
            vec![],
            vec![],
            vec![],
            Indicator::over(Gate::And, 0..30i64),
        );

        assert_eq!(
            brute_force_find_cutsets_bounded(&g, true, 1_000),
            Err(MocusError::TooManyEntities { count: 30, max: BRUTE_FORCE_ENTITY_CEILING })
        );
    }

    #[test]
    fn test_masks_by_size_order() {
        let masks: Vec<u64> = masks_by_size(4).collect();

        let mut expected: Vec<u64> = (0..16).collect();
        expected.sort_by_key(|m| (m.count_ones(), *m));
        assert_eq!(masks, expected);
    }

    #[test]
    fn test_unreachable_entities_are_skipped() {
        let g = SystemGraph::new(
            "partial",
            vec![Component::new("1", ""), Component::new("2", ""), Component::new("3", "")],
            vec![],
            vec![RiskRelation::new("1", "2")],
            vec![],
            Indicator::over(Gate::And, ["2"]),
        );

        assert_eq!(
            brute_force_find_cutsets(&g, true).unwrap(),
            MinimalCutsets::from_raw([["1"], ["2"]])
        );
    }
}
