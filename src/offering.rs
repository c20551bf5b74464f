//! Folding of singular offerings into the dependency structure.
//!
//! A component with exactly one offering has no alternative supplier: the
//! supplier is a single point of failure for it. Folding turns that offering
//! into an ordinary dependency edge `supplier -> component` and gives the
//! component the offered probability, so cutset enumeration with suppliers
//! ignored still sees the supplier.

use std::collections::BTreeMap;

use crate::types::{EntityId, Offering, RiskRelation, SystemGraph};

/// Return a new graph with every singular offering folded in.
///
/// The input graph is left untouched. Offerings are kept on the result.
pub fn apply_singular_offerings(graph: &SystemGraph) -> SystemGraph {
    let mut by_component: BTreeMap<&EntityId, Vec<&Offering>> = BTreeMap::new();
    for offering in &graph.offerings {
        by_component.entry(&offering.component_id).or_default().push(offering);
    }

    let singular: BTreeMap<&EntityId, &Offering> = by_component
        .into_iter()
        .filter_map(|(component, offerings)| match offerings.as_slice() {
            [only] => Some((component, *only)),
            _ => None,
        })
        .collect();

    let components = graph
        .components
        .iter()
        .map(|c| match singular.get(&c.id) {
            Some(offering) => c.clone().with_risk(offering.probability),
            None => c.clone(),
        })
        .collect();

    let mut dependencies = graph.security_dependencies.clone();
    let mut folded = 0usize;
    for offering in singular.values() {
        let edge = RiskRelation::new(offering.supplier_id.clone(), offering.component_id.clone());
        if !dependencies.contains(&edge) {
            dependencies.push(edge);
            folded += 1;
        }
    }

    tracing::debug!(graph = %graph.name, folded, "singular offerings folded");

    SystemGraph::new(
        graph.name.clone(),
        components,
        graph.suppliers.clone(),
        dependencies,
        graph.offerings.clone(),
        graph.indicator.clone(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Component, Gate, Indicator, Supplier};

    #[test]
    fn test_competing_offerings_are_not_folded() {
        let g = SystemGraph::new(
            "competing",
            vec![Component::new("5", "")],
            vec![Supplier::new("15", ""), Supplier::new("16", "")],
            vec![],
            vec![Offering::new("15", "5", 0.5, 30), Offering::new("16", "5", 0.4, 30)],
            Indicator::over(Gate::And, ["5"]),
        );

        let folded = apply_singular_offerings(&g);
        assert_eq!(folded, g);
    }

    #[test]
    fn test_existing_edge_is_not_duplicated() {
        let g = SystemGraph::new(
            "pre-wired",
            vec![Component::new("1", "")],
            vec![Supplier::new("s", "")],
            vec![RiskRelation::new("s", "1")],
            vec![Offering::new("s", "1", 0.1, 30)],
            Indicator::over(Gate::And, ["1"]),
        );

        let folded = apply_singular_offerings(&g);
        assert_eq!(folded.security_dependencies.len(), 1);
        assert_eq!(folded.components[0].risk, 0.1);
    }
}
