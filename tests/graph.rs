//! Graph validation, identity and offering folding tests.

mod common;

use supply_risk_kernel::{
    apply_singular_offerings, Component, EntityId, Gate, GraphError, Indicator, Offering,
    RiskRelation, Supplier, SystemGraph,
};

use common::*;

// ─────────────────────────────────────────────────────────────────────────────
// Validation
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_fixtures_are_valid() {
    for graph in [
        simple_and(),
        simple_or(),
        simple_and_suppliers(),
        canonical(),
        non_tree_simple(),
        non_tree_complex(),
        supplied_and(),
        unresolved_supply(),
        resolved_supply(),
        supply_network(),
    ] {
        assert!(graph.valid_values(), "{} should be valid", graph.name);
    }
}

#[test]
fn test_mismatched_indicator() {
    let mut graph = supply_network();
    graph.indicator = Indicator::over(Gate::And, ["10", "15", "35"]);

    assert!(matches!(graph.validate(), Err(GraphError::DanglingIndicatorInput(_))));
}

#[test]
fn test_mismatched_offerings() {
    let mut graph = supply_network();
    graph.offerings.push(Offering::new("15", "300", 0.5, 10));
    assert!(matches!(graph.validate(), Err(GraphError::DanglingOffering { .. })));

    let mut graph = supply_network();
    graph.offerings.push(Offering::new("413", "5", 0.5, 10));
    assert!(matches!(
        graph.validate(),
        Err(GraphError::DanglingOffering { supplier, .. }) if supplier.as_str() == "413"
    ));
}

#[test]
fn test_mismatched_dependencies() {
    let mut graph = supply_network();
    graph.security_dependencies.push(RiskRelation::new("100", "3"));
    assert!(matches!(graph.validate(), Err(GraphError::DanglingDependency { .. })));

    // A supplier id is not a valid dependency target.
    let mut graph = supply_network();
    graph.security_dependencies.push(RiskRelation::new("3", "23"));
    assert!(matches!(graph.validate(), Err(GraphError::DanglingDependency { .. })));
}

#[test]
fn test_overlapping_ids() {
    let graph = SystemGraph::new(
        "overlap",
        numbered_components(0..10),
        numbered_suppliers(0..15),
        vec![],
        vec![],
        Indicator::over(Gate::And, ["3"]),
    );

    assert!(matches!(graph.validate(), Err(GraphError::OverlappingId(_))));
}

#[test]
fn test_internal_duplicate() {
    let mut components = numbered_components(0..10);
    components.push(Component::new("3", "Another 3").with_risk(0.4342));
    let graph = SystemGraph::new(
        "duplicate",
        components,
        vec![],
        vec![],
        vec![],
        Indicator::over(Gate::And, ["3"]),
    );

    assert_eq!(graph.validate(), Err(GraphError::DuplicateId(EntityId::from("3"))));
}

#[test]
fn test_cycle_is_rejected() {
    let mut graph = canonical();
    graph.security_dependencies.push(RiskRelation::new("1", "8"));

    assert!(matches!(graph.validate(), Err(GraphError::Cycle(_))));
}

#[test]
fn test_probability_out_of_range() {
    let mut graph = simple_or();
    graph.suppliers.push(Supplier::new("s", "").with_risk(1.5));

    assert!(matches!(graph.validate(), Err(GraphError::InvalidProbability { .. })));
}

// ─────────────────────────────────────────────────────────────────────────────
// Identity and structure
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_hash_equal() {
    assert_eq!(supply_network().identity(), supply_network().identity());

    let mut renamed = supply_network();
    renamed.name = "renamed".to_string();
    assert_eq!(renamed.identity(), supply_network().identity());
}

#[test]
fn test_hash_not_equal() {
    let mut changed = supply_network();
    let offering = changed
        .offerings
        .iter_mut()
        .find(|o| o.supplier_id.as_str() == "15")
        .unwrap();
    offering.probability = 0.5;

    assert_ne!(changed.identity(), supply_network().identity());
    assert_eq!(changed.structure(), supply_network().structure());
}

#[test]
fn test_structure_not_equal() {
    let mut changed = supply_network();
    changed.security_dependencies.push(RiskRelation::new("15", "3"));

    assert_ne!(changed.structure(), supply_network().structure());
    assert_ne!(changed.identity(), supply_network().identity());
}

#[test]
fn test_member_order_is_irrelevant() {
    let graph = supply_network();
    let mut components = graph.components.clone();
    components.reverse();
    let mut dependencies = graph.security_dependencies.clone();
    dependencies.reverse();
    let mut offerings = graph.offerings.clone();
    offerings.reverse();

    let reordered = SystemGraph::new(
        graph.name.clone(),
        components,
        graph.suppliers.clone(),
        dependencies,
        offerings,
        graph.indicator.clone(),
    );

    assert_eq!(reordered, graph);
    assert_eq!(reordered.identity(), graph.identity());
}

#[test]
fn test_json_round_trip_keeps_identity() {
    let graph = supply_network();
    let json = serde_json::to_string(&graph).unwrap();
    let parsed: SystemGraph = serde_json::from_str(&json).unwrap();

    assert_eq!(parsed, graph);
    assert_eq!(parsed.identity(), graph.identity());
}

// ─────────────────────────────────────────────────────────────────────────────
// Offering folding
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_singular_offerings_become_edges() {
    let graph = simple_and_suppliers();
    let folded = apply_singular_offerings(&graph);

    assert_eq!(
        folded.security_dependencies.len(),
        graph.security_dependencies.len() + 3
    );
    assert!(folded.security_dependencies.contains(&RiskRelation::new("s1", "one")));

    let one = folded.component(&EntityId::from("one")).unwrap();
    assert_eq!(one.risk, 0.25);
    assert_eq!(folded.offerings, graph.offerings);
    assert!(folded.valid_values());
}

#[test]
fn test_shared_supplier_folds_per_component() {
    let graph = supply_network();
    let folded = apply_singular_offerings(&graph);

    for (supplier, component) in [("15", "5"), ("16", "3"), ("17", "2"), ("18", "1"), ("18", "4")] {
        assert!(folded
            .security_dependencies
            .contains(&RiskRelation::new(supplier, component)));
    }
    let five = folded.component(&EntityId::from("5")).unwrap();
    assert_eq!(five.risk, 0.49);
}

#[test]
fn test_folding_leaves_input_untouched() {
    let graph = simple_and_suppliers();
    let before = graph.clone();
    let _ = apply_singular_offerings(&graph);

    assert_eq!(graph, before);
}
