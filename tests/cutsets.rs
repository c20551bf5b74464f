//! Cutset enumeration tests.
//!
//! Every fixture is enumerated by MOCUS and by exhaustive search; both must
//! produce the same minimal cutsets.

mod common;

use supply_risk_kernel::{
    brute_force_find_cutsets, brute_force_find_cutsets_bounded, minimal_cutsets, Gate,
    Indicator, MinimalCutsets, MocusError, SystemGraph,
};

use common::*;

fn assert_both(graph: &SystemGraph, ignore_suppliers: bool, expected: &MinimalCutsets) {
    let fast = minimal_cutsets(graph, ignore_suppliers).unwrap();
    let exhaustive = brute_force_find_cutsets(graph, ignore_suppliers).unwrap();

    assert_eq!(&fast, expected, "MOCUS on {}", graph.name);
    assert_eq!(&exhaustive, expected, "brute force on {}", graph.name);
    assert!(fast.is_minimal());
}

#[test]
fn test_simple_and() {
    assert_both(&simple_and(), true, &cutsets(&[&["1", "2"], &["3"]]));
}

#[test]
fn test_simple_or() {
    assert_both(&simple_or(), true, &cutsets(&[&["one"], &["two"], &["three"]]));
}

#[test]
fn test_canonical_tree() {
    let expected = canonical_cutsets();
    assert_eq!(expected.len(), 13);
    assert_both(&canonical(), true, &expected);
}

#[test]
fn test_non_tree_simple() {
    assert_both(&non_tree_simple(), true, &cutsets(&[&["3"], &["1", "2"], &["4"]]));
}

#[test]
fn test_non_tree_complex() {
    let expected = non_tree_complex_cutsets();
    assert_eq!(expected.len(), 11);
    assert_both(&non_tree_complex(), true, &expected);
}

#[test]
fn test_suppliers_as_inputs() {
    let expected = cutsets(&[
        &["3"],
        &["1", "2", "13"],
        &["11", "2", "13"],
        &["1", "12", "13"],
        &["11", "12", "13"],
    ]);
    assert_both(&supplied_and(), false, &expected);
}

#[test]
fn test_suppliers_ignored() {
    assert_both(&supplied_and(), true, &cutsets(&[&["1", "2"], &["3"]]));
}

#[test]
fn test_unresolved_supply_fails() {
    let graph = unresolved_supply();

    assert!(matches!(
        minimal_cutsets(&graph, false),
        Err(MocusError::UnresolvedSupply(id)) if id.as_str() == "1"
    ));
    assert!(minimal_cutsets(&graph, true).is_ok());
}

#[test]
fn test_resolved_supply_succeeds() {
    let graph = resolved_supply();
    let fast = minimal_cutsets(&graph, false).unwrap();
    let exhaustive = brute_force_find_cutsets(&graph, false).unwrap();

    assert_eq!(fast, exhaustive);
    assert!(fast.contains(&["3"].into_iter().map(Into::into).collect()));
}

#[test]
fn test_empty_indicator() {
    let mut graph = simple_and();
    graph.indicator = Indicator::empty(Gate::And);

    assert!(minimal_cutsets(&graph, true).unwrap().is_empty());
    assert!(brute_force_find_cutsets(&graph, true).unwrap().is_empty());
}

#[test]
fn test_brute_force_bound() {
    let err = brute_force_find_cutsets_bounded(&canonical(), true, 4).unwrap_err();
    assert_eq!(err, MocusError::TooManyEntities { count: 9, max: 4 });
}

#[test]
fn test_enumeration_is_deterministic() {
    let first = minimal_cutsets(&non_tree_complex(), true).unwrap();
    for _ in 0..20 {
        assert_eq!(minimal_cutsets(&non_tree_complex(), true).unwrap(), first);
    }
}
