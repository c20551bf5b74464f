//! Shared graph fixtures for the integration suites.

#![allow(dead_code)]

use supply_risk_kernel::{
    Component, Gate, Indicator, MinimalCutsets, Offering, RiskRelation, Supplier, SystemGraph,
};

// ─────────────────────────────────────────────────────────────────────────────
// Builders
// ─────────────────────────────────────────────────────────────────────────────

pub fn components(ids: &[&str]) -> Vec<Component> {
    ids.iter().map(|&id| Component::new(id, format!("Component {}", id))).collect()
}

pub fn numbered_components(range: std::ops::Range<u32>) -> Vec<Component> {
    range.map(|i| Component::new(i.to_string(), format!("Component {}", i))).collect()
}

pub fn numbered_suppliers(range: std::ops::Range<u32>) -> Vec<Supplier> {
    range.map(|i| Supplier::new(i.to_string(), format!("Supplier {}", i))).collect()
}

pub fn deps(pairs: &[(&str, &str)]) -> Vec<RiskRelation> {
    pairs.iter().map(|&(source, target)| RiskRelation::new(source, target)).collect()
}

pub fn offerings(pairs: &[(&str, &str)], probability: f64) -> Vec<Offering> {
    pairs
        .iter()
        .map(|&(supplier, component)| Offering::new(supplier, component, probability, 10))
        .collect()
}

pub fn cutsets(sets: &[&[&str]]) -> MinimalCutsets {
    MinimalCutsets::from_raw(sets.iter().map(|set| set.iter().copied()))
}

fn with_gates(mut components: Vec<Component>, gates: &[(&str, Gate)]) -> Vec<Component> {
    for component in &mut components {
        if let Some(&(_, gate)) = gates.iter().find(|(id, _)| component.id.as_str() == *id) {
            component.gate = gate;
        }
    }
    components
}

// ─────────────────────────────────────────────────────────────────────────────
// Fixtures
// ─────────────────────────────────────────────────────────────────────────────

/// Component 3 needs both 1 and 2.
pub fn simple_and() -> SystemGraph {
    SystemGraph::new(
        "simple_and",
        components(&["1", "2", "3"]),
        vec![],
        deps(&[("1", "3"), ("2", "3")]),
        vec![],
        Indicator::over(Gate::And, ["3"]),
    )
}

/// Any of three components brings the system down.
pub fn simple_or() -> SystemGraph {
    SystemGraph::new(
        "simple_or",
        components(&["one", "two", "three"]),
        vec![],
        vec![],
        vec![],
        Indicator::over(Gate::Or, ["one", "two", "three"]),
    )
}

/// `simple_and` with one supplier per component and a singular offering each.
pub fn simple_and_suppliers() -> SystemGraph {
    SystemGraph::new(
        "simple_and_suppliers",
        components(&["one", "two", "three"]),
        vec![
            Supplier::new("s1", "Supplier 1"),
            Supplier::new("s2", "Supplier 2"),
            Supplier::new("s3", "Supplier 3"),
        ],
        deps(&[("one", "three"), ("two", "three")]),
        offerings(&[("s1", "one"), ("s2", "two"), ("s3", "three")], 0.25),
        Indicator::over(Gate::And, ["three"]),
    )
}

/// Nine-component tree with thirteen minimal cutsets.
///
/// ```text
///            1 (and)
///          /        \
///      2 (or)      5 (or)
///     /     \      /    \
///  3 (and)   4    6      7
///   /   \
///  8     9
/// ```
pub fn canonical() -> SystemGraph {
    SystemGraph::new(
        "canonical",
        with_gates(
            numbered_components(1..10),
            &[("1", Gate::And), ("2", Gate::Or), ("3", Gate::And), ("5", Gate::Or)],
        ),
        vec![],
        deps(&[
            ("3", "2"), ("4", "2"), ("8", "3"), ("9", "3"),
            ("2", "1"), ("5", "1"), ("6", "5"), ("7", "5"),
        ]),
        vec![],
        Indicator::over(Gate::And, ["1"]),
    )
}

pub fn canonical_cutsets() -> MinimalCutsets {
    cutsets(&[
        &["1"],
        &["2", "5"], &["2", "6"], &["2", "7"],
        &["3", "5"], &["3", "6"], &["3", "7"],
        &["4", "5"], &["4", "6"], &["4", "7"],
        &["8", "9", "5"], &["8", "9", "6"], &["8", "9", "7"],
    ])
}

/// Component 3 feeds both the indicator and component 4.
pub fn non_tree_simple() -> SystemGraph {
    SystemGraph::new(
        "non_tree_simple",
        with_gates(components(&["1", "2", "3", "4"]), &[("3", Gate::And), ("4", Gate::Or)]),
        vec![],
        deps(&[("1", "3"), ("2", "3"), ("3", "4")]),
        vec![],
        Indicator::over(Gate::Or, ["3", "4"]),
    )
}

/// Ten components with shared sub-trees.
pub fn non_tree_complex() -> SystemGraph {
    SystemGraph::new(
        "non_tree_complex",
        with_gates(
            numbered_components(1..11),
            &[
                ("1", Gate::And), ("2", Gate::And), ("3", Gate::And),
                ("4", Gate::Or), ("5", Gate::Or), ("6", Gate::Or), ("7", Gate::Or),
                ("8", Gate::Or), ("9", Gate::Or), ("10", Gate::Or),
            ],
        ),
        vec![],
        deps(&[
            ("10", "9"), ("10", "8"), ("8", "4"), ("8", "6"), ("9", "7"), ("9", "5"),
            ("4", "2"), ("6", "2"), ("7", "3"), ("5", "3"), ("2", "1"), ("3", "1"),
        ]),
        vec![],
        Indicator::over(Gate::And, ["1"]),
    )
}

pub fn non_tree_complex_cutsets() -> MinimalCutsets {
    cutsets(&[
        &["1"], &["2", "3"], &["4", "6", "7", "5"], &["8", "9"], &["10"],
        &["8", "3"], &["9", "2"], &["4", "6", "3"], &["4", "6", "9"],
        &["7", "5", "8"], &["7", "5", "2"],
    ])
}

/// Components 1 and 2 feed 3; each component has exactly one supplier.
pub fn supplied_and() -> SystemGraph {
    SystemGraph::new(
        "supplied_and",
        components(&["1", "2", "3"]),
        numbered_suppliers(11..14),
        deps(&[("1", "3"), ("2", "3")]),
        offerings(&[("11", "1"), ("12", "2"), ("13", "3")], 0.3),
        Indicator::over(Gate::And, ["3"]),
    )
}

/// Components 1 and 2 feed the indicator directly without any supply.
pub fn unresolved_supply() -> SystemGraph {
    SystemGraph::new(
        "unresolved_supply",
        numbered_components(0..10),
        numbered_suppliers(10..20),
        deps(&[("1", "3"), ("2", "3"), ("5", "6")]),
        offerings(&[("15", "5"), ("16", "5"), ("17", "3")], 0.3),
        Indicator::over(Gate::And, ["1", "2", "3"]),
    )
}

/// Every indicator input is covered by dependencies.
pub fn resolved_supply() -> SystemGraph {
    SystemGraph::new(
        "resolved_supply",
        numbered_components(0..10),
        numbered_suppliers(10..20),
        deps(&[("1", "3"), ("2", "3"), ("5", "3")]),
        offerings(&[("15", "5"), ("16", "3"), ("17", "2")], 0.3),
        Indicator::over(Gate::And, ["3"]),
    )
}

/// Ten components and fifteen suppliers with shared supply; valid.
pub fn supply_network() -> SystemGraph {
    SystemGraph::new(
        "supply_network",
        numbered_components(0..10),
        numbered_suppliers(10..25),
        deps(&[("1", "3"), ("2", "3"), ("4", "5"), ("5", "3")]),
        offerings(&[("15", "5"), ("16", "3"), ("17", "2"), ("18", "1"), ("18", "4")], 0.49),
        Indicator::over(Gate::And, ["3"]),
    )
}
