//! The system graph aggregate, its invariants and its identity projections.
//!
//! ## Identity vs. Equality
//!
//! Three notions of "the same graph" are kept apart:
//!
//! - `PartialEq`: full value equality, including display names.
//! - [`SystemGraph::identity`]: fingerprint over everything that can change a
//!   computed metric (ids, risks, gates, attributes, edges, offerings). Display
//!   names are excluded. This is the only value used to key cached results.
//! - [`SystemGraph::structure`]: pure topology, ignoring every numeric
//!   attribute. Two graphs with equal structure have the same Boolean shape and
//!   therefore the same minimal cutsets.
//!
//! Member collections are held in canonical order so that equality does not
//! depend on the order in which a payload listed them.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::fmt;

use crate::canonical::{canonical_hash, quantize_probability};
use super::entity::{Component, EntityId, Gate, Supplier};
use super::relation::{Indicator, Offering, RiskRelation};

/// Error describing why a graph violates its invariants.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GraphError {
    /// Two components or two suppliers share an id.
    #[error("Duplicate id: {0}")]
    DuplicateId(EntityId),
    /// An id is declared both as a component and as a supplier.
    #[error("Id declared as both component and supplier: {0}")]
    OverlappingId(EntityId),
    /// A dependency edge references an undeclared entity or targets a supplier.
    #[error("Dangling dependency: {from} -> {to}")]
    DanglingDependency {
        /// Edge source.
        from: EntityId,
        /// Edge target.
        to: EntityId,
    },
    /// An offering references an undeclared supplier or component.
    #[error("Dangling offering: supplier {supplier} -> component {component}")]
    DanglingOffering {
        /// Offering supplier.
        supplier: EntityId,
        /// Offering component.
        component: EntityId,
    },
    /// The indicator references something that is not a declared component.
    #[error("Indicator input is not a component: {0}")]
    DanglingIndicatorInput(EntityId),
    /// A risk or offering probability lies outside [0, 1].
    #[error("Probability out of range for {id}: {value}")]
    InvalidProbability {
        /// Entity (or offered component) carrying the value.
        id: EntityId,
        /// The offending value.
        value: f64,
    },
    /// The dependency edges contain a cycle through this component.
    #[error("Dependency cycle through: {0}")]
    Cycle(EntityId),
}

/// Fingerprint of everything in a graph that can change a computed metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct GraphIdentity(u64);

impl GraphIdentity {
    /// Raw fingerprint value.
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for GraphIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

/// Topology of a graph with every numeric attribute stripped.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct GraphStructure {
    /// Component ids with their gates.
    pub components: BTreeSet<(EntityId, Gate)>,
    /// Supplier ids.
    pub suppliers: BTreeSet<EntityId>,
    /// Dependency edges.
    pub dependencies: BTreeSet<RiskRelation>,
    /// (supplier, component) pairs with an offering.
    pub offerings: BTreeSet<(EntityId, EntityId)>,
    /// Indicator gate.
    pub indicator_gate: Gate,
    /// Indicator inputs.
    pub indicator_inputs: BTreeSet<EntityId>,
}

/// Canonical projection hashed into a [`GraphIdentity`].
#[derive(Serialize)]
struct IdentityProjection<'a> {
    components: Vec<(&'a EntityId, i64, Gate, &'a BTreeMap<String, bool>)>,
    suppliers: Vec<(&'a EntityId, i64, &'a BTreeMap<String, bool>)>,
    dependencies: &'a [RiskRelation],
    offerings: Vec<(&'a EntityId, &'a EntityId, i64, u32)>,
    indicator: (Gate, Vec<&'a EntityId>),
}

/// Payload shape of a graph before canonical ordering is applied.
#[derive(Deserialize)]
struct SystemGraphInput {
    #[serde(default)]
    name: String,
    #[serde(default)]
    components: Vec<Component>,
    #[serde(default)]
    suppliers: Vec<Supplier>,
    #[serde(default)]
    security_dependencies: Vec<RiskRelation>,
    #[serde(default)]
    offerings: Vec<Offering>,
    indicator: Indicator,
}

impl From<SystemGraphInput> for SystemGraph {
    fn from(input: SystemGraphInput) -> Self {
        SystemGraph::new(
            input.name,
            input.components,
            input.suppliers,
            input.security_dependencies,
            input.offerings,
            input.indicator,
        )
    }
}

/// A supply system: components, suppliers, dependency edges, offerings and
/// the indicator they feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "SystemGraphInput")]
pub struct SystemGraph {
    /// Display name.
    pub name: String,
    /// Components ordered by (id, risk).
    pub components: Vec<Component>,
    /// Suppliers ordered by (id, risk).
    pub suppliers: Vec<Supplier>,
    /// Dependency edges ordered by (source, target).
    pub security_dependencies: Vec<RiskRelation>,
    /// Offerings in canonical order.
    pub offerings: Vec<Offering>,
    /// Root gate.
    pub indicator: Indicator,
}

impl SystemGraph {
    /// Create a graph. Members are put into canonical order; duplicates are
    /// kept so that [`SystemGraph::validate`] can report them.
    pub fn new(
        name: impl Into<String>,
        mut components: Vec<Component>,
        mut suppliers: Vec<Supplier>,
        mut security_dependencies: Vec<RiskRelation>,
        mut offerings: Vec<Offering>,
        mut indicator: Indicator,
    ) -> Self {
        components.sort_by(|a, b| a.id.cmp(&b.id).then_with(|| a.risk.total_cmp(&b.risk)));
        suppliers.sort_by(|a, b| a.id.cmp(&b.id).then_with(|| a.risk.total_cmp(&b.risk)));
        security_dependencies.sort();
        security_dependencies.dedup();
        offerings.sort_by(Offering::canonical_cmp);
        indicator.relations.sort();
        indicator.relations.dedup();

        Self {
            name: name.into(),
            components,
            suppliers,
            security_dependencies,
            offerings,
            indicator,
        }
    }

    /// A graph with no members and an empty indicator.
    pub fn empty(name: impl Into<String>) -> Self {
        Self::new(name, Vec::new(), Vec::new(), Vec::new(), Vec::new(), Indicator::empty(Gate::And))
    }

    /// Look up a component.
    pub fn component(&self, id: &EntityId) -> Option<&Component> {
        self.components.iter().find(|c| &c.id == id)
    }

    /// Look up a supplier.
    pub fn supplier(&self, id: &EntityId) -> Option<&Supplier> {
        self.suppliers.iter().find(|s| &s.id == id)
    }

    /// All component and supplier ids, components first.
    pub fn entity_ids(&self) -> impl Iterator<Item = &EntityId> {
        self.components
            .iter()
            .map(|c| &c.id)
            .chain(self.suppliers.iter().map(|s| &s.id))
    }

    /// Attributes of a component or supplier.
    pub fn attributes_of(&self, id: &EntityId) -> Option<&BTreeMap<String, bool>> {
        self.component(id)
            .map(|c| &c.attributes)
            .or_else(|| self.supplier(id).map(|s| &s.attributes))
    }

    /// Offerings naming the given component.
    pub fn offerings_for<'a>(&'a self, component: &'a EntityId) -> impl Iterator<Item = &'a Offering> {
        self.offerings.iter().filter(move |o| &o.component_id == component)
    }

    /// Sources of the dependency edges into the given entity.
    pub fn dependencies_into<'a>(&'a self, target: &'a EntityId) -> impl Iterator<Item = &'a EntityId> {
        self.security_dependencies
            .iter()
            .filter(move |r| &r.target == target)
            .map(|r| &r.source)
    }

    /// Check the graph invariants.
    pub fn validate(&self) -> Result<(), GraphError> {
        let mut component_ids: HashSet<&EntityId> = HashSet::new();
        for c in &self.components {
            if !component_ids.insert(&c.id) {
                return Err(GraphError::DuplicateId(c.id.clone()));
            }
        }

        let mut supplier_ids: HashSet<&EntityId> = HashSet::new();
        for s in &self.suppliers {
            if !supplier_ids.insert(&s.id) {
                return Err(GraphError::DuplicateId(s.id.clone()));
            }
            if component_ids.contains(&s.id) {
                return Err(GraphError::OverlappingId(s.id.clone()));
            }
        }

        let risks = self
            .components
            .iter()
            .map(|c| (&c.id, c.risk))
            .chain(self.suppliers.iter().map(|s| (&s.id, s.risk)))
            .chain(self.offerings.iter().map(|o| (&o.component_id, o.probability)));
        for (id, value) in risks {
            if !(0.0..=1.0).contains(&value) {
                return Err(GraphError::InvalidProbability { id: id.clone(), value });
            }
        }

        for r in &self.security_dependencies {
            let known_source = component_ids.contains(&r.source) || supplier_ids.contains(&r.source);
            if !known_source || !component_ids.contains(&r.target) {
                return Err(GraphError::DanglingDependency {
                    from: r.source.clone(),
                    to: r.target.clone(),
                });
            }
        }

        for o in &self.offerings {
            if !supplier_ids.contains(&o.supplier_id) || !component_ids.contains(&o.component_id) {
                return Err(GraphError::DanglingOffering {
                    supplier: o.supplier_id.clone(),
                    component: o.component_id.clone(),
                });
            }
        }

        for input in self.indicator.inputs() {
            if !component_ids.contains(input) {
                return Err(GraphError::DanglingIndicatorInput(input.clone()));
            }
        }

        self.check_acyclic()
    }

    /// Whether the graph satisfies every invariant.
    pub fn valid_values(&self) -> bool {
        self.validate().is_ok()
    }

    fn check_acyclic(&self) -> Result<(), GraphError> {
        #[derive(Clone, Copy, PartialEq)]
        enum Mark {
            Open,
            Done,
        }

        let mut inputs: HashMap<&EntityId, Vec<&EntityId>> = HashMap::new();
        for r in &self.security_dependencies {
            inputs.entry(&r.target).or_default().push(&r.source);
        }

        let mut marks: HashMap<&EntityId, Mark> = HashMap::new();
        for &root in inputs.keys() {
            if marks.contains_key(root) {
                continue;
            }
            // Explicit stack of (node, next input index).
            let mut stack: Vec<(&EntityId, usize)> = vec![(root, 0)];
            marks.insert(root, Mark::Open);

            while let Some((node, idx)) = stack.pop() {
                let next = inputs.get(node).and_then(|v| v.get(idx)).copied();
                match next {
                    Some(input) => {
                        stack.push((node, idx + 1));
                        match marks.get(input) {
                            Some(Mark::Open) => return Err(GraphError::Cycle(input.clone())),
                            Some(Mark::Done) => {}
                            None => {
                                marks.insert(input, Mark::Open);
                                stack.push((input, 0));
                            }
                        }
                    }
                    None => {
                        marks.insert(node, Mark::Done);
                    }
                }
            }
        }
        Ok(())
    }

    /// Fingerprint used to key cached results.
    pub fn identity(&self) -> GraphIdentity {
        let projection = IdentityProjection {
            components: self
                .components
                .iter()
                .map(|c| (&c.id, quantize_probability(c.risk), c.gate, &c.attributes))
                .collect(),
            suppliers: self
                .suppliers
                .iter()
                .map(|s| (&s.id, quantize_probability(s.risk), &s.attributes))
                .collect(),
            dependencies: &self.security_dependencies,
            offerings: self
                .offerings
                .iter()
                .map(|o| (&o.supplier_id, &o.component_id, quantize_probability(o.probability), o.lead_time))
                .collect(),
            indicator: (self.indicator.gate, self.indicator.inputs().collect()),
        };
        GraphIdentity(canonical_hash(&projection))
    }

    /// Topology of the graph.
    pub fn structure(&self) -> GraphStructure {
        GraphStructure {
            components: self.components.iter().map(|c| (c.id.clone(), c.gate)).collect(),
            suppliers: self.suppliers.iter().map(|s| s.id.clone()).collect(),
            dependencies: self.security_dependencies.iter().cloned().collect(),
            offerings: self
                .offerings
                .iter()
                .map(|o| (o.supplier_id.clone(), o.component_id.clone()))
                .collect(),
            indicator_gate: self.indicator.gate,
            indicator_inputs: self.indicator.inputs().cloned().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numbered_graph(offering_probability: f64) -> SystemGraph {
        SystemGraph::new(
            "test",
            (0..10).map(|i| Component::new(i.to_string().as_str(), "")).collect(),
            (10..20).map(|i| Supplier::new(i.to_string().as_str(), "")).collect(),
            vec![
                RiskRelation::new("1", "3"),
                RiskRelation::new("2", "3"),
                RiskRelation::new("5", "6"),
            ],
            vec![
                Offering::new("15", "5", offering_probability, 30),
                Offering::new("16", "5", 0.5, 30),
                Offering::new("17", "3", 0.5, 30),
            ],
            Indicator::over(Gate::And, ["1", "2", "3"]),
        )
    }

    #[test]
    fn test_member_order_does_not_matter() {
        let a = SystemGraph::new(
            "g",
            vec![Component::new("a", ""), Component::new("b", "")],
            vec![],
            vec![RiskRelation::new("a", "b")],
            vec![],
            Indicator::over(Gate::Or, ["b"]),
        );
        let b = SystemGraph::new(
            "g",
            vec![Component::new("b", ""), Component::new("a", "")],
            vec![],
            vec![RiskRelation::new("a", "b")],
            vec![],
            Indicator::over(Gate::Or, ["b"]),
        );

        assert_eq!(a, b);
        assert_eq!(a.identity(), b.identity());
    }

    #[test]
    fn test_identity_ignores_display_names() {
        let a = numbered_graph(0.5);
        let mut b = numbered_graph(0.5);
        b.name = "renamed".to_string();
        b.components[0].name = "zero".to_string();

        assert_ne!(a, b);
        assert_eq!(a.identity(), b.identity());
    }

    #[test]
    fn test_identity_tracks_risk() {
        let a = numbered_graph(0.5);
        let mut b = numbered_graph(0.5);
        b.components[3].risk = 0.3;

        assert_ne!(a.identity(), b.identity());
        assert_eq!(a.structure(), b.structure());
    }

    #[test]
    fn test_cycle_is_invalid() {
        let g = SystemGraph::new(
            "cycle",
            vec![Component::new("1", ""), Component::new("2", "")],
            vec![],
            vec![RiskRelation::new("1", "2"), RiskRelation::new("2", "1")],
            vec![],
            Indicator::over(Gate::And, ["1"]),
        );

        assert!(matches!(g.validate(), Err(GraphError::Cycle(_))));
    }

    #[test]
    fn test_probability_out_of_range() {
        let g = SystemGraph::new(
            "bad",
            vec![Component::new("1", "").with_risk(1.5)],
            vec![],
            vec![],
            vec![],
            Indicator::over(Gate::And, ["1"]),
        );

        assert!(matches!(g.validate(), Err(GraphError::InvalidProbability { .. })));
    }

    #[test]
    fn test_dependency_into_supplier_is_dangling() {
        let g = SystemGraph::new(
            "bad",
            vec![Component::new("1", "")],
            vec![Supplier::new("s", "")],
            vec![RiskRelation::new("1", "s")],
            vec![],
            Indicator::over(Gate::And, ["1"]),
        );

        assert!(matches!(g.validate(), Err(GraphError::DanglingDependency { .. })));
    }

    #[test]
    fn test_deserialize_payload() {
        let json = r#"{
            "name": "payload",
            "components": [
                {"id": 1, "name": "one", "risk": 0.1, "gate": "or"},
                {"id": 2, "name": "two"}
            ],
            "suppliers": [{"id": 11, "name": "eleven", "attributes": {"domestic": true}}],
            "security_dependencies": [{"source": 2, "target": 1}],
            "offerings": [{"supplier_id": 11, "component_id": 2, "probability": 0.3, "lead_time": 14}],
            "indicator": {"gate": "and", "relations": [{"source": 1, "target": -1}]}
        }"#;

        let g: SystemGraph = serde_json::from_str(json).unwrap();
        assert!(g.valid_values());
        assert_eq!(g.components[0].gate, Gate::Or);
        assert_eq!(g.supplier(&EntityId::from("11")).unwrap().attributes["domestic"], true);
        assert_eq!(g.dependencies_into(&EntityId::from("1")).count(), 1);
    }
}
