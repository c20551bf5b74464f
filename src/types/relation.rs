//! Relation types: dependency edges, offerings and the indicator.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use super::entity::{EntityId, Gate};

/// Target used by indicator relations to mark a root input.
pub const INDICATOR_TARGET: &str = "-1";

/// Directed failure-propagation edge from `source` into `target`.
///
/// Implements `Ord` for canonical ordering: (source, target).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RiskRelation {
    /// Entity whose failure propagates.
    pub source: EntityId,
    /// Component receiving the failure.
    pub target: EntityId,
}

impl RiskRelation {
    /// Create a new relation.
    pub fn new(source: impl Into<EntityId>, target: impl Into<EntityId>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
        }
    }

    /// Create a relation feeding the indicator.
    pub fn to_indicator(source: impl Into<EntityId>) -> Self {
        Self::new(source, INDICATOR_TARGET)
    }
}

/// A supplier's contract to fulfil a component's need.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Offering {
    /// Supplying entity.
    pub supplier_id: EntityId,
    /// Component being supplied.
    pub component_id: EntityId,
    /// Failure probability of the supply.
    pub probability: f64,
    /// Lead time in days.
    #[serde(default)]
    pub lead_time: u32,
}

impl Offering {
    /// Create a new offering.
    pub fn new(
        supplier_id: impl Into<EntityId>,
        component_id: impl Into<EntityId>,
        probability: f64,
        lead_time: u32,
    ) -> Self {
        Self {
            supplier_id: supplier_id.into(),
            component_id: component_id.into(),
            probability,
            lead_time,
        }
    }

    /// Canonical ordering: supplier, component, probability, lead time.
    pub(crate) fn canonical_cmp(&self, other: &Self) -> Ordering {
        self.supplier_id
            .cmp(&other.supplier_id)
            .then_with(|| self.component_id.cmp(&other.component_id))
            .then_with(|| self.probability.total_cmp(&other.probability))
            .then_with(|| self.lead_time.cmp(&other.lead_time))
    }
}

/// Root gate of the system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Indicator {
    /// How the indicator inputs combine.
    #[serde(default, alias = "logic_function")]
    pub gate: Gate,
    /// Relations whose sources feed the indicator.
    #[serde(default)]
    pub relations: Vec<RiskRelation>,
}

impl Indicator {
    /// Create an indicator from explicit relations.
    pub fn new(gate: Gate, relations: Vec<RiskRelation>) -> Self {
        let mut indicator = Self { gate, relations };
        indicator.relations.sort();
        indicator
    }

    /// Create an indicator over the given inputs.
    pub fn over<I, T>(gate: Gate, inputs: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<EntityId>,
    {
        Self::new(gate, inputs.into_iter().map(RiskRelation::to_indicator).collect())
    }

    /// An indicator with no inputs; it never fails.
    pub fn empty(gate: Gate) -> Self {
        Self::new(gate, Vec::new())
    }

    /// Sources of the indicator relations.
    pub fn inputs(&self) -> impl Iterator<Item = &EntityId> {
        self.relations.iter().map(|r| &r.source)
    }

    /// Check if the indicator has no inputs.
    pub fn is_empty(&self) -> bool {
        self.relations.is_empty()
    }
}
