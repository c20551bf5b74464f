//! Gate model derived from a system graph.
//!
//! Every component and supplier becomes one tagged node. A component fails
//! when its own basic event occurs or when its gate over its inputs fails;
//! inputs are the sources of dependency edges into it and, when suppliers are
//! not ignored, the suppliers holding an offering for it.

use std::collections::{BTreeSet, HashMap};

use crate::types::{EntityId, Gate, SystemGraph};
use super::MocusError;

/// One node of the gate model.
#[derive(Debug, Clone)]
pub(crate) enum Node<'g> {
    /// Component failing when all inputs fail.
    AndGate { id: &'g EntityId, inputs: Vec<usize> },
    /// Component failing when any input fails.
    OrGate { id: &'g EntityId, inputs: Vec<usize> },
    /// Component without inputs.
    Leaf { id: &'g EntityId },
    /// Supplier.
    SupplierLeaf { id: &'g EntityId },
}

impl<'g> Node<'g> {
    pub(crate) fn id(&self) -> &'g EntityId {
        match self {
            Self::AndGate { id, .. }
            | Self::OrGate { id, .. }
            | Self::Leaf { id }
            | Self::SupplierLeaf { id } => id,
        }
    }

    pub(crate) fn inputs(&self) -> &[usize] {
        match self {
            Self::AndGate { inputs, .. } | Self::OrGate { inputs, .. } => inputs,
            Self::Leaf { .. } | Self::SupplierLeaf { .. } => &[],
        }
    }
}

/// Indexed gate model with the indicator as its top event.
#[derive(Debug, Clone)]
pub(crate) struct FaultModel<'g> {
    pub(crate) nodes: Vec<Node<'g>>,
    pub(crate) top_gate: Gate,
    pub(crate) top_inputs: Vec<usize>,
}

impl<'g> FaultModel<'g> {
    /// Build the model.
    ///
    /// With `ignore_suppliers == false`, a component feeding the indicator
    /// directly that has no dependency edges of its own must be covered by at
    /// least one offering.
    pub(crate) fn build(graph: &'g SystemGraph, ignore_suppliers: bool) -> Result<Self, MocusError> {
        let total = graph.components.len() + graph.suppliers.len();
        let mut index: HashMap<&'g EntityId, usize> = HashMap::with_capacity(total);
        for (i, id) in graph.entity_ids().enumerate() {
            index.entry(id).or_insert(i);
        }
        let lookup = |id: &EntityId| -> Result<usize, MocusError> {
            index
                .get(id)
                .copied()
                .ok_or_else(|| MocusError::UnknownEntity(id.clone()))
        };

        let mut inputs: Vec<BTreeSet<usize>> = vec![BTreeSet::new(); total];
        for relation in &graph.security_dependencies {
            inputs[lookup(&relation.target)?].insert(lookup(&relation.source)?);
        }
        if !ignore_suppliers {
            for offering in &graph.offerings {
                inputs[lookup(&offering.component_id)?].insert(lookup(&offering.supplier_id)?);
            }
        }

        let mut nodes = Vec::with_capacity(total);
        for (component, node_inputs) in graph.components.iter().zip(&inputs) {
            let id = &component.id;
            let node_inputs: Vec<usize> = node_inputs.iter().copied().collect();
            nodes.push(match (node_inputs.is_empty(), component.gate) {
                (true, _) => Node::Leaf { id },
                (false, Gate::And) => Node::AndGate { id, inputs: node_inputs },
                (false, Gate::Or) => Node::OrGate { id, inputs: node_inputs },
            });
        }
        for supplier in &graph.suppliers {
            nodes.push(Node::SupplierLeaf { id: &supplier.id });
        }

        let mut top_inputs = Vec::new();
        for input in graph.indicator.inputs() {
            top_inputs.push(lookup(input)?);
            if !ignore_suppliers
                && graph.dependencies_into(input).next().is_none()
                && graph.offerings_for(input).next().is_none()
            {
                return Err(MocusError::UnresolvedSupply(input.clone()));
            }
        }
        top_inputs.sort_unstable();
        top_inputs.dedup();

        Ok(Self {
            nodes,
            top_gate: graph.indicator.gate,
            top_inputs,
        })
    }

    /// Nodes reachable from the indicator, every node after all of its
    /// inputs.
    ///
    /// Walks with an explicit stack so deep dependency chains cannot
    /// exhaust the call stack.
    pub(crate) fn post_order(&self) -> Result<Vec<usize>, MocusError> {
        #[derive(Clone, Copy, PartialEq)]
        enum Mark {
            New,
            Open,
            Done,
        }

        let mut marks = vec![Mark::New; self.nodes.len()];
        let mut order = Vec::new();
        for &root in &self.top_inputs {
            if marks[root] != Mark::New {
                continue;
            }
            // Explicit stack of (node, next input index).
            let mut stack: Vec<(usize, usize)> = vec![(root, 0)];
            marks[root] = Mark::Open;

            while let Some((node, idx)) = stack.pop() {
                match self.nodes[node].inputs().get(idx).copied() {
                    Some(input) => {
                        stack.push((node, idx + 1));
                        match marks[input] {
                            Mark::Open => return Err(MocusError::Cycle(self.nodes[input].id().clone())),
                            Mark::Done => {}
                            Mark::New => {
                                marks[input] = Mark::Open;
                                stack.push((input, 0));
                            }
                        }
                    }
                    None => {
                        marks[node] = Mark::Done;
                        order.push(node);
                    }
                }
            }
        }
        Ok(order)
    }
}
