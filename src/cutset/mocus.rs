//! MOCUS gate reduction.
//!
//! ## Algorithm
//!
//! 1. Order the nodes reachable from the indicator so every node follows
//!    its inputs
//! 2. Expand each node in that order from its inputs' expansions:
//!    - `Leaf` / `SupplierLeaf`: the entity alone
//!    - `OrGate`: the entity alone, or any input's expansion
//!    - `AndGate`: the entity alone, or the product of every input's expansion
//! 3. Apply absorption after every combination
//! 4. Combine the indicator's inputs under its gate
//!
//! An expansion is kept until its last consumer takes it, so a predecessor
//! shared by several paths is expanded once and memory stays bounded by the
//! expansions still waiting for a consumer.

use crate::types::{Gate, MinimalCutsets, SystemGraph};
use super::model::{FaultModel, Node};
use super::MocusError;

/// Enumerate the minimal cutsets of the graph's indicator.
///
/// With `ignore_suppliers == false` offerings are treated as additional
/// inputs of the components they supply.
pub fn minimal_cutsets(graph: &SystemGraph, ignore_suppliers: bool) -> Result<MinimalCutsets, MocusError> {
    let model = FaultModel::build(graph, ignore_suppliers)?;
    if model.top_inputs.is_empty() {
        return Ok(MinimalCutsets::never());
    }

    let order = model.post_order()?;
    let mut expansions = Expansions::new(&model, &order);
    for &i in &order {
        let node = &model.nodes[i];
        let own = MinimalCutsets::single(node.id().clone());
        let family = match node {
            Node::Leaf { .. } | Node::SupplierLeaf { .. } => own,
            Node::AndGate { inputs, .. } => combine(Gate::And, expansions.take_all(inputs)?).merge(own),
            Node::OrGate { inputs, .. } => combine(Gate::Or, expansions.take_all(inputs)?).merge(own),
        };
        expansions.finish(i, family);
    }
    let cutsets = combine(model.top_gate, expansions.take_all(&model.top_inputs)?);

    tracing::debug!(
        graph = %graph.name,
        ignore_suppliers,
        expanded_nodes = order.len(),
        cutsets = cutsets.len(),
        "mocus expansion complete"
    );
    Ok(cutsets)
}

/// Combine input families under a gate.
fn combine(gate: Gate, families: Vec<MinimalCutsets>) -> MinimalCutsets {
    let mut families = families.into_iter();
    match gate {
        Gate::Or => families.fold(MinimalCutsets::never(), MinimalCutsets::merge),
        Gate::And => match families.next() {
            Some(first) => families.fold(first, |acc, f| acc.product(&f)),
            None => MinimalCutsets::always(),
        },
    }
}

/// Finished expansions with the number of consumers still to read them.
struct Expansions<'m, 'g> {
    model: &'m FaultModel<'g>,
    families: Vec<Option<MinimalCutsets>>,
    consumers: Vec<usize>,
}

impl<'m, 'g> Expansions<'m, 'g> {
    fn new(model: &'m FaultModel<'g>, order: &[usize]) -> Self {
        let mut consumers = vec![0; model.nodes.len()];
        let inputs = order
            .iter()
            .flat_map(move |&i| model.nodes[i].inputs())
            .chain(&model.top_inputs);
        for &input in inputs {
            consumers[input] += 1;
        }
        Self {
            model,
            families: vec![None; model.nodes.len()],
            consumers,
        }
    }

    fn finish(&mut self, i: usize, family: MinimalCutsets) {
        self.families[i] = Some(family);
    }

    /// Read the expansion of every input, moving it out on its last read.
    fn take_all(&mut self, inputs: &[usize]) -> Result<Vec<MinimalCutsets>, MocusError> {
        inputs.iter().map(|&i| self.take(i)).collect()
    }

    fn take(&mut self, i: usize) -> Result<MinimalCutsets, MocusError> {
        self.consumers[i] = self.consumers[i].saturating_sub(1);
        let family = if self.consumers[i] == 0 {
            self.families[i].take()
        } else {
            self.families[i].clone()
        };
        // Only a cycle reads an input before it is finished.
        family.ok_or_else(|| MocusError::Cycle(self.model.nodes[i].id().clone()))
    }
}
