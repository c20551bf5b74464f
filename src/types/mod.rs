//! Core types for the risk kernel.

pub mod entity;
pub mod relation;
pub mod graph;
pub mod cutset;

pub use entity::{EntityId, Gate, Component, Supplier, DEFAULT_RISK};
pub use relation::{RiskRelation, Offering, Indicator, INDICATOR_TARGET};
pub use graph::{SystemGraph, GraphError, GraphIdentity, GraphStructure};
pub use cutset::{Cutset, MinimalCutsets};
