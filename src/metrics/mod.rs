//! Risk and importance metrics derived from minimal cutsets.

pub mod risk;
pub mod importance;
pub mod selector;

pub use risk::{aggregate_risk, cutset_probability, folded_cutsets, risk, ProbabilityTable};
pub use importance::{
    birnbaum_structural_importances, birnbaum_importances,
    group_structural_importance, group_birnbaum_importance,
    fractional_importance_traits,
    BIRNBAUM_STRUCTURAL_IMPORTANCES, BIRNBAUM_IMPORTANCES, FRACTIONAL_IMPORTANCE,
};
pub use selector::{selector, Selector, SelectorError};
