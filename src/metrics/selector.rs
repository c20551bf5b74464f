//! Attribute selectors.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::types::{EntityId, SystemGraph};

/// Error type for selector construction.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SelectorError {
    /// The attribute name is empty.
    #[error("Attribute name must not be empty")]
    EmptyAttribute,
    /// The value cannot be read as a boolean.
    #[error("Attribute value must be an integer or a boolean, got {0:?}")]
    InvalidValue(String),
}

/// Picks the components and suppliers whose attribute equals a value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Selector {
    /// Attribute name.
    pub attribute: String,
    /// Required value.
    pub value: bool,
}

impl Selector {
    /// Create a selector from an already typed value.
    pub fn new(attribute: impl Into<String>, value: bool) -> Self {
        Self {
            attribute: attribute.into(),
            value,
        }
    }

    /// Whether an entity of the graph carries the selected value.
    pub fn matches(&self, graph: &SystemGraph, id: &EntityId) -> bool {
        graph
            .attributes_of(id)
            .and_then(|attributes| attributes.get(&self.attribute))
            .is_some_and(|&v| v == self.value)
    }

    /// Every selected entity of the graph.
    pub fn select<'g>(&self, graph: &'g SystemGraph) -> Vec<&'g EntityId> {
        graph.entity_ids().filter(|id| self.matches(graph, id)).collect()
    }

    /// Result key for a metric, e.g. `birnbaum_importances_select_domestic_False`.
    ///
    /// The value is capitalised (`True` / `False`), which is the key format
    /// existing clients look up.
    pub fn key(&self, metric: &str) -> String {
        let value = if self.value { "True" } else { "False" };
        format!("{}_select_{}_{}", metric, self.attribute, value)
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.attribute, self.value)
    }
}

/// Build a selector from untyped input.
///
/// Integers select `value != 0`; `true` and `false` are accepted in any case.
pub fn selector(attribute: &str, value: &str) -> Result<Selector, SelectorError> {
    if attribute.trim().is_empty() {
        return Err(SelectorError::EmptyAttribute);
    }

    let raw = value.trim();
    let parsed = match raw.parse::<i64>() {
        Ok(n) => n != 0,
        Err(_) => match raw.to_lowercase().as_str() {
            "true" => true,
            "false" => false,
            _ => return Err(SelectorError::InvalidValue(value.to_string())),
        },
    };

    Ok(Selector::new(attribute.trim(), parsed))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Component, Gate, Indicator, Supplier};

    #[test]
    fn test_selector_parsing() {
        assert_eq!(selector("domestic", "0").unwrap(), Selector::new("domestic", false));
        assert_eq!(selector("domestic", "1").unwrap(), Selector::new("domestic", true));
        assert_eq!(selector("domestic", "-3").unwrap(), Selector::new("domestic", true));
        assert_eq!(selector("domestic", "False").unwrap(), Selector::new("domestic", false));
        assert_eq!(
            selector("domestic", "maybe"),
            Err(SelectorError::InvalidValue("maybe".to_string()))
        );
        assert_eq!(selector(" ", "1"), Err(SelectorError::EmptyAttribute));
    }

    #[test]
    fn test_key() {
        let s = Selector::new("domestic", false);
        assert_eq!(s.key("birnbaum_importances"), "birnbaum_importances_select_domestic_False");
        assert_eq!(
            Selector::new("domestic", true).key("birnbaum_structural_importances"),
            "birnbaum_structural_importances_select_domestic_True"
        );
    }

    #[test]
    fn test_select_components_and_suppliers() {
        let g = SystemGraph::new(
            "g",
            vec![
                Component::new("1", "").with_attribute("domestic", true),
                Component::new("2", "").with_attribute("domestic", false),
                Component::new("3", ""),
            ],
            vec![Supplier::new("s", "").with_attribute("domestic", false)],
            vec![],
            vec![],
            Indicator::over(Gate::Or, ["1", "2", "3"]),
        );

        let selected = Selector::new("domestic", false).select(&g);
        assert_eq!(selected, vec![&EntityId::from("2"), &EntityId::from("s")]);
        assert!(Selector::new("audited", true).select(&g).is_empty());
    }
}
