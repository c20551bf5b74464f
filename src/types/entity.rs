//! Entity types: identifiers, components, suppliers.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Failure probability assigned to components and suppliers when none is given.
pub const DEFAULT_RISK: f64 = 0.25;

/// Identifier of a component or supplier.
///
/// Payloads may carry identifiers as strings or integers; both are stored as
/// strings so `1` and `"1"` name the same entity.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct EntityId(String);

impl EntityId {
    /// Create a new identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EntityId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for EntityId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<i64> for EntityId {
    fn from(n: i64) -> Self {
        Self(n.to_string())
    }
}

impl<'de> Deserialize<'de> for EntityId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Text(String),
            Int(i64),
        }

        Ok(match RawId::deserialize(deserializer)? {
            RawId::Text(s) => Self(s),
            RawId::Int(n) => Self(n.to_string()),
        })
    }
}

/// How the incoming edges of a node combine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gate {
    /// Fails only when every input fails.
    And,
    /// Fails when any input fails.
    Or,
}

impl Gate {
    /// Parse gate from string.
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "and" => Some(Self::And),
            "or" => Some(Self::Or),
            _ => None,
        }
    }
}

impl Default for Gate {
    fn default() -> Self {
        Self::And
    }
}

impl fmt::Display for Gate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::And => write!(f, "and"),
            Self::Or => write!(f, "or"),
        }
    }
}

fn default_risk() -> f64 {
    DEFAULT_RISK
}

/// A gated part of the supply system.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Component {
    /// Unique identifier within the graph.
    #[serde(alias = "identifier")]
    pub id: EntityId,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Intrinsic failure probability.
    #[serde(default = "default_risk")]
    pub risk: f64,
    /// How incoming dependency edges combine.
    #[serde(default, alias = "logic_function")]
    pub gate: Gate,
    /// Boolean traits used by attribute selection.
    #[serde(default)]
    pub attributes: BTreeMap<String, bool>,
}

impl Component {
    /// Create a component with default risk and an AND gate.
    pub fn new(id: impl Into<EntityId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            risk: DEFAULT_RISK,
            gate: Gate::And,
            attributes: BTreeMap::new(),
        }
    }

    /// Set the intrinsic failure probability.
    pub fn with_risk(mut self, risk: f64) -> Self {
        self.risk = risk;
        self
    }

    /// Set the gate.
    pub fn with_gate(mut self, gate: Gate) -> Self {
        self.gate = gate;
        self
    }

    /// Attach a boolean attribute.
    pub fn with_attribute(mut self, name: impl Into<String>, value: bool) -> Self {
        self.attributes.insert(name.into(), value);
        self
    }
}

/// An external provider. Suppliers fail only through their own basic event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Supplier {
    /// Unique identifier within the graph.
    #[serde(alias = "identifier")]
    pub id: EntityId,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Failure probability of the supplier itself.
    #[serde(default = "default_risk")]
    pub risk: f64,
    /// Boolean traits used by attribute selection.
    #[serde(default)]
    pub attributes: BTreeMap<String, bool>,
}

impl Supplier {
    /// Create a supplier with default risk.
    pub fn new(id: impl Into<EntityId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            risk: DEFAULT_RISK,
            attributes: BTreeMap::new(),
        }
    }

    /// Set the failure probability.
    pub fn with_risk(mut self, risk: f64) -> Self {
        self.risk = risk;
        self
    }

    /// Attach a boolean attribute.
    pub fn with_attribute(mut self, name: impl Into<String>, value: bool) -> Self {
        self.attributes.insert(name.into(), value);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_id_accepts_integers_and_strings() {
        let ids: Vec<EntityId> = serde_json::from_str(r#"[1, "1", "one", -1]"#).unwrap();
        assert_eq!(ids[0], ids[1]);
        assert_eq!(ids[2].as_str(), "one");
        assert_eq!(ids[3].as_str(), "-1");
    }

    #[test]
    fn test_component_defaults() {
        let c: Component = serde_json::from_str(r#"{"id": 3, "name": "three"}"#).unwrap();
        assert_eq!(c.risk, DEFAULT_RISK);
        assert_eq!(c.gate, Gate::And);
        assert!(c.attributes.is_empty());
    }

    #[test]
    fn test_gate_parsing() {
        assert_eq!(Gate::from_str("OR"), Some(Gate::Or));
        assert_eq!(Gate::from_str("and"), Some(Gate::And));
        assert_eq!(Gate::from_str("xor"), None);

        let gate: Gate = serde_json::from_str(r#""or""#).unwrap();
        assert_eq!(gate, Gate::Or);
    }
}
