//! Engine policy: tunable choices that change computed values.

use serde::{Deserialize, Serialize};

use crate::cutset::{BRUTE_FORCE_ENTITY_CEILING, MAX_BRUTE_FORCE_ENTITIES};

/// How cutset occurrences become a structural importance score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StructuralNormalization {
    /// Raw number of minimal cutsets containing the entity.
    Count,
    /// Occurrences divided by the number of minimal cutsets.
    FractionOfCutsets,
}

impl StructuralNormalization {
    /// Parse normalization from string.
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "count" => Some(Self::Count),
            "fraction" | "fraction_of_cutsets" => Some(Self::FractionOfCutsets),
            _ => None,
        }
    }

    /// Stable name, as used in configuration and cache keys.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Count => "count",
            Self::FractionOfCutsets => "fraction_of_cutsets",
        }
    }

    /// Normalize an occurrence count.
    pub fn apply(&self, occurrences: usize, total_cutsets: usize) -> f64 {
        match self {
            Self::Count => occurrences as f64,
            Self::FractionOfCutsets if total_cutsets == 0 => 0.0,
            Self::FractionOfCutsets => occurrences as f64 / total_cutsets as f64,
        }
    }
}

impl Default for StructuralNormalization {
    fn default() -> Self {
        Self::FractionOfCutsets
    }
}

/// Policy for a [`RiskEngine`](crate::engine::RiskEngine).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnginePolicy {
    /// Structural importance normalization.
    pub structural_normalization: StructuralNormalization,
    /// Largest graph (in reachable entities) accepted by cutset verification.
    pub brute_force_max_entities: usize,
}

impl Default for EnginePolicy {
    fn default() -> Self {
        Self {
            structural_normalization: StructuralNormalization::default(),
            brute_force_max_entities: MAX_BRUTE_FORCE_ENTITIES,
        }
    }
}

impl EnginePolicy {
    /// Read the policy from environment variables.
    ///
    /// - `RISK_STRUCTURAL_NORMALIZATION`: `count` or `fraction`
    /// - `RISK_BRUTE_FORCE_MAX`: entity bound for verification, at most
    ///   [`BRUTE_FORCE_ENTITY_CEILING`]
    ///
    /// Unset or unparsable values keep their defaults.
    pub fn from_env() -> Self {
        let mut policy = Self::default();

        if let Ok(value) = std::env::var("RISK_STRUCTURAL_NORMALIZATION") {
            match StructuralNormalization::from_str(&value) {
                Some(normalization) => policy.structural_normalization = normalization,
                None => tracing::warn!(value = %value, "unknown RISK_STRUCTURAL_NORMALIZATION, using default"),
            }
        }

        if let Some(max) = std::env::var("RISK_BRUTE_FORCE_MAX").ok().and_then(|s| s.parse::<usize>().ok()) {
            if max > BRUTE_FORCE_ENTITY_CEILING {
                tracing::warn!(
                    requested = max,
                    ceiling = BRUTE_FORCE_ENTITY_CEILING,
                    "RISK_BRUTE_FORCE_MAX above ceiling, clamping"
                );
            }
            policy.brute_force_max_entities = max.min(BRUTE_FORCE_ENTITY_CEILING);
        }

        policy
    }
}
