//! Canonical serialization for graph fingerprints.
//!
//! ## Determinism Guarantees
//!
//! - Stable field order: Struct fields serialize in declaration order
//! - Stable Vec order: callers pass members already in canonical order
//! - No HashMap allowed: Use BTreeMap for maps in hashed data
//! - Probabilities are quantized to integers before hashing, so values that
//!   differ only below the sixth decimal share a fingerprint

use serde::Serialize;
use xxhash_rust::xxh64::xxh64;

/// Quantization factor for probabilities.
const PROBABILITY_QUANTIZATION_FACTOR: f64 = 1_000_000.0;

/// Quantize a probability to an i64 for deterministic hashing.
pub fn quantize_probability(value: f64) -> i64 {
    (value * PROBABILITY_QUANTIZATION_FACTOR).round() as i64
}

/// Serialize a value to canonical JSON bytes for hashing.
pub fn to_canonical_bytes<T: Serialize>(value: &T) -> Vec<u8> {
    serde_json::to_vec(value).expect("Canonical serialization failed")
}

/// Compute canonical hash of a serializable value.
pub fn canonical_hash<T: Serialize>(value: &T) -> u64 {
    xxh64(&to_canonical_bytes(value), 0)
}
