// src/core/dna.rs

//! Deterministic fingerprinting of findings.
//!
//! Two scans of the same target must assign the same DNA to the same
//! finding so the reporting side can deduplicate across runs. The DNA is
//! the compact JSON serialization of a canonicalized identity tuple
//! (title, location, technical detail).

use serde_json::{Map, Value, json};

use crate::core::models::VulnerabilityLocation;

/// Recursively sorts every mapping in `value` by key.
///
/// Sequences keep their original element order; mappings nested inside
/// sequences still get their keys sorted. Location metadata therefore
/// stays in construction order, which makes the DNA order-sensitive on
/// purpose: upstream construction order is the deterministic one.
pub fn canonicalize(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(String, Value)> = map.into_iter().collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));
            let mut sorted = Map::new();
            for (key, inner) in entries {
                sorted.insert(key, canonicalize(inner));
            }
            Value::Object(sorted)
        }
        Value::Array(items) => Value::Array(items.into_iter().map(canonicalize).collect()),
        other => other,
    }
}

/// Computes the DNA string for one finding.
///
/// Returns `None` when the finding has no location: without one it cannot
/// be identified as unique and must not be reported with a DNA.
pub fn compute(
    title: &str,
    location: Option<&VulnerabilityLocation>,
    technical_detail: &str,
) -> Option<String> {
    let location = location?;
    let identity = json!({
        "title": title,
        "technical_detail": technical_detail,
        "location": location.to_value(),
    });
    Some(canonicalize(identity).to_string())
}
