//! Canonical argument serialization.
//!
//! Two calls with the same arguments must map to the same session cache key
//! no matter what order the model emitted the keys in.

use serde_json::Value;
use std::collections::BTreeMap;

use super::types::ToolArgs;

/// Serialize arguments to compact JSON with object keys sorted at every depth.
///
/// Array order is significant and kept. Numbers and strings use serde_json's
/// formatting, which is stable for a given value.
///
/// # Example
///
/// ```rust
/// use tollgate_core::approval::canonical_json;
/// use serde_json::json;
///
/// let a = json!({"b": 2, "a": 1}).as_object().cloned().unwrap();
/// assert_eq!(canonical_json(&a), r#"{"a":1,"b":2}"#);
/// ```
pub fn canonical_json(args: &ToolArgs) -> String {
    let sorted: BTreeMap<&str, Value> = args
        .iter()
        .map(|(k, v)| (k.as_str(), canonicalize_value(v)))
        .collect();
    // Serializing a BTreeMap of strings and Values cannot fail.
    serde_json::to_string(&sorted).unwrap_or_default()
}

/// SHA-256 fingerprint of [`canonical_json`], hex encoded.
///
/// Short enough for log lines and events where the full argument payload
/// would be noise.
pub fn hash_params(args: &ToolArgs) -> String {
    use sha2::{Digest, Sha256};

    let hash = Sha256::digest(canonical_json(args).as_bytes());
    format!("{:x}", hash)
}

/// Convert a JSON value to canonical form with sorted keys.
fn canonicalize_value(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let sorted: BTreeMap<_, _> = map
                .iter()
                .map(|(k, v)| (k.clone(), canonicalize_value(v)))
                .collect();
            Value::Object(sorted.into_iter().collect())
        }
        Value::Array(arr) => Value::Array(arr.iter().map(canonicalize_value).collect()),
        other => other.clone(),
    }
}
