//! Canonical-JSON content hashing, shared by decision/intent ids, policy
//! snapshot hashes, and OPS event ids.
//!
//! Same two-step recipe the teacher workspace uses for its config hash and
//! audit event hash: recursively sort object keys into a canonical form,
//! serialize, then SHA-256 the bytes. The only workspace-specific choice is
//! the truncation width — callers pick how many hex chars of the digest they
//! want (16 for event/intent ids, per §4.9; full 64 for config hashes).

use serde_json::Value;
use sha2::{Digest, Sha256};

/// Recursively sort the keys of every JSON object so that two values with
/// the same content but differently-ordered fields hash identically.
pub fn sort_keys(v: &Value) -> Value {
    match v {
        Value::Object(map) => {
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));
            let mut sorted = serde_json::Map::new();
            for (k, val) in entries {
                sorted.insert(k.clone(), sort_keys(val));
            }
            Value::Object(sorted)
        }
        Value::Array(items) => Value::Array(items.iter().map(sort_keys).collect()),
        other => other.clone(),
    }
}

/// Canonicalize `v`, serialize it, SHA-256 it, and return the first
/// `hex_len` hex characters of the digest (clamped to the digest's 64-char
/// hex width).
pub fn content_hash_hex(v: &Value, hex_len: usize) -> String {
    let canonical = sort_keys(v);
    let bytes = serde_json::to_vec(&canonical).expect("Value serialization is infallible");
    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    let digest = hasher.finalize();
    let full = hex::encode(digest);
    full[..hex_len.min(full.len())].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn key_order_does_not_affect_hash() {
        let a = json!({"b": 1, "a": 2});
        let b = json!({"a": 2, "b": 1});
        assert_eq!(content_hash_hex(&a, 16), content_hash_hex(&b, 16));
    }

    #[test]
    fn differing_content_differs() {
        let a = json!({"a": 1});
        let b = json!({"a": 2});
        assert_ne!(content_hash_hex(&a, 16), content_hash_hex(&b, 16));
    }

    #[test]
    fn is_deterministic_across_calls() {
        let v = json!({"x": [1,2,3], "y": "z"});
        assert_eq!(content_hash_hex(&v, 16), content_hash_hex(&v, 16));
    }
}
