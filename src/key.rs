//! Key derivation strategies.
//!
//! A resource's `key` is derived from its data map according to one of
//! three regimes (§3 of the spec): field-based, hash-based, and composite.
//! Hash-based and composite keys use a seeded, stable hash (blake2b
//! truncated to 64 bits) rather than an unseeded process-local hash, so
//! `full_resource_name` is reproducible across runs (Open Question #1).

use blake2::digest::consts::U8;
use blake2::{Blake2b, Digest};
use serde_json::Value;

type Blake2b64 = Blake2b<U8>;

/// How a type's key is derived from its data map (and, for composite keys,
/// from its parent).
#[derive(Debug, Clone)]
pub enum KeyStrategy {
    /// `key = data[field]`, rendered as a string.
    Field { field: &'static str },
    /// `key = blake2b(data[field]) mod 2^64`, rendered as unsigned decimal.
    HashField { field: &'static str },
    /// `key = blake2b(metadata.uid) mod 2^64`. Always hash-keyed.
    KubeUid,
    /// `key = blake2b(parent.type "/" parent.key "/" data[constraint_field])`.
    Composite { constraint_field: &'static str },
}

/// Stable 64-bit hash used by `HashField`, `KubeUid`, and `Composite` keys.
pub fn stable_hash64(input: &str) -> u64 {
    let mut hasher = Blake2b64::new();
    hasher.update(input.as_bytes());
    let digest = hasher.finalize();
    u64::from_be_bytes(digest.into())
}

fn field_as_str(data: &Value, field: &str) -> String {
    match data.get(field) {
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
        None => String::new(),
    }
}

impl KeyStrategy {
    /// Derive the key for a resource given its data map and, for composite
    /// keys, its immediate parent's type tag and key.
    pub fn derive(&self, data: &Value, parent: Option<(&str, &str)>) -> String {
        match self {
            KeyStrategy::Field { field } => field_as_str(data, field),
            KeyStrategy::HashField { field } => {
                stable_hash64(&field_as_str(data, field)).to_string()
            }
            KeyStrategy::KubeUid => {
                let uid = data
                    .get("metadata")
                    .and_then(|m| m.get("uid"))
                    .and_then(Value::as_str)
                    .unwrap_or_default();
                stable_hash64(uid).to_string()
            }
            KeyStrategy::Composite { constraint_field } => {
                let (parent_type, parent_key) = parent.unwrap_or(("", ""));
                let constraint = field_as_str(data, constraint_field);
                let seed = format!("{parent_type}/{parent_key}/{constraint}");
                stable_hash64(&seed).to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn field_strategy_reads_named_field() {
        let strategy = KeyStrategy::Field { field: "name" };
        let data = json!({"name": "my-instance"});
        assert_eq!(strategy.derive(&data, None), "my-instance");
    }

    #[test]
    fn hash_strategy_is_stable_across_calls() {
        let strategy = KeyStrategy::HashField { field: "selfLink" };
        let data = json!({"selfLink": "https://example/a/b/c"});
        let first = strategy.derive(&data, None);
        let second = strategy.derive(&data, None);
        assert_eq!(first, second);
        assert!(first.parse::<u64>().is_ok());
    }

    #[test]
    fn composite_strategy_depends_on_parent_and_constraint() {
        let strategy = KeyStrategy::Composite {
            constraint_field: "constraint",
        };
        let data = json!({"constraint": "serviceuser.services"});
        let key_a = strategy.derive(&data, Some(("project", "p1")));
        let key_b = strategy.derive(&data, Some(("project", "p2")));
        assert_ne!(key_a, key_b, "different parents must yield different keys");
    }

    #[test]
    fn kube_uid_strategy_reads_nested_metadata() {
        let strategy = KeyStrategy::KubeUid;
        let data = json!({"metadata": {"uid": "abc-123"}});
        let key = strategy.derive(&data, None);
        assert!(key.parse::<u64>().is_ok());
    }
}
