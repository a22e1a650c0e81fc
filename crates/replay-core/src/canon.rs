//! Canonicaliser (spec §4.A): a stable, sorted-key JSON form that every hash
//! and diff in the system depends on.

use replay_types::RawProjectionInput;
use replay_types::canonical::CanonicalTuple;
use serde_json::{Map, Number, Value};

/// Fields whose byte-array value is an opaque identifier (pubkey-shaped) and
/// should round-trip through base58, matching how the coordination protocol's
/// own tooling renders these identifiers for humans.
const BASE58_FIELD_SUFFIXES: &[&str] = &[
    "_pda", "pubkey", "authority", "mint", "owner", "wallet", "address", "arbiter", "agent",
];

/// Fields whose byte-array value is digest-shaped and should round-trip
/// through hex.
const HEX_FIELD_SUFFIXES: &[&str] = &["hash", "digest", "root", "merkle"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldEncoding {
    Base58,
    Hex,
    /// Not a byte array; passed through unchanged.
    Raw,
}

pub fn field_encoding_for(field_name: &str) -> FieldEncoding {
    let lower = field_name.to_ascii_lowercase();
    if HEX_FIELD_SUFFIXES.iter().any(|s| lower.ends_with(s)) {
        FieldEncoding::Hex
    } else if BASE58_FIELD_SUFFIXES.iter().any(|s| lower.ends_with(s)) {
        FieldEncoding::Base58
    } else {
        FieldEncoding::Raw
    }
}

/// `true` if every array element is an integer in `0..=255` — the shape a
/// byte buffer takes once it has passed through JSON.
fn as_byte_array(value: &Value) -> Option<Vec<u8>> {
    let arr = value.as_array()?;
    if arr.is_empty() {
        return None;
    }
    let mut bytes = Vec::with_capacity(arr.len());
    for el in arr {
        let n = el.as_u64()?;
        if n > 255 {
            return None;
        }
        bytes.push(n as u8);
    }
    Some(bytes)
}

/// `true` if the JSON number's magnitude exceeds what an f64/JS number can
/// represent exactly (2^53), the threshold spec §4.A calls out for decimal
/// string encoding.
const MAX_SAFE_INT: i128 = 1i128 << 53;

fn encode_large_number(n: &Number) -> Option<Value> {
    if let Some(i) = n.as_i64() {
        if (i as i128).abs() > MAX_SAFE_INT {
            return Some(Value::String(i.to_string()));
        }
    } else if let Some(u) = n.as_u64() {
        if (u as i128) > MAX_SAFE_INT {
            return Some(Value::String(u.to_string()));
        }
    }
    None
}

/// Recursively canonicalise a JSON value: sort object keys, encode
/// byte-shaped arrays per field name, and stringify integers over 2^53.
///
/// `serde_json::Map` is backed by a `BTreeMap` in this workspace (the
/// `preserve_order` feature is never enabled), so any `Value::Object` we
/// build here serialises with lexicographically sorted keys for free.
pub fn canonicalise_value(value: &Value) -> Value {
    canonicalise_value_named(None, value)
}

fn canonicalise_value_named(field_name: Option<&str>, value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut out = Map::new();
            for (k, v) in map.iter() {
                out.insert(k.clone(), canonicalise_value_named(Some(k), v));
            }
            Value::Object(out)
        }
        Value::Array(items) => {
            if let (Some(name), Some(bytes)) = (field_name, as_byte_array(value)) {
                return match field_encoding_for(name) {
                    FieldEncoding::Base58 => Value::String(bs58::encode(&bytes).into_string()),
                    FieldEncoding::Hex => Value::String(hex::encode(&bytes)),
                    FieldEncoding::Raw => {
                        Value::Array(items.iter().map(|v| canonicalise_value_named(None, v)).collect())
                    }
                };
            }
            Value::Array(items.iter().map(|v| canonicalise_value_named(None, v)).collect())
        }
        Value::Number(n) => encode_large_number(n).unwrap_or_else(|| value.clone()),
        other => other.clone(),
    }
}

/// The canonical JSON serialisation a hash is always computed over. Stable
/// across platforms because key ordering and number/byte encoding are both
/// pinned by `canonicalise_value`.
pub fn canonical_json(value: &Value) -> String {
    // `to_string` on a `Value::Object` backed by a BTreeMap walks keys in
    // sorted order; no extra serializer plumbing is needed.
    serde_json::to_string(&canonicalise_value(value)).expect("canonical value always serialises")
}

/// Canonicalise a raw projection input into its ordering/dedup key
/// (spec §4.A / §3).
pub fn canonicalise(event: &RawProjectionInput, fallback_seq: u32) -> CanonicalTuple {
    event.canonical_tuple(fallback_seq)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn object_keys_are_sorted() {
        let v = json!({"b": 1, "a": 2});
        assert_eq!(canonical_json(&v), r#"{"a":2,"b":1}"#);
    }

    #[test]
    fn nested_objects_sort_too() {
        let v = json!({"z": {"y": 1, "x": 2}, "a": 1});
        assert_eq!(canonical_json(&v), r#"{"a":1,"z":{"x":2,"y":1}}"#);
    }

    #[test]
    fn pubkey_byte_array_encodes_base58() {
        let v = json!({"task_pda": [1,2,3,4]});
        let out = canonicalise_value(&v);
        let s = out.get("task_pda").unwrap().as_str().unwrap();
        assert_eq!(s, bs58::encode([1u8, 2, 3, 4]).into_string());
    }

    #[test]
    fn digest_byte_array_encodes_hex() {
        let v = json!({"state_hash": [0xde, 0xad, 0xbe, 0xef]});
        let out = canonicalise_value(&v);
        assert_eq!(out.get("state_hash").unwrap().as_str().unwrap(), "deadbeef");
    }

    #[test]
    fn large_integer_becomes_decimal_string() {
        let v = json!({"amount": 9_007_199_254_740_993_u64});
        let out = canonicalise_value(&v);
        assert_eq!(
            out.get("amount").unwrap().as_str().unwrap(),
            "9007199254740993"
        );
    }

    #[test]
    fn small_integer_stays_a_number() {
        let v = json!({"count": 42});
        let out = canonicalise_value(&v);
        assert!(out.get("count").unwrap().is_number());
    }

    #[test]
    fn order_independent_objects_hash_identically() {
        let a = json!({"a": 1, "b": 2});
        let b = json!({"b": 2, "a": 1});
        assert_eq!(canonical_json(&a), canonical_json(&b));
    }
}
