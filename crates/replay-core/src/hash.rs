//! SHA-256 helpers used for projection hashes (invariant I3), deterministic
//! replay hashes, and trace/span id derivation.

use crate::canon::canonical_json;
use sha2::{Digest, Sha256};

/// Lowercase hex SHA-256 digest of the given bytes.
pub fn sha256_hex(bytes: impl AsRef<[u8]>) -> String {
    let digest = Sha256::new().chain_update(bytes).finalize();
    format!("{:x}", digest)
}

/// SHA-256 digest of a value's canonical JSON form. This is what every
/// content hash in the system (projection hash, trace hash, manifest hashes)
/// is built from, so two events that are the same thing always hash the
/// same way regardless of field order or byte-encoding of their inputs.
pub fn canonical_hash(value: &serde_json::Value) -> String {
    sha256_hex(canonical_json(value).as_bytes())
}

/// Fold a sequence of per-event hashes into one deterministic digest
/// (used for `deterministic_hash` on replay results and incident
/// validations). The events must already be in canonical order — this
/// function does not sort.
pub fn fold_hashes<'a>(hashes: impl IntoIterator<Item = &'a str>) -> String {
    let mut hasher = Sha256::new();
    for h in hashes {
        hasher.update(h.as_bytes());
        hasher.update(b"\x1f");
    }
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn same_value_different_key_order_hashes_identically() {
        let a = json!({"a": 1, "b": 2});
        let b = json!({"b": 2, "a": 1});
        assert_eq!(canonical_hash(&a), canonical_hash(&b));
    }

    #[test]
    fn sha256_hex_is_64_chars() {
        let h = sha256_hex(b"hello");
        assert_eq!(h.len(), 64);
        assert!(h.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn fold_hashes_is_order_sensitive() {
        let a = fold_hashes(["aa", "bb"]);
        let b = fold_hashes(["bb", "aa"]);
        assert_ne!(a, b);
    }
}
