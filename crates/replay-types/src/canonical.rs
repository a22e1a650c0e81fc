//! The canonical tuple (spec §3) and raw event input shapes (spec §6.1).

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// `(slot, signature, source_event_sequence, event_name)` — the total order
/// key used for sorting and dedup (I1, I2). Missing/negative fields map to
/// defaults per spec §3 before the tuple is constructed.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CanonicalTuple {
    pub slot: u64,
    pub signature: String,
    pub source_event_sequence: u32,
    pub event_name: String,
}

impl CanonicalTuple {
    pub fn new(slot: u64, signature: String, source_event_sequence: u32, event_name: String) -> Self {
        Self {
            slot,
            signature,
            source_event_sequence,
            event_name,
        }
    }
}

/// Raw event as it arrives from a `BackfillFetcher` page (spec §6.1).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawProjectionInput {
    pub event_name: String,
    pub slot: i64,
    pub signature: String,
    #[serde(default)]
    pub source_event_sequence: Option<i64>,
    #[serde(default)]
    pub timestamp_ms: Option<i64>,
    /// Opaque provider payload, carried through untouched into the
    /// projected event's `payload.onchain` sub-object context.
    #[serde(default)]
    pub event: Value,
}

impl RawProjectionInput {
    /// Build the canonical tuple. Negative slot/sequence and empty/missing
    /// names collapse to 0 / "".
    pub fn canonical_tuple(&self, fallback_seq: u32) -> CanonicalTuple {
        let slot = if self.slot < 0 { 0 } else { self.slot as u64 };
        let source_event_sequence = match self.source_event_sequence {
            Some(n) if n >= 0 => n as u32,
            Some(_) => 0,
            None => fallback_seq,
        };
        let event_name = self.event_name.clone();
        CanonicalTuple::new(slot, self.signature.clone(), source_event_sequence, event_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_fields_map_to_defaults() {
        let raw = RawProjectionInput {
            event_name: "taskCreated".into(),
            slot: -5,
            signature: "SIG".into(),
            source_event_sequence: Some(-1),
            timestamp_ms: None,
            event: Value::Null,
        };
        let tuple = raw.canonical_tuple(0);
        assert_eq!(tuple.slot, 0);
        assert_eq!(tuple.source_event_sequence, 0);
    }

    #[test]
    fn ordering_is_lexicographic_over_the_tuple() {
        let a = CanonicalTuple::new(10, "AAA".into(), 0, "taskCreated".into());
        let b = CanonicalTuple::new(10, "AAA".into(), 1, "taskClaimed".into());
        let c = CanonicalTuple::new(100, "ZZZ".into(), 0, "taskCompleted".into());
        let mut v = vec![c.clone(), b.clone(), a.clone()];
        v.sort();
        assert_eq!(v, vec![a, b, c]);
    }
}
