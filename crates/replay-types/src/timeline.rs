//! TimelineEvent / TimelineRecord / TrajectoryTrace — spec §3.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::taxonomy::InternalType;

/// A projected event, the unit the projection engine emits and the replay
/// engine folds over.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimelineEvent {
    /// 1-based, monotonic per-projection-run.
    pub seq: u32,
    #[serde(rename = "type")]
    pub type_: InternalType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_pda: Option<String>,
    pub timestamp_ms: i64,
    /// Sorted-key JSON: `{onchain: {eventName, signature, slot, disputeId?,
    /// traceId?, spanId?, parentSpanId?, sampled?}, ...}`.
    pub payload: Value,
    pub slot: u64,
    pub signature: String,
    pub source_event_name: String,
    pub source_event_sequence: u32,
}

/// A stored, hash-sealed projected record (spec §3 TimelineRecord).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimelineRecord {
    #[serde(flatten)]
    pub event: TimelineEvent,
    pub projection_hash: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dispute_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trace_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trace_span_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trace_parent_span_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trace_sampled: Option<bool>,
}

impl TimelineRecord {
    /// The canonical tuple this record was ordered/deduped by (I1, I2).
    pub fn canonical_key(&self) -> (u64, &str, u32, &str) {
        (
            self.event.slot,
            self.event.signature.as_str(),
            self.event.source_event_sequence,
            self.event.source_event_name.as_str(),
        )
    }
}

/// Portable, canonical record of a projection run, keyed by `trace_id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrajectoryTrace {
    pub schema_version: u32,
    pub trace_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    pub created_at_ms: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<BTreeMap<String, Value>>,
    pub events: Vec<TimelineEvent>,
}

impl TrajectoryTrace {
    pub const SCHEMA_VERSION: u32 = 1;
}
