//! Anomalies and the comparison result they belong to (spec §4.F).

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnomalyCode {
    HashMismatch,
    MissingEvent,
    UnexpectedEvent,
    TypeMismatch,
    TaskIdMismatch,
    DuplicateSequence,
    TransitionInvalid,
}

impl fmt::Display for AnomalyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AnomalyCode::HashMismatch => "hash_mismatch",
            AnomalyCode::MissingEvent => "missing_event",
            AnomalyCode::UnexpectedEvent => "unexpected_event",
            AnomalyCode::TypeMismatch => "type_mismatch",
            AnomalyCode::TaskIdMismatch => "task_id_mismatch",
            AnomalyCode::DuplicateSequence => "duplicate_sequence",
            AnomalyCode::TransitionInvalid => "transition_invalid",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Error,
    Warning,
}

/// Context attached to an anomaly; `seq` drives the sort order in §4.F step 8
/// (`replay_hash` anomalies carry `seq = None`, which sorts last).
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AnomalyContext {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seq: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_pda: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dispute_pda: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Anomaly {
    pub code: AnomalyCode,
    pub severity: Severity,
    pub message: String,
    pub context: AnomalyContext,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observed: Option<Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strictness {
    Strict,
    Lenient,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComparisonStatus {
    Clean,
    Mismatched,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonResult {
    pub strictness: Strictness,
    pub status: ComparisonStatus,
    pub duration_ms: u64,
    pub local_event_count: u32,
    pub projected_event_count: u32,
    pub mismatch_count: u32,
    pub match_rate: f64,
    pub anomalies: Vec<Anomaly>,
    pub task_ids: Vec<String>,
    pub dispute_ids: Vec<String>,
    pub local_replay: crate::replay::ReplayResult,
    pub projected_replay: crate::replay::ReplayResult,
}
