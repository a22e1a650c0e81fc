//! `AlertDispatcher` payload shape (spec §6.3).

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::anomaly::{AnomalyCode, Severity};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplayAlertContext {
    pub code: AnomalyCode,
    pub severity: Severity,
    /// Always `"replay.compare"` for anomaly-driven alerts (spec §4.F step
    /// 10's `replay.compare.<code>` naming); kept as a field rather than a
    /// constant so other call sites (future alert kinds) can reuse the shape.
    pub kind: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_event_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_pda: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dispute_pda: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trace_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_event_sequence: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slot: Option<u64>,
    pub metadata: Value,
}
