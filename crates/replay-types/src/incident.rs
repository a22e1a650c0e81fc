//! Incident summary / validation / narrative outputs (spec §4.G).

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct IncidentSummary {
    pub by_source_event_type: BTreeMap<String, u32>,
    pub by_source_event_name: BTreeMap<String, u32>,
    pub by_trace_id: BTreeMap<String, u32>,
    pub task_ids: Vec<String>,
    pub dispute_ids: Vec<String>,
    pub event_count: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IncidentValidation {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub deterministic_hash: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IncidentNarrative {
    pub lines: Vec<String>,
    pub anomaly_ids: Vec<String>,
    pub deterministic_hash: String,
}
