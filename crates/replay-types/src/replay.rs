//! Replay result + summary (spec §4.C).

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::state::{DisputeState, TaskState};

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct ReplaySummary {
    pub total_events: u32,
    pub task_count: u32,
    pub dispute_count: u32,
    pub error_count: u32,
    pub warning_count: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplayResult {
    pub tasks: BTreeMap<String, TaskState>,
    pub disputes: BTreeMap<String, DisputeState>,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub summary: ReplaySummary,
    pub deterministic_hash: String,
}
