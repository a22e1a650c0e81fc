//! Projection result + telemetry (spec §4.B).

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::canonical::CanonicalTuple;
use crate::state::DisputeState;
use crate::timeline::{TimelineEvent, TrajectoryTrace};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct MalformedInput {
    pub reason: String,
    pub tuple: Option<CanonicalTuple>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TransitionViolation {
    pub from_state: String,
    pub to_state: String,
    pub event: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ProjectionTelemetry {
    pub projected_events: u32,
    pub duplicates_dropped: u32,
    pub unknown_events: Vec<String>,
    pub malformed_inputs: Vec<MalformedInput>,
    /// Missing prerequisites within the local window (e.g. completion
    /// without a prior discovery) — strings of the form `"none -> completed"`.
    pub transition_conflicts: Vec<String>,
    /// Strictly impossible transitions against already-committed state
    /// (e.g. a vote cast after resolution).
    pub transition_violations: Vec<TransitionViolation>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectionResult {
    pub events: Vec<TimelineEvent>,
    pub trace: TrajectoryTrace,
    pub telemetry: ProjectionTelemetry,
    pub disputes: BTreeMap<String, DisputeState>,
}
