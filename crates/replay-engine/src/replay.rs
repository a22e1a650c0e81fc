//! The replay engine (spec §4.C): folds an already-projected
//! `TrajectoryTrace` left to right, re-deriving per-task/per-dispute state
//! through the same lifecycle machines the projection engine uses.

use crate::state_machine::{self, Issue};
use replay_core::canonical_hash;
use replay_types::{
    DisputeState, InternalType, ReplayResult, ReplaySummary, TaskState, TimelineEvent, TrajectoryTrace,
};
use serde_json::json;
use std::collections::BTreeMap;

fn dispute_id_of(event: &TimelineEvent) -> Option<String> {
    event.payload.get("onchain")?.get("disputeId")?.as_str().map(str::to_string)
}

/// Fold `trace` into a `ReplayResult` (spec §4.C). In `strict_mode`, every
/// conflict/violation produces an error; in lenient mode they are warnings.
pub fn replay(trace: &TrajectoryTrace, strict_mode: bool) -> ReplayResult {
    let mut tasks: BTreeMap<String, TaskState> = BTreeMap::new();
    let mut disputes: BTreeMap<String, DisputeState> = BTreeMap::new();
    let mut errors = Vec::new();
    let mut warnings = Vec::new();
    let mut error_count = 0u32;
    let mut warning_count = 0u32;

    for event in &trace.events {
        if let Some(pda) = &event.task_pda {
            let current = tasks.get(pda).cloned().unwrap_or_default();
            if let Some((next, issue)) = state_machine::task_transition(current.status, event.type_) {
                if let Some(issue) = issue {
                    let message = describe_issue(&issue, event.type_, "task", pda);
                    if strict_mode {
                        errors.push(message);
                        error_count += 1;
                    } else {
                        warnings.push(message);
                        warning_count += 1;
                    }
                }
                tasks.insert(
                    pda.clone(),
                    TaskState {
                        status: next,
                        last_event_seq: event.seq,
                    },
                );
            }
        }

        if let Some(id) = dispute_id_of(event) {
            let current = disputes.get(&id).cloned().unwrap_or_default();
            if let Some((next, issue)) = state_machine::dispute_transition(current.status, event.type_) {
                if let Some(issue) = issue {
                    let message = describe_issue(&issue, event.type_, "dispute", &id);
                    if strict_mode {
                        errors.push(message);
                        error_count += 1;
                    } else {
                        warnings.push(message);
                        warning_count += 1;
                    }
                }
                let vote_count = current.vote_count + u32::from(event.type_ == InternalType::DisputeVoteCast);
                disputes.insert(
                    id,
                    DisputeState {
                        status: next,
                        vote_count,
                        last_event_seq: event.seq,
                    },
                );
            }
        }
    }

    let summary = ReplaySummary {
        total_events: trace.events.len() as u32,
        task_count: tasks.len() as u32,
        dispute_count: disputes.len() as u32,
        error_count,
        warning_count,
    };

    let deterministic_hash = canonical_hash(&json!({
        "tasks": tasks,
        "disputes": disputes,
        "errors": errors,
        "warnings": warnings,
        "summary": summary,
    }));

    ReplayResult {
        tasks,
        disputes,
        errors,
        warnings,
        summary,
        deterministic_hash,
    }
}

fn describe_issue(issue: &Issue, event: InternalType, kind: &str, id: &str) -> String {
    match issue {
        Issue::Conflict(msg) => format!("{kind} {id}: {msg}"),
        Issue::Violation { from_state, to_state } => {
            format!("{kind} {id}: {event} illegal from {from_state} to {to_state}")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::project::{project, ProjectOpts};
    use replay_types::RawProjectionInput;
    use serde_json::json;

    fn raw(name: &str, slot: i64, sig: &str, task_pda: &str) -> RawProjectionInput {
        RawProjectionInput {
            event_name: name.to_string(),
            slot,
            signature: sig.to_string(),
            source_event_sequence: Some(0),
            timestamp_ms: Some(0),
            event: json!({"task_pda": task_pda}),
        }
    }

    #[test]
    fn happy_path_has_no_errors() {
        let events = vec![
            raw("taskCreated", 1, "a", "task1"),
            raw("taskClaimed", 2, "b", "task1"),
            raw("taskCompleted", 3, "c", "task1"),
        ];
        let projected = project(&events, &ProjectOpts::default());
        let result = replay(&projected.trace, true);
        assert!(result.errors.is_empty());
        assert_eq!(result.tasks["task1"].status, replay_types::TaskStatus::Completed);
    }

    #[test]
    fn strict_mode_turns_conflicts_into_errors() {
        let events = vec![raw("taskCompleted", 1, "a", "task1")];
        let projected = project(&events, &ProjectOpts::default());
        let strict = replay(&projected.trace, true);
        assert_eq!(strict.errors.len(), 1);
        assert!(strict.warnings.is_empty());

        let lenient = replay(&projected.trace, false);
        assert!(lenient.errors.is_empty());
        assert_eq!(lenient.warnings.len(), 1);
    }

    #[test]
    fn deterministic_hash_is_stable_across_runs() {
        let events = vec![raw("taskCreated", 1, "a", "task1")];
        let projected = project(&events, &ProjectOpts::default());
        let a = replay(&projected.trace, true);
        let b = replay(&projected.trace, true);
        assert_eq!(a.deterministic_hash, b.deterministic_hash);
    }
}
