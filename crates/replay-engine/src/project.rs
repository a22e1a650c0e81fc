//! The projection engine (spec §4.B): folds a batch of raw events into a
//! `ProjectionResult` — an ordered, deduplicated, hash-sealed
//! `TrajectoryTrace` plus the telemetry a caller needs to judge how clean
//! the fold was.

use crate::extract;
use crate::state_machine::{self, Issue};
use replay_core::{canonical_hash, derive_span_id, derive_trace_id, is_sampled};
use replay_types::canonical::CanonicalTuple;
use replay_types::{
    lookup_event_name, DisputeState, MalformedInput, ProjectionResult, ProjectionTelemetry,
    RawProjectionInput, TaskState, TimelineEvent, TransitionViolation, TrajectoryTrace,
};
use serde_json::{json, Value};
use std::collections::BTreeMap;

/// Options threaded through a single `project` call.
#[derive(Debug, Clone, Default)]
pub struct ProjectOpts {
    /// Overrides per-event trace derivation with one shared trace for the
    /// whole run (used by fixtures/tests and by the comparison service when
    /// it wants every event folded into a single logical trace).
    pub trace_id: Option<String>,
    pub seed: Option<u64>,
    /// Sampling rate in `[0.0, 1.0]`; defaults to `1.0` (always sampled).
    pub sample_rate: Option<f64>,
    /// Timestamp used to stamp the resulting `TrajectoryTrace`. Required
    /// because this crate cannot call `Utc::now()` internally without
    /// breaking determinism guarantees callers rely on.
    pub created_at_ms: i64,
}

struct Staged {
    tuple: CanonicalTuple,
    raw: RawProjectionInput,
}

/// Fold `events` into a `ProjectionResult` (spec §4.B algorithm, steps 1-8).
pub fn project(events: &[RawProjectionInput], opts: &ProjectOpts) -> ProjectionResult {
    let mut telemetry = ProjectionTelemetry::default();

    // Step 1: canonicalise, dropping malformed inputs.
    let mut staged = Vec::with_capacity(events.len());
    for (i, raw) in events.iter().enumerate() {
        if raw.event_name.trim().is_empty() {
            telemetry.malformed_inputs.push(MalformedInput {
                reason: "empty event_name".to_string(),
                tuple: None,
            });
            continue;
        }
        let tuple = raw.canonical_tuple(i as u32);
        staged.push(Staged {
            tuple,
            raw: raw.clone(),
        });
    }

    // Step 2: stable ascending sort by canonical tuple.
    staged.sort_by(|a, b| a.tuple.cmp(&b.tuple));

    // Step 3: dedup by canonical tuple.
    let mut deduped: Vec<Staged> = Vec::with_capacity(staged.len());
    for item in staged {
        if deduped.last().is_some_and(|prev| prev.tuple == item.tuple) {
            telemetry.duplicates_dropped += 1;
        } else {
            deduped.push(item);
        }
    }

    let sample_rate = opts.sample_rate.unwrap_or(1.0);
    let mut tasks: BTreeMap<String, TaskState> = BTreeMap::new();
    let mut disputes: BTreeMap<String, DisputeState> = BTreeMap::new();
    let mut last_span: BTreeMap<String, String> = BTreeMap::new();
    let mut out_events: Vec<TimelineEvent> = Vec::new();
    let mut first_trace_id: Option<String> = None;

    for item in &deduped {
        let Some(internal_type) = lookup_event_name(&item.raw.event_name) else {
            telemetry.unknown_events.push(item.raw.event_name.clone());
            continue;
        };

        let seq = out_events.len() as u32 + 1;
        let task_pda = extract::task_pda(&item.raw.event);
        let dispute_id = extract::dispute_id(&item.raw.event);

        // Step 5: lifecycle state machines.
        if let Some(pda) = &task_pda {
            let current = tasks.get(pda).cloned().unwrap_or_default();
            if let Some((next, issue)) = state_machine::task_transition(current.status, internal_type) {
                record_issue(&mut telemetry, issue, internal_type);
                tasks.insert(
                    pda.clone(),
                    TaskState {
                        status: next,
                        last_event_seq: seq,
                    },
                );
            }
        }
        if let Some(id) = &dispute_id {
            let current = disputes.get(id).cloned().unwrap_or_default();
            if let Some((next, issue)) = state_machine::dispute_transition(current.status, internal_type) {
                record_issue(&mut telemetry, issue, internal_type);
                let vote_count = current.vote_count + u32::from(internal_type == replay_types::InternalType::DisputeVoteCast);
                disputes.insert(
                    id.clone(),
                    DisputeState {
                        status: next,
                        vote_count,
                        last_event_seq: seq,
                    },
                );
            }
        }

        // Step 6: trace derivation.
        let trace_id = opts.trace_id.clone().unwrap_or_else(|| {
            derive_trace_id(
                item.tuple.slot,
                &item.tuple.signature,
                &item.tuple.event_name,
                item.tuple.source_event_sequence,
            )
        });
        first_trace_id.get_or_insert_with(|| trace_id.clone());
        let span_id = derive_span_id(&trace_id, seq);
        let parent_span_id = last_span.get(&trace_id).cloned();
        last_span.insert(trace_id.clone(), span_id.clone());
        let sampled = is_sampled(&trace_id, sample_rate);

        let mut onchain = json!({
            "eventName": item.raw.event_name,
            "signature": item.tuple.signature,
            "slot": item.tuple.slot,
            "traceId": trace_id,
            "spanId": span_id,
            "sampled": sampled,
        });
        if let Some(parent) = &parent_span_id {
            onchain["parentSpanId"] = Value::String(parent.clone());
        }
        if let Some(id) = &dispute_id {
            onchain["disputeId"] = Value::String(id.clone());
        }

        out_events.push(TimelineEvent {
            seq,
            type_: internal_type,
            task_pda,
            timestamp_ms: item.raw.timestamp_ms.unwrap_or(0),
            payload: json!({ "onchain": onchain }),
            slot: item.tuple.slot,
            signature: item.tuple.signature.clone(),
            source_event_name: item.raw.event_name.clone(),
            source_event_sequence: item.tuple.source_event_sequence,
        });
    }

    telemetry.projected_events = out_events.len() as u32;

    // Step 8: seal the trace. `projection_hash` (step 7, invariant I3) is
    // computed per event by callers that persist a `TimelineRecord`
    // (`replay-index`/`replay-sdk`), not embedded on `TimelineEvent` itself.
    let trace = TrajectoryTrace {
        schema_version: TrajectoryTrace::SCHEMA_VERSION,
        trace_id: opts.trace_id.clone().or(first_trace_id).unwrap_or_default(),
        seed: opts.seed,
        created_at_ms: opts.created_at_ms,
        metadata: None,
        events: out_events.clone(),
    };

    ProjectionResult {
        events: out_events,
        trace,
        telemetry,
        disputes,
    }
}

fn record_issue(
    telemetry: &mut ProjectionTelemetry,
    issue: Option<Issue>,
    event: replay_types::InternalType,
) {
    match issue {
        None => {}
        Some(Issue::Conflict(msg)) => telemetry.transition_conflicts.push(msg),
        Some(Issue::Violation { from_state, to_state }) => {
            telemetry.transition_violations.push(TransitionViolation {
                from_state,
                to_state,
                event: event.to_string(),
            })
        }
    }
}

/// Projection hash for a single event (spec §4.B step 7, invariant I3):
/// the SHA-256 of the event's own canonical JSON form.
pub fn projection_hash(event: &TimelineEvent) -> replay_core::Result<String> {
    let value = serde_json::to_value(event)?;
    Ok(canonical_hash(&value))
}
