//! The comparison service (spec §4.F): diffs a locally observed trace
//! against the authoritative projected trace held in a [`TimelineStore`],
//! emitting [`Anomaly`] records and an aggregate [`ComparisonResult`].

use crate::error::{Error, Result};
use crate::query_dsl::Filter;
use crate::telemetry::{AlertDispatcher, MetricsProvider};
use replay_engine::{project, projection_hash, replay, ProjectOpts};
use replay_types::{
    Anomaly, AnomalyCode, AnomalyContext, ComparisonResult, ComparisonStatus, RawProjectionInput, ReplayAlertContext,
    Severity, Strictness, TimelineEvent, TimelineRecord,
};
use serde_json::json;
use std::collections::BTreeMap;

/// Inputs to [`compare`].
pub struct CompareRequest<'a> {
    /// The authoritative, already-projected side (loaded from a store or
    /// preloaded by the caller).
    pub projected: &'a [TimelineRecord],
    /// Raw events observed locally, not yet projected.
    pub local: &'a [RawProjectionInput],
    pub strictness: Strictness,
    pub query_dsl: Option<&'a str>,
    pub metrics: Option<&'a dyn MetricsProvider>,
    pub alerts: Option<&'a dyn AlertDispatcher>,
    pub created_at_ms: i64,
}

/// Run the comparison algorithm (spec §4.F, steps 1-10).
pub fn compare(request: CompareRequest<'_>) -> Result<ComparisonResult> {
    let start = std::time::Instant::now();
    let filter = match request.query_dsl {
        Some(dsl) => Filter::parse(dsl)?,
        None => Filter::default(),
    };

    // Step 3: canonicalise the local side through the same projection
    // engine the authoritative side went through.
    let local_projection = project(request.local, &ProjectOpts {
        created_at_ms: request.created_at_ms,
        ..Default::default()
    });

    // Step 2: filter both sides by the DSL.
    let projected_events: Vec<&TimelineEvent> =
        request.projected.iter().map(|r| &r.event).filter(|e| filter.matches_event(e)).collect();
    let local_events: Vec<&TimelineEvent> =
        local_projection.trace.events.iter().filter(|e| filter.matches_event(e)).collect();

    let mut anomalies = Vec::new();

    // Step 4: index by seq, walk the union in ascending order.
    let projected_by_seq: BTreeMap<u32, &TimelineEvent> = projected_events.iter().map(|e| (e.seq, *e)).collect();
    let local_by_seq: BTreeMap<u32, &TimelineEvent> = local_events.iter().map(|e| (e.seq, *e)).collect();
    let mut seqs: Vec<u32> = projected_by_seq.keys().chain(local_by_seq.keys()).copied().collect();
    seqs.sort_unstable();
    seqs.dedup();

    let strict = matches!(request.strictness, Strictness::Strict);

    for seq in seqs {
        match (local_by_seq.get(&seq), projected_by_seq.get(&seq)) {
            (Some(local), None) => anomalies.push(Anomaly {
                code: AnomalyCode::UnexpectedEvent,
                severity: Severity::Warning,
                message: format!("seq {seq} present locally but not in the projected trace"),
                context: context_of(local),
                expected: None,
                observed: Some(serde_json::to_value(local).unwrap_or(json!(null))),
            }),
            (None, Some(projected)) => anomalies.push(Anomaly {
                code: AnomalyCode::MissingEvent,
                severity: Severity::Error,
                message: format!("seq {seq} present in the projected trace but missing locally"),
                context: context_of(projected),
                expected: Some(serde_json::to_value(projected).unwrap_or(json!(null))),
                observed: None,
            }),
            (Some(local), Some(projected)) => {
                if local.type_ != projected.type_ {
                    anomalies.push(Anomaly {
                        code: AnomalyCode::TypeMismatch,
                        severity: Severity::Error,
                        message: format!("seq {seq}: type {} != {}", local.type_, projected.type_),
                        context: context_of(local),
                        expected: Some(json!(projected.type_.to_string())),
                        observed: Some(json!(local.type_.to_string())),
                    });
                }
                if local.task_pda != projected.task_pda {
                    anomalies.push(Anomaly {
                        code: AnomalyCode::TaskIdMismatch,
                        severity: Severity::Error,
                        message: format!("seq {seq}: task_pda differs"),
                        context: context_of(local),
                        expected: projected.task_pda.clone().map(|s| json!(s)),
                        observed: local.task_pda.clone().map(|s| json!(s)),
                    });
                }
                if local.signature != projected.signature {
                    anomalies.push(Anomaly {
                        code: AnomalyCode::TypeMismatch,
                        severity: Severity::Warning,
                        message: format!("seq {seq}: signature differs"),
                        context: context_of(local),
                        expected: Some(json!(projected.signature)),
                        observed: Some(json!(local.signature)),
                    });
                }
                let local_digest = replay_core::canonical_hash(&serde_json::to_value(&local.payload).unwrap_or(json!(null)));
                let projected_digest =
                    replay_core::canonical_hash(&serde_json::to_value(&projected.payload).unwrap_or(json!(null)));
                if local_digest != projected_digest {
                    anomalies.push(Anomaly {
                        code: AnomalyCode::HashMismatch,
                        severity: if strict { Severity::Error } else { Severity::Warning },
                        message: format!("seq {seq}: payload digest differs"),
                        context: context_of(local),
                        expected: Some(json!(projected_digest)),
                        observed: Some(json!(local_digest)),
                    });
                }
            }
            (None, None) => unreachable!("seq came from one of the two maps"),
        }
    }

    // Step 5: duplicate seq within a side (the projection engine already
    // dedups by canonical tuple, but distinct tuples can still share a seq
    // if a caller hand-assembled a trace outside `project`).
    anomalies.extend(duplicate_seq_anomalies(&projected_events));
    anomalies.extend(duplicate_seq_anomalies(&local_events));

    // Step 6: compare replay-engine outputs.
    let local_replay = replay(&local_projection.trace, strict);
    let projected_trace_for_replay = replay_types::TrajectoryTrace {
        schema_version: replay_types::TrajectoryTrace::SCHEMA_VERSION,
        trace_id: request.projected.first().and_then(|r| r.trace_id.clone()).unwrap_or_default(),
        seed: None,
        created_at_ms: request.created_at_ms,
        metadata: None,
        events: request.projected.iter().map(|r| r.event.clone()).collect(),
    };
    let projected_replay = replay(&projected_trace_for_replay, strict);
    if local_replay.deterministic_hash != projected_replay.deterministic_hash {
        anomalies.push(Anomaly {
            code: AnomalyCode::HashMismatch,
            severity: Severity::Error,
            message: "replay_hash: deterministic_hash differs between local and projected replays".to_string(),
            context: AnomalyContext::default(),
            expected: Some(json!(projected_replay.deterministic_hash)),
            observed: Some(json!(local_replay.deterministic_hash)),
        });
    }

    // Step 7: recompute projection_hash for every projected record.
    for record in request.projected {
        if let Ok(recomputed) = projection_hash(&record.event) {
            if recomputed != record.projection_hash {
                anomalies.push(Anomaly {
                    code: AnomalyCode::HashMismatch,
                    severity: Severity::Error,
                    message: format!("seq {}: stored projection_hash does not match recomputation", record.event.seq),
                    context: context_of(&record.event),
                    expected: Some(json!(recomputed)),
                    observed: Some(json!(record.projection_hash)),
                });
            }
        }
    }

    // Step 8: sort by (context.seq, code).
    anomalies.sort_by(|a, b| (a.context.seq, a.code).cmp(&(b.context.seq, b.code)));

    let local_event_count = local_events.len() as u32;
    let projected_event_count = projected_events.len() as u32;
    let mismatch_count = anomalies.len() as u32;
    // Step 9: match_rate.
    let denom = local_event_count.max(projected_event_count).max(1) as f64;
    let match_rate = (1.0 - mismatch_count as f64 / denom).max(0.0);

    let status = if anomalies.is_empty() { ComparisonStatus::Clean } else { ComparisonStatus::Mismatched };
    let task_ids: Vec<String> = projected_events
        .iter()
        .filter_map(|e| e.task_pda.clone())
        .chain(local_events.iter().filter_map(|e| e.task_pda.clone()))
        .collect::<std::collections::BTreeSet<_>>()
        .into_iter()
        .collect();
    let dispute_ids: Vec<String> = request
        .projected
        .iter()
        .filter_map(|r| r.dispute_id.clone())
        .collect::<std::collections::BTreeSet<_>>()
        .into_iter()
        .collect();

    let result = ComparisonResult {
        strictness: request.strictness,
        status,
        duration_ms: start.elapsed().as_millis() as u64,
        local_event_count,
        projected_event_count,
        mismatch_count,
        match_rate,
        anomalies,
        task_ids,
        dispute_ids,
        local_replay,
        projected_replay,
    };

    emit_telemetry(&result, request.metrics, request.alerts);

    // Step 10.
    if strict && !result.anomalies.is_empty() {
        return Err(Error::ComparisonFailed(Box::new(result)));
    }
    Ok(result)
}

fn context_of(event: &TimelineEvent) -> AnomalyContext {
    AnomalyContext {
        seq: Some(event.seq),
        task_pda: event.task_pda.clone(),
        dispute_pda: None,
    }
}

fn duplicate_seq_anomalies(events: &[&TimelineEvent]) -> Vec<Anomaly> {
    let mut seen = BTreeMap::new();
    let mut out = Vec::new();
    for event in events {
        let count = seen.entry(event.seq).or_insert(0u32);
        *count += 1;
        if *count == 2 {
            out.push(Anomaly {
                code: AnomalyCode::DuplicateSequence,
                severity: Severity::Error,
                message: format!("seq {} appears more than once on one side", event.seq),
                context: context_of(event),
                expected: None,
                observed: None,
            });
        }
    }
    out
}

fn emit_telemetry(result: &ComparisonResult, metrics: Option<&dyn MetricsProvider>, alerts: Option<&dyn AlertDispatcher>) {
    if let Some(metrics) = metrics {
        let mut labels = BTreeMap::new();
        labels.insert("strictness".to_string(), format!("{:?}", result.strictness).to_lowercase());
        metrics.counter("replay.compare.total", 1, &labels);
        metrics.counter(
            "replay.compare.clean",
            u64::from(result.status == ComparisonStatus::Clean),
            &labels,
        );
        metrics.counter("replay.compare.mismatches", u64::from(result.mismatch_count), &labels);
        metrics.histogram("replay.compare.duration_ms", result.duration_ms as f64, &labels);
        for anomaly in &result.anomalies {
            let mut code_labels = labels.clone();
            code_labels.insert("code".to_string(), anomaly.code.to_string());
            metrics.counter("replay.compare.anomaly", 1, &code_labels);
        }
    }
    if let Some(alerts) = alerts {
        for anomaly in &result.anomalies {
            alerts.emit(ReplayAlertContext {
                code: anomaly.code,
                severity: anomaly.severity,
                kind: format!("replay.compare.{}", anomaly.code),
                message: anomaly.message.clone(),
                source_event_name: None,
                signature: None,
                task_pda: anomaly.context.task_pda.clone(),
                dispute_pda: anomaly.context.dispute_pda.clone(),
                trace_id: None,
                source_event_sequence: anomaly.context.seq,
                slot: None,
                metadata: json!({"expected": anomaly.expected, "observed": anomaly.observed}),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(name: &str, slot: i64, sig: &str) -> RawProjectionInput {
        RawProjectionInput {
            event_name: name.to_string(),
            slot,
            signature: sig.to_string(),
            source_event_sequence: Some(0),
            timestamp_ms: Some(0),
            event: json!({"task_pda": "task1"}),
        }
    }

    fn projected_records(events: &[RawProjectionInput]) -> Vec<TimelineRecord> {
        let result = project(events, &ProjectOpts::default());
        result
            .events
            .iter()
            .map(|e| TimelineRecord {
                event: e.clone(),
                projection_hash: projection_hash(e).unwrap(),
                dispute_id: None,
                trace_id: None,
                trace_span_id: None,
                trace_parent_span_id: None,
                trace_sampled: None,
            })
            .collect()
    }

    #[test]
    fn identical_sides_compare_clean() {
        let events = vec![raw("taskCreated", 1, "a"), raw("taskClaimed", 2, "b")];
        let records = projected_records(&events);
        let request = CompareRequest {
            projected: &records,
            local: &events,
            strictness: Strictness::Strict,
            query_dsl: None,
            metrics: None,
            alerts: None,
            created_at_ms: 0,
        };
        let result = compare(request).unwrap();
        assert_eq!(result.status, ComparisonStatus::Clean);
        assert!(result.anomalies.is_empty());
        assert_eq!(result.match_rate, 1.0);
    }

    #[test]
    fn missing_local_event_is_an_error_anomaly() {
        let events = vec![raw("taskCreated", 1, "a"), raw("taskClaimed", 2, "b")];
        let records = projected_records(&events);
        let local = vec![events[0].clone()];
        let request = CompareRequest {
            projected: &records,
            local: &local,
            strictness: Strictness::Lenient,
            query_dsl: None,
            metrics: None,
            alerts: None,
            created_at_ms: 0,
        };
        let result = compare(request).unwrap();
        assert_eq!(result.status, ComparisonStatus::Mismatched);
        assert!(result.anomalies.iter().any(|a| a.code == AnomalyCode::MissingEvent));
    }

    #[test]
    fn strict_mode_raises_on_mismatch() {
        let events = vec![raw("taskCreated", 1, "a")];
        let records = projected_records(&events);
        let local: Vec<RawProjectionInput> = vec![];
        let request = CompareRequest {
            projected: &records,
            local: &local,
            strictness: Strictness::Strict,
            query_dsl: None,
            metrics: None,
            alerts: None,
            created_at_ms: 0,
        };
        let err = compare(request).unwrap_err();
        assert!(matches!(err, Error::ComparisonFailed(_)));
    }

    #[test]
    fn dsl_filter_excludes_unmatched_events() {
        let events = vec![raw("taskCreated", 1, "a"), raw("taskClaimed", 2, "b")];
        let records = projected_records(&events);
        let request = CompareRequest {
            projected: &records,
            local: &events,
            strictness: Strictness::Lenient,
            query_dsl: Some("slot_from=2"),
            metrics: None,
            alerts: None,
            created_at_ms: 0,
        };
        let result = compare(request).unwrap();
        assert_eq!(result.local_event_count, 1);
        assert_eq!(result.projected_event_count, 1);
    }

    #[test]
    fn invalid_dsl_key_is_rejected() {
        let events = vec![raw("taskCreated", 1, "a")];
        let records = projected_records(&events);
        let request = CompareRequest {
            projected: &records,
            local: &events,
            strictness: Strictness::Lenient,
            query_dsl: Some("bogus=1"),
            metrics: None,
            alerts: None,
            created_at_ms: 0,
        };
        let err = compare(request).unwrap_err();
        assert!(matches!(err, Error::InvalidQuery(_)));
    }

    #[test]
    fn stored_projection_hash_tamper_is_detected() {
        let events = vec![raw("taskCreated", 1, "a")];
        let mut records = projected_records(&events);
        records[0].projection_hash = "deadbeef".to_string();
        let request = CompareRequest {
            projected: &records,
            local: &events,
            strictness: Strictness::Lenient,
            query_dsl: None,
            metrics: None,
            alerts: None,
            created_at_ms: 0,
        };
        let result = compare(request).unwrap();
        assert!(result.anomalies.iter().any(|a| a.code == AnomalyCode::HashMismatch));
    }
}
