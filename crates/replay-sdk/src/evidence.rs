//! Incident summarisation and the evidence-pack builder (spec §4.G).

use crate::error::{Error, Result};
use crate::query_dsl::Filter;
use replay_core::{canonical_hash, canonical_json, fold_hashes, sha256_hex};
use replay_engine::replay;
use replay_types::{
    EvidenceManifest, EvidencePack, IncidentNarrative, IncidentSummary, IncidentValidation, PackValidation,
    RedactionPolicy, TimelineEvent, TimelineRecord, TrajectoryTrace,
};
use serde_json::{json, Value};
use std::collections::BTreeMap;

/// `summarise_incident(records, filters)` (spec §4.G): deterministic counts
/// by source event type/name/trace_id, sorted unique ids, and the event
/// list this summary was built over.
pub fn summarise_incident(records: &[TimelineRecord], filters: Option<&str>) -> Result<IncidentSummary> {
    let filter = match filters {
        Some(dsl) => Filter::parse(dsl)?,
        None => Filter::default(),
    };
    let mut summary = IncidentSummary::default();
    let mut task_ids = std::collections::BTreeSet::new();
    let mut dispute_ids = std::collections::BTreeSet::new();

    for record in records {
        if !filter.matches_event(&record.event) {
            continue;
        }
        let family = format!("{:?}", record.event.type_.family()).to_lowercase();
        *summary.by_source_event_type.entry(family).or_insert(0) += 1;
        *summary.by_source_event_name.entry(record.event.source_event_name.clone()).or_insert(0) += 1;
        if let Some(trace_id) = &record.trace_id {
            *summary.by_trace_id.entry(trace_id.clone()).or_insert(0) += 1;
        }
        if let Some(pda) = &record.event.task_pda {
            task_ids.insert(pda.clone());
        }
        if let Some(id) = &record.dispute_id {
            dispute_ids.insert(id.clone());
        }
        summary.event_count += 1;
    }

    summary.task_ids = task_ids.into_iter().collect();
    summary.dispute_ids = dispute_ids.into_iter().collect();
    Ok(summary)
}

/// `validate_incident(records, strict)` (spec §4.G): runs the replay
/// engine over the records' trace and returns a validation with sorted
/// errors/warnings and a stable deterministic hash.
pub fn validate_incident(records: &[TimelineRecord], strict: bool) -> IncidentValidation {
    let trace = trace_of(records);
    let result = replay(&trace, strict);
    let mut errors = result.errors;
    let mut warnings = result.warnings;
    errors.sort();
    warnings.sort();
    let deterministic_hash = canonical_hash(&json!({"errors": errors, "warnings": warnings}));
    IncidentValidation {
        errors,
        warnings,
        deterministic_hash,
    }
}

/// `build_narrative(events, validation)` (spec §4.G): the first 100 events
/// rendered as `seq/slot/sig: name (type) | anomaly:<id>`, followed by one
/// `validation:<msg>` line per error/warning.
pub fn build_narrative(events: &[TimelineEvent], validation: &IncidentValidation) -> IncidentNarrative {
    let mut lines = Vec::new();
    let mut anomaly_ids = Vec::new();

    for event in events.iter().take(100) {
        let anomaly_id = format!("{}/{}/{}", event.seq, event.slot, event.signature);
        lines.push(format!(
            "{anomaly_id}: {} ({}) | anomaly:{anomaly_id}",
            event.source_event_name, event.type_
        ));
        anomaly_ids.push(anomaly_id);
    }
    for error in &validation.errors {
        lines.push(format!("validation:{error}"));
    }
    for warning in &validation.warnings {
        lines.push(format!("validation:{warning}"));
    }

    let deterministic_hash = fold_hashes(lines.iter().map(String::as_str).collect::<Vec<_>>());
    IncidentNarrative {
        lines,
        anomaly_ids,
        deterministic_hash,
    }
}

/// Inputs to [`build_evidence_pack`].
pub struct EvidencePackRequest<'a> {
    pub case_data: Value,
    pub events: &'a [TimelineEvent],
    pub query: &'a str,
    pub sealed: bool,
    pub redaction_policy: Option<&'a RedactionPolicy>,
    pub seed: Option<u64>,
    pub timestamp: i64,
    pub runtime_version: &'a str,
    pub schema_hash: &'a str,
    pub tool_fingerprint: &'a str,
}

/// `build_evidence_pack({case_data, events, query, sealed?,
/// redaction_policy?, seed?, timestamp?})` (spec §4.G / §6.5).
pub fn build_evidence_pack(request: EvidencePackRequest<'_>) -> Result<EvidencePack> {
    let redaction = request.redaction_policy;
    let case = match redaction {
        Some(policy) if request.sealed => redact(&request.case_data, policy),
        _ => request.case_data,
    };

    let events: Vec<Value> = request
        .events
        .iter()
        .map(|e| {
            let value = serde_json::to_value(e)?;
            let value = match redaction {
                Some(policy) if request.sealed => redact(&value, policy),
                _ => value,
            };
            Ok(value)
        })
        .collect::<std::result::Result<_, serde_json::Error>>()?;

    let slots: Vec<u64> = request.events.iter().map(|e| e.slot).collect();
    let slot_cursor = (
        slots.iter().copied().min().unwrap_or(0),
        slots.iter().copied().max().unwrap_or(0),
    );

    let case_hash = canonical_hash(&case);
    let events_hash = fold_hashes(events.iter().map(canonical_json).collect::<Vec<_>>().iter().map(String::as_str));
    let query_hash = sha256_hex(request.query.as_bytes());

    let manifest = EvidenceManifest {
        schema_version: EvidenceManifest::SCHEMA_VERSION,
        seed: request.seed,
        query_hash,
        slot_cursor,
        runtime_version: request.runtime_version.to_string(),
        schema_hash: request.schema_hash.to_string(),
        tool_fingerprint: request.tool_fingerprint.to_string(),
        sealed: request.sealed,
        timestamp: request.timestamp,
        case_hash,
        events_hash,
    };

    Ok(EvidencePack { manifest, case, events })
}

/// `verify_pack(pack)` (spec §4.G): recompute the case and events hashes
/// and compare them against the manifest.
pub fn verify_pack(pack: &EvidencePack) -> PackValidation {
    let mut errors = Vec::new();
    let case_hash = canonical_hash(&pack.case);
    if case_hash != pack.manifest.case_hash {
        errors.push(format!(
            "case_hash mismatch: manifest has {}, recomputed {}",
            pack.manifest.case_hash, case_hash
        ));
    }
    let events_hash = fold_hashes(pack.events.iter().map(canonical_json).collect::<Vec<_>>().iter().map(String::as_str));
    if events_hash != pack.manifest.events_hash {
        errors.push(format!(
            "events_hash mismatch: manifest has {}, recomputed {}",
            pack.manifest.events_hash, events_hash
        ));
    }
    PackValidation {
        valid: errors.is_empty(),
        errors,
    }
}

fn trace_of(records: &[TimelineRecord]) -> TrajectoryTrace {
    TrajectoryTrace {
        schema_version: TrajectoryTrace::SCHEMA_VERSION,
        trace_id: records.first().and_then(|r| r.trace_id.clone()).unwrap_or_default(),
        seed: None,
        created_at_ms: 0,
        metadata: None,
        events: records.iter().map(|r| r.event.clone()).collect(),
    }
}

/// Apply a redaction policy (spec §4.G): remove named fields, mask named
/// fields (replace value with `"***"`), truncate actor-like keys, and
/// optionally hash signatures. Applied recursively so it works whether the
/// field appears at the top level or nested under `payload.onchain`.
fn redact(value: &Value, policy: &RedactionPolicy) -> Value {
    match value {
        Value::Object(map) => {
            let mut out = serde_json::Map::new();
            for (k, v) in map {
                if policy.remove_fields.contains(k) {
                    continue;
                }
                if policy.mask_fields.contains(k) {
                    out.insert(k.clone(), json!("***"));
                    continue;
                }
                if policy.hash_signatures && k == "signature" {
                    if let Some(sig) = v.as_str() {
                        out.insert(k.clone(), json!(sha256_hex(sig.as_bytes())));
                        continue;
                    }
                }
                if let Some(max) = policy.truncate_actor_keys {
                    if (k == "actor" || k == "wallet") && v.as_str().is_some() {
                        out.insert(k.clone(), json!(replay_types::truncate(v.as_str().unwrap(), max)));
                        continue;
                    }
                }
                out.insert(k.clone(), redact(v, policy));
            }
            Value::Object(out)
        }
        Value::Array(items) => Value::Array(items.iter().map(|v| redact(v, policy)).collect()),
        other => other.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use replay_engine::{project, projection_hash, ProjectOpts};
    use replay_types::RawProjectionInput;

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

    fn records() -> Vec<TimelineRecord> {
        let events = vec![raw("taskCreated", 1, "a"), raw("taskClaimed", 2, "b")];
        let result = project(&events, &ProjectOpts::default());
        result
            .events
            .iter()
            .map(|e| TimelineRecord {
                event: e.clone(),
                projection_hash: projection_hash(e).unwrap(),
                dispute_id: None,
                trace_id: Some("trace1".to_string()),
                trace_span_id: None,
                trace_parent_span_id: None,
                trace_sampled: None,
            })
            .collect()
    }

    #[test]
    fn summary_counts_events_by_name() {
        let summary = summarise_incident(&records(), None).unwrap();
        assert_eq!(summary.event_count, 2);
        assert_eq!(summary.task_ids, vec!["task1".to_string()]);
    }

    #[test]
    fn narrative_includes_one_line_per_event_and_validation_message() {
        let recs = records();
        let validation = validate_incident(&recs, true);
        let events: Vec<_> = recs.iter().map(|r| r.event.clone()).collect();
        let narrative = build_narrative(&events, &validation);
        assert_eq!(narrative.anomaly_ids.len(), 2);
        assert_eq!(narrative.lines.len(), 2 + validation.errors.len() + validation.warnings.len());
    }

    #[test]
    fn evidence_pack_round_trips_through_verify() {
        let recs = records();
        let events: Vec<_> = recs.iter().map(|r| r.event.clone()).collect();
        let pack = build_evidence_pack(EvidencePackRequest {
            case_data: json!({"incident": "test"}),
            events: &events,
            query: "task_pda=task1",
            sealed: false,
            redaction_policy: None,
            seed: Some(1),
            timestamp: 0,
            runtime_version: "0.1.0",
            schema_hash: "schema-hash",
            tool_fingerprint: "fingerprint",
        })
        .unwrap();
        let validation = verify_pack(&pack);
        assert!(validation.valid);
    }

    #[test]
    fn mutated_pack_fails_verification() {
        let recs = records();
        let events: Vec<_> = recs.iter().map(|r| r.event.clone()).collect();
        let mut pack = build_evidence_pack(EvidencePackRequest {
            case_data: json!({"incident": "test"}),
            events: &events,
            query: "",
            sealed: false,
            redaction_policy: None,
            seed: None,
            timestamp: 0,
            runtime_version: "0.1.0",
            schema_hash: "schema-hash",
            tool_fingerprint: "fingerprint",
        })
        .unwrap();
        pack.events.push(json!({"tampered": true}));
        let validation = verify_pack(&pack);
        assert!(!validation.valid);
    }

    #[test]
    fn sealing_masks_configured_fields() {
        let policy = RedactionPolicy {
            remove_fields: vec![],
            mask_fields: vec!["secret".to_string()],
            truncate_actor_keys: None,
            hash_signatures: false,
        };
        let redacted = redact(&json!({"secret": "value", "keep": "value"}), &policy);
        assert_eq!(redacted["secret"], json!("***"));
        assert_eq!(redacted["keep"], json!("value"));
    }
}
