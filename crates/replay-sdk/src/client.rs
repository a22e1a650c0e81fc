//! The public `Client` facade: one object wrapping a store, an optional
//! fetcher and an [`Envelope`], exposing the four tools (`backfill`,
//! `compare`, `incident`, `status`) as policy-guarded async methods.

use crate::envelope::{AuditRecord, Envelope, SlotWindow, ToolOutcome, ToolRequest};
use crate::error::Result;
use replay_core::EnvelopePolicy;
use replay_index::{TimelineQuery, TimelineStore};
use replay_providers::BackfillFetcher;
use replay_runtime::{
    compare as run_compare, run_backfill, AlertDispatcher, BackfillRequest, CancellationToken, CompareRequest,
    MetricsProvider,
};
use replay_types::{RawProjectionInput, Strictness, ToolErrorResponse};
use serde_json::json;
use tokio::sync::Mutex;

/// Wraps a [`TimelineStore`] behind the tool policy envelope. `S` is the
/// concrete store backend (`MemoryStore`, `FileStore`, or a caller's own);
/// the facade is generic over it rather than boxing so callers keep their
/// store's exact type (and any extra inherent methods) after construction.
pub struct Client<S> {
    store: Mutex<S>,
    envelope: Envelope,
}

impl<S: TimelineStore> Client<S> {
    pub fn new(store: S, policy: EnvelopePolicy) -> Self {
        Self {
            store: Mutex::new(store),
            envelope: Envelope::new(policy),
        }
    }

    pub fn with_audit_sink(mut self, sink: impl Fn(AuditRecord) + Send + Sync + 'static) -> Self {
        self.envelope = self.envelope.with_audit_sink(sink);
        self
    }

    /// Run the backfill tool (spec §4.E) against `fetcher`, appending into
    /// the wrapped store.
    pub async fn backfill(
        &self,
        actor: String,
        fetcher: &dyn BackfillFetcher,
        to_slot: u64,
        page_size: usize,
        current_slot: Option<u64>,
        cancellation: CancellationToken,
    ) -> std::result::Result<ToolOutcome, ToolErrorResponse> {
        let request = ToolRequest {
            command: "backfill",
            schema: "replay.backfill.output.v1",
            actor,
            slot_windows: &[SlotWindow { from_slot: 0, to_slot }],
            current_slot,
            requested_sections: None,
            allowed_sections: &["summary".to_string(), "cursor".to_string()],
            caller_redactions: &[],
            cancellation,
        };
        self.envelope
            .run_tool(request, |token| async move {
                let mut store = self.store.lock().await;
                let outcome = run_backfill(
                    &mut *store,
                    BackfillRequest {
                        to_slot,
                        page_size,
                        fetcher,
                        trace_id: None,
                        sample_rate: None,
                        created_at_ms: 0,
                        cancellation: token,
                    },
                )
                .await
                .map_err(|err| ToolErrorResponse::new("backfill", "replay.backfill.output.v1", replay_types::ErrorCode::BackfillFailed, err.to_string()))?;
                let value = json!({
                    "sections": {
                        "summary": {"processed": outcome.processed, "duplicates": outcome.duplicates},
                        "cursor": outcome.cursor,
                    }
                });
                Ok((value, outcome.processed as usize))
            })
            .await
    }

    /// Run the comparison tool (spec §4.F) between the stored authoritative
    /// trace and a caller-supplied `local` raw event list.
    pub async fn compare(
        &self,
        actor: String,
        query: TimelineQuery,
        local: Vec<RawProjectionInput>,
        strictness: Strictness,
        query_dsl: Option<String>,
        metrics: Option<&dyn MetricsProvider>,
        alerts: Option<&dyn AlertDispatcher>,
        cancellation: CancellationToken,
    ) -> std::result::Result<ToolOutcome, ToolErrorResponse> {
        let from_slot = query.from_slot.unwrap_or(0);
        let to_slot = query.to_slot.unwrap_or(u64::MAX);
        let request = ToolRequest {
            command: "compare",
            schema: "replay.compare.output.v1",
            actor,
            slot_windows: &[SlotWindow { from_slot, to_slot }],
            current_slot: None,
            requested_sections: None,
            allowed_sections: &["summary".to_string(), "anomalies".to_string()],
            caller_redactions: &[],
            cancellation,
        };
        self.envelope
            .run_tool(request, |_token| async move {
                let store = self.store.lock().await;
                let projected = store
                    .query(&query)
                    .map_err(|err| ToolErrorResponse::new("compare", "replay.compare.output.v1", replay_types::ErrorCode::CompareFailed, err.to_string()))?;
                let result = run_compare(CompareRequest {
                    projected: &projected,
                    local: &local,
                    strictness,
                    query_dsl: query_dsl.as_deref(),
                    metrics,
                    alerts,
                    created_at_ms: 0,
                })
                .map_err(|err| ToolErrorResponse::new("compare", "replay.compare.output.v1", replay_types::ErrorCode::CompareFailed, err.to_string()))?;
                let event_count = result.local_event_count.max(result.projected_event_count) as usize;
                let value = json!({
                    "sections": {
                        "summary": {
                            "status": result.status,
                            "match_rate": result.match_rate,
                            "mismatch_count": result.mismatch_count,
                        },
                        "anomalies": result.anomalies,
                    }
                });
                Ok((value, event_count))
            })
            .await
    }

    /// Run the status tool (spec §6.6): event counts and cursor position
    /// for the wrapped store, with no slot-window or event-cap checks
    /// since it reads metadata rather than a bounded event range.
    pub async fn status(&self, actor: String, cancellation: CancellationToken) -> std::result::Result<ToolOutcome, ToolErrorResponse> {
        let request = ToolRequest {
            command: "status",
            schema: "replay.status.output.v1",
            actor,
            slot_windows: &[],
            current_slot: None,
            requested_sections: None,
            allowed_sections: &["summary".to_string()],
            caller_redactions: &[],
            cancellation,
        };
        self.envelope
            .run_tool(request, |_token| async move {
                let store = self.store.lock().await;
                let records = store
                    .query(&TimelineQuery::default())
                    .map_err(|err| ToolErrorResponse::new("status", "replay.status.output.v1", replay_types::ErrorCode::StatusFailed, err.to_string()))?;
                let cursor = store
                    .get_cursor()
                    .map_err(|err| ToolErrorResponse::new("status", "replay.status.output.v1", replay_types::ErrorCode::StatusFailed, err.to_string()))?;
                let value = json!({
                    "sections": {
                        "summary": {"event_count": records.len(), "cursor": cursor},
                    }
                });
                Ok((value, 0usize))
            })
            .await
    }

    /// Run the incident tool (spec §4.G): summarise and validate the
    /// records matching `query`/`dsl`, and optionally seal them into an
    /// evidence pack under the default redaction policy.
    #[allow(clippy::too_many_arguments)]
    pub async fn incident(
        &self,
        actor: String,
        query: TimelineQuery,
        dsl: Option<String>,
        strict: bool,
        seal: bool,
        redaction_policy: Option<replay_types::RedactionPolicy>,
        runtime_version: &str,
        schema_hash: &str,
        tool_fingerprint: &str,
        timestamp: i64,
        cancellation: CancellationToken,
    ) -> std::result::Result<ToolOutcome, ToolErrorResponse> {
        let from_slot = query.from_slot.unwrap_or(0);
        let to_slot = query.to_slot.unwrap_or(u64::MAX);
        let mut allowed_sections = vec!["summary".to_string(), "validation".to_string(), "narrative".to_string()];
        if seal {
            allowed_sections.push("evidence_pack".to_string());
        }
        let request = ToolRequest {
            command: "incident",
            schema: "replay.incident.output.v1",
            actor,
            slot_windows: &[SlotWindow { from_slot, to_slot }],
            current_slot: None,
            requested_sections: None,
            allowed_sections: &allowed_sections,
            caller_redactions: &[],
            cancellation,
        };
        self.envelope
            .run_tool(request, |_token| async move {
                let fail = |msg: String| {
                    ToolErrorResponse::new("incident", "replay.incident.output.v1", replay_types::ErrorCode::IncidentFailed, msg)
                };
                let store = self.store.lock().await;
                let records = store.query(&query).map_err(|err| fail(err.to_string()))?;
                let summary = crate::evidence::summarise_incident(&records, dsl.as_deref()).map_err(|err| fail(err.to_string()))?;
                let validation = crate::evidence::validate_incident(&records, strict);
                let events: Vec<_> = records.iter().map(|r| r.event.clone()).collect();
                let narrative = crate::evidence::build_narrative(&events, &validation);
                let mut sections = json!({
                    "summary": summary,
                    "validation": validation,
                    "narrative": narrative,
                });
                let event_count = records.len();
                if seal {
                    let pack = crate::evidence::build_evidence_pack(crate::evidence::EvidencePackRequest {
                        case_data: json!({"summary": summary, "validation": validation}),
                        events: &events,
                        query: dsl.as_deref().unwrap_or(""),
                        sealed: true,
                        redaction_policy: redaction_policy.as_ref(),
                        seed: None,
                        timestamp,
                        runtime_version,
                        schema_hash,
                        tool_fingerprint,
                    })
                    .map_err(|err| fail(err.to_string()))?;
                    sections["evidence_pack"] = serde_json::to_value(&pack).unwrap_or(serde_json::Value::Null);
                }
                Ok((json!({"sections": sections}), event_count))
            })
            .await
    }

    /// Direct (envelope-free) access to the wrapped store for callers
    /// building their own tool on top.
    pub async fn query(&self, query: &TimelineQuery) -> Result<Vec<replay_types::TimelineRecord>> {
        let store = self.store.lock().await;
        Ok(store.query(query)?)
    }
}
