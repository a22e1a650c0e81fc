//! The tool policy envelope: the common request lifecycle every tool
//! (`backfill`, `compare`, `incident`, `status`) runs through before and
//! after its body executes — identity resolution, concurrency gating,
//! slot-window/event-count limits, cancellation/timeout racing, section
//! filtering, redaction and audit recording. The body/timeout/cancellation
//! race is a `tokio::select!` with the concurrency-slot permit released by
//! `Drop`.

use replay_core::EnvelopePolicy;
use replay_runtime::CancellationToken;
use replay_types::{ErrorCode, ToolErrorResponse};
use serde_json::Value;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;

/// Who is calling a tool (spec §4.H step 3): `authInfo.clientId`, falling
/// back to `session:<id>`, falling back to `anonymous`.
pub fn resolve_actor(client_id: Option<&str>, session_id: Option<&str>) -> String {
    client_id
        .map(str::to_string)
        .or_else(|| session_id.map(|id| format!("session:{id}")))
        .unwrap_or_else(|| "anonymous".to_string())
}

/// A `(from_slot, to_slot)` window to pre-flight check (spec §4.H step 6).
#[derive(Debug, Clone, Copy)]
pub struct SlotWindow {
    pub from_slot: u64,
    pub to_slot: u64,
}

/// A request to run a tool body under the envelope.
pub struct ToolRequest<'a> {
    pub command: &'static str,
    pub schema: &'static str,
    pub actor: String,
    pub slot_windows: &'a [SlotWindow],
    pub current_slot: Option<u64>,
    pub requested_sections: Option<&'a [String]>,
    pub allowed_sections: &'a [String],
    pub caller_redactions: &'a [String],
    pub cancellation: CancellationToken,
}

/// Outcome of a successful tool run: the result tree after section
/// filtering, redaction and truncation have been applied.
#[derive(Debug, Clone)]
pub struct ToolOutcome {
    pub result: Value,
    pub sections: Vec<String>,
    pub redactions: Vec<String>,
    pub truncated: bool,
    pub truncation_reason: Option<String>,
}

/// Bound on the serialised output size before tool-specific trimming
/// kicks in. Not one of the env-configured policy knobs, so this is a
/// fixed constant rather than something `EnvelopePolicy` carries.
const MAX_PAYLOAD_BYTES: usize = 256 * 1024;

/// A record of one tool invocation (spec §4.H step 5): started on entry,
/// finalised on every exit path (success, failure, cancellation, timeout).
#[derive(Debug, Clone)]
pub struct AuditRecord {
    pub command: String,
    pub actor: String,
    pub outcome: &'static str, // "success" | "failure"
    pub duration_ms: u64,
}

/// The envelope: one instance guards a store/fetcher's tool surface and
/// enforces `max_concurrent_jobs` across every tool invocation made
/// through it.
pub struct Envelope {
    policy: EnvelopePolicy,
    permits: Arc<Semaphore>,
    audit_sink: Option<Box<dyn Fn(AuditRecord) + Send + Sync>>,
}

impl Envelope {
    pub fn new(policy: EnvelopePolicy) -> Self {
        let permits = Arc::new(Semaphore::new(policy.max_concurrent_jobs));
        Self {
            policy,
            permits,
            audit_sink: None,
        }
    }

    pub fn with_audit_sink(mut self, sink: impl Fn(AuditRecord) + Send + Sync + 'static) -> Self {
        self.audit_sink = Some(Box::new(sink));
        self
    }

    pub fn policy(&self) -> &EnvelopePolicy {
        &self.policy
    }

    /// Run `body` under the full envelope lifecycle (spec §4.H steps 3-11).
    /// Step 1 (schema validation) is the caller's responsibility: by the
    /// time a `ToolRequest` exists, its arguments have already been parsed
    /// into a typed struct.
    pub async fn run_tool<F, Fut>(&self, request: ToolRequest<'_>, body: F) -> Result<ToolOutcome, ToolErrorResponse>
    where
        F: FnOnce(CancellationToken) -> Fut,
        Fut: Future<Output = Result<(Value, usize), ToolErrorResponse>>,
    {
        let fail = |code: ErrorCode, message: String| {
            Err(ToolErrorResponse::new(request.command, request.schema, code, message))
        };

        // Step 3: identity.
        if self.policy.actor_is_denied(&request.actor) {
            return fail(ErrorCode::AccessDenied, format!("actor `{}` is denied", request.actor));
        }

        // Step 4: global concurrency gate.
        let Ok(_permit) = self.permits.try_acquire() else {
            return fail(ErrorCode::ConcurrencyLimit, "max_concurrent_jobs reached".to_string());
        };

        // Step 5: audit start.
        let start = Instant::now();

        // Step 6: pre-flight window checks.
        for window in request.slot_windows {
            if window.to_slot < window.from_slot {
                return self.finalise(request.command, &request.actor, start, fail(
                    ErrorCode::SlotWindowExceeded,
                    format!("to_slot {} < from_slot {}", window.to_slot, window.from_slot),
                ));
            }
            if window.to_slot - window.from_slot > self.policy.max_slot_window {
                return self.finalise(request.command, &request.actor, start, fail(
                    ErrorCode::SlotWindowExceeded,
                    format!("window {:?} exceeds max_slot_window", window),
                ));
            }
            if let Some(current) = request.current_slot {
                if current.saturating_sub(window.to_slot) > self.policy.max_slot_window {
                    return self.finalise(request.command, &request.actor, start, fail(
                        ErrorCode::SlotWindowExceeded,
                        "backfill target lags current_slot by more than max_slot_window".to_string(),
                    ));
                }
            }
        }

        // Step 7: race body / timeout / cancellation.
        let outcome = tokio::select! {
            biased;
            _ = request.cancellation.cancelled() => {
                fail(ErrorCode::Cancelled, "cancellation token observed".to_string())
            }
            _ = tokio::time::sleep(self.policy.tool_timeout) => {
                fail(ErrorCode::Timeout, format!("tool exceeded {:?}", self.policy.tool_timeout))
            }
            result = body(request.cancellation.clone()) => {
                match result {
                    Ok((value, event_count)) => {
                        // Step 8: post-flight event cap.
                        if event_count as u64 > self.policy.max_event_count {
                            fail(ErrorCode::EventCapExceeded, format!("{event_count} exceeds max_event_count"))
                        } else {
                            Ok(self.finish(value, &request))
                        }
                    }
                    Err(err) => Err(err),
                }
            }
        };

        self.finalise(request.command, &request.actor, start, outcome)
    }

    fn finalise(
        &self,
        command: &str,
        actor: &str,
        start: Instant,
        outcome: Result<ToolOutcome, ToolErrorResponse>,
    ) -> Result<ToolOutcome, ToolErrorResponse> {
        if self.policy.audit_enabled {
            if let Some(sink) = &self.audit_sink {
                sink(AuditRecord {
                    command: command.to_string(),
                    actor: actor.to_string(),
                    outcome: if outcome.is_ok() { "success" } else { "failure" },
                    duration_ms: start.elapsed().as_millis() as u64,
                });
            }
        }
        outcome
    }

    fn finish(&self, value: Value, request: &ToolRequest<'_>) -> ToolOutcome {
        // Step 9: sections.
        let sections: Vec<String> = match request.requested_sections {
            Some(requested) => requested.iter().filter(|s| request.allowed_sections.contains(s)).cloned().collect(),
            None => request.allowed_sections.to_vec(),
        };
        let nulled = null_out_unselected_sections(value, &sections);

        // Step 10: redaction.
        let mut redactions = self.policy.default_redactions.clone();
        for field in request.caller_redactions {
            if !redactions.contains(field) {
                redactions.push(field.clone());
            }
        }
        let redacted = mask_fields(nulled, &redactions);

        // Step 11: output truncation.
        let serialised = serde_json::to_vec(&redacted).unwrap_or_default();
        if serialised.len() > MAX_PAYLOAD_BYTES {
            let trimmed = trim_heavy_fields(redacted);
            ToolOutcome {
                result: trimmed,
                sections,
                redactions,
                truncated: true,
                truncation_reason: Some(format!("payload exceeded {MAX_PAYLOAD_BYTES} bytes")),
            }
        } else {
            ToolOutcome {
                result: redacted,
                sections,
                redactions,
                truncated: false,
                truncation_reason: None,
            }
        }
    }
}

fn null_out_unselected_sections(value: Value, selected: &[String]) -> Value {
    match value {
        Value::Object(mut map) => {
            if map.contains_key("sections") {
                if let Some(Value::Object(section_map)) = map.get_mut("sections") {
                    for (key, val) in section_map.iter_mut() {
                        if !selected.iter().any(|s| s == key) {
                            *val = Value::Null;
                        }
                    }
                }
            }
            Value::Object(map)
        }
        other => other,
    }
}

/// Mask (to `null`) every leaf whose key name is in `redactions`,
/// recursively, regardless of the value's shape (spec §4.H step 10).
fn mask_fields(value: Value, redactions: &[String]) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(k, v)| {
                    if redactions.contains(&k) {
                        (k, Value::Null)
                    } else {
                        (k, mask_fields(v, redactions))
                    }
                })
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.into_iter().map(|v| mask_fields(v, redactions)).collect()),
        other => other,
    }
}

/// Tool-specific trimmer (spec §4.H step 11): drops nested arrays and
/// truncates string leaves, the same shape of trim `replay-cli`'s console
/// presentation applies when a result is too large to print in full.
fn trim_heavy_fields(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(k, v)| (k, trim_heavy_fields(v)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.into_iter().take(1).map(trim_heavy_fields).collect()),
        Value::String(s) => Value::String(replay_types::truncate(&s, 256)),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn policy(max_concurrent_jobs: usize) -> EnvelopePolicy {
        EnvelopePolicy {
            max_concurrent_jobs,
            ..Default::default()
        }
    }

    #[test]
    fn actor_resolution_falls_back_through_session_to_anonymous() {
        assert_eq!(resolve_actor(Some("client-1"), Some("sess-1")), "client-1");
        assert_eq!(resolve_actor(None, Some("sess-1")), "session:sess-1");
        assert_eq!(resolve_actor(None, None), "anonymous");
    }

    #[tokio::test]
    async fn happy_path_returns_the_body_result() {
        let envelope = Envelope::new(policy(4));
        let request = ToolRequest {
            command: "status",
            schema: "replay.status.output.v1",
            actor: "anonymous".to_string(),
            slot_windows: &[],
            current_slot: None,
            requested_sections: None,
            allowed_sections: &["summary".to_string()],
            caller_redactions: &[],
            cancellation: CancellationToken::new(),
        };
        let outcome = envelope
            .run_tool(request, |_| async { Ok((json!({"sections": {"summary": {"ok": true}}}), 0)) })
            .await
            .unwrap();
        assert!(!outcome.truncated);
    }

    #[tokio::test]
    async fn second_concurrent_request_hits_the_concurrency_limit() {
        let envelope = Envelope::new(policy(1));
        let request = |cancellation: CancellationToken| ToolRequest {
            command: "status",
            schema: "replay.status.output.v1",
            actor: "anonymous".to_string(),
            slot_windows: &[],
            current_slot: None,
            requested_sections: None,
            allowed_sections: &[],
            caller_redactions: &[],
            cancellation,
        };
        let permit = envelope.permits.clone().try_acquire_owned().unwrap();
        let err = envelope
            .run_tool(request(CancellationToken::new()), |_| async { Ok((json!({}), 0)) })
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ConcurrencyLimit);
        assert!(err.retriable);
        drop(permit);
    }

    #[tokio::test]
    async fn cancellation_wins_the_race_over_the_body() {
        let envelope = Envelope::new(policy(4));
        let cancellation = CancellationToken::new();
        cancellation.cancel();
        let request = ToolRequest {
            command: "status",
            schema: "replay.status.output.v1",
            actor: "anonymous".to_string(),
            slot_windows: &[],
            current_slot: None,
            requested_sections: None,
            allowed_sections: &[],
            caller_redactions: &[],
            cancellation,
        };
        let err = envelope
            .run_tool(request, |_| async {
                tokio::time::sleep(Duration::from_secs(10)).await;
                Ok((json!({}), 0))
            })
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::Cancelled);
    }

    #[tokio::test]
    async fn denied_actor_is_rejected_before_acquiring_a_permit() {
        let mut p = policy(4);
        p.denylist = vec!["bad-actor".to_string()];
        let envelope = Envelope::new(p);
        let request = ToolRequest {
            command: "status",
            schema: "replay.status.output.v1",
            actor: "bad-actor".to_string(),
            slot_windows: &[],
            current_slot: None,
            requested_sections: None,
            allowed_sections: &[],
            caller_redactions: &[],
            cancellation: CancellationToken::new(),
        };
        let err = envelope.run_tool(request, |_| async { Ok((json!({}), 0)) }).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::AccessDenied);
    }

    #[tokio::test]
    async fn slot_window_exceeding_the_policy_is_rejected() {
        let mut p = policy(4);
        p.max_slot_window = 10;
        let envelope = Envelope::new(p);
        let request = ToolRequest {
            command: "backfill",
            schema: "replay.backfill.output.v1",
            actor: "anonymous".to_string(),
            slot_windows: &[SlotWindow { from_slot: 0, to_slot: 100 }],
            current_slot: None,
            requested_sections: None,
            allowed_sections: &[],
            caller_redactions: &[],
            cancellation: CancellationToken::new(),
        };
        let err = envelope.run_tool(request, |_| async { Ok((json!({}), 0)) }).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::SlotWindowExceeded);
    }

    #[tokio::test]
    async fn redaction_masks_configured_fields_recursively() {
        let envelope = Envelope::new(policy(4));
        let request = ToolRequest {
            command: "status",
            schema: "replay.status.output.v1",
            actor: "anonymous".to_string(),
            slot_windows: &[],
            current_slot: None,
            requested_sections: None,
            allowed_sections: &[],
            caller_redactions: &["secret".to_string()],
            cancellation: CancellationToken::new(),
        };
        let outcome = envelope
            .run_tool(request, |_| async { Ok((json!({"secret": "value", "keep": 1}), 0)) })
            .await
            .unwrap();
        assert_eq!(outcome.result["secret"], Value::Null);
        assert_eq!(outcome.result["keep"], json!(1));
        assert!(outcome.redactions.contains(&"secret".to_string()));
    }
}
