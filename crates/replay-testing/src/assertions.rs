//! Custom assertions for replayspine-specific validation.

use anyhow::{bail, Context, Result};
use replay_types::{ComparisonResult, ComparisonStatus, ProjectionResult};

/// Assert that a projection produced exactly `expected` internal-type
/// names, in order (spec S1's `[discovered, claimed, completed]` shape).
pub fn assert_projected_types(result: &ProjectionResult, expected: &[&str]) -> Result<()> {
    let got: Vec<String> = result.events.iter().map(|e| e.type_.to_string()).collect();
    let expected: Vec<String> = expected.iter().map(|s| s.to_string()).collect();
    if got != expected {
        bail!("expected projected types {:?}, got {:?}", expected, got);
    }
    Ok(())
}

/// Assert that a projection's telemetry reports exactly
/// `(projected, duplicates)`.
pub fn assert_projection_counts(result: &ProjectionResult, projected: u32, duplicates: u32) -> Result<()> {
    if result.telemetry.projected_events != projected {
        bail!("expected projected_events={projected}, got {}", result.telemetry.projected_events);
    }
    if result.telemetry.duplicates_dropped != duplicates {
        bail!("expected duplicates_dropped={duplicates}, got {}", result.telemetry.duplicates_dropped);
    }
    Ok(())
}

/// Assert a comparison came back clean with no anomalies (spec P5).
pub fn assert_comparison_clean(result: &ComparisonResult) -> Result<()> {
    if result.status != ComparisonStatus::Clean {
        bail!("expected status=clean, got {:?}", result.status);
    }
    if !result.anomalies.is_empty() {
        bail!("expected no anomalies, got {}", result.anomalies.len());
    }
    Ok(())
}

/// Assert a comparison reported at least one anomaly of `code` at the
/// given `seq` context.
pub fn assert_has_anomaly_at_seq(result: &ComparisonResult, code: replay_types::AnomalyCode, seq: u32) -> Result<()> {
    let found = result.anomalies.iter().any(|a| a.code == code && a.context.seq == Some(seq));
    if !found {
        bail!("expected an anomaly {:?} at seq {seq}, anomalies were: {:?}", code, result.anomalies);
    }
    Ok(())
}

/// Assert that `json` contains the standard tool success envelope keys
/// (spec §6.6): `status="ok"`, `command`, `schema`.
pub fn assert_tool_success_envelope(json: &serde_json::Value, command: &str) -> Result<()> {
    let status = json.get("status").and_then(serde_json::Value::as_str).context("missing `status`")?;
    if status != "ok" {
        bail!("expected status=\"ok\", got {status}");
    }
    let got_command = json.get("command").and_then(serde_json::Value::as_str).context("missing `command`")?;
    if got_command != command {
        bail!("expected command={command}, got {got_command}");
    }
    Ok(())
}
