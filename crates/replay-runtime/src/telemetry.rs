//! `MetricsProvider` / `AlertDispatcher` ports (spec §6.3). Both are
//! optional: the comparison and backfill services must function correctly
//! when neither is supplied, so this module also ships a no-op default for
//! each.

use replay_types::ReplayAlertContext;
use std::collections::BTreeMap;

pub trait MetricsProvider: Send + Sync {
    fn counter(&self, name: &str, value: u64, labels: &BTreeMap<String, String>);
    fn histogram(&self, name: &str, value: f64, labels: &BTreeMap<String, String>);
}

pub trait AlertDispatcher: Send + Sync {
    fn emit(&self, context: ReplayAlertContext);
}

/// Discards every metric. Used when no sink is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopMetrics;

impl MetricsProvider for NoopMetrics {
    fn counter(&self, _name: &str, _value: u64, _labels: &BTreeMap<String, String>) {}
    fn histogram(&self, _name: &str, _value: f64, _labels: &BTreeMap<String, String>) {}
}

/// Discards every alert. Used when no dispatcher is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopAlerts;

impl AlertDispatcher for NoopAlerts {
    fn emit(&self, _context: ReplayAlertContext) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn noop_sinks_accept_calls_without_panicking() {
        let metrics = NoopMetrics;
        metrics.counter("x", 1, &BTreeMap::new());
        metrics.histogram("y", 1.0, &BTreeMap::new());

        let alerts = NoopAlerts;
        alerts.emit(ReplayAlertContext {
            code: replay_types::AnomalyCode::HashMismatch,
            severity: replay_types::Severity::Warning,
            kind: "replay.compare".to_string(),
            message: "test".to_string(),
            source_event_name: None,
            signature: None,
            task_pda: None,
            dispute_pda: None,
            trace_id: None,
            source_event_sequence: None,
            slot: None,
            metadata: serde_json::json!({}),
        });
    }
}
