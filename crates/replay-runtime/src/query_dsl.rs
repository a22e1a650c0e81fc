//! The text query DSL (spec §6.4): space-separated `key=value` pairs used
//! to scope a comparison or an evidence-pack query to a slice of events or
//! anomalies.

use crate::error::{Error, Result};
use replay_types::{Anomaly, AnomalyCode, Severity, TimelineEvent};

const RECOGNISED_KEYS: &[&str] = &[
    "task_pda",
    "dispute_pda",
    "event_type",
    "slot_from",
    "slot_to",
    "actor",
    "wallet",
    "anomaly_code",
    "severity",
];

/// A parsed DSL filter. Every field is optional; an absent field imposes no
/// constraint.
#[derive(Debug, Clone, Default)]
pub struct Filter {
    pub task_pda: Option<String>,
    pub dispute_pda: Option<String>,
    pub event_type: Option<String>,
    pub slot_from: Option<u64>,
    pub slot_to: Option<u64>,
    pub actor: Option<String>,
    pub wallet: Option<String>,
    pub anomaly_code: Option<AnomalyCode>,
    pub severity: Option<Severity>,
}

impl Filter {
    /// Parse the DSL text form. `replay.invalid_input` (spec §6.4) is
    /// surfaced as [`Error::InvalidQuery`].
    pub fn parse(dsl: &str) -> Result<Self> {
        let mut filter = Filter::default();
        for pair in dsl.split_whitespace() {
            let (key, value) = pair
                .split_once('=')
                .ok_or_else(|| Error::InvalidQuery(format!("replay.invalid_input: malformed pair `{pair}`")))?;
            if !RECOGNISED_KEYS.contains(&key) {
                return Err(Error::InvalidQuery(format!("replay.invalid_input: unknown key `{key}`")));
            }
            match key {
                "task_pda" => filter.task_pda = Some(value.to_string()),
                "dispute_pda" => filter.dispute_pda = Some(value.to_string()),
                "event_type" => filter.event_type = Some(value.to_string()),
                "actor" => filter.actor = Some(value.to_string()),
                "wallet" => filter.wallet = Some(value.to_string()),
                "slot_from" => {
                    filter.slot_from = Some(value.parse().map_err(|_| {
                        Error::InvalidQuery(format!("replay.invalid_input: `slot_from` is not a slot: {value}"))
                    })?)
                }
                "slot_to" => {
                    filter.slot_to = Some(value.parse().map_err(|_| {
                        Error::InvalidQuery(format!("replay.invalid_input: `slot_to` is not a slot: {value}"))
                    })?)
                }
                "anomaly_code" => filter.anomaly_code = Some(parse_anomaly_code(value)?),
                "severity" => filter.severity = Some(parse_severity(value)?),
                _ => unreachable!("filtered by RECOGNISED_KEYS above"),
            }
        }
        Ok(filter)
    }

    pub fn matches_event(&self, event: &TimelineEvent) -> bool {
        if let Some(pda) = &self.task_pda {
            if event.task_pda.as_deref() != Some(pda.as_str()) {
                return false;
            }
        }
        if let Some(ty) = &self.event_type {
            if event.type_.to_string() != *ty && event.source_event_name != *ty {
                return false;
            }
        }
        if let Some(from) = self.slot_from {
            if event.slot < from {
                return false;
            }
        }
        if let Some(to) = self.slot_to {
            if event.slot > to {
                return false;
            }
        }
        if let Some(dispute) = &self.dispute_pda {
            if !payload_field_equals(&event.payload, "disputeId", dispute) {
                return false;
            }
        }
        if let Some(actor) = &self.actor {
            if !payload_field_equals(&event.payload, "actor", actor) {
                return false;
            }
        }
        if let Some(wallet) = &self.wallet {
            if !payload_field_equals(&event.payload, "wallet", wallet) {
                return false;
            }
        }
        true
    }

    pub fn matches_anomaly(&self, anomaly: &Anomaly) -> bool {
        if let Some(code) = self.anomaly_code {
            if anomaly.code != code {
                return false;
            }
        }
        if let Some(severity) = self.severity {
            if anomaly.severity != severity {
                return false;
            }
        }
        if let Some(pda) = &self.task_pda {
            if anomaly.context.task_pda.as_deref() != Some(pda.as_str()) {
                return false;
            }
        }
        if let Some(pda) = &self.dispute_pda {
            if anomaly.context.dispute_pda.as_deref() != Some(pda.as_str()) {
                return false;
            }
        }
        true
    }
}

fn payload_field_equals(payload: &serde_json::Value, field: &str, expected: &str) -> bool {
    fn walk(value: &serde_json::Value, field: &str, expected: &str) -> bool {
        match value {
            serde_json::Value::Object(map) => {
                if let Some(found) = map.get(field) {
                    if found.as_str() == Some(expected) {
                        return true;
                    }
                }
                map.values().any(|v| walk(v, field, expected))
            }
            serde_json::Value::Array(items) => items.iter().any(|v| walk(v, field, expected)),
            _ => false,
        }
    }
    walk(payload, field, expected)
}

fn parse_anomaly_code(value: &str) -> Result<AnomalyCode> {
    match value {
        "hash_mismatch" => Ok(AnomalyCode::HashMismatch),
        "missing_event" => Ok(AnomalyCode::MissingEvent),
        "unexpected_event" => Ok(AnomalyCode::UnexpectedEvent),
        "type_mismatch" => Ok(AnomalyCode::TypeMismatch),
        "task_id_mismatch" => Ok(AnomalyCode::TaskIdMismatch),
        "duplicate_sequence" => Ok(AnomalyCode::DuplicateSequence),
        "transition_invalid" => Ok(AnomalyCode::TransitionInvalid),
        other => Err(Error::InvalidQuery(format!("replay.invalid_input: unknown anomaly_code `{other}`"))),
    }
}

fn parse_severity(value: &str) -> Result<Severity> {
    match value {
        "error" => Ok(Severity::Error),
        "warning" => Ok(Severity::Warning),
        other => Err(Error::InvalidQuery(format!("replay.invalid_input: unknown severity `{other}`"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_recognised_keys() {
        let filter = Filter::parse("task_pda=task1 slot_from=10 slot_to=20").unwrap();
        assert_eq!(filter.task_pda.as_deref(), Some("task1"));
        assert_eq!(filter.slot_from, Some(10));
        assert_eq!(filter.slot_to, Some(20));
    }

    #[test]
    fn rejects_unknown_key() {
        let err = Filter::parse("bogus=1").unwrap_err();
        assert!(matches!(err, Error::InvalidQuery(_)));
    }

    #[test]
    fn rejects_malformed_pair() {
        let err = Filter::parse("task_pda").unwrap_err();
        assert!(matches!(err, Error::InvalidQuery(_)));
    }

    #[test]
    fn empty_filter_matches_everything() {
        let filter = Filter::default();
        assert!(filter.matches_event(&sample_event()));
    }

    fn sample_event() -> TimelineEvent {
        use replay_types::InternalType;
        TimelineEvent {
            seq: 1,
            type_: InternalType::Discovered,
            task_pda: Some("task1".to_string()),
            timestamp_ms: 0,
            payload: serde_json::json!({"onchain": {"actor": "wallet1"}}),
            slot: 10,
            signature: "sig".to_string(),
            source_event_name: "taskCreated".to_string(),
            source_event_sequence: 0,
        }
    }
}
