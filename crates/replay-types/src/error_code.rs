//! The closed error-code set (spec §7). Every layer (engine telemetry, the
//! tool envelope, the CLI) shares this one enum so retriability and wire
//! strings can't drift between layers.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    // Input
    InvalidInput,
    MissingFilter,
    // Policy
    AccessDenied,
    ConcurrencyLimit,
    SlotWindowExceeded,
    EventCapExceeded,
    // Runtime
    Cancelled,
    Timeout,
    ToolError,
    // Operation
    BackfillFailed,
    CompareFailed,
    IncidentFailed,
    StatusFailed,
    OutputValidationFailed,
}

impl ErrorCode {
    /// Wire string, always prefixed `replay.` per spec §7/§6.6.
    pub fn as_str(self) -> &'static str {
        use ErrorCode::*;
        match self {
            InvalidInput => "replay.invalid_input",
            MissingFilter => "replay.missing_filter",
            AccessDenied => "replay.access_denied",
            ConcurrencyLimit => "replay.concurrency_limit",
            SlotWindowExceeded => "replay.slot_window_exceeded",
            EventCapExceeded => "replay.event_cap_exceeded",
            Cancelled => "replay.cancelled",
            Timeout => "replay.timeout",
            ToolError => "replay.tool_error",
            BackfillFailed => "replay.backfill_failed",
            CompareFailed => "replay.compare_failed",
            IncidentFailed => "replay.incident_failed",
            StatusFailed => "replay.status_failed",
            OutputValidationFailed => "replay.output_validation_failed",
        }
    }

    /// Per spec §7: true for `concurrency_limit, cancelled, timeout,
    /// tool_error, <operation>_failed`; false for input/policy violations.
    pub fn retriable(self) -> bool {
        use ErrorCode::*;
        matches!(
            self,
            ConcurrencyLimit
                | Cancelled
                | Timeout
                | ToolError
                | BackfillFailed
                | CompareFailed
                | IncidentFailed
                | StatusFailed
                | OutputValidationFailed
        )
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Shared error envelope shape returned by every tool on failure (spec §4.H
/// final paragraph).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolErrorResponse {
    pub status: &'static str, // always "error"
    pub command: String,
    pub schema: String,
    pub code: ErrorCode,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
    pub retriable: bool,
}

impl ToolErrorResponse {
    pub fn new(command: impl Into<String>, schema: impl Into<String>, code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            status: "error",
            command: command.into(),
            schema: schema.into(),
            code,
            message: message.into(),
            details: None,
            retriable: code.retriable(),
        }
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retriability_matches_spec_table() {
        assert!(!ErrorCode::InvalidInput.retriable());
        assert!(!ErrorCode::AccessDenied.retriable());
        assert!(ErrorCode::ConcurrencyLimit.retriable());
        assert!(ErrorCode::Cancelled.retriable());
        assert!(ErrorCode::Timeout.retriable());
        assert!(ErrorCode::BackfillFailed.retriable());
    }

    #[test]
    fn wire_strings_are_prefixed() {
        assert_eq!(ErrorCode::InvalidInput.as_str(), "replay.invalid_input");
    }
}
