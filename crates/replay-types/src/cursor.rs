//! Backfill cursor (spec §4.D / §6.2).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cursor {
    pub slot: u64,
    pub signature: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trace_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub span_id: Option<String>,
}

impl Cursor {
    pub fn genesis() -> Self {
        Self {
            slot: 0,
            signature: String::new(),
            event_name: None,
            trace_id: None,
            span_id: None,
        }
    }
}
