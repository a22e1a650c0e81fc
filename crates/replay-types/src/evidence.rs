//! Evidence-pack manifest + redaction policy (spec §4.G / §6.5).

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RedactionPolicy {
    #[serde(default)]
    pub remove_fields: Vec<String>,
    #[serde(default)]
    pub mask_fields: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub truncate_actor_keys: Option<usize>,
    #[serde(default)]
    pub hash_signatures: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvidenceManifest {
    pub schema_version: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    pub query_hash: String,
    pub slot_cursor: (u64, u64),
    pub runtime_version: String,
    pub schema_hash: String,
    pub tool_fingerprint: String,
    pub sealed: bool,
    pub timestamp: i64,
    pub case_hash: String,
    pub events_hash: String,
}

impl EvidenceManifest {
    pub const SCHEMA_VERSION: u32 = 1;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvidencePack {
    pub manifest: EvidenceManifest,
    pub case: Value,
    pub events: Vec<Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PackValidation {
    pub valid: bool,
    pub errors: Vec<String>,
}
