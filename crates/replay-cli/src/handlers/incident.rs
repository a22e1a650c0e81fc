use anyhow::{Context, Result};
use replay_core::canonical_json;
use replay_index::{FileStore, TimelineQuery};
use replay_runtime::CancellationToken;
use replay_sdk::{resolve_actor, Client, ToolOutcome};
use replay_types::{RedactionPolicy, ToolErrorResponse};
use serde_json::json;
use std::fs;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

const RUNTIME_VERSION: &str = env!("CARGO_PKG_VERSION");
const SCHEMA_HASH: &str = "replay.incident.output.v1";
const TOOL_FINGERPRINT: &str = "replay-cli";

pub struct IncidentArgs {
    pub task_pda: Option<String>,
    pub dispute_pda: Option<String>,
    pub query: Option<String>,
    pub strict: bool,
    pub seal: bool,
    pub out: Option<PathBuf>,
    pub actor: Option<String>,
}

pub async fn handle(client: &Client<FileStore>, args: IncidentArgs) -> Result<(serde_json::Value, std::result::Result<ToolOutcome, ToolErrorResponse>)> {
    let actor = resolve_actor(args.actor.as_deref(), None);
    let timeline_query = TimelineQuery {
        task_pda: args.task_pda.clone(),
        dispute_pda: args.dispute_pda.clone(),
        from_slot: None,
        to_slot: None,
    };
    let redaction_policy = args.seal.then(default_redaction_policy);
    let timestamp = SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis() as i64;
    let params = json!({"task_pda": args.task_pda, "dispute_pda": args.dispute_pda, "query": args.query, "strict": args.strict, "seal": args.seal});

    let outcome = client
        .incident(
            actor,
            timeline_query,
            args.query.clone(),
            args.strict,
            args.seal,
            redaction_policy,
            RUNTIME_VERSION,
            SCHEMA_HASH,
            TOOL_FINGERPRINT,
            timestamp,
            CancellationToken::new(),
        )
        .await;

    if let (Ok(outcome), Some(out_dir)) = (&outcome, &args.out) {
        if args.seal {
            write_evidence_pack(out_dir, &outcome.result)?;
        }
    }

    Ok((params, outcome))
}

fn default_redaction_policy() -> RedactionPolicy {
    RedactionPolicy {
        remove_fields: vec![],
        mask_fields: vec!["wallet".to_string()],
        truncate_actor_keys: Some(8),
        hash_signatures: true,
    }
}

fn write_evidence_pack(out_dir: &PathBuf, result: &serde_json::Value) -> Result<()> {
    let Some(pack) = result.get("sections").and_then(|s| s.get("evidence_pack")) else {
        return Ok(());
    };
    fs::create_dir_all(out_dir).with_context(|| format!("creating {}", out_dir.display()))?;
    if let Some(manifest) = pack.get("manifest") {
        fs::write(out_dir.join("manifest.json"), serde_json::to_string_pretty(manifest)?)?;
    }
    if let Some(case) = pack.get("case") {
        fs::write(out_dir.join("case.json"), serde_json::to_string_pretty(case)?)?;
    }
    if let Some(events) = pack.get("events").and_then(serde_json::Value::as_array) {
        let lines: Vec<String> = events.iter().map(canonical_json).collect();
        fs::write(out_dir.join("events.jsonl"), lines.join("\n"))?;
    }
    Ok(())
}
