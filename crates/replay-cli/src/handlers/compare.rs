use anyhow::{Context, Result};
use replay_index::{FileStore, TimelineQuery};
use replay_runtime::CancellationToken;
use replay_sdk::{resolve_actor, Client, ToolOutcome};
use replay_types::{RawProjectionInput, Strictness, ToolErrorResponse};
use serde_json::json;
use std::fs;
use std::path::PathBuf;

pub struct CompareArgs {
    pub local: PathBuf,
    pub task_pda: Option<String>,
    pub dispute_pda: Option<String>,
    pub from_slot: Option<u64>,
    pub to_slot: Option<u64>,
    pub query: Option<String>,
    pub strict: bool,
    pub actor: Option<String>,
}

pub async fn handle(client: &Client<FileStore>, args: CompareArgs) -> Result<(serde_json::Value, std::result::Result<ToolOutcome, ToolErrorResponse>)> {
    let local = load_local_events(&args.local)?;
    let actor = resolve_actor(args.actor.as_deref(), None);
    let query = TimelineQuery {
        task_pda: args.task_pda.clone(),
        dispute_pda: args.dispute_pda.clone(),
        from_slot: args.from_slot,
        to_slot: args.to_slot,
    };
    let strictness = if args.strict { Strictness::Strict } else { Strictness::Lenient };
    let params = json!({
        "local": args.local, "task_pda": args.task_pda, "dispute_pda": args.dispute_pda,
        "from_slot": args.from_slot, "to_slot": args.to_slot, "query": args.query, "strict": args.strict,
    });
    let outcome = client
        .compare(actor, query, local, strictness, args.query.clone(), None, None, CancellationToken::new())
        .await;
    Ok((params, outcome))
}

fn load_local_events(path: &PathBuf) -> Result<Vec<RawProjectionInput>> {
    let content = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    content
        .lines()
        .filter(|l| !l.trim().is_empty())
        .map(|l| serde_json::from_str(l).with_context(|| format!("parsing {}", path.display())))
        .collect()
}
