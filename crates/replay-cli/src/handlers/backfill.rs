use anyhow::Result;
use replay_index::FileStore;
use replay_providers::FileFetcher;
use replay_runtime::CancellationToken;
use replay_sdk::{resolve_actor, Client, ToolOutcome};
use replay_types::ToolErrorResponse;
use serde_json::json;
use std::path::PathBuf;

pub struct BackfillArgs {
    pub events: PathBuf,
    pub to_slot: u64,
    pub page_size: usize,
    pub current_slot: Option<u64>,
    pub actor: Option<String>,
}

pub async fn handle(client: &Client<FileStore>, args: BackfillArgs) -> Result<(serde_json::Value, std::result::Result<ToolOutcome, ToolErrorResponse>)> {
    let fetcher = FileFetcher::new(&args.events);
    let actor = resolve_actor(args.actor.as_deref(), None);
    let params = json!({"events": args.events, "to_slot": args.to_slot, "page_size": args.page_size});
    let outcome = client
        .backfill(actor, &fetcher, args.to_slot, args.page_size, args.current_slot, CancellationToken::new())
        .await;
    Ok((params, outcome))
}
