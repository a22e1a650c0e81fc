use anyhow::Result;
use replay_index::FileStore;
use replay_runtime::CancellationToken;
use replay_sdk::{resolve_actor, Client, ToolOutcome};
use replay_types::ToolErrorResponse;
use serde_json::json;

pub struct StatusArgs {
    pub actor: Option<String>,
}

pub async fn handle(client: &Client<FileStore>, args: StatusArgs) -> Result<(serde_json::Value, std::result::Result<ToolOutcome, ToolErrorResponse>)> {
    let actor = resolve_actor(args.actor.as_deref(), None);
    let outcome = client.status(actor, CancellationToken::new()).await;
    Ok((json!({}), outcome))
}
