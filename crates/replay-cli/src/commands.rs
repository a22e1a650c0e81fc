use crate::args::{Cli, Commands};
use crate::context::open_client;
use crate::handlers::{backfill, compare, incident, status};
use crate::presentation::{print_error, print_success};
use anyhow::Result;

const SCHEMAS: [(&str, &str); 4] = [
    ("backfill", "replay.backfill.output.v1"),
    ("compare", "replay.compare.output.v1"),
    ("incident", "replay.incident.output.v1"),
    ("status", "replay.status.output.v1"),
];

fn schema_for(command: &str) -> &'static str {
    SCHEMAS.iter().find(|(c, _)| *c == command).map(|(_, s)| *s).unwrap_or("replay.unknown.output.v1")
}

pub async fn run(cli: Cli) -> Result<()> {
    let client = open_client(&cli.data_dir)?;

    let (command_name, params, outcome) = match cli.command {
        Commands::Backfill { events, to_slot, page_size, current_slot, actor } => {
            let (params, outcome) =
                backfill::handle(&client, backfill::BackfillArgs { events, to_slot, page_size, current_slot, actor }).await?;
            ("backfill", params, outcome)
        }
        Commands::Compare { local, task_pda, dispute_pda, from_slot, to_slot, query, strict, actor } => {
            let (params, outcome) = compare::handle(
                &client,
                compare::CompareArgs { local, task_pda, dispute_pda, from_slot, to_slot, query, strict, actor },
            )
            .await?;
            ("compare", params, outcome)
        }
        Commands::Incident { task_pda, dispute_pda, query, strict, seal, out, actor } => {
            let (params, outcome) =
                incident::handle(&client, incident::IncidentArgs { task_pda, dispute_pda, query, strict, seal, out, actor }).await?;
            ("incident", params, outcome)
        }
        Commands::Status { actor } => {
            let (params, outcome) = status::handle(&client, status::StatusArgs { actor }).await?;
            ("status", params, outcome)
        }
    };

    match outcome {
        Ok(outcome) => {
            print_success(cli.format, command_name, schema_for(command_name), params, &outcome);
            Ok(())
        }
        Err(error) => {
            print_error(cli.format, &error);
            std::process::exit(1);
        }
    }
}
