use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "replay")]
#[command(about = "Deterministic projection, replay comparison and evidence-pack tooling", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Directory holding the timeline store (events.jsonl + cursor.json).
    #[arg(long, default_value = "~/.replayspine", global = true)]
    pub data_dir: String,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text, global = true)]
    pub format: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum, Debug)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Drain a raw-event fetcher into the timeline store (spec §4.E).
    Backfill {
        /// JSONL file of `RawProjectionInput` records to page through.
        #[arg(long)]
        events: PathBuf,
        #[arg(long)]
        to_slot: u64,
        #[arg(long, default_value_t = 500)]
        page_size: usize,
        #[arg(long)]
        current_slot: Option<u64>,
        #[arg(long)]
        actor: Option<String>,
    },

    /// Diff a locally observed trace against the stored authoritative one
    /// (spec §4.F).
    Compare {
        /// JSONL file of `RawProjectionInput` records observed locally.
        #[arg(long)]
        local: PathBuf,
        #[arg(long)]
        task_pda: Option<String>,
        #[arg(long)]
        dispute_pda: Option<String>,
        #[arg(long)]
        from_slot: Option<u64>,
        #[arg(long)]
        to_slot: Option<u64>,
        /// Query DSL string (spec §6.4), e.g. `task_pda=abc slot_from=10`.
        #[arg(long)]
        query: Option<String>,
        #[arg(long)]
        strict: bool,
        #[arg(long)]
        actor: Option<String>,
    },

    /// Summarise, validate and optionally seal an incident's events into
    /// an evidence pack (spec §4.G).
    Incident {
        #[arg(long)]
        task_pda: Option<String>,
        #[arg(long)]
        dispute_pda: Option<String>,
        #[arg(long)]
        query: Option<String>,
        #[arg(long)]
        strict: bool,
        /// Apply the default redaction policy and write an evidence pack.
        #[arg(long)]
        seal: bool,
        /// Directory to write `manifest.json`/`case.json`/`events.jsonl`
        /// into when `--seal` is set.
        #[arg(long)]
        out: Option<PathBuf>,
        #[arg(long)]
        actor: Option<String>,
    },

    /// Report event counts and cursor position for the timeline store.
    Status {
        #[arg(long)]
        actor: Option<String>,
    },
}
