//! replay: the CLI for the four tools the runtime exposes (spec §6.6) —
//! `backfill`, `compare`, `incident`, `status` — each guarded by the same
//! tool policy envelope an RPC caller would go through.

mod args;
mod commands;
mod context;
mod handlers;
mod presentation;

pub use args::{Cli, Commands, OutputFormat};
pub use commands::run;
