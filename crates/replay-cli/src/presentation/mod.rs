//! Console presentation: renders a successful [`replay_sdk::ToolOutcome`]
//! into the shared tool envelope shape, and a
//! [`replay_types::ToolErrorResponse`] on failure. Two flat output formats
//! (`text`, `json`) cover it, since every tool here returns one flat
//! result shape rather than a hierarchy of views.

use crate::args::OutputFormat;
use owo_colors::OwoColorize;
use replay_sdk::ToolOutcome;
use replay_types::ToolErrorResponse;
use serde_json::{json, Value};

pub fn print_success(format: OutputFormat, command: &str, schema: &str, command_params: Value, outcome: &ToolOutcome) {
    let envelope = json!({
        "status": "ok",
        "command": command,
        "schema": schema,
        "command_params": command_params,
        "sections": outcome.sections,
        "redactions": outcome.redactions,
        "truncated": outcome.truncated,
        "truncation_reason": outcome.truncation_reason,
        "result": outcome.result,
    });
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&envelope).unwrap()),
        OutputFormat::Text => print_text(command, &envelope),
    }
}

pub fn print_error(format: OutputFormat, error: &ToolErrorResponse) {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(error).unwrap()),
        OutputFormat::Text => {
            eprintln!("{} {}: {}", "error".red().bold(), error.code, error.message);
            if error.retriable {
                eprintln!("  ({})", "retriable".dimmed());
            }
        }
    }
}

fn print_text(command: &str, envelope: &Value) {
    println!("{} {}", command.bold(), "ok".green());
    if let Some(sections) = envelope.get("sections").and_then(Value::as_array) {
        if !sections.is_empty() {
            println!("  sections: {}", sections.iter().filter_map(Value::as_str).collect::<Vec<_>>().join(", "));
        }
    }
    if let Some(result) = envelope.get("result") {
        println!("{}", serde_json::to_string_pretty(result).unwrap());
    }
    if envelope.get("truncated").and_then(Value::as_bool).unwrap_or(false) {
        println!("{}", "(output truncated)".yellow());
    }
}
