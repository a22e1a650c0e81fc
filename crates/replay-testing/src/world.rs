//! TestWorld pattern for declarative CLI integration test setup.
//!
//! Provides a fluent interface for creating an isolated data directory,
//! writing JSONL event fixtures into it, and running the `replay` binary
//! against it.

use anyhow::Result;
use assert_cmd::Command;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Builder for constructing a [`TestWorld`] with fine-grained control.
///
/// # Example
/// ```no_run
/// use replay_testing::TestWorld;
///
/// let world = TestWorld::builder().build();
/// assert!(world.data_dir().exists());
/// ```
pub struct TestWorldBuilder {
    env_vars: HashMap<String, String>,
}

impl TestWorldBuilder {
    pub fn new() -> Self {
        Self { env_vars: HashMap::new() }
    }

    /// Set an environment variable for CLI execution (e.g. a policy override
    /// such as `REPLAY_MAX_CONCURRENT_JOBS`).
    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env_vars.insert(key.into(), value.into());
        self
    }

    pub fn build(self) -> TestWorld {
        let temp_dir = TempDir::new().expect("failed to create temp dir");
        let data_dir = temp_dir.path().join(".replayspine");
        fs::create_dir_all(&data_dir).expect("failed to create data dir");

        TestWorld { temp_dir, data_dir, env_vars: self.env_vars }
    }
}

impl Default for TestWorldBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Declarative test environment for exercising the `replay` binary end to
/// end: an isolated data directory plus JSONL event-source fixtures.
///
/// # Example
/// ```no_run
/// use replay_testing::TestWorld;
///
/// let world = TestWorld::new();
/// let events = world.write_events_file("events.jsonl", &[]).unwrap();
/// let result = world.run(&["backfill", "--events", events.to_str().unwrap(), "--to-slot", "0"]).unwrap();
/// assert!(result.success());
/// ```
pub struct TestWorld {
    temp_dir: TempDir,
    data_dir: PathBuf,
    env_vars: HashMap<String, String>,
}

impl Default for TestWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl TestWorld {
    pub fn builder() -> TestWorldBuilder {
        TestWorldBuilder::new()
    }

    pub fn new() -> Self {
        Self::builder().build()
    }

    /// The `--data-dir` this world points the CLI at.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// The temp directory root (scratch space for event-source files).
    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Set an environment variable for subsequent `run()` calls.
    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env_vars.insert(key.into(), value.into());
        self
    }

    /// Write a JSONL event-source file (one [`replay_types::RawProjectionInput`]
    /// per line) under the world's root and return its path, for use as a
    /// `backfill`/`compare` `--events`/`--local` argument.
    pub fn write_events_file(&self, name: &str, events: &[replay_types::RawProjectionInput]) -> Result<PathBuf> {
        let path = self.temp_dir.path().join(name);
        let mut body = String::new();
        for event in events {
            body.push_str(&serde_json::to_string(event)?);
            body.push('\n');
        }
        fs::write(&path, body)?;
        Ok(path)
    }

    /// Configure a CLI command with this test environment's data dir and env vars.
    pub fn configure_command<'a>(&self, cmd: &'a mut Command) -> &'a mut Command {
        cmd.arg("--data-dir").arg(&self.data_dir).arg("--format").arg("json");
        for (key, value) in &self.env_vars {
            cmd.env(key, value);
        }
        cmd
    }

    /// Run the `replay` binary with `args`, configured for this environment.
    pub fn run(&self, args: &[&str]) -> Result<CliResult> {
        let mut cmd = Command::cargo_bin("replay").map_err(|e| anyhow::anyhow!("failed to find replay binary: {e}"))?;
        self.configure_command(&mut cmd);
        cmd.args(args);
        let output = cmd.output()?;
        Ok(CliResult {
            status: output.status,
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        })
    }
}

/// Result of a CLI command execution.
#[derive(Debug)]
pub struct CliResult {
    pub status: std::process::ExitStatus,
    pub stdout: String,
    pub stderr: String,
}

impl CliResult {
    pub fn success(&self) -> bool {
        self.status.success()
    }

    pub fn json(&self) -> Result<serde_json::Value> {
        Ok(serde_json::from_str(&self.stdout)?)
    }

    pub fn stdout(&self) -> &str {
        &self.stdout
    }

    pub fn stderr(&self) -> &str {
        &self.stderr
    }
}
