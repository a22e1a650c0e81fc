//! Process-wide setup: data directory resolution and store/client
//! construction.

use anyhow::{Context, Result};
use replay_core::EnvelopePolicy;
use replay_index::FileStore;
use replay_sdk::Client;
use std::path::PathBuf;

pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}

pub fn open_client(data_dir: &str) -> Result<Client<FileStore>> {
    let dir = expand_tilde(data_dir);
    let store = FileStore::open(&dir).with_context(|| format!("opening timeline store at {}", dir.display()))?;
    Ok(Client::new(store, EnvelopePolicy::from_env()))
}
