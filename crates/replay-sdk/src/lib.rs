//! replay-sdk: the public facade over the replayspine runtime.
//!
//! # Overview
//!
//! `replay-sdk` wraps a [`replay_index::TimelineStore`] and the
//! `replay-runtime` backfill/comparison services behind a single
//! [`Client`], guarded by the tool policy envelope (spec §4.H): identity
//! checks, a global concurrency gate, slot-window and event-count limits,
//! cancellation/timeout racing, section filtering and redaction, and audit
//! recording are applied uniformly to every tool call.
//!
//! It also exposes the incident/evidence-pack builder (spec §4.G) for
//! tools that need to summarise and seal a set of records without going
//! through a full tool invocation, and re-exports the query DSL parser.
//!
//! # Quickstart
//!
//! ```no_run
//! use replay_sdk::Client;
//! use replay_core::EnvelopePolicy;
//! use replay_index::MemoryStore;
//! use replay_runtime::CancellationToken;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let client = Client::new(MemoryStore::default(), EnvelopePolicy::from_env());
//! let outcome = client.status("anonymous".to_string(), CancellationToken::new()).await;
//! # let _ = outcome;
//! # Ok(())
//! # }
//! ```
//!
//! # Architecture
//!
//! This SDK is a facade over:
//! - `replay-types`: domain models shared by every layer
//! - `replay-core`: canonical JSON, hashing, trace derivation, policy
//! - `replay-index`: the append-only timeline store
//! - `replay-providers`: backfill fetcher ports
//! - `replay-engine`: the projection and replay engines
//! - `replay-runtime`: the backfill and comparison services

pub mod client;
pub mod envelope;
pub mod error;
pub mod evidence;
pub mod query_dsl;

pub use client::Client;
pub use envelope::{resolve_actor, AuditRecord, Envelope, SlotWindow, ToolOutcome, ToolRequest};
pub use error::{Error, Result};
pub use evidence::{build_evidence_pack, build_narrative, summarise_incident, validate_incident, verify_pack, EvidencePackRequest};
pub use query_dsl::Filter;
