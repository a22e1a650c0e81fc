//! Re-export of the text query DSL (spec §6.4). Parsing lives in
//! `replay-runtime` because the comparison service is its primary
//! consumer; this module re-exports it so incident/evidence code and tool
//! envelopes can share one parser without a circular dependency.

pub use replay_runtime::Filter;
