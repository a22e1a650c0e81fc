//! Internal core infrastructure for the replayspine tooling: canonical JSON,
//! content hashing, trace/span derivation, and environment-backed policy.
//! Not intended for direct use.

pub mod canon;
pub mod error;
pub mod hash;
pub mod policy;
pub mod trace;

pub use canon::{canonical_json, canonicalise, canonicalise_value, field_encoding_for, FieldEncoding};
pub use error::{Error, Result};
pub use hash::{canonical_hash, fold_hashes, sha256_hex};
pub use policy::EnvelopePolicy;
pub use trace::{derive_span_id, derive_trace_id, is_sampled};
