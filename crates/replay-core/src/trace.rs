//! Deterministic trace/span id derivation and sampling (spec §4.B.2).
//!
//! Trace ids are derived from the anchoring `(slot, signature, event_name,
//! source_event_sequence)` tuple rather than generated randomly, so that
//! replaying the same raw input twice always produces the same trace.

use crate::hash::sha256_hex;

/// Derive a stable 32-character trace id from the fields that anchor an
/// event to its source transaction.
pub fn derive_trace_id(slot: u64, signature: &str, event_name: &str, source_event_sequence: u32) -> String {
    let seed = format!("{slot}\x1f{signature}\x1f{event_name}\x1f{source_event_sequence}");
    sha256_hex(seed.as_bytes())[..32].to_string()
}

/// Derive a stable 16-character span id for the `seq`-th event within a
/// trace.
pub fn derive_span_id(trace_id: &str, seq: u32) -> String {
    let seed = format!("{trace_id}\x1f{seq}");
    sha256_hex(seed.as_bytes())[..16].to_string()
}

/// Deterministically decide whether a trace is sampled, given a rate in
/// `[0.0, 1.0]`. The decision depends only on `trace_id`, so the same trace
/// is always sampled (or not) regardless of replay order.
pub fn is_sampled(trace_id: &str, sample_rate: f64) -> bool {
    if sample_rate >= 1.0 {
        return true;
    }
    if sample_rate <= 0.0 {
        return false;
    }
    let digest = sha256_hex(trace_id.as_bytes());
    let prefix = &digest[..16];
    let bucket = u64::from_str_radix(prefix, 16).unwrap_or(0);
    (bucket as f64 / u64::MAX as f64) < sample_rate
}
