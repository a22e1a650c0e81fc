//! The seed scenarios (spec §8, S1-S6): shared literal inputs so each
//! crate's tests build the same fixtures without duplicating the literal
//! event lists.

use replay_core::EnvelopePolicy;
use replay_types::RawProjectionInput;
use serde_json::json;

fn raw(name: &str, slot: i64, sig: &str, seq: i64) -> RawProjectionInput {
    RawProjectionInput {
        event_name: name.to_string(),
        slot,
        signature: sig.to_string(),
        source_event_sequence: Some(seq),
        timestamp_ms: Some(0),
        event: json!({"task_pda": "task1"}),
    }
}

/// S1: deterministic three-event happy path.
pub fn scenario_s1() -> Vec<RawProjectionInput> {
    vec![
        raw("taskCreated", 10, "AAA", 0),
        raw("taskClaimed", 10, "AAA", 1),
        raw("taskCompleted", 100, "ZZZ", 0),
    ]
}

/// S2: the same event repeated three times (dedup).
pub fn scenario_s2() -> Vec<RawProjectionInput> {
    let event = raw("taskCreated", 10, "AAA", 0);
    vec![event.clone(), event.clone(), event]
}

/// S3: one event whose name isn't in the taxonomy table.
pub fn scenario_s3() -> Vec<RawProjectionInput> {
    vec![raw("unknownEventFromProgram", 10, "AAA", 0)]
}

/// S4: a completion with no prior creation (transition conflict).
pub fn scenario_s4() -> Vec<RawProjectionInput> {
    vec![raw("taskCompleted", 10, "AAA", 0)]
}

/// S5: the S1 projected trace vs. a local copy with seq=2's type swapped
/// to `taskCompleted` (so the projected/local types disagree at seq 2).
pub fn scenario_s5_local() -> Vec<RawProjectionInput> {
    let mut events = scenario_s1();
    events[1] = raw("taskCompleted", 10, "AAA", 1);
    events
}

/// S6: a policy with `max_concurrent_jobs=1`, for a test that starts two
/// requests simultaneously and expects the second to see
/// `replay.concurrency_limit`.
pub fn scenario_s6_policy() -> EnvelopePolicy {
    EnvelopePolicy {
        max_concurrent_jobs: 1,
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn s2_is_the_same_event_three_times() {
        let events = scenario_s2();
        assert_eq!(events.len(), 3);
        assert_eq!(events[0].signature, events[2].signature);
    }

    #[test]
    fn s5_local_differs_from_s1_only_at_the_second_event() {
        let s1 = scenario_s1();
        let s5 = scenario_s5_local();
        assert_eq!(s1[0].event_name, s5[0].event_name);
        assert_ne!(s1[1].event_name, s5[1].event_name);
        assert_eq!(s1[2].event_name, s5[2].event_name);
    }
}
