//! End-to-end projection/replay coverage for the seed scenarios S1-S4
//! (spec §8), using the fixtures shared across the workspace.

use replay_engine::{project, replay, ProjectOpts};
use replay_testing::fixtures;

fn opts() -> ProjectOpts {
    ProjectOpts { trace_id: Some("trace-1".to_string()), seed: None, sample_rate: Some(1.0), created_at_ms: 0 }
}

#[test]
fn s1_three_events_project_in_order_with_no_drops() {
    let result = project(&fixtures::scenario_s1(), &opts());
    assert_eq!(result.telemetry.projected_events, 3);
    assert_eq!(result.telemetry.duplicates_dropped, 0);
    assert!(result.telemetry.unknown_events.is_empty());
    assert_eq!(result.trace.events.len(), 3);

    let replayed = replay(&result.trace, false);
    assert_eq!(replayed.summary.total_events, 3);
    assert_eq!(replayed.summary.error_count, 0);
}

#[test]
fn s2_duplicate_event_is_deduplicated_to_one() {
    let result = project(&fixtures::scenario_s2(), &opts());
    assert_eq!(result.telemetry.projected_events, 1);
    assert_eq!(result.telemetry.duplicates_dropped, 2);
    assert_eq!(result.trace.events.len(), 1);
}

#[test]
fn s3_unknown_event_name_is_reported_not_dropped_silently() {
    let result = project(&fixtures::scenario_s3(), &opts());
    assert_eq!(result.telemetry.unknown_events.len(), 1);
    assert_eq!(result.telemetry.unknown_events[0], "unknownEventFromProgram");
}

#[test]
fn s4_completion_without_prior_creation_is_a_transition_conflict() {
    let result = project(&fixtures::scenario_s4(), &opts());
    assert!(!result.telemetry.transition_conflicts.is_empty(), "expected a transition conflict for a completion with no prior discovery");
}

#[test]
fn projection_is_deterministic_across_repeated_runs() {
    let a = project(&fixtures::scenario_s1(), &opts());
    let b = project(&fixtures::scenario_s1(), &opts());
    let replayed_a = replay(&a.trace, false);
    let replayed_b = replay(&b.trace, false);
    assert_eq!(replayed_a.deterministic_hash, replayed_b.deterministic_hash);
}
