//! Lifecycle state machines for tasks and disputes (spec §4.B.1). Shared
//! between the projection engine (folds while building the stream) and the
//! replay engine (folds over an already-projected trace).
//!
//! A disallowed transition is never dropped: the caller still applies
//! `next` and emits the event, but records the returned [`Issue`] so the
//! signal survives into telemetry/replay diagnostics.

use replay_types::{DisputeStatus, InternalType, TaskStatus};

#[derive(Debug, Clone)]
pub enum Issue {
    /// Missing prerequisite in the local window (e.g. completion with no
    /// prior discovery). Recorded as a free-text `transition_conflict`.
    Conflict(String),
    /// Strictly impossible against committed state (e.g. a vote after
    /// resolution). Recorded as a structured `transition_violation`.
    Violation { from_state: String, to_state: String },
}

fn task_is_terminal(status: TaskStatus) -> bool {
    matches!(
        status,
        TaskStatus::Completed | TaskStatus::Cancelled | TaskStatus::Disputed | TaskStatus::Failed
    )
}

/// Resolve the next `TaskStatus` for `event`, if the event carries a task
/// lifecycle transition at all. Returns `None` for events that don't touch
/// task state (disputes, agent, protocol, speculation events).
pub fn task_transition(current: TaskStatus, event: InternalType) -> Option<(TaskStatus, Option<Issue>)> {
    let (target, prerequisite): (TaskStatus, &[TaskStatus]) = match event {
        InternalType::Discovered | InternalType::DependentDiscovered => {
            (TaskStatus::Discovered, &[TaskStatus::None])
        }
        InternalType::Claimed => (TaskStatus::Claimed, &[TaskStatus::Discovered]),
        InternalType::Completed => (TaskStatus::Completed, &[TaskStatus::Claimed]),
        InternalType::Cancelled => (
            TaskStatus::Cancelled,
            &[TaskStatus::None, TaskStatus::Discovered, TaskStatus::Claimed],
        ),
        InternalType::DisputeInitiated => (
            TaskStatus::Disputed,
            &[TaskStatus::Claimed, TaskStatus::Completed],
        ),
        _ => return None,
    };

    if prerequisite.contains(&current) {
        return Some((target, None));
    }
    let issue = if task_is_terminal(current) {
        Issue::Violation {
            from_state: current.to_string(),
            to_state: target.to_string(),
        }
    } else {
        Issue::Conflict(format!(
            "{event} expected task state in {prerequisite:?}, found {current}"
        ))
    };
    Some((target, Some(issue)))
}

fn dispute_is_terminal(status: DisputeStatus) -> bool {
    matches!(
        status,
        DisputeStatus::Resolved | DisputeStatus::Expired | DisputeStatus::Cancelled | DisputeStatus::CleanedUp
    )
}

/// Resolve the next `DisputeStatus` for `event`. Returns `None` for events
/// that don't touch dispute state.
pub fn dispute_transition(current: DisputeStatus, event: InternalType) -> Option<(DisputeStatus, Option<Issue>)> {
    let (target, prerequisite): (DisputeStatus, &[DisputeStatus]) = match event {
        InternalType::DisputeInitiated => (DisputeStatus::Initiated, &[DisputeStatus::None]),
        InternalType::DisputeVoteCast => (
            DisputeStatus::VoteCast,
            &[DisputeStatus::Initiated, DisputeStatus::VoteCast],
        ),
        InternalType::DisputeResolved => (
            DisputeStatus::Resolved,
            &[DisputeStatus::Initiated, DisputeStatus::VoteCast],
        ),
        InternalType::DisputeExpired => (
            DisputeStatus::Expired,
            &[DisputeStatus::Initiated, DisputeStatus::VoteCast],
        ),
        InternalType::DisputeCancelled => (
            DisputeStatus::Cancelled,
            &[DisputeStatus::Initiated, DisputeStatus::VoteCast],
        ),
        InternalType::ArbiterVotesCleanedUp => (
            DisputeStatus::CleanedUp,
            &[DisputeStatus::Resolved, DisputeStatus::Expired, DisputeStatus::Cancelled],
        ),
        _ => return None,
    };

    if prerequisite.contains(&current) {
        return Some((target, None));
    }
    let issue = if dispute_is_terminal(current) {
        Issue::Violation {
            from_state: current.to_string(),
            to_state: target.to_string(),
        }
    } else {
        Issue::Conflict(format!(
            "{event} expected dispute state in {prerequisite:?}, found {current}"
        ))
    };
    Some((target, Some(issue)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn task_happy_path() {
        assert_eq!(
            task_transition(TaskStatus::None, InternalType::Discovered).unwrap().0,
            TaskStatus::Discovered
        );
        assert_eq!(
            task_transition(TaskStatus::Discovered, InternalType::Claimed).unwrap().0,
            TaskStatus::Claimed
        );
    }

    #[test]
    fn completion_without_discovery_is_a_conflict_not_a_violation() {
        let (next, issue) = task_transition(TaskStatus::None, InternalType::Completed).unwrap();
        assert_eq!(next, TaskStatus::Completed);
        assert!(matches!(issue, Some(Issue::Conflict(_))));
    }

    #[test]
    fn claim_after_completion_is_a_violation() {
        let (_, issue) = task_transition(TaskStatus::Completed, InternalType::Claimed).unwrap();
        assert!(matches!(issue, Some(Issue::Violation { .. })));
    }

    #[test]
    fn non_task_event_returns_none() {
        assert!(task_transition(TaskStatus::None, InternalType::AgentRegistered).is_none());
    }

    #[test]
    fn dispute_vote_after_resolved_is_a_violation() {
        let (_, issue) = dispute_transition(DisputeStatus::Resolved, InternalType::DisputeVoteCast).unwrap();
        assert!(matches!(issue, Some(Issue::Violation { .. })));
    }

    #[test]
    fn dispute_cleanup_only_legal_from_terminal_states() {
        let (next, issue) =
            dispute_transition(DisputeStatus::Resolved, InternalType::ArbiterVotesCleanedUp).unwrap();
        assert_eq!(next, DisputeStatus::CleanedUp);
        assert!(issue.is_none());

        let (_, issue) =
            dispute_transition(DisputeStatus::Initiated, InternalType::ArbiterVotesCleanedUp).unwrap();
        assert!(issue.is_some());
    }
}
