//! The closed event-name taxonomy (spec §3) and its mapping to internal
//! timeline event types (spec §4.B step 4). One static table is the single
//! source of truth for both the "is this name known" check and the
//! name -> internal type mapping, per the "dynamic tag dispatch" design note.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Which of the four (plus speculation) event families a raw event name
/// belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventFamily {
    Task,
    Dispute,
    Agent,
    Protocol,
    Speculation,
}

/// Internal state family a raw event is mapped onto while projecting.
///
/// `Display` renders the wire form used in `TimelineEvent::type_` and in
/// telemetry/anomaly messages (`discovered`, `dispute:vote_cast`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InternalType {
    // task family
    Discovered,
    Claimed,
    Completed,
    Cancelled,
    DependentDiscovered,

    // dispute family
    DisputeInitiated,
    DisputeVoteCast,
    DisputeResolved,
    DisputeExpired,
    DisputeCancelled,
    ArbiterVotesCleanedUp,

    // agent family
    AgentRegistered,
    AgentUpdated,
    AgentDeregistered,
    AgentSuspended,
    AgentUnsuspended,

    // protocol family
    ProtocolInitialized,
    StateUpdated,
    RewardDistributed,
    RateLimitHit,
    MigrationCompleted,
    ProtocolVersionUpdated,
    RateLimitsUpdated,
    ProtocolFeeUpdated,
    ReputationChanged,
    BondDeposited,
    BondLocked,
    BondReleased,
    BondSlashed,
    SpeculativeCommitmentCreated,

    // speculation (bond) family
    SpeculationStarted,
    SpeculationConfirmed,
    SpeculationAborted,
}

impl InternalType {
    pub fn family(self) -> EventFamily {
        use InternalType::*;
        match self {
            Discovered | Claimed | Completed | Cancelled | DependentDiscovered => {
                EventFamily::Task
            }
            DisputeInitiated
            | DisputeVoteCast
            | DisputeResolved
            | DisputeExpired
            | DisputeCancelled
            | ArbiterVotesCleanedUp => EventFamily::Dispute,
            AgentRegistered | AgentUpdated | AgentDeregistered | AgentSuspended
            | AgentUnsuspended => EventFamily::Agent,
            ProtocolInitialized
            | StateUpdated
            | RewardDistributed
            | RateLimitHit
            | MigrationCompleted
            | ProtocolVersionUpdated
            | RateLimitsUpdated
            | ProtocolFeeUpdated
            | ReputationChanged
            | BondDeposited
            | BondLocked
            | BondReleased
            | BondSlashed
            | SpeculativeCommitmentCreated => EventFamily::Protocol,
            SpeculationStarted | SpeculationConfirmed | SpeculationAborted => {
                EventFamily::Speculation
            }
        }
    }
}

impl fmt::Display for InternalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use InternalType::*;
        let s = match self {
            Discovered => "discovered",
            Claimed => "claimed",
            Completed => "completed",
            Cancelled => "cancelled",
            DependentDiscovered => "dependent_discovered",
            DisputeInitiated => "dispute:initiated",
            DisputeVoteCast => "dispute:vote_cast",
            DisputeResolved => "dispute:resolved",
            DisputeExpired => "dispute:expired",
            DisputeCancelled => "dispute:cancelled",
            ArbiterVotesCleanedUp => "dispute:arbiter_votes_cleaned_up",
            AgentRegistered => "agent:registered",
            AgentUpdated => "agent:updated",
            AgentDeregistered => "agent:deregistered",
            AgentSuspended => "agent:suspended",
            AgentUnsuspended => "agent:unsuspended",
            ProtocolInitialized => "protocol:initialized",
            StateUpdated => "protocol:state_updated",
            RewardDistributed => "protocol:reward_distributed",
            RateLimitHit => "protocol:rate_limit_hit",
            MigrationCompleted => "protocol:migration_completed",
            ProtocolVersionUpdated => "protocol:version_updated",
            RateLimitsUpdated => "protocol:rate_limits_updated",
            ProtocolFeeUpdated => "protocol:fee_updated",
            ReputationChanged => "protocol:reputation_changed",
            BondDeposited => "protocol:bond_deposited",
            BondLocked => "protocol:bond_locked",
            BondReleased => "protocol:bond_released",
            BondSlashed => "protocol:bond_slashed",
            SpeculativeCommitmentCreated => "protocol:speculative_commitment_created",
            SpeculationStarted => "speculation:started",
            SpeculationConfirmed => "speculation:confirmed",
            SpeculationAborted => "speculation:aborted",
        };
        f.write_str(s)
    }
}

/// `(raw event_name, internal type)` — the one static table driving both
/// taxonomy membership and type mapping.
pub const EVENT_NAME_TABLE: &[(&str, InternalType)] = &[
    ("taskCreated", InternalType::Discovered),
    ("taskClaimed", InternalType::Claimed),
    ("taskCompleted", InternalType::Completed),
    ("taskCancelled", InternalType::Cancelled),
    ("dependentTaskCreated", InternalType::DependentDiscovered),
    ("disputeInitiated", InternalType::DisputeInitiated),
    ("disputeVoteCast", InternalType::DisputeVoteCast),
    ("disputeResolved", InternalType::DisputeResolved),
    ("disputeExpired", InternalType::DisputeExpired),
    ("disputeCancelled", InternalType::DisputeCancelled),
    (
        "arbiterVotesCleanedUp",
        InternalType::ArbiterVotesCleanedUp,
    ),
    ("agentRegistered", InternalType::AgentRegistered),
    ("agentUpdated", InternalType::AgentUpdated),
    ("agentDeregistered", InternalType::AgentDeregistered),
    ("agentSuspended", InternalType::AgentSuspended),
    ("agentUnsuspended", InternalType::AgentUnsuspended),
    ("protocolInitialized", InternalType::ProtocolInitialized),
    ("stateUpdated", InternalType::StateUpdated),
    ("rewardDistributed", InternalType::RewardDistributed),
    ("rateLimitHit", InternalType::RateLimitHit),
    ("migrationCompleted", InternalType::MigrationCompleted),
    (
        "protocolVersionUpdated",
        InternalType::ProtocolVersionUpdated,
    ),
    ("rateLimitsUpdated", InternalType::RateLimitsUpdated),
    ("protocolFeeUpdated", InternalType::ProtocolFeeUpdated),
    ("reputationChanged", InternalType::ReputationChanged),
    ("bondDeposited", InternalType::BondDeposited),
    ("bondLocked", InternalType::BondLocked),
    ("bondReleased", InternalType::BondReleased),
    ("bondSlashed", InternalType::BondSlashed),
    (
        "speculativeCommitmentCreated",
        InternalType::SpeculativeCommitmentCreated,
    ),
    ("speculation_started", InternalType::SpeculationStarted),
    ("speculation_confirmed", InternalType::SpeculationConfirmed),
    ("speculation_aborted", InternalType::SpeculationAborted),
];

/// Look up the internal type for a raw event name. `None` means the name is
/// unknown and must be recorded in projection telemetry, not dropped silently.
pub fn lookup_event_name(event_name: &str) -> Option<InternalType> {
    EVENT_NAME_TABLE
        .iter()
        .find(|(name, _)| *name == event_name)
        .map(|(_, ty)| *ty)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_name_maps_to_expected_family() {
        assert_eq!(lookup_event_name("taskCreated"), Some(InternalType::Discovered));
        assert_eq!(
            lookup_event_name("disputeVoteCast"),
            Some(InternalType::DisputeVoteCast)
        );
        assert_eq!(InternalType::DisputeVoteCast.family(), EventFamily::Dispute);
    }

    #[test]
    fn unknown_name_is_none() {
        assert_eq!(lookup_event_name("unknownEventFromProgram"), None);
    }

    #[test]
    fn display_matches_wire_form() {
        assert_eq!(InternalType::Discovered.to_string(), "discovered");
        assert_eq!(
            InternalType::DisputeVoteCast.to_string(),
            "dispute:vote_cast"
        );
    }
}
