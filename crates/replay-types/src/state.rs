//! Per-task / per-dispute entity state, folded by both the projection
//! engine (while it builds the stream) and the replay engine (spec §4.B.1,
//! §4.C).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    None,
    Discovered,
    Claimed,
    Completed,
    Failed,
    Cancelled,
    Disputed,
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            TaskStatus::None => "none",
            TaskStatus::Discovered => "discovered",
            TaskStatus::Claimed => "claimed",
            TaskStatus::Completed => "completed",
            TaskStatus::Failed => "failed",
            TaskStatus::Cancelled => "cancelled",
            TaskStatus::Disputed => "disputed",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskState {
    pub status: TaskStatus,
    pub last_event_seq: u32,
}

impl Default for TaskState {
    fn default() -> Self {
        Self {
            status: TaskStatus::None,
            last_event_seq: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisputeStatus {
    None,
    Initiated,
    VoteCast,
    Resolved,
    Expired,
    Cancelled,
    CleanedUp,
}

impl std::fmt::Display for DisputeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            DisputeStatus::None => "none",
            DisputeStatus::Initiated => "initiated",
            DisputeStatus::VoteCast => "vote_cast",
            DisputeStatus::Resolved => "resolved",
            DisputeStatus::Expired => "expired",
            DisputeStatus::Cancelled => "cancelled",
            DisputeStatus::CleanedUp => "cleaned_up",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisputeState {
    pub status: DisputeStatus,
    pub vote_count: u32,
    pub last_event_seq: u32,
}

impl Default for DisputeState {
    fn default() -> Self {
        Self {
            status: DisputeStatus::None,
            vote_count: 0,
            last_event_seq: 0,
        }
    }
}
