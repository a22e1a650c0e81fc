//! Internal core types for the replayspine tooling. Not intended for direct use.

pub mod alert;
pub mod anomaly;
pub mod canonical;
pub mod cursor;
pub mod error;
pub mod error_code;
pub mod evidence;
pub mod incident;
pub mod projection;
pub mod replay;
pub mod state;
pub mod taxonomy;
pub mod timeline;
mod util;

pub use alert::ReplayAlertContext;
pub use anomaly::{Anomaly, AnomalyCode, AnomalyContext, ComparisonResult, ComparisonStatus, Severity, Strictness};
pub use canonical::{CanonicalTuple, RawProjectionInput};
pub use cursor::Cursor;
pub use error::{Error, Result};
pub use error_code::{ErrorCode, ToolErrorResponse};
pub use evidence::{EvidenceManifest, EvidencePack, PackValidation, RedactionPolicy};
pub use incident::{IncidentNarrative, IncidentSummary, IncidentValidation};
pub use projection::{MalformedInput, ProjectionResult, ProjectionTelemetry, TransitionViolation};
pub use replay::{ReplayResult, ReplaySummary};
pub use state::{DisputeState, DisputeStatus, TaskState, TaskStatus};
pub use taxonomy::{lookup_event_name, EventFamily, InternalType, EVENT_NAME_TABLE};
pub use timeline::{TimelineEvent, TimelineRecord, TrajectoryTrace};
pub use util::*;
