//! Backfill and comparison services (spec §4.E/§4.F): the orchestration
//! layer that drives `replay-providers` fetchers and `replay-index` stores
//! through the `replay-engine` projection and replay engines.

pub mod backfill;
pub mod cancel;
pub mod compare;
pub mod error;
pub mod query_dsl;
pub mod telemetry;

pub use backfill::{run_backfill, BackfillOutcome, BackfillRequest};
pub use cancel::CancellationToken;
pub use compare::{compare, CompareRequest};
pub use error::{Error, Result};
pub use query_dsl::Filter;
pub use telemetry::{AlertDispatcher, MetricsProvider, NoopAlerts, NoopMetrics};
