//! Projection and replay engines (spec §4.B/§4.C): the deterministic core
//! that turns raw coordination-protocol events into a sealed
//! `TrajectoryTrace`, and folds a trace back into per-entity state.

pub mod error;
mod extract;
pub mod project;
pub mod replay;
pub mod state_machine;

pub use error::{Error, Result};
pub use project::{project, projection_hash, ProjectOpts};
pub use replay::replay;
