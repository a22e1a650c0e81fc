//! The append-only event index (spec §4.D): a `TimelineStore` port with an
//! in-memory and a file-JSON implementation. No SQL store ships here — the
//! system this crate models has exactly two store implementations, never
//! a relational one.

pub mod error;
pub mod file;
pub mod memory;
pub mod traits;

pub use error::{Error, Result};
pub use file::FileStore;
pub use memory::MemoryStore;
pub use traits::{AppendOutcome, TimelineQuery, TimelineStore};
