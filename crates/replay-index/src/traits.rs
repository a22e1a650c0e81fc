use crate::error::Result;
use replay_types::{Cursor, TimelineRecord};

/// Query filter for [`TimelineStore::query`] (spec §4.D).
#[derive(Debug, Clone, Default)]
pub struct TimelineQuery {
    pub task_pda: Option<String>,
    pub dispute_pda: Option<String>,
    pub from_slot: Option<u64>,
    pub to_slot: Option<u64>,
}

/// Outcome of an [`TimelineStore::append`] call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AppendOutcome {
    pub processed: u32,
    pub duplicates: u32,
}

/// The append-only event index (spec §4.D). Two implementations ship in
/// this crate: [`crate::memory::MemoryStore`] and [`crate::file::FileStore`].
///
/// Invariants:
/// - `append` is atomic per page: a partially-applied page either commits
///   fully (records + cursor advance) or not at all.
/// - `append` is idempotent on canonical tuple: a record already present
///   (by `(seq, slot, signature, source_event_sequence, event_name)`) is
///   counted as a duplicate and not re-inserted.
/// - `query` returns a stable order for identical store contents, sorted by
///   `(seq, slot, signature)`.
pub trait TimelineStore: Send + Sync {
    fn append(&mut self, records: Vec<TimelineRecord>) -> Result<AppendOutcome>;
    fn query(&self, q: &TimelineQuery) -> Result<Vec<TimelineRecord>>;
    fn get_cursor(&self) -> Result<Option<Cursor>>;
    fn set_cursor(&mut self, cursor: Cursor) -> Result<()>;
    fn close(&mut self) -> Result<()>;
}
