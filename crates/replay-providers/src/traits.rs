use crate::error::Result;
use replay_types::{Cursor, RawProjectionInput};

/// Source port for raw events (spec §6.1). Remote RPC/WebSocket transport
/// for fetching from a live coordination protocol is explicitly out of
/// scope; this trait is the seam a real transport would plug into.
///
/// Responsibilities:
/// - Page through raw events between a cursor and a target slot
/// - Report a `next_cursor` the backfill service persists between pages
/// - Signal `done` once no further pages remain below `to_slot`
///
/// Retry of a failed fetch is the fetcher's responsibility, not the
/// backfill service's — a `fetch_page` call either returns a complete page
/// or fails outright.
pub trait BackfillFetcher: Send + Sync {
    /// Fetch the next page of raw events after `cursor`, stopping at or
    /// before `to_slot`. `page_size` bounds the number of events returned.
    fn fetch_page(&self, cursor: Option<&Cursor>, to_slot: u64, page_size: usize) -> Result<FetchPage>;
}

/// Result of a single `fetch_page` call.
#[derive(Debug, Clone)]
pub struct FetchPage {
    pub events: Vec<RawProjectionInput>,
    pub next_cursor: Option<Cursor>,
    pub done: bool,
}

impl FetchPage {
    pub fn empty_done() -> Self {
        FetchPage {
            events: Vec::new(),
            next_cursor: None,
            done: true,
        }
    }
}
