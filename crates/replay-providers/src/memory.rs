//! Reference in-memory `BackfillFetcher`: pages through a fixed, pre-sorted
//! `Vec<RawProjectionInput>`. Used by `replay-testing` fixtures and as the
//! fetcher backing fast integration tests.

use crate::error::Result;
use crate::traits::{BackfillFetcher, FetchPage};
use replay_types::{Cursor, RawProjectionInput};

/// An in-memory fetcher over a fixed event set, ordered by `(slot,
/// signature)` ascending. Construction sorts the input once so paging is a
/// simple binary search.
pub struct MemoryFetcher {
    events: Vec<RawProjectionInput>,
}

impl MemoryFetcher {
    pub fn new(mut events: Vec<RawProjectionInput>) -> Self {
        events.sort_by(|a, b| (a.slot, &a.signature).cmp(&(b.slot, &b.signature)));
        MemoryFetcher { events }
    }

    fn position_after(&self, cursor: Option<&Cursor>) -> usize {
        match cursor {
            None => 0,
            Some(c) => self
                .events
                .partition_point(|e| (e.slot as i64, e.signature.as_str()) <= (c.slot as i64, c.signature.as_str())),
        }
    }
}

impl BackfillFetcher for MemoryFetcher {
    fn fetch_page(&self, cursor: Option<&Cursor>, to_slot: u64, page_size: usize) -> Result<FetchPage> {
        let start = self.position_after(cursor);
        let mut out = Vec::new();
        let mut idx = start;
        while idx < self.events.len() && out.len() < page_size {
            let ev = &self.events[idx];
            if ev.slot as u64 > to_slot {
                break;
            }
            out.push(ev.clone());
            idx += 1;
        }
        let reached_end = idx >= self.events.len() || self.events[idx].slot as u64 > to_slot;
        let next_cursor = out.last().map(|e| Cursor {
            slot: e.slot as u64,
            signature: e.signature.clone(),
            event_name: Some(e.event_name.clone()),
            trace_id: None,
            span_id: None,
        });
        Ok(FetchPage {
            events: out,
            next_cursor: next_cursor.or_else(|| cursor.cloned()),
            done: reached_end,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(slot: i64, sig: &str, name: &str) -> RawProjectionInput {
        RawProjectionInput {
            event_name: name.to_string(),
            slot,
            signature: sig.to_string(),
            source_event_sequence: None,
            timestamp_ms: None,
            event: json!({}),
        }
    }

    #[test]
    fn pages_in_ascending_order_and_terminates() {
        let fetcher = MemoryFetcher::new(vec![
            raw(1, "a", "task:created"),
            raw(2, "b", "task:claimed"),
            raw(3, "c", "task:completed"),
        ]);
        let page1 = fetcher.fetch_page(None, 10, 2).unwrap();
        assert_eq!(page1.events.len(), 2);
        assert!(!page1.done);
        let page2 = fetcher
            .fetch_page(page1.next_cursor.as_ref(), 10, 2)
            .unwrap();
        assert_eq!(page2.events.len(), 1);
        assert!(page2.done);
    }

    #[test]
    fn respects_to_slot_bound() {
        let fetcher = MemoryFetcher::new(vec![raw(1, "a", "x"), raw(100, "b", "y")]);
        let page = fetcher.fetch_page(None, 5, 10).unwrap();
        assert_eq!(page.events.len(), 1);
        assert!(page.done);
    }

    #[test]
    fn empty_set_is_immediately_done() {
        let fetcher = MemoryFetcher::new(vec![]);
        let page = fetcher.fetch_page(None, 100, 10).unwrap();
        assert!(page.events.is_empty());
        assert!(page.done);
    }
}
