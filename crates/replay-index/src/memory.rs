//! In-memory `TimelineStore` (spec §4.D). Backed by a `BTreeMap` keyed on
//! the canonical tuple so append-dedup and ordered query both fall out of
//! the map's own ordering.

use crate::error::Result;
use crate::traits::{AppendOutcome, TimelineQuery, TimelineStore};
use replay_types::{Cursor, TimelineRecord};
use std::collections::BTreeMap;

type Key = (u64, String, u32, String);

fn key_of(record: &TimelineRecord) -> Key {
    let (slot, sig, seq, name) = record.canonical_key();
    (slot, sig.to_string(), seq, name.to_string())
}

#[derive(Default)]
pub struct MemoryStore {
    records: BTreeMap<Key, TimelineRecord>,
    cursor: Option<Cursor>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TimelineStore for MemoryStore {
    fn append(&mut self, records: Vec<TimelineRecord>) -> Result<AppendOutcome> {
        let mut outcome = AppendOutcome::default();
        // Atomic per page: stage into a scratch map first, commit in one
        // shot so a partially-applied page is never observable.
        let mut staged = Vec::with_capacity(records.len());
        for record in records {
            let key = key_of(&record);
            if self.records.contains_key(&key) {
                outcome.duplicates += 1;
            } else {
                outcome.processed += 1;
                staged.push((key, record));
            }
        }
        for (key, record) in staged {
            self.records.insert(key, record);
        }
        Ok(outcome)
    }

    fn query(&self, q: &TimelineQuery) -> Result<Vec<TimelineRecord>> {
        let mut out: Vec<TimelineRecord> = self
            .records
            .values()
            .filter(|r| {
                q.task_pda.as_deref().is_none_or(|want| r.event.task_pda.as_deref() == Some(want))
                    && q.dispute_pda.as_deref().is_none_or(|want| r.dispute_id.as_deref() == Some(want))
                    && q.from_slot.is_none_or(|from| r.event.slot >= from)
                    && q.to_slot.is_none_or(|to| r.event.slot <= to)
            })
            .cloned()
            .collect();
        out.sort_by(|a, b| {
            (a.event.seq, a.event.slot, a.event.signature.as_str())
                .cmp(&(b.event.seq, b.event.slot, b.event.signature.as_str()))
        });
        Ok(out)
    }

    fn get_cursor(&self) -> Result<Option<Cursor>> {
        Ok(self.cursor.clone())
    }

    fn set_cursor(&mut self, cursor: Cursor) -> Result<()> {
        self.cursor = Some(cursor);
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use replay_types::{InternalType, TimelineEvent};
    use serde_json::json;

    fn record(seq: u32, slot: u64, sig: &str) -> TimelineRecord {
        TimelineRecord {
            event: TimelineEvent {
                seq,
                type_: InternalType::Discovered,
                task_pda: Some("task1".into()),
                timestamp_ms: 0,
                payload: json!({}),
                slot,
                signature: sig.into(),
                source_event_name: "task:created".into(),
                source_event_sequence: 0,
            },
            projection_hash: format!("hash{seq}"),
            dispute_id: None,
            trace_id: None,
            trace_span_id: None,
            trace_parent_span_id: None,
            trace_sampled: None,
        }
    }

    #[test]
    fn append_is_idempotent_on_canonical_tuple() {
        let mut store = MemoryStore::new();
        let r = record(1, 10, "sig-a");
        let outcome1 = store.append(vec![r.clone()]).unwrap();
        assert_eq!(outcome1.processed, 1);
        let outcome2 = store.append(vec![r]).unwrap();
        assert_eq!(outcome2.processed, 0);
        assert_eq!(outcome2.duplicates, 1);
    }

    #[test]
    fn query_orders_by_seq_slot_signature() {
        let mut store = MemoryStore::new();
        store
            .append(vec![record(2, 20, "b"), record(1, 10, "a")])
            .unwrap();
        let results = store.query(&TimelineQuery::default()).unwrap();
        assert_eq!(results[0].event.seq, 1);
        assert_eq!(results[1].event.seq, 2);
    }

    #[test]
    fn cursor_round_trips() {
        let mut store = MemoryStore::new();
        assert!(store.get_cursor().unwrap().is_none());
        let cursor = Cursor {
            slot: 5,
            signature: "sig".into(),
            event_name: None,
            trace_id: None,
            span_id: None,
        };
        store.set_cursor(cursor.clone()).unwrap();
        assert_eq!(store.get_cursor().unwrap(), Some(cursor));
    }
}
