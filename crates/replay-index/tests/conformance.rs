//! Store conformance across backends (spec I5/I6): both `MemoryStore` and
//! `FileStore` must agree on idempotence and cursor monotonicity.

use replay_index::{FileStore, MemoryStore, TimelineQuery, TimelineStore};
use replay_types::{Cursor, InternalType, TimelineEvent, TimelineRecord};
use serde_json::json;
use tempfile::TempDir;

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

fn cursor_at(slot: u64, sig: &str) -> Cursor {
    Cursor { slot, signature: sig.to_string(), event_name: None, trace_id: None, span_id: None }
}

fn assert_idempotent_insert(store: &mut impl TimelineStore) {
    let first = store.append(vec![record(1, 10, "a")]).unwrap();
    assert_eq!(first.processed, 1);
    assert_eq!(first.duplicates, 0);

    let second = store.append(vec![record(1, 10, "a")]).unwrap();
    assert_eq!(second.processed, 0, "re-inserting the same canonical tuple must not count as processed");
    assert_eq!(second.duplicates, 1);

    assert_eq!(store.query(&TimelineQuery::default()).unwrap().len(), 1);
}

fn assert_cursor_monotonic(store: &mut impl TimelineStore) {
    assert!(store.get_cursor().unwrap().is_none());

    store.set_cursor(cursor_at(10, "a")).unwrap();
    assert_eq!(store.get_cursor().unwrap().unwrap().slot, 10);

    store.set_cursor(cursor_at(20, "b")).unwrap();
    let cursor = store.get_cursor().unwrap().unwrap();
    assert_eq!(cursor.slot, 20);
    assert_eq!(cursor.signature, "b");
}

#[test]
fn memory_store_is_idempotent_on_canonical_tuple() {
    let mut store = MemoryStore::new();
    assert_idempotent_insert(&mut store);
}

#[test]
fn file_store_is_idempotent_on_canonical_tuple() {
    let dir = TempDir::new().unwrap();
    let mut store = FileStore::open(dir.path()).unwrap();
    assert_idempotent_insert(&mut store);
}

#[test]
fn memory_store_cursor_advances_monotonically() {
    let mut store = MemoryStore::new();
    assert_cursor_monotonic(&mut store);
}

#[test]
fn file_store_cursor_advances_monotonically_and_persists() {
    let dir = TempDir::new().unwrap();
    {
        let mut store = FileStore::open(dir.path()).unwrap();
        assert_cursor_monotonic(&mut store);
    }
    let reopened = FileStore::open(dir.path()).unwrap();
    assert_eq!(reopened.get_cursor().unwrap().unwrap().slot, 20);
}
