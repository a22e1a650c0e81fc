//! The backfill service (spec §4.E): drains a [`BackfillFetcher`] page by
//! page, projects each page through `replay-engine`, and commits the
//! results to a [`TimelineStore`]. Page fetch, store append and store
//! query are suspension points (spec §5); the caller's [`CancellationToken`]
//! is checked between pages.

use crate::cancel::CancellationToken;
use crate::error::{Error, Result};
use replay_core::Result as CoreResult;
use replay_engine::{project, ProjectOpts};
use replay_index::{AppendOutcome, TimelineStore};
use replay_providers::BackfillFetcher;
use replay_types::{Cursor, TimelineRecord};

/// Inputs to [`run_backfill`].
pub struct BackfillRequest<'a> {
    pub to_slot: u64,
    pub page_size: usize,
    pub fetcher: &'a dyn BackfillFetcher,
    /// Overrides per-event trace derivation; `None` uses the default
    /// per-event trace_id (spec §4.B step 6).
    pub trace_id: Option<String>,
    pub sample_rate: Option<f64>,
    pub created_at_ms: i64,
    pub cancellation: CancellationToken,
}

/// Outcome of a completed (or cancelled/aborted) backfill run.
#[derive(Debug, Clone, Default)]
pub struct BackfillOutcome {
    pub processed: u32,
    pub duplicates: u32,
    pub cursor: Option<Cursor>,
}

/// Run the backfill algorithm (spec §4.E, steps 1-5) against `store`.
///
/// A failed page fetch or store write aborts the run; progress already
/// committed (records appended, cursor advanced) up to that point is
/// preserved, so the next invocation resumes from the stored cursor.
pub async fn run_backfill(store: &mut dyn TimelineStore, request: BackfillRequest<'_>) -> Result<BackfillOutcome> {
    // Step 1: load cursor from store.
    let mut cursor = store.get_cursor()?;
    let mut processed = 0u32;
    let mut duplicates = 0u32;

    loop {
        if request.cancellation.is_cancelled() {
            return Err(Error::Cancelled);
        }

        // Step 2: fetch the next page (suspension point).
        let page = request.fetcher.fetch_page(cursor.as_ref(), request.to_slot, request.page_size)?;

        if !page.events.is_empty() {
            // Step 3: canonicalise and project the page.
            let opts = ProjectOpts {
                trace_id: request.trace_id.clone(),
                seed: None,
                sample_rate: request.sample_rate,
                created_at_ms: request.created_at_ms,
            };
            let projected = project(&page.events, &opts);
            let records = build_records(&projected.events)?;

            // Step 4: append to the store (suspension point).
            let AppendOutcome {
                processed: page_processed,
                duplicates: page_duplicates,
            } = store.append(records)?;
            processed += page_processed;
            duplicates += page_duplicates;
        }

        // Step 5: advance the cursor; stop on done.
        if let Some(next) = &page.next_cursor {
            store.set_cursor(next.clone())?;
            cursor = Some(next.clone());
        }

        if page.done {
            break;
        }
    }

    Ok(BackfillOutcome {
        processed,
        duplicates,
        cursor,
    })
}

fn build_records(events: &[replay_types::TimelineEvent]) -> CoreResult<Vec<TimelineRecord>> {
    events
        .iter()
        .map(|event| {
            let hash = replay_engine::projection_hash(event)?;
            let onchain = event.payload.get("onchain");
            Ok(TimelineRecord {
                event: event.clone(),
                projection_hash: hash,
                dispute_id: onchain.and_then(|o| o.get("disputeId")).and_then(|v| v.as_str()).map(str::to_string),
                trace_id: onchain.and_then(|o| o.get("traceId")).and_then(|v| v.as_str()).map(str::to_string),
                trace_span_id: onchain.and_then(|o| o.get("spanId")).and_then(|v| v.as_str()).map(str::to_string),
                trace_parent_span_id: onchain
                    .and_then(|o| o.get("parentSpanId"))
                    .and_then(|v| v.as_str())
                    .map(str::to_string),
                trace_sampled: onchain.and_then(|o| o.get("sampled")).and_then(|v| v.as_bool()),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use replay_index::MemoryStore;
    use replay_providers::MemoryFetcher;
    use serde_json::json;

    fn raw(slot: i64, sig: &str, name: &str) -> replay_types::RawProjectionInput {
        replay_types::RawProjectionInput {
            event_name: name.to_string(),
            slot,
            signature: sig.to_string(),
            source_event_sequence: Some(0),
            timestamp_ms: Some(1000),
            event: json!({"task_pda": "task1"}),
        }
    }

    #[tokio::test]
    async fn drains_every_page_and_advances_the_cursor() {
        let fetcher = MemoryFetcher::new(vec![
            raw(1, "a", "taskCreated"),
            raw(2, "b", "taskClaimed"),
            raw(3, "c", "taskCompleted"),
        ]);
        let mut store = MemoryStore::default();
        let request = BackfillRequest {
            to_slot: 100,
            page_size: 2,
            fetcher: &fetcher,
            trace_id: None,
            sample_rate: None,
            created_at_ms: 0,
            cancellation: CancellationToken::new(),
        };
        let outcome = run_backfill(&mut store, request).await.unwrap();
        assert_eq!(outcome.processed, 3);
        assert_eq!(outcome.duplicates, 0);
        assert!(outcome.cursor.is_some());
        assert_eq!(store.get_cursor().unwrap().unwrap().slot, 3);
    }

    #[tokio::test]
    async fn cancellation_is_observed_before_the_next_page() {
        let fetcher = MemoryFetcher::new(vec![raw(1, "a", "taskCreated"), raw(2, "b", "taskClaimed")]);
        let mut store = MemoryStore::default();
        let cancellation = CancellationToken::new();
        cancellation.cancel();
        let request = BackfillRequest {
            to_slot: 100,
            page_size: 1,
            fetcher: &fetcher,
            trace_id: None,
            sample_rate: None,
            created_at_ms: 0,
            cancellation,
        };
        let err = run_backfill(&mut store, request).await.unwrap_err();
        assert!(matches!(err, Error::Cancelled));
    }

    #[tokio::test]
    async fn empty_fetcher_is_a_no_op() {
        let fetcher = MemoryFetcher::new(vec![]);
        let mut store = MemoryStore::default();
        let request = BackfillRequest {
            to_slot: 100,
            page_size: 10,
            fetcher: &fetcher,
            trace_id: None,
            sample_rate: None,
            created_at_ms: 0,
            cancellation: CancellationToken::new(),
        };
        let outcome = run_backfill(&mut store, request).await.unwrap();
        assert_eq!(outcome.processed, 0);
    }
}
