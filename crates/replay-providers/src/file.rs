//! Reference file-backed `BackfillFetcher`: reads a JSONL file of raw
//! events, one `RawProjectionInput` per line, in file order.

use crate::error::{Error, Result};
use crate::traits::{BackfillFetcher, FetchPage};
use replay_types::{Cursor, RawProjectionInput};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

/// A fetcher that reads an append-only JSONL file end to end on every call,
/// filtering to events after the cursor. Suitable for local fixtures and
/// small backfills; a production RPC fetcher would stream instead.
pub struct FileFetcher {
    path: PathBuf,
}

impl FileFetcher {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FileFetcher { path: path.into() }
    }

    fn read_all(&self) -> Result<Vec<RawProjectionInput>> {
        let file = File::open(&self.path)?;
        let reader = BufReader::new(file);
        let mut events = Vec::new();
        for (line_no, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let event: RawProjectionInput = serde_json::from_str(&line).map_err(|e| {
                Error::Malformed(format!("{}:{}: {}", self.path.display(), line_no + 1, e))
            })?;
            events.push(event);
        }
        events.sort_by(|a, b| (a.slot, &a.signature).cmp(&(b.slot, &b.signature)));
        Ok(events)
    }
}

impl BackfillFetcher for FileFetcher {
    fn fetch_page(&self, cursor: Option<&Cursor>, to_slot: u64, page_size: usize) -> Result<FetchPage> {
        let events = self.read_all()?;
        let start = match cursor {
            None => 0,
            Some(c) => events
                .partition_point(|e| (e.slot as i64, e.signature.as_str()) <= (c.slot as i64, c.signature.as_str())),
        };
        let mut out = Vec::new();
        let mut idx = start;
        while idx < events.len() && out.len() < page_size {
            let ev = &events[idx];
            if ev.slot as u64 > to_slot {
                break;
            }
            out.push(ev.clone());
            idx += 1;
        }
        let reached_end = idx >= events.len() || events[idx].slot as u64 > to_slot;
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

/// `true` if `path` looks like a raw-event JSONL export this fetcher can
/// read (extension check only; malformed content surfaces on first fetch).
pub fn probe(path: &Path) -> bool {
    path.extension().and_then(|e| e.to_str()) == Some("jsonl")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn reads_jsonl_and_pages() {
        let mut f = NamedTempFile::new().unwrap();
        writeln!(f, r#"{{"event_name":"task:created","slot":1,"signature":"a","source_event_sequence":null,"timestamp_ms":null,"event":{{}}}}"#).unwrap();
        writeln!(f, r#"{{"event_name":"task:claimed","slot":2,"signature":"b","source_event_sequence":null,"timestamp_ms":null,"event":{{}}}}"#).unwrap();
        let fetcher = FileFetcher::new(f.path());
        let page = fetcher.fetch_page(None, 100, 10).unwrap();
        assert_eq!(page.events.len(), 2);
        assert!(page.done);
    }

    #[test]
    fn malformed_line_surfaces_as_error() {
        let mut f = NamedTempFile::new().unwrap();
        writeln!(f, "not json").unwrap();
        let fetcher = FileFetcher::new(f.path());
        assert!(fetcher.fetch_page(None, 100, 10).is_err());
    }

    #[test]
    fn blank_lines_are_skipped() {
        let mut f = NamedTempFile::new().unwrap();
        writeln!(f, r#"{{"event_name":"x","slot":1,"signature":"a","source_event_sequence":null,"timestamp_ms":null,"event":{{}}}}"#).unwrap();
        writeln!(f).unwrap();
        let fetcher = FileFetcher::new(f.path());
        let page = fetcher.fetch_page(None, 100, 10).unwrap();
        assert_eq!(page.events.len(), 1);
    }
}
