//! Append-only file-JSON `TimelineStore` (spec §4.D). Records live one per
//! line in `events.jsonl`; the cursor lives in a small sidecar `cursor.json`
//! next to it. Every mutating call rewrites both files atomically via a
//! temp-file-then-rename, so a crash mid-write never leaves a torn file.

use crate::error::{Error, Result};
use crate::traits::{AppendOutcome, TimelineQuery, TimelineStore};
use replay_types::{Cursor, TimelineRecord};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

pub struct FileStore {
    dir: PathBuf,
    events_path: PathBuf,
    cursor_path: PathBuf,
    records: Vec<TimelineRecord>,
    cursor: Option<Cursor>,
}

impl FileStore {
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        let events_path = dir.join("events.jsonl");
        let cursor_path = dir.join("cursor.json");

        let records = if events_path.exists() {
            let content = fs::read_to_string(&events_path)?;
            content
                .lines()
                .filter(|l| !l.trim().is_empty())
                .map(|l| serde_json::from_str::<TimelineRecord>(l).map_err(Error::from))
                .collect::<Result<Vec<_>>>()?
        } else {
            Vec::new()
        };

        let cursor = if cursor_path.exists() {
            let content = fs::read_to_string(&cursor_path)?;
            Some(serde_json::from_str(&content)?)
        } else {
            None
        };

        Ok(FileStore {
            dir,
            events_path,
            cursor_path,
            records,
            cursor,
        })
    }

    fn write_events(&self) -> Result<()> {
        write_atomic(&self.events_path, |f| {
            for record in &self.records {
                let line = serde_json::to_string(record)?;
                writeln!(f, "{line}")?;
            }
            Ok(())
        })
    }

    fn write_cursor(&self) -> Result<()> {
        match &self.cursor {
            Some(cursor) => {
                let body = serde_json::to_string_pretty(cursor)?;
                write_atomic(&self.cursor_path, |f| {
                    f.write_all(body.as_bytes())?;
                    Ok(())
                })
            }
            None => Ok(()),
        }
    }
}

fn write_atomic(path: &Path, write: impl FnOnce(&mut fs::File) -> Result<()>) -> Result<()> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    write(tmp.as_file_mut())?;
    tmp.persist(path).map_err(|e| Error::Io(e.error))?;
    Ok(())
}

impl TimelineStore for FileStore {
    fn append(&mut self, records: Vec<TimelineRecord>) -> Result<AppendOutcome> {
        let mut outcome = AppendOutcome::default();
        let mut staged = Vec::with_capacity(records.len());
        for record in records {
            let key = record.canonical_key();
            let exists = self.records.iter().any(|r| r.canonical_key() == key);
            if exists {
                outcome.duplicates += 1;
            } else {
                outcome.processed += 1;
                staged.push(record);
            }
        }
        // Stage fully before writing so a page either commits in full or
        // (on IO failure) leaves the on-disk file untouched.
        let mut next = self.records.clone();
        next.extend(staged);
        let previous = std::mem::replace(&mut self.records, next);
        if let Err(err) = self.write_events() {
            self.records = previous;
            return Err(err);
        }
        Ok(outcome)
    }

    fn query(&self, q: &TimelineQuery) -> Result<Vec<TimelineRecord>> {
        let mut out: Vec<TimelineRecord> = self
            .records
            .iter()
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
        let previous = self.cursor.take();
        self.cursor = Some(cursor);
        if let Err(err) = self.write_cursor() {
            self.cursor = previous;
            return Err(err);
        }
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        self.write_events()?;
        self.write_cursor()
    }
}

impl FileStore {
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use replay_types::{InternalType, TimelineEvent};
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

    #[test]
    fn append_then_reopen_preserves_records_and_cursor() {
        let dir = TempDir::new().unwrap();
        {
            let mut store = FileStore::open(dir.path()).unwrap();
            store.append(vec![record(1, 10, "a")]).unwrap();
            store
                .set_cursor(Cursor {
                    slot: 10,
                    signature: "a".into(),
                    event_name: None,
                    trace_id: None,
                    span_id: None,
                })
                .unwrap();
        }
        let reopened = FileStore::open(dir.path()).unwrap();
        assert_eq!(reopened.query(&TimelineQuery::default()).unwrap().len(), 1);
        assert!(reopened.get_cursor().unwrap().is_some());
    }

    #[test]
    fn append_is_idempotent_across_reopen() {
        let dir = TempDir::new().unwrap();
        let mut store = FileStore::open(dir.path()).unwrap();
        store.append(vec![record(1, 10, "a")]).unwrap();
        let outcome = store.append(vec![record(1, 10, "a")]).unwrap();
        assert_eq!(outcome.processed, 0);
        assert_eq!(outcome.duplicates, 1);
    }
}
