//! Append-only durable write log using sled

use crate::LogEntry;
use serde_json::Value;
use sled::Db;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use thiserror::Error;

/// Failures from the durable log medium.
#[derive(Debug, Error)]
pub enum JournalError {
    #[error("write log database failure")]
    Db(#[from] sled::Error),
    #[error("write log entry codec failure")]
    Codec(#[from] serde_json::Error),
    #[error("corrupt write log key ({0} bytes)")]
    CorruptKey(usize),
}

/// Append-only, crash-surviving log of pending field writes.
///
/// Entries are keyed by `[entity length | entity bytes | sequence]` so that a
/// prefix scan yields one entity's entries in insertion order. A successful
/// [`WriteLog::append`] guarantees the entry survives a process crash
/// immediately afterwards.
pub struct WriteLog {
    /// Sled database
    db: Db,
    /// Monotonic sequence counter
    seq_counter: AtomicU64,
}

impl WriteLog {
    /// Open or create a write log under the given directory.
    ///
    /// Rebuilds the sequence counter from whatever entries survived the last
    /// process, so recovered entries keep their ordering ahead of new ones.
    pub fn open(dir: &Path) -> Result<Self, JournalError> {
        let db = sled::open(dir.join("writes.db"))?;

        let mut max_seq = 0u64;
        for item in db.iter() {
            let (key, _) = item?;
            max_seq = max_seq.max(sequence_of(&key)?);
        }

        Ok(Self {
            db,
            seq_counter: AtomicU64::new(max_seq + 1),
        })
    }

    /// Durably append one pending write and return its sequence number.
    ///
    /// The entry is flushed to the durability medium before this returns.
    /// Safe under unbounded concurrent invocation for any mix of entities.
    pub fn append(&self, entity: &str, path: &str, value: Value) -> Result<u64, JournalError> {
        let sequence = self.seq_counter.fetch_add(1, Ordering::SeqCst);
        let entry = LogEntry {
            entity: entity.to_owned(),
            path: path.to_owned(),
            value,
            sequence,
        };

        self.db.insert(entry_key(entity, sequence), serde_json::to_vec(&entry)?)?;

        // Flush to ensure durability
        self.db.flush()?;

        tracing::debug!(entity, path, sequence, "appended pending write");
        Ok(sequence)
    }

    /// List one entity's pending entries, FIFO by insertion order.
    pub fn pending(&self, entity: &str) -> Result<Vec<LogEntry>, JournalError> {
        let mut entries = Vec::new();
        // Big-endian sequence suffix keeps the scan in ascending order.
        for item in self.db.scan_prefix(entity_prefix(entity)) {
            let (_, value) = item?;
            entries.push(serde_json::from_slice(&value)?);
        }
        Ok(entries)
    }

    /// Number of pending entries for one entity.
    pub fn pending_count(&self, entity: &str) -> Result<usize, JournalError> {
        let mut count = 0;
        for item in self.db.scan_prefix(entity_prefix(entity)) {
            item?;
            count += 1;
        }
        Ok(count)
    }

    /// Delete all of an entity's pending entries.
    pub fn clear(&self, entity: &str) -> Result<(), JournalError> {
        self.clear_through(entity, u64::MAX)
    }

    /// Delete an entity's pending entries up to and including `max_sequence`.
    ///
    /// Called only after those entries' effects have been durably merged into
    /// the backend snapshot. Entries appended after the merged batch was
    /// listed carry higher sequence numbers and are left in place for the
    /// next flush.
    pub fn clear_through(&self, entity: &str, max_sequence: u64) -> Result<(), JournalError> {
        let mut batch = sled::Batch::default();
        let mut removed = 0u64;
        for item in self.db.scan_prefix(entity_prefix(entity)) {
            let (key, _) = item?;
            // Scan order is ascending by sequence.
            if sequence_of(&key)? > max_sequence {
                break;
            }
            batch.remove(key);
            removed += 1;
        }
        self.db.apply_batch(batch)?;
        self.db.flush()?;

        tracing::debug!(entity, removed, max_sequence, "cleared pending writes");
        Ok(())
    }
}

/// Key prefix covering every entry of one entity.
///
/// The length prefix keeps entity IDs self-delimiting, so `"ab"` never
/// matches a scan for `"a"`.
fn entity_prefix(entity: &str) -> Vec<u8> {
    let bytes = entity.as_bytes();
    let mut prefix = Vec::with_capacity(4 + bytes.len());
    prefix.extend_from_slice(&(bytes.len() as u32).to_be_bytes());
    prefix.extend_from_slice(bytes);
    prefix
}

fn entry_key(entity: &str, sequence: u64) -> Vec<u8> {
    let mut key = entity_prefix(entity);
    key.extend_from_slice(&sequence.to_be_bytes());
    key
}

fn sequence_of(key: &[u8]) -> Result<u64, JournalError> {
    let tail: [u8; 8] = key
        .get(key.len().saturating_sub(8)..)
        .and_then(|t| t.try_into().ok())
        .ok_or(JournalError::CorruptKey(key.len()))?;
    Ok(u64::from_be_bytes(tail))
}
