//! Write-coalescing store: log-append fast path, flush-on-read

use crate::backend::Backend;
use crate::error::StoreError;
use dashmap::DashMap;
use parking_lot::Mutex;
use quill_core::{apply_path, empty_document, Document};
use quill_journal::WriteLog;
use serde_json::Value;
use std::sync::Arc;

/// Coalescing persistence layer for per-entity documents.
///
/// [`Store::write`] appends to the durable log and returns; it never touches
/// the backend and succeeds while the backend is unreachable. [`Store::read`]
/// loads the backend snapshot, replays pending log entries onto it in
/// sequence order, saves the merged result and clears the log. A read never
/// loses a logged write; a failed flush only defers its visibility until the
/// next successful one.
pub struct Store {
    backend: Arc<dyn Backend>,
    log: WriteLog,
    /// Per-entity flush locks, created lazily and never evicted
    flush_locks: DashMap<String, Arc<Mutex<()>>>,
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store").finish_non_exhaustive()
    }
}

/// Builder for [`Store`]; a missing backend or log is a configuration error
/// surfaced before any traffic.
#[derive(Default)]
pub struct StoreBuilder {
    backend: Option<Arc<dyn Backend>>,
    log: Option<WriteLog>,
}

impl StoreBuilder {
    pub fn backend(mut self, backend: impl Backend + 'static) -> Self {
        self.backend = Some(Arc::new(backend));
        self
    }

    pub fn journal(mut self, log: WriteLog) -> Self {
        self.log = Some(log);
        self
    }

    pub fn build(self) -> Result<Store, StoreError> {
        let backend = self
            .backend
            .ok_or(StoreError::Config("no backend configured"))?;
        let log = self
            .log
            .ok_or(StoreError::Config("no write log configured"))?;
        Ok(Store {
            backend,
            log,
            flush_locks: DashMap::new(),
        })
    }
}

impl Store {
    pub fn builder() -> StoreBuilder {
        StoreBuilder::default()
    }

    /// Queue one leaf write: durably append it to the log and return.
    ///
    /// This is the latency-critical path; its only cost is log durability
    /// I/O, independent of backend health.
    pub fn write(&self, entity: &str, path: &str, value: Value) -> Result<(), StoreError> {
        self.log.append(entity, path, value)?;
        Ok(())
    }

    /// Return the fully merged, durable document for an entity.
    ///
    /// With nothing pending this is a pure load and performs no save. With
    /// pending entries it flushes: replay in ascending sequence order onto
    /// the snapshot, save, then clear exactly the replayed batch from the
    /// log. On load or save failure the
    /// log is untouched and the error reaches the caller; the next read
    /// retries the identical merge, since the replay is a pure function of
    /// snapshot plus ordered entries.
    pub fn read(&self, entity: &str) -> Result<Document, StoreError> {
        let lock = self.flush_lock(entity);
        let _guard = lock.lock();

        let mut doc = self
            .backend
            .load(entity)
            .map_err(|source| StoreError::Load {
                entity: entity.to_owned(),
                source,
            })?
            .unwrap_or_else(empty_document);

        let pending = self.log.pending(entity)?;
        let merged_through = match pending.last() {
            Some(entry) => entry.sequence,
            None => return Ok(doc),
        };

        let flushed = pending.len();
        for entry in pending {
            apply_path(&mut doc, &entry.path, entry.value);
        }

        self.backend
            .save(entity, &doc)
            .map_err(|source| StoreError::Save {
                entity: entity.to_owned(),
                source,
            })?;

        // Only the merged batch may be discarded. Writes appended while the
        // save was in flight carry higher sequence numbers and stay queued
        // for the next flush.
        self.log.clear_through(entity, merged_through)?;

        tracing::debug!(entity, flushed, "flushed pending writes into snapshot");
        Ok(doc)
    }

    /// Number of writes queued for an entity but not yet flushed.
    pub fn pending_writes(&self, entity: &str) -> Result<usize, StoreError> {
        Ok(self.log.pending_count(entity)?)
    }

    /// Serializes load→merge→save→clear per entity, so two concurrent reads
    /// cannot both flush and race on the clear.
    fn flush_lock(&self, entity: &str) -> Arc<Mutex<()>> {
        self.flush_locks
            .entry(entity.to_owned())
            .or_default()
            .clone()
    }
}
