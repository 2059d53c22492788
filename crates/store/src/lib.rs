//! Write-coalescing persistence for per-entity documents
//!
//! This crate provides:
//! - The pluggable full-snapshot [`Backend`] trait (disk / object store / memory)
//! - The coalescing [`Store`]: durable-log fast path for writes, flush-on-read
//!
//! A write only ever touches the durable log. A read loads the backend
//! snapshot, replays pending log entries onto it, saves the merged result and
//! clears the log, amortizing backend latency into events that already needed
//! a fresh read.

pub mod backend;
pub mod error;
pub mod store;

// Re-exports
pub use backend::{Backend, DiskBackend, HttpBackend, MemoryBackend};
pub use error::{BackendError, StoreError};
pub use store::{Store, StoreBuilder};

pub use quill_core::{apply_path, empty_document, Document};
pub use quill_journal::{LogEntry, WriteLog};
