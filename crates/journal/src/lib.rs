//! Durable write log for pending per-entity field writes
//!
//! This crate provides:
//! - Log entry data structures (entity + path + value + sequence)
//! - Append-only durable log (sled embedded DB)
//! - Per-entity FIFO listing and bulk clear

pub mod entry;
pub mod journal;

// Re-exports
pub use entry::LogEntry;
pub use journal::{JournalError, WriteLog};
