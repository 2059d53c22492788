//! Error taxonomy for backends and the coalescing store

use quill_journal::JournalError;
use thiserror::Error;

/// Failures from a snapshot backend.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("snapshot i/o failure")]
    Io(#[from] std::io::Error),
    #[error("snapshot codec failure")]
    Codec(#[from] serde_json::Error),
    #[error("object store request failed")]
    Http(#[from] reqwest::Error),
    #[error("object store returned status {0}")]
    Status(reqwest::StatusCode),
    /// Test and instrumentation hook for injected failures.
    #[error("{0}")]
    Other(String),
}

/// Failures surfaced by [`Store::write`] and [`Store::read`].
///
/// Durability-layer and backend-layer errors always reach the caller; the
/// log is left untouched on load/save failures, so a retry replays the
/// identical merge from the same starting snapshot.
///
/// [`Store::write`]: crate::Store::write
/// [`Store::read`]: crate::Store::read
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store was built without a required component. Fatal; surfaces
    /// before any traffic is served.
    #[error("invalid store configuration: {0}")]
    Config(&'static str),
    /// The durable log medium failed during append, listing or clear.
    #[error("write log failure")]
    Journal(#[from] JournalError),
    /// Backend unreachable or snapshot corrupt while loading. Safe to retry.
    #[error("snapshot load failed for entity `{entity}`")]
    Load {
        entity: String,
        #[source]
        source: BackendError,
    },
    /// Flush write failed. The merge is uncommitted; safe to retry.
    #[error("snapshot save failed for entity `{entity}`")]
    Save {
        entity: String,
        #[source]
        source: BackendError,
    },
}
