//! Pluggable full-snapshot storage
//!
//! A backend stores one complete serialized document per entity. Variants are
//! selected by constructor injection, not runtime switches: [`DiskBackend`]
//! for local files, [`HttpBackend`] for a remote object store and
//! [`MemoryBackend`] for tests.

use crate::error::BackendError;
use quill_core::Document;
use std::sync::Arc;

pub mod disk;
pub mod http;
pub mod memory;

pub use disk::DiskBackend;
pub use http::HttpBackend;
pub use memory::MemoryBackend;

/// Full-snapshot storage for one document per entity.
///
/// `load` returns `Ok(None)` for an unknown entity; that is not an error.
/// `save` must be atomic from any concurrent reader's perspective: a reader
/// never observes a partially written snapshot.
pub trait Backend: Send + Sync {
    /// Load the current snapshot, or `None` if the entity has never been saved.
    fn load(&self, entity: &str) -> Result<Option<Document>, BackendError>;

    /// Atomically replace the entity's snapshot.
    fn save(&self, entity: &str, doc: &Document) -> Result<(), BackendError>;
}

impl<B: Backend + ?Sized> Backend for Arc<B> {
    fn load(&self, entity: &str) -> Result<Option<Document>, BackendError> {
        (**self).load(entity)
    }

    fn save(&self, entity: &str, doc: &Document) -> Result<(), BackendError> {
        (**self).save(entity, doc)
    }
}

/// Filesystem/URL-safe object name for an opaque entity ID.
///
/// Hex keeps arbitrary IDs (path separators, non-ASCII) collision-free.
pub(crate) fn object_name(entity: &str) -> String {
    format!("{}.json", hex::encode(entity))
}
