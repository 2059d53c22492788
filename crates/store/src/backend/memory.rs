//! In-memory snapshot backend for tests

use super::Backend;
use crate::error::BackendError;
use parking_lot::RwLock;
use quill_core::Document;
use std::collections::HashMap;

/// Guarded map of entity ID to snapshot; trivially atomic.
#[derive(Default)]
pub struct MemoryBackend {
    snapshots: RwLock<HashMap<String, Document>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Backend for MemoryBackend {
    fn load(&self, entity: &str) -> Result<Option<Document>, BackendError> {
        Ok(self.snapshots.read().get(entity).cloned())
    }

    fn save(&self, entity: &str, doc: &Document) -> Result<(), BackendError> {
        self.snapshots.write().insert(entity.to_owned(), doc.clone());
        Ok(())
    }
}
