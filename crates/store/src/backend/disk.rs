//! Local-disk snapshot backend with atomic file swap

use super::{object_name, Backend};
use crate::error::BackendError;
use quill_core::Document;
use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

static TMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// One JSON snapshot file per entity under a data directory.
///
/// Saves write to a temp file in a sibling `tmp/` directory, fsync it, then
/// rename it over the target path, so a concurrent reader only ever sees the
/// old or the new snapshot in full.
pub struct DiskBackend {
    snapshots: PathBuf,
    tmp: PathBuf,
}

impl DiskBackend {
    /// Open or create a disk backend rooted at the given directory.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, BackendError> {
        let dir = dir.into();
        let snapshots = dir.join("snapshots");
        let tmp = dir.join("tmp");
        fs::create_dir_all(&snapshots)?;
        fs::create_dir_all(&tmp)?;
        Ok(Self { snapshots, tmp })
    }

    fn snapshot_path(&self, entity: &str) -> PathBuf {
        self.snapshots.join(object_name(entity))
    }
}

impl Backend for DiskBackend {
    fn load(&self, entity: &str) -> Result<Option<Document>, BackendError> {
        let bytes = match fs::read(self.snapshot_path(entity)) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        Ok(Some(serde_json::from_slice(&bytes)?))
    }

    fn save(&self, entity: &str, doc: &Document) -> Result<(), BackendError> {
        let data = serde_json::to_vec(doc)?;
        atomic_write(&self.tmp, &self.snapshot_path(entity), &data)?;
        Ok(())
    }
}

/// Writes data to a temp file, fsyncs it, then renames it over the target.
fn atomic_write(tmp_dir: &Path, target: &Path, data: &[u8]) -> std::io::Result<()> {
    let tmp = tmp_dir.join(format!(
        "{}.{}.tmp",
        std::process::id(),
        TMP_COUNTER.fetch_add(1, Ordering::Relaxed)
    ));

    let mut file = File::create(&tmp)?;
    file.write_all(data)?;
    file.sync_all()?;
    drop(file);

    fs::rename(&tmp, target)?;

    // Persist the rename itself.
    #[cfg(unix)]
    if let Some(parent) = target.parent() {
        File::open(parent)?.sync_all()?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn test_unknown_entity_is_none() {
        let dir = TempDir::new().unwrap();
        let backend = DiskBackend::open(dir.path()).unwrap();
        assert!(backend.load("missing").unwrap().is_none());
    }

    #[test]
    fn test_save_then_load_roundtrip() {
        let dir = TempDir::new().unwrap();
        let backend = DiskBackend::open(dir.path()).unwrap();

        let doc = json!({"name": "Alice", "skills": {"回避": {"job": 10}}});
        backend.save("char-1", &doc).unwrap();
        assert_eq!(backend.load("char-1").unwrap(), Some(doc));
    }

    #[test]
    fn test_save_replaces_previous_snapshot() {
        let dir = TempDir::new().unwrap();
        let backend = DiskBackend::open(dir.path()).unwrap();

        backend.save("e", &json!({"v": 1})).unwrap();
        backend.save("e", &json!({"v": 2})).unwrap();
        assert_eq!(backend.load("e").unwrap(), Some(json!({"v": 2})));
    }

    #[test]
    fn test_snapshots_survive_reopen() {
        let dir = TempDir::new().unwrap();
        {
            let backend = DiskBackend::open(dir.path()).unwrap();
            backend.save("e", &json!({"v": 1})).unwrap();
        }
        let backend = DiskBackend::open(dir.path()).unwrap();
        assert_eq!(backend.load("e").unwrap(), Some(json!({"v": 1})));
    }

    #[test]
    fn test_atomic_write_leaves_no_temp_files() {
        let dir = TempDir::new().unwrap();
        let backend = DiskBackend::open(dir.path()).unwrap();
        backend.save("e", &json!({"v": 1})).unwrap();

        let leftovers = fs::read_dir(dir.path().join("tmp")).unwrap().count();
        assert_eq!(leftovers, 0);
    }
}
