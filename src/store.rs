//! Snapshot persistence behind a small trait.
//!
//! The core never depends on a storage technology; it only needs the latest
//! snapshot to survive and a reset that makes the next load behave as a first run.
//! Failures are reported as [`Error::StoreUnavailable`] and never retried here.

use crate::core::GridSnapshot;
use crate::error::{Error, Result};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Keyed storage for the single current grid snapshot.
pub trait GridStore: Send + Sync {
    /// Latest saved snapshot, or `None` when nothing is persisted.
    fn load_snapshot(&self) -> Result<Option<GridSnapshot>>;

    /// Replace the persisted snapshot.
    fn save_snapshot(&self, snapshot: &GridSnapshot) -> Result<()>;

    /// Drop the persisted snapshot. Clearing an empty store succeeds.
    fn clear(&self) -> Result<()>;
}

impl<T: GridStore + ?Sized> GridStore for Box<T> {
    fn load_snapshot(&self) -> Result<Option<GridSnapshot>> {
        (**self).load_snapshot()
    }

    fn save_snapshot(&self, snapshot: &GridSnapshot) -> Result<()> {
        (**self).save_snapshot(snapshot)
    }

    fn clear(&self) -> Result<()> {
        (**self).clear()
    }
}

/// In-process store holding the snapshot as serialized JSON.
#[derive(Debug, Default)]
pub struct MemoryStore {
    slot: Mutex<Option<String>>,
}

impl MemoryStore {
    /// An empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn with_slot<T>(&self, op: &str, f: impl FnOnce(&mut Option<String>) -> Result<T>) -> Result<T> {
        let mut guard = self
            .slot
            .lock()
            .map_err(|e| Error::store(format!("memory store {op}"), e.to_string()))?;
        f(&mut *guard)
    }
}

impl GridStore for MemoryStore {
    fn load_snapshot(&self) -> Result<Option<GridSnapshot>> {
        self.with_slot("load", |slot| match slot.as_deref() {
            Some(json) => Ok(Some(serde_json::from_str(json)?)),
            None => Ok(None),
        })
    }

    fn save_snapshot(&self, snapshot: &GridSnapshot) -> Result<()> {
        let json = serde_json::to_string(snapshot)?;
        self.with_slot("save", |slot| {
            *slot = Some(json);
            Ok(())
        })
    }

    fn clear(&self) -> Result<()> {
        self.with_slot("clear", |slot| {
            *slot = None;
            Ok(())
        })
    }
}

/// Snapshot stored as a JSON document on disk.
///
/// Saves go through a sibling `.tmp` file and a rename, so a reader never sees a
/// half-written snapshot.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    /// Store the snapshot at `path`. Nothing is touched until the first save.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the snapshot document.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl GridStore for JsonFileStore {
    fn load_snapshot(&self) -> Result<Option<GridSnapshot>> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(Error::store(format!("load {}", self.path.display()), e)),
        };
        Ok(Some(serde_json::from_str(&text)?))
    }

    fn save_snapshot(&self, snapshot: &GridSnapshot) -> Result<()> {
        let json = serde_json::to_vec(snapshot)?;
        let tmp = self.tmp_path();
        let discard_tmp = |context: String, e: std::io::Error| {
            let _ = fs::remove_file(&tmp);
            Error::store(context, e)
        };
        fs::write(&tmp, json).map_err(|e| discard_tmp(format!("write {}", tmp.display()), e))?;
        fs::rename(&tmp, &self.path)
            .map_err(|e| discard_tmp(format!("save {}", self.path.display()), e))
    }

    fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Error::store(format!("clear {}", self.path.display()), e)),
        }
    }
}
