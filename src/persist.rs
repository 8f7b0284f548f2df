//! Persistence backends for the task store.
//!
//! One store, two interchangeable backings behind the same save/load
//! contract: a flat data file and an in-memory snapshot. Selection comes
//! from `[storage]` in `.slate.toml`. Backends never mutate a live store;
//! `load` builds a fresh one from the codec and the caller swaps it in,
//! so a failed load leaves running state untouched.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use tracing::debug;

use crate::codec;
use crate::config::{BackendKind, Config};
use crate::error::Result;
use crate::store::TaskStore;

/// Save/load contract shared by all backings
pub trait Backend {
    fn save(&self, store: &TaskStore) -> Result<()>;
    fn load(&self) -> Result<TaskStore>;
}

/// Pick the configured backend, rooted at the workspace directory
pub fn backend_for(root: &Path, config: &Config) -> Box<dyn Backend> {
    match config.storage.backend {
        BackendKind::File => Box::new(FileBackend::new(
            root.join(&config.storage.path),
            config.history.capacity,
        )),
        BackendKind::Memory => Box::new(MemoryBackend::new(config.history.capacity)),
    }
}

// =============================================================================
// Flat-file backing
// =============================================================================

#[derive(Debug, Clone)]
pub struct FileBackend {
    path: PathBuf,
    history_capacity: usize,
}

impl FileBackend {
    pub fn new(path: impl Into<PathBuf>, history_capacity: usize) -> Self {
        Self {
            path: path.into(),
            history_capacity,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Backend for FileBackend {
    /// Write atomically via temp file + rename so readers never see a
    /// partial snapshot; the handle is flushed and closed on every path.
    fn save(&self, store: &TaskStore) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let temp = self.path.with_extension("tmp");
        let mut file = File::create(&temp)?;
        file.write_all(codec::encode(store).as_bytes())?;
        file.sync_all()?;
        fs::rename(&temp, &self.path)?;
        debug!(path = %self.path.display(), "store saved");
        Ok(())
    }

    /// A missing file is an empty store, not an error
    fn load(&self) -> Result<TaskStore> {
        if !self.path.exists() {
            return Ok(TaskStore::with_history_capacity(self.history_capacity));
        }
        let text = fs::read_to_string(&self.path)?;
        codec::decode(&text, self.history_capacity)
    }
}

// =============================================================================
// In-memory backing
// =============================================================================

/// Keeps the last encoded snapshot in memory; used when persistence is
/// disabled and by tests exercising the save/load contract.
#[derive(Debug)]
pub struct MemoryBackend {
    snapshot: Mutex<Option<String>>,
    history_capacity: usize,
}

impl MemoryBackend {
    pub fn new(history_capacity: usize) -> Self {
        Self {
            snapshot: Mutex::new(None),
            history_capacity,
        }
    }
}

impl Backend for MemoryBackend {
    fn save(&self, store: &TaskStore) -> Result<()> {
        let mut guard = self
            .snapshot
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        *guard = Some(codec::encode(store));
        Ok(())
    }

    fn load(&self) -> Result<TaskStore> {
        let guard = self
            .snapshot
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        match guard.as_deref() {
            Some(text) => codec::decode(text, self.history_capacity),
            None => Ok(TaskStore::with_history_capacity(self.history_capacity)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::NewTask;
    use tempfile::TempDir;

    #[test]
    fn file_backend_round_trips_through_disk() {
        let dir = TempDir::new().unwrap();
        let backend = FileBackend::new(dir.path().join("data/tasks.csv"), 10);

        // Missing file loads empty.
        assert!(backend.load().unwrap().tasks().is_empty());

        let mut store = TaskStore::new();
        store
            .create_task(NewTask {
                name: "persisted".into(),
                ..Default::default()
            })
            .unwrap();
        backend.save(&store).unwrap();

        let loaded = backend.load().unwrap();
        assert_eq!(loaded.tasks(), store.tasks());
        // No temp file is left behind.
        assert!(!dir.path().join("data/tasks.tmp").exists());
    }

    #[test]
    fn file_backend_save_overwrites_previous_snapshot() {
        let dir = TempDir::new().unwrap();
        let backend = FileBackend::new(dir.path().join("tasks.csv"), 10);

        let mut store = TaskStore::new();
        let id = store
            .create_task(NewTask {
                name: "v1".into(),
                ..Default::default()
            })
            .unwrap();
        backend.save(&store).unwrap();

        store.delete_task(id).unwrap();
        backend.save(&store).unwrap();
        assert!(backend.load().unwrap().tasks().is_empty());
    }

    #[test]
    fn corrupt_file_fails_without_touching_the_caller_state() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tasks.csv");
        std::fs::write(&path, "garbage header\n").unwrap();

        let backend = FileBackend::new(&path, 10);
        assert!(backend.load().is_err());
    }

    #[test]
    fn memory_backend_honors_the_same_contract() {
        let backend = MemoryBackend::new(10);
        assert!(backend.load().unwrap().tasks().is_empty());

        let mut store = TaskStore::new();
        store
            .create_task(NewTask {
                name: "volatile".into(),
                ..Default::default()
            })
            .unwrap();
        backend.save(&store).unwrap();
        assert_eq!(backend.load().unwrap().tasks(), store.tasks());
    }
}
