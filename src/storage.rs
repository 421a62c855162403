//! Key/value persistence for the active tasks and the archive
//!
//! Each key holds a whole JSON array and is overwritten on every save.
//!
//! ```text
//! <data_dir>/
//! ├── currentTasks.json   # active tasks
//! └── taskHistory.json    # archived tasks
//! ```

use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::{DeckError, Result};
use crate::store::TaskStore;
use crate::task::Task;

/// Key holding the active task list
pub const CURRENT_TASKS_KEY: &str = "currentTasks";

/// Key holding the completed task archive
pub const TASK_HISTORY_KEY: &str = "taskHistory";

/// Minimal string key/value store
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
    fn remove(&mut self, key: &str) -> Result<()>;
}

/// One `<key>.json` file per key inside a directory
#[derive(Debug, Clone)]
pub struct FileStorage {
    base_path: PathBuf,
}

impl FileStorage {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let base_path = path.as_ref().to_path_buf();
        fs::create_dir_all(&base_path)?;
        debug!(?base_path, "Opened file storage");
        Ok(Self { base_path })
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    fn key_path(&self, key: &str) -> PathBuf {
        self.base_path.join(format!("{}.json", key))
    }
}

impl KeyValueStore for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        match fs::read_to_string(self.key_path(key)) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        fs::write(self.key_path(key), value)?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        match fs::remove_file(self.key_path(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// In-process storage, used by tests and dry runs
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    entries: HashMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.entries.remove(key);
        Ok(())
    }
}

/// Read a task array. Malformed content clears the key and yields an empty list.
pub fn load_tasks<S: KeyValueStore + ?Sized>(storage: &mut S, key: &str) -> Result<Vec<Task>> {
    let data = match storage.get(key) {
        Ok(Some(data)) => data,
        Ok(None) => return Ok(Vec::new()),
        Err(DeckError::Io(err)) if err.kind() == ErrorKind::InvalidData => {
            warn!(key, %err, "load_tasks: unreadable content, clearing key");
            storage.remove(key)?;
            return Ok(Vec::new());
        }
        Err(err) => return Err(err),
    };
    match serde_json::from_str(&data) {
        Ok(tasks) => Ok(tasks),
        Err(err) => {
            warn!(key, %err, "load_tasks: malformed JSON, clearing key");
            storage.remove(key)?;
            Ok(Vec::new())
        }
    }
}

pub fn save_tasks<S: KeyValueStore + ?Sized>(storage: &mut S, key: &str, tasks: &[Task]) -> Result<()> {
    let data = serde_json::to_string_pretty(tasks)?;
    storage.set(key, &data)
}

/// Load both lists into a store
pub fn load<S: KeyValueStore + ?Sized>(storage: &mut S) -> Result<TaskStore> {
    let active = load_tasks(storage, CURRENT_TASKS_KEY)?;
    let archive = load_tasks(storage, TASK_HISTORY_KEY)?;
    debug!(active = active.len(), archived = archive.len(), "load: store loaded");
    Ok(TaskStore::from_parts(active, archive))
}

/// Write both lists. Call after every mutation.
pub fn persist<S: KeyValueStore + ?Sized>(store: &TaskStore, storage: &mut S) -> Result<()> {
    save_tasks(storage, CURRENT_TASKS_KEY, store.active())?;
    save_tasks(storage, TASK_HISTORY_KEY, store.archive())?;
    debug!(
        active = store.active().len(),
        archived = store.archive().len(),
        "persist: store saved"
    );
    Ok(())
}
