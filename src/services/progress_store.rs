use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use tracing::{debug, warn};

use crate::utils::errors::StoreError;

/// Local persistent key-value store for resumable positions.
///
/// Entries are never expired or pruned.
pub trait ProgressStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
}

fn lock_entries(
    entries: &Mutex<HashMap<String, String>>,
) -> Result<MutexGuard<'_, HashMap<String, String>>, StoreError> {
    entries
        .lock()
        .map_err(|_| StoreError::Unavailable("progress store lock poisoned".to_string()))
}

/// Process-local store; contents vanish with the process.
#[derive(Debug, Default)]
pub struct MemoryProgressStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryProgressStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ProgressStore for MemoryProgressStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(lock_entries(&self.entries)?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        lock_entries(&self.entries)?.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Store backed by a single JSON object on disk, rewritten on every `set`.
///
/// Inside a tokio runtime the rewrite runs on the blocking pool and write
/// failures are logged; outside one it happens inline and errors are
/// returned. Each rewrite snapshots the latest entries, so later writes
/// always win.
#[derive(Debug, Clone)]
pub struct FileProgressStore {
    inner: Arc<FileInner>,
}

#[derive(Debug)]
struct FileInner {
    path: PathBuf,
    entries: Mutex<HashMap<String, String>>,
    write_lock: Mutex<()>,
}

impl FileProgressStore {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let entries = if path.exists() {
            let contents = fs::read_to_string(&path)?;
            if contents.trim().is_empty() {
                HashMap::new()
            } else {
                serde_json::from_str(&contents)?
            }
        } else {
            HashMap::new()
        };
        debug!("Opened progress store at {:?} ({} entries)", path, entries.len());

        Ok(Self {
            inner: Arc::new(FileInner {
                path,
                entries: Mutex::new(entries),
                write_lock: Mutex::new(()),
            }),
        })
    }

    pub fn path(&self) -> &Path {
        &self.inner.path
    }

    /// Write the current entries to disk on the calling thread.
    pub fn flush(&self) -> Result<(), StoreError> {
        self.inner.flush()
    }
}

impl FileInner {
    fn flush(&self) -> Result<(), StoreError> {
        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| StoreError::Unavailable("progress writer lock poisoned".to_string()))?;
        let contents = serde_json::to_string(&*lock_entries(&self.entries)?)?;

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, contents)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl ProgressStore for FileProgressStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(lock_entries(&self.inner.entries)?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        lock_entries(&self.inner.entries)?.insert(key.to_string(), value.to_string());

        match tokio::runtime::Handle::try_current() {
            Ok(runtime) => {
                let inner = self.inner.clone();
                runtime.spawn_blocking(move || {
                    if let Err(e) = inner.flush() {
                        warn!("Failed to write progress store {:?}: {}", inner.path, e);
                    }
                });
                Ok(())
            }
            Err(_) => self.inner.flush(),
        }
    }
}
