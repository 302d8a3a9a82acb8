//! [`TokenStorage`] backends.

use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use milagrosa_core::error::{MilagrosaError, MilagrosaResult};
use milagrosa_core::gateway::TokenStorage;
use parking_lot::Mutex;
use tracing::debug;

/// Storage that lives as long as the process.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    values: Mutex<BTreeMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TokenStorage for MemoryStorage {
    fn get(&self, key: &str) -> MilagrosaResult<Option<String>> {
        Ok(self.values.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> MilagrosaResult<()> {
        self.values.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> MilagrosaResult<()> {
        self.values.lock().remove(key);
        Ok(())
    }
}

/// Storage persisted as a flat JSON object in one file.
///
/// Every operation re-reads the file, so separate processes sharing the
/// path see each other's writes.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> MilagrosaResult<BTreeMap<String, String>> {
        match std::fs::read_to_string(&self.path) {
            Ok(content) if content.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(content) => serde_json::from_str(&content).map_err(|e| {
                MilagrosaError::Storage(format!("{}: {e}", self.path.display()))
            }),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(io_error(&self.path, e)),
        }
    }

    fn save(&self, values: &BTreeMap<String, String>) -> MilagrosaResult<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| io_error(parent, e))?;
        }
        let content = serde_json::to_string_pretty(values)
            .map_err(|e| MilagrosaError::Storage(e.to_string()))?;
        std::fs::write(&self.path, content).map_err(|e| io_error(&self.path, e))?;
        debug!(path = %self.path.display(), keys = values.len(), "storage saved");
        Ok(())
    }
}

fn io_error(path: &Path, e: std::io::Error) -> MilagrosaError {
    MilagrosaError::Storage(format!("{}: {e}", path.display()))
}

impl TokenStorage for FileStorage {
    fn get(&self, key: &str) -> MilagrosaResult<Option<String>> {
        let _guard = self.lock.lock();
        Ok(self.load()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> MilagrosaResult<()> {
        let _guard = self.lock.lock();
        let mut values = self.load()?;
        values.insert(key.to_string(), value.to_string());
        self.save(&values)
    }

    fn remove(&self, key: &str) -> MilagrosaResult<()> {
        let _guard = self.lock.lock();
        let mut values = self.load()?;
        if values.remove(key).is_some() {
            self.save(&values)?;
        }
        Ok(())
    }
}
