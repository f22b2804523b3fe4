//! JSON-file storage.
//!
//! The whole store is one JSON object. Every write rewrites the file through
//! a sibling temp file and a rename, so readers never observe a torn file.
//! Two processes writing the same file race with last-write-wins semantics.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::debug;

use portcullis_core::error::AppError;
use portcullis_core::result::AppResult;
use portcullis_core::traits::KeyValueStorage;

/// Key/value storage persisted to a JSON file.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    entries: Mutex<BTreeMap<String, String>>,
}

impl FileStorage {
    /// Open (or lazily create) the store at `path`.
    ///
    /// A missing file is an empty store; a file that is not a JSON object of
    /// strings is a storage error.
    pub fn open(path: impl AsRef<Path>) -> AppResult<Self> {
        let path = path.as_ref().to_path_buf();
        let entries = Self::read_file(&path)?;
        debug!(path = %path.display(), keys = entries.len(), "Opened file storage");
        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    /// Location of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_file(path: &Path) -> AppResult<BTreeMap<String, String>> {
        match std::fs::read_to_string(path) {
            Ok(raw) if raw.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(raw) => serde_json::from_str(&raw).map_err(|e| {
                AppError::with_source(
                    portcullis_core::error::ErrorKind::Storage,
                    format!("Corrupt storage file {}: {e}", path.display()),
                    e,
                )
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    /// Reload from disk, then apply `mutate` and persist. Reloading first
    /// keeps keys written by other processes that share the file.
    fn update<F>(&self, mutate: F) -> AppResult<()>
    where
        F: FnOnce(&mut BTreeMap<String, String>),
    {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| AppError::internal("File storage lock poisoned"))?;

        *entries = Self::read_file(&self.path)?;
        mutate(&mut entries);
        self.write_file(&entries)
    }

    fn write_file(&self, entries: &BTreeMap<String, String>) -> AppResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, serde_json::to_vec_pretty(entries)?)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    fn snapshot(&self) -> AppResult<BTreeMap<String, String>> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| AppError::internal("File storage lock poisoned"))?;
        *entries = Self::read_file(&self.path)?;
        Ok(entries.clone())
    }
}

impl KeyValueStorage for FileStorage {
    fn get(&self, key: &str) -> AppResult<Option<String>> {
        Ok(self.snapshot()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> AppResult<()> {
        self.update(|entries| {
            entries.insert(key.to_string(), value.to_string());
        })
    }

    fn remove(&self, key: &str) -> AppResult<()> {
        self.update(|entries| {
            entries.remove(key);
        })
    }

    fn keys(&self) -> AppResult<Vec<String>> {
        Ok(self.snapshot()?.into_keys().collect())
    }
}
