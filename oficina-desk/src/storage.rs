//! LocalStore - persisted key/value settings
//!
//! A single JSON object on disk (`{data_dir}/storage.json`) holding the
//! auth token, the signed-in user and the saved list filters. Every write
//! is flushed immediately; the file is small.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use parking_lot::RwLock;
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

/// Storage keys
pub mod keys {
    pub const AUTH_TOKEN: &str = "oficina.auth.token";
    pub const AUTH_USER: &str = "oficina.auth.user";
    pub const ORDER_FILTERS: &str = "oficina.orders.filters";
}

const FILE_NAME: &str = "storage.json";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub struct LocalStore {
    /// `None` keeps everything in memory
    file_path: Option<PathBuf>,
    data: RwLock<BTreeMap<String, serde_json::Value>>,
}

impl LocalStore {
    /// Store that never touches the disk
    pub fn in_memory() -> Self {
        Self {
            file_path: None,
            data: RwLock::new(BTreeMap::new()),
        }
    }

    /// Load the store from `data_dir`, starting empty if no file exists
    pub fn load(data_dir: &Path) -> Result<Self, StorageError> {
        let file_path = data_dir.join(FILE_NAME);

        let data = if file_path.exists() {
            let content = std::fs::read_to_string(&file_path)?;
            match serde_json::from_str(&content) {
                Ok(data) => data,
                Err(e) => {
                    // A broken file only loses preferences, never blocks startup
                    tracing::warn!(path = %file_path.display(), error = %e, "Discarding unreadable storage file");
                    BTreeMap::new()
                }
            }
        } else {
            BTreeMap::new()
        };

        Ok(Self {
            file_path: Some(file_path),
            data: RwLock::new(data),
        })
    }

    pub fn file_path(&self) -> Option<&Path> {
        self.file_path.as_deref()
    }

    /// Read and decode a value; undecodable values read as absent
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let value = self.data.read().get(key).cloned()?;
        match serde_json::from_value(value) {
            Ok(v) => Some(v),
            Err(e) => {
                tracing::warn!(key, error = %e, "Ignoring malformed stored value");
                None
            }
        }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.data.read().contains_key(key)
    }

    pub fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), StorageError> {
        let value = serde_json::to_value(value)?;
        self.data.write().insert(key.to_string(), value);
        self.save()
    }

    pub fn remove(&self, key: &str) -> Result<(), StorageError> {
        let removed = self.data.write().remove(key).is_some();
        if removed { self.save() } else { Ok(()) }
    }

    /// Write the current contents to disk
    pub fn save(&self) -> Result<(), StorageError> {
        let Some(path) = &self.file_path else {
            return Ok(());
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(&*self.data.read())?;
        std::fs::write(path, content)?;
        tracing::debug!(path = %path.display(), "Storage saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::request::OrderFilters;
    use shared::order::TechnicalStatus;

    #[test]
    fn test_set_get_remove() {
        let store = LocalStore::in_memory();
        assert_eq!(store.get::<String>(keys::AUTH_TOKEN), None);

        store.set(keys::AUTH_TOKEN, "tok").unwrap();
        assert_eq!(store.get::<String>(keys::AUTH_TOKEN).as_deref(), Some("tok"));

        store.remove(keys::AUTH_TOKEN).unwrap();
        assert!(!store.contains(keys::AUTH_TOKEN));
    }

    #[test]
    fn test_persists_across_loads() {
        let dir = tempfile::tempdir().unwrap();
        let filters = OrderFilters {
            status: Some(TechnicalStatus::Ready),
            ..Default::default()
        };

        let store = LocalStore::load(dir.path()).unwrap();
        store.set(keys::ORDER_FILTERS, &filters).unwrap();
        drop(store);

        let reloaded = LocalStore::load(dir.path()).unwrap();
        assert_eq!(reloaded.get::<OrderFilters>(keys::ORDER_FILTERS), Some(filters));
    }

    #[test]
    fn test_corrupt_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(FILE_NAME), "{not json").unwrap();

        let store = LocalStore::load(dir.path()).unwrap();
        assert!(!store.contains(keys::AUTH_USER));
    }

    #[test]
    fn test_malformed_value_reads_as_absent() {
        let store = LocalStore::in_memory();
        store.set(keys::ORDER_FILTERS, &42).unwrap();
        assert_eq!(store.get::<OrderFilters>(keys::ORDER_FILTERS), None);
    }
}
