//! Persistent key/value storage and the location record kept in it.

use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
    sync::Arc,
};

use parking_lot::Mutex;

use crate::{error::StoreError, model::PersistedLocation};

pub const LOCATION_KEY: &str = "weather.location.key";
pub const LOCATION_LABEL: &str = "weather.location.label";

/// Process-wide string store that survives restarts.
pub trait KeyValueStore: Send + Sync + std::fmt::Debug {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Write all `entries` or none of them.
    fn set_many(&self, entries: &[(&str, &str)]) -> Result<(), StoreError>;

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.set_many(&[(key, value)])
    }
}

/// Volatile store, used in tests and when no data directory is available.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<BTreeMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.values.lock().get(key).cloned())
    }

    fn set_many(&self, entries: &[(&str, &str)]) -> Result<(), StoreError> {
        let mut values = self.values.lock();
        for (key, value) in entries {
            values.insert(key.to_string(), value.to_string());
        }
        Ok(())
    }
}

/// TOML file with a flat table of string values.
///
/// The whole table is rewritten on every write.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    values: Mutex<BTreeMap<String, String>>,
}

impl FileStore {
    /// Open the store at `path`, starting empty if the file does not exist yet.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let values = if path.exists() {
            let contents = fs::read_to_string(&path)
                .map_err(|source| StoreError::Read { path: path.display().to_string(), source })?;
            toml::from_str(&contents)
                .map_err(|source| StoreError::Parse { path: path.display().to_string(), source })?
        } else {
            BTreeMap::new()
        };

        Ok(Self { path, values: Mutex::new(values) })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self, values: &BTreeMap<String, String>) -> Result<(), StoreError> {
        let write_err = |source| StoreError::Write { path: self.path.display().to_string(), source };

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(write_err)?;
        }
        let contents = toml::to_string_pretty(values)?;
        fs::write(&self.path, contents).map_err(write_err)
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.values.lock().get(key).cloned())
    }

    fn set_many(&self, entries: &[(&str, &str)]) -> Result<(), StoreError> {
        let mut values = self.values.lock();
        let mut updated = values.clone();
        for (key, value) in entries {
            updated.insert(key.to_string(), value.to_string());
        }

        // memory only moves once the file holds the new table
        self.flush(&updated)?;
        *values = updated;
        Ok(())
    }
}

/// Typed view over a [`KeyValueStore`] holding the persisted location.
///
/// A key without a label (or the reverse) reads as no location at all.
#[derive(Debug, Clone)]
pub struct LocationStore {
    inner: Arc<dyn KeyValueStore>,
}

impl LocationStore {
    pub fn new(inner: Arc<dyn KeyValueStore>) -> Self {
        Self { inner }
    }

    pub fn load(&self) -> Result<Option<PersistedLocation>, StoreError> {
        let key = self.inner.get(LOCATION_KEY)?.filter(|v| !v.is_empty());
        let label = self.inner.get(LOCATION_LABEL)?.filter(|v| !v.is_empty());

        Ok(match (key, label) {
            (Some(key), Some(label)) => Some(PersistedLocation { key, label }),
            _ => None,
        })
    }

    pub fn save(&self, location: &PersistedLocation) -> Result<(), StoreError> {
        tracing::debug!(key = %location.key, label = %location.label, "persisting location");
        self.inner.set_many(&[
            (LOCATION_KEY, location.key.as_str()),
            (LOCATION_LABEL, location.label.as_str()),
        ])
    }
}
