use async_trait::async_trait;
use hooks_core::model::{ProgressMap, Settings};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

use crate::mapping::{
    PROGRESS_KEY, SETTINGS_KEY, decode_progress, decode_settings, encode_progress,
    encode_settings,
};

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Durable home of the per-topic progress map.
#[async_trait]
pub trait ProgressRepository: Send + Sync {
    /// Read the persisted progress map.
    ///
    /// Returns `Ok(None)` when nothing has been saved yet.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Serialization` for a malformed blob, or other storage errors.
    async fn load_progress(&self) -> Result<Option<ProgressMap>, StorageError>;

    /// Overwrite the persisted progress map.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the map cannot be stored.
    async fn save_progress(&self, progress: &ProgressMap) -> Result<(), StorageError>;

    /// Remove the persisted progress entry entirely.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the entry cannot be removed.
    async fn clear_progress(&self) -> Result<(), StorageError>;
}

/// Durable home of the settings record.
#[async_trait]
pub trait SettingsRepository: Send + Sync {
    /// Read persisted settings, `Ok(None)` if never saved.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Serialization` for a malformed blob, or other storage errors.
    async fn load_settings(&self) -> Result<Option<Settings>, StorageError>;

    /// Overwrite persisted settings.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the settings cannot be stored.
    async fn save_settings(&self, settings: &Settings) -> Result<(), StorageError>;
}

/// In-memory key/value backend for tests and prototyping.
///
/// Holds the same JSON blobs the SQLite backend does, so tests can inspect or
/// corrupt them.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    entries: Arc<Mutex<HashMap<String, String>>>,
    writes: Arc<Mutex<HashMap<String, usize>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw blob stored under `key`, if any.
    #[must_use]
    pub fn raw(&self, key: &str) -> Option<String> {
        self.entries
            .lock()
            .ok()
            .and_then(|guard| guard.get(key).cloned())
    }

    /// Store a raw blob, bypassing serialization. Does not count as a write.
    pub fn put_raw(&self, key: &str, value: impl Into<String>) {
        if let Ok(mut guard) = self.entries.lock() {
            guard.insert(key.to_string(), value.into());
        }
    }

    /// How many times `key` has been written through the repository traits.
    #[must_use]
    pub fn write_count(&self, key: &str) -> usize {
        self.writes
            .lock()
            .ok()
            .and_then(|guard| guard.get(key).copied())
            .unwrap_or(0)
    }

    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let guard = self
            .entries
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.get(key).cloned())
    }

    fn put(&self, key: &str, value: String) -> Result<(), StorageError> {
        {
            let mut guard = self
                .entries
                .lock()
                .map_err(|e| StorageError::Connection(e.to_string()))?;
            guard.insert(key.to_string(), value);
        }
        let mut writes = self
            .writes
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        *writes.entry(key.to_string()).or_insert(0) += 1;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut guard = self
            .entries
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.remove(key);
        Ok(())
    }
}

#[async_trait]
impl ProgressRepository for InMemoryRepository {
    async fn load_progress(&self) -> Result<Option<ProgressMap>, StorageError> {
        self.get(PROGRESS_KEY)?
            .map(|raw| decode_progress(&raw))
            .transpose()
    }

    async fn save_progress(&self, progress: &ProgressMap) -> Result<(), StorageError> {
        self.put(PROGRESS_KEY, encode_progress(progress)?)
    }

    async fn clear_progress(&self) -> Result<(), StorageError> {
        self.remove(PROGRESS_KEY)
    }
}

#[async_trait]
impl SettingsRepository for InMemoryRepository {
    async fn load_settings(&self) -> Result<Option<Settings>, StorageError> {
        self.get(SETTINGS_KEY)?
            .map(|raw| decode_settings(&raw))
            .transpose()
    }

    async fn save_settings(&self, settings: &Settings) -> Result<(), StorageError> {
        self.put(SETTINGS_KEY, encode_settings(settings)?)
    }
}

/// Aggregates the two repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub progress: Arc<dyn ProgressRepository>,
    pub settings: Arc<dyn SettingsRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        Self::from_in_memory(&InMemoryRepository::new())
    }

    /// Wrap an existing in-memory repository, keeping a handle for inspection.
    #[must_use]
    pub fn from_in_memory(repo: &InMemoryRepository) -> Self {
        let progress: Arc<dyn ProgressRepository> = Arc::new(repo.clone());
        let settings: Arc<dyn SettingsRepository> = Arc::new(repo.clone());
        Self { progress, settings }
    }
}
