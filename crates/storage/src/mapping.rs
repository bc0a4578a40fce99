//! Serialized shape of the two persisted blobs.
//!
//! The progress map is stored as one JSON object keyed by topic id, the
//! settings as one flat JSON object. Field names are camelCase.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use hooks_core::model::{ProgressMap, ProgressRecord, Settings, TopicId};
use serde::{Deserialize, Serialize};

use crate::repository::StorageError;

/// Storage key of the progress map.
pub const PROGRESS_KEY: &str = "hooks-progress";

/// Storage key of the settings record.
pub const SETTINGS_KEY: &str = "hooks-settings";

fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub(crate) struct PersistedProgressRecord {
    completed: bool,
    time_spent: u64,
    last_visited: Option<DateTime<Utc>>,
    notes: String,
    bookmarked: bool,
}

impl PersistedProgressRecord {
    fn from_record(record: &ProgressRecord) -> Self {
        Self {
            completed: record.completed(),
            time_spent: record.time_spent_secs(),
            last_visited: record.last_visited(),
            notes: record.notes().to_owned(),
            bookmarked: record.bookmarked(),
        }
    }

    fn into_record(self) -> ProgressRecord {
        ProgressRecord::from_persisted(
            self.completed,
            self.time_spent,
            self.last_visited,
            self.notes,
            self.bookmarked,
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub(crate) struct PersistedSettings {
    theme: String,
    difficulty: String,
    show_hints: bool,
    auto_save: bool,
    sound_enabled: bool,
}

impl Default for PersistedSettings {
    fn default() -> Self {
        Self::from_settings(&Settings::default())
    }
}

impl PersistedSettings {
    fn from_settings(settings: &Settings) -> Self {
        Self {
            theme: settings.theme().to_string(),
            difficulty: settings.difficulty().to_string(),
            show_hints: settings.show_hints(),
            auto_save: settings.auto_save(),
            sound_enabled: settings.sound_enabled(),
        }
    }

    fn into_settings(self) -> Result<Settings, StorageError> {
        Ok(Settings::new(
            self.theme.parse().map_err(ser)?,
            self.difficulty.parse().map_err(ser)?,
            self.show_hints,
            self.auto_save,
            self.sound_enabled,
        ))
    }
}

/// Serialize the whole progress map.
///
/// # Errors
///
/// Returns `StorageError::Serialization` if encoding fails.
pub fn encode_progress(progress: &ProgressMap) -> Result<String, StorageError> {
    let blob: BTreeMap<&TopicId, PersistedProgressRecord> = progress
        .iter()
        .map(|(id, record)| (id, PersistedProgressRecord::from_record(record)))
        .collect();
    serde_json::to_string(&blob).map_err(ser)
}

/// Parse a progress blob. Fields missing from a record take their defaults.
///
/// # Errors
///
/// Returns `StorageError::Serialization` for malformed JSON, blank topic ids, or
/// two keys that name the same topic once trimmed.
pub fn decode_progress(raw: &str) -> Result<ProgressMap, StorageError> {
    let blob: BTreeMap<String, PersistedProgressRecord> =
        serde_json::from_str(raw).map_err(ser)?;
    let mut progress = ProgressMap::new();
    for (raw_id, record) in blob {
        let id = TopicId::new(raw_id.as_str()).map_err(ser)?;
        if progress.insert(id, record.into_record()).is_some() {
            return Err(ser(format!("duplicate topic id after trimming: {raw_id:?}")));
        }
    }
    Ok(progress)
}

/// Serialize the settings record.
///
/// # Errors
///
/// Returns `StorageError::Serialization` if encoding fails.
pub fn encode_settings(settings: &Settings) -> Result<String, StorageError> {
    serde_json::to_string(&PersistedSettings::from_settings(settings)).map_err(ser)
}

/// Parse a settings blob. Missing fields take their defaults; unknown theme or
/// difficulty names are an error.
///
/// # Errors
///
/// Returns `StorageError::Serialization` for malformed JSON or unknown enum values.
pub fn decode_settings(raw: &str) -> Result<Settings, StorageError> {
    let persisted: PersistedSettings = serde_json::from_str(raw).map_err(ser)?;
    persisted.into_settings()
}
