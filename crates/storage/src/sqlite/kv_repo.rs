use async_trait::async_trait;
use chrono::Utc;
use hooks_core::model::{ProgressMap, Settings};
use sqlx::Row;

use super::SqliteRepository;
use crate::mapping::{
    PROGRESS_KEY, SETTINGS_KEY, decode_progress, decode_settings, encode_progress,
    encode_settings,
};
use crate::repository::{ProgressRepository, SettingsRepository, StorageError};

fn conn<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Connection(e.to_string())
}

impl SqliteRepository {
    async fn get_entry(&self, key: &str) -> Result<Option<String>, StorageError> {
        let row = sqlx::query("SELECT value FROM kv_entries WHERE key = ?1")
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(conn)?;

        row.map(|row| {
            row.try_get::<String, _>("value")
                .map_err(|e| StorageError::Serialization(e.to_string()))
        })
        .transpose()
    }

    async fn put_entry(&self, key: &str, value: String) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO kv_entries (key, value, updated_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            ",
        )
        .bind(key)
        .bind(value)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(conn)?;

        Ok(())
    }

    async fn delete_entry(&self, key: &str) -> Result<(), StorageError> {
        sqlx::query("DELETE FROM kv_entries WHERE key = ?1")
            .bind(key)
            .execute(&self.pool)
            .await
            .map_err(conn)?;
        Ok(())
    }
}

#[async_trait]
impl ProgressRepository for SqliteRepository {
    async fn load_progress(&self) -> Result<Option<ProgressMap>, StorageError> {
        self.get_entry(PROGRESS_KEY)
            .await?
            .map(|raw| decode_progress(&raw))
            .transpose()
    }

    async fn save_progress(&self, progress: &ProgressMap) -> Result<(), StorageError> {
        let blob = encode_progress(progress)?;
        self.put_entry(PROGRESS_KEY, blob).await
    }

    async fn clear_progress(&self) -> Result<(), StorageError> {
        self.delete_entry(PROGRESS_KEY).await
    }
}

#[async_trait]
impl SettingsRepository for SqliteRepository {
    async fn load_settings(&self) -> Result<Option<Settings>, StorageError> {
        self.get_entry(SETTINGS_KEY)
            .await?
            .map(|raw| decode_settings(&raw))
            .transpose()
    }

    async fn save_settings(&self, settings: &Settings) -> Result<(), StorageError> {
        let blob = encode_settings(settings)?;
        self.put_entry(SETTINGS_KEY, blob).await
    }
}
