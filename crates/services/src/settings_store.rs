use std::sync::Arc;

use hooks_core::model::{Settings, SettingsUpdate};
use storage::repository::SettingsRepository;

/// Owns the learner's settings and writes every change through.
///
/// Unlike progress, settings are persisted on every update whatever the
/// `auto_save` flag says; that flag only governs progress.
pub struct SettingsStore {
    repo: Arc<dyn SettingsRepository>,
    settings: Settings,
}

impl SettingsStore {
    /// Load persisted settings (or defaults if missing or unreadable).
    pub async fn load(repo: Arc<dyn SettingsRepository>) -> Self {
        let settings = match repo.load_settings().await {
            Ok(settings) => settings.unwrap_or_default(),
            Err(err) => {
                tracing::warn!(error = %err, "discarding unreadable settings, using defaults");
                Settings::default()
            }
        };
        Self { repo, settings }
    }

    #[must_use]
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Merge `update` onto the current settings and persist the result.
    pub async fn update_settings(&mut self, update: SettingsUpdate) -> &Settings {
        self.settings = self.settings.merged(&update);
        if let Err(err) = self.repo.save_settings(&self.settings).await {
            tracing::warn!(error = %err, "failed to save settings, keeping in-memory state");
        }
        &self.settings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hooks_core::model::{Difficulty, Theme};
    use storage::mapping::SETTINGS_KEY;
    use storage::repository::InMemoryRepository;

    #[tokio::test]
    async fn fresh_install_uses_defaults_without_writing() {
        let repo = InMemoryRepository::new();
        let store = SettingsStore::load(Arc::new(repo.clone())).await;
        assert_eq!(store.settings(), &Settings::default());
        assert_eq!(repo.write_count(SETTINGS_KEY), 0);
    }

    #[tokio::test]
    async fn updates_always_persist() {
        let repo = InMemoryRepository::new();
        let mut store = SettingsStore::load(Arc::new(repo.clone())).await;

        store
            .update_settings(SettingsUpdate::new().auto_save(false))
            .await;
        store
            .update_settings(SettingsUpdate::new().difficulty(Difficulty::Intermediate))
            .await;
        assert_eq!(repo.write_count(SETTINGS_KEY), 2);

        let reloaded = SettingsStore::load(Arc::new(repo)).await;
        assert!(!reloaded.settings().auto_save());
        assert_eq!(reloaded.settings().difficulty(), Difficulty::Intermediate);
        assert_eq!(reloaded.settings().theme(), Theme::Light);
    }

    #[tokio::test]
    async fn corrupt_settings_fall_back_to_defaults() {
        let repo = InMemoryRepository::new();
        repo.put_raw(SETTINGS_KEY, r#"{"theme":"sepia"}"#);
        let store = SettingsStore::load(Arc::new(repo)).await;
        assert_eq!(store.settings(), &Settings::default());
    }
}
