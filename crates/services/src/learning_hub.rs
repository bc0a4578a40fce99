use std::sync::Arc;

use hooks_core::Clock;
use hooks_core::model::{
    CatalogEntry, ProgressUpdate, Settings, SettingsUpdate, TopicCatalog, TopicId,
};
use hooks_core::quiz::{QuizSession, QuizStep, is_passing};
use storage::repository::Storage;

use crate::error::HubError;
use crate::progress_store::ProgressStore;
use crate::settings_store::SettingsStore;

/// Composition root owning the progress and settings stores.
///
/// Views read and write through this; it keeps the progress store's auto-save
/// flag in step with the settings and turns finished quizzes into completion.
pub struct LearningHub {
    progress: ProgressStore,
    settings: SettingsStore,
}

impl LearningHub {
    /// Load both stores from the given storage backend.
    pub async fn load(storage: &Storage, clock: Clock, catalog: TopicCatalog) -> Self {
        let settings = SettingsStore::load(Arc::clone(&storage.settings)).await;
        let progress = ProgressStore::load(clock, Arc::clone(&storage.progress), catalog)
            .await
            .with_auto_save(settings.settings().auto_save());
        Self { progress, settings }
    }

    /// Build a hub backed by `SQLite` storage.
    ///
    /// # Errors
    ///
    /// Returns `HubError::Sqlite` if the database cannot be opened or migrated.
    pub async fn sqlite(
        db_url: &str,
        clock: Clock,
        catalog: TopicCatalog,
    ) -> Result<Self, HubError> {
        let storage = Storage::sqlite(db_url).await?;
        Ok(Self::load(&storage, clock, catalog).await)
    }

    pub async fn in_memory(clock: Clock, catalog: TopicCatalog) -> Self {
        Self::load(&Storage::in_memory(), clock, catalog).await
    }

    #[must_use]
    pub fn progress(&self) -> &ProgressStore {
        &self.progress
    }

    pub fn progress_mut(&mut self) -> &mut ProgressStore {
        &mut self.progress
    }

    #[must_use]
    pub fn settings(&self) -> &Settings {
        self.settings.settings()
    }

    /// Apply a settings change; always persisted.
    pub async fn update_settings(&mut self, update: SettingsUpdate) -> &Settings {
        let settings = self.settings.update_settings(update).await;
        self.progress.set_auto_save(settings.auto_save());
        settings
    }

    /// Catalog topics shown under the current difficulty filter.
    pub fn visible_topics(&self) -> impl Iterator<Item = &CatalogEntry> + '_ {
        self.progress
            .catalog()
            .filtered(self.settings.settings().difficulty())
    }

    /// Report a quiz score for a topic. A passing score marks it completed;
    /// a failing one leaves the record as it was.
    ///
    /// Returns whether the score passed.
    pub async fn record_quiz_result(&mut self, topic: &TopicId, score: u8) -> bool {
        let passed = is_passing(score);
        tracing::debug!(topic = %topic, score, passed, "quiz finished");
        if passed {
            self.progress
                .update_progress(topic, ProgressUpdate::new().completed(true))
                .await;
        }
        passed
    }

    /// Advance a quiz for `topic`, reporting the score when this call finishes it.
    pub async fn advance_quiz(&mut self, topic: &TopicId, quiz: &mut QuizSession) -> QuizStep {
        let was_finished = quiz.is_finished();
        let step = quiz.advance();
        if let QuizStep::Finished { score } = step {
            if !was_finished {
                self.record_quiz_result(topic, score).await;
            }
        }
        step
    }
}
