use std::sync::Arc;

use hooks_core::Clock;
use hooks_core::model::{ProgressMap, ProgressRecord, ProgressUpdate, TopicCatalog, TopicId};
use storage::repository::ProgressRepository;

use crate::error::HubError;
use crate::visit::TopicVisit;

/// Single source of truth for per-topic progress.
///
/// Loaded once at startup; every mutation updates memory first and then, when
/// auto-save is on, writes the whole map back. The in-memory map stays
/// authoritative if a write fails.
pub struct ProgressStore {
    clock: Clock,
    repo: Arc<dyn ProgressRepository>,
    catalog: TopicCatalog,
    records: ProgressMap,
    auto_save: bool,
}

impl ProgressStore {
    /// Load persisted progress, starting empty if it is missing or unreadable.
    pub async fn load(
        clock: Clock,
        repo: Arc<dyn ProgressRepository>,
        catalog: TopicCatalog,
    ) -> Self {
        let records = match repo.load_progress().await {
            Ok(Some(records)) => records,
            Ok(None) => ProgressMap::new(),
            Err(err) => {
                tracing::warn!(error = %err, "discarding unreadable progress, starting empty");
                ProgressMap::new()
            }
        };
        tracing::debug!(topics = records.len(), "progress loaded");

        Self {
            clock,
            repo,
            catalog,
            records,
            auto_save: true,
        }
    }

    #[must_use]
    pub fn with_auto_save(mut self, auto_save: bool) -> Self {
        self.auto_save = auto_save;
        self
    }

    pub fn set_auto_save(&mut self, auto_save: bool) {
        self.auto_save = auto_save;
    }

    #[must_use]
    pub fn auto_save(&self) -> bool {
        self.auto_save
    }

    pub fn set_clock(&mut self, clock: Clock) {
        self.clock = clock;
    }

    #[must_use]
    pub fn clock(&self) -> Clock {
        self.clock
    }

    #[must_use]
    pub fn catalog(&self) -> &TopicCatalog {
        &self.catalog
    }

    /// Read-only view of every record, for per-topic badges.
    #[must_use]
    pub fn records(&self) -> &ProgressMap {
        &self.records
    }

    #[must_use]
    pub fn topic(&self, topic: &TopicId) -> Option<&ProgressRecord> {
        self.records.get(topic)
    }

    /// Merge a partial update onto the topic's record, creating it on demand.
    ///
    /// Returns the merged record.
    pub async fn update_progress(
        &mut self,
        topic: &TopicId,
        update: ProgressUpdate,
    ) -> ProgressRecord {
        let record = self.records.apply(topic, &update).clone();
        self.autosave().await;
        record
    }

    /// Drop all progress, in memory and in storage. Settings are not touched.
    pub async fn reset_progress(&mut self) {
        self.records.clear();
        if let Err(err) = self.repo.clear_progress().await {
            tracing::warn!(error = %err, "failed to remove persisted progress");
        }
        tracing::info!("progress reset");
    }

    /// Write the current map regardless of auto-save.
    ///
    /// # Errors
    ///
    /// Returns `HubError::Storage` if the write fails.
    pub async fn flush(&self) -> Result<(), HubError> {
        self.repo.save_progress(&self.records).await?;
        Ok(())
    }

    #[must_use]
    pub fn completion_percentage(&self) -> u8 {
        self.records.completion_percentage(&self.catalog)
    }

    #[must_use]
    pub fn total_time_spent(&self) -> u64 {
        self.records.total_time_spent()
    }

    /// Mark the topic visited now and start timing the visit.
    pub async fn open_topic(&mut self, topic: &TopicId) -> TopicVisit {
        let now = self.clock.now();
        self.update_progress(topic, ProgressUpdate::new().visited_at(now))
            .await;
        TopicVisit::start(topic.clone(), now)
    }

    /// Close a visit, adding its elapsed seconds to the topic's time spent.
    ///
    /// Returns the new accumulated total.
    pub async fn close_topic(&mut self, visit: TopicVisit) -> u64 {
        let elapsed = visit.elapsed_secs(&self.clock);
        let previous = self
            .records
            .get(visit.topic())
            .map_or(0, ProgressRecord::time_spent_secs);
        let total = previous.saturating_add(elapsed);
        self.update_progress(visit.topic(), ProgressUpdate::new().time_spent(total))
            .await;
        total
    }

    /// Flip the bookmark flag, returning the new value.
    pub async fn toggle_bookmark(&mut self, topic: &TopicId) -> bool {
        let current = self.records.get(topic).is_some_and(ProgressRecord::bookmarked);
        self.update_progress(topic, ProgressUpdate::new().bookmarked(!current))
            .await
            .bookmarked()
    }

    pub async fn mark_complete(&mut self, topic: &TopicId) {
        self.update_progress(topic, ProgressUpdate::new().completed(true))
            .await;
    }

    pub async fn save_notes(&mut self, topic: &TopicId, notes: impl Into<String>) {
        self.update_progress(topic, ProgressUpdate::new().notes(notes))
            .await;
    }

    async fn autosave(&self) {
        if !self.auto_save {
            return;
        }
        match self.repo.save_progress(&self.records).await {
            Ok(()) => tracing::debug!(topics = self.records.len(), "progress saved"),
            Err(err) => {
                tracing::warn!(error = %err, "failed to save progress, keeping in-memory state");
            }
        }
    }
}
