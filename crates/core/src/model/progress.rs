use std::collections::BTreeMap;
use std::num::NonZeroUsize;

use chrono::{DateTime, Utc};

use crate::model::catalog::TopicCatalog;
use crate::model::ids::TopicId;

/// `round(100 * part / total)`, rounding halves up, clamped to 100.
#[must_use]
pub fn rounded_percent(part: usize, total: NonZeroUsize) -> u8 {
    let total = total.get() as u128;
    let part = part as u128;
    let pct = (200 * part + total) / (2 * total);
    u8::try_from(pct.min(100)).unwrap_or(100)
}

//
// ─── RECORD ────────────────────────────────────────────────────────────────────
//

/// Learning progress for a single topic.
///
/// Created lazily: a topic that was never touched behaves as
/// `ProgressRecord::default()`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProgressRecord {
    completed: bool,
    time_spent_secs: u64,
    last_visited: Option<DateTime<Utc>>,
    notes: String,
    bookmarked: bool,
}

impl ProgressRecord {
    /// Rehydrate a record from storage.
    #[must_use]
    pub fn from_persisted(
        completed: bool,
        time_spent_secs: u64,
        last_visited: Option<DateTime<Utc>>,
        notes: String,
        bookmarked: bool,
    ) -> Self {
        Self {
            completed,
            time_spent_secs,
            last_visited,
            notes,
            bookmarked,
        }
    }

    /// Returns a new record with every field present in `update` overwritten.
    #[must_use]
    pub fn merged(&self, update: &ProgressUpdate) -> Self {
        Self {
            completed: update.completed.unwrap_or(self.completed),
            time_spent_secs: update.time_spent_secs.unwrap_or(self.time_spent_secs),
            last_visited: update.last_visited.or(self.last_visited),
            notes: update
                .notes
                .clone()
                .unwrap_or_else(|| self.notes.clone()),
            bookmarked: update.bookmarked.unwrap_or(self.bookmarked),
        }
    }

    #[must_use]
    pub fn completed(&self) -> bool {
        self.completed
    }

    /// Accumulated seconds across all visits.
    #[must_use]
    pub fn time_spent_secs(&self) -> u64 {
        self.time_spent_secs
    }

    /// `None` until the topic is first opened.
    #[must_use]
    pub fn last_visited(&self) -> Option<DateTime<Utc>> {
        self.last_visited
    }

    #[must_use]
    pub fn notes(&self) -> &str {
        &self.notes
    }

    #[must_use]
    pub fn bookmarked(&self) -> bool {
        self.bookmarked
    }
}

//
// ─── PARTIAL UPDATE ────────────────────────────────────────────────────────────
//

/// Any subset of `ProgressRecord` fields; `None` means "leave as is".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProgressUpdate {
    pub completed: Option<bool>,
    pub time_spent_secs: Option<u64>,
    pub last_visited: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub bookmarked: Option<bool>,
}

impl ProgressUpdate {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn completed(mut self, completed: bool) -> Self {
        self.completed = Some(completed);
        self
    }

    #[must_use]
    pub fn time_spent(mut self, secs: u64) -> Self {
        self.time_spent_secs = Some(secs);
        self
    }

    #[must_use]
    pub fn visited_at(mut self, at: DateTime<Utc>) -> Self {
        self.last_visited = Some(at);
        self
    }

    #[must_use]
    pub fn notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    #[must_use]
    pub fn bookmarked(mut self, bookmarked: bool) -> Self {
        self.bookmarked = Some(bookmarked);
        self
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

//
// ─── MAP ───────────────────────────────────────────────────────────────────────
//

/// All per-topic progress, keyed by topic id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProgressMap {
    records: BTreeMap<TopicId, ProgressRecord>,
}

impl ProgressMap {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge `update` onto the topic's record, creating it from defaults if absent.
    ///
    /// Returns the stored record.
    pub fn apply(&mut self, topic: &TopicId, update: &ProgressUpdate) -> &ProgressRecord {
        let merged = self
            .records
            .get(topic)
            .cloned()
            .unwrap_or_default()
            .merged(update);
        self.records.insert(topic.clone(), merged);
        &self.records[topic]
    }

    /// Inserts a whole record, returning the one it replaced.
    pub fn insert(&mut self, topic: TopicId, record: ProgressRecord) -> Option<ProgressRecord> {
        self.records.insert(topic, record)
    }

    #[must_use]
    pub fn get(&self, topic: &TopicId) -> Option<&ProgressRecord> {
        self.records.get(topic)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&TopicId, &ProgressRecord)> + '_ {
        self.records.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }

    #[must_use]
    pub fn completed_count(&self) -> usize {
        self.records.values().filter(|r| r.completed()).count()
    }

    /// Sum of `time_spent_secs` over every record.
    #[must_use]
    pub fn total_time_spent(&self) -> u64 {
        self.records
            .values()
            .fold(0_u64, |acc, r| acc.saturating_add(r.time_spent_secs()))
    }

    /// Percentage of the catalog marked completed, in `0..=100`.
    #[must_use]
    pub fn completion_percentage(&self, catalog: &TopicCatalog) -> u8 {
        rounded_percent(self.completed_count(), catalog.topic_count())
    }

    pub fn bookmarked(&self) -> impl Iterator<Item = &TopicId> + '_ {
        self.records
            .iter()
            .filter(|(_, r)| r.bookmarked())
            .map(|(id, _)| id)
    }
}

impl FromIterator<(TopicId, ProgressRecord)> for ProgressMap {
    fn from_iter<I: IntoIterator<Item = (TopicId, ProgressRecord)>>(iter: I) -> Self {
        Self {
            records: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;

    fn topic(id: &str) -> TopicId {
        TopicId::new(id).unwrap()
    }

    fn catalog(count: usize) -> TopicCatalog {
        TopicCatalog::with_count(NonZeroUsize::new(count).unwrap())
    }

    #[test]
    fn partial_updates_merge_field_wise() {
        let mut map = ProgressMap::new();
        let a = topic("a");
        map.apply(&a, &ProgressUpdate::new().bookmarked(true));
        let record = map.apply(&a, &ProgressUpdate::new().notes("x")).clone();

        assert!(!record.completed());
        assert_eq!(record.time_spent_secs(), 0);
        assert_eq!(record.notes(), "x");
        assert!(record.bookmarked());
        assert_eq!(record.last_visited(), None);
    }

    #[test]
    fn last_write_wins_per_field() {
        let mut map = ProgressMap::new();
        let a = topic("a");
        let now = fixed_now();
        map.apply(&a, &ProgressUpdate::new().visited_at(now).time_spent(10));
        map.apply(&a, &ProgressUpdate::new().time_spent(15).completed(true));
        map.apply(&a, &ProgressUpdate::new().completed(false));

        let record = map.get(&a).unwrap();
        assert_eq!(record.time_spent_secs(), 15);
        assert_eq!(record.last_visited(), Some(now));
        assert!(!record.completed());
    }

    #[test]
    fn empty_update_still_creates_record() {
        let mut map = ProgressMap::new();
        let update = ProgressUpdate::new();
        assert!(update.is_empty());
        let record = map.apply(&topic("fresh"), &update);
        assert_eq!(record, &ProgressRecord::default());
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn completion_percentage_uses_catalog_size() {
        let mut map = ProgressMap::new();
        for id in ["a", "b", "c", "d"] {
            map.apply(&topic(id), &ProgressUpdate::new().completed(true));
        }
        map.apply(&topic("e"), &ProgressUpdate::new().bookmarked(true));

        assert_eq!(map.completion_percentage(&catalog(16)), 25);
        assert_eq!(map.completion_percentage(&catalog(3)), 100);
    }

    #[test]
    fn percent_rounds_half_up() {
        let three = NonZeroUsize::new(3).unwrap();
        assert_eq!(rounded_percent(2, three), 67);
        assert_eq!(rounded_percent(1, three), 33);
        assert_eq!(rounded_percent(1, NonZeroUsize::new(8).unwrap()), 13);
        assert_eq!(rounded_percent(0, three), 0);
    }

    #[test]
    fn total_time_sums_records() {
        let mut map = ProgressMap::new();
        map.apply(&topic("a"), &ProgressUpdate::new().time_spent(40));
        map.apply(&topic("b"), &ProgressUpdate::new().time_spent(2));
        assert_eq!(map.total_time_spent(), 42);

        map.clear();
        assert_eq!(map.total_time_spent(), 0);
        assert_eq!(map.completion_percentage(&catalog(16)), 0);
    }

    #[test]
    fn bookmarked_lists_only_flagged_topics() {
        let mut map = ProgressMap::new();
        map.apply(&topic("b"), &ProgressUpdate::new().bookmarked(true));
        map.apply(&topic("a"), &ProgressUpdate::new().bookmarked(false));
        map.apply(&topic("c"), &ProgressUpdate::new().bookmarked(true));

        let ids: Vec<_> = map.bookmarked().map(TopicId::as_str).collect();
        assert_eq!(ids, vec!["b", "c"]);
    }
}
