use chrono::{DateTime, Utc};
use hooks_core::Clock;
use hooks_core::model::TopicId;

/// An open topic view.
///
/// Returned by `ProgressStore::open_topic` and consumed by
/// `ProgressStore::close_topic`, which folds the elapsed time into the topic's
/// `time_spent`. Dropping a visit without closing it loses that time.
#[derive(Debug, PartialEq, Eq)]
#[must_use = "a topic visit must be passed to `close_topic` to record time spent"]
pub struct TopicVisit {
    topic: TopicId,
    started_at: DateTime<Utc>,
}

impl TopicVisit {
    pub(crate) fn start(topic: TopicId, started_at: DateTime<Utc>) -> Self {
        Self { topic, started_at }
    }

    #[must_use]
    pub fn topic(&self) -> &TopicId {
        &self.topic
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Seconds since the visit started, for a ticking on-screen timer.
    #[must_use]
    pub fn elapsed_secs(&self, clock: &Clock) -> u64 {
        clock.seconds_since(self.started_at)
    }
}
