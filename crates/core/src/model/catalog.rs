use std::fmt;
use std::num::NonZeroUsize;
use std::str::FromStr;

use thiserror::Error;

use crate::model::ids::TopicId;
use crate::model::settings::Difficulty;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CatalogError {
    #[error("topic catalog cannot be empty")]
    Empty,

    #[error("duplicate topic in catalog: {0}")]
    DuplicateTopic(TopicId),

    #[error("unknown topic level: {0}")]
    UnknownLevel(String),
}

/// Level a topic is aimed at, matched against the difficulty filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TopicLevel {
    Beginner,
    Intermediate,
    Advanced,
}

impl TopicLevel {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            TopicLevel::Beginner => "beginner",
            TopicLevel::Intermediate => "intermediate",
            TopicLevel::Advanced => "advanced",
        }
    }
}

impl fmt::Display for TopicLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TopicLevel {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "beginner" => Ok(Self::Beginner),
            "intermediate" => Ok(Self::Intermediate),
            "advanced" => Ok(Self::Advanced),
            other => Err(CatalogError::UnknownLevel(other.to_string())),
        }
    }
}

/// One topic known to the content catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    pub id: TopicId,
    pub level: TopicLevel,
}

impl CatalogEntry {
    #[must_use]
    pub fn new(id: TopicId, level: TopicLevel) -> Self {
        Self { id, level }
    }
}

/// The full set of topics the learner can complete.
///
/// Completion percentages are computed against `topic_count`, which is
/// supplied here rather than derived from visited topics, so unvisited topics
/// still count toward the denominator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicCatalog {
    entries: Vec<CatalogEntry>,
    topic_count: NonZeroUsize,
}

impl TopicCatalog {
    /// Builds a catalog from its entries, in display order.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Empty` for an empty list and
    /// `CatalogError::DuplicateTopic` if an id appears twice.
    pub fn new(entries: Vec<CatalogEntry>) -> Result<Self, CatalogError> {
        let topic_count = NonZeroUsize::new(entries.len()).ok_or(CatalogError::Empty)?;
        for (idx, entry) in entries.iter().enumerate() {
            if entries[..idx].iter().any(|seen| seen.id == entry.id) {
                return Err(CatalogError::DuplicateTopic(entry.id.clone()));
            }
        }
        Ok(Self {
            entries,
            topic_count,
        })
    }

    /// A catalog that only knows its size, for hosts that keep the topic list elsewhere.
    #[must_use]
    pub fn with_count(topic_count: NonZeroUsize) -> Self {
        Self {
            entries: Vec::new(),
            topic_count,
        }
    }

    #[must_use]
    pub fn topic_count(&self) -> NonZeroUsize {
        self.topic_count
    }

    #[must_use]
    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    /// Entries visible under the given difficulty filter.
    pub fn filtered(&self, difficulty: Difficulty) -> impl Iterator<Item = &CatalogEntry> + '_ {
        self.entries
            .iter()
            .filter(move |entry| difficulty.admits(entry.level))
    }
}
