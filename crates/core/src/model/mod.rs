mod catalog;
mod ids;
mod progress;
mod question;
mod settings;

pub use catalog::{CatalogEntry, CatalogError, TopicCatalog, TopicLevel};
pub use ids::{IdError, QuestionId, TopicId};
pub use progress::{ProgressMap, ProgressRecord, ProgressUpdate, rounded_percent};
pub use question::{QuizError, QuizQuestion};
pub use settings::{Difficulty, Settings, SettingsError, SettingsUpdate, Theme};
