#![forbid(unsafe_code)]

pub mod error;
pub mod learning_hub;
pub mod progress_store;
pub mod settings_store;
pub mod visit;

pub use hooks_core::Clock;

pub use error::HubError;
pub use learning_hub::LearningHub;
pub use progress_store::ProgressStore;
pub use settings_store::SettingsStore;
pub use visit::TopicVisit;
