//! Shared error types for the services crate.

use thiserror::Error;

use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;

/// Errors emitted while bootstrapping the hub or on explicit saves.
///
/// Routine reads and writes never surface here: they fall back to defaults or
/// keep the in-memory state and log instead.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum HubError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}
