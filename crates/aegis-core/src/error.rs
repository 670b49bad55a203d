//! Error types for the Aegis search core.

use thiserror::Error;

/// Result type alias using the Aegis Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for search-core operations.
///
/// Per-item resolution failures (a hit or facet value that cannot be
/// resolved) are NOT errors — they are carried as
/// [`Resolution`](crate::traits::Resolution) variants and dropped locally.
/// Only hard failures live here.
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation failed (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// The external search engine could not be reached or answered abnormally
    #[error("Search engine unavailable: {0}")]
    EngineUnavailable(String),

    /// A query violated a stated invariant before submission to the engine
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Saved search not found
    #[error("Saved search not found: {0}")]
    SavedSearchNotFound(uuid::Uuid),

    /// Authenticated but not allowed to see the resource
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

// The search-engine HTTP client is the only reqwest consumer, so a transport
// failure is by definition an unreachable engine.
impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::EngineUnavailable(e.to_string())
    }
}
