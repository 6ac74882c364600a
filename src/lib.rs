//! # najdict - Naj-English dictionary service
//!
//! A bilingual lexicon kept in a single SQLite file and served over a small
//! HTTP API.
//!
//! najdict provides:
//! - A declared relational schema reconciled against the database at startup
//! - A typed repository over the seven dictionary tables
//! - Regex lookup over naj lemmas with a lenient fallback for bad patterns
//! - An axum server exposing lookup, class listing and class creation

pub mod config;
pub mod models;
pub mod pattern;
pub mod query;
pub mod server;
pub mod storage;
pub mod ui;

// Re-exports for convenient access
pub use models::{
    CrossReference, SourceEntry, SourceEntryNote, SourceWordClass, TargetEntry, TargetWordClass,
    Translation,
};
pub use pattern::LemmaPattern;
pub use query::{Lookup, SearchHit};
pub use storage::DictionaryStore;

/// Result type alias for najdict operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for najdict operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Never leaves the pattern module; kept so the failure has a name in logs.
    #[error("Invalid pattern: {0}")]
    InvalidPattern(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    #[error("Storage error: {0}")]
    Storage(rusqlite::Error),

    #[error("Schema error: {0}")]
    Schema(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Background task failed: {0}")]
    Task(String),
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        match err {
            rusqlite::Error::SqliteFailure(code, message)
                if code.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                Error::ConstraintViolation(message.unwrap_or_else(|| code.to_string()))
            }
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound("no matching row".to_string()),
            other => Error::Storage(other),
        }
    }
}

impl From<tokio::task::JoinError> for Error {
    fn from(err: tokio::task::JoinError) -> Self {
        Error::Task(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constraint_failures_are_classified() {
        let conn = rusqlite::Connection::open_in_memory().unwrap();
        conn.execute("CREATE TABLE t (id INTEGER PRIMARY KEY)", []).unwrap();
        conn.execute("INSERT INTO t (id) VALUES (1)", []).unwrap();

        let err: Error = conn
            .execute("INSERT INTO t (id) VALUES (1)", [])
            .unwrap_err()
            .into();
        assert!(matches!(err, Error::ConstraintViolation(_)), "got {err:?}");
    }

    #[test]
    fn test_other_failures_stay_storage_errors() {
        let conn = rusqlite::Connection::open_in_memory().unwrap();
        let err: Error = conn.execute("SELECT * FROM missing", []).unwrap_err().into();
        assert!(matches!(err, Error::Storage(_)));
    }
}
