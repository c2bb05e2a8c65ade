//! Error taxonomy for the study app engine.

use thiserror::Error;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// Malformed or incomplete question data, caught at create/import time.
    #[error("invalid question: {0}")]
    Validation(String),

    /// An operation referenced a question id that does not exist.
    #[error("question {0} not found")]
    NotFound(i64),

    /// Underlying persistence failure (disk, corruption).
    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
}
