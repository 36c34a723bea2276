//! Error types for database operations

use thiserror::Error;

/// Database error types
#[derive(Error, Debug)]
pub enum Error {
    /// SQLx database error
    #[error("Database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    /// Migration error
    #[error("Migration error: {0}")]
    Migration(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Stored row could not be converted into a domain record
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Pull request id already stored
    #[error("Pull request already exists: {0}")]
    DuplicatePullRequest(String),

    /// Pull request version did not match the stored one
    #[error("Stale pull request version: {0}")]
    StaleVersion(String),

    /// Pull request missing on update
    #[error("Pull request not found: {0}")]
    PullRequestNotFound(String),
}

/// Result type alias for database operations
pub type Result<T> = std::result::Result<T, Error>;

impl From<Error> for revassign_core::Error {
    fn from(err: Error) -> Self {
        match err {
            Error::DuplicatePullRequest(id) => revassign_core::Error::PrExists(id),
            Error::StaleVersion(id) => revassign_core::Error::Conflict(id),
            Error::PullRequestNotFound(id) => revassign_core::Error::PrNotFound(id),
            other => revassign_core::Error::store(other),
        }
    }
}
