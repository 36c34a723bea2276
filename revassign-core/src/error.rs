//! Error types for reviewer assignment

use thiserror::Error;

/// Result type alias for reviewer assignment operations
pub type Result<T> = std::result::Result<T, Error>;

/// Boxed persistence failure carried through unmodified
pub type StoreError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Error type for reviewer assignment operations
#[derive(Error, Debug)]
pub enum Error {
    /// PR author does not exist in the directory
    #[error("Author not found: {0}")]
    AuthorNotFound(String),

    /// Pull request does not exist
    #[error("Pull request not found: {0}")]
    PrNotFound(String),

    /// Pull request id is already taken
    #[error("Pull request already exists: {0}")]
    PrExists(String),

    /// Reassignment attempted on a merged pull request
    #[error("Cannot reassign on merged pull request {0}")]
    PrMerged(String),

    /// The reviewer to replace is not assigned to the pull request
    #[error("Reviewer {reviewer_id} is not assigned to pull request {pr_id}")]
    ReviewerNotAssigned { pr_id: String, reviewer_id: String },

    /// No eligible replacement in the candidate batch
    #[error("No active replacement candidate for pull request {0}")]
    NoCandidates(String),

    /// The reviewer being replaced has no user record
    #[error("Original reviewer user not found: {0}")]
    OriginalReviewerNotFound(String),

    /// Team name is already taken
    #[error("Team already exists: {0}")]
    TeamExists(String),

    /// Team does not exist
    #[error("Team not found: {0}")]
    TeamNotFound(String),

    /// User does not exist
    #[error("User not found: {0}")]
    UserNotFound(String),

    /// Stored record changed since it was read
    #[error("Pull request {0} was modified concurrently")]
    Conflict(String),

    /// An external call exceeded the configured deadline
    #[error("Timed out during {0}")]
    Timeout(&'static str),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Persistence failure
    #[error("Storage error: {0}")]
    Store(#[source] StoreError),
}

impl Error {
    /// Wrap a backend failure as an internal storage error
    pub fn store(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Error::Store(Box::new(err))
    }

    /// Stable machine-readable code for this condition
    pub fn code(&self) -> &'static str {
        match self {
            Error::AuthorNotFound(_)
            | Error::PrNotFound(_)
            | Error::OriginalReviewerNotFound(_)
            | Error::TeamNotFound(_)
            | Error::UserNotFound(_) => "NOT_FOUND",
            Error::PrExists(_) => "PR_EXISTS",
            Error::PrMerged(_) => "PR_MERGED",
            Error::ReviewerNotAssigned { .. } => "NOT_ASSIGNED",
            Error::NoCandidates(_) => "NO_CANDIDATE",
            Error::TeamExists(_) => "TEAM_EXISTS",
            Error::Conflict(_) => "CONFLICT",
            Error::Timeout(_) => "TIMEOUT",
            Error::Config(_) => "BAD_REQUEST",
            Error::Io(_) | Error::Store(_) => "INTERNAL_ERROR",
        }
    }

    /// Whether this is a business condition the caller can act on,
    /// as opposed to an internal failure
    pub fn is_business(&self) -> bool {
        !matches!(
            self,
            Error::OriginalReviewerNotFound(_)
                | Error::Timeout(_)
                | Error::Io(_)
                | Error::Store(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes() {
        assert_eq!(Error::PrMerged("pr-1".into()).code(), "PR_MERGED");
        assert_eq!(Error::NoCandidates("pr-1".into()).code(), "NO_CANDIDATE");
        assert_eq!(
            Error::ReviewerNotAssigned {
                pr_id: "pr-1".into(),
                reviewer_id: "u9".into()
            }
            .code(),
            "NOT_ASSIGNED"
        );
        assert_eq!(Error::AuthorNotFound("u1".into()).code(), "NOT_FOUND");
    }

    #[test]
    fn test_store_error_keeps_source() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset");
        let err = Error::store(io);

        assert_eq!(err.code(), "INTERNAL_ERROR");
        assert!(!err.is_business());
        let source = std::error::Error::source(&err).unwrap();
        assert_eq!(source.to_string(), "reset");
    }

    #[test]
    fn test_business_classification() {
        assert!(Error::PrNotFound("x".into()).is_business());
        assert!(Error::Conflict("x".into()).is_business());
        assert!(Error::Config("bad".into()).is_business());
        assert!(!Error::OriginalReviewerNotFound("x".into()).is_business());
        assert!(!Error::Timeout("get_user").is_business());
    }
}
