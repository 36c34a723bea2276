//! Reviewer assignment policy
//!
//! The reviewer count and the reassignment search width trade search
//! effort against the chance of finding a replacement, so both are
//! configuration rather than constants.

use std::future::Future;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Reviewers picked when a pull request is created
pub const DEFAULT_REVIEWERS_PER_PR: usize = 2;

/// Candidates fetched when looking for a replacement reviewer
pub const DEFAULT_REASSIGN_SEARCH_WIDTH: usize = 5;

/// Tunable selection policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct AssignmentPolicy {
    /// How many reviewers to request at creation
    pub reviewers_per_pr: usize,

    /// How many candidates to request per reassignment; no second batch
    /// is fetched when all of them are ineligible
    pub reassign_search_width: usize,

    /// Deadline applied to every store and directory call
    #[serde(with = "humantime_serde")]
    pub call_timeout: Option<Duration>,
}

impl Default for AssignmentPolicy {
    fn default() -> Self {
        Self {
            reviewers_per_pr: DEFAULT_REVIEWERS_PER_PR,
            reassign_search_width: DEFAULT_REASSIGN_SEARCH_WIDTH,
            call_timeout: None,
        }
    }
}

impl AssignmentPolicy {
    /// Set the per-call deadline
    pub fn with_call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = Some(timeout);
        self
    }

    /// Reject values that would make selection meaningless
    pub fn validate(&self) -> Result<()> {
        if self.reviewers_per_pr == 0 {
            return Err(Error::Config(
                "assignment.reviewers_per_pr must be at least 1".to_string(),
            ));
        }
        if self.reassign_search_width == 0 {
            return Err(Error::Config(
                "assignment.reassign_search_width must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Run an external call under the configured deadline
    pub async fn bounded<T, F>(&self, operation: &'static str, call: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        match self.call_timeout {
            Some(limit) => match tokio::time::timeout(limit, call).await {
                Ok(result) => result,
                Err(_) => {
                    tracing::warn!(operation, timeout = ?limit, "External call timed out");
                    Err(Error::Timeout(operation))
                }
            },
            None => call.await,
        }
    }
}
