//! Pull request lifecycle: creation, merge and reviewer reassignment
//!
//! Every operation is a fetch-decide-persist sequence. The persist step
//! is the final await, so a cancelled or timed-out call never leaves a
//! partial write behind, and the store's version check rejects writes
//! based on a stale read.

use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;

use crate::models::{CreatePullRequest, PullRequest};
use crate::policy::AssignmentPolicy;
use crate::selector::CandidateSelector;
use crate::store::{PullRequestStore, UserDirectory};
use crate::{Error, Result};

/// Outcome of a successful reviewer reassignment
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reassignment {
    #[serde(rename = "pr")]
    pub pull_request: PullRequest,
    pub replaced_by: String,
}

/// Owns the Open -> Merged state machine and reviewer assignment
#[derive(Clone)]
pub struct PullRequestService {
    pull_requests: Arc<dyn PullRequestStore>,
    users: Arc<dyn UserDirectory>,
    selector: CandidateSelector,
}

impl PullRequestService {
    pub fn new(
        pull_requests: Arc<dyn PullRequestStore>,
        users: Arc<dyn UserDirectory>,
        policy: AssignmentPolicy,
    ) -> Self {
        let selector = CandidateSelector::new(users.clone(), policy);
        Self {
            pull_requests,
            users,
            selector,
        }
    }

    fn policy(&self) -> &AssignmentPolicy {
        self.selector.policy()
    }

    /// Create an open pull request with reviewers drawn from the author's team.
    ///
    /// The selector's result is accepted as-is: a small team can yield
    /// fewer reviewers than the policy asks for.
    pub async fn create_pr(&self, input: CreatePullRequest) -> Result<PullRequest> {
        let policy = self.policy();

        let author = policy
            .bounded("get_user", self.users.get_user(&input.author_id))
            .await?
            .ok_or_else(|| Error::AuthorNotFound(input.author_id.clone()))?;

        if policy
            .bounded("pr_exists", self.pull_requests.exists(&input.id))
            .await?
        {
            return Err(Error::PrExists(input.id));
        }

        let reviewers = self.selector.initial_reviewers(&author).await?;
        if reviewers.len() < policy.reviewers_per_pr {
            tracing::debug!(
                pr_id = %input.id,
                team = %author.team_name,
                found = reviewers.len(),
                wanted = policy.reviewers_per_pr,
                "Team has fewer eligible reviewers than requested"
            );
        }

        let pr = PullRequest::open(input.id, input.name, input.author_id, reviewers);
        policy
            .bounded("create_pull_request", self.pull_requests.create(&pr))
            .await?;

        tracing::info!(
            pr_id = %pr.id,
            author = %pr.author_id,
            reviewers = ?pr.assigned_reviewers,
            "Pull request created"
        );
        Ok(pr)
    }

    /// Merge a pull request. Merging an already merged one is a no-op.
    pub async fn merge_pr(&self, pr_id: &str) -> Result<PullRequest> {
        let policy = self.policy();

        let mut pr = self.fetch(pr_id).await?;
        if !pr.mark_merged(Utc::now()) {
            tracing::debug!(pr_id, "Pull request already merged");
            return Ok(pr);
        }

        let stored = policy
            .bounded("update_pull_request", self.pull_requests.update(&pr))
            .await
            .inspect_err(|e| log_write_failure(pr_id, e))?;

        tracing::info!(pr_id, merged_at = ?stored.merged_at, "Pull request merged");
        Ok(stored)
    }

    /// Replace `old_reviewer_id` on an open pull request.
    ///
    /// Candidates come from the old reviewer's team, excluding the old
    /// reviewer. The first one that is neither the author nor already
    /// assigned takes over the old reviewer's slot. Only one batch is
    /// requested; if none qualifies the call fails with `NoCandidates`.
    pub async fn update_reviewer(&self, pr_id: &str, old_reviewer_id: &str) -> Result<Reassignment> {
        let policy = self.policy();

        let mut pr = self.fetch(pr_id).await?;
        if pr.is_merged() {
            return Err(Error::PrMerged(pr.id));
        }

        let slot = pr
            .reviewer_slot(old_reviewer_id)
            .ok_or_else(|| Error::ReviewerNotAssigned {
                pr_id: pr.id.clone(),
                reviewer_id: old_reviewer_id.to_string(),
            })?;

        let old_reviewer = policy
            .bounded("get_user", self.users.get_user(old_reviewer_id))
            .await?
            .ok_or_else(|| Error::OriginalReviewerNotFound(old_reviewer_id.to_string()))?;

        let batch = self.selector.replacement_batch(&old_reviewer).await?;
        let replacement = match pick_replacement(&pr, &batch) {
            Some(id) => id.to_string(),
            None => {
                tracing::warn!(
                    pr_id,
                    old_reviewer = old_reviewer_id,
                    team = %old_reviewer.team_name,
                    batch = ?batch,
                    "No eligible replacement reviewer"
                );
                return Err(Error::NoCandidates(pr.id));
            }
        };

        pr.assigned_reviewers[slot] = replacement.clone();
        let stored = policy
            .bounded("update_pull_request", self.pull_requests.update(&pr))
            .await
            .inspect_err(|e| log_write_failure(pr_id, e))?;

        tracing::info!(
            pr_id,
            old_reviewer = old_reviewer_id,
            new_reviewer = %replacement,
            slot,
            "Reviewer reassigned"
        );
        Ok(Reassignment {
            pull_request: stored,
            replaced_by: replacement,
        })
    }

    /// Fetch a pull request by id
    pub async fn get_pr(&self, pr_id: &str) -> Result<PullRequest> {
        self.fetch(pr_id).await
    }

    async fn fetch(&self, pr_id: &str) -> Result<PullRequest> {
        self.policy()
            .bounded("get_pull_request", self.pull_requests.get(pr_id))
            .await?
            .ok_or_else(|| Error::PrNotFound(pr_id.to_string()))
    }
}

/// First candidate, in batch order, that is neither the author nor
/// already assigned.
fn pick_replacement<'a>(pr: &PullRequest, batch: &'a [String]) -> Option<&'a str> {
    batch
        .iter()
        .map(String::as_str)
        .find(|candidate| *candidate != pr.author_id && !pr.is_assigned(candidate))
}

fn log_write_failure(pr_id: &str, err: &Error) {
    if matches!(err, Error::Conflict(_)) {
        tracing::warn!(pr_id, "Pull request changed since it was read; write rejected");
    }
}
