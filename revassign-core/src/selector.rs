//! Reviewer candidate selection
//!
//! Wraps the directory's sampling query with the exclusion and count
//! policy used at creation and at reassignment.

use std::sync::Arc;

use crate::models::User;
use crate::policy::AssignmentPolicy;
use crate::store::UserDirectory;
use crate::Result;

/// Picks reviewer candidates from a team
#[derive(Clone)]
pub struct CandidateSelector {
    directory: Arc<dyn UserDirectory>,
    policy: AssignmentPolicy,
}

impl CandidateSelector {
    pub fn new(directory: Arc<dyn UserDirectory>, policy: AssignmentPolicy) -> Self {
        Self { directory, policy }
    }

    pub fn policy(&self) -> &AssignmentPolicy {
        &self.policy
    }

    /// Up to `count` active members of `team_name`, never `exclude_user_id`.
    ///
    /// Order is whatever the directory produced. Fewer than `count`
    /// (including none) is a valid result.
    pub async fn select_candidates(
        &self,
        team_name: &str,
        exclude_user_id: &str,
        count: usize,
    ) -> Result<Vec<String>> {
        if count == 0 {
            return Ok(Vec::new());
        }

        let sampled = self
            .policy
            .bounded(
                "select_active_candidates",
                self.directory
                    .select_active_candidates(team_name, exclude_user_id, count),
            )
            .await?;

        let mut picked: Vec<String> = Vec::with_capacity(count);
        for id in sampled {
            if id == exclude_user_id || picked.contains(&id) {
                tracing::debug!(team = team_name, candidate = %id, "Dropping ineligible sample");
                continue;
            }
            picked.push(id);
            if picked.len() == count {
                break;
            }
        }

        tracing::debug!(
            team = team_name,
            exclude = exclude_user_id,
            requested = count,
            candidates = ?picked,
            "Selected candidates"
        );
        Ok(picked)
    }

    /// Initial reviewers for a pull request opened by `author`
    pub async fn initial_reviewers(&self, author: &User) -> Result<Vec<String>> {
        self.select_candidates(&author.team_name, &author.id, self.policy.reviewers_per_pr)
            .await
    }

    /// Replacement batch for `reviewer`, drawn from the reviewer's team
    pub async fn replacement_batch(&self, reviewer: &User) -> Result<Vec<String>> {
        self.select_candidates(
            &reviewer.team_name,
            &reviewer.id,
            self.policy.reassign_search_width,
        )
        .await
    }
}
