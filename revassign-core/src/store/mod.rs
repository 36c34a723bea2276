//! Storage abstractions consumed by the assignment engine.
//!
//! The engine never talks to a database directly. Backends implement
//! these traits: the SQLite repositories in `revassign-db`, and
//! [`InMemoryStore`] for tests and embedding.

mod memory;

pub use memory::InMemoryStore;

use async_trait::async_trait;

use crate::models::{PullRequest, PullRequestShort, Team, User};
use crate::Result;

/// Read access to users plus the candidate sampling query.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Get a user by id, returning None if not found.
    async fn get_user(&self, id: &str) -> Result<Option<User>>;

    async fn user_exists(&self, id: &str) -> Result<bool>;

    /// Sample up to `limit` active members of `team_name`, never including
    /// `exclude_user_id`.
    ///
    /// Sampling is without replacement and the order is unspecified;
    /// callers must not rely on it being stable across calls.
    async fn select_active_candidates(
        &self,
        team_name: &str,
        exclude_user_id: &str,
        limit: usize,
    ) -> Result<Vec<String>>;

    /// Set the activity flag. Returns false if the user does not exist.
    async fn set_active(&self, id: &str, is_active: bool) -> Result<bool>;

    async fn count_users(&self) -> Result<u64>;
}

/// Team and membership storage.
#[async_trait]
pub trait TeamStore: Send + Sync {
    /// Store a team and upsert its members atomically.
    ///
    /// A member that already exists is moved to this team.
    async fn create_team(&self, team: &Team) -> Result<()>;

    async fn team_exists(&self, name: &str) -> Result<bool>;

    async fn get_team(&self, name: &str) -> Result<Option<Team>>;

    /// Mark every member of the team inactive, returning how many rows changed.
    async fn deactivate_members(&self, name: &str) -> Result<u64>;
}

/// Pull request storage.
#[async_trait]
pub trait PullRequestStore: Send + Sync {
    /// Insert a new record. Fails with `Error::PrExists` on a duplicate id.
    async fn create(&self, pr: &PullRequest) -> Result<()>;

    async fn exists(&self, id: &str) -> Result<bool>;

    async fn get(&self, id: &str) -> Result<Option<PullRequest>>;

    /// Pull requests listing `reviewer_id` among their reviewers, newest first.
    async fn list_by_reviewer(&self, reviewer_id: &str) -> Result<Vec<PullRequestShort>>;

    /// Replace name, status, reviewers and `merged_at` of a stored record.
    ///
    /// The write only happens when the stored version equals `pr.version`;
    /// otherwise it fails with `Error::Conflict`. Returns the record as
    /// stored, with the version bumped.
    async fn update(&self, pr: &PullRequest) -> Result<PullRequest>;

    async fn count(&self) -> Result<u64>;
}
