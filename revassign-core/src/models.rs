//! Domain records for pull requests, users and teams

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Pull request review status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum PrStatus {
    /// Accepting reviewer changes
    #[default]
    Open,
    /// Terminal; review assignment is frozen
    Merged,
}

impl PrStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PrStatus::Open => "OPEN",
            PrStatus::Merged => "MERGED",
        }
    }

    /// Check if this is the terminal status
    pub fn is_terminal(&self) -> bool {
        matches!(self, PrStatus::Merged)
    }

    /// Check if moving to `next` is a legal transition
    pub fn can_transition_to(&self, next: PrStatus) -> bool {
        matches!((self, next), (PrStatus::Open, PrStatus::Merged))
    }
}

impl fmt::Display for PrStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PrStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "OPEN" => Ok(PrStatus::Open),
            "MERGED" => Ok(PrStatus::Merged),
            other => Err(format!("Unknown pull request status: {}", other)),
        }
    }
}

/// A pull request and its assigned reviewers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequest {
    #[serde(rename = "pull_request_id")]
    pub id: String,

    #[serde(rename = "pull_request_name")]
    pub name: String,

    pub author_id: String,

    pub status: PrStatus,

    /// Ordered reviewer ids; never contains the author, never repeats
    pub assigned_reviewers: Vec<String>,

    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,

    /// Set once, on the transition to `Merged`
    #[serde(rename = "mergedAt", skip_serializing_if = "Option::is_none")]
    pub merged_at: Option<DateTime<Utc>>,

    /// Optimistic concurrency token, bumped by the store on every update
    #[serde(default)]
    pub version: i64,
}

impl PullRequest {
    /// Create an open pull request with the given reviewers
    pub fn open(
        id: impl Into<String>,
        name: impl Into<String>,
        author_id: impl Into<String>,
        reviewers: Vec<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            author_id: author_id.into(),
            status: PrStatus::Open,
            assigned_reviewers: reviewers,
            created_at: Utc::now(),
            merged_at: None,
            version: 0,
        }
    }

    pub fn is_merged(&self) -> bool {
        self.status.is_terminal()
    }

    /// Position of `reviewer_id` in the reviewer list
    pub fn reviewer_slot(&self, reviewer_id: &str) -> Option<usize> {
        self.assigned_reviewers.iter().position(|r| r == reviewer_id)
    }

    pub fn is_assigned(&self, user_id: &str) -> bool {
        self.reviewer_slot(user_id).is_some()
    }

    /// Move to `Merged` and stamp `merged_at`.
    ///
    /// Returns `false` without touching anything if already merged.
    pub fn mark_merged(&mut self, at: DateTime<Utc>) -> bool {
        if !self.status.can_transition_to(PrStatus::Merged) {
            return false;
        }
        self.status = PrStatus::Merged;
        self.merged_at = Some(at);
        true
    }

    /// Short listing form
    pub fn to_short(&self) -> PullRequestShort {
        PullRequestShort {
            id: self.id.clone(),
            name: self.name.clone(),
            author_id: self.author_id.clone(),
            status: self.status,
        }
    }
}

/// Listing form of a pull request, used for review queues
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequestShort {
    #[serde(rename = "pull_request_id")]
    pub id: String,
    #[serde(rename = "pull_request_name")]
    pub name: String,
    pub author_id: String,
    pub status: PrStatus,
}

/// Input for creating a pull request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatePullRequest {
    #[serde(rename = "pull_request_id")]
    pub id: String,
    #[serde(rename = "pull_request_name")]
    pub name: String,
    pub author_id: String,
}

impl CreatePullRequest {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        author_id: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            author_id: author_id.into(),
        }
    }
}

/// A user as seen by the directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "user_id")]
    pub id: String,
    pub username: String,
    pub team_name: String,
    pub is_active: bool,
}

/// A member entry of a team
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamMember {
    pub user_id: String,
    pub username: String,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

impl TeamMember {
    pub fn new(user_id: impl Into<String>, username: impl Into<String>, is_active: bool) -> Self {
        Self {
            user_id: user_id.into(),
            username: username.into(),
            is_active,
        }
    }
}

/// A named group of users; membership defines the reviewer pool
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    #[serde(rename = "team_name")]
    pub name: String,
    pub members: Vec<TeamMember>,
}

impl Team {
    pub fn new(name: impl Into<String>, members: Vec<TeamMember>) -> Self {
        Self {
            name: name.into(),
            members,
        }
    }
}

/// Totals across the whole store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalStats {
    pub total_users: u64,
    pub total_prs: u64,
}
