//! Revassign Core - reviewer assignment engine for pull requests
//!
//! This crate owns the pull request lifecycle (Open -> Merged), the
//! candidate selection policy used to pick and replace reviewers, and the
//! storage traits that persistence backends implement.

pub mod config;
pub mod error;
pub mod lifecycle;
pub mod models;
pub mod policy;
pub mod selector;
pub mod store;
pub mod teams;
pub mod users;

pub use config::{Config, DatabaseSettings};
pub use error::{Error, Result};
pub use lifecycle::{PullRequestService, Reassignment};
pub use models::{
    CreatePullRequest, GlobalStats, PrStatus, PullRequest, PullRequestShort, Team, TeamMember,
    User,
};
pub use policy::AssignmentPolicy;
pub use selector::CandidateSelector;
pub use store::{InMemoryStore, PullRequestStore, TeamStore, UserDirectory};
pub use teams::TeamService;
pub use users::UserService;
