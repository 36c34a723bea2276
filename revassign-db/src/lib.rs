//! Database layer for Revassign
//!
//! SQLite-backed implementations of the core store traits: teams, users
//! and pull requests sharing one connection pool.

pub mod connection;
pub mod error;
pub mod repos;

pub use connection::{Database, DatabaseConfig};
pub use error::{Error, Result};
pub use repos::{PullRequestRepository, TeamRepository, UserRepository};
