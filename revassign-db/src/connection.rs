//! Database connection and configuration

use std::path::PathBuf;
use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::ConnectOptions;

use crate::error::{Error, Result};
use crate::repos::{PullRequestRepository, TeamRepository, UserRepository};

/// Database configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// Path to SQLite database file
    pub path: PathBuf,
    /// Maximum number of connections in the pool
    pub max_connections: u32,
}

impl DatabaseConfig {
    /// Create a new database config with the given path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            max_connections: 5,
        }
    }

    /// Set the maximum number of connections
    pub fn with_max_connections(mut self, max_connections: u32) -> Self {
        self.max_connections = max_connections;
        self
    }
}

impl From<&revassign_core::DatabaseSettings> for DatabaseConfig {
    fn from(settings: &revassign_core::DatabaseSettings) -> Self {
        Self::new(settings.resolved_path()).with_max_connections(settings.max_connections)
    }
}

/// Database connection pool
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Connect to the database with the given configuration
    pub async fn connect(config: DatabaseConfig) -> Result<Self> {
        // Ensure parent directory exists
        if let Some(parent) = config.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let options =
            SqliteConnectOptions::from_str(&format!("sqlite://{}", config.path.display()))?
                .create_if_missing(true)
                .foreign_keys(true)
                .disable_statement_logging();

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .connect_with(options)
            .await?;

        tracing::debug!(path = %config.path.display(), "Connected to database");
        Ok(Self { pool })
    }

    /// Connect and bring the schema up to date
    pub async fn open(config: DatabaseConfig) -> Result<Self> {
        let db = Self::connect(config).await?;
        db.migrate().await?;
        Ok(db)
    }

    /// Run database migrations
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| Error::Migration(e.to_string()))
    }

    /// Get a reference to the connection pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Get the team repository
    pub fn teams(&self) -> TeamRepository {
        TeamRepository::new(self.pool.clone())
    }

    /// Get the user repository
    pub fn users(&self) -> UserRepository {
        UserRepository::new(self.pool.clone())
    }

    /// Get the pull request repository
    pub fn pull_requests(&self) -> PullRequestRepository {
        PullRequestRepository::new(self.pool.clone())
    }

    /// Close the database connection
    pub async fn close(self) {
        self.pool.close().await;
    }
}
