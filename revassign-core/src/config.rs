//! Configuration management for Revassign
//!
//! Configuration is loaded with the following priority (highest to lowest):
//! 1. CLI flags
//! 2. Environment variables (REVASSIGN_*)
//! 3. Config file (~/.config/revassign/config.toml)
//! 4. Default values

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::policy::AssignmentPolicy;
use crate::{Error, Result};

/// Database-related configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DatabaseSettings {
    /// Path to the SQLite database; `None` uses the cache directory
    pub path: Option<PathBuf>,

    /// Maximum number of pooled connections
    pub max_connections: u32,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            path: None,
            max_connections: 5,
        }
    }
}

impl DatabaseSettings {
    /// Resolve the database path, falling back to `~/.cache/revassign/revassign.db`
    pub fn resolved_path(&self) -> PathBuf {
        self.path.clone().unwrap_or_else(|| {
            dirs::cache_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("revassign")
                .join("revassign.db")
        })
    }
}

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Reviewer selection policy
    pub assignment: AssignmentPolicy,

    /// Database configuration
    pub database: DatabaseSettings,
}

impl Config {
    /// Load configuration from the default config file location
    ///
    /// Returns default config if file doesn't exist
    pub fn load() -> Result<Self> {
        if let Some(path) = Self::default_config_path() {
            if path.exists() {
                return Self::load_from_file(&path);
            }
        }

        Ok(Self::default())
    }

    /// Load configuration from a specific file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        toml::from_str(&contents)
            .map_err(|e| Error::Config(format!("Failed to parse config: {}", e)))
    }

    /// Get the default config file path
    ///
    /// Returns `~/.config/revassign/config.toml` on Unix
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("revassign").join("config.toml"))
    }

    /// Apply environment variable overrides
    ///
    /// Supported variables:
    /// - REVASSIGN_DB_PATH: SQLite database path
    /// - REVASSIGN_REVIEWERS_PER_PR: reviewers picked at creation
    /// - REVASSIGN_SEARCH_WIDTH: candidates fetched per reassignment
    /// - REVASSIGN_CALL_TIMEOUT: per-call deadline, e.g. "5s"
    pub fn with_env_overrides(self) -> Result<Self> {
        self.with_overrides_from(|key| std::env::var(key).ok())
    }

    fn with_overrides_from(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        if let Some(path) = lookup("REVASSIGN_DB_PATH") {
            self.database.path = Some(PathBuf::from(path));
        }

        if let Some(count) = lookup("REVASSIGN_REVIEWERS_PER_PR") {
            self.assignment.reviewers_per_pr = parse_count("REVASSIGN_REVIEWERS_PER_PR", &count)?;
        }

        if let Some(width) = lookup("REVASSIGN_SEARCH_WIDTH") {
            self.assignment.reassign_search_width = parse_count("REVASSIGN_SEARCH_WIDTH", &width)?;
        }

        if let Some(timeout) = lookup("REVASSIGN_CALL_TIMEOUT") {
            let parsed = humantime_serde::re::humantime::parse_duration(&timeout).map_err(|e| {
                Error::Config(format!("REVASSIGN_CALL_TIMEOUT is not a duration: {}", e))
            })?;
            self.assignment.call_timeout = Some(parsed);
        }

        Ok(self)
    }

    /// Apply CLI flag overrides
    pub fn with_cli_overrides(mut self, db_path: Option<PathBuf>) -> Self {
        if let Some(path) = db_path {
            self.database.path = Some(path);
        }
        self
    }

    /// Check that the loaded values are usable
    pub fn validate(&self) -> Result<()> {
        self.assignment.validate()?;
        if self.database.max_connections == 0 {
            return Err(Error::Config(
                "database.max_connections must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Load configuration with all overrides applied
    ///
    /// Priority: CLI > env > config file > defaults
    pub fn load_with_overrides(db_path: Option<PathBuf>) -> Result<Self> {
        let config = Self::load()?
            .with_env_overrides()?
            .with_cli_overrides(db_path);
        config.validate()?;
        Ok(config)
    }
}

fn parse_count(name: &str, value: &str) -> Result<usize> {
    value
        .trim()
        .parse::<usize>()
        .map_err(|_| Error::Config(format!("{} must be a non-negative integer", name)))
}
