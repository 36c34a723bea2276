//! CLI command implementations

pub mod pr;
pub mod team;
pub mod user;

pub use pr::PrArgs;
pub use team::TeamArgs;
pub use user::UserArgs;

use std::sync::Arc;

use revassign_core::{Config, PullRequestService, TeamService, UserService};
use revassign_db::{Database, DatabaseConfig};
use serde::Serialize;

/// Services wired to one SQLite database
pub struct Services {
    pub teams: TeamService,
    pub users: UserService,
    pub pull_requests: PullRequestService,
    db: Database,
}

impl Services {
    /// Open the configured database and build every service on top of it
    pub async fn open(config: &Config) -> revassign_core::Result<Self> {
        let db_config = DatabaseConfig::from(&config.database);
        tracing::debug!(path = %db_config.path.display(), "Opening database");

        let db = Database::open(db_config).await.map_err(|e| {
            tracing::error!(error = %e, "Failed to open database");
            revassign_core::Error::store(e)
        })?;

        let policy = config.assignment;
        let users = Arc::new(db.users());
        let pull_requests = Arc::new(db.pull_requests());

        Ok(Self {
            teams: TeamService::new(Arc::new(db.teams()), policy),
            users: UserService::new(users.clone(), pull_requests.clone(), policy),
            pull_requests: PullRequestService::new(pull_requests, users, policy),
            db,
        })
    }

    pub async fn close(self) {
        self.db.close().await;
    }
}

/// Print a value as pretty JSON on stdout
pub fn print_json<T: Serialize>(value: &T) -> revassign_core::Result<()> {
    let rendered = serde_json::to_string_pretty(value).map_err(revassign_core::Error::store)?;
    println!("{}", rendered);
    Ok(())
}

/// JSON body printed for a failed command
pub fn error_body(err: &revassign_core::Error) -> serde_json::Value {
    serde_json::json!({
        "error": {
            "code": err.code(),
            "message": err.to_string(),
        }
    })
}

/// Process exit status for a failed command
pub fn exit_code(err: &revassign_core::Error) -> i32 {
    if err.is_business() {
        1
    } else {
        2
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use revassign_core::Error;

    #[test]
    fn test_error_body() {
        let body = error_body(&Error::PrMerged("pr-1".into()));
        assert_eq!(body["error"]["code"], "PR_MERGED");
        assert_eq!(
            body["error"]["message"],
            "Cannot reassign on merged pull request pr-1"
        );
    }

    #[tokio::test]
    async fn test_open_failure_is_internal() {
        let blocker = tempfile::NamedTempFile::new().unwrap();
        let mut config = Config::default();
        config.database.path = Some(blocker.path().join("revassign.db"));

        let err = match Services::open(&config).await {
            Ok(_) => panic!("database under a regular file should not open"),
            Err(err) => err,
        };
        assert_eq!(error_body(&err)["error"]["code"], "INTERNAL_ERROR");
        assert_eq!(exit_code(&err), 2);
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(exit_code(&Error::NoCandidates("pr-1".into())), 1);
        assert_eq!(exit_code(&Error::Timeout("get_user")), 2);
    }
}
