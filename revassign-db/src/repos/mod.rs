//! Repository modules for database operations

pub mod pull_requests;
pub mod teams;
pub mod users;

pub use pull_requests::PullRequestRepository;
pub use teams::TeamRepository;
pub use users::UserRepository;

#[cfg(test)]
pub(crate) mod test_support {
    use revassign_core::{Team, TeamMember};
    use tempfile::TempDir;

    use crate::{Database, DatabaseConfig};

    pub async fn setup_test_db() -> (Database, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("test.db");
        let db = Database::open(DatabaseConfig::new(&db_path)).await.unwrap();
        (db, temp_dir)
    }

    pub fn platform_team() -> Team {
        Team::new(
            "platform",
            vec![
                TeamMember::new("u1", "Alice", true),
                TeamMember::new("u2", "Bob", true),
                TeamMember::new("u3", "Carol", true),
                TeamMember::new("u4", "Dave", false),
            ],
        )
    }
}
