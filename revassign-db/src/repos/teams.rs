//! Team repository: teams and their member rows

use async_trait::async_trait;
use revassign_core::{Team, TeamMember, TeamStore};
use sqlx::SqlitePool;

use crate::error::Result;

/// Repository for teams and membership
#[derive(Clone)]
pub struct TeamRepository {
    pool: SqlitePool,
}

impl TeamRepository {
    /// Create a new team repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert the team (if new) and upsert every member in one transaction
    pub async fn create(&self, team: &Team) -> Result<i64> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("INSERT INTO teams (team_name) VALUES (?) ON CONFLICT (team_name) DO NOTHING")
            .bind(&team.name)
            .execute(&mut *tx)
            .await?;

        let (team_id,): (i64,) = sqlx::query_as("SELECT id FROM teams WHERE team_name = ?")
            .bind(&team.name)
            .fetch_one(&mut *tx)
            .await?;

        for member in &team.members {
            sqlx::query(
                r#"
                INSERT INTO users (user_id, username, team_id, is_active)
                VALUES (?, ?, ?, ?)
                ON CONFLICT (user_id) DO UPDATE
                SET username = excluded.username,
                    team_id = excluded.team_id,
                    is_active = excluded.is_active
                "#,
            )
            .bind(&member.user_id)
            .bind(&member.username)
            .bind(team_id)
            .bind(member.is_active)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(team_id)
    }

    /// Check if a team name is taken
    pub async fn exists(&self, name: &str) -> Result<bool> {
        let (exists,): (bool,) =
            sqlx::query_as("SELECT EXISTS(SELECT 1 FROM teams WHERE team_name = ?)")
                .bind(name)
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }

    /// Get a team with its members in insertion order
    pub async fn get_by_name(&self, name: &str) -> Result<Option<Team>> {
        let team_id: Option<(i64,)> = sqlx::query_as("SELECT id FROM teams WHERE team_name = ?")
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;

        let Some((team_id,)) = team_id else {
            return Ok(None);
        };

        let rows: Vec<(String, String, bool)> = sqlx::query_as(
            "SELECT user_id, username, is_active FROM users WHERE team_id = ? ORDER BY rowid",
        )
        .bind(team_id)
        .fetch_all(&self.pool)
        .await?;

        let members = rows
            .into_iter()
            .map(|(user_id, username, is_active)| TeamMember::new(user_id, username, is_active))
            .collect();
        Ok(Some(Team::new(name, members)))
    }

    /// Mark all members of a team inactive
    pub async fn deactivate_members(&self, name: &str) -> Result<u64> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET is_active = 0
            WHERE team_id = (SELECT id FROM teams WHERE team_name = ?)
            "#,
        )
        .bind(name)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }
}

#[async_trait]
impl TeamStore for TeamRepository {
    async fn create_team(&self, team: &Team) -> revassign_core::Result<()> {
        self.create(team).await?;
        Ok(())
    }

    async fn team_exists(&self, name: &str) -> revassign_core::Result<bool> {
        Ok(self.exists(name).await?)
    }

    async fn get_team(&self, name: &str) -> revassign_core::Result<Option<Team>> {
        Ok(self.get_by_name(name).await?)
    }

    async fn deactivate_members(&self, name: &str) -> revassign_core::Result<u64> {
        Ok(TeamRepository::deactivate_members(self, name).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repos::test_support::{platform_team, setup_test_db};

    #[tokio::test]
    async fn test_create_and_get_team() {
        let (db, _temp) = setup_test_db().await;
        let repo = db.teams();

        repo.create(&platform_team()).await.unwrap();

        assert!(repo.exists("platform").await.unwrap());
        let team = repo.get_by_name("platform").await.unwrap().unwrap();
        assert_eq!(team, platform_team());
    }

    #[tokio::test]
    async fn test_missing_team() {
        let (db, _temp) = setup_test_db().await;
        let repo = db.teams();

        assert!(!repo.exists("ghosts").await.unwrap());
        assert!(repo.get_by_name("ghosts").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_member_moves_to_new_team() {
        let (db, _temp) = setup_test_db().await;
        let repo = db.teams();
        repo.create(&platform_team()).await.unwrap();

        repo.create(&Team::new(
            "mobile",
            vec![TeamMember::new("u2", "Bobby", false)],
        ))
        .await
        .unwrap();

        let platform = repo.get_by_name("platform").await.unwrap().unwrap();
        assert!(platform.members.iter().all(|m| m.user_id != "u2"));

        let mobile = repo.get_by_name("mobile").await.unwrap().unwrap();
        assert_eq!(mobile.members, vec![TeamMember::new("u2", "Bobby", false)]);
    }

    #[tokio::test]
    async fn test_deactivate_members() {
        let (db, _temp) = setup_test_db().await;
        let repo = db.teams();
        repo.create(&platform_team()).await.unwrap();

        let changed = repo.deactivate_members("platform").await.unwrap();
        assert_eq!(changed, 4);

        let team = repo.get_by_name("platform").await.unwrap().unwrap();
        assert!(team.members.iter().all(|m| !m.is_active));
    }
}
