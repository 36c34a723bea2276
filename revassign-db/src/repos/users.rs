//! User repository

use async_trait::async_trait;
use revassign_core::{User, UserDirectory};
use sqlx::SqlitePool;

use crate::error::Result;

/// Repository for users and reviewer sampling
#[derive(Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    /// Create a new user repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Get a user with their team name
    pub async fn get_by_id(&self, id: &str) -> Result<Option<User>> {
        let row: Option<(String, String, String, bool)> = sqlx::query_as(
            r#"
            SELECT u.user_id, u.username, t.team_name, u.is_active
            FROM users u
            JOIN teams t ON t.id = u.team_id
            WHERE u.user_id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|(id, username, team_name, is_active)| User {
            id,
            username,
            team_name,
            is_active,
        }))
    }

    /// Check if a user id is stored
    pub async fn exists(&self, id: &str) -> Result<bool> {
        let (exists,): (bool,) =
            sqlx::query_as("SELECT EXISTS(SELECT 1 FROM users WHERE user_id = ?)")
                .bind(id)
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }

    /// Random sample of active teammates, excluding one user
    pub async fn random_active_members(
        &self,
        team_name: &str,
        exclude_user_id: &str,
        limit: usize,
    ) -> Result<Vec<String>> {
        let rows: Vec<(String,)> = sqlx::query_as(
            r#"
            SELECT u.user_id
            FROM users u
            JOIN teams t ON t.id = u.team_id
            WHERE t.team_name = ?
              AND u.is_active = 1
              AND u.user_id != ?
            ORDER BY RANDOM()
            LIMIT ?
            "#,
        )
        .bind(team_name)
        .bind(exclude_user_id)
        .bind(i64::try_from(limit).unwrap_or(i64::MAX))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|(id,)| id).collect())
    }

    /// Set the activity flag, returning false if the user is missing
    pub async fn update_active(&self, id: &str, is_active: bool) -> Result<bool> {
        let result = sqlx::query("UPDATE users SET is_active = ? WHERE user_id = ?")
            .bind(is_active)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Count stored users
    pub async fn count(&self) -> Result<u64> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;
        Ok(count as u64)
    }
}

#[async_trait]
impl UserDirectory for UserRepository {
    async fn get_user(&self, id: &str) -> revassign_core::Result<Option<User>> {
        Ok(self.get_by_id(id).await?)
    }

    async fn user_exists(&self, id: &str) -> revassign_core::Result<bool> {
        Ok(self.exists(id).await?)
    }

    async fn select_active_candidates(
        &self,
        team_name: &str,
        exclude_user_id: &str,
        limit: usize,
    ) -> revassign_core::Result<Vec<String>> {
        Ok(self
            .random_active_members(team_name, exclude_user_id, limit)
            .await?)
    }

    async fn set_active(&self, id: &str, is_active: bool) -> revassign_core::Result<bool> {
        Ok(self.update_active(id, is_active).await?)
    }

    async fn count_users(&self) -> revassign_core::Result<u64> {
        Ok(self.count().await?)
    }
}
