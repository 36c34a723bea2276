//! Pull request repository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use revassign_core::{PrStatus, PullRequest, PullRequestShort, PullRequestStore};
use sqlx::SqlitePool;

use crate::error::{Error, Result};

/// Raw pull request row; reviewers are stored as a JSON array
#[derive(Debug, sqlx::FromRow)]
struct PullRequestRow {
    pull_request_id: String,
    pull_request_name: String,
    author_id: String,
    status: String,
    assigned_reviewers: String,
    version: i64,
    created_at: DateTime<Utc>,
    merged_at: Option<DateTime<Utc>>,
}

impl TryFrom<PullRequestRow> for PullRequest {
    type Error = Error;

    fn try_from(row: PullRequestRow) -> Result<Self> {
        let status: PrStatus = row.status.parse().map_err(Error::InvalidData)?;
        let assigned_reviewers: Vec<String> = serde_json::from_str(&row.assigned_reviewers)?;

        Ok(PullRequest {
            id: row.pull_request_id,
            name: row.pull_request_name,
            author_id: row.author_id,
            status,
            assigned_reviewers,
            created_at: row.created_at,
            merged_at: row.merged_at,
            version: row.version,
        })
    }
}

const SELECT_COLUMNS: &str = r#"
    SELECT pull_request_id, pull_request_name, author_id, status,
           assigned_reviewers, version, created_at, merged_at
    FROM pull_requests
"#;

/// Repository for pull request records
#[derive(Clone)]
pub struct PullRequestRepository {
    pool: SqlitePool,
}

impl PullRequestRepository {
    /// Create a new pull request repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a new pull request
    pub async fn insert(&self, pr: &PullRequest) -> Result<()> {
        let reviewers = serde_json::to_string(&pr.assigned_reviewers)?;

        let result = sqlx::query(
            r#"
            INSERT INTO pull_requests (
                pull_request_id, pull_request_name, author_id, status,
                assigned_reviewers, version, created_at, merged_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&pr.id)
        .bind(&pr.name)
        .bind(&pr.author_id)
        .bind(pr.status.as_str())
        .bind(reviewers)
        .bind(pr.version)
        .bind(pr.created_at)
        .bind(pr.merged_at)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                Err(Error::DuplicatePullRequest(pr.id.clone()))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Check if a pull request id is stored
    pub async fn exists(&self, id: &str) -> Result<bool> {
        let (exists,): (bool,) =
            sqlx::query_as("SELECT EXISTS(SELECT 1 FROM pull_requests WHERE pull_request_id = ?)")
                .bind(id)
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }

    /// Get a pull request by id
    pub async fn get_by_id(&self, id: &str) -> Result<Option<PullRequest>> {
        let row: Option<PullRequestRow> =
            sqlx::query_as(&format!("{SELECT_COLUMNS} WHERE pull_request_id = ?"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        row.map(PullRequest::try_from).transpose()
    }

    /// List pull requests a user reviews, newest first
    pub async fn list_by_reviewer(&self, reviewer_id: &str) -> Result<Vec<PullRequestShort>> {
        let rows: Vec<PullRequestRow> = sqlx::query_as(&format!(
            r#"{SELECT_COLUMNS}
            WHERE EXISTS (
                SELECT 1 FROM json_each(pull_requests.assigned_reviewers)
                WHERE json_each.value = ?
            )
            ORDER BY created_at DESC, rowid DESC"#
        ))
        .bind(reviewer_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|row| PullRequest::try_from(row).map(|pr| pr.to_short()))
            .collect()
    }

    /// Write the mutable fields if the stored version still matches
    pub async fn update_versioned(&self, pr: &PullRequest) -> Result<PullRequest> {
        let reviewers = serde_json::to_string(&pr.assigned_reviewers)?;

        let result = sqlx::query(
            r#"
            UPDATE pull_requests
            SET pull_request_name = ?,
                status = ?,
                assigned_reviewers = ?,
                merged_at = ?,
                version = version + 1
            WHERE pull_request_id = ? AND version = ?
            "#,
        )
        .bind(&pr.name)
        .bind(pr.status.as_str())
        .bind(reviewers)
        .bind(pr.merged_at)
        .bind(&pr.id)
        .bind(pr.version)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return if self.exists(&pr.id).await? {
                tracing::debug!(pr_id = %pr.id, version = pr.version, "Stale pull request write");
                Err(Error::StaleVersion(pr.id.clone()))
            } else {
                Err(Error::PullRequestNotFound(pr.id.clone()))
            };
        }

        let mut stored = pr.clone();
        stored.version += 1;
        Ok(stored)
    }

    /// Count stored pull requests
    pub async fn count(&self) -> Result<u64> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM pull_requests")
            .fetch_one(&self.pool)
            .await?;
        Ok(count as u64)
    }
}

#[async_trait]
impl PullRequestStore for PullRequestRepository {
    async fn create(&self, pr: &PullRequest) -> revassign_core::Result<()> {
        self.insert(pr).await.map_err(Into::into)
    }

    async fn exists(&self, id: &str) -> revassign_core::Result<bool> {
        PullRequestRepository::exists(self, id).await.map_err(Into::into)
    }

    async fn get(&self, id: &str) -> revassign_core::Result<Option<PullRequest>> {
        self.get_by_id(id).await.map_err(Into::into)
    }

    async fn list_by_reviewer(
        &self,
        reviewer_id: &str,
    ) -> revassign_core::Result<Vec<PullRequestShort>> {
        PullRequestRepository::list_by_reviewer(self, reviewer_id)
            .await
            .map_err(Into::into)
    }

    async fn update(&self, pr: &PullRequest) -> revassign_core::Result<PullRequest> {
        self.update_versioned(pr).await.map_err(Into::into)
    }

    async fn count(&self) -> revassign_core::Result<u64> {
        PullRequestRepository::count(self).await.map_err(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repos::test_support::{platform_team, setup_test_db};
    use crate::Database;
    use chrono::Duration;
    use tempfile::TempDir;

    async fn setup() -> (Database, TempDir, PullRequestRepository) {
        let (db, temp) = setup_test_db().await;
        db.teams().create(&platform_team()).await.unwrap();
        let repo = db.pull_requests();
        (db, temp, repo)
    }

    fn sample_pr(id: &str, reviewers: &[&str]) -> PullRequest {
        PullRequest::open(
            id,
            format!("Change {id}"),
            "u1",
            reviewers.iter().map(|r| r.to_string()).collect(),
        )
    }

    #[tokio::test]
    async fn test_insert_and_get() {
        let (_db, _temp, repo) = setup().await;
        let pr = sample_pr("pr-1", &["u2", "u3"]);

        repo.insert(&pr).await.unwrap();

        let stored = repo.get_by_id("pr-1").await.unwrap().unwrap();
        assert_eq!(stored.id, "pr-1");
        assert_eq!(stored.author_id, "u1");
        assert_eq!(stored.status, PrStatus::Open);
        assert_eq!(stored.assigned_reviewers, vec!["u2", "u3"]);
        assert_eq!(stored.version, 0);
        assert!(stored.merged_at.is_none());
        assert!(repo.exists("pr-1").await.unwrap());
    }

    #[tokio::test]
    async fn test_get_missing() {
        let (_db, _temp, repo) = setup().await;
        assert!(repo.get_by_id("nope").await.unwrap().is_none());
        assert!(!repo.exists("nope").await.unwrap());
    }

    #[tokio::test]
    async fn test_duplicate_insert() {
        let (_db, _temp, repo) = setup().await;
        repo.insert(&sample_pr("pr-1", &[])).await.unwrap();

        let err = repo.insert(&sample_pr("pr-1", &["u2"])).await.unwrap_err();
        assert!(matches!(err, Error::DuplicatePullRequest(ref id) if id == "pr-1"));

        let core: revassign_core::Error = err.into();
        assert_eq!(core.code(), "PR_EXISTS");
    }

    #[tokio::test]
    async fn test_update_bumps_version() {
        let (_db, _temp, repo) = setup().await;
        let mut pr = sample_pr("pr-1", &["u2", "u3"]);
        repo.insert(&pr).await.unwrap();

        pr.mark_merged(Utc::now());
        let stored = repo.update_versioned(&pr).await.unwrap();
        assert_eq!(stored.version, 1);

        let reloaded = repo.get_by_id("pr-1").await.unwrap().unwrap();
        assert_eq!(reloaded.status, PrStatus::Merged);
        assert!(reloaded.merged_at.is_some());
        assert_eq!(reloaded.version, 1);
    }

    #[tokio::test]
    async fn test_stale_update_is_rejected() {
        let (_db, _temp, repo) = setup().await;
        let pr = sample_pr("pr-1", &["u2", "u3"]);
        repo.insert(&pr).await.unwrap();

        let mut first = pr.clone();
        first.assigned_reviewers[0] = "u4".to_string();
        repo.update_versioned(&first).await.unwrap();

        let mut second = pr.clone();
        second.assigned_reviewers[1] = "u4".to_string();
        let err = repo.update_versioned(&second).await.unwrap_err();
        assert!(matches!(err, Error::StaleVersion(_)));

        let reloaded = repo.get_by_id("pr-1").await.unwrap().unwrap();
        assert_eq!(reloaded.assigned_reviewers, vec!["u4", "u3"]);
    }

    #[tokio::test]
    async fn test_update_missing() {
        let (_db, _temp, repo) = setup().await;
        let err = repo
            .update_versioned(&sample_pr("ghost", &[]))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::PullRequestNotFound(_)));
    }

    #[tokio::test]
    async fn test_list_by_reviewer_newest_first() {
        let (_db, _temp, repo) = setup().await;

        let mut older = sample_pr("pr-old", &["u2"]);
        older.created_at = Utc::now() - Duration::hours(1);
        repo.insert(&older).await.unwrap();
        repo.insert(&sample_pr("pr-new", &["u3", "u2"])).await.unwrap();
        repo.insert(&sample_pr("pr-other", &["u3"])).await.unwrap();

        let listed = repo.list_by_reviewer("u2").await.unwrap();
        let ids: Vec<_> = listed.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["pr-new", "pr-old"]);

        assert!(repo.list_by_reviewer("u1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_count() {
        let (_db, _temp, repo) = setup().await;
        assert_eq!(repo.count().await.unwrap(), 0);

        repo.insert(&sample_pr("pr-1", &[])).await.unwrap();
        repo.insert(&sample_pr("pr-2", &[])).await.unwrap();
        assert_eq!(repo.count().await.unwrap(), 2);
    }
}
