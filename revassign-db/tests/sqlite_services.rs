//! Core services running on the SQLite repositories

use std::sync::Arc;

use revassign_core::{
    AssignmentPolicy, CreatePullRequest, Error, PrStatus, PullRequestService, PullRequestStore,
    Team, TeamMember, TeamService, UserService,
};
use revassign_db::{Database, DatabaseConfig};
use tempfile::TempDir;

struct Harness {
    db: Database,
    pull_requests: PullRequestService,
    users: UserService,
    _temp: TempDir,
}

async fn setup() -> Harness {
    let temp = TempDir::new().unwrap();
    let db = Database::open(DatabaseConfig::new(temp.path().join("services.db")))
        .await
        .unwrap();
    let policy = AssignmentPolicy::default();

    let teams = TeamService::new(Arc::new(db.teams()), policy);
    teams
        .create_team(Team::new(
            "platform",
            vec![
                TeamMember::new("author", "Ada", true),
                TeamMember::new("r1", "Ben", true),
                TeamMember::new("r2", "Cy", true),
                TeamMember::new("r3", "Dee", true),
                TeamMember::new("idle", "Eve", false),
            ],
        ))
        .await
        .unwrap();

    let users = Arc::new(db.users());
    let prs = Arc::new(db.pull_requests());
    Harness {
        pull_requests: PullRequestService::new(prs.clone(), users.clone(), policy),
        users: UserService::new(users, prs, policy),
        db,
        _temp: temp,
    }
}

#[tokio::test]
async fn create_merge_twice_keeps_first_merge() {
    let h = setup().await;

    let created = h
        .pull_requests
        .create_pr(CreatePullRequest::new("pr-1", "Add cache", "author"))
        .await
        .unwrap();
    assert_eq!(created.assigned_reviewers.len(), 2);
    assert!(!created.is_assigned("author"));
    assert!(!created.is_assigned("idle"));

    let merged = h.pull_requests.merge_pr("pr-1").await.unwrap();
    assert_eq!(merged.status, PrStatus::Merged);
    assert!(merged.merged_at.is_some());

    let again = h.pull_requests.merge_pr("pr-1").await.unwrap();
    assert_eq!(again.status, PrStatus::Merged);
    assert_eq!(again.merged_at, merged.merged_at);
    assert_eq!(again.assigned_reviewers, merged.assigned_reviewers);
    assert_eq!(again.version, merged.version);

    let err = h
        .pull_requests
        .update_reviewer("pr-1", &merged.assigned_reviewers[0])
        .await
        .unwrap_err();
    assert_eq!(err.code(), "PR_MERGED");
}

#[tokio::test]
async fn reassign_takes_the_remaining_teammate() {
    let h = setup().await;

    let created = h
        .pull_requests
        .create_pr(CreatePullRequest::new("pr-1", "Add cache", "author"))
        .await
        .unwrap();
    let old = created.assigned_reviewers[0].clone();
    let kept = created.assigned_reviewers[1].clone();
    let spare = ["r1", "r2", "r3"]
        .into_iter()
        .find(|id| !created.is_assigned(id))
        .unwrap();

    let outcome = h.pull_requests.update_reviewer("pr-1", &old).await.unwrap();
    assert_eq!(outcome.replaced_by, spare);
    assert_eq!(
        outcome.pull_request.assigned_reviewers,
        vec![spare.to_string(), kept.clone()]
    );

    let stored = h.pull_requests.get_pr("pr-1").await.unwrap();
    assert_eq!(stored, outcome.pull_request);

    let queue = h.users.review_queue(spare).await.unwrap();
    assert_eq!(queue.len(), 1);
    assert!(h.users.review_queue(&old).await.unwrap().is_empty());

    h.users.set_is_active(&old, false).await.unwrap();
    let err = h
        .pull_requests
        .update_reviewer("pr-1", &kept)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::NoCandidates(_)));
}

#[tokio::test]
async fn stale_write_maps_to_conflict() {
    let h = setup().await;
    h.pull_requests
        .create_pr(CreatePullRequest::new("pr-1", "Add cache", "author"))
        .await
        .unwrap();

    let repo = h.db.pull_requests();
    let stale = repo.get("pr-1").await.unwrap().unwrap();

    h.pull_requests.merge_pr("pr-1").await.unwrap();

    let err = repo.update(&stale).await.unwrap_err();
    assert!(matches!(err, Error::Conflict(_)));
    assert_eq!(err.code(), "CONFLICT");

    let stored = h.pull_requests.get_pr("pr-1").await.unwrap();
    assert_eq!(stored.status, PrStatus::Merged);
}

#[tokio::test]
async fn duplicate_pull_request_id() {
    let h = setup().await;
    h.pull_requests
        .create_pr(CreatePullRequest::new("pr-1", "Add cache", "author"))
        .await
        .unwrap();

    let err = h
        .pull_requests
        .create_pr(CreatePullRequest::new("pr-1", "Again", "author"))
        .await
        .unwrap_err();
    assert_eq!(err.code(), "PR_EXISTS");

    let stats = h.users.global_stats().await.unwrap();
    assert_eq!(stats.total_users, 5);
    assert_eq!(stats.total_prs, 1);
}
