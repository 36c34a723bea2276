//! User activity, review queues and totals

use std::sync::Arc;

use crate::models::{GlobalStats, PullRequestShort, User};
use crate::policy::AssignmentPolicy;
use crate::store::{PullRequestStore, UserDirectory};
use crate::{Error, Result};

#[derive(Clone)]
pub struct UserService {
    users: Arc<dyn UserDirectory>,
    pull_requests: Arc<dyn PullRequestStore>,
    policy: AssignmentPolicy,
}

impl UserService {
    pub fn new(
        users: Arc<dyn UserDirectory>,
        pull_requests: Arc<dyn PullRequestStore>,
        policy: AssignmentPolicy,
    ) -> Self {
        Self {
            users,
            pull_requests,
            policy,
        }
    }

    /// Flip a user's eligibility for review duty
    pub async fn set_is_active(&self, user_id: &str, is_active: bool) -> Result<User> {
        let found = self
            .policy
            .bounded("set_active", self.users.set_active(user_id, is_active))
            .await?;
        if !found {
            return Err(Error::UserNotFound(user_id.to_string()));
        }

        tracing::info!(user_id, is_active, "User activity updated");
        self.policy
            .bounded("get_user", self.users.get_user(user_id))
            .await?
            .ok_or_else(|| Error::UserNotFound(user_id.to_string()))
    }

    /// Pull requests the user is currently assigned to review, newest first
    pub async fn review_queue(&self, user_id: &str) -> Result<Vec<PullRequestShort>> {
        if !self
            .policy
            .bounded("user_exists", self.users.user_exists(user_id))
            .await?
        {
            return Err(Error::UserNotFound(user_id.to_string()));
        }

        self.policy
            .bounded(
                "list_by_reviewer",
                self.pull_requests.list_by_reviewer(user_id),
            )
            .await
    }

    pub async fn global_stats(&self) -> Result<GlobalStats> {
        let total_users = self
            .policy
            .bounded("count_users", self.users.count_users())
            .await?;
        let total_prs = self
            .policy
            .bounded("count_pull_requests", self.pull_requests.count())
            .await?;

        Ok(GlobalStats {
            total_users,
            total_prs,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PullRequest, Team, TeamMember};
    use crate::store::{InMemoryStore, TeamStore};

    async fn setup() -> (Arc<InMemoryStore>, UserService) {
        let store = Arc::new(InMemoryStore::new());
        store
            .create_team(&Team::new(
                "infra",
                vec![
                    TeamMember::new("u1", "Alice", true),
                    TeamMember::new("u2", "Bob", true),
                    TeamMember::new("u3", "Carol", true),
                ],
            ))
            .await
            .unwrap();
        let service = UserService::new(store.clone(), store.clone(), AssignmentPolicy::default());
        (store, service)
    }

    #[tokio::test]
    async fn test_set_is_active() {
        let (_store, service) = setup().await;

        let user = service.set_is_active("u2", false).await.unwrap();
        assert!(!user.is_active);
        assert_eq!(user.team_name, "infra");

        let result = service.set_is_active("ghost", true).await;
        assert!(matches!(result, Err(Error::UserNotFound(_))));
    }

    #[tokio::test]
    async fn test_review_queue() {
        let (store, service) = setup().await;
        store
            .create(&PullRequest::open(
                "pr-1",
                "Add metrics",
                "u1",
                vec!["u2".into(), "u3".into()],
            ))
            .await
            .unwrap();

        let queue = service.review_queue("u3").await.unwrap();
        assert_eq!(queue.len(), 1);
        assert_eq!(queue[0].id, "pr-1");

        assert!(service.review_queue("u1").await.unwrap().is_empty());
        assert!(matches!(
            service.review_queue("ghost").await,
            Err(Error::UserNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_global_stats() {
        let (store, service) = setup().await;
        store
            .create(&PullRequest::open("pr-1", "Add metrics", "u1", vec![]))
            .await
            .unwrap();

        let stats = service.global_stats().await.unwrap();
        assert_eq!(
            stats,
            GlobalStats {
                total_users: 3,
                total_prs: 1
            }
        );
    }
}
