//! Team management

use std::sync::Arc;

use crate::models::Team;
use crate::policy::AssignmentPolicy;
use crate::store::TeamStore;
use crate::{Error, Result};

/// Creates and reads teams
#[derive(Clone)]
pub struct TeamService {
    teams: Arc<dyn TeamStore>,
    policy: AssignmentPolicy,
}

impl TeamService {
    pub fn new(teams: Arc<dyn TeamStore>, policy: AssignmentPolicy) -> Self {
        Self { teams, policy }
    }

    /// Create a team with its members. Fails if the name is taken.
    pub async fn create_team(&self, team: Team) -> Result<Team> {
        if self
            .policy
            .bounded("team_exists", self.teams.team_exists(&team.name))
            .await?
        {
            return Err(Error::TeamExists(team.name));
        }

        self.policy
            .bounded("create_team", self.teams.create_team(&team))
            .await?;

        tracing::info!(team = %team.name, members = team.members.len(), "Team created");
        Ok(team)
    }

    pub async fn get_team(&self, name: &str) -> Result<Team> {
        self.policy
            .bounded("get_team", self.teams.get_team(name))
            .await?
            .ok_or_else(|| Error::TeamNotFound(name.to_string()))
    }

    /// Mark every member of a team inactive
    pub async fn deactivate_team(&self, name: &str) -> Result<u64> {
        if !self
            .policy
            .bounded("team_exists", self.teams.team_exists(name))
            .await?
        {
            return Err(Error::TeamNotFound(name.to_string()));
        }

        let changed = self
            .policy
            .bounded("deactivate_members", self.teams.deactivate_members(name))
            .await?;
        tracing::info!(team = name, deactivated = changed, "Team members deactivated");
        Ok(changed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TeamMember;
    use crate::store::InMemoryStore;

    fn service() -> TeamService {
        TeamService::new(Arc::new(InMemoryStore::new()), AssignmentPolicy::default())
    }

    fn payments() -> Team {
        Team::new(
            "payments",
            vec![
                TeamMember::new("u1", "Alice", true),
                TeamMember::new("u2", "Bob", false),
            ],
        )
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let service = service();
        service.create_team(payments()).await.unwrap();

        let team = service.get_team("payments").await.unwrap();
        assert_eq!(team, payments());
    }

    #[tokio::test]
    async fn test_duplicate_team() {
        let service = service();
        service.create_team(payments()).await.unwrap();

        let result = service.create_team(payments()).await;
        assert!(matches!(result, Err(Error::TeamExists(name)) if name == "payments"));
    }

    #[tokio::test]
    async fn test_unknown_team() {
        let service = service();
        assert!(matches!(
            service.get_team("nope").await,
            Err(Error::TeamNotFound(_))
        ));
        assert!(matches!(
            service.deactivate_team("nope").await,
            Err(Error::TeamNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_deactivate_team() {
        let service = service();
        service.create_team(payments()).await.unwrap();

        assert_eq!(service.deactivate_team("payments").await.unwrap(), 2);
        let team = service.get_team("payments").await.unwrap();
        assert!(team.members.iter().all(|m| !m.is_active));
    }
}
