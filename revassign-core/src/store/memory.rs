//! In-memory implementation of the store traits.
//!
//! All state is held in one `RwLock`ed table set and lost on drop.

use std::collections::HashMap;

use async_trait::async_trait;
use rand::seq::SliceRandom;
use tokio::sync::RwLock;

use super::{PullRequestStore, TeamStore, UserDirectory};
use crate::models::{PullRequest, PullRequestShort, Team, TeamMember, User};
use crate::{Error, Result};

#[derive(Default)]
struct Tables {
    users: HashMap<String, User>,
    /// Team name to member ids, in insertion order
    teams: HashMap<String, Vec<String>>,
    pull_requests: HashMap<String, PullRequest>,
    /// Pull request ids in creation order
    pr_order: Vec<String>,
}

/// In-memory store implementing [`UserDirectory`], [`TeamStore`] and
/// [`PullRequestStore`].
#[derive(Default)]
pub struct InMemoryStore {
    tables: RwLock<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn sample(mut ids: Vec<String>, limit: usize) -> Vec<String> {
    ids.shuffle(&mut rand::thread_rng());
    ids.truncate(limit);
    ids
}

#[async_trait]
impl UserDirectory for InMemoryStore {
    async fn get_user(&self, id: &str) -> Result<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables.users.get(id).cloned())
    }

    async fn user_exists(&self, id: &str) -> Result<bool> {
        let tables = self.tables.read().await;
        Ok(tables.users.contains_key(id))
    }

    async fn select_active_candidates(
        &self,
        team_name: &str,
        exclude_user_id: &str,
        limit: usize,
    ) -> Result<Vec<String>> {
        let tables = self.tables.read().await;
        let eligible: Vec<String> = tables
            .teams
            .get(team_name)
            .into_iter()
            .flatten()
            .filter(|id| id.as_str() != exclude_user_id)
            .filter(|id| tables.users.get(id.as_str()).is_some_and(|u| u.is_active))
            .cloned()
            .collect();
        Ok(sample(eligible, limit))
    }

    async fn set_active(&self, id: &str, is_active: bool) -> Result<bool> {
        let mut tables = self.tables.write().await;
        match tables.users.get_mut(id) {
            Some(user) => {
                user.is_active = is_active;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn count_users(&self) -> Result<u64> {
        let tables = self.tables.read().await;
        Ok(tables.users.len() as u64)
    }
}

#[async_trait]
impl TeamStore for InMemoryStore {
    async fn create_team(&self, team: &Team) -> Result<()> {
        let mut tables = self.tables.write().await;
        tables.teams.entry(team.name.clone()).or_default();

        for member in &team.members {
            let previous_team = tables
                .users
                .get(&member.user_id)
                .map(|u| u.team_name.clone());

            if let Some(old) = previous_team.filter(|old| *old != team.name) {
                if let Some(ids) = tables.teams.get_mut(&old) {
                    ids.retain(|id| *id != member.user_id);
                }
            }

            let ids = tables.teams.entry(team.name.clone()).or_default();
            if !ids.contains(&member.user_id) {
                ids.push(member.user_id.clone());
            }

            tables.users.insert(
                member.user_id.clone(),
                User {
                    id: member.user_id.clone(),
                    username: member.username.clone(),
                    team_name: team.name.clone(),
                    is_active: member.is_active,
                },
            );
        }

        Ok(())
    }

    async fn team_exists(&self, name: &str) -> Result<bool> {
        let tables = self.tables.read().await;
        Ok(tables.teams.contains_key(name))
    }

    async fn get_team(&self, name: &str) -> Result<Option<Team>> {
        let tables = self.tables.read().await;
        Ok(tables.teams.get(name).map(|ids| {
            let members = ids
                .iter()
                .filter_map(|id| tables.users.get(id))
                .map(|u| TeamMember::new(u.id.clone(), u.username.clone(), u.is_active))
                .collect();
            Team::new(name, members)
        }))
    }

    async fn deactivate_members(&self, name: &str) -> Result<u64> {
        let mut tables = self.tables.write().await;
        let Tables { users, teams, .. } = &mut *tables;

        let mut changed = 0;
        for id in teams.get(name).into_iter().flatten() {
            if let Some(user) = users.get_mut(id) {
                user.is_active = false;
                changed += 1;
            }
        }
        Ok(changed)
    }
}

#[async_trait]
impl PullRequestStore for InMemoryStore {
    async fn create(&self, pr: &PullRequest) -> Result<()> {
        let mut tables = self.tables.write().await;
        if tables.pull_requests.contains_key(&pr.id) {
            return Err(Error::PrExists(pr.id.clone()));
        }
        tables.pull_requests.insert(pr.id.clone(), pr.clone());
        tables.pr_order.push(pr.id.clone());
        Ok(())
    }

    async fn exists(&self, id: &str) -> Result<bool> {
        let tables = self.tables.read().await;
        Ok(tables.pull_requests.contains_key(id))
    }

    async fn get(&self, id: &str) -> Result<Option<PullRequest>> {
        let tables = self.tables.read().await;
        Ok(tables.pull_requests.get(id).cloned())
    }

    async fn list_by_reviewer(&self, reviewer_id: &str) -> Result<Vec<PullRequestShort>> {
        let tables = self.tables.read().await;
        Ok(tables
            .pr_order
            .iter()
            .rev()
            .filter_map(|id| tables.pull_requests.get(id))
            .filter(|pr| pr.is_assigned(reviewer_id))
            .map(PullRequest::to_short)
            .collect())
    }

    async fn update(&self, pr: &PullRequest) -> Result<PullRequest> {
        let mut tables = self.tables.write().await;
        let stored = tables
            .pull_requests
            .get_mut(&pr.id)
            .ok_or_else(|| Error::PrNotFound(pr.id.clone()))?;

        if stored.version != pr.version {
            return Err(Error::Conflict(pr.id.clone()));
        }

        stored.name = pr.name.clone();
        stored.status = pr.status;
        stored.assigned_reviewers = pr.assigned_reviewers.clone();
        stored.merged_at = pr.merged_at;
        stored.version += 1;
        Ok(stored.clone())
    }

    async fn count(&self) -> Result<u64> {
        let tables = self.tables.read().await;
        Ok(tables.pull_requests.len() as u64)
    }
}
