//! In-memory store backend.
//!
//! Backs the test suites and the CLI (which persists a
//! [`StoreSnapshot`] between runs). Uniqueness constraints mirror the
//! relational store's natural keys: username (case-insensitive), team
//! slug, and mirrored directory group name.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::Utc;

use teamdir_core::{PrincipalId, TeamId};

use crate::error::{StoreError, StoreResult};
use crate::models::{Principal, Team};
use crate::traits::{PrincipalStore, StoreSnapshot, TeamStore};

#[derive(Debug, Default)]
struct Inner {
    principals: HashMap<PrincipalId, Principal>,
    teams: HashMap<TeamId, Team>,
}

/// In-memory [`PrincipalStore`] and [`TeamStore`] implementation.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Restore a store from a snapshot.
    #[must_use]
    pub fn from_snapshot(snapshot: StoreSnapshot) -> Self {
        let mut inner = Inner::default();
        for principal in snapshot.principals {
            inner.principals.insert(principal.id, principal);
        }
        for team in snapshot.teams {
            inner.teams.insert(team.id, team);
        }
        Self {
            inner: RwLock::new(inner),
        }
    }

    /// Dump the current contents, ordered by natural key.
    #[must_use]
    pub fn snapshot(&self) -> StoreSnapshot {
        let inner = self.inner.read().expect("memory store poisoned");
        let mut principals: Vec<Principal> = inner.principals.values().cloned().collect();
        principals.sort_by(|a, b| a.username.to_lowercase().cmp(&b.username.to_lowercase()));
        let mut teams: Vec<Team> = inner.teams.values().cloned().collect();
        teams.sort_by(|a, b| a.slug.cmp(&b.slug));
        StoreSnapshot { principals, teams }
    }
}

#[async_trait]
impl PrincipalStore for MemoryStore {
    async fn principal(&self, id: PrincipalId) -> StoreResult<Option<Principal>> {
        let inner = self.inner.read().expect("memory store poisoned");
        Ok(inner.principals.get(&id).cloned())
    }

    async fn principal_by_username(&self, username: &str) -> StoreResult<Option<Principal>> {
        let inner = self.inner.read().expect("memory store poisoned");
        Ok(inner
            .principals
            .values()
            .find(|p| p.username.eq_ignore_ascii_case(username))
            .cloned())
    }

    async fn principal_by_directory_dn(&self, dn: &str) -> StoreResult<Option<Principal>> {
        let inner = self.inner.read().expect("memory store poisoned");
        Ok(inner
            .principals
            .values()
            .find(|p| {
                p.directory_dn
                    .as_deref()
                    .is_some_and(|d| d.eq_ignore_ascii_case(dn))
            })
            .cloned())
    }

    async fn insert_principal(&self, principal: Principal) -> StoreResult<Principal> {
        let mut inner = self.inner.write().expect("memory store poisoned");
        if inner
            .principals
            .values()
            .any(|p| p.username.eq_ignore_ascii_case(&principal.username))
        {
            return Err(StoreError::duplicate(
                "Principal",
                "username",
                principal.username,
            ));
        }
        inner.principals.insert(principal.id, principal.clone());
        Ok(principal)
    }

    async fn update_principal(&self, mut principal: Principal) -> StoreResult<Principal> {
        let mut inner = self.inner.write().expect("memory store poisoned");
        if !inner.principals.contains_key(&principal.id) {
            return Err(StoreError::not_found("Principal", principal.id.to_string()));
        }
        principal.updated_at = Utc::now();
        inner.principals.insert(principal.id, principal.clone());
        Ok(principal)
    }

    async fn principals(&self) -> StoreResult<Vec<Principal>> {
        let mut principals: Vec<Principal> = {
            let inner = self.inner.read().expect("memory store poisoned");
            inner.principals.values().cloned().collect()
        };
        principals.sort_by(|a, b| a.username.to_lowercase().cmp(&b.username.to_lowercase()));
        Ok(principals)
    }
}

#[async_trait]
impl TeamStore for MemoryStore {
    async fn team(&self, id: TeamId) -> StoreResult<Option<Team>> {
        let inner = self.inner.read().expect("memory store poisoned");
        Ok(inner.teams.get(&id).cloned())
    }

    async fn team_by_slug(&self, slug: &str) -> StoreResult<Option<Team>> {
        let inner = self.inner.read().expect("memory store poisoned");
        Ok(inner.teams.values().find(|t| t.slug == slug).cloned())
    }

    async fn team_by_directory_name(&self, directory_name: &str) -> StoreResult<Option<Team>> {
        let inner = self.inner.read().expect("memory store poisoned");
        Ok(inner
            .teams
            .values()
            .find(|t| t.directory_name.as_deref() == Some(directory_name))
            .cloned())
    }

    async fn insert_team(&self, team: Team) -> StoreResult<Team> {
        let mut inner = self.inner.write().expect("memory store poisoned");
        if inner.teams.values().any(|t| t.slug == team.slug) {
            return Err(StoreError::duplicate("Team", "slug", team.slug));
        }
        if let Some(name) = &team.directory_name {
            if inner
                .teams
                .values()
                .any(|t| t.directory_name.as_deref() == Some(name.as_str()))
            {
                return Err(StoreError::duplicate("Team", "directory_name", name.clone()));
            }
        }
        inner.teams.insert(team.id, team.clone());
        Ok(team)
    }

    async fn update_team(&self, mut team: Team) -> StoreResult<Team> {
        let mut inner = self.inner.write().expect("memory store poisoned");
        if !inner.teams.contains_key(&team.id) {
            return Err(StoreError::not_found("Team", team.id.to_string()));
        }
        team.updated_at = Utc::now();
        inner.teams.insert(team.id, team.clone());
        Ok(team)
    }

    async fn teams(&self) -> StoreResult<Vec<Team>> {
        let mut teams: Vec<Team> = {
            let inner = self.inner.read().expect("memory store poisoned");
            inner.teams.values().cloned().collect()
        };
        teams.sort_by(|a, b| a.slug.cmp(&b.slug));
        Ok(teams)
    }
}
