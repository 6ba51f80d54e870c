//! Store traits.
//!
//! The relational store is an external collaborator; these traits are
//! the only surface the sync engine, import jobs, and claim intake
//! depend on. Method names are disambiguated per aggregate so one
//! backend can implement both traits. Username and DN lookups are
//! case-insensitive; slug and directory-name lookups are exact.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use teamdir_core::{PrincipalId, TeamId};

use crate::error::StoreResult;
use crate::models::{Principal, Team};

/// Store of [`Principal`] records.
#[async_trait]
pub trait PrincipalStore: Send + Sync {
    /// Fetch by surrogate ID.
    async fn principal(&self, id: PrincipalId) -> StoreResult<Option<Principal>>;

    /// Fetch by username (case-insensitive).
    async fn principal_by_username(&self, username: &str) -> StoreResult<Option<Principal>>;

    /// Fetch by directory DN (case-insensitive).
    async fn principal_by_directory_dn(&self, dn: &str) -> StoreResult<Option<Principal>>;

    /// Insert a new principal. Fails with a duplicate error when the
    /// username is already taken.
    async fn insert_principal(&self, principal: Principal) -> StoreResult<Principal>;

    /// Update an existing principal. Fails when the record is missing.
    async fn update_principal(&self, principal: Principal) -> StoreResult<Principal>;

    /// All principals, ordered by username.
    async fn principals(&self) -> StoreResult<Vec<Principal>>;
}

/// Store of [`Team`] records.
#[async_trait]
pub trait TeamStore: Send + Sync {
    /// Fetch by surrogate ID.
    async fn team(&self, id: TeamId) -> StoreResult<Option<Team>>;

    /// Fetch by slug.
    async fn team_by_slug(&self, slug: &str) -> StoreResult<Option<Team>>;

    /// Fetch by mirrored directory group name.
    async fn team_by_directory_name(&self, directory_name: &str) -> StoreResult<Option<Team>>;

    /// Insert a new team. Fails with a duplicate error when the slug or
    /// directory name is already taken.
    async fn insert_team(&self, team: Team) -> StoreResult<Team>;

    /// Update an existing team. Fails when the record is missing.
    async fn update_team(&self, team: Team) -> StoreResult<Team>;

    /// All teams, ordered by slug.
    async fn teams(&self) -> StoreResult<Vec<Team>>;
}

/// A full dump of store contents, used by the CLI to persist the
/// in-memory backend between runs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreSnapshot {
    /// All principals.
    #[serde(default)]
    pub principals: Vec<Principal>,
    /// All teams.
    #[serde(default)]
    pub teams: Vec<Team>,
}
