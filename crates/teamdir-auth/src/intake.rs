//! Upserting principals from verified logins.

use std::sync::Arc;

use regex::Regex;
use tracing::{debug, info, instrument};

use teamdir_store::{Principal, PrincipalStore};

use crate::claims::{ClaimMapping, ClaimSet};
use crate::config::AuthConfig;
use crate::error::{AuthError, AuthResult};

/// Turns verified userinfo documents into store principals.
///
/// New principals are created with an unusable local credential; they
/// can only ever authenticate externally. Email and group linkage are
/// refreshed on every login so the store never lags the identity
/// provider by more than one session.
pub struct PrincipalIntake {
    store: Arc<dyn PrincipalStore>,
    mapping: ClaimMapping,
    group_ignore: Option<Regex>,
}

impl std::fmt::Debug for PrincipalIntake {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrincipalIntake")
            .field("mapping", &self.mapping)
            .field("group_ignore", &self.group_ignore)
            .finish_non_exhaustive()
    }
}

impl PrincipalIntake {
    /// Build an intake from configuration.
    ///
    /// Fails when the group ignore pattern does not compile.
    pub fn new(store: Arc<dyn PrincipalStore>, config: &AuthConfig) -> AuthResult<Self> {
        let group_ignore = config
            .group_ignore_regex
            .as_deref()
            .map(Regex::new)
            .transpose()
            .map_err(|err| {
                AuthError::invalid_configuration(format!("bad group ignore pattern: {err}"))
            })?;
        Ok(Self {
            store,
            mapping: config.mapping.clone(),
            group_ignore,
        })
    }

    /// Upsert a principal from a verified userinfo document.
    #[instrument(skip(self, userinfo))]
    pub async fn login(&self, userinfo: &serde_json::Value) -> AuthResult<Principal> {
        let claims = self.mapping.extract(userinfo)?;
        self.login_claims(claims).await
    }

    /// Upsert a principal from already-extracted claims.
    pub async fn login_claims(&self, claims: ClaimSet) -> AuthResult<Principal> {
        let groups = self.retained_groups(&claims);

        match self.store.principal_by_username(&claims.username).await? {
            Some(mut principal) => {
                principal.email = claims.email;
                principal.group_names = groups;
                let principal = self.store.update_principal(principal).await?;
                debug!(username = %principal.username, "refreshed principal on login");
                Ok(principal)
            }
            None => {
                let mut principal = Principal::new(&claims.username);
                principal.email = claims.email;
                principal.display_name = claims.display_name;
                principal.group_names = groups;
                let principal = self.store.insert_principal(principal).await?;
                info!(username = %principal.username, "created principal on first login");
                Ok(principal)
            }
        }
    }

    fn retained_groups(&self, claims: &ClaimSet) -> Vec<String> {
        match &self.group_ignore {
            Some(pattern) => claims
                .groups
                .iter()
                .filter(|group| !pattern.is_match(group))
                .cloned()
                .collect(),
            None => claims.groups.clone(),
        }
    }
}
