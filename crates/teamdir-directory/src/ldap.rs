//! LDAP implementation of the [`Directory`] trait.
//!
//! Each logical operation binds a fresh connection, runs to completion
//! under a bounded timeout, and unbinds before returning, on success
//! and error paths alike. No handle to a directory entry survives
//! between operations; callers re-resolve DNs every time.

use std::collections::HashSet;
use std::time::Duration;

use async_trait::async_trait;
use ldap3::{Ldap, LdapConnAsync, LdapConnSettings, Mod, Scope, SearchEntry};
use tracing::{debug, info, instrument, warn};

use crate::config::DirectoryConfig;
use crate::entry::{AttributeModification, DirectoryEntry, ModifyOp, SearchRequest, SearchScope};
use crate::error::{DirectoryError, DirectoryResult};
use crate::traits::Directory;

// LDAP result codes (RFC 4511).
const RC_SUCCESS: u32 = 0;
const RC_NO_SUCH_OBJECT: u32 = 32;
const RC_INVALID_CREDENTIALS: u32 = 49;

/// Directory client over the LDAP v3 protocol.
pub struct LdapDirectory {
    config: DirectoryConfig,
}

impl LdapDirectory {
    /// Create a new client. Fails if the configuration is invalid.
    pub fn new(config: DirectoryConfig) -> DirectoryResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// The configuration this client was built from.
    #[must_use]
    pub fn config(&self) -> &DirectoryConfig {
        &self.config
    }

    fn timeout(&self) -> Duration {
        Duration::from_secs(self.config.operation_timeout_secs)
    }

    /// Open a connection and bind. The caller owns the returned handle
    /// for exactly one logical operation.
    async fn bind(&self) -> DirectoryResult<Ldap> {
        debug!(url = %self.config.url, "connecting to directory");

        let settings = LdapConnSettings::new().set_conn_timeout(self.timeout());
        let (conn, mut ldap) = LdapConnAsync::with_settings(settings, &self.config.url)
            .await
            .map_err(|e| {
                DirectoryError::unavailable_with_source(
                    format!("failed to connect to {}", self.config.url),
                    e,
                )
            })?;

        tokio::spawn(async move {
            if let Err(e) = conn.drive().await {
                warn!(error = %e, "directory connection driver error");
            }
        });

        let password = self.config.bind_password.as_deref().unwrap_or("");
        let result = self
            .bounded(ldap.simple_bind(&self.config.bind_dn, password))
            .await?
            .map_err(|e| {
                DirectoryError::unavailable_with_source(
                    format!("bind failed for {}", self.config.bind_dn),
                    e,
                )
            })?;

        match result.rc {
            RC_SUCCESS => Ok(ldap),
            RC_INVALID_CREDENTIALS => Err(DirectoryError::AuthenticationFailed),
            rc => Err(DirectoryError::unavailable(format!(
                "bind failed with code {rc}: {}",
                result.text
            ))),
        }
    }

    /// Unbind after a logical operation. Failure to unbind is logged
    /// but does not change the operation's outcome.
    async fn unbind(&self, mut ldap: Ldap) {
        if let Err(e) = ldap.unbind().await {
            warn!(error = %e, "error during directory unbind");
        }
    }

    /// Run a directory round trip under the configured timeout.
    async fn bounded<F, T>(&self, fut: F) -> DirectoryResult<T>
    where
        F: std::future::Future<Output = T>,
    {
        tokio::time::timeout(self.timeout(), fut)
            .await
            .map_err(|_| DirectoryError::Timeout {
                timeout_secs: self.config.operation_timeout_secs,
            })
    }

    fn scope(scope: SearchScope) -> Scope {
        match scope {
            SearchScope::Base => Scope::Base,
            SearchScope::OneLevel => Scope::OneLevel,
            SearchScope::Subtree => Scope::Subtree,
        }
    }

    fn convert_entry(entry: SearchEntry) -> DirectoryEntry {
        DirectoryEntry::new(entry.dn, entry.attrs)
    }

    async fn search_bound(
        &self,
        ldap: &mut Ldap,
        request: &SearchRequest,
    ) -> DirectoryResult<Vec<DirectoryEntry>> {
        let attrs: Vec<&str> = request.attributes.iter().map(String::as_str).collect();

        debug!(
            base = %request.base,
            filter = %request.filter,
            "searching directory"
        );

        let result = self
            .bounded(ldap.search(
                &request.base,
                Self::scope(request.scope),
                &request.filter,
                attrs,
            ))
            .await?
            .map_err(|e| DirectoryError::operation_failed_with_source("search failed", e))?;

        let (entries, _res) = result
            .success()
            .map_err(|e| DirectoryError::operation_failed(format!("search failed: {e}")))?;

        Ok(entries
            .into_iter()
            .map(SearchEntry::construct)
            .map(Self::convert_entry)
            .collect())
    }

    async fn modify_bound(
        &self,
        ldap: &mut Ldap,
        dn: &str,
        changes: Vec<AttributeModification>,
    ) -> DirectoryResult<()> {
        let mods: Vec<Mod<String>> = changes
            .into_iter()
            .map(|change| {
                let values: HashSet<String> = change.values.into_iter().collect();
                match change.op {
                    ModifyOp::Add => Mod::Add(change.attribute, values),
                    ModifyOp::Delete => Mod::Delete(change.attribute, values),
                }
            })
            .collect();

        debug!(dn = %dn, mods = mods.len(), "modifying directory entry");

        let result = self
            .bounded(ldap.modify(dn, mods))
            .await?
            .map_err(|e| {
                DirectoryError::operation_failed_with_source(format!("modify failed for {dn}"), e)
            })?;

        match result.rc {
            RC_SUCCESS => {
                info!(dn = %dn, "directory entry modified");
                Ok(())
            }
            RC_NO_SUCH_OBJECT => Err(DirectoryError::EntryNotFound {
                kind: "entry",
                name: dn.to_string(),
            }),
            rc => Err(DirectoryError::operation_failed(format!(
                "modify failed with code {rc}: {}",
                result.text
            ))),
        }
    }
}

#[async_trait]
impl Directory for LdapDirectory {
    #[instrument(skip(self, request), fields(base = %request.base))]
    async fn search(&self, request: SearchRequest) -> DirectoryResult<Vec<DirectoryEntry>> {
        let mut ldap = self.bind().await?;
        let result = self.search_bound(&mut ldap, &request).await;
        self.unbind(ldap).await;
        result
    }

    #[instrument(skip(self, changes))]
    async fn modify(
        &self,
        dn: &str,
        changes: Vec<AttributeModification>,
    ) -> DirectoryResult<()> {
        let mut ldap = self.bind().await?;
        let result = self.modify_bound(&mut ldap, dn, changes).await;
        self.unbind(ldap).await;
        result
    }
}

impl std::fmt::Debug for LdapDirectory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LdapDirectory")
            .field("config", &self.config)
            .finish()
    }
}
