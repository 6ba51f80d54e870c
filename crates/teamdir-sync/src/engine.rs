//! The reconciliation pipeline.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, error, info, instrument};

use teamdir_core::{PrincipalId, TeamId};
use teamdir_directory::{
    find_group, find_user_by_username, AttributeModification, Directory, DirectoryConfig,
};
use teamdir_store::{Principal, PrincipalStore, Team, TeamStore};

use crate::change::{ChangeKind, MembershipChange};
use crate::error::{SyncError, SyncResult};
use crate::outcome::SyncOutcome;

/// Applies membership changes to the directory and the local store,
/// one team at a time.
///
/// Reconciliations for the same team are serialized on a per-team
/// async mutex; distinct teams proceed concurrently. The directory is
/// shared safely because every logical LDAP operation owns its own
/// connection.
pub struct MembershipSyncEngine {
    directory: Arc<dyn Directory>,
    config: DirectoryConfig,
    teams: Arc<dyn TeamStore>,
    principals: Arc<dyn PrincipalStore>,
    team_locks: Mutex<HashMap<TeamId, Arc<Mutex<()>>>>,
}

impl MembershipSyncEngine {
    pub fn new(
        directory: Arc<dyn Directory>,
        config: DirectoryConfig,
        teams: Arc<dyn TeamStore>,
        principals: Arc<dyn PrincipalStore>,
    ) -> Self {
        Self {
            directory,
            config,
            teams,
            principals,
            team_locks: Mutex::new(HashMap::new()),
        }
    }

    /// Apply one membership change end to end.
    ///
    /// The pipeline is Validating, Resolving, Applying, Committed. Any
    /// failure before the first directory write aborts cleanly with
    /// nothing changed on either side; a failure after a directory
    /// write surfaces as [`SyncError::PartialApply`].
    #[instrument(skip(self, change), fields(team_id = %change.team_id, kind = ?change.kind))]
    pub async fn apply(&self, change: MembershipChange) -> SyncResult<SyncOutcome> {
        let lock = self.team_lock(change.team_id).await;
        let _guard = lock.lock().await;
        self.apply_serialized(change).await
    }

    async fn apply_serialized(&self, change: MembershipChange) -> SyncResult<SyncOutcome> {
        // Validating
        let team = self
            .teams
            .team(change.team_id)
            .await?
            .ok_or(SyncError::TeamNotFound {
                id: change.team_id,
            })?;
        let affected = self.validate(&team, &change).await?;
        if affected.is_empty() {
            debug!(team = %team.slug, "change already reflected, nothing to reconcile");
            return Ok(SyncOutcome::committed(team.id));
        }

        let mut writes = 0usize;
        let mut placeholder_injected = false;
        let mut placeholder_principal: Option<PrincipalId> = None;

        if let Some(group_name) = team.directory_name.clone() {
            // Resolving
            let group = find_group(
                self.directory.as_ref(),
                &self.config,
                &group_name,
                vec![self.config.member_attribute.clone()],
            )
            .await?;

            let mut dns = Vec::with_capacity(affected.len());
            for principal in &affected {
                dns.push(self.resolve_dn(principal).await?);
            }

            let inject = if change.kind == ChangeKind::RemoveMember
                && self.config.require_non_empty_group
                && self.removal_empties_group(&group.values(&self.config.member_attribute), &dns)
            {
                match self.config.placeholder_dn.clone() {
                    // The placeholder must be linked to a local
                    // principal before any directory write lands, so
                    // the local member set can record it alongside the
                    // directory group. An unlinked placeholder aborts
                    // clean.
                    Some(dn) => {
                        let principal = self
                            .principals
                            .principal_by_directory_dn(&dn)
                            .await?
                            .ok_or_else(|| SyncError::PlaceholderUnlinked { dn: dn.clone() })?;
                        Some((dn, principal.id))
                    }
                    None => None,
                }
            } else {
                None
            };

            // Applying
            let attribute = if change.kind.is_admin() {
                self.config.owner_attribute.clone()
            } else {
                self.config.member_attribute.clone()
            };

            if let Some((placeholder_dn, principal_id)) = inject {
                self.directory
                    .modify(
                        &group.dn,
                        vec![AttributeModification::add(
                            attribute.clone(),
                            vec![placeholder_dn],
                        )],
                    )
                    .await?;
                writes += 1;
                placeholder_injected = true;
                placeholder_principal = Some(principal_id);
                info!(group = %group.dn, team = %team.slug, "injected placeholder to keep group non-empty");
            }

            let modification = if change.kind.is_removal() {
                AttributeModification::delete(attribute, dns)
            } else {
                AttributeModification::add(attribute, dns)
            };
            match self.directory.modify(&group.dn, vec![modification]).await {
                Ok(()) => writes += 1,
                Err(err) if writes > 0 => {
                    error!(
                        team = %team.slug,
                        writes,
                        error = %err,
                        "reconciliation failed after a partial directory write"
                    );
                    return Err(SyncError::PartialApply {
                        team_id: team.id,
                        writes,
                        source: Box::new(err),
                    });
                }
                Err(err) => return Err(err.into()),
            }
        }

        // Committed
        let updated = Self::commit_locally(&team, &change, &affected, placeholder_principal);
        match self.teams.update_team(updated).await {
            Ok(committed) => {
                info!(
                    team = %committed.slug,
                    members = committed.members.len(),
                    admins = committed.admins.len(),
                    writes,
                    "membership change committed"
                );
                Ok(SyncOutcome {
                    team_id: committed.id,
                    directory_writes: writes,
                    placeholder_injected,
                    ..SyncOutcome::committed(committed.id)
                })
            }
            Err(err) if writes > 0 => {
                error!(
                    team = %team.slug,
                    writes,
                    error = %err,
                    "local commit failed after directory writes landed"
                );
                Err(SyncError::PartialApply {
                    team_id: team.id,
                    writes,
                    source: Box::new(err),
                })
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Load the named principals and enforce membership invariants,
    /// returning only those the change actually affects.
    async fn validate(
        &self,
        team: &Team,
        change: &MembershipChange,
    ) -> SyncResult<Vec<Principal>> {
        let ids: BTreeSet<PrincipalId> = change.principal_ids.iter().copied().collect();
        let mut affected = Vec::new();
        for id in ids {
            let principal = self
                .principals
                .principal(id)
                .await?
                .ok_or(SyncError::PrincipalNotFound { id })?;

            match change.kind {
                ChangeKind::AddAdmin if !team.has_member(id) => {
                    return Err(SyncError::constraint(format!(
                        "cannot make '{}' an admin of '{}': not a member; \
                         the member addition must commit first",
                        principal.username, team.slug
                    )));
                }
                ChangeKind::RemoveMember if team.has_admin(id) => {
                    return Err(SyncError::constraint(format!(
                        "cannot remove '{}' from '{}': still an admin",
                        principal.username, team.slug
                    )));
                }
                _ => {}
            }

            let changes_local = match change.kind {
                ChangeKind::AddMember => !team.has_member(id),
                ChangeKind::RemoveMember => team.has_member(id),
                ChangeKind::AddAdmin => !team.has_admin(id),
                ChangeKind::RemoveAdmin => team.has_admin(id),
            };
            if changes_local {
                affected.push(principal);
            }
        }
        Ok(affected)
    }

    /// Stored DN preferred, username lookup as fallback. A principal
    /// with no directory identity at all aborts the batch.
    async fn resolve_dn(&self, principal: &Principal) -> SyncResult<String> {
        if let Some(dn) = &principal.directory_dn {
            return Ok(dn.clone());
        }
        let entry = find_user_by_username(
            self.directory.as_ref(),
            &self.config,
            &principal.username,
        )
        .await?;
        Ok(entry.dn)
    }

    /// Whether deleting `removal_dns` would leave the group with no
    /// real members. Placeholder entries never count as real, and a
    /// group already holding its placeholder needs no second one.
    fn removal_empties_group(&self, current: &[String], removal_dns: &[String]) -> bool {
        let removing: BTreeSet<String> = removal_dns
            .iter()
            .map(|dn| dn.to_ascii_lowercase())
            .collect();
        let mut saw_real_member = false;
        for dn in current {
            if self.config.is_placeholder_dn(dn) {
                // Already placeheld.
                return false;
            }
            saw_real_member = true;
            if !removing.contains(&dn.to_ascii_lowercase()) {
                return false;
            }
        }
        saw_real_member
    }

    fn commit_locally(
        team: &Team,
        change: &MembershipChange,
        affected: &[Principal],
        placeholder_principal: Option<PrincipalId>,
    ) -> Team {
        let mut updated = team.clone();
        for principal in affected {
            match change.kind {
                ChangeKind::AddMember => {
                    updated.members.insert(principal.id);
                }
                ChangeKind::RemoveMember => {
                    updated.members.remove(&principal.id);
                }
                ChangeKind::AddAdmin => {
                    updated.admins.insert(principal.id);
                }
                ChangeKind::RemoveAdmin => {
                    updated.admins.remove(&principal.id);
                }
            }
        }
        if let Some(id) = placeholder_principal {
            updated.members.insert(id);
        }
        updated
    }

    async fn team_lock(&self, team_id: TeamId) -> Arc<Mutex<()>> {
        let mut locks = self.team_locks.lock().await;
        locks
            .entry(team_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }
}
