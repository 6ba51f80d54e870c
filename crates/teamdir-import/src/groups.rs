//! Batch import of directory groups.

use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use teamdir_core::PrincipalId;
use teamdir_directory::{dn::rdn_value, Directory, DirectoryConfig, DirectoryEntry, SearchRequest};
use teamdir_store::{PrincipalStore, Team, TeamStore};

use crate::error::ImportResult;
use crate::report::ImportReport;

/// Upserts a local team for every group entry in the directory.
///
/// Teams are keyed by directory group name. Member and owner DNs
/// resolve to local principals through the DN's naming attribute; a
/// group holding any unresolvable DN is reported and left untouched,
/// and the run continues with the next group. Resolved member and
/// admin sets replace the local sets wholesale.
pub struct GroupImportJob {
    directory: Arc<dyn Directory>,
    config: DirectoryConfig,
    teams: Arc<dyn TeamStore>,
    principals: Arc<dyn PrincipalStore>,
}

impl GroupImportJob {
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
        }
    }

    /// Run the import. With `dry_run` every read still happens and the
    /// report counts what would change, but nothing is written.
    #[instrument(skip(self))]
    pub async fn run(&self, dry_run: bool) -> ImportResult<ImportReport> {
        let mut report = ImportReport::new(dry_run);
        let entries = self
            .directory
            .search(SearchRequest::subtree(
                self.config.group_base(),
                self.config.all_groups_filter(),
                vec![
                    self.config.group_pk_attribute.clone(),
                    self.config.member_attribute.clone(),
                    self.config.owner_attribute.clone(),
                ],
            ))
            .await?;
        report.found = entries.len();

        for entry in entries {
            let Some(name) = entry.first(&self.config.group_pk_attribute) else {
                warn!(dn = %entry.dn, "group entry has no naming attribute, skipping");
                report.skip(
                    entry.dn.clone(),
                    format!("missing '{}' attribute", self.config.group_pk_attribute),
                );
                continue;
            };
            let name = name.to_string();

            let members = match self
                .resolve_principals(&entry, &self.config.member_attribute)
                .await?
            {
                Ok(ids) => ids,
                Err(message) => {
                    warn!(group = %name, %message, "group skipped");
                    report.skip(name, message);
                    continue;
                }
            };
            let admins = match self
                .resolve_principals(&entry, &self.config.owner_attribute)
                .await?
            {
                Ok(ids) => ids,
                Err(message) => {
                    warn!(group = %name, %message, "group skipped");
                    report.skip(name, message);
                    continue;
                }
            };
            // Owners count as members so the admin-subset invariant
            // holds whatever the directory says.
            let members: BTreeSet<PrincipalId> = members.union(&admins).copied().collect();

            match self.teams.team_by_directory_name(&name).await? {
                Some(existing) => {
                    if existing.members == members && existing.admins == admins {
                        debug!(group = %name, "team unchanged");
                        continue;
                    }
                    report.updated += 1;
                    if dry_run {
                        info!(group = %name, "would update team membership");
                        continue;
                    }
                    let mut team = existing;
                    team.members = members;
                    team.admins = admins;
                    self.teams.update_team(team).await?;
                    debug!(group = %name, "replaced team membership");
                }
                None => {
                    report.created += 1;
                    if dry_run {
                        info!(group = %name, "would create team");
                        continue;
                    }
                    let mut team = Team::new(&name, &name).with_directory_name(&name);
                    team.members = members;
                    team.admins = admins;
                    self.teams.insert_team(team).await?;
                    debug!(group = %name, "created team");
                }
            }
        }

        info!(
            found = report.found,
            created = report.created,
            updated = report.updated,
            skipped = report.skipped,
            dry_run,
            "group import finished"
        );
        Ok(report)
    }

    /// Resolve every DN listed on `attribute` to a local principal.
    ///
    /// The outer error aborts the run (store failure); the inner one
    /// aborts just this group. Placeholder DNs are dropped silently.
    async fn resolve_principals(
        &self,
        entry: &DirectoryEntry,
        attribute: &str,
    ) -> ImportResult<Result<BTreeSet<PrincipalId>, String>> {
        let mut ids = BTreeSet::new();
        for dn in entry.values(attribute) {
            if self.config.is_placeholder_dn(dn) {
                continue;
            }
            let Some(username) = rdn_value(dn, &self.config.user_pk_attribute) else {
                return Ok(Err(format!(
                    "cannot extract '{}' from DN '{dn}'",
                    self.config.user_pk_attribute
                )));
            };
            match self.principals.principal_by_username(&username).await? {
                Some(principal) => {
                    ids.insert(principal.id);
                }
                None => {
                    return Ok(Err(format!(
                        "member '{username}' ({dn}) has no local principal; run the user import first"
                    )));
                }
            }
        }
        Ok(Ok(ids))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use teamdir_directory::MemoryDirectory;
    use teamdir_store::{MemoryStore, Principal};

    const PLACEHOLDER_DN: &str = "uid=nobody,ou=users,dc=example,dc=com";

    fn user_dn(username: &str) -> String {
        format!("uid={username},ou=users,dc=example,dc=com")
    }

    fn group_entry(
        cn: &str,
        members: &[&str],
        owners: &[&str],
    ) -> HashMap<String, Vec<String>> {
        let mut attrs = HashMap::new();
        attrs.insert("objectClass".to_string(), vec!["groupOfNames".to_string()]);
        attrs.insert("cn".to_string(), vec![cn.to_string()]);
        attrs.insert(
            "member".to_string(),
            members.iter().map(ToString::to_string).collect(),
        );
        attrs.insert(
            "owner".to_string(),
            owners.iter().map(ToString::to_string).collect(),
        );
        attrs
    }

    struct Fixture {
        directory: Arc<MemoryDirectory>,
        store: Arc<MemoryStore>,
        job: GroupImportJob,
    }

    fn fixture() -> Fixture {
        let directory = Arc::new(MemoryDirectory::new());
        let store = Arc::new(MemoryStore::new());
        let config = DirectoryConfig::new("ldap://localhost:389", "dc=example,dc=com")
            .with_placeholder(PLACEHOLDER_DN);
        let job = GroupImportJob::new(directory.clone(), config, store.clone(), store.clone());
        Fixture {
            directory,
            store,
            job,
        }
    }

    async fn seed_principal(store: &MemoryStore, username: &str) -> Principal {
        store
            .insert_principal(Principal::new(username).with_directory_dn(user_dn(username)))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_creates_team_with_resolved_membership() {
        let fx = fixture();
        let alice = seed_principal(&fx.store, "alice").await;
        let bob = seed_principal(&fx.store, "bob").await;
        fx.directory.put_entry(
            "cn=eng,ou=groups,dc=example,dc=com",
            group_entry("eng", &[&user_dn("alice"), &user_dn("bob")], &[&user_dn("alice")]),
        );

        let report = fx.job.run(false).await.unwrap();
        assert_eq!(report.created, 1);
        assert!(report.is_clean());

        let team = fx
            .store
            .team_by_directory_name("eng")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(team.name, "eng");
        assert_eq!(team.slug, "eng");
        assert!(team.has_member(alice.id));
        assert!(team.has_member(bob.id));
        assert!(team.has_admin(alice.id));
        assert!(!team.has_admin(bob.id));
        assert!(team.admins_are_members());
    }

    #[tokio::test]
    async fn test_membership_replaced_wholesale() {
        let fx = fixture();
        let alice = seed_principal(&fx.store, "alice").await;
        let bob = seed_principal(&fx.store, "bob").await;
        let mut team = Team::new("eng", "eng").with_directory_name("eng");
        team.members.insert(bob.id);
        fx.store.insert_team(team).await.unwrap();

        // Directory says alice only.
        fx.directory.put_entry(
            "cn=eng,ou=groups,dc=example,dc=com",
            group_entry("eng", &[&user_dn("alice")], &[]),
        );

        let report = fx.job.run(false).await.unwrap();
        assert_eq!(report.updated, 1);

        let team = fx
            .store
            .team_by_directory_name("eng")
            .await
            .unwrap()
            .unwrap();
        assert!(team.has_member(alice.id));
        assert!(!team.has_member(bob.id));
    }

    #[tokio::test]
    async fn test_unresolvable_member_aborts_that_group_only() {
        let fx = fixture();
        let alice = seed_principal(&fx.store, "alice").await;
        fx.directory.put_entry(
            "cn=broken,ou=groups,dc=example,dc=com",
            group_entry("broken", &[&user_dn("stranger")], &[]),
        );
        fx.directory.put_entry(
            "cn=eng,ou=groups,dc=example,dc=com",
            group_entry("eng", &[&user_dn("alice")], &[]),
        );

        let report = fx.job.run(false).await.unwrap();
        assert_eq!(report.found, 2);
        assert_eq!(report.created, 1);
        assert_eq!(report.skipped, 1);
        assert_eq!(report.errors[0].key, "broken");

        assert!(fx
            .store
            .team_by_directory_name("broken")
            .await
            .unwrap()
            .is_none());
        let eng = fx
            .store
            .team_by_directory_name("eng")
            .await
            .unwrap()
            .unwrap();
        assert!(eng.has_member(alice.id));
    }

    #[tokio::test]
    async fn test_placeholder_member_ignored() {
        let fx = fixture();
        seed_principal(&fx.store, "alice").await;
        fx.directory.put_entry(
            "cn=eng,ou=groups,dc=example,dc=com",
            group_entry("eng", &[PLACEHOLDER_DN, &user_dn("alice")], &[]),
        );

        let report = fx.job.run(false).await.unwrap();
        assert!(report.is_clean());
        let team = fx
            .store
            .team_by_directory_name("eng")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(team.members.len(), 1);
    }

    #[tokio::test]
    async fn test_rerun_is_idempotent() {
        let fx = fixture();
        seed_principal(&fx.store, "alice").await;
        fx.directory.put_entry(
            "cn=eng,ou=groups,dc=example,dc=com",
            group_entry("eng", &[&user_dn("alice")], &[]),
        );

        fx.job.run(false).await.unwrap();
        let second = fx.job.run(false).await.unwrap();
        assert_eq!(second.created, 0);
        assert_eq!(second.updated, 0);
    }

    #[tokio::test]
    async fn test_dry_run_reads_but_never_writes() {
        let fx = fixture();
        seed_principal(&fx.store, "alice").await;
        fx.directory.put_entry(
            "cn=eng,ou=groups,dc=example,dc=com",
            group_entry("eng", &[&user_dn("alice")], &[]),
        );

        let report = fx.job.run(true).await.unwrap();
        assert!(report.dry_run);
        assert_eq!(report.created, 1);
        assert!(fx
            .store
            .team_by_directory_name("eng")
            .await
            .unwrap()
            .is_none());
    }
}
