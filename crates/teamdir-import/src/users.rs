//! Batch import of directory users.

use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use teamdir_directory::{Directory, DirectoryConfig, SearchRequest};
use teamdir_store::{Principal, PrincipalStore};

use crate::error::ImportResult;
use crate::report::ImportReport;

/// Upserts a local principal for every user entry in the directory.
///
/// Entries are keyed by the configured user naming attribute. Created
/// principals carry an unusable local credential; updates re-sync the
/// surname-derived fields only and never touch group assignments.
/// Re-running against unchanged directory data is a no-op.
pub struct UserImportJob {
    directory: Arc<dyn Directory>,
    config: DirectoryConfig,
    principals: Arc<dyn PrincipalStore>,
}

impl UserImportJob {
    pub fn new(
        directory: Arc<dyn Directory>,
        config: DirectoryConfig,
        principals: Arc<dyn PrincipalStore>,
    ) -> Self {
        Self {
            directory,
            config,
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
                self.config.user_base(),
                self.config.all_users_filter(),
                vec![self.config.user_pk_attribute.clone(), "sn".to_string()],
            ))
            .await?;
        report.found = entries.len();

        for entry in entries {
            let Some(username) = entry.first(&self.config.user_pk_attribute) else {
                warn!(dn = %entry.dn, "user entry has no naming attribute, skipping");
                report.skip(
                    entry.dn.clone(),
                    format!("missing '{}' attribute", self.config.user_pk_attribute),
                );
                continue;
            };
            let username = username.to_string();
            let surname = entry.first("sn").map(ToString::to_string);

            match self.principals.principal_by_username(&username).await? {
                Some(existing) => {
                    if existing.last_name == surname && existing.display_name == surname {
                        debug!(username = %username, "principal unchanged");
                        continue;
                    }
                    report.updated += 1;
                    if dry_run {
                        info!(username = %username, "would update principal");
                        continue;
                    }
                    let mut principal = existing;
                    principal.last_name = surname.clone();
                    principal.display_name = surname;
                    self.principals.update_principal(principal).await?;
                    debug!(username = %username, "re-synced surname fields");
                }
                None => {
                    report.created += 1;
                    if dry_run {
                        info!(username = %username, "would create principal");
                        continue;
                    }
                    let mut principal =
                        Principal::new(&username).with_directory_dn(entry.dn.clone());
                    principal.last_name = surname.clone();
                    principal.display_name = surname;
                    self.principals.insert_principal(principal).await?;
                    debug!(username = %username, "created principal");
                }
            }
        }

        info!(
            found = report.found,
            created = report.created,
            updated = report.updated,
            skipped = report.skipped,
            dry_run,
            "user import finished"
        );
        Ok(report)
    }
}
