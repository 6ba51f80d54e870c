//! `teamdir import-groups` - import directory groups as teams.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Args;

use teamdir_directory::LdapDirectory;
use teamdir_import::GroupImportJob;

use crate::commands::print_report;
use crate::config::CliConfig;
use crate::error::{CliError, CliResult};
use crate::snapshot::{load_store, save_store};

/// Arguments for the import-groups command.
#[derive(Args)]
pub struct ImportGroupsArgs {
    /// Configuration file.
    #[arg(short, long, default_value = "teamdir.toml")]
    pub config: PathBuf,

    /// Read the directory and report what would change, writing
    /// nothing.
    #[arg(long)]
    pub dry_run: bool,

    /// Output the report as JSON.
    #[arg(long)]
    pub json: bool,
}

/// Execute the import-groups command.
///
/// Membership resolution needs the principals imported first; a run
/// against an empty store reports every group as unresolvable.
pub async fn execute(args: ImportGroupsArgs) -> CliResult<()> {
    let config = CliConfig::load(&args.config).await?;
    let store = Arc::new(load_store(&config.store_path).await?);
    let directory = LdapDirectory::new(config.directory.clone())
        .map_err(|err| CliError::Config(err.to_string()))?;

    let job = GroupImportJob::new(
        Arc::new(directory),
        config.directory,
        store.clone(),
        store.clone(),
    );
    let report = job.run(args.dry_run).await?;

    if !args.dry_run {
        save_store(&config.store_path, &store).await?;
    }
    print_report("group import", &report, args.json)
}
