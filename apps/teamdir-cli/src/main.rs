//! teamdir CLI - directory membership tooling
//!
//! Batch imports of directory users and groups into the local store,
//! driven by a TOML configuration file. Store state is persisted as a
//! JSON snapshot between runs.

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod config;
mod error;
mod snapshot;

use error::CliResult;

/// teamdir CLI - directory membership tooling
#[derive(Parser)]
#[command(name = "teamdir")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Import directory users as local principals
    ImportUsers(commands::import_users::ImportUsersArgs),

    /// Import directory groups as local teams
    ImportGroups(commands::import_groups::ImportGroupsArgs),
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => std::process::exit(0),
        Err(e) => {
            e.print();
            std::process::exit(e.exit_code());
        }
    }
}

async fn run(cli: Cli) -> CliResult<()> {
    match cli.command {
        Commands::ImportUsers(args) => commands::import_users::execute(args).await,
        Commands::ImportGroups(args) => commands::import_groups::execute(args).await,
    }
}
