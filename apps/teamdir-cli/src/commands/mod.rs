//! CLI subcommands.

pub mod import_groups;
pub mod import_users;

use teamdir_import::ImportReport;

use crate::error::CliResult;

/// Print a finished import report, as JSON or human-readable lines.
pub fn print_report(name: &str, report: &ImportReport, json: bool) -> CliResult<()> {
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(report)
                .map_err(|err| crate::error::CliError::Io(err.to_string()))?
        );
        return Ok(());
    }

    let mode = if report.dry_run { " (dry run)" } else { "" };
    println!("{name}{mode}:");
    println!("  found:   {}", report.found);
    println!("  created: {}", report.created);
    println!("  updated: {}", report.updated);
    println!("  skipped: {}", report.skipped);
    for issue in &report.errors {
        println!("  error:   {}: {}", issue.key, issue.message);
    }
    Ok(())
}
