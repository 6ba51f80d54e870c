//! CLI error types and exit codes.

use thiserror::Error;

use teamdir_import::ImportError;

/// Exit codes:
/// - 0: success
/// - 1: general error (configuration, I/O, store)
/// - 3: directory unreachable
/// - 4: validation error
pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(String),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error(transparent)]
    Import(#[from] ImportError),
}

impl CliError {
    /// Get the exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Config(_) | CliError::Io(_) => 1,
            CliError::Validation(_) => 4,
            CliError::Import(ImportError::Directory(err)) if err.is_transient() => 3,
            CliError::Import(_) => 1,
        }
    }

    /// Print the error to stderr.
    pub fn print(&self) {
        let use_color = std::env::var("NO_COLOR").is_err();
        if use_color {
            eprintln!("\x1b[31mError:\x1b[0m {self}");
        } else {
            eprintln!("Error: {self}");
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(e: std::io::Error) -> Self {
        CliError::Io(e.to_string())
    }
}
