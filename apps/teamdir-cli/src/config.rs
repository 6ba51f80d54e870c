//! CLI configuration file handling.
//!
//! One TOML file drives the whole tool: a `[directory]` table for the
//! LDAP connection, an optional `[auth]` table for claim intake, an
//! optional `[permissions]` table mapping group names to permission
//! codenames, and a `store_path` for the JSON store snapshot. The bind
//! password can be kept out of the file and supplied through
//! `TEAMDIR_BIND_PASSWORD` instead.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use teamdir_auth::AuthConfig;
use teamdir_authorization::PermissionTable;
use teamdir_directory::DirectoryConfig;

use crate::error::{CliError, CliResult};

/// Environment variable overriding the directory bind password.
pub const BIND_PASSWORD_ENV: &str = "TEAMDIR_BIND_PASSWORD";

fn default_store_path() -> PathBuf {
    PathBuf::from("teamdir-store.json")
}

/// The whole CLI configuration file.
#[derive(Debug, Deserialize)]
pub struct CliConfig {
    /// Where the JSON store snapshot lives.
    #[serde(default = "default_store_path")]
    pub store_path: PathBuf,

    /// Directory connection and schema settings.
    pub directory: DirectoryConfig,

    /// Claim intake settings.
    #[serde(default)]
    pub auth: AuthConfig,

    /// Group-to-permission table.
    #[serde(default)]
    pub permissions: PermissionTable,
}

impl CliConfig {
    /// Load and validate a configuration file, applying environment
    /// overrides.
    pub async fn load(path: &Path) -> CliResult<Self> {
        let raw = tokio::fs::read_to_string(path)
            .await
            .map_err(|err| CliError::Config(format!("cannot read {}: {err}", path.display())))?;
        let mut config: CliConfig = toml::from_str(&raw)
            .map_err(|err| CliError::Config(format!("cannot parse {}: {err}", path.display())))?;

        if let Ok(password) = std::env::var(BIND_PASSWORD_ENV) {
            config.directory.bind_password = Some(password);
        }
        config
            .directory
            .validate()
            .map_err(|err| CliError::Config(err.to_string()))?;
        Ok(config)
    }
}
