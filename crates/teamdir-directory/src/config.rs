//! Directory configuration
//!
//! Connection settings plus the attribute/object-class names that map
//! teamdir's notions of "user" and "group" onto directory entries.

use serde::{Deserialize, Serialize};

use crate::dn::escape_filter_value;
use crate::error::{DirectoryError, DirectoryResult};

/// Configuration for the directory client.
#[derive(Clone, Serialize, Deserialize)]
pub struct DirectoryConfig {
    /// Directory server URL (e.g., "ldap://ldap.example.com:389" or
    /// "ldaps://..." for TLS).
    pub url: String,

    /// Bind DN for authentication (e.g., "cn=admin,dc=example,dc=com").
    #[serde(default)]
    pub bind_dn: String,

    /// Bind password.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bind_password: Option<String>,

    /// Base DN for all operations (e.g., "dc=example,dc=com").
    pub base_dn: String,

    /// User organizational unit, relative to `base_dn`.
    #[serde(default = "default_user_ou")]
    pub user_ou: String,

    /// Group organizational unit, relative to `base_dn`.
    #[serde(default = "default_group_ou")]
    pub group_ou: String,

    /// Object class identifying user entries.
    #[serde(default = "default_user_object_class")]
    pub user_object_class: String,

    /// Object class identifying group entries.
    #[serde(default = "default_group_object_class")]
    pub group_object_class: String,

    /// Attribute holding a user entry's primary key (the username).
    #[serde(default = "default_user_pk_attribute")]
    pub user_pk_attribute: String,

    /// Attribute holding a group entry's primary key (the group name).
    #[serde(default = "default_group_pk_attribute")]
    pub group_pk_attribute: String,

    /// Group attribute listing member DNs.
    #[serde(default = "default_member_attribute")]
    pub member_attribute: String,

    /// Group attribute listing owner (manager) DNs.
    #[serde(default = "default_owner_attribute")]
    pub owner_attribute: String,

    /// DN of the placeholder principal used to keep directory groups
    /// non-empty. Required when `require_non_empty_group` is set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder_dn: Option<String>,

    /// When true, a member removal that would leave a mirrored group
    /// empty injects the placeholder principal first.
    #[serde(default)]
    pub require_non_empty_group: bool,

    /// Bound on each directory round trip, in seconds.
    #[serde(default = "default_operation_timeout_secs")]
    pub operation_timeout_secs: u64,
}

impl std::fmt::Debug for DirectoryConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DirectoryConfig")
            .field("url", &self.url)
            .field("bind_dn", &self.bind_dn)
            .field(
                "bind_password",
                &self.bind_password.as_ref().map(|_| "***REDACTED***"),
            )
            .field("base_dn", &self.base_dn)
            .field("user_ou", &self.user_ou)
            .field("group_ou", &self.group_ou)
            .field("user_object_class", &self.user_object_class)
            .field("group_object_class", &self.group_object_class)
            .field("user_pk_attribute", &self.user_pk_attribute)
            .field("group_pk_attribute", &self.group_pk_attribute)
            .field("member_attribute", &self.member_attribute)
            .field("owner_attribute", &self.owner_attribute)
            .field("placeholder_dn", &self.placeholder_dn)
            .field("require_non_empty_group", &self.require_non_empty_group)
            .field("operation_timeout_secs", &self.operation_timeout_secs)
            .finish()
    }
}

fn default_user_ou() -> String {
    "ou=users".to_string()
}

fn default_group_ou() -> String {
    "ou=groups".to_string()
}

fn default_user_object_class() -> String {
    "inetOrgPerson".to_string()
}

fn default_group_object_class() -> String {
    "groupOfNames".to_string()
}

fn default_user_pk_attribute() -> String {
    "uid".to_string()
}

fn default_group_pk_attribute() -> String {
    "cn".to_string()
}

fn default_member_attribute() -> String {
    "member".to_string()
}

fn default_owner_attribute() -> String {
    "owner".to_string()
}

fn default_operation_timeout_secs() -> u64 {
    30
}

impl DirectoryConfig {
    /// Create a new config with required fields and defaults for the
    /// rest.
    pub fn new(url: impl Into<String>, base_dn: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            bind_dn: String::new(),
            bind_password: None,
            base_dn: base_dn.into(),
            user_ou: default_user_ou(),
            group_ou: default_group_ou(),
            user_object_class: default_user_object_class(),
            group_object_class: default_group_object_class(),
            user_pk_attribute: default_user_pk_attribute(),
            group_pk_attribute: default_group_pk_attribute(),
            member_attribute: default_member_attribute(),
            owner_attribute: default_owner_attribute(),
            placeholder_dn: None,
            require_non_empty_group: false,
            operation_timeout_secs: default_operation_timeout_secs(),
        }
    }

    /// Set bind credentials.
    #[must_use]
    pub fn with_bind(mut self, bind_dn: impl Into<String>, password: impl Into<String>) -> Self {
        self.bind_dn = bind_dn.into();
        self.bind_password = Some(password.into());
        self
    }

    /// Set the placeholder principal DN and require non-empty groups.
    #[must_use]
    pub fn with_placeholder(mut self, placeholder_dn: impl Into<String>) -> Self {
        self.placeholder_dn = Some(placeholder_dn.into());
        self.require_non_empty_group = true;
        self
    }

    /// Validate the configuration.
    pub fn validate(&self) -> DirectoryResult<()> {
        if self.url.is_empty() {
            return Err(DirectoryError::invalid_configuration("url must not be empty"));
        }
        if self.base_dn.is_empty() {
            return Err(DirectoryError::invalid_configuration(
                "base_dn must not be empty",
            ));
        }
        if self.require_non_empty_group && self.placeholder_dn.is_none() {
            return Err(DirectoryError::invalid_configuration(
                "require_non_empty_group is set but placeholder_dn is missing",
            ));
        }
        Ok(())
    }

    /// Search base for user entries: `<user_ou>,<base_dn>`.
    #[must_use]
    pub fn user_base(&self) -> String {
        format!("{},{}", self.user_ou, self.base_dn)
    }

    /// Search base for group entries: `<group_ou>,<base_dn>`.
    #[must_use]
    pub fn group_base(&self) -> String {
        format!("{},{}", self.group_ou, self.base_dn)
    }

    /// Filter matching exactly one group by name:
    /// `(&(objectClass=<group_oc>)(<group_pk>=<name>))`.
    #[must_use]
    pub fn group_search_filter(&self, group_name: &str) -> String {
        format!(
            "(&(objectClass={})({}={}))",
            self.group_object_class,
            self.group_pk_attribute,
            escape_filter_value(group_name)
        )
    }

    /// Filter matching exactly one user by username.
    #[must_use]
    pub fn user_search_filter(&self, username: &str) -> String {
        format!(
            "(&(objectClass={})({}={}))",
            self.user_object_class,
            self.user_pk_attribute,
            escape_filter_value(username)
        )
    }

    /// Filter matching all user entries.
    #[must_use]
    pub fn all_users_filter(&self) -> String {
        format!("(objectClass={})", self.user_object_class)
    }

    /// Filter matching all group entries.
    #[must_use]
    pub fn all_groups_filter(&self) -> String {
        format!("(objectClass={})", self.group_object_class)
    }

    /// Whether the given DN is the configured placeholder principal.
    #[must_use]
    pub fn is_placeholder_dn(&self, dn: &str) -> bool {
        self.placeholder_dn
            .as_deref()
            .is_some_and(|p| p.eq_ignore_ascii_case(dn))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> DirectoryConfig {
        DirectoryConfig::new("ldap://localhost:389", "dc=example,dc=com")
    }

    #[test]
    fn test_bases_compose_ou_and_base_dn() {
        let cfg = config();
        assert_eq!(cfg.user_base(), "ou=users,dc=example,dc=com");
        assert_eq!(cfg.group_base(), "ou=groups,dc=example,dc=com");
    }

    #[test]
    fn test_group_search_filter() {
        let cfg = config();
        assert_eq!(
            cfg.group_search_filter("eng"),
            "(&(objectClass=groupOfNames)(cn=eng))"
        );
    }

    #[test]
    fn test_filter_values_are_escaped() {
        let cfg = config();
        assert_eq!(
            cfg.user_search_filter("al(ice)"),
            "(&(objectClass=inetOrgPerson)(uid=al\\28ice\\29))"
        );
    }

    #[test]
    fn test_validate_rejects_missing_placeholder() {
        let mut cfg = config();
        cfg.require_non_empty_group = true;
        assert!(cfg.validate().is_err());

        cfg.placeholder_dn = Some("uid=placeholder,ou=users,dc=example,dc=com".to_string());
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_debug_redacts_password() {
        let cfg = config().with_bind("cn=admin,dc=example,dc=com", "hunter2");
        let debug = format!("{cfg:?}");
        assert!(!debug.contains("hunter2"));
        assert!(debug.contains("REDACTED"));
    }

    #[test]
    fn test_is_placeholder_dn_case_insensitive() {
        let cfg = config().with_placeholder("uid=nobody,ou=users,dc=example,dc=com");
        assert!(cfg.is_placeholder_dn("UID=Nobody,OU=users,DC=example,DC=com"));
        assert!(!cfg.is_placeholder_dn("uid=alice,ou=users,dc=example,dc=com"));
    }
}
