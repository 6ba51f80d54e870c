//! Intake configuration.

use serde::{Deserialize, Serialize};

use crate::claims::ClaimMapping;

/// Configuration for the claim intake.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Claim-name bindings.
    #[serde(flatten)]
    pub mapping: ClaimMapping,

    /// Asserted group names matching this pattern are dropped before
    /// storage. Unset keeps every group.
    #[serde(default)]
    pub group_ignore_regex: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_empty_document() {
        let config: AuthConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.mapping.username_claim, "preferred_username");
        assert_eq!(config.mapping.groups_claim, "groups");
        assert!(config.group_ignore_regex.is_none());
    }

    #[test]
    fn test_override_single_binding() {
        let config: AuthConfig = serde_json::from_str(
            r#"{"username_claim": "sub", "group_ignore_regex": "^app-.*"}"#,
        )
        .unwrap();
        assert_eq!(config.mapping.username_claim, "sub");
        assert_eq!(config.mapping.email_claim, "email");
        assert_eq!(config.group_ignore_regex.as_deref(), Some("^app-.*"));
    }
}
