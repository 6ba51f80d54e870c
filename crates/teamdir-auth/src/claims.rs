//! Claim names and extraction from a verified userinfo document.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{AuthError, AuthResult};

fn default_username_claim() -> String {
    "preferred_username".to_string()
}

fn default_email_claim() -> String {
    "email".to_string()
}

fn default_display_name_claim() -> String {
    "name".to_string()
}

fn default_groups_claim() -> String {
    "groups".to_string()
}

/// Binds the claim names an identity provider emits to the fields the
/// store records. Defaults follow the standard OIDC profile claims.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClaimMapping {
    /// Claim holding the unique login name. Required in every document.
    #[serde(default = "default_username_claim")]
    pub username_claim: String,

    /// Claim holding the email address.
    #[serde(default = "default_email_claim")]
    pub email_claim: String,

    /// Claim holding the human display name.
    #[serde(default = "default_display_name_claim")]
    pub display_name_claim: String,

    /// Claim holding the asserted group names, as a string array.
    #[serde(default = "default_groups_claim")]
    pub groups_claim: String,
}

impl Default for ClaimMapping {
    fn default() -> Self {
        Self {
            username_claim: default_username_claim(),
            email_claim: default_email_claim(),
            display_name_claim: default_display_name_claim(),
            groups_claim: default_groups_claim(),
        }
    }
}

impl ClaimMapping {
    /// Pull the bound fields out of a verified userinfo document.
    ///
    /// The username claim must be present and a non-empty string. The
    /// other claims are optional; a groups claim that is present but
    /// not a string array is rejected rather than silently coerced.
    pub fn extract(&self, userinfo: &Value) -> AuthResult<ClaimSet> {
        let username = match userinfo.get(&self.username_claim) {
            Some(Value::String(s)) if !s.is_empty() => s.clone(),
            Some(Value::String(_)) => {
                return Err(AuthError::invalid_claim(&self.username_claim, "empty string"))
            }
            Some(other) => {
                return Err(AuthError::invalid_claim(
                    &self.username_claim,
                    format!("expected string, got {other}"),
                ))
            }
            None => return Err(AuthError::missing_claim(&self.username_claim)),
        };

        let email = self.optional_string(userinfo, &self.email_claim)?;
        let display_name = self.optional_string(userinfo, &self.display_name_claim)?;

        let groups = match userinfo.get(&self.groups_claim) {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(items)) => {
                let mut groups = Vec::with_capacity(items.len());
                for item in items {
                    match item {
                        Value::String(s) => groups.push(s.clone()),
                        other => {
                            return Err(AuthError::invalid_claim(
                                &self.groups_claim,
                                format!("expected string array, found element {other}"),
                            ))
                        }
                    }
                }
                groups
            }
            Some(other) => {
                return Err(AuthError::invalid_claim(
                    &self.groups_claim,
                    format!("expected string array, got {other}"),
                ))
            }
        };

        Ok(ClaimSet {
            username,
            email,
            display_name,
            groups,
        })
    }

    fn optional_string(&self, userinfo: &Value, claim: &str) -> AuthResult<Option<String>> {
        match userinfo.get(claim) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(s)) if s.is_empty() => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.clone())),
            Some(other) => Err(AuthError::invalid_claim(
                claim,
                format!("expected string, got {other}"),
            )),
        }
    }
}

/// The identity fields extracted from one login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaimSet {
    pub username: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub groups: Vec<String>,
}
