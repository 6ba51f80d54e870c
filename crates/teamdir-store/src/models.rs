//! Principal and Team aggregates.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use teamdir_core::{PrincipalId, TeamId};

/// An authenticated identity known to the local store.
///
/// Principals are created on first successful external authentication
/// or by batch import, updated on every subsequent authentication, and
/// never deleted by the sync core.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    /// Surrogate identifier.
    pub id: PrincipalId,

    /// Natural key. Unique case-insensitively; the stored casing is
    /// preserved.
    pub username: String,

    /// Email address, refreshed on each authentication.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    /// Human display label. Falls back to the legal (last) name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,

    /// Legal surname, synced by the user import.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,

    /// DN binding this principal to exactly one directory entry.
    /// `None` means local-only: no directory counterpart.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub directory_dn: Option<String>,

    /// Directory group names asserted at last authentication.
    #[serde(default)]
    pub group_names: Vec<String>,

    /// Disabled principals resolve no permissions.
    pub active: bool,

    /// False for principals created by import or claim intake: they
    /// carry an unusable local credential and can only authenticate
    /// externally.
    pub password_usable: bool,

    /// Creation timestamp.
    pub created_at: DateTime<Utc>,

    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Principal {
    /// Create a new active principal with an unusable local credential.
    pub fn new(username: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: PrincipalId::new(),
            username: username.into(),
            email: None,
            display_name: None,
            last_name: None,
            directory_dn: None,
            group_names: Vec::new(),
            active: true,
            password_usable: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// Set the display name.
    #[must_use]
    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = Some(display_name.into());
        self
    }

    /// Set the directory DN.
    #[must_use]
    pub fn with_directory_dn(mut self, dn: impl Into<String>) -> Self {
        self.directory_dn = Some(dn.into());
        self
    }

    /// Human label: the display name when set, otherwise the last name,
    /// otherwise the username. When the display name differs from the
    /// username it is rendered as `"Display (username)"`.
    #[must_use]
    pub fn display(&self) -> String {
        match &self.display_name {
            Some(name) if !name.eq_ignore_ascii_case(&self.username) => {
                format!("{} ({})", name, self.username)
            }
            Some(name) => name.clone(),
            None => self
                .last_name
                .clone()
                .unwrap_or_else(|| self.username.clone()),
        }
    }

    /// Whether this principal is the configured placeholder.
    #[must_use]
    pub fn is_placeholder(&self, placeholder_dn: Option<&str>) -> bool {
        match (self.directory_dn.as_deref(), placeholder_dn) {
            (Some(dn), Some(placeholder)) => dn.eq_ignore_ascii_case(placeholder),
            _ => false,
        }
    }
}

/// An authorization/organizational unit, optionally mirrored to a
/// directory group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    /// Stable surrogate identifier, immutable.
    pub id: TeamId,

    /// Display name.
    pub name: String,

    /// Unique short code.
    pub slug: String,

    /// Cost center label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost_center: Option<String>,

    /// Primary contact.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_contact: Option<String>,

    /// External group name this team mirrors. `None` means local-only,
    /// no directory sync.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub directory_name: Option<String>,

    /// Member principals. No duplicates.
    #[serde(default)]
    pub members: BTreeSet<PrincipalId>,

    /// Admin principals. Invariant: `admins ⊆ members` after every
    /// committed mutation.
    #[serde(default)]
    pub admins: BTreeSet<PrincipalId>,

    /// Creation timestamp.
    pub created_at: DateTime<Utc>,

    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Team {
    /// Create a new team.
    pub fn new(name: impl Into<String>, slug: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: TeamId::new(),
            name: name.into(),
            slug: slug.into(),
            cost_center: None,
            primary_contact: None,
            directory_name: None,
            members: BTreeSet::new(),
            admins: BTreeSet::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Set the mirrored directory group name.
    #[must_use]
    pub fn with_directory_name(mut self, directory_name: impl Into<String>) -> Self {
        self.directory_name = Some(directory_name.into());
        self
    }

    /// Whether this team mirrors a directory group.
    #[must_use]
    pub fn is_mirrored(&self) -> bool {
        self.directory_name.is_some()
    }

    /// Whether the given principal is a member.
    #[must_use]
    pub fn has_member(&self, id: PrincipalId) -> bool {
        self.members.contains(&id)
    }

    /// Whether the given principal is an admin.
    #[must_use]
    pub fn has_admin(&self, id: PrincipalId) -> bool {
        self.admins.contains(&id)
    }

    /// Check the admin-subset invariant.
    #[must_use]
    pub fn admins_are_members(&self) -> bool {
        self.admins.is_subset(&self.members)
    }

    /// Members that are not admins.
    #[must_use]
    pub fn non_admins(&self) -> BTreeSet<PrincipalId> {
        self.members.difference(&self.admins).copied().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_prefers_display_name() {
        let principal = Principal::new("alice").with_display_name("Alice Liddell");
        assert_eq!(principal.display(), "Alice Liddell (alice)");
    }

    #[test]
    fn test_display_collapses_matching_username() {
        let principal = Principal::new("alice").with_display_name("Alice");
        // Differs -> composed form; equal (case-insensitive) -> plain.
        assert_eq!(principal.display(), "Alice (alice)");

        let principal = Principal::new("alice").with_display_name("alice");
        assert_eq!(principal.display(), "alice");
    }

    #[test]
    fn test_display_falls_back_to_last_name_then_username() {
        let mut principal = Principal::new("alice");
        assert_eq!(principal.display(), "alice");
        principal.last_name = Some("Liddell".to_string());
        assert_eq!(principal.display(), "Liddell");
    }

    #[test]
    fn test_is_placeholder() {
        let placeholder_dn = "uid=nobody,ou=users,dc=example,dc=com";
        let principal = Principal::new("nobody").with_directory_dn(placeholder_dn);
        assert!(principal.is_placeholder(Some(placeholder_dn)));
        assert!(principal.is_placeholder(Some("UID=NOBODY,ou=users,dc=example,dc=com")));
        assert!(!principal.is_placeholder(None));

        let local = Principal::new("local");
        assert!(!local.is_placeholder(Some(placeholder_dn)));
    }

    #[test]
    fn test_team_admin_subset_invariant_helpers() {
        let mut team = Team::new("Engineering", "eng");
        let alice = PrincipalId::new();
        let bob = PrincipalId::new();

        team.members.insert(alice);
        team.members.insert(bob);
        team.admins.insert(alice);

        assert!(team.admins_are_members());
        assert_eq!(team.non_admins(), BTreeSet::from([bob]));

        team.members.remove(&alice);
        assert!(!team.admins_are_members());
    }

    #[test]
    fn test_team_membership_queries() {
        let mut team = Team::new("Engineering", "eng").with_directory_name("eng");
        let alice = PrincipalId::new();
        team.members.insert(alice);

        assert!(team.is_mirrored());
        assert!(team.has_member(alice));
        assert!(!team.has_admin(alice));
    }
}
