//! Permission checks for principals.

use std::collections::BTreeSet;

use tracing::debug;

use teamdir_store::Principal;

use crate::table::PermissionTable;

/// Answers permission checks by group membership.
///
/// Resolution is pure against the group names recorded on the
/// principal; it never consults the directory.
#[derive(Debug, Clone)]
pub struct PermissionResolver {
    table: PermissionTable,
}

impl PermissionResolver {
    #[must_use]
    pub fn new(table: PermissionTable) -> Self {
        Self { table }
    }

    /// Whether the principal holds the given permission.
    ///
    /// Inactive principals hold no permissions regardless of group
    /// membership.
    #[must_use]
    pub fn has_permission(&self, principal: &Principal, permission: &str) -> bool {
        if !principal.active {
            return false;
        }
        let granted = principal
            .group_names
            .iter()
            .filter_map(|group| self.table.permissions_for(group))
            .any(|permissions| permissions.contains(permission));
        debug!(
            username = %principal.username,
            permission,
            granted,
            "permission check"
        );
        granted
    }

    /// Module-level permission checks are not group-driven and always
    /// deny; callers gate on concrete permission codenames instead.
    #[must_use]
    pub fn has_module_permission(&self, _principal: &Principal, _module: &str) -> bool {
        false
    }

    /// The full permission set the principal holds, as the union over
    /// its groups. Empty for inactive principals.
    #[must_use]
    pub fn effective_permissions(&self, principal: &Principal) -> BTreeSet<String> {
        if !principal.active {
            return BTreeSet::new();
        }
        self.table
            .union(principal.group_names.iter().map(String::as_str))
    }
}
