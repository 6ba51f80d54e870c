//! The static group-to-permission mapping.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

/// Maps directory group names to the permission codenames they grant.
///
/// Loaded from configuration at startup and treated as immutable for
/// the lifetime of the process. Group names are matched exactly;
/// groups absent from the table grant nothing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PermissionTable {
    groups: BTreeMap<String, BTreeSet<String>>,
}

impl PermissionTable {
    /// Create an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Grant a set of permissions to a group, merging with any
    /// permissions the group already holds.
    pub fn grant<I, S>(&mut self, group: impl Into<String>, permissions: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.groups
            .entry(group.into())
            .or_default()
            .extend(permissions.into_iter().map(Into::into));
    }

    /// The permissions granted by a single group, if any.
    #[must_use]
    pub fn permissions_for(&self, group: &str) -> Option<&BTreeSet<String>> {
        self.groups.get(group)
    }

    /// The union of permissions granted by the given groups.
    ///
    /// Unknown group names contribute nothing.
    pub fn union<'a, I>(&self, groups: I) -> BTreeSet<String>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut effective = BTreeSet::new();
        for group in groups {
            if let Some(permissions) = self.groups.get(group) {
                effective.extend(permissions.iter().cloned());
            }
        }
        effective
    }

    /// Number of groups in the table.
    #[must_use]
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// Whether the table grants nothing at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}
