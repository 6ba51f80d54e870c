//! The unit of reconciliation.

use serde::{Deserialize, Serialize};

use teamdir_core::{PrincipalId, TeamId};

/// What a change does to the team.
///
/// Each kind touches exactly one membership attribute: member changes
/// the group's member list, admin changes its owner list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    AddMember,
    RemoveMember,
    AddAdmin,
    RemoveAdmin,
}

impl ChangeKind {
    /// Whether this kind removes entries rather than adding them.
    #[must_use]
    pub fn is_removal(self) -> bool {
        matches!(self, Self::RemoveMember | Self::RemoveAdmin)
    }

    /// Whether this kind touches the admin (owner) attribute.
    #[must_use]
    pub fn is_admin(self) -> bool {
        matches!(self, Self::AddAdmin | Self::RemoveAdmin)
    }
}

/// An explicit before/after membership diff for one team.
///
/// A change is a batch, not a stream of events: all principals it
/// names are validated, resolved, and applied together, and the whole
/// batch aborts on the first failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MembershipChange {
    /// The team being mutated.
    pub team_id: TeamId,
    /// What happens to the named principals.
    pub kind: ChangeKind,
    /// The principals the diff names.
    pub principal_ids: Vec<PrincipalId>,
}

impl MembershipChange {
    pub fn add_members(team_id: TeamId, principal_ids: Vec<PrincipalId>) -> Self {
        Self {
            team_id,
            kind: ChangeKind::AddMember,
            principal_ids,
        }
    }

    pub fn remove_members(team_id: TeamId, principal_ids: Vec<PrincipalId>) -> Self {
        Self {
            team_id,
            kind: ChangeKind::RemoveMember,
            principal_ids,
        }
    }

    pub fn add_admins(team_id: TeamId, principal_ids: Vec<PrincipalId>) -> Self {
        Self {
            team_id,
            kind: ChangeKind::AddAdmin,
            principal_ids,
        }
    }

    pub fn remove_admins(team_id: TeamId, principal_ids: Vec<PrincipalId>) -> Self {
        Self {
            team_id,
            kind: ChangeKind::RemoveAdmin,
            principal_ids,
        }
    }
}
