//! Sync error types.

use thiserror::Error;

use teamdir_core::{PrincipalId, TeamId};
use teamdir_directory::DirectoryError;
use teamdir_store::StoreError;

/// Errors that can occur during a reconciliation.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The change violates a membership invariant. Nothing was written.
    #[error("constraint violation: {message}")]
    ConstraintViolation {
        /// What was violated.
        message: String,
    },

    /// The team the change names does not exist locally.
    #[error("team not found: {id}")]
    TeamNotFound {
        /// The missing team.
        id: TeamId,
    },

    /// A principal the change names does not exist locally.
    #[error("principal not found: {id}")]
    PrincipalNotFound {
        /// The missing principal.
        id: PrincipalId,
    },

    /// Keeping the group non-empty requires the placeholder, but no
    /// local principal is linked to the placeholder DN. Nothing was
    /// written.
    #[error("placeholder DN has no local principal: {dn}")]
    PlaceholderUnlinked {
        /// The configured placeholder DN.
        dn: String,
    },

    /// The directory rejected a read or the first write. Nothing was
    /// committed locally and no directory write landed.
    #[error(transparent)]
    Directory(#[from] DirectoryError),

    /// The local store failed before any directory write.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// A failure after at least one directory write already landed.
    /// Local and directory state may diverge until the change is
    /// re-applied; never folded into a clean abort.
    #[error("partial application on team {team_id} after {writes} directory write(s): {source}")]
    PartialApply {
        /// The team whose group may now diverge from the local store.
        team_id: TeamId,
        /// Directory writes that landed before the failure.
        writes: usize,
        /// The failure that interrupted the reconciliation.
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl SyncError {
    pub fn constraint(message: impl Into<String>) -> Self {
        Self::ConstraintViolation {
            message: message.into(),
        }
    }

    /// Whether retrying the same change later can succeed.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Directory(err) => err.is_transient(),
            Self::PartialApply { .. } => true,
            _ => false,
        }
    }
}

/// Convenience result type for reconciliations.
pub type SyncResult<T> = std::result::Result<T, SyncError>;
