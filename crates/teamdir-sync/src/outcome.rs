//! Reconciliation outcome reporting.

use serde::{Deserialize, Serialize};

use teamdir_core::TeamId;

/// The phases a reconciliation moves through.
///
/// No intermediate phase is externally observable; a successful
/// reconciliation reports `Committed`, a failed one surfaces its error
/// with the phase it failed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncPhase {
    Validating,
    Resolving,
    Applying,
    Committed,
}

/// What a committed reconciliation did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncOutcome {
    /// The reconciled team.
    pub team_id: TeamId,
    /// Final phase, always `Committed` for a returned outcome.
    pub phase: SyncPhase,
    /// Directory modify calls issued. Zero for local-only teams and
    /// for changes that were already reflected locally.
    pub directory_writes: usize,
    /// Whether the placeholder was added to keep the group non-empty.
    pub placeholder_injected: bool,
}

impl SyncOutcome {
    pub(crate) fn committed(team_id: TeamId) -> Self {
        Self {
            team_id,
            phase: SyncPhase::Committed,
            directory_writes: 0,
            placeholder_injected: false,
        }
    }
}
