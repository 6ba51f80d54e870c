//! # teamdir Sync
//!
//! The membership synchronization engine.
//!
//! Whenever a team's member or admin set changes, the engine mirrors
//! the change into the team's directory group: one group lookup, one
//! batched modify per changed attribute, and a local commit only after
//! the directory accepted the write. Reconciliations on the same team
//! are serialized; a reconciliation either fully commits or fully
//! aborts, and the rare failure after a partial directory write is
//! reported as its own error kind rather than folded into a clean
//! abort.

pub mod change;
pub mod engine;
pub mod error;
pub mod outcome;

pub use change::{ChangeKind, MembershipChange};
pub use engine::MembershipSyncEngine;
pub use error::{SyncError, SyncResult};
pub use outcome::{SyncOutcome, SyncPhase};
