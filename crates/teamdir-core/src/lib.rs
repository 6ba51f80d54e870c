//! teamdir Core Library
//!
//! Shared identifier types for the teamdir membership-synchronization
//! stack.
//!
//! # Example
//!
//! ```
//! use teamdir_core::{PrincipalId, TeamId};
//!
//! let principal_id = PrincipalId::new();
//! let team_id = TeamId::new();
//! assert_ne!(principal_id.to_string(), team_id.to_string());
//! ```

pub mod ids;

pub use ids::{PrincipalId, TeamId};
