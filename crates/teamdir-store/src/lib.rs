//! # teamdir Store
//!
//! Local-store models and interfaces.
//!
//! Persistent storage of principals and teams is an external
//! collaborator of the sync core: this crate defines the [`Principal`]
//! and [`Team`] aggregates, the [`PrincipalStore`] / [`TeamStore`]
//! traits the engine and import jobs depend on, and a [`MemoryStore`]
//! backend with snapshot support used by tests and the CLI.

pub mod error;
pub mod memory;
pub mod models;
pub mod traits;

pub use error::{StoreError, StoreResult};
pub use memory::MemoryStore;
pub use models::{Principal, Team};
pub use traits::{PrincipalStore, StoreSnapshot, TeamStore};
