//! # teamdir Authorization
//!
//! Group-based permission resolution.
//!
//! Permissions are granted exclusively through directory group
//! membership: a [`PermissionTable`] maps group names to permission
//! codenames, and the [`PermissionResolver`] answers permission checks
//! for a principal as the union over the groups recorded on it.

pub mod resolver;
pub mod table;

pub use resolver::PermissionResolver;
pub use table::PermissionTable;
