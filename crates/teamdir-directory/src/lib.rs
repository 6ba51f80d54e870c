//! # Directory Client
//!
//! Connection-scoped LDAP adapter for teamdir.
//!
//! This crate provides the [`Directory`] trait consumed by the
//! membership sync engine and the import jobs, an [`LdapDirectory`]
//! implementation over the LDAP v3 protocol, and an in-memory
//! [`MemoryDirectory`] used in tests.
//!
//! Every logical operation on [`LdapDirectory`] performs an explicit
//! bind before use and an unbind afterwards, including on error paths,
//! so no connection outlives the operation that opened it.
//!
//! ## Example
//!
//! ```ignore
//! use teamdir_directory::{DirectoryConfig, LdapDirectory, SearchRequest, SearchScope};
//!
//! let config = DirectoryConfig::new("ldap://ldap.example.com:389", "dc=example,dc=com")
//!     .with_bind("cn=admin,dc=example,dc=com", "secret");
//!
//! let directory = LdapDirectory::new(config.clone())?;
//! let entries = directory
//!     .search(SearchRequest::subtree(
//!         config.group_base(),
//!         config.group_search_filter("eng"),
//!         vec!["member".into()],
//!     ))
//!     .await?;
//! ```

pub mod config;
pub mod dn;
pub mod entry;
pub mod error;
pub mod ldap;
pub mod lookup;
pub mod memory;
pub mod traits;

pub use config::DirectoryConfig;
pub use entry::{AttributeModification, DirectoryEntry, ModifyOp, SearchRequest, SearchScope};
pub use error::{DirectoryError, DirectoryResult};
pub use ldap::LdapDirectory;
pub use lookup::{find_group, find_user_by_username};
pub use memory::MemoryDirectory;
pub use traits::Directory;
