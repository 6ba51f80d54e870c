//! # teamdir Import
//!
//! Idempotent batch import of directory users and groups into the
//! local store.
//!
//! Both jobs read the whole relevant subtree, upsert records keyed by
//! the directory's naming attribute, and report per-record problems
//! without stopping the run. Dry-run mode performs every read and
//! reports what would change while mutating nothing.

pub mod error;
pub mod groups;
pub mod report;
pub mod users;

pub use error::{ImportError, ImportResult};
pub use groups::GroupImportJob;
pub use report::{ImportIssue, ImportReport};
pub use users::UserImportJob;
