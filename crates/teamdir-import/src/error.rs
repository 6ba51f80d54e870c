//! Import error types.
//!
//! Only failures that sink the whole run surface here; per-record
//! problems are collected on the [`ImportReport`] instead.
//!
//! [`ImportReport`]: crate::report::ImportReport

use thiserror::Error;

use teamdir_directory::DirectoryError;
use teamdir_store::StoreError;

/// A failure that aborts an import run.
#[derive(Debug, Error)]
pub enum ImportError {
    /// The directory could not be read.
    #[error(transparent)]
    Directory(#[from] DirectoryError),

    /// The local store rejected a write.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Convenience result type for import runs.
pub type ImportResult<T> = std::result::Result<T, ImportError>;
