//! Import run reporting.

use serde::{Deserialize, Serialize};

/// A per-record problem that did not stop the run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportIssue {
    /// The record the problem belongs to: a DN or a naming-attribute
    /// value, whatever identifies it best.
    pub key: String,
    /// What went wrong.
    pub message: String,
}

/// What one import run found and did.
///
/// In dry-run mode `created` and `updated` count what *would* have
/// been written.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImportReport {
    /// Whether the run mutated anything.
    pub dry_run: bool,
    /// Directory entries examined.
    pub found: usize,
    /// Local records created (or that would be, in dry-run).
    pub created: usize,
    /// Local records updated (or that would be, in dry-run).
    pub updated: usize,
    /// Records skipped over a per-record problem.
    pub skipped: usize,
    /// The per-record problems.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<ImportIssue>,
}

impl ImportReport {
    pub(crate) fn new(dry_run: bool) -> Self {
        Self {
            dry_run,
            ..Self::default()
        }
    }

    pub(crate) fn skip(&mut self, key: impl Into<String>, message: impl Into<String>) {
        self.skipped += 1;
        self.errors.push(ImportIssue {
            key: key.into(),
            message: message.into(),
        });
    }

    /// Whether the run completed with no per-record problems.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}
