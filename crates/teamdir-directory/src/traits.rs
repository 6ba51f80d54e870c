//! The `Directory` trait: the seam between teamdir and the external
//! directory service.

use async_trait::async_trait;

use crate::entry::{AttributeModification, DirectoryEntry, SearchRequest};
use crate::error::DirectoryResult;

/// A connection-scoped directory adapter.
///
/// Implementations must be safe for shared use: the sync engine and the
/// import jobs may hold one instance behind an `Arc` and issue logical
/// operations concurrently. [`crate::LdapDirectory`] satisfies this by
/// giving each logical operation its own bound connection.
#[async_trait]
pub trait Directory: Send + Sync {
    /// Search for entries. Returns all matches; callers that expect a
    /// unique entry use the helpers in [`crate::lookup`], which turn
    /// zero matches into a reported error rather than silent success.
    async fn search(&self, request: SearchRequest) -> DirectoryResult<Vec<DirectoryEntry>>;

    /// Apply attribute modifications to the entry at `dn`. All
    /// modifications are sent in a single modify request.
    async fn modify(
        &self,
        dn: &str,
        changes: Vec<AttributeModification>,
    ) -> DirectoryResult<()>;
}
