//! Unique-entry lookups.
//!
//! The sync engine references directory entries only by natural key and
//! re-resolves the DN on every operation. These helpers enforce the
//! exactly-one contract: zero matches is a reported error, never silent
//! success, and multiple matches surface as a data-integrity problem.

use crate::config::DirectoryConfig;
use crate::entry::{DirectoryEntry, SearchRequest};
use crate::error::{DirectoryError, DirectoryResult};
use crate::traits::Directory;

/// Resolve the mirrored group entry for `group_name` within the
/// configured group subtree.
pub async fn find_group(
    directory: &dyn Directory,
    config: &DirectoryConfig,
    group_name: &str,
    attributes: Vec<String>,
) -> DirectoryResult<DirectoryEntry> {
    let entries = directory
        .search(SearchRequest::subtree(
            config.group_base(),
            config.group_search_filter(group_name),
            attributes,
        ))
        .await?;
    unique(entries, "group", group_name)
}

/// Resolve the directory user entry for `username` within the
/// configured user subtree. Used as the fallback when a principal has
/// no stored directory DN.
pub async fn find_user_by_username(
    directory: &dyn Directory,
    config: &DirectoryConfig,
    username: &str,
) -> DirectoryResult<DirectoryEntry> {
    let entries = directory
        .search(SearchRequest::subtree(
            config.user_base(),
            config.user_search_filter(username),
            vec![config.user_pk_attribute.clone()],
        ))
        .await?;
    unique(entries, "user", username)
}

fn unique(
    mut entries: Vec<DirectoryEntry>,
    kind: &'static str,
    name: &str,
) -> DirectoryResult<DirectoryEntry> {
    match entries.len() {
        0 => Err(DirectoryError::EntryNotFound {
            kind,
            name: name.to_string(),
        }),
        1 => Ok(entries.remove(0)),
        count => Err(DirectoryError::AmbiguousEntry {
            kind,
            name: name.to_string(),
            count,
        }),
    }
}
