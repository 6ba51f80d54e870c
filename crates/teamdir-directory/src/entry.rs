//! Directory operation types: search requests, entries, and modify
//! operations.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Search scope, matching the directory protocol's three scopes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchScope {
    /// The base entry only.
    Base,
    /// Immediate children of the base entry.
    OneLevel,
    /// The base entry and all descendants.
    Subtree,
}

/// A directory search.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchRequest {
    /// Search base DN.
    pub base: String,
    /// Search scope.
    pub scope: SearchScope,
    /// Query filter, e.g. `(&(objectClass=groupOfNames)(cn=eng))`.
    pub filter: String,
    /// Attributes to return.
    pub attributes: Vec<String>,
}

impl SearchRequest {
    /// Create a subtree search, the common case for OU-scoped lookups.
    pub fn subtree(
        base: impl Into<String>,
        filter: impl Into<String>,
        attributes: Vec<String>,
    ) -> Self {
        Self {
            base: base.into(),
            scope: SearchScope::Subtree,
            filter: filter.into(),
            attributes,
        }
    }
}

/// A directory entry as returned by a search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryEntry {
    /// The entry's distinguished name.
    pub dn: String,
    /// Returned attributes. Multi-valued attributes keep server order.
    pub attributes: HashMap<String, Vec<String>>,
}

impl DirectoryEntry {
    /// Create an entry.
    pub fn new(dn: impl Into<String>, attributes: HashMap<String, Vec<String>>) -> Self {
        Self {
            dn: dn.into(),
            attributes,
        }
    }

    /// First value of an attribute, if present and non-empty.
    #[must_use]
    pub fn first(&self, attribute: &str) -> Option<&str> {
        self.attributes
            .get(attribute)
            .and_then(|values| values.first())
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    /// All values of an attribute; empty slice when absent.
    #[must_use]
    pub fn values(&self, attribute: &str) -> &[String] {
        self.attributes
            .get(attribute)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

/// The two modify operations the sync engine issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModifyOp {
    /// Add values to an attribute. Adding an already-present value is a
    /// no-op in the directory protocol, which makes whole-reconciliation
    /// retries safe.
    Add,
    /// Delete values from an attribute. Deleting an absent value is
    /// likewise a no-op.
    Delete,
}

/// A single attribute modification: one operation, one attribute, the
/// batched values for that operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeModification {
    /// Attribute to modify (e.g., `member`, `owner`).
    pub attribute: String,
    /// Add or Delete.
    pub op: ModifyOp,
    /// Values (DNs, for membership attributes).
    pub values: Vec<String>,
}

impl AttributeModification {
    /// Batch addition of values to an attribute.
    pub fn add(attribute: impl Into<String>, values: Vec<String>) -> Self {
        Self {
            attribute: attribute.into(),
            op: ModifyOp::Add,
            values,
        }
    }

    /// Batch removal of values from an attribute.
    pub fn delete(attribute: impl Into<String>, values: Vec<String>) -> Self {
        Self {
            attribute: attribute.into(),
            op: ModifyOp::Delete,
            values,
        }
    }
}
