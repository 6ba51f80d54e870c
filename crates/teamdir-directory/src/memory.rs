//! In-memory directory backend.
//!
//! Implements [`Directory`] against a map of entries, with a recorded
//! modify log for assertions. Used by the sync engine and import job
//! test suites; also handy for local development without a directory
//! server.
//!
//! Add of a present value and Delete of an absent value are no-ops,
//! matching the directory protocol semantics the sync engine relies on
//! for safe re-issuing of whole reconciliations.

use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::entry::{AttributeModification, DirectoryEntry, ModifyOp, SearchRequest, SearchScope};
use crate::error::{DirectoryError, DirectoryResult};
use crate::traits::Directory;

/// A modify call as observed by the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedModify {
    /// Target entry DN.
    pub dn: String,
    /// The modifications that were requested.
    pub changes: Vec<AttributeModification>,
}

#[derive(Default)]
struct Inner {
    /// DN (lowercased) -> attributes. BTreeMap keeps iteration stable.
    entries: BTreeMap<String, DirectoryEntry>,
    modify_log: Vec<RecordedModify>,
    injected_failures: VecDeque<DirectoryError>,
}

/// In-memory [`Directory`] implementation.
#[derive(Default)]
pub struct MemoryDirectory {
    inner: Mutex<Inner>,
}

impl MemoryDirectory {
    /// Create an empty directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace an entry.
    pub fn put_entry(&self, dn: impl Into<String>, attributes: HashMap<String, Vec<String>>) {
        let dn = dn.into();
        let mut inner = self.inner.lock().expect("memory directory poisoned");
        inner
            .entries
            .insert(dn.to_ascii_lowercase(), DirectoryEntry::new(dn, attributes));
    }

    /// Current attribute values of an entry, if it exists.
    #[must_use]
    pub fn entry(&self, dn: &str) -> Option<DirectoryEntry> {
        let inner = self.inner.lock().expect("memory directory poisoned");
        inner.entries.get(&dn.to_ascii_lowercase()).cloned()
    }

    /// All modify calls observed so far, in order.
    #[must_use]
    pub fn modify_log(&self) -> Vec<RecordedModify> {
        let inner = self.inner.lock().expect("memory directory poisoned");
        inner.modify_log.clone()
    }

    /// Clear the modify log.
    pub fn clear_modify_log(&self) {
        let mut inner = self.inner.lock().expect("memory directory poisoned");
        inner.modify_log.clear();
    }

    /// Queue an error to be returned by the next operation (search or
    /// modify), simulating transport failures.
    pub fn inject_failure(&self, error: DirectoryError) {
        let mut inner = self.inner.lock().expect("memory directory poisoned");
        inner.injected_failures.push_back(error);
    }

    fn take_injected_failure(inner: &mut Inner) -> Option<DirectoryError> {
        inner.injected_failures.pop_front()
    }

    fn in_scope(entry_dn: &str, base: &str, scope: SearchScope) -> bool {
        let dn = entry_dn.to_ascii_lowercase();
        let base = base.to_ascii_lowercase();
        match scope {
            SearchScope::Base => dn == base,
            SearchScope::OneLevel => dn
                .strip_suffix(&format!(",{base}"))
                .is_some_and(|rdn| !rdn.contains(',')),
            SearchScope::Subtree => dn == base || dn.ends_with(&format!(",{base}")),
        }
    }

    /// Minimal filter evaluator covering the grammar teamdir emits:
    /// `(attr=value)`, `(attr=*)`, and conjunctions `(&(..)(..))`.
    fn matches_filter(entry: &DirectoryEntry, filter: &str) -> bool {
        let filter = filter.trim();
        let Some(body) = filter
            .strip_prefix('(')
            .and_then(|f| f.strip_suffix(')'))
        else {
            return false;
        };

        if let Some(rest) = body.strip_prefix('&') {
            return Self::split_clauses(rest)
                .iter()
                .all(|clause| Self::matches_filter(entry, clause));
        }

        let Some((attr, value)) = body.split_once('=') else {
            return false;
        };
        let values = entry
            .attributes
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(attr))
            .map(|(_, v)| v.as_slice())
            .unwrap_or(&[]);

        if value == "*" {
            !values.is_empty()
        } else {
            values.iter().any(|v| v == value)
        }
    }

    /// Split `(a=x)(b=y)` into top-level parenthesized clauses.
    fn split_clauses(s: &str) -> Vec<String> {
        let mut clauses = Vec::new();
        let mut depth = 0usize;
        let mut start = 0usize;
        for (i, ch) in s.char_indices() {
            match ch {
                '(' => {
                    if depth == 0 {
                        start = i;
                    }
                    depth += 1;
                }
                ')' => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        clauses.push(s[start..=i].to_string());
                    }
                }
                _ => {}
            }
        }
        clauses
    }
}

#[async_trait]
impl Directory for MemoryDirectory {
    async fn search(&self, request: SearchRequest) -> DirectoryResult<Vec<DirectoryEntry>> {
        let mut inner = self.inner.lock().expect("memory directory poisoned");
        if let Some(error) = Self::take_injected_failure(&mut inner) {
            return Err(error);
        }

        let results = inner
            .entries
            .values()
            .filter(|entry| Self::in_scope(&entry.dn, &request.base, request.scope))
            .filter(|entry| Self::matches_filter(entry, &request.filter))
            .map(|entry| {
                if request.attributes.is_empty() {
                    entry.clone()
                } else {
                    let attributes = entry
                        .attributes
                        .iter()
                        .filter(|(name, _)| {
                            request
                                .attributes
                                .iter()
                                .any(|a| a.eq_ignore_ascii_case(name))
                        })
                        .map(|(name, values)| (name.clone(), values.clone()))
                        .collect();
                    DirectoryEntry::new(entry.dn.clone(), attributes)
                }
            })
            .collect();

        Ok(results)
    }

    async fn modify(
        &self,
        dn: &str,
        changes: Vec<AttributeModification>,
    ) -> DirectoryResult<()> {
        let mut inner = self.inner.lock().expect("memory directory poisoned");
        if let Some(error) = Self::take_injected_failure(&mut inner) {
            return Err(error);
        }

        let key = dn.to_ascii_lowercase();
        if !inner.entries.contains_key(&key) {
            return Err(DirectoryError::EntryNotFound {
                kind: "entry",
                name: dn.to_string(),
            });
        }

        inner.modify_log.push(RecordedModify {
            dn: dn.to_string(),
            changes: changes.clone(),
        });

        let entry = inner.entries.get_mut(&key).expect("checked above");
        for change in changes {
            let values = entry.attributes.entry(change.attribute).or_default();
            match change.op {
                ModifyOp::Add => {
                    for value in change.values {
                        if !values.contains(&value) {
                            values.push(value);
                        }
                    }
                }
                ModifyOp::Delete => {
                    values.retain(|v| !change.values.contains(v));
                }
            }
        }

        Ok(())
    }
}
