pub mod errors;
pub mod schema;
pub mod store;

pub use errors::HistoryError;
pub use store::{HistoryStore, JsonFileStore, MemoryStore, ReadOnlyStore};

use indexmap::IndexMap;

/// Label recorded for identities that are tracked by existence only.
pub const SEEN: &str = "seen";

/// Identity to last known label, in insertion order.
///
/// Updating an identity keeps its position; only new identities go to the
/// back. The dirty flag records whether anything changed since load so that
/// a run without changes leaves the persisted copy untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct History {
    labels: IndexMap<String, String>,
    dirty: bool,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap an already persisted mapping. The result is clean.
    pub fn from_labels(labels: IndexMap<String, String>) -> Self {
        Self {
            labels,
            dirty: false,
        }
    }

    pub fn get(&self, identity: &str) -> Option<&str> {
        self.labels.get(identity).map(String::as_str)
    }

    pub fn contains(&self, identity: &str) -> bool {
        self.labels.contains_key(identity)
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Set the label for `identity`. Returns `true` when the stored state
    /// changed.
    pub fn record(&mut self, identity: &str, label: &str) -> bool {
        match self.labels.get_mut(identity) {
            Some(existing) if existing == label => false,
            Some(existing) => {
                *existing = label.to_string();
                self.dirty = true;
                true
            }
            None => {
                self.labels.insert(identity.to_string(), label.to_string());
                self.dirty = true;
                true
            }
        }
    }

    /// Keep only the `cap` most recently inserted identities. Returns how
    /// many were evicted.
    pub fn retain_latest(&mut self, cap: usize) -> usize {
        let excess = self.labels.len().saturating_sub(cap);
        if excess > 0 {
            self.labels.drain(..excess);
            self.dirty = true;
        }
        excess
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.labels.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn labels(&self) -> &IndexMap<String, String> {
        &self.labels
    }

    /// Mark the current state as persisted.
    pub fn mark_clean(&mut self) {
        self.dirty = false;
    }
}
