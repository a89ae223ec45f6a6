use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::history::{History, SEEN};
use crate::normalizer::NormalizedEntry;

/// Label the compatibility listings use before a tier has been assigned.
pub const UNKNOWN_LABEL: &str = "Unknown";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DiffKind {
    New,
    Changed,
    Unchanged,
}

/// What to do with an identity seen for the first time while its label is
/// still the unknown sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnknownLabelPolicy {
    /// Remember it so the real classification shows up as a change later,
    /// but do not announce it.
    #[default]
    RecordSilently,
    /// Neither remember nor announce it.
    Skip,
    /// Treat it like any other new entry.
    Notify,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffPolicy {
    pub unknown_label: Option<String>,
    pub on_unknown_new: UnknownLabelPolicy,
}

impl Default for DiffPolicy {
    fn default() -> Self {
        Self {
            unknown_label: Some(UNKNOWN_LABEL.to_string()),
            on_unknown_new: UnknownLabelPolicy::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffResult {
    pub entry: NormalizedEntry,
    pub kind: DiffKind,
    pub previous_label: Option<String>,
    /// Whether this result should reach the notifier. A `New` result may be
    /// recorded without being announced.
    pub notify: bool,
}

impl DiffResult {
    /// Label to persist for this entry.
    pub fn label(&self) -> &str {
        effective_label(&self.entry)
    }

    /// Whether merging this result changes the history.
    pub fn writes_history(&self) -> bool {
        self.kind != DiffKind::Unchanged
    }
}

/// Results of one diff plus the merged history.
#[derive(Debug, Clone)]
pub struct DiffOutcome {
    pub results: Vec<DiffResult>,
    pub history: History,
}

impl DiffOutcome {
    pub fn actionable(&self) -> impl Iterator<Item = &DiffResult> {
        self.results.iter().filter(|r| r.notify)
    }
}

fn effective_label(entry: &NormalizedEntry) -> &str {
    entry.classification_label.as_deref().unwrap_or(SEEN)
}

/// Decides per entry whether it is new, changed or already handled.
#[derive(Debug, Clone, Default)]
pub struct DiffEngine {
    policy: DiffPolicy,
}

impl DiffEngine {
    pub fn new(policy: DiffPolicy) -> Self {
        Self { policy }
    }

    /// Compare `entries` (already in processing order) against `history`.
    ///
    /// One result per distinct identity; when an identity repeats within the
    /// batch, its first kept occurrence wins. Entries the unknown-label
    /// policy skips produce no result and do not shadow later copies. `history` is not modified.
    pub fn diff(&self, entries: Vec<NormalizedEntry>, history: &History) -> Vec<DiffResult> {
        let mut seen: HashSet<String> = HashSet::new();
        let mut results = Vec::with_capacity(entries.len());

        for entry in entries {
            if seen.contains(&entry.identity) {
                debug!(identity = %entry.identity, "duplicate identity in batch, keeping first");
                continue;
            }

            let current = effective_label(&entry);
            let result = match history.get(&entry.identity) {
                None => {
                    let is_unknown = self.policy.unknown_label.as_deref() == Some(current);
                    let notify = match (is_unknown, self.policy.on_unknown_new) {
                        (false, _) | (true, UnknownLabelPolicy::Notify) => true,
                        (true, UnknownLabelPolicy::RecordSilently) => false,
                        (true, UnknownLabelPolicy::Skip) => continue,
                    };
                    DiffResult {
                        entry,
                        kind: DiffKind::New,
                        previous_label: None,
                        notify,
                    }
                }
                Some(previous) if previous != current => DiffResult {
                    previous_label: Some(previous.to_string()),
                    entry,
                    kind: DiffKind::Changed,
                    notify: true,
                },
                Some(_) => DiffResult {
                    entry,
                    kind: DiffKind::Unchanged,
                    previous_label: None,
                    notify: false,
                },
            };
            seen.insert(result.entry.identity.clone());
            results.push(result);
        }

        results
    }

    /// Apply one result to `history`. Returns `true` if the history changed.
    pub fn merge(&self, history: &mut History, result: &DiffResult) -> bool {
        if !result.writes_history() {
            return false;
        }
        history.record(&result.entry.identity, result.label())
    }

    /// Diff and merge everything in one step, optionally enforcing a cap.
    pub fn run(
        &self,
        entries: Vec<NormalizedEntry>,
        history: &History,
        cap: Option<usize>,
    ) -> DiffOutcome {
        let results = self.diff(entries, history);
        let mut merged = history.clone();
        for result in &results {
            self.merge(&mut merged, result);
        }
        if let Some(cap) = cap
            && merged.is_dirty()
        {
            merged.retain_latest(cap);
        }
        DiffOutcome {
            results,
            history: merged,
        }
    }
}
