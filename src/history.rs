//! Bounded, persisted log of completed analyses.
//!
//! Newest-first, capped at [`MAX_HISTORY`] entries; the whole list is
//! re-serialized to the storage key on every mutation. A persistence failure
//! never rolls back the in-memory list (the user still sees their result),
//! it is logged and counted instead.
//!
//! Known limitation: the persisted blob is a single shared key per origin.
//! Two concurrent writers (e.g. two open tabs over the same state directory)
//! race on read-modify-write; last write wins.

use std::sync::{Arc, Mutex};

use chrono::{SecondsFormat, Utc};
use metrics::counter;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::kind::AnalysisKind;
use crate::normalize::normalize;
use crate::report::AnalysisReport;
use crate::storage::KvStorage;

/// Upper bound on retained entries; appending past it evicts the oldest.
pub const MAX_HISTORY: usize = 20;

/// Storage key holding the serialized entry list (JSON array, newest first).
pub const HISTORY_KEY: &str = "truthlens-history";

/// Maximum stored length of the input label, in characters.
const MAX_INPUT_LABEL: usize = 120;

/// One persisted record of a completed analysis. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Unique within a store instance, monotonically increasing.
    pub id: u64,
    /// What was analyzed (claim text, URL, or file name), capped at 120 chars.
    pub input: String,
    /// Entries persisted before this field existed were all text claims.
    #[serde(default)]
    pub kind: AnalysisKind,
    #[serde(default)]
    pub verdict: Option<String>,
    #[serde(default)]
    pub score: Option<f32>,
    /// ISO-8601 creation time.
    pub timestamp: String,
    /// Full unmodified result payload, kept for replay and detail rendering.
    pub result: Value,
}

impl HistoryEntry {
    /// Re-parse the stored payload as this entry's kind.
    pub fn report(&self) -> serde_json::Result<AnalysisReport> {
        AnalysisReport::from_value(self.kind, self.result.clone())
    }
}

/// Restriction for [`History::list`]; empty filter matches everything.
#[derive(Debug, Clone, Default)]
pub struct HistoryFilter {
    /// Case-insensitive substring match on the input label.
    pub contains: Option<String>,
    /// Exact kind match.
    pub kind: Option<AnalysisKind>,
}

impl HistoryFilter {
    fn matches(&self, entry: &HistoryEntry) -> bool {
        if let Some(kind) = self.kind {
            if entry.kind != kind {
                return false;
            }
        }
        if let Some(needle) = &self.contains {
            let needle = needle.to_lowercase();
            if !entry.input.to_lowercase().contains(&needle) {
                return false;
            }
        }
        true
    }
}

struct Inner {
    /// Newest first.
    entries: Vec<HistoryEntry>,
    last_id: u64,
}

/// The analysis timeline, persisted through a [`KvStorage`] backend.
pub struct History {
    storage: Arc<dyn KvStorage>,
    inner: Mutex<Inner>,
}

impl History {
    /// Read and deserialize persisted state. Absent or corrupt blobs load as
    /// an empty timeline, never an error.
    pub fn load(storage: Arc<dyn KvStorage>) -> Self {
        crate::metrics::describe();
        let entries: Vec<HistoryEntry> = match storage.get(HISTORY_KEY) {
            Some(blob) => match serde_json::from_str(&blob) {
                Ok(entries) => entries,
                Err(e) => {
                    tracing::warn!(error = %e, "history blob corrupt; starting empty");
                    counter!("history_load_failures_total").increment(1);
                    Vec::new()
                }
            },
            None => Vec::new(),
        };
        let last_id = entries.iter().map(|e| e.id).max().unwrap_or(0);
        Self {
            storage,
            inner: Mutex::new(Inner { entries, last_id }),
        }
    }

    /// Record a completed analysis: normalize, prepend, truncate, persist.
    /// Returns the new entry. The in-memory list updates even if persisting
    /// fails; that failure is logged and counted, never propagated.
    pub fn append(&self, input: &str, report: &AnalysisReport) -> HistoryEntry {
        let normalized = normalize(report);
        let mut g = self.inner.lock().expect("history mutex poisoned");

        let now = Utc::now();
        // Time-based id, bumped past the previous one on clock ties/rewinds.
        let id = (now.timestamp_millis().max(0) as u64).max(g.last_id + 1);
        g.last_id = id;

        let entry = HistoryEntry {
            id,
            input: truncate_label(input),
            kind: report.kind(),
            verdict: normalized.verdict,
            score: normalized.score,
            timestamp: now.to_rfc3339_opts(SecondsFormat::Millis, true),
            result: report.to_value(),
        };

        g.entries.insert(0, entry.clone());
        g.entries.truncate(MAX_HISTORY);
        counter!("history_appends_total").increment(1);

        self.persist(&g.entries);
        entry
    }

    /// Empty the timeline and delete the persisted key entirely (no stale
    /// empty-list blob left behind).
    pub fn clear(&self) {
        let mut g = self.inner.lock().expect("history mutex poisoned");
        g.entries.clear();
        if let Err(e) = self.storage.remove(HISTORY_KEY) {
            tracing::warn!(error = %e, "failed to remove persisted history");
            counter!("history_persist_failures_total").increment(1);
        }
    }

    /// Entries newest-first, optionally filtered.
    pub fn list(&self, filter: &HistoryFilter) -> Vec<HistoryEntry> {
        let g = self.inner.lock().expect("history mutex poisoned");
        g.entries
            .iter()
            .filter(|e| filter.matches(e))
            .cloned()
            .collect()
    }

    pub fn find(&self, id: u64) -> Option<HistoryEntry> {
        let g = self.inner.lock().expect("history mutex poisoned");
        g.entries.iter().find(|e| e.id == id).cloned()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().expect("history mutex poisoned").entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn persist(&self, entries: &[HistoryEntry]) {
        let blob = serde_json::to_string(entries).unwrap_or_else(|_| "[]".to_string());
        if let Err(e) = self.storage.set(HISTORY_KEY, &blob) {
            tracing::warn!(error = %e, "failed to persist history");
            counter!("history_persist_failures_total").increment(1);
        }
    }
}

fn truncate_label(input: &str) -> String {
    if input.chars().count() <= MAX_INPUT_LABEL {
        input.to_string()
    } else {
        input.chars().take(MAX_INPUT_LABEL).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;
    use serde_json::json;

    fn text_report(verdict: &str, score: f32) -> AnalysisReport {
        AnalysisReport::from_value(
            AnalysisKind::Text,
            json!({ "verdict": verdict, "score": score }),
        )
        .unwrap()
    }

    #[test]
    fn ids_stay_unique_and_increasing_under_rapid_appends() {
        let history = History::load(Arc::new(MemoryStorage::new()));
        for i in 0..10 {
            history.append(&format!("claim {i}"), &text_report("REAL", 80.0));
        }
        let entries = history.list(&HistoryFilter::default());
        let mut ids: Vec<u64> = entries.iter().map(|e| e.id).collect();
        // Newest first means ids descend.
        assert!(ids.windows(2).all(|w| w[0] > w[1]));
        ids.dedup();
        assert_eq!(ids.len(), 10);
    }

    #[test]
    fn input_label_is_capped_at_120_chars() {
        let history = History::load(Arc::new(MemoryStorage::new()));
        let long = "x".repeat(300);
        let entry = history.append(&long, &text_report("REAL", 80.0));
        assert_eq!(entry.input.chars().count(), 120);
    }

    #[test]
    fn label_truncation_respects_char_boundaries() {
        let history = History::load(Arc::new(MemoryStorage::new()));
        let long = "é".repeat(200);
        let entry = history.append(&long, &text_report("REAL", 80.0));
        assert_eq!(entry.input.chars().count(), 120);
    }

    #[test]
    fn legacy_entry_without_kind_deserializes_as_text() {
        let raw = json!([{
            "id": 1700000000000u64,
            "input": "old claim",
            "verdict": "FAKE",
            "score": 12,
            "timestamp": "2023-11-14T22:13:20.000Z",
            "result": { "verdict": "FAKE", "score": 12 }
        }]);
        let storage = Arc::new(MemoryStorage::new());
        storage.set(HISTORY_KEY, &raw.to_string()).unwrap();
        let history = History::load(storage);
        let entries = history.list(&HistoryFilter::default());
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].kind, AnalysisKind::Text);
    }

    #[test]
    fn corrupt_blob_loads_as_empty() {
        let storage = Arc::new(MemoryStorage::new());
        storage.set(HISTORY_KEY, "{not json").unwrap();
        let history = History::load(storage);
        assert!(history.is_empty());
    }
}
