//! One-time registration of the telemetry series this crate emits.
//!
//! Emission goes through the `metrics` facade; whether anything records them
//! is up to the embedding application's recorder.

use metrics::describe_counter;
use once_cell::sync::OnceCell;

pub fn describe() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!(
            "analysis_requests_total",
            "Analysis requests sent to the backend."
        );
        describe_counter!(
            "analysis_request_failures_total",
            "Analysis requests that ended in any failure mode."
        );
        describe_counter!("history_appends_total", "Entries appended to the history.");
        describe_counter!(
            "history_persist_failures_total",
            "History writes/removes that failed at the storage layer."
        );
        describe_counter!(
            "history_load_failures_total",
            "History blobs that were present but corrupt at load."
        );
        describe_counter!(
            "stale_responses_discarded_total",
            "In-flight resolutions discarded because a newer submit superseded them."
        );
    });
}
