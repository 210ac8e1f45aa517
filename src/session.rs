//! Per-kind request lifecycle: `Idle -> Pending -> Success | Failed`.
//!
//! Each analysis kind owns an independent slot. Starting a new request
//! clears the previous terminal state before the network call resolves, and
//! a per-slot generation counter makes the *last* submit authoritative: a
//! resolution arriving for an older generation is discarded, so an
//! out-of-order response can never overwrite newer state. In-flight calls
//! are not cancelled, only logically superseded.
//!
//! Validation failures are rejected before any network call and do not touch
//! the slot; the session never propagates an error to its caller.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use metrics::counter;

use crate::client::{AnalysisProvider, AudioUpload, ImageInput};
use crate::history::{History, HistoryEntry};
use crate::kind::AnalysisKind;
use crate::normalize::{normalize, Normalized};
use crate::notify::{Notifier, SessionEvent};
use crate::report::AnalysisReport;

/// A fully resolved analysis, ready for rendering.
#[derive(Debug, Clone)]
pub struct AnalysisOutcome {
    pub kind: AnalysisKind,
    pub input: String,
    pub report: AnalysisReport,
    pub normalized: Normalized,
    /// History entry id this outcome was recorded (or replayed) under.
    pub entry_id: u64,
}

/// Current state of one kind's slot.
#[derive(Debug, Clone)]
pub enum Phase {
    Idle,
    Pending,
    Success(AnalysisOutcome),
    Failed(String),
}

/// What a submit call reports back.
#[derive(Debug)]
pub enum SubmitOutcome {
    /// Resolved, recorded in history, slot is `Success`.
    Completed(AnalysisOutcome),
    /// Input validation failed; nothing was sent and the slot is untouched.
    Rejected(String),
    /// The call failed; slot is `Failed` with this message.
    Failed(String),
    /// A newer submit for the same kind started before this one resolved;
    /// its resolution was discarded.
    Superseded,
}

struct Slot {
    generation: u64,
    phase: Phase,
}

impl Default for Slot {
    fn default() -> Self {
        Self {
            generation: 0,
            phase: Phase::Idle,
        }
    }
}

/// Orchestrates input validation, backend calls, history recording, and
/// notifications for one user session.
pub struct Session {
    provider: Arc<dyn AnalysisProvider>,
    history: Arc<History>,
    notifier: Arc<dyn Notifier>,
    slots: Mutex<HashMap<AnalysisKind, Slot>>,
}

impl Session {
    pub fn new(
        provider: Arc<dyn AnalysisProvider>,
        history: Arc<History>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            provider,
            history,
            notifier,
            slots: Mutex::new(HashMap::new()),
        }
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn state(&self, kind: AnalysisKind) -> Phase {
        let slots = self.slots.lock().expect("session mutex poisoned");
        slots
            .get(&kind)
            .map(|s| s.phase.clone())
            .unwrap_or(Phase::Idle)
    }

    /// Verify a claim or article URL through the unified endpoint. The server
    /// classifies the input; its `input_type` discriminator wins, with a
    /// URL-prefix heuristic as fallback for older backends.
    pub async fn submit_verify(&self, claim: &str) -> SubmitOutcome {
        let claim = claim.trim();
        if claim.is_empty() {
            return SubmitOutcome::Rejected("Enter a claim or URL to verify.".into());
        }
        let slot_kind = if looks_like_url(claim) {
            AnalysisKind::Url
        } else {
            AnalysisKind::Text
        };
        let generation = self.begin(slot_kind);
        match self.provider.verify(claim).await {
            Ok(resp) => {
                let resolved = match resp.input_type.as_deref() {
                    Some("text") => AnalysisKind::Text,
                    Some("url") => AnalysisKind::Url,
                    _ => slot_kind,
                };
                match AnalysisReport::from_value(resolved, resp.data) {
                    Ok(report) => {
                        self.resolve_success(slot_kind, generation, claim, report)
                            .await
                    }
                    Err(_) => {
                        self.resolve_failure(slot_kind, generation, "Verification failed.".into())
                            .await
                    }
                }
            }
            Err(e) => {
                self.resolve_failure(slot_kind, generation, e.user_message())
                    .await
            }
        }
    }

    pub async fn submit_phishing(&self, url: &str) -> SubmitOutcome {
        let url = url.trim();
        if url.is_empty() {
            return SubmitOutcome::Rejected("Enter a URL to scan.".into());
        }
        if !looks_like_url(url) {
            return SubmitOutcome::Rejected("That doesn't look like a URL.".into());
        }
        let generation = self.begin(AnalysisKind::Phishing);
        match self.provider.check_phishing(url).await {
            Ok(report) => {
                self.resolve_success(
                    AnalysisKind::Phishing,
                    generation,
                    url,
                    AnalysisReport::Phishing(report),
                )
                .await
            }
            Err(e) => {
                self.resolve_failure(AnalysisKind::Phishing, generation, e.user_message())
                    .await
            }
        }
    }

    pub async fn submit_image(&self, input: ImageInput) -> SubmitOutcome {
        match &input {
            ImageInput::Upload { bytes, .. } if bytes.is_empty() => {
                return SubmitOutcome::Rejected("Image file is empty.".into());
            }
            ImageInput::Remote { url } if !looks_like_url(url) => {
                return SubmitOutcome::Rejected("That doesn't look like an image URL.".into());
            }
            _ => {}
        }
        let label = input.label().to_string();
        let generation = self.begin(AnalysisKind::Image);
        match self.provider.check_image(input).await {
            Ok(report) => {
                self.resolve_success(
                    AnalysisKind::Image,
                    generation,
                    &label,
                    AnalysisReport::Image(report),
                )
                .await
            }
            Err(e) => {
                self.resolve_failure(AnalysisKind::Image, generation, e.user_message())
                    .await
            }
        }
    }

    pub async fn submit_audio(&self, upload: AudioUpload) -> SubmitOutcome {
        if upload.bytes.is_empty() {
            return SubmitOutcome::Rejected("Audio file is empty.".into());
        }
        let label = upload.file_name.clone();
        let generation = self.begin(AnalysisKind::Audio);
        match self.provider.check_audio(upload).await {
            Ok(report) => {
                self.resolve_success(
                    AnalysisKind::Audio,
                    generation,
                    &label,
                    AnalysisReport::Audio(report),
                )
                .await
            }
            Err(e) => {
                self.resolve_failure(AnalysisKind::Audio, generation, e.user_message())
                    .await
            }
        }
    }

    /// Re-show a past analysis from its stored payload: no network call, no
    /// new history entry. Supersedes any in-flight call for that kind.
    /// Returns `None` (slot untouched) if the stored payload is unreadable.
    pub fn replay(&self, entry: &HistoryEntry) -> Option<AnalysisOutcome> {
        let report = match entry.report() {
            Ok(report) => report,
            Err(e) => {
                tracing::warn!(error = %e, id = entry.id, "stored payload unreadable; replay skipped");
                return None;
            }
        };
        let outcome = AnalysisOutcome {
            kind: entry.kind,
            input: entry.input.clone(),
            normalized: normalize(&report),
            report,
            entry_id: entry.id,
        };
        let mut slots = self.slots.lock().expect("session mutex poisoned");
        let slot = slots.entry(entry.kind).or_default();
        slot.generation += 1;
        slot.phase = Phase::Success(outcome.clone());
        Some(outcome)
    }

    /// Open a new generation: clears the previous terminal state now, before
    /// the network call resolves.
    fn begin(&self, kind: AnalysisKind) -> u64 {
        let mut slots = self.slots.lock().expect("session mutex poisoned");
        let slot = slots.entry(kind).or_default();
        slot.generation += 1;
        slot.phase = Phase::Pending;
        slot.generation
    }

    async fn resolve_success(
        &self,
        slot_kind: AnalysisKind,
        generation: u64,
        input: &str,
        report: AnalysisReport,
    ) -> SubmitOutcome {
        let outcome = {
            let mut slots = self.slots.lock().expect("session mutex poisoned");
            let slot = slots.entry(slot_kind).or_default();
            if slot.generation != generation {
                counter!("stale_responses_discarded_total").increment(1);
                return SubmitOutcome::Superseded;
            }
            let entry = self.history.append(input, &report);
            let outcome = AnalysisOutcome {
                kind: report.kind(),
                input: entry.input.clone(),
                normalized: normalize(&report),
                report,
                entry_id: entry.id,
            };
            slot.phase = Phase::Success(outcome.clone());
            outcome
        };
        let message = match outcome.kind {
            AnalysisKind::Phishing => "Scan complete",
            _ => "Analysis complete",
        };
        self.notifier
            .send(&SessionEvent::success(outcome.kind, message))
            .await
            .unwrap_or_else(|e| tracing::warn!(error = ?e, "notification sink failed"));
        SubmitOutcome::Completed(outcome)
    }

    async fn resolve_failure(
        &self,
        slot_kind: AnalysisKind,
        generation: u64,
        message: String,
    ) -> SubmitOutcome {
        {
            let mut slots = self.slots.lock().expect("session mutex poisoned");
            let slot = slots.entry(slot_kind).or_default();
            if slot.generation != generation {
                counter!("stale_responses_discarded_total").increment(1);
                return SubmitOutcome::Superseded;
            }
            slot.phase = Phase::Failed(message.clone());
        }
        self.notifier
            .send(&SessionEvent::failure(slot_kind, message.clone()))
            .await
            .unwrap_or_else(|e| tracing::warn!(error = ?e, "notification sink failed"));
        SubmitOutcome::Failed(message)
    }
}

/// URL detection for inputs the server has not classified yet: `http://`,
/// `https://`, or `www.` prefix, case-insensitive.
pub fn looks_like_url(s: &str) -> bool {
    let t = s.trim().to_ascii_lowercase();
    t.starts_with("http://") || t.starts_with("https://") || t.starts_with("www.")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_heuristic_matches_prefixes_case_insensitively() {
        assert!(looks_like_url("https://example.com/a"));
        assert!(looks_like_url("HTTP://EXAMPLE.COM"));
        assert!(looks_like_url("  www.example.com"));
        assert!(!looks_like_url("the earth is flat"));
        assert!(!looks_like_url("example.com"));
        assert!(!looks_like_url("awww.cute"));
    }
}
