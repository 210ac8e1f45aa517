// tests/session_flow.rs
//
// Session lifecycle against a scripted in-process backend: end-to-end
// submit flows, validation, failure handling, replay, and stale-response
// suppression.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::json;
use tokio::sync::{Notify, Semaphore};

use truthlens_client::report::{AudioReport, ImageReport, PhishingReport};
use truthlens_client::{
    looks_like_url, AnalysisKind, AnalysisProvider, AudioUpload, ClientError, EventOutcome,
    History, HistoryFilter, ImageInput, MemoryStorage, Notifier, Phase, Session, SessionEvent,
    SubmitOutcome, VerifyResponse,
};

/// Backend scripted by markers in the input text:
/// `[slow]` blocks until released, `[fail]` errors, URLs answer as articles.
struct ScriptedProvider {
    calls: AtomicUsize,
    slow_entered: Notify,
    slow_release: Semaphore,
}

impl ScriptedProvider {
    fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            slow_entered: Notify::new(),
            slow_release: Semaphore::new(0),
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AnalysisProvider for ScriptedProvider {
    async fn verify(&self, claim: &str) -> Result<VerifyResponse, ClientError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if claim.contains("[slow]") {
            self.slow_entered.notify_one();
            let _permit = self.slow_release.acquire().await.expect("semaphore closed");
            return Ok(VerifyResponse {
                input_type: Some("text".into()),
                data: json!({ "verdict": "REAL", "score": 88, "explanation": "slow path" }),
            });
        }
        if claim.contains("[fail]") {
            return Err(ClientError::Api("Claim too short (min 10 chars)".into()));
        }
        if claim.contains("[notype]") {
            return Ok(VerifyResponse {
                input_type: None,
                data: json!({ "verdict": "QUESTIONABLE", "credibility_score": 50 }),
            });
        }
        if looks_like_url(claim) {
            return Ok(VerifyResponse {
                input_type: Some("url".into()),
                // Stray `score` field on purpose: normalization must ignore it.
                data: json!({
                    "domain": "example.com",
                    "verdict": "MOSTLY_CREDIBLE",
                    "credibility_score": 72,
                    "score": 3,
                    "red_flags": []
                }),
            });
        }
        Ok(VerifyResponse {
            input_type: Some("text".into()),
            data: json!({
                "verdict": "FAKE",
                "score": 5,
                "explanation": "Contradicted by overwhelming evidence.",
                "sources": []
            }),
        })
    }

    async fn check_phishing(&self, url: &str) -> Result<PhishingReport, ClientError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if url.contains("fail") {
            return Err(ClientError::Api("Could not resolve hostname.".into()));
        }
        Ok(serde_json::from_value(
            json!({ "url": url, "verdict": "DANGEROUS", "risk_score": 87, "signals": ["new domain"] }),
        )
        .unwrap())
    }

    async fn check_image(&self, _input: ImageInput) -> Result<ImageReport, ClientError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(serde_json::from_value(
            json!({ "verdict": "LIKELY_AI", "ai_probability": 92, "signals": ["no exif"] }),
        )
        .unwrap())
    }

    async fn check_audio(&self, _upload: AudioUpload) -> Result<AudioReport, ClientError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(serde_json::from_value(
            json!({ "verdict": "LIKELY_REAL", "ai_probability": 9, "transcript": "hello" }),
        )
        .unwrap())
    }
}

#[derive(Default)]
struct RecordingNotifier {
    events: Mutex<Vec<SessionEvent>>,
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, ev: &SessionEvent) -> anyhow::Result<()> {
        self.events.lock().unwrap().push(ev.clone());
        Ok(())
    }
}

struct Harness {
    provider: Arc<ScriptedProvider>,
    history: Arc<History>,
    notifier: Arc<RecordingNotifier>,
    session: Arc<Session>,
}

fn harness() -> Harness {
    let provider = Arc::new(ScriptedProvider::new());
    let history = Arc::new(History::load(Arc::new(MemoryStorage::new())));
    let notifier = Arc::new(RecordingNotifier::default());
    let session = Arc::new(Session::new(
        provider.clone(),
        history.clone(),
        notifier.clone(),
    ));
    Harness {
        provider,
        history,
        notifier,
        session,
    }
}

#[tokio::test]
async fn text_claim_flows_into_history() {
    let h = harness();
    let outcome = match h.session.submit_verify("The Earth is flat").await {
        SubmitOutcome::Completed(outcome) => outcome,
        other => panic!("expected completion, got {other:?}"),
    };
    assert_eq!(outcome.kind, AnalysisKind::Text);
    assert_eq!(outcome.normalized.verdict.as_deref(), Some("FAKE"));
    assert_eq!(outcome.normalized.score, Some(5.0));

    let entries = h.history.list(&HistoryFilter::default());
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].kind, AnalysisKind::Text);
    assert_eq!(entries[0].verdict.as_deref(), Some("FAKE"));
    assert_eq!(entries[0].score, Some(5.0));
    assert_eq!(entries[0].input, "The Earth is flat");

    assert!(matches!(
        h.session.state(AnalysisKind::Text),
        Phase::Success(_)
    ));
    let events = h.notifier.events.lock().unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].outcome, EventOutcome::Success);
}

#[tokio::test]
async fn url_verdict_uses_credibility_score_not_score() {
    let h = harness();
    let outcome = match h.session.submit_verify("https://example.com/article").await {
        SubmitOutcome::Completed(outcome) => outcome,
        other => panic!("expected completion, got {other:?}"),
    };
    assert_eq!(outcome.kind, AnalysisKind::Url);
    assert_eq!(outcome.normalized.score, Some(72.0));

    let entries = h.history.list(&HistoryFilter::default());
    assert_eq!(entries[0].kind, AnalysisKind::Url);
    assert_eq!(entries[0].score, Some(72.0));
}

#[tokio::test]
async fn missing_discriminator_falls_back_to_the_url_heuristic() {
    let h = harness();
    let outcome = match h.session.submit_verify("www.example.com/x [notype]").await {
        SubmitOutcome::Completed(outcome) => outcome,
        other => panic!("expected completion, got {other:?}"),
    };
    assert_eq!(outcome.kind, AnalysisKind::Url);
    assert_eq!(outcome.normalized.score, Some(50.0));
}

#[tokio::test]
async fn empty_input_is_rejected_before_any_network_call() {
    let h = harness();
    let outcome = h.session.submit_verify("   ").await;
    assert!(matches!(outcome, SubmitOutcome::Rejected(_)));
    assert_eq!(h.provider.calls(), 0);
    assert!(matches!(h.session.state(AnalysisKind::Text), Phase::Idle));
    assert!(h.notifier.events.lock().unwrap().is_empty());
}

#[tokio::test]
async fn phishing_input_must_look_like_a_url() {
    let h = harness();
    let outcome = h.session.submit_phishing("definitely not a link").await;
    assert!(matches!(outcome, SubmitOutcome::Rejected(_)));
    assert_eq!(h.provider.calls(), 0);
}

#[tokio::test]
async fn empty_uploads_are_rejected() {
    let h = harness();
    let outcome = h
        .session
        .submit_image(ImageInput::Upload {
            file_name: "empty.png".into(),
            bytes: Vec::new(),
        })
        .await;
    assert!(matches!(outcome, SubmitOutcome::Rejected(_)));

    let outcome = h
        .session
        .submit_audio(AudioUpload {
            file_name: "empty.mp3".into(),
            bytes: Vec::new(),
        })
        .await;
    assert!(matches!(outcome, SubmitOutcome::Rejected(_)));
    assert_eq!(h.provider.calls(), 0);
}

#[tokio::test]
async fn backend_failure_sets_failed_state_and_leaves_history_alone() {
    let h = harness();
    let msg = match h.session.submit_verify("[fail] short").await {
        SubmitOutcome::Failed(msg) => msg,
        other => panic!("expected failure, got {other:?}"),
    };
    assert_eq!(msg, "Claim too short (min 10 chars)");
    assert!(h.history.is_empty());

    match h.session.state(AnalysisKind::Text) {
        Phase::Failed(m) => assert_eq!(m, "Claim too short (min 10 chars)"),
        other => panic!("expected failed state, got {other:?}"),
    }
    let events = h.notifier.events.lock().unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].outcome, EventOutcome::Failure);
}

#[tokio::test]
async fn image_and_audio_record_under_their_own_kinds() {
    let h = harness();
    h.session
        .submit_image(ImageInput::Upload {
            file_name: "sunset.png".into(),
            bytes: vec![1, 2, 3],
        })
        .await;
    h.session
        .submit_audio(AudioUpload {
            file_name: "voicemail.mp3".into(),
            bytes: vec![4, 5, 6],
        })
        .await;

    let images = h.history.list(&HistoryFilter {
        kind: Some(AnalysisKind::Image),
        ..Default::default()
    });
    assert_eq!(images.len(), 1);
    assert_eq!(images[0].input, "sunset.png");
    assert_eq!(images[0].score, Some(92.0));

    let audio = h.history.list(&HistoryFilter {
        kind: Some(AnalysisKind::Audio),
        ..Default::default()
    });
    assert_eq!(audio.len(), 1);
    assert_eq!(audio[0].verdict.as_deref(), Some("LIKELY_REAL"));
}

#[tokio::test]
async fn kinds_fail_and_succeed_independently() {
    let h = harness();
    h.session.submit_verify("The Earth is flat").await;
    h.session.submit_phishing("https://fail.example").await;

    assert!(matches!(
        h.session.state(AnalysisKind::Text),
        Phase::Success(_)
    ));
    assert!(matches!(
        h.session.state(AnalysisKind::Phishing),
        Phase::Failed(_)
    ));
}

#[tokio::test]
async fn replay_restores_success_without_network_or_reappend() {
    let h = harness();
    h.session.submit_verify("The Earth is flat").await;
    let entry = h.history.list(&HistoryFilter::default())[0].clone();
    let calls_before = h.provider.calls();

    // Push the slot into a failed state first.
    h.session.submit_verify("[fail] short").await;
    assert!(matches!(
        h.session.state(AnalysisKind::Text),
        Phase::Failed(_)
    ));

    let outcome = h.session.replay(&entry).expect("replay should parse");
    assert_eq!(outcome.kind, AnalysisKind::Text);
    assert_eq!(outcome.normalized.verdict.as_deref(), Some("FAKE"));
    assert_eq!(outcome.entry_id, entry.id);

    match h.session.state(AnalysisKind::Text) {
        Phase::Success(o) => assert_eq!(o.input, "The Earth is flat"),
        other => panic!("expected success state, got {other:?}"),
    }
    // One entry from the original submit, none added by replay; the failed
    // submit recorded nothing either. And no extra backend call: only the
    // failed submit's one.
    assert_eq!(h.history.len(), 1);
    assert_eq!(h.provider.calls(), calls_before + 1);
}

#[tokio::test]
async fn a_newer_submit_wins_over_a_late_resolution() {
    let h = harness();

    let slow_session = h.session.clone();
    let slow = tokio::spawn(async move { slow_session.submit_verify("[slow] first claim").await });

    // Wait until the first call is actually inside the backend.
    h.provider.slow_entered.notified().await;

    let fast = h.session.submit_verify("a fast second claim").await;
    assert!(matches!(fast, SubmitOutcome::Completed(_)));

    // Now let the superseded call resolve.
    h.provider.slow_release.add_permits(1);
    let slow_outcome = slow.await.expect("task panicked");
    assert!(matches!(slow_outcome, SubmitOutcome::Superseded));

    // The final state reflects the second submit, not the late first one.
    match h.session.state(AnalysisKind::Text) {
        Phase::Success(o) => assert_eq!(o.input, "a fast second claim"),
        other => panic!("expected success state, got {other:?}"),
    }
    // And only the second submit reached history.
    let entries = h.history.list(&HistoryFilter::default());
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].input, "a fast second claim");
}
