//! User-visible notifications for completed and failed analyses.
//!
//! The session emits one event per terminal transition; sinks decide how to
//! surface it (log line, desktop toast, webhook, ...). Sink failures are
//! swallowed by the mux so a broken channel never breaks an analysis.

use std::sync::Arc;

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::kind::AnalysisKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EventOutcome {
    Success,
    Failure,
}

/// One terminal transition of an analysis request.
#[derive(Debug, Clone, Serialize)]
pub struct SessionEvent {
    pub kind: AnalysisKind,
    pub outcome: EventOutcome,
    /// Short human-readable line ("Analysis complete", or the error message).
    pub message: String,
    pub ts: DateTime<Utc>,
}

impl SessionEvent {
    pub fn success(kind: AnalysisKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            outcome: EventOutcome::Success,
            message: message.into(),
            ts: Utc::now(),
        }
    }

    pub fn failure(kind: AnalysisKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            outcome: EventOutcome::Failure,
            message: message.into(),
            ts: Utc::now(),
        }
    }
}

#[async_trait::async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, ev: &SessionEvent) -> Result<()>;
}

/// Default sink: structured log lines via `tracing`.
pub struct TracingNotifier;

#[async_trait::async_trait]
impl Notifier for TracingNotifier {
    async fn send(&self, ev: &SessionEvent) -> Result<()> {
        match ev.outcome {
            EventOutcome::Success => {
                tracing::info!(kind = %ev.kind, message = %ev.message, "analysis succeeded")
            }
            EventOutcome::Failure => {
                tracing::warn!(kind = %ev.kind, message = %ev.message, "analysis failed")
            }
        }
        Ok(())
    }
}

/// Fan-out over any number of sinks. A failing sink is logged and skipped.
#[derive(Default)]
pub struct NotifierMux {
    sinks: Vec<Arc<dyn Notifier>>,
}

impl NotifierMux {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, sink: Arc<dyn Notifier>) -> Self {
        self.sinks.push(sink);
        self
    }

    pub async fn notify(&self, ev: &SessionEvent) {
        for sink in &self.sinks {
            if let Err(e) = sink.send(ev).await {
                tracing::warn!(error = ?e, "notification sink failed");
            }
        }
    }
}

#[async_trait::async_trait]
impl Notifier for NotifierMux {
    async fn send(&self, ev: &SessionEvent) -> Result<()> {
        self.notify(ev).await;
        Ok(())
    }
}
