// src/lib.rs
// Public library surface for integration tests (and potential reuse).

pub mod client;
pub mod config;
pub mod history;
pub mod kind;
pub mod metrics;
pub mod normalize;
pub mod notify;
pub mod report;
pub mod session;
pub mod storage;
pub mod theme;

// ---- Re-exports for stable public API ----
pub use crate::client::{
    AnalysisProvider, ApiClient, AudioUpload, ClientError, ImageInput, VerifyResponse,
};
pub use crate::config::ClientConfig;
pub use crate::history::{History, HistoryEntry, HistoryFilter, HISTORY_KEY, MAX_HISTORY};
pub use crate::kind::{verdict_tier, AnalysisKind, ScoreDirection, VerdictTier};
pub use crate::normalize::{normalize, Normalized};
pub use crate::notify::{EventOutcome, Notifier, NotifierMux, SessionEvent, TracingNotifier};
pub use crate::report::AnalysisReport;
pub use crate::session::{looks_like_url, AnalysisOutcome, Phase, Session, SubmitOutcome};
pub use crate::storage::{FileStorage, KvStorage, MemoryStorage};
