//! Analysis kinds and verdict tiers.
//!
//! Every analysis the backend performs belongs to exactly one kind; the kind
//! selects which endpoint is called, which result shape comes back, and which
//! verdict vocabulary applies.

use serde::{Deserialize, Serialize};

/// Closed set of analysis kinds the backend understands.
///
/// `Text` is the serde default so that history entries persisted before the
/// kind field existed keep deserializing (they were all text claims).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisKind {
    #[default]
    Text,
    Url,
    Phishing,
    Image,
    Audio,
}

impl AnalysisKind {
    pub const ALL: [AnalysisKind; 5] = [
        AnalysisKind::Text,
        AnalysisKind::Url,
        AnalysisKind::Phishing,
        AnalysisKind::Image,
        AnalysisKind::Audio,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AnalysisKind::Text => "text",
            AnalysisKind::Url => "url",
            AnalysisKind::Phishing => "phishing",
            AnalysisKind::Image => "image",
            AnalysisKind::Audio => "audio",
        }
    }

    /// Parse a kind from user input (CLI filters). Case-insensitive.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Some(AnalysisKind::Text),
            "url" => Some(AnalysisKind::Url),
            "phishing" => Some(AnalysisKind::Phishing),
            "image" => Some(AnalysisKind::Image),
            "audio" => Some(AnalysisKind::Audio),
            _ => None,
        }
    }

    /// What a high score means for this kind.
    pub fn score_direction(&self) -> ScoreDirection {
        match self {
            AnalysisKind::Text | AnalysisKind::Url => ScoreDirection::HighIsGood,
            AnalysisKind::Phishing | AnalysisKind::Image | AnalysisKind::Audio => {
                ScoreDirection::HighIsRisk
            }
        }
    }
}

impl std::fmt::Display for AnalysisKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Score directionality. Presentation-only: the stored value is always the
/// number the backend reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreDirection {
    /// 100 = trustworthy (text truthfulness, url credibility).
    HighIsGood,
    /// 100 = risky/fake (phishing risk, image/audio AI probability).
    HighIsRisk,
}

/// Coarse bucket for coloring/labeling a verdict string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerdictTier {
    Positive,
    Negative,
    Neutral,
}

/// Classify a verdict string into its tier for the given kind.
///
/// Anything outside the kind's closed verdict set lands in `Neutral`; an
/// unknown verdict is an uncertainty signal, never an error.
pub fn verdict_tier(kind: AnalysisKind, verdict: &str) -> VerdictTier {
    let positive = match kind {
        AnalysisKind::Text => "REAL",
        AnalysisKind::Url => "MOSTLY_CREDIBLE",
        AnalysisKind::Phishing => "SAFE",
        AnalysisKind::Image | AnalysisKind::Audio => "LIKELY_REAL",
    };
    let negative = match kind {
        AnalysisKind::Text => "FAKE",
        AnalysisKind::Url => "NOT_CREDIBLE",
        AnalysisKind::Phishing => "DANGEROUS",
        AnalysisKind::Image => "LIKELY_AI",
        AnalysisKind::Audio => "LIKELY_FAKE",
    };
    if verdict == positive {
        VerdictTier::Positive
    } else if verdict == negative {
        VerdictTier::Negative
    } else {
        VerdictTier::Neutral
    }
}
