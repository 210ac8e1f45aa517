//! Verdict/score normalization.
//!
//! Pure logic that maps each kind's result shape onto the one
//! `{verdict, score}` pair the history timeline stores. No I/O, total over
//! every report variant; a payload with no usable score normalizes to `None`
//! instead of failing.

use serde::{Deserialize, Serialize};

use crate::report::AnalysisReport;

/// The canonical pair every history entry carries.
///
/// Score is 0–100; its directionality (risk-high vs credibility-high) depends
/// on the kind and matters only to presentation, see
/// [`AnalysisKind::score_direction`](crate::kind::AnalysisKind::score_direction).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Normalized {
    pub verdict: Option<String>,
    pub score: Option<f32>,
}

/// Derive the canonical `{verdict, score}` for a report.
///
/// The score field differs per kind: phishing reports carry `risk_score`,
/// image and audio reports carry `ai_probability`, url reports carry
/// `credibility_score`, and text reports carry a plain `score`.
pub fn normalize(report: &AnalysisReport) -> Normalized {
    match report {
        AnalysisReport::Text(r) => Normalized {
            verdict: r.verdict.clone(),
            score: r.score,
        },
        AnalysisReport::Url(r) => Normalized {
            verdict: r.verdict.clone(),
            score: r.credibility_score,
        },
        AnalysisReport::Phishing(r) => Normalized {
            verdict: r.verdict.clone(),
            score: r.risk_score,
        },
        AnalysisReport::Image(r) => Normalized {
            verdict: r.verdict.clone(),
            score: r.ai_probability,
        },
        AnalysisReport::Audio(r) => Normalized {
            verdict: r.verdict.clone(),
            score: r.ai_probability,
        },
    }
}
