//! Typed result payloads for each analysis kind.
//!
//! The backend returns a different JSON shape per kind (see the per-endpoint
//! structs below). Everything optional on the wire stays `Option` here, and
//! each top-level report keeps a flattened catch-all map so fields this crate
//! does not model survive a serialize round-trip.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::kind::AnalysisKind;

/// One search-evidence hit backing a text verdict or a key claim.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Source {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub snippet: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
}

/// `/api/verify` result for a plain text claim.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TextReport {
    #[serde(default)]
    pub verdict: Option<String>,
    #[serde(default)]
    pub score: Option<f32>,
    #[serde(default)]
    pub explanation: Option<String>,
    #[serde(default)]
    pub verified_context: Option<String>,
    #[serde(default)]
    pub sources: Vec<Source>,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

/// Scraped article metadata inside a URL report.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Article {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub excerpt: Option<String>,
}

/// Per-dimension prose assessments for an article.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UrlAnalysis {
    #[serde(default)]
    pub accuracy: Option<String>,
    #[serde(default)]
    pub bias: Option<String>,
    #[serde(default)]
    pub sensationalism: Option<String>,
    #[serde(default)]
    pub quality: Option<String>,
}

/// One extracted claim from an article, fact-checked on its own.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KeyClaim {
    #[serde(default)]
    pub claim: Option<String>,
    #[serde(default)]
    pub verdict: Option<String>,
    #[serde(default)]
    pub sources: Vec<Source>,
}

/// `/api/verify` result for a URL (article credibility analysis).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UrlReport {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub domain: Option<String>,
    #[serde(default)]
    pub article: Option<Article>,
    #[serde(default)]
    pub verdict: Option<String>,
    #[serde(default)]
    pub credibility_score: Option<f32>,
    #[serde(default)]
    pub bias_detected: Option<String>,
    #[serde(default)]
    pub analysis: Option<UrlAnalysis>,
    #[serde(default)]
    pub red_flags: Vec<String>,
    #[serde(default)]
    pub key_claims: Vec<KeyClaim>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

/// One detection layer's contribution (heuristics / safe browsing).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Layer {
    #[serde(default)]
    pub risk: Option<f32>,
    #[serde(default)]
    pub signals: Vec<String>,
    #[serde(default)]
    pub checked: Option<bool>,
}

/// WHOIS layer; adds registration age.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WhoisLayer {
    #[serde(default)]
    pub risk: Option<f32>,
    #[serde(default)]
    pub signals: Vec<String>,
    #[serde(default)]
    pub domain_age_days: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SslInfo {
    #[serde(default)]
    pub issuer: Option<String>,
}

/// SSL layer; adds certificate info.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SslLayer {
    #[serde(default)]
    pub risk: Option<f32>,
    #[serde(default)]
    pub signals: Vec<String>,
    #[serde(default)]
    pub info: Option<SslInfo>,
}

/// All detection layers a phishing scan ran.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PhishingLayers {
    #[serde(default)]
    pub heuristics: Option<Layer>,
    #[serde(default)]
    pub whois: Option<WhoisLayer>,
    #[serde(default)]
    pub ssl: Option<SslLayer>,
    #[serde(default)]
    pub safe_browsing: Option<Layer>,
}

/// AI-written summary attached to phishing and image reports.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AiAnalysis {
    #[serde(default)]
    pub attack_type: Option<String>,
    #[serde(default)]
    pub explanation: Option<String>,
    #[serde(default)]
    pub recommendation: Option<String>,
}

/// `/api/phishing` result.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PhishingReport {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub hostname: Option<String>,
    #[serde(default)]
    pub verdict: Option<String>,
    #[serde(default)]
    pub risk_score: Option<f32>,
    #[serde(default)]
    pub signals: Vec<String>,
    #[serde(default)]
    pub layers: Option<PhishingLayers>,
    #[serde(default)]
    pub ai_analysis: Option<AiAnalysis>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dimensions {
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
}

/// EXIF metadata extracted from an uploaded image.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Exif {
    #[serde(default)]
    pub camera_make: Option<String>,
    #[serde(default)]
    pub camera_model: Option<String>,
    #[serde(default)]
    pub software: Option<String>,
    #[serde(default)]
    pub ai_software_detected: Option<Value>,
    #[serde(default)]
    pub date_taken: Option<String>,
    #[serde(default)]
    pub gps: Option<Value>,
    #[serde(default)]
    pub has_exif: Option<bool>,
}

/// `/api/image` result.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImageReport {
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub dimensions: Option<Dimensions>,
    #[serde(default)]
    pub file_size_kb: Option<f32>,
    #[serde(default)]
    pub ai_probability: Option<f32>,
    #[serde(default)]
    pub verdict: Option<String>,
    #[serde(default)]
    pub manipulation_type: Option<String>,
    #[serde(default)]
    pub signals: Vec<String>,
    #[serde(default)]
    pub exif: Option<Exif>,
    #[serde(default)]
    pub ai_analysis: Option<AiAnalysis>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

/// `/api/audio` result.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AudioReport {
    #[serde(default)]
    pub file_name: Option<String>,
    #[serde(default)]
    pub duration_seconds: Option<f32>,
    #[serde(default)]
    pub ai_probability: Option<f32>,
    #[serde(default)]
    pub verdict: Option<String>,
    #[serde(default)]
    pub analysis_type: Option<String>,
    #[serde(default)]
    pub signals: Vec<String>,
    #[serde(default)]
    pub transcript: Option<String>,
    #[serde(default)]
    pub explanation: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

/// One article in the trending feed (read-only side channel).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrendingArticle {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub thumbnail: Option<String>,
}

/// A completed analysis result, tagged by kind.
///
/// The wire payload itself is untagged (each endpoint has a fixed shape), so
/// deserialization always goes through [`AnalysisReport::from_value`] with the
/// kind known from context. Serialization flattens back to the wire shape.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AnalysisReport {
    Text(TextReport),
    Url(UrlReport),
    Phishing(PhishingReport),
    Image(ImageReport),
    Audio(AudioReport),
}

impl AnalysisReport {
    /// Parse a raw `data` payload as the given kind's shape.
    pub fn from_value(kind: AnalysisKind, value: Value) -> serde_json::Result<Self> {
        Ok(match kind {
            AnalysisKind::Text => AnalysisReport::Text(serde_json::from_value(value)?),
            AnalysisKind::Url => AnalysisReport::Url(serde_json::from_value(value)?),
            AnalysisKind::Phishing => AnalysisReport::Phishing(serde_json::from_value(value)?),
            AnalysisKind::Image => AnalysisReport::Image(serde_json::from_value(value)?),
            AnalysisKind::Audio => AnalysisReport::Audio(serde_json::from_value(value)?),
        })
    }

    pub fn kind(&self) -> AnalysisKind {
        match self {
            AnalysisReport::Text(_) => AnalysisKind::Text,
            AnalysisReport::Url(_) => AnalysisKind::Url,
            AnalysisReport::Phishing(_) => AnalysisKind::Phishing,
            AnalysisReport::Image(_) => AnalysisKind::Image,
            AnalysisReport::Audio(_) => AnalysisKind::Audio,
        }
    }

    pub fn verdict(&self) -> Option<&str> {
        match self {
            AnalysisReport::Text(r) => r.verdict.as_deref(),
            AnalysisReport::Url(r) => r.verdict.as_deref(),
            AnalysisReport::Phishing(r) => r.verdict.as_deref(),
            AnalysisReport::Image(r) => r.verdict.as_deref(),
            AnalysisReport::Audio(r) => r.verdict.as_deref(),
        }
    }

    /// The wire-shaped JSON for this report (what the backend sent, minus any
    /// fields the typed structs and their catch-all maps did not capture).
    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn text_report_tolerates_missing_fields() {
        let report =
            AnalysisReport::from_value(AnalysisKind::Text, json!({ "verdict": "REAL" })).unwrap();
        let AnalysisReport::Text(t) = &report else {
            panic!("expected text variant");
        };
        assert_eq!(t.verdict.as_deref(), Some("REAL"));
        assert_eq!(t.score, None);
        assert!(t.sources.is_empty());
    }

    #[test]
    fn unknown_fields_survive_a_round_trip() {
        let payload = json!({
            "verdict": "FAKE",
            "score": 5,
            "model_version": "v2-preview"
        });
        let report = AnalysisReport::from_value(AnalysisKind::Text, payload.clone()).unwrap();
        let back = report.to_value();
        assert_eq!(back["model_version"], json!("v2-preview"));
        assert_eq!(back["verdict"], json!("FAKE"));
    }

    #[test]
    fn phishing_layers_parse_nested_shapes() {
        let payload = json!({
            "url": "http://bad.example",
            "hostname": "bad.example",
            "verdict": "DANGEROUS",
            "risk_score": 87,
            "signals": ["punycode hostname"],
            "layers": {
                "heuristics": { "risk": 60, "signals": ["ip literal"] },
                "whois": { "risk": 80, "signals": [], "domain_age_days": 3 },
                "ssl": { "risk": 20, "signals": [], "info": { "issuer": "Let's Encrypt" } },
                "safe_browsing": { "risk": 0, "signals": [], "checked": true }
            },
            "ai_analysis": { "attack_type": "credential harvest" }
        });
        let report = AnalysisReport::from_value(AnalysisKind::Phishing, payload).unwrap();
        let AnalysisReport::Phishing(p) = &report else {
            panic!("expected phishing variant");
        };
        assert_eq!(p.risk_score, Some(87.0));
        let layers = p.layers.as_ref().unwrap();
        assert_eq!(layers.whois.as_ref().unwrap().domain_age_days, Some(3));
        assert_eq!(
            layers
                .ssl
                .as_ref()
                .unwrap()
                .info
                .as_ref()
                .unwrap()
                .issuer
                .as_deref(),
            Some("Let's Encrypt")
        );
        assert_eq!(layers.safe_browsing.as_ref().unwrap().checked, Some(true));
    }

    #[test]
    fn report_kind_matches_variant() {
        let r = AnalysisReport::from_value(AnalysisKind::Audio, json!({})).unwrap();
        assert_eq!(r.kind(), AnalysisKind::Audio);
        assert_eq!(r.verdict(), None);
    }
}
