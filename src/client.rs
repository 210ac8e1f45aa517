//! HTTP adapter for the TruthLens analysis backend.
//!
//! The sole boundary across which the remote detection service is invoked.
//! Every endpoint speaks the same `{success, data|error}` envelope; every
//! failure mode (transport, `success:false`, non-2xx, malformed body)
//! collapses into [`ClientError`] with a message fit for direct display.

use std::time::Duration;

use async_trait::async_trait;
use metrics::counter;
use reqwest::multipart::{Form, Part};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use thiserror::Error;

use crate::config::ClientConfig;
use crate::report::{AudioReport, ImageReport, PhishingReport, TrendingArticle};

// Per-operation fallback messages, used when the server did not provide one.
const VERIFY_FAILED: &str = "Verification failed.";
const PHISHING_FAILED: &str = "Phishing check failed.";
const IMAGE_FAILED: &str = "Image analysis failed.";
const AUDIO_FAILED: &str = "Audio analysis failed.";
const TRENDING_FAILED: &str = "Failed to fetch trending news.";
const HEALTH_FAILED: &str = "Health check failed.";

/// Single error type for every way an analysis call can fail.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Connection refused, timeout, TLS failure, ...
    #[error("could not reach the analysis service: {0}")]
    Transport(#[from] reqwest::Error),
    /// The service answered with `success:false` (or a bare error status).
    #[error("{0}")]
    Api(String),
    /// The body was not the JSON shape the contract promises.
    #[error("{0}")]
    Malformed(String),
}

impl ClientError {
    /// Short line suitable for the user; transport details stay in logs.
    pub fn user_message(&self) -> String {
        match self {
            ClientError::Transport(_) => {
                "Could not reach the analysis service. Is the backend running?".to_string()
            }
            ClientError::Api(m) | ClientError::Malformed(m) => m.clone(),
        }
    }
}

/// Request shape for `/api/image`: a local upload or a remote image URL.
#[derive(Debug, Clone)]
pub enum ImageInput {
    Upload { file_name: String, bytes: Vec<u8> },
    Remote { url: String },
}

impl ImageInput {
    /// What history records as the input label.
    pub fn label(&self) -> &str {
        match self {
            ImageInput::Upload { file_name, .. } => file_name,
            ImageInput::Remote { url } => url,
        }
    }
}

/// Request shape for `/api/audio`.
#[derive(Debug, Clone)]
pub struct AudioUpload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// `/api/verify` answer: the raw result payload plus the server's input
/// classification. The caller resolves the kind (falling back to a URL
/// heuristic when the discriminator is absent) before parsing the payload.
#[derive(Debug, Clone)]
pub struct VerifyResponse {
    pub input_type: Option<String>,
    pub data: Value,
}

/// What the session needs from a backend; `ApiClient` is the real one, tests
/// substitute their own.
#[async_trait]
pub trait AnalysisProvider: Send + Sync {
    async fn verify(&self, claim: &str) -> Result<VerifyResponse, ClientError>;
    async fn check_phishing(&self, url: &str) -> Result<PhishingReport, ClientError>;
    async fn check_image(&self, input: ImageInput) -> Result<ImageReport, ClientError>;
    async fn check_audio(&self, upload: AudioUpload) -> Result<AudioReport, ClientError>;
}

/// All endpoints share this envelope; unused fields stay `None`/empty per
/// endpoint.
#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    data: Option<Value>,
    #[serde(default)]
    input_type: Option<String>,
    #[serde(default)]
    articles: Option<Vec<TrendingArticle>>,
}

/// Stateless reqwest-backed client for the analysis service.
pub struct ApiClient {
    http: reqwest::Client,
    base: String,
}

impl ApiClient {
    pub fn new(config: &ClientConfig) -> Self {
        crate::metrics::describe();
        let http = reqwest::Client::builder()
            .user_agent("truthlens-client/0.1")
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .expect("reqwest client");
        Self {
            http,
            base: config.base_url.trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    /// Read-only trending feed; not part of the analysis flow.
    pub async fn trending(&self) -> Result<Vec<TrendingArticle>, ClientError> {
        let resp = self.http.get(self.url("/api/trending")).send().await?;
        let env = read_envelope(resp, TRENDING_FAILED).await?;
        Ok(env.articles.unwrap_or_default())
    }

    /// Liveness probe; the payload shape is not contractually fixed.
    pub async fn health(&self) -> Result<Value, ClientError> {
        let resp = self.http.get(self.url("/health")).send().await?;
        let status = resp.status();
        let body = resp.bytes().await?;
        if !status.is_success() {
            return Err(ClientError::Api(format!(
                "analysis service returned HTTP {}",
                status.as_u16()
            )));
        }
        serde_json::from_slice(&body).map_err(|_| ClientError::Malformed(HEALTH_FAILED.into()))
    }

    async fn verify_impl(&self, claim: &str) -> Result<VerifyResponse, ClientError> {
        let resp = self
            .http
            .post(self.url("/api/verify"))
            .json(&json!({ "claim": claim }))
            .send()
            .await?;
        let env = read_envelope(resp, VERIFY_FAILED).await?;
        let data = env
            .data
            .ok_or_else(|| ClientError::Malformed(VERIFY_FAILED.into()))?;
        Ok(VerifyResponse {
            input_type: env.input_type,
            data,
        })
    }

    async fn phishing_impl(&self, url: &str) -> Result<PhishingReport, ClientError> {
        let resp = self
            .http
            .post(self.url("/api/phishing"))
            .json(&json!({ "url": url }))
            .send()
            .await?;
        let env = read_envelope(resp, PHISHING_FAILED).await?;
        parse_data(env, PHISHING_FAILED)
    }

    async fn image_impl(&self, input: ImageInput) -> Result<ImageReport, ClientError> {
        let req = match input {
            ImageInput::Upload { file_name, bytes } => {
                let form = Form::new().part("image", Part::bytes(bytes).file_name(file_name));
                self.http.post(self.url("/api/image")).multipart(form)
            }
            ImageInput::Remote { url } => self
                .http
                .post(self.url("/api/image"))
                .json(&json!({ "image_url": url })),
        };
        let env = read_envelope(req.send().await?, IMAGE_FAILED).await?;
        parse_data(env, IMAGE_FAILED)
    }

    async fn audio_impl(&self, upload: AudioUpload) -> Result<AudioReport, ClientError> {
        let form = Form::new().part(
            "audio",
            Part::bytes(upload.bytes).file_name(upload.file_name),
        );
        let resp = self
            .http
            .post(self.url("/api/audio"))
            .multipart(form)
            .send()
            .await?;
        let env = read_envelope(resp, AUDIO_FAILED).await?;
        parse_data(env, AUDIO_FAILED)
    }
}

#[async_trait]
impl AnalysisProvider for ApiClient {
    async fn verify(&self, claim: &str) -> Result<VerifyResponse, ClientError> {
        track(self.verify_impl(claim).await)
    }

    async fn check_phishing(&self, url: &str) -> Result<PhishingReport, ClientError> {
        track(self.phishing_impl(url).await)
    }

    async fn check_image(&self, input: ImageInput) -> Result<ImageReport, ClientError> {
        track(self.image_impl(input).await)
    }

    async fn check_audio(&self, upload: AudioUpload) -> Result<AudioReport, ClientError> {
        track(self.audio_impl(upload).await)
    }
}

fn track<T>(res: Result<T, ClientError>) -> Result<T, ClientError> {
    counter!("analysis_requests_total").increment(1);
    if res.is_err() {
        counter!("analysis_request_failures_total").increment(1);
    }
    res
}

/// Decode the shared envelope, preferring a server-supplied error message and
/// falling back to the operation's generic one.
async fn read_envelope(resp: reqwest::Response, fallback: &str) -> Result<Envelope, ClientError> {
    let status = resp.status();
    let body = resp.bytes().await?;
    let env: Envelope = match serde_json::from_slice(&body) {
        Ok(env) => env,
        // An error status with an unreadable body still gets a usable message.
        Err(_) if !status.is_success() => {
            return Err(ClientError::Api(format!(
                "analysis service returned HTTP {}",
                status.as_u16()
            )));
        }
        Err(_) => return Err(ClientError::Malformed(fallback.to_string())),
    };
    if !env.success {
        return Err(ClientError::Api(
            env.error.unwrap_or_else(|| fallback.to_string()),
        ));
    }
    Ok(env)
}

fn parse_data<T: DeserializeOwned>(env: Envelope, fallback: &str) -> Result<T, ClientError> {
    let data = env
        .data
        .ok_or_else(|| ClientError::Malformed(fallback.to_string()))?;
    serde_json::from_value(data).map_err(|_| ClientError::Malformed(fallback.to_string()))
}
