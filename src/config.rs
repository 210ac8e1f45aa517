//! Client configuration: where the analysis backend lives and how long we
//! wait for it. Loaded from a JSON file with env-var overrides; every field
//! has a dev-friendly default.

use serde::{Deserialize, Serialize};
use std::{env, fs, path::Path};

/// Env var overriding the backend base URL.
pub const ENV_API_BASE: &str = "TRUTHLENS_API_BASE";

fn default_base_url() -> String {
    // Local Flask dev server.
    "http://127.0.0.1:5000".to_string()
}
fn default_connect_timeout() -> u64 {
    5
}
fn default_request_timeout() -> u64 {
    // Analysis calls fan out to search/vision/transcription upstream; give
    // them room before declaring the service unreachable.
    75
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            connect_timeout_secs: default_connect_timeout(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

impl ClientConfig {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let data = fs::read_to_string(path)?;
        let mut cfg: ClientConfig = serde_json::from_str(&data)?;
        cfg.apply_env();
        Ok(cfg)
    }

    /// Defaults plus env overrides; never fails.
    pub fn from_env() -> Self {
        let mut cfg = Self::default();
        cfg.apply_env();
        cfg
    }

    fn apply_env(&mut self) {
        if let Ok(base) = env::var(ENV_API_BASE) {
            if !base.trim().is_empty() {
                self.base_url = base.trim().to_string();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let cfg: ClientConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(cfg.base_url, "http://127.0.0.1:5000");
        assert_eq!(cfg.connect_timeout_secs, 5);
        assert_eq!(cfg.request_timeout_secs, 75);
    }
}
