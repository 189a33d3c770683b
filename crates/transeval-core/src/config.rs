//! Provider configuration, built once at process start and handed to every
//! client constructor.
//!
//! | Environment Variable | Description |
//! |---------------------|-------------|
//! | `OPENAI_API_KEY` | Key for the hosted chat-completions provider |
//! | `GOOGLE_API_KEY` | Key for the Gemini provider |
//! | `TRANSEVAL_OPENAI_BASE_URL` | Chat-completions base URL (default: `https://api.openai.com/v1`) |
//! | `TRANSEVAL_GEMINI_BASE_URL` | Gemini base URL (default: `https://generativelanguage.googleapis.com/v1beta`) |
//! | `TRANSEVAL_LOCAL_BASE_URL` | Local server base URL (default: `http://localhost:1234/v1`) |
//! | `TRANSEVAL_TIMEOUT_SECS` | Per-request timeout in seconds (default: none) |
//! | `TRANSEVAL_MAX_RETRIES` | Retries for transient failures (default: 0) |

use serde::{Deserialize, Serialize};
use std::time::Duration;

fn default_openai_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_gemini_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_local_base_url() -> String {
    "http://localhost:1234/v1".to_string()
}

#[derive(Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default)]
    pub openai_api_key: Option<String>,

    #[serde(default)]
    pub google_api_key: Option<String>,

    #[serde(default = "default_openai_base_url")]
    pub openai_base_url: String,

    #[serde(default = "default_gemini_base_url")]
    pub gemini_base_url: String,

    #[serde(default = "default_local_base_url")]
    pub local_base_url: String,

    /// No timeout unless set; calls may block as long as the service does.
    #[serde(default)]
    pub timeout_secs: Option<u64>,

    /// Extra attempts after the first for retryable failures.
    #[serde(default)]
    pub max_retries: u32,
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let redact = |k: &Option<String>| k.as_ref().map(|_| "<redacted>");
        f.debug_struct("ProviderConfig")
            .field("openai_api_key", &redact(&self.openai_api_key))
            .field("google_api_key", &redact(&self.google_api_key))
            .field("openai_base_url", &self.openai_base_url)
            .field("gemini_base_url", &self.gemini_base_url)
            .field("local_base_url", &self.local_base_url)
            .field("timeout_secs", &self.timeout_secs)
            .field("max_retries", &self.max_retries)
            .finish()
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            openai_api_key: None,
            google_api_key: None,
            openai_base_url: default_openai_base_url(),
            gemini_base_url: default_gemini_base_url(),
            local_base_url: default_local_base_url(),
            timeout_secs: None,
            max_retries: 0,
        }
    }
}

impl ProviderConfig {
    /// Create config from environment variables (see module docs).
    pub fn from_env() -> Self {
        let non_empty = |var: &str| std::env::var(var).ok().filter(|v| !v.trim().is_empty());
        let defaults = Self::default();
        Self {
            openai_api_key: non_empty("OPENAI_API_KEY"),
            google_api_key: non_empty("GOOGLE_API_KEY"),
            openai_base_url: non_empty("TRANSEVAL_OPENAI_BASE_URL")
                .unwrap_or(defaults.openai_base_url),
            gemini_base_url: non_empty("TRANSEVAL_GEMINI_BASE_URL")
                .unwrap_or(defaults.gemini_base_url),
            local_base_url: non_empty("TRANSEVAL_LOCAL_BASE_URL")
                .unwrap_or(defaults.local_base_url),
            timeout_secs: non_empty("TRANSEVAL_TIMEOUT_SECS").and_then(|v| v.parse().ok()),
            max_retries: non_empty("TRANSEVAL_MAX_RETRIES")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.max_retries),
        }
    }

    pub fn with_openai_key(mut self, key: impl Into<String>) -> Self {
        self.openai_api_key = Some(key.into());
        self
    }

    pub fn with_google_key(mut self, key: impl Into<String>) -> Self {
        self.google_api_key = Some(key.into());
        self
    }

    pub fn with_openai_base_url(mut self, url: impl Into<String>) -> Self {
        self.openai_base_url = url.into();
        self
    }

    pub fn with_gemini_base_url(mut self, url: impl Into<String>) -> Self {
        self.gemini_base_url = url.into();
        self
    }

    pub fn with_local_base_url(mut self, url: impl Into<String>) -> Self {
        self.local_base_url = url.into();
        self
    }

    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }

    pub fn with_max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}
