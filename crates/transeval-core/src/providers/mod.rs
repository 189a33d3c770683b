pub mod error;
pub mod fake;
pub mod gemini;
pub mod openai;

pub use error::{ProviderError, ProviderResult};

use crate::config::ProviderConfig;
use crate::errors::ConfigError;
use crate::model::LlmResponse;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

/// User agent for provider requests.
const USER_AGENT_VALUE: &str = concat!("transeval/", env!("CARGO_PKG_VERSION"));

/// One system + user exchange with a text-generation service.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatRequest {
    pub system: Option<String>,
    pub user: String,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
}

impl ChatRequest {
    pub fn new(user: impl Into<String>) -> Self {
        Self {
            system: None,
            user: user.into(),
            temperature: None,
            max_tokens: None,
        }
    }

    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }
}

#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn complete(&self, request: &ChatRequest) -> ProviderResult<LlmResponse>;
    fn provider_name(&self) -> &'static str;
}

/// Which service a client talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    /// Hosted chat-completions API.
    OpenAi,
    /// Locally served chat-completions endpoint (llama.cpp, LM Studio, ...).
    Local,
    Gemini,
}

impl ProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OpenAi => "openai",
            Self::Local => "local",
            Self::Gemini => "gemini",
        }
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Build a live client for `kind`. Missing credentials fail here, before any
/// record is touched.
pub fn build_client(
    kind: ProviderKind,
    model: &str,
    config: &ProviderConfig,
) -> Result<Arc<dyn LlmClient>, ConfigError> {
    let http = http_client(config)?;
    let client: Arc<dyn LlmClient> = match kind {
        ProviderKind::OpenAi => {
            let key = config
                .openai_api_key
                .clone()
                .ok_or(ConfigError::MissingCredential {
                    provider: "openai",
                    var: "OPENAI_API_KEY",
                })?;
            Arc::new(
                openai::ChatCompletionsClient::new(
                    "openai",
                    &config.openai_base_url,
                    model,
                    Some(key),
                    http,
                )
                .with_max_retries(config.max_retries),
            )
        }
        ProviderKind::Local => Arc::new(
            openai::ChatCompletionsClient::new(
                "local",
                &config.local_base_url,
                model,
                None,
                http,
            )
            .with_max_retries(config.max_retries),
        ),
        ProviderKind::Gemini => {
            let key = config
                .google_api_key
                .clone()
                .ok_or(ConfigError::MissingCredential {
                    provider: "gemini",
                    var: "GOOGLE_API_KEY",
                })?;
            Arc::new(
                gemini::GeminiClient::new(&config.gemini_base_url, model, key, http)
                    .with_max_retries(config.max_retries),
            )
        }
    };
    Ok(client)
}

pub(crate) fn http_client(config: &ProviderConfig) -> Result<reqwest::Client, ConfigError> {
    let mut builder = reqwest::Client::builder().user_agent(USER_AGENT_VALUE);
    if let Some(timeout) = config.timeout() {
        builder = builder.timeout(timeout);
    }
    builder
        .build()
        .map_err(|e| ConfigError::HttpClient(e.to_string()))
}

/// Map a non-success response to a `ProviderError`.
pub(crate) async fn check_status(
    provider: &'static str,
    response: reqwest::Response,
) -> ProviderResult<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
        let retry_after = response
            .headers()
            .get(reqwest::header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<u64>().ok())
            .map(Duration::from_secs);
        return Err(ProviderError::RateLimited { retry_after });
    }
    let body = response.text().await.unwrap_or_default();
    Err(ProviderError::Status {
        provider,
        status: status.as_u16(),
        body,
    })
}

const MAX_BACKOFF: Duration = Duration::from_secs(30);
/// `1 << 5` already exceeds `MAX_BACKOFF`.
const MAX_BACKOFF_SHIFT: u32 = 5;

/// Run `attempt` once, then up to `max_retries` more times while the error is
/// retryable. Backoff doubles per retry and is capped at 30 seconds.
pub(crate) async fn with_retries<T, F, Fut>(
    provider: &'static str,
    max_retries: u32,
    mut attempt: F,
) -> ProviderResult<T>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = ProviderResult<T>>,
{
    let mut retries = 0;
    loop {
        match attempt().await {
            Ok(v) => return Ok(v),
            Err(e) if e.is_retryable() && retries < max_retries => {
                retries += 1;
                let exponential = Duration::from_secs(1u64 << retries.min(MAX_BACKOFF_SHIFT));
                let backoff = match &e {
                    ProviderError::RateLimited { retry_after } => retry_after.unwrap_or(exponential),
                    _ => exponential,
                };
                let backoff = backoff.min(MAX_BACKOFF);

                warn!(
                    provider,
                    error = %e,
                    retry = retries,
                    max_retries,
                    backoff_secs = backoff.as_secs(),
                    "retrying request"
                );

                tokio::time::sleep(backoff).await;
            }
            Err(e) => return Err(e),
        }
    }
}
