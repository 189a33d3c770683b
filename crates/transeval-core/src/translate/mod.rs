//! Backend adapter: Thai source text in, English text out.
//!
//! A translator never fails. Provider errors come back as a string starting
//! with [`ERROR_MARKER`] so the record still gets a prediction and the pass
//! continues.

pub mod prompt;

pub use prompt::{Glossary, TranslationPrompt};

use crate::providers::{ChatRequest, LlmClient};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::warn;

/// Prefix of every prediction produced by a failed backend call.
pub const ERROR_MARKER: &str = "[ERROR]";

/// Whether `prediction` is a recorded backend failure.
pub fn is_error_prediction(prediction: &str) -> bool {
    prediction.starts_with(ERROR_MARKER)
}

#[async_trait]
pub trait Translator: Send + Sync {
    fn name(&self) -> &str;
    async fn translate(&self, source_text: &str) -> String;
}

/// Translator backed by a text-generation service.
pub struct LlmTranslator {
    name: String,
    client: Arc<dyn LlmClient>,
    prompt: TranslationPrompt,
    temperature: Option<f32>,
    max_tokens: Option<u32>,
}

impl LlmTranslator {
    pub fn new(name: impl Into<String>, client: Arc<dyn LlmClient>, prompt: TranslationPrompt) -> Self {
        Self {
            name: name.into(),
            client,
            prompt,
            temperature: None,
            max_tokens: None,
        }
    }

    pub fn with_temperature(mut self, temperature: Option<f32>) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: Option<u32>) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    fn request(&self, source_text: &str) -> ChatRequest {
        let mut req = ChatRequest::new(self.prompt.user(source_text)).with_system(self.prompt.system());
        req.temperature = self.temperature;
        req.max_tokens = self.max_tokens;
        req
    }
}

#[async_trait]
impl Translator for LlmTranslator {
    fn name(&self) -> &str {
        &self.name
    }

    async fn translate(&self, source_text: &str) -> String {
        match self.client.complete(&self.request(source_text)).await {
            Ok(resp) => resp.text.trim().to_string(),
            Err(e) => {
                warn!(backend = %self.name, provider = self.client.provider_name(), error = %e, "translation failed");
                format!("{} {}", ERROR_MARKER, e)
            }
        }
    }
}

/// Offline backend that echoes the source text.
#[derive(Debug, Clone, Default)]
pub struct EchoTranslator;

#[async_trait]
impl Translator for EchoTranslator {
    fn name(&self) -> &str {
        "echo"
    }

    async fn translate(&self, source_text: &str) -> String {
        format!("ECHO:{}", source_text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::fake::FakeClient;
    use crate::providers::ProviderError;

    #[tokio::test]
    async fn echo_prefixes_source() {
        assert_eq!(EchoTranslator.translate("แมว").await, "ECHO:แมว");
    }

    #[tokio::test]
    async fn llm_translator_trims_reply_and_sends_prompt() {
        let client = Arc::new(FakeClient::new("m").with_response("  Durian is flowering.\n"));
        let t = LlmTranslator::new("m", client.clone(), TranslationPrompt::default())
            .with_temperature(Some(0.0))
            .with_max_tokens(Some(1000));

        assert_eq!(t.translate("ทุเรียนออกดอก").await, "Durian is flowering.");

        let sent = client.requests();
        assert_eq!(sent.len(), 1);
        assert!(sent[0].user.contains("ทุเรียนออกดอก"));
        assert_eq!(sent[0].temperature, Some(0.0));
        assert_eq!(sent[0].max_tokens, Some(1000));
        assert!(sent[0].system.is_some());
    }

    #[tokio::test]
    async fn provider_error_becomes_marker_string() {
        let client = Arc::new(FakeClient::new("m").with_queued(vec![Err(ProviderError::Status {
            provider: "openai",
            status: 500,
            body: "boom".into(),
        })]));
        let t = LlmTranslator::new("m", client, TranslationPrompt::default());

        let out = t.translate("x").await;
        assert!(is_error_prediction(&out), "{out}");
        assert!(out.contains("boom"));
    }

    #[tokio::test]
    async fn unreachable_gemini_marker_omits_api_key() {
        let key = "g-secret-123";
        let client = Arc::new(crate::providers::gemini::GeminiClient::new(
            "http://127.0.0.1:9/v1beta",
            "gemini-2.5-pro",
            key.to_string(),
            reqwest::Client::new(),
        ));
        let t = LlmTranslator::new("gemini-2.5-pro", client, TranslationPrompt::default());

        let out = t.translate("ทุเรียน").await;
        assert!(is_error_prediction(&out), "{out}");
        assert!(!out.contains(key), "{out}");
    }
}
