use super::{check_status, with_retries, ChatRequest, LlmClient, ProviderError, ProviderResult};
use crate::model::LlmResponse;
use async_trait::async_trait;
use serde_json::json;
use tracing::debug;

/// Client for any `/chat/completions` endpoint: the hosted API or a local
/// server (llama.cpp, LM Studio) that speaks the same protocol.
pub struct ChatCompletionsClient {
    provider: &'static str,
    endpoint: String,
    pub model: String,
    api_key: Option<String>,
    max_retries: u32,
    client: reqwest::Client,
}

impl ChatCompletionsClient {
    pub fn new(
        provider: &'static str,
        base_url: &str,
        model: &str,
        api_key: Option<String>,
        client: reqwest::Client,
    ) -> Self {
        Self {
            provider,
            endpoint: format!("{}/chat/completions", base_url.trim_end_matches('/')),
            model: model.to_string(),
            api_key,
            max_retries: 0,
            client,
        }
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    fn body(&self, request: &ChatRequest) -> serde_json::Value {
        let mut messages = Vec::new();
        if let Some(system) = &request.system {
            messages.push(json!({"role": "system", "content": system}));
        }
        messages.push(json!({"role": "user", "content": request.user}));

        let mut body = json!({
            "model": self.model,
            "messages": messages,
            "stream": false,
        });
        if let Some(t) = request.temperature {
            body["temperature"] = json!(t);
        }
        if let Some(m) = request.max_tokens {
            body["max_tokens"] = json!(m);
        }
        body
    }

    async fn send_once(&self, body: &serde_json::Value) -> ProviderResult<serde_json::Value> {
        let mut req = self.client.post(&self.endpoint).json(body);
        if let Some(key) = &self.api_key {
            req = req.bearer_auth(key);
        }
        let resp = check_status(self.provider, req.send().await?).await?;
        resp.json().await.map_err(|e| ProviderError::InvalidResponse {
            message: format!("{} reply is not JSON: {}", self.provider, e.without_url()),
        })
    }
}

#[async_trait]
impl LlmClient for ChatCompletionsClient {
    async fn complete(&self, request: &ChatRequest) -> ProviderResult<LlmResponse> {
        let body = self.body(request);
        debug!(provider = self.provider, model = %self.model, endpoint = %self.endpoint, "chat completion");

        let json = with_retries(self.provider, self.max_retries, || self.send_once(&body)).await?;

        // Parse choices[0].message.content
        let text = json
            .pointer("/choices/0/message/content")
            .and_then(|v| v.as_str())
            .ok_or_else(|| ProviderError::InvalidResponse {
                message: format!("{} response missing choices[0].message.content", self.provider),
            })?
            .to_string();

        Ok(LlmResponse {
            text,
            provider: self.provider.to_string(),
            model: self.model.clone(),
            meta: json.get("usage").cloned().unwrap_or(serde_json::Value::Null),
        })
    }

    fn provider_name(&self) -> &'static str {
        self.provider
    }
}
