use super::{check_status, with_retries, ChatRequest, LlmClient, ProviderError, ProviderResult};
use crate::model::LlmResponse;
use async_trait::async_trait;
use serde_json::json;
use tracing::debug;

/// Gemini `generateContent` client.
///
/// Thinking is left on with a dynamic budget (`-1`), matching how the hosted
/// model is normally queried for translation.
pub struct GeminiClient {
    base_url: String,
    pub model: String,
    api_key: String,
    max_retries: u32,
    client: reqwest::Client,
}

impl GeminiClient {
    pub fn new(base_url: &str, model: &str, api_key: String, client: reqwest::Client) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
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

    fn body(request: &ChatRequest) -> serde_json::Value {
        let mut generation = json!({ "thinkingConfig": { "thinkingBudget": -1 } });
        if let Some(t) = request.temperature {
            generation["temperature"] = json!(t);
        }
        if let Some(m) = request.max_tokens {
            generation["maxOutputTokens"] = json!(m);
        }

        let mut body = json!({
            "contents": [{ "role": "user", "parts": [{ "text": request.user }] }],
            "generationConfig": generation,
        });
        if let Some(system) = &request.system {
            body["systemInstruction"] = json!({ "parts": [{ "text": system }] });
        }
        body
    }

    async fn send_once(&self, url: &str, body: &serde_json::Value) -> ProviderResult<serde_json::Value> {
        let req = self
            .client
            .post(url)
            .header("x-goog-api-key", &self.api_key)
            .json(body);
        let resp = check_status("gemini", req.send().await?).await?;
        resp.json().await.map_err(|e| ProviderError::InvalidResponse {
            message: format!("gemini reply is not JSON: {}", e.without_url()),
        })
    }
}

/// Concatenate the text parts of the first candidate, skipping thought parts.
fn candidate_text(json: &serde_json::Value) -> Option<String> {
    let parts = json.pointer("/candidates/0/content/parts")?.as_array()?;
    let text: String = parts
        .iter()
        .filter(|p| !p.get("thought").and_then(|t| t.as_bool()).unwrap_or(false))
        .filter_map(|p| p.get("text").and_then(|t| t.as_str()))
        .collect();
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

#[async_trait]
impl LlmClient for GeminiClient {
    async fn complete(&self, request: &ChatRequest) -> ProviderResult<LlmResponse> {
        let url = format!("{}/models/{}:generateContent", self.base_url, self.model);
        let body = Self::body(request);
        debug!(provider = "gemini", model = %self.model, "generate content");

        let json = with_retries("gemini", self.max_retries, || self.send_once(&url, &body)).await?;

        let text = candidate_text(&json).ok_or_else(|| {
            let reason = json
                .pointer("/candidates/0/finishReason")
                .or_else(|| json.pointer("/promptFeedback/blockReason"))
                .and_then(|v| v.as_str())
                .unwrap_or("no candidates");
            ProviderError::InvalidResponse {
                message: format!("gemini response has no text ({})", reason),
            }
        })?;

        Ok(LlmResponse {
            text,
            provider: "gemini".to_string(),
            model: self.model.clone(),
            meta: json
                .get("usageMetadata")
                .cloned()
                .unwrap_or(serde_json::Value::Null),
        })
    }

    fn provider_name(&self) -> &'static str {
        "gemini"
    }
}
