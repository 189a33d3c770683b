use super::{ChatRequest, LlmClient, ProviderError, ProviderResult};
use crate::model::LlmResponse;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

/// Deterministic client for tests and dry runs.
///
/// Replies are served from a queue; once it is empty the fixed response (if
/// any) is returned, otherwise the call fails like an unreachable service.
#[derive(Debug)]
pub struct FakeClient {
    model: String,
    queued: Mutex<VecDeque<ProviderResult<String>>>,
    fixed_response: Option<String>,
    seen: Mutex<Vec<ChatRequest>>,
}

impl FakeClient {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            queued: Mutex::new(VecDeque::new()),
            fixed_response: None,
            seen: Mutex::new(Vec::new()),
        }
    }

    pub fn with_response(mut self, response: impl Into<String>) -> Self {
        self.fixed_response = Some(response.into());
        self
    }

    pub fn with_queued(self, replies: Vec<ProviderResult<String>>) -> Self {
        self.queued.lock().unwrap_or_else(|e| e.into_inner()).extend(replies);
        self
    }

    /// Requests received so far, in call order.
    pub fn requests(&self) -> Vec<ChatRequest> {
        self.seen.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

#[async_trait]
impl LlmClient for FakeClient {
    async fn complete(&self, request: &ChatRequest) -> ProviderResult<LlmResponse> {
        self.seen.lock().unwrap_or_else(|e| e.into_inner()).push(request.clone());

        let next = self.queued.lock().unwrap_or_else(|e| e.into_inner()).pop_front();
        let text = match next {
            Some(reply) => reply?,
            None => self
                .fixed_response
                .clone()
                .ok_or_else(|| ProviderError::Network {
                    message: "fake client has no response configured".to_string(),
                })?,
        };

        Ok(LlmResponse {
            text,
            provider: "fake".to_string(),
            model: self.model.clone(),
            meta: serde_json::Value::Null,
        })
    }

    fn provider_name(&self) -> &'static str {
        "fake"
    }
}
