//! Semantic judgment scorer: asks a text-generation service to grade a
//! prediction against the reference and parses its JSON verdict.

mod parse;
mod prompt;

pub use parse::{parse_verdict, JudgeParseError, JudgeVerdict};

use crate::metrics_api::Scorer;
use crate::model::{Record, ScoreEntry};
use crate::providers::{ChatRequest, LlmClient};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, warn};

pub const JUDGE_SCORER_NAME: &str = "LLM-as-a-judge";
pub const DEFAULT_JUDGE_TEMPERATURE: f32 = 0.3;

pub struct JudgeScorer {
    client: Arc<dyn LlmClient>,
    temperature: f32,
}

impl JudgeScorer {
    pub fn new(client: Arc<dyn LlmClient>) -> Self {
        Self {
            client,
            temperature: DEFAULT_JUDGE_TEMPERATURE,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }
}

#[async_trait]
impl Scorer for JudgeScorer {
    fn name(&self) -> &'static str {
        JUDGE_SCORER_NAME
    }

    async fn score(&self, record: &Record) -> ScoreEntry {
        let Some(prediction) = record.predicted_text.as_deref() else {
            return ScoreEntry::failed("record has no prediction");
        };

        let request = ChatRequest::new(prompt::build_prompt(record, prediction))
            .with_system(prompt::SYSTEM_PROMPT)
            .with_temperature(self.temperature);

        let reply = match self.client.complete(&request).await {
            Ok(r) => r,
            Err(e) => {
                warn!(provider = self.client.provider_name(), error = %e, "judge call failed");
                return ScoreEntry::failed(e.to_string());
            }
        };
        debug!(provider = %reply.provider, raw = %reply.text, "judge reply");

        match parse_verdict(&reply.text) {
            Ok(v) => ScoreEntry {
                score: Some(v.score),
                explanation: Some(v.explanation.unwrap_or_default()),
            },
            Err(e) => {
                warn!(error = %e, "unparseable judge reply");
                ScoreEntry::failed(e.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::fake::FakeClient;
    use crate::providers::ProviderError;

    fn record() -> Record {
        let mut r = Record::new("ทุเรียนระยะดอกบาน", "Durian at the flowering stage");
        r.set_prediction("Durian in flowering stage".into(), 0.42);
        r
    }

    #[tokio::test]
    async fn verdict_becomes_score_entry() {
        let client = Arc::new(FakeClient::new("judge").with_response(
            r#"Explanation: fine. {"score": 0.8, "explanation": "close match"}"#,
        ));
        let judge = JudgeScorer::new(client.clone());

        let entry = judge.score(&record()).await;
        assert_eq!(entry, ScoreEntry::explained(0.8, "close match"));

        let sent = &client.requests()[0];
        assert_eq!(sent.temperature, Some(DEFAULT_JUDGE_TEMPERATURE));
        assert!(sent.user.contains("Durian in flowering stage"));
        assert!(sent.user.contains("Time taken: 0.42 seconds"));
    }

    #[tokio::test]
    async fn reply_without_braces_is_null_with_message() {
        let client = Arc::new(FakeClient::new("judge").with_response("I think it is good."));
        let entry = JudgeScorer::new(client).score(&record()).await;

        assert_eq!(entry.score, None);
        assert!(!entry.explanation.unwrap_or_default().is_empty());
    }

    #[tokio::test]
    async fn provider_failure_is_null_with_message() {
        let client = Arc::new(FakeClient::new("judge").with_queued(vec![Err(
            ProviderError::Network {
                message: "connection refused".into(),
            },
        )]));
        let entry = JudgeScorer::new(client).score(&record()).await;

        assert!(entry.is_failed());
        assert!(entry.explanation.unwrap().contains("connection refused"));
    }

    #[tokio::test]
    async fn missing_prediction_skips_the_call() {
        let client = Arc::new(FakeClient::new("judge").with_response(r#"{"score": 1}"#));
        let entry = JudgeScorer::new(client.clone())
            .score(&Record::new("a", "b"))
            .await;

        assert!(entry.is_failed());
        assert!(client.requests().is_empty());
    }
}
