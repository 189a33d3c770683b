use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Serde helpers for fields that older runs wrote with the wrong shape.
mod serde_lenient {
    use serde::{Deserialize, Deserializer};

    /// Accept a string, null, or any other JSON value (stored as its JSON text).
    ///
    /// Early local-model runs wrote `{"error": "..."}` objects into `predict`;
    /// those records must still load.
    pub fn deserialize_opt_text<'de, D>(d: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let opt: Option<serde_json::Value> = Option::deserialize(d)?;
        Ok(match opt {
            None | Some(serde_json::Value::Null) => None,
            Some(serde_json::Value::String(s)) => Some(s),
            Some(other) => Some(other.to_string()),
        })
    }
}

/// Result of one scorer on one record.
///
/// `score: None` means the scorer ran and failed; the key is still written so
/// "ran but failed" stays distinguishable from "never ran".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreEntry {
    #[serde(default)]
    pub score: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

impl ScoreEntry {
    pub fn value(score: f64) -> Self {
        Self {
            score: Some(score),
            explanation: None,
        }
    }

    pub fn explained(score: f64, explanation: impl Into<String>) -> Self {
        Self {
            score: Some(score),
            explanation: Some(explanation.into()),
        }
    }

    pub fn failed(reason: impl Into<String>) -> Self {
        Self {
            score: None,
            explanation: Some(reason.into()),
        }
    }

    pub fn is_failed(&self) -> bool {
        self.score.is_none()
    }
}

/// One translation task and everything accumulated about it.
///
/// Serialized with the dataset keys (`thai`, `english`, `predict`,
/// `time_second`, `metric`); the descriptive names are accepted on input.
/// Keys this type does not know about round-trip through `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    #[serde(rename = "thai", alias = "source_text")]
    source_text: String,

    #[serde(rename = "english", alias = "reference_text")]
    reference_text: String,

    #[serde(
        rename = "predict",
        alias = "predicted_text",
        default,
        deserialize_with = "serde_lenient::deserialize_opt_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub predicted_text: Option<String>,

    #[serde(
        rename = "time_second",
        alias = "elapsed_seconds",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub elapsed_seconds: Option<f64>,

    #[serde(
        rename = "metric",
        alias = "scores",
        default,
        skip_serializing_if = "BTreeMap::is_empty"
    )]
    pub scores: BTreeMap<String, ScoreEntry>,

    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Record {
    pub fn new(source_text: impl Into<String>, reference_text: impl Into<String>) -> Self {
        Self {
            source_text: source_text.into(),
            reference_text: reference_text.into(),
            predicted_text: None,
            elapsed_seconds: None,
            scores: BTreeMap::new(),
            extra: serde_json::Map::new(),
        }
    }

    pub fn source_text(&self) -> &str {
        &self.source_text
    }

    pub fn reference_text(&self) -> &str {
        &self.reference_text
    }

    /// Overwrite the prediction and its timing as one unit.
    pub fn set_prediction(&mut self, text: String, elapsed_seconds: f64) {
        self.predicted_text = Some(text);
        self.elapsed_seconds = Some(round_millis(elapsed_seconds.max(0.0)));
    }

    /// Insert or replace the entry for `scorer`. Other entries are untouched.
    pub fn upsert_score(&mut self, scorer: &str, entry: ScoreEntry) {
        self.scores.insert(scorer.to_string(), entry);
    }

    /// Score for `scorer`, with null and missing both reported as `None`.
    pub fn score(&self, scorer: &str) -> Option<f64> {
        self.scores.get(scorer).and_then(|e| e.score)
    }
}

fn round_millis(secs: f64) -> f64 {
    (secs * 1000.0).round() / 1000.0
}

/// Provider reply text plus where it came from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmResponse {
    pub text: String,
    pub provider: String,
    pub model: String,
    #[serde(default)]
    pub meta: serde_json::Value,
}
