/// Why a judge reply could not be turned into a score.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum JudgeParseError {
    #[error("no JSON object found in judge output")]
    NoJsonObject,

    #[error("invalid JSON in judge output: {0}")]
    InvalidJson(String),

    #[error("judge JSON missing numeric 'score' field")]
    MissingScore,

    #[error("judge score {0} outside [0, 1]")]
    ScoreOutOfRange(f64),
}

#[derive(Debug, Clone, PartialEq)]
pub struct JudgeVerdict {
    pub score: f64,
    pub explanation: Option<String>,
}

/// Slice from the first `{` to the last `}` inclusive.
pub(crate) fn extract_json_object(text: &str) -> Result<&str, JudgeParseError> {
    let start = text.find('{').ok_or(JudgeParseError::NoJsonObject)?;
    let end = text.rfind('}').ok_or(JudgeParseError::NoJsonObject)?;
    if end < start {
        return Err(JudgeParseError::NoJsonObject);
    }
    Ok(&text[start..=end])
}

pub fn parse_verdict(text: &str) -> Result<JudgeVerdict, JudgeParseError> {
    let segment = extract_json_object(text)?;
    let val: serde_json::Value =
        serde_json::from_str(segment).map_err(|e| JudgeParseError::InvalidJson(e.to_string()))?;

    let score = val
        .get("score")
        .and_then(|v| v.as_f64())
        .ok_or(JudgeParseError::MissingScore)?;
    if !(0.0..=1.0).contains(&score) {
        return Err(JudgeParseError::ScoreOutOfRange(score));
    }

    let explanation = val
        .get("explanation")
        .and_then(|v| v.as_str())
        .map(str::to_string);

    Ok(JudgeVerdict { score, explanation })
}
