//! HTTP judge implementation against a Gemini-shaped `generateContent` API.
//!
//! The model is asked to answer with a JSON object, but in practice wraps it
//! in code fences or prose, and occasionally truncates the closing braces.
//! [`parse_judgment`] digs the object out and repairs unbalanced braces
//! before giving up.

use std::sync::LazyLock;

use brandlens_core::AppConfig;
use futures::future::BoxFuture;
use regex::Regex;
use serde::Deserialize;

use crate::error::JudgeError;
use crate::judge::{Judge, JudgeRequest, Judgment};
use crate::retry::retry_with_backoff;

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
/// Cap on serialized payload size appended to the rubric.
const MAX_PAYLOAD_CHARS: usize = 3000;

static FENCED_JSON_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)```(?:json)?\s*(\{.*?\})\s*```").expect("valid fenced-json regex")
});

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

/// Judge backed by the hosted language-model API.
pub struct GeminiJudge {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
    max_retries: u32,
    backoff_base_ms: u64,
}

impl GeminiJudge {
    /// # Errors
    ///
    /// Returns [`JudgeError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(config: &AppConfig) -> Result<Self, JudgeError> {
        Self::with_base_url(config, DEFAULT_BASE_URL)
    }

    /// Same as [`GeminiJudge::new`] against a custom base URL. Used by tests
    /// to point the judge at a mock server.
    ///
    /// # Errors
    ///
    /// Returns [`JudgeError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn with_base_url(config: &AppConfig, base_url: &str) -> Result<Self, JudgeError> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.http_timeout_secs))
            .connect_timeout(std::time::Duration::from_secs(10))
            .user_agent(&config.user_agent)
            .build()?;
        Ok(Self {
            client,
            api_key: config.llm_api_key.clone(),
            model: config.llm_model.clone(),
            base_url: base_url.trim_end_matches('/').to_string(),
            max_retries: config.max_retries.min(1),
            backoff_base_ms: config.retry_backoff_base_ms,
        })
    }

    async fn generate(&self, input: &str) -> Result<String, JudgeError> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        );
        let body = serde_json::json!({
            "contents": [{ "parts": [{ "text": input }] }]
        });

        let response = self
            .client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN
        {
            return Err(JudgeError::Auth(format!("status {status} from model API")));
        }
        if !status.is_success() {
            return Err(JudgeError::UnexpectedStatus {
                status: status.as_u16(),
                url,
            });
        }

        let body = response.text().await?;
        let parsed: GenerateResponse =
            serde_json::from_str(&body).map_err(|source| JudgeError::Deserialize {
                context: "generateContent response".to_string(),
                source,
            })?;

        parsed
            .candidates
            .into_iter()
            .filter_map(|c| c.content)
            .flat_map(|c| c.parts)
            .find_map(|p| p.text)
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .ok_or(JudgeError::EmptyResponse)
    }
}

impl Judge for GeminiJudge {
    fn judge<'a>(
        &'a self,
        request: &'a JudgeRequest,
    ) -> BoxFuture<'a, Result<Judgment, JudgeError>> {
        Box::pin(async move {
            let mut payload =
                serde_json::to_string_pretty(&request.payload).unwrap_or_else(|_| "{}".to_string());
            if payload.len() > MAX_PAYLOAD_CHARS {
                let mut end = MAX_PAYLOAD_CHARS;
                while end > 0 && !payload.is_char_boundary(end) {
                    end -= 1;
                }
                payload.truncate(end);
            }
            let input = format!("{}\n\nData to analyze:\n{payload}", request.rubric);

            let text = retry_with_backoff(self.max_retries, self.backoff_base_ms, || {
                self.generate(&input)
            })
            .await?;

            parse_judgment(&text)
        })
    }
}

/// Interpret the model's free-form text as a structured judgment.
///
/// # Errors
///
/// Returns [`JudgeError::MalformedJudgment`] when no parseable JSON object
/// with a score can be found.
pub fn parse_judgment(text: &str) -> Result<Judgment, JudgeError> {
    let candidate = extract_json_block(text)
        .ok_or_else(|| JudgeError::MalformedJudgment("no JSON object in response".to_string()))?;

    let value: serde_json::Value = match serde_json::from_str(&candidate) {
        Ok(value) => value,
        Err(_) => {
            let repaired = repair_braces(&candidate);
            serde_json::from_str(&repaired).map_err(|e| {
                JudgeError::MalformedJudgment(format!("unparseable JSON in response: {e}"))
            })?
        }
    };

    judgment_from_value(&value)
}

/// Pull the most plausible JSON object out of the model text: a fenced
/// json code block first, then the outermost brace span.
fn extract_json_block(text: &str) -> Option<String> {
    if let Some(captures) = FENCED_JSON_RE.captures(text) {
        return Some(captures[1].to_string());
    }
    let start = text.find('{')?;
    match text.rfind('}') {
        Some(end) if end > start => Some(text[start..=end].to_string()),
        // No closing brace at all; take the tail and let brace repair try.
        _ => Some(text[start..].to_string()),
    }
}

/// Append missing closing braces/brackets to a truncated JSON candidate,
/// after shedding trailing fence markers and dangling commas.
fn repair_braces(candidate: &str) -> String {
    let mut repaired = candidate
        .trim_end()
        .trim_end_matches('`')
        .trim_end()
        .trim_end_matches(',')
        .to_string();
    let open_brackets = repaired.matches('[').count();
    let close_brackets = repaired.matches(']').count();
    for _ in close_brackets..open_brackets {
        repaired.push(']');
    }
    let open_braces = repaired.matches('{').count();
    let close_braces = repaired.matches('}').count();
    for _ in close_braces..open_braces {
        repaired.push('}');
    }
    repaired
}

/// Build a [`Judgment`] from a parsed JSON object, accepting both the
/// requested `score` key and `<component>_score` variants.
fn judgment_from_value(value: &serde_json::Value) -> Result<Judgment, JudgeError> {
    let object = value
        .as_object()
        .ok_or_else(|| JudgeError::MalformedJudgment("response JSON is not an object".to_string()))?;

    let score = object
        .get("score")
        .and_then(serde_json::Value::as_f64)
        .or_else(|| {
            object
                .iter()
                .find(|(key, _)| key.ends_with("_score"))
                .and_then(|(_, v)| v.as_f64())
        })
        .ok_or_else(|| JudgeError::MalformedJudgment("no score field in response".to_string()))?;

    let confidence = object
        .get("confidence")
        .or_else(|| object.get("confidence_level"))
        .and_then(serde_json::Value::as_str)
        .unwrap_or("Medium")
        .to_string();

    let key_factors = object
        .get("key_factors")
        .and_then(serde_json::Value::as_array)
        .map(|factors| {
            factors
                .iter()
                .filter_map(|f| f.as_str().map(ToString::to_string))
                .collect()
        })
        .unwrap_or_default();

    Ok(Judgment {
        score,
        confidence,
        key_factors,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_fenced_json_block() {
        let text = "Here is my assessment:\n```json\n{\"score\": 7.5, \"confidence\": \"High\", \"key_factors\": [\"a\", \"b\"]}\n```\nDone.";
        let judgment = parse_judgment(text).unwrap();
        assert!((judgment.score - 7.5).abs() < 1e-9);
        assert_eq!(judgment.confidence, "High");
        assert_eq!(judgment.key_factors, vec!["a", "b"]);
    }

    #[test]
    fn parses_bare_json_object() {
        let judgment = parse_judgment("{\"score\": 4.2}").unwrap();
        assert!((judgment.score - 4.2).abs() < 1e-9);
        assert_eq!(judgment.confidence, "Medium");
        assert!(judgment.key_factors.is_empty());
    }

    #[test]
    fn accepts_component_score_key_variant() {
        let judgment =
            parse_judgment("{\"review_sentiment_score\": 6.1, \"confidence_level\": \"Low\"}")
                .unwrap();
        assert!((judgment.score - 6.1).abs() < 1e-9);
        assert_eq!(judgment.confidence, "Low");
    }

    #[test]
    fn repairs_truncated_trailing_braces() {
        let text = "```json\n{\"score\": 8.0, \"key_factors\": [\"solid\"\n```";
        // Fenced regex requires a closing brace, so this goes through the
        // raw-brace path and brace repair.
        let judgment = parse_judgment(text).unwrap();
        assert!((judgment.score - 8.0).abs() < 1e-9);
    }

    #[test]
    fn rejects_text_without_json() {
        let result = parse_judgment("I cannot provide a score for this.");
        assert!(matches!(result, Err(JudgeError::MalformedJudgment(_))));
    }

    #[test]
    fn rejects_json_without_score() {
        let result = parse_judgment("{\"confidence\": \"High\"}");
        assert!(matches!(result, Err(JudgeError::MalformedJudgment(_))));
    }

    #[test]
    fn repair_braces_closes_brackets_then_braces() {
        assert_eq!(
            repair_braces("{\"a\": [1, 2"),
            "{\"a\": [1, 2]}"
        );
    }
}
