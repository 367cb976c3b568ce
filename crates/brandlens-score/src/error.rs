use thiserror::Error;

/// Errors raised by the language-model judge.
///
/// The scorer recovers from every variant by substituting midpoint scores
/// for the affected components; none of these abort a run.
#[derive(Debug, Error)]
pub enum JudgeError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    /// Credential rejected by the model API (401/403).
    #[error("authentication failed: {0}")]
    Auth(String),

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// The model returned no candidates or an empty text part.
    #[error("model returned an empty response")]
    EmptyResponse,

    /// The model's text could not be interpreted as a judgment.
    #[error("malformed judgment: {0}")]
    MalformedJudgment(String),
}
