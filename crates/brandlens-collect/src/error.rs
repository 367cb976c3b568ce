use thiserror::Error;

/// Errors raised inside a single collector.
///
/// These never escape a collector run: the collector downgrades them into a
/// `failed` (or `partial`) `SourceResult` so one unavailable source cannot
/// abort the whole analysis.
#[derive(Debug, Error)]
pub enum CollectError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("rate limited by {url} (retry after {retry_after_secs}s)")]
    RateLimited { url: String, retry_after_secs: u64 },

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    /// Credential rejected by the remote service (401/403).
    #[error("authentication failed: {0}")]
    Auth(String),

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },
}

impl CollectError {
    /// Classify a non-success HTTP response into a typed error.
    ///
    /// 429 becomes [`CollectError::RateLimited`] (honoring `Retry-After`
    /// when parseable), 401/403 become [`CollectError::Auth`], everything
    /// else [`CollectError::UnexpectedStatus`].
    pub(crate) fn from_status(status: reqwest::StatusCode, url: &str, retry_after: Option<u64>) -> Self {
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            CollectError::RateLimited {
                url: url.to_string(),
                retry_after_secs: retry_after.unwrap_or(1),
            }
        } else if status == reqwest::StatusCode::UNAUTHORIZED
            || status == reqwest::StatusCode::FORBIDDEN
        {
            CollectError::Auth(format!("status {status} from {url}"))
        } else {
            CollectError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_string(),
            }
        }
    }
}

/// Pull a `Retry-After` seconds value out of a response, if present.
pub(crate) fn retry_after_secs(response: &reqwest::Response) -> Option<u64> {
    response
        .headers()
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u64>().ok())
}
