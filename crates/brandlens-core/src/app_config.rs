use std::path::PathBuf;

/// Application configuration, constructed once at process start and passed
/// by reference into collectors and the scorer.
///
/// Credentials for optional services are `None` when unset; the matching
/// collector reports `skipped` instead of failing the run.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Product-search API key. Required.
    pub search_api_key: String,
    /// Language-model API key. Required.
    pub llm_api_key: String,
    pub llm_model: String,
    /// Discussion-forum OAuth client credentials. Optional as a pair.
    pub discussion_client_id: Option<String>,
    pub discussion_client_secret: Option<String>,
    pub discussion_user_agent: String,
    /// Path to the YAML file with microblog accounts used for rotation.
    pub microblog_accounts_path: Option<PathBuf>,
    /// Crawl-service API key. Absent means plain HTTP fetch fallback.
    pub crawl_api_key: Option<String>,
    pub http_timeout_secs: u64,
    pub collector_timeout_secs: u64,
    pub max_retries: u32,
    pub retry_backoff_base_ms: u64,
    pub user_agent: String,
    pub out_dir: PathBuf,
}

impl AppConfig {
    /// Discussion credentials as a pair, present only when both halves are
    /// configured.
    #[must_use]
    pub fn discussion_credentials(&self) -> Option<(&str, &str)> {
        match (&self.discussion_client_id, &self.discussion_client_secret) {
            (Some(id), Some(secret)) => Some((id.as_str(), secret.as_str())),
            _ => None,
        }
    }
}
