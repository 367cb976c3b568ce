//! Microblog mention collector.
//!
//! Looks up the brand's profile (follower count) and searches recent posts
//! mentioning the handle. Requests authenticate with bearer tokens drawn
//! from the rotating account pool. The source is optional twice over: no
//! handle in the query, or no accounts configured, both mean `skipped`.

use brandlens_core::{AccountPool, AppConfig, BrandQuery, Finding, SignalSet, SourceId, SourceResult};
use futures::future::BoxFuture;
use serde::Deserialize;

use crate::collector::SourceCollector;
use crate::error::{retry_after_secs, CollectError};
use crate::retry::retry_with_backoff;

const DEFAULT_BASE_URL: &str = "https://api.x.com";
const MAX_RESULTS: usize = 50;
const SNIPPET_MAX_CHARS: usize = 400;

#[derive(Debug, Deserialize)]
struct UserLookupResponse {
    data: Option<UserData>,
}

#[derive(Debug, Deserialize)]
struct UserData {
    public_metrics: Option<PublicMetrics>,
}

#[derive(Debug, Deserialize)]
struct PublicMetrics {
    followers_count: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    data: Vec<Tweet>,
}

#[derive(Debug, Deserialize)]
struct Tweet {
    id: Option<String>,
    text: Option<String>,
}

/// Microblog API client with account rotation.
pub struct MicroblogClient {
    client: reqwest::Client,
    pool: AccountPool,
    base_url: String,
    max_retries: u32,
    backoff_base_ms: u64,
}

impl MicroblogClient {
    /// # Errors
    ///
    /// Returns [`CollectError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(config: &AppConfig, pool: AccountPool) -> Result<Self, CollectError> {
        Self::with_base_url(config, pool, DEFAULT_BASE_URL)
    }

    /// Same as [`MicroblogClient::new`] against a custom base URL. Used by
    /// tests to point the client at a mock server.
    ///
    /// # Errors
    ///
    /// Returns [`CollectError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn with_base_url(
        config: &AppConfig,
        pool: AccountPool,
        base_url: &str,
    ) -> Result<Self, CollectError> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.http_timeout_secs))
            .connect_timeout(std::time::Duration::from_secs(10))
            .user_agent(&config.user_agent)
            .build()?;
        Ok(Self {
            client,
            pool,
            base_url: base_url.trim_end_matches('/').to_string(),
            max_retries: config.max_retries,
            backoff_base_ms: config.retry_backoff_base_ms,
        })
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        url: &str,
        params: &[(&str, &str)],
        context: &str,
    ) -> Result<T, CollectError> {
        // Each request takes the next account in rotation.
        let account = self.pool.next();
        let response = self
            .client
            .get(url)
            .bearer_auth(&account.bearer_token)
            .query(params)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let retry_after = retry_after_secs(&response);
            return Err(CollectError::from_status(status, url, retry_after));
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|source| CollectError::Deserialize {
            context: context.to_string(),
            source,
        })
    }

    /// Follower count for `handle`, when the profile is visible.
    ///
    /// # Errors
    ///
    /// Returns a [`CollectError`] on HTTP failure, non-2xx status, or a
    /// malformed response body.
    pub async fn lookup_followers(&self, handle: &str) -> Result<Option<u64>, CollectError> {
        let url = format!("{}/2/users/by/username/{handle}", self.base_url);
        let response: UserLookupResponse = self
            .get_json(&url, &[("user.fields", "public_metrics")], "user lookup")
            .await?;
        Ok(response
            .data
            .and_then(|d| d.public_metrics)
            .and_then(|m| m.followers_count))
    }

    /// Recent posts mentioning `@handle`.
    ///
    /// # Errors
    ///
    /// Returns a [`CollectError`] on HTTP failure, non-2xx status, or a
    /// malformed response body.
    pub async fn search_mentions(&self, handle: &str) -> Result<Vec<Finding>, CollectError> {
        let url = format!("{}/2/tweets/search/recent", self.base_url);
        let query = format!("@{handle}");
        let max_results = MAX_RESULTS.to_string();
        let response: SearchResponse = self
            .get_json(
                &url,
                &[("query", query.as_str()), ("max_results", max_results.as_str())],
                "mention search",
            )
            .await?;

        Ok(response
            .data
            .iter()
            .filter_map(|tweet| {
                let text = tweet.text.as_deref()?.trim();
                if text.is_empty() {
                    return None;
                }
                let mut snippet = text.to_string();
                if snippet.len() > SNIPPET_MAX_CHARS {
                    let mut end = SNIPPET_MAX_CHARS;
                    while end > 0 && !snippet.is_char_boundary(end) {
                        end -= 1;
                    }
                    snippet.truncate(end);
                }
                let url = tweet
                    .id
                    .as_deref()
                    .map(|id| format!("{}/i/status/{id}", self.base_url));
                Some(Finding::new(snippet, url))
            })
            .collect())
    }
}

/// Microblog source collector. `client` is `None` when no accounts are
/// configured.
pub struct MicroblogCollector {
    client: Option<MicroblogClient>,
}

impl MicroblogCollector {
    #[must_use]
    pub fn new(client: Option<MicroblogClient>) -> Self {
        Self { client }
    }

    async fn run(&self, query: &BrandQuery) -> SourceResult {
        let Some(handle) = query.social_handle.as_deref() else {
            return SourceResult::skipped(SourceId::Microblog, "no social handle provided");
        };
        let Some(client) = &self.client else {
            return SourceResult::skipped(SourceId::Microblog, "no microblog accounts configured");
        };

        let handle = handle.trim_start_matches('@');

        let mentions = retry_with_backoff(client.max_retries, client.backoff_base_ms, || {
            client.search_mentions(handle)
        })
        .await;

        let findings = match mentions {
            Ok(findings) => findings,
            Err(e) => {
                tracing::warn!(handle, error = %e, "microblog mention search failed");
                return SourceResult::failed(
                    SourceId::Microblog,
                    format!("mention search failed: {e}"),
                );
            }
        };

        let followers = retry_with_backoff(client.max_retries, client.backoff_base_ms, || {
            client.lookup_followers(handle)
        })
        .await;

        let mut signals = SignalSet {
            mention_count: Some(findings.len() as u64),
            ..SignalSet::default()
        };

        tracing::debug!(handle, mentions = findings.len(), "collected microblog signals");

        match followers {
            Ok(count) => {
                signals.follower_count = count;
                SourceResult::ok(SourceId::Microblog, findings, signals)
            }
            Err(e) => {
                // Mentions alone are still usable; degrade rather than fail.
                tracing::warn!(handle, error = %e, "profile lookup failed");
                SourceResult::partial(
                    SourceId::Microblog,
                    findings,
                    signals,
                    format!("profile lookup failed: {e}"),
                )
            }
        }
    }
}

impl SourceCollector for MicroblogCollector {
    fn source(&self) -> SourceId {
        SourceId::Microblog
    }

    fn collect<'a>(&'a self, query: &'a BrandQuery) -> BoxFuture<'a, SourceResult> {
        Box::pin(self.run(query))
    }
}
