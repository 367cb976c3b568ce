//! Discussion-forum collector (client-credentials OAuth).
//!
//! Searches forum posts for brand mentions. The source is optional: without
//! client credentials the collector reports `skipped` and makes no network
//! call.

use brandlens_core::{AppConfig, BrandQuery, Finding, SignalSet, SourceId, SourceResult};
use futures::future::BoxFuture;
use serde::Deserialize;

use crate::collector::SourceCollector;
use crate::error::{retry_after_secs, CollectError};
use crate::retry::retry_with_backoff;

const DEFAULT_AUTH_BASE_URL: &str = "https://www.reddit.com";
const DEFAULT_API_BASE_URL: &str = "https://oauth.reddit.com";
const PAGE_LIMIT: usize = 50;
const MAX_MENTIONS: usize = 40;
/// Keep post bodies short; the scorer pools snippets, not essays.
const SNIPPET_MAX_CHARS: usize = 400;

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct Listing {
    data: ListingData,
}

#[derive(Debug, Deserialize)]
struct ListingData {
    #[serde(default)]
    children: Vec<Post>,
}

#[derive(Debug, Deserialize)]
struct Post {
    data: PostData,
}

#[derive(Debug, Deserialize)]
struct PostData {
    title: Option<String>,
    selftext: Option<String>,
    permalink: Option<String>,
}

/// Forum API client holding a client-credentials access token.
pub struct DiscussionsClient {
    client: reqwest::Client,
    client_id: String,
    client_secret: String,
    user_agent: String,
    auth_base_url: String,
    api_base_url: String,
    max_retries: u32,
    backoff_base_ms: u64,
}

impl DiscussionsClient {
    /// Creates a client from the configured discussion credentials.
    ///
    /// # Errors
    ///
    /// Returns [`CollectError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(config: &AppConfig, client_id: &str, client_secret: &str) -> Result<Self, CollectError> {
        Self::with_base_urls(
            config,
            client_id,
            client_secret,
            DEFAULT_AUTH_BASE_URL,
            DEFAULT_API_BASE_URL,
        )
    }

    /// Same as [`DiscussionsClient::new`] against custom auth/API base URLs.
    /// Used by tests to point the client at a mock server.
    ///
    /// # Errors
    ///
    /// Returns [`CollectError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn with_base_urls(
        config: &AppConfig,
        client_id: &str,
        client_secret: &str,
        auth_base_url: &str,
        api_base_url: &str,
    ) -> Result<Self, CollectError> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.http_timeout_secs))
            .connect_timeout(std::time::Duration::from_secs(10))
            .build()?;
        Ok(Self {
            client,
            client_id: client_id.to_string(),
            client_secret: client_secret.to_string(),
            user_agent: config.discussion_user_agent.clone(),
            auth_base_url: auth_base_url.trim_end_matches('/').to_string(),
            api_base_url: api_base_url.trim_end_matches('/').to_string(),
            max_retries: config.max_retries,
            backoff_base_ms: config.retry_backoff_base_ms,
        })
    }

    /// Exchange client credentials for an access token.
    async fn fetch_token(&self) -> Result<String, CollectError> {
        let url = format!("{}/api/v1/access_token", self.auth_base_url);
        let response = self
            .client
            .post(&url)
            .header("User-Agent", &self.user_agent)
            .basic_auth(&self.client_id, Some(&self.client_secret))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let retry_after = retry_after_secs(&response);
            return Err(CollectError::from_status(status, &url, retry_after));
        }

        let body = response.text().await?;
        let token: TokenResponse =
            serde_json::from_str(&body).map_err(|source| CollectError::Deserialize {
                context: "token exchange".to_string(),
                source,
            })?;
        Ok(token.access_token)
    }

    /// Search posts mentioning the brand, keeping only posts whose text
    /// actually contains a brand term.
    ///
    /// # Errors
    ///
    /// Returns a [`CollectError`] on token-exchange or search failure.
    pub async fn search_mentions(&self, brand: &str) -> Result<Vec<Finding>, CollectError> {
        let token = self.fetch_token().await?;
        let url = format!("{}/search", self.api_base_url);
        let limit = PAGE_LIMIT.to_string();
        let response = self
            .client
            .get(&url)
            .header("Authorization", format!("Bearer {token}"))
            .header("User-Agent", &self.user_agent)
            .query(&[
                ("q", brand),
                ("sort", "relevance"),
                ("limit", limit.as_str()),
                ("type", "link"),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let retry_after = retry_after_secs(&response);
            return Err(CollectError::from_status(status, &url, retry_after));
        }

        let body = response.text().await?;
        let listing: Listing =
            serde_json::from_str(&body).map_err(|source| CollectError::Deserialize {
                context: "post search".to_string(),
                source,
            })?;

        let mut findings: Vec<Finding> = listing
            .data
            .children
            .iter()
            .filter_map(|post| to_finding(&post.data, brand, &self.api_base_url))
            .collect();
        findings.truncate(MAX_MENTIONS);
        Ok(findings)
    }
}

/// Normalize one post into a finding, or drop it when it never actually
/// mentions the brand.
fn to_finding(post: &PostData, brand: &str, api_base_url: &str) -> Option<Finding> {
    let title = post.title.as_deref().unwrap_or("").trim();
    let body = post.selftext.as_deref().unwrap_or("").trim();
    if title.is_empty() && body.is_empty() {
        return None;
    }

    let combined = format!("{title} {body}").to_lowercase();
    if !mentions_brand(&combined, brand) {
        return None;
    }

    let mut text = if body.is_empty() {
        title.to_string()
    } else {
        format!("{title} — {body}")
    };
    if text.len() > SNIPPET_MAX_CHARS {
        text = truncate_on_char_boundary(&text, SNIPPET_MAX_CHARS);
    }

    let url = post
        .permalink
        .as_deref()
        .map(|p| format!("{api_base_url}{p}"));
    Some(Finding::new(text, url))
}

/// Whether `haystack` (lowercase) mentions the brand or any brand word
/// longer than two characters.
fn mentions_brand(haystack: &str, brand: &str) -> bool {
    let brand_lower = brand.to_lowercase();
    if haystack.contains(&brand_lower) {
        return true;
    }
    brand_lower
        .split_whitespace()
        .filter(|word| word.len() > 2)
        .any(|word| haystack.contains(word))
}

fn truncate_on_char_boundary(text: &str, max: usize) -> String {
    let mut end = max;
    while end > 0 && !text.is_char_boundary(end) {
        end -= 1;
    }
    text[..end].to_string()
}

/// Discussion source collector. `client` is `None` when the optional
/// credentials are not configured.
pub struct DiscussionsCollector {
    client: Option<DiscussionsClient>,
}

impl DiscussionsCollector {
    /// Build the collector, creating a client only when discussion
    /// credentials are configured.
    ///
    /// # Errors
    ///
    /// Returns [`CollectError::Http`] if the HTTP client cannot be built.
    pub fn new(config: &AppConfig) -> Result<Self, CollectError> {
        let client = match config.discussion_credentials() {
            Some((id, secret)) => Some(DiscussionsClient::new(config, id, secret)?),
            None => None,
        };
        Ok(Self { client })
    }

    #[must_use]
    pub fn with_client(client: DiscussionsClient) -> Self {
        Self {
            client: Some(client),
        }
    }

    async fn run(&self, query: &BrandQuery) -> SourceResult {
        let Some(client) = &self.client else {
            return SourceResult::skipped(
                SourceId::Discussions,
                "discussion credentials not configured",
            );
        };

        let brand = query.brand_name.as_str();
        let search = retry_with_backoff(client.max_retries, client.backoff_base_ms, || {
            client.search_mentions(brand)
        })
        .await;

        match search {
            Ok(findings) => {
                let signals = SignalSet {
                    mention_count: Some(findings.len() as u64),
                    ..SignalSet::default()
                };
                tracing::debug!(brand, mentions = findings.len(), "collected discussion signals");
                SourceResult::ok(SourceId::Discussions, findings, signals)
            }
            Err(e) => {
                tracing::warn!(brand, error = %e, "discussion search failed");
                SourceResult::failed(
                    SourceId::Discussions,
                    format!("discussion search failed: {e}"),
                )
            }
        }
    }
}

impl SourceCollector for DiscussionsCollector {
    fn source(&self) -> SourceId {
        SourceId::Discussions
    }

    fn collect<'a>(&'a self, query: &'a BrandQuery) -> BoxFuture<'a, SourceResult> {
        Box::pin(self.run(query))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn post(title: &str, body: &str) -> PostData {
        PostData {
            title: Some(title.to_string()),
            selftext: Some(body.to_string()),
            permalink: Some("/r/reviews/comments/abc".to_string()),
        }
    }

    #[test]
    fn to_finding_keeps_brand_mentions() {
        let finding = to_finding(&post("Acme kettle review", "holds up well"), "Acme", "https://api")
            .expect("should produce a finding");
        assert!(finding.text.contains("Acme kettle review"));
        assert_eq!(
            finding.url.as_deref(),
            Some("https://api/r/reviews/comments/abc")
        );
    }

    #[test]
    fn to_finding_drops_posts_without_brand_mention() {
        assert!(to_finding(&post("random post", "nothing relevant"), "Acme", "base").is_none());
    }

    #[test]
    fn to_finding_drops_empty_posts() {
        assert!(to_finding(&post("", ""), "Acme", "base").is_none());
    }

    #[test]
    fn to_finding_truncates_long_bodies() {
        let long_body = format!("Acme {}", "x".repeat(1000));
        let finding = to_finding(&post("title", &long_body), "Acme", "base").unwrap();
        assert!(finding.text.len() <= SNIPPET_MAX_CHARS);
    }

    #[test]
    fn mentions_brand_matches_individual_words() {
        assert!(mentions_brand("loving my tokai beans", "Blue Tokai"));
        assert!(!mentions_brand("generic coffee talk", "Blue Tokai"));
    }
}
