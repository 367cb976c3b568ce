//! Website-trust collector.
//!
//! Probes TLS, fetches page content (crawl service when a key is configured,
//! plain HTTP otherwise), extracts contact information and trust-relevant
//! page sections, and condenses everything into the fixed 0-100 trust-point
//! scale.

pub mod extract;
pub mod points;

use std::sync::LazyLock;

use brandlens_core::{AppConfig, BrandQuery, Finding, SignalSet, SourceId, SourceResult};
use futures::future::BoxFuture;
use regex::Regex;
use serde::Deserialize;

use crate::collector::SourceCollector;
use crate::error::{retry_after_secs, CollectError};
use crate::retry::retry_with_backoff;

use extract::{detect_page_sections, extract_contact_info};
use points::site_trust_points;

const DEFAULT_CRAWL_BASE_URL: &str = "https://api.firecrawl.dev";
/// Plain fetches shorter than this are treated as "no meaningful content".
const MIN_CONTENT_CHARS: usize = 500;
const CONTENT_SAMPLE_CHARS: usize = 300;

static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").expect("valid tag regex"));
static WS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("valid ws regex"));

#[derive(Debug, Deserialize)]
struct ScrapeResponse {
    data: Option<ScrapeData>,
}

#[derive(Debug, Deserialize)]
struct ScrapeData {
    markdown: Option<String>,
}

/// Outcome of the TLS probe.
#[derive(Debug, Clone)]
struct SslProbe {
    https_enabled: bool,
    certificate_valid: bool,
    reachable: bool,
    status_line: String,
}

/// Crawl-service client (markdown scraping API).
struct CrawlClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl CrawlClient {
    /// Scrape `url` into markdown. `Ok(None)` means the service responded
    /// without usable content.
    async fn scrape(&self, url: &str) -> Result<Option<String>, CollectError> {
        let endpoint = format!("{}/v1/scrape", self.base_url);
        let response = self
            .client
            .post(&endpoint)
            .bearer_auth(&self.api_key)
            .json(&serde_json::json!({ "url": url, "formats": ["markdown"] }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let retry_after = retry_after_secs(&response);
            return Err(CollectError::from_status(status, &endpoint, retry_after));
        }

        let body = response.text().await?;
        let parsed: ScrapeResponse =
            serde_json::from_str(&body).map_err(|source| CollectError::Deserialize {
                context: "crawl scrape".to_string(),
                source,
            })?;
        Ok(parsed
            .data
            .and_then(|d| d.markdown)
            .filter(|m| !m.trim().is_empty()))
    }
}

/// Website-trust source collector.
pub struct WebsiteTrustCollector {
    http: reqwest::Client,
    crawl: Option<CrawlClient>,
    max_retries: u32,
    backoff_base_ms: u64,
}

impl WebsiteTrustCollector {
    /// # Errors
    ///
    /// Returns [`CollectError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(config: &AppConfig) -> Result<Self, CollectError> {
        Self::with_crawl_base_url(config, DEFAULT_CRAWL_BASE_URL)
    }

    /// Same as [`WebsiteTrustCollector::new`] against a custom crawl-service
    /// base URL. Used by tests to point the client at a mock server.
    ///
    /// # Errors
    ///
    /// Returns [`CollectError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn with_crawl_base_url(config: &AppConfig, crawl_base_url: &str) -> Result<Self, CollectError> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.http_timeout_secs))
            .connect_timeout(std::time::Duration::from_secs(10))
            .user_agent(&config.user_agent)
            .build()?;
        let crawl = config.crawl_api_key.as_ref().map(|key| CrawlClient {
            client: http.clone(),
            api_key: key.clone(),
            base_url: crawl_base_url.trim_end_matches('/').to_string(),
        });
        Ok(Self {
            http,
            crawl,
            max_retries: config.max_retries,
            backoff_base_ms: config.retry_backoff_base_ms,
        })
    }

    /// Probe TLS by fetching the site. A successful HTTPS fetch through the
    /// verifying client counts as a valid certificate; on failure the HTTP
    /// variant distinguishes "no HTTPS" from "unreachable".
    async fn probe_tls(&self, url: &str) -> SslProbe {
        if url.starts_with("http://") {
            return match self.http.get(url).send().await {
                Ok(_) => SslProbe {
                    https_enabled: false,
                    certificate_valid: false,
                    reachable: true,
                    status_line: "No HTTPS (HTTP only)".to_string(),
                },
                Err(_) => unreachable_probe(),
            };
        }

        match self.http.get(url).send().await {
            Ok(response) => {
                let landed_on_https = response.url().scheme() == "https";
                if landed_on_https {
                    SslProbe {
                        https_enabled: true,
                        certificate_valid: true,
                        reachable: true,
                        status_line: "Valid TLS certificate (HTTPS enabled)".to_string(),
                    }
                } else {
                    SslProbe {
                        https_enabled: false,
                        certificate_valid: false,
                        reachable: true,
                        status_line: "No HTTPS (redirected to HTTP)".to_string(),
                    }
                }
            }
            Err(e) => {
                // HTTPS was attempted; see whether plain HTTP gets through.
                let http_url = url.replacen("https://", "http://", 1);
                match self.http.get(&http_url).send().await {
                    Ok(_) => SslProbe {
                        https_enabled: true,
                        certificate_valid: false,
                        reachable: true,
                        status_line: format!("HTTPS failed ({e}); HTTP reachable"),
                    },
                    Err(_) => unreachable_probe(),
                }
            }
        }
    }

    /// Fetch page content: crawl service first (with retry), plain HTTP
    /// fetch with tag stripping as the fallback.
    async fn fetch_content(&self, url: &str) -> Option<String> {
        if let Some(crawl) = &self.crawl {
            let scraped = retry_with_backoff(self.max_retries, self.backoff_base_ms, || {
                crawl.scrape(url)
            })
            .await;
            match scraped {
                Ok(Some(markdown)) => return Some(markdown),
                Ok(None) => {
                    tracing::warn!(url, "crawl service returned no content");
                }
                Err(e) => {
                    tracing::warn!(url, error = %e, "crawl service scrape failed");
                }
            }
        }

        match self.http.get(url).send().await {
            Ok(response) if response.status().is_success() => {
                let html = response.text().await.ok()?;
                let text = strip_html(&html);
                (text.len() > MIN_CONTENT_CHARS).then_some(text)
            }
            Ok(response) => {
                tracing::warn!(url, status = %response.status(), "plain content fetch failed");
                None
            }
            Err(e) => {
                tracing::warn!(url, error = %e, "plain content fetch failed");
                None
            }
        }
    }

    async fn run(&self, query: &BrandQuery) -> SourceResult {
        let Some(website) = query.website.as_deref() else {
            return SourceResult::skipped(SourceId::WebsiteTrust, "no website URL provided");
        };

        let url = normalize_url(website);
        let probe = self.probe_tls(&url).await;

        if !probe.reachable {
            return SourceResult::failed(
                SourceId::WebsiteTrust,
                format!("website unreachable: {url}"),
            );
        }

        let content = self.fetch_content(&url).await;

        let mut findings = vec![Finding::new(probe.status_line.clone(), Some(url.clone()))];
        let (contact, sections, content_length) = match &content {
            Some(text) => (
                extract_contact_info(text),
                detect_page_sections(text),
                text.len(),
            ),
            None => (
                extract::ContactInfo::default(),
                extract::PageSections::default(),
                0,
            ),
        };

        if let Some(text) = &content {
            if let Some(phone) = &contact.phone {
                findings.push(Finding::new(format!("Contact phone listed: {phone}"), None));
            }
            if let Some(email) = &contact.email {
                findings.push(Finding::new(format!("Contact email listed: {email}"), None));
            }
            if let Some(address) = &contact.address {
                findings.push(Finding::new(format!("Business address listed: {address}"), None));
            }
            for (present, label) in [
                (sections.about, "About page present"),
                (sections.privacy, "Privacy policy present"),
                (sections.terms, "Terms page present"),
                (sections.support, "Support section present"),
                (sections.social, "Social media links present"),
            ] {
                if present {
                    findings.push(Finding::new(label, None));
                }
            }
            let sample = sample_text(text, CONTENT_SAMPLE_CHARS);
            findings.push(Finding::new(format!("Content sample: {sample}"), None));
        }

        let trust_points = site_trust_points(
            probe.certificate_valid,
            probe.https_enabled,
            &contact,
            &sections,
            content_length,
        );

        let signals = SignalSet {
            ssl_valid: Some(probe.certificate_valid),
            contact_channels: Some(contact.channel_count()),
            sections_found: Some(sections.found_count()),
            content_length: Some(content_length),
            site_trust_points: Some(trust_points),
            ..SignalSet::default()
        };

        tracing::debug!(
            url,
            trust_points,
            content_length,
            "collected website trust signals"
        );

        if content.is_some() {
            SourceResult::ok(SourceId::WebsiteTrust, findings, signals)
        } else {
            SourceResult::partial(
                SourceId::WebsiteTrust,
                findings,
                signals,
                "failed to fetch website content",
            )
        }
    }
}

fn unreachable_probe() -> SslProbe {
    SslProbe {
        https_enabled: false,
        certificate_valid: false,
        reachable: false,
        status_line: "Website unreachable".to_string(),
    }
}

/// Prepend `https://` when the URL has no scheme.
fn normalize_url(website: &str) -> String {
    let trimmed = website.trim();
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("https://{trimmed}")
    }
}

/// Crude HTML-to-text: drop tags, unescape common entities, collapse
/// whitespace.
fn strip_html(html: &str) -> String {
    let without_tags = TAG_RE.replace_all(html, " ");
    let unescaped = without_tags
        .replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'");
    WS_RE.replace_all(&unescaped, " ").trim().to_string()
}

fn sample_text(text: &str, max: usize) -> String {
    if text.len() <= max {
        return text.to_string();
    }
    let mut end = max;
    while end > 0 && !text.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &text[..end])
}

impl SourceCollector for WebsiteTrustCollector {
    fn source(&self) -> SourceId {
        SourceId::WebsiteTrust
    }

    fn collect<'a>(&'a self, query: &'a BrandQuery) -> BoxFuture<'a, SourceResult> {
        Box::pin(self.run(query))
    }
}
