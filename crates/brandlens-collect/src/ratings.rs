//! Product-ratings collector backed by the product-search API.
//!
//! Runs a shopping search for the brand, keeps items that actually match the
//! brand name, then pulls the review pages of the highest-quality products.
//! Normalized output: review text snippets plus a volume-weighted average
//! rating and total review count.

use brandlens_core::{AppConfig, BrandQuery, Finding, SignalSet, SourceId, SourceResult};
use futures::future::BoxFuture;
use serde::Deserialize;

use crate::collector::SourceCollector;
use crate::error::{retry_after_secs, CollectError};
use crate::retry::retry_with_backoff;

const DEFAULT_BASE_URL: &str = "https://serpapi.com";
/// How many products to pull review pages for.
const DEFAULT_MAX_PRODUCTS: usize = 3;
/// Cap on normalized review snippets per run.
const MAX_FINDINGS: usize = 40;

#[derive(Debug, Deserialize)]
struct ShoppingSearchResponse {
    #[serde(default)]
    shopping_results: Vec<ShoppingItem>,
}

#[derive(Debug, Deserialize)]
struct ShoppingItem {
    title: Option<String>,
    product_id: Option<String>,
    rating: Option<f64>,
    reviews: Option<u64>,
    source: Option<SourceField>,
}

/// The search API returns `source` either as a bare string or as an object
/// with a `name` field.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SourceField {
    Named { name: String },
    Plain(String),
}

impl SourceField {
    fn name(&self) -> &str {
        match self {
            SourceField::Named { name } => name,
            SourceField::Plain(name) => name,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ProductResponse {
    product_results: Option<ProductResults>,
    reviews_results: Option<ReviewsResults>,
}

#[derive(Debug, Deserialize)]
struct ProductResults {
    rating: Option<f64>,
    reviews: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct ReviewsResults {
    #[serde(default)]
    reviews: Vec<ReviewEntry>,
}

#[derive(Debug, Deserialize)]
struct ReviewEntry {
    content: Option<String>,
    snippet: Option<String>,
    link: Option<String>,
}

impl ReviewEntry {
    fn text(&self) -> Option<&str> {
        self.content
            .as_deref()
            .or(self.snippet.as_deref())
            .map(str::trim)
            .filter(|t| t.len() > 10)
    }
}

/// One brand-matched product from the shopping search.
#[derive(Debug, Clone)]
pub struct ProductHit {
    pub product_id: String,
    pub title: String,
    pub rating: Option<f64>,
    pub review_count: u64,
    pub quality_score: f64,
}

/// HTTP client for the product-search API.
pub struct RatingsClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    max_retries: u32,
    backoff_base_ms: u64,
}

impl RatingsClient {
    /// Creates a client with configured timeout, `User-Agent`, and retry
    /// policy.
    ///
    /// # Errors
    ///
    /// Returns [`CollectError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(config: &AppConfig) -> Result<Self, CollectError> {
        Self::with_base_url(config, DEFAULT_BASE_URL)
    }

    /// Same as [`RatingsClient::new`] but against a custom base URL.
    /// Used by tests to point the client at a mock server.
    ///
    /// # Errors
    ///
    /// Returns [`CollectError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn with_base_url(config: &AppConfig, base_url: &str) -> Result<Self, CollectError> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.http_timeout_secs))
            .connect_timeout(std::time::Duration::from_secs(10))
            .user_agent(&config.user_agent)
            .build()?;
        Ok(Self {
            client,
            api_key: config.search_api_key.clone(),
            base_url: base_url.trim_end_matches('/').to_string(),
            max_retries: config.max_retries,
            backoff_base_ms: config.retry_backoff_base_ms,
        })
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        params: &[(&str, &str)],
        context: &str,
    ) -> Result<T, CollectError> {
        let url = format!("{}/search.json", self.base_url);
        let response = self.client.get(&url).query(params).send().await?;
        let status = response.status();
        if !status.is_success() {
            let retry_after = retry_after_secs(&response);
            return Err(CollectError::from_status(status, &url, retry_after));
        }
        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|source| CollectError::Deserialize {
            context: context.to_string(),
            source,
        })
    }

    /// Search the shopping index for products matching `brand`.
    ///
    /// # Errors
    ///
    /// Returns a [`CollectError`] on HTTP failure, non-2xx status, or a
    /// malformed response body.
    pub async fn search_products(&self, brand: &str) -> Result<Vec<ProductHit>, CollectError> {
        let response: ShoppingSearchResponse = self
            .get_json(
                &[
                    ("engine", "google_shopping"),
                    ("q", brand),
                    ("num", "20"),
                    ("api_key", &self.api_key),
                ],
                "shopping search",
            )
            .await?;

        Ok(extract_product_hits(&response.shopping_results, brand))
    }

    /// Fetch one product's review page: overall rating summary plus review
    /// text snippets.
    ///
    /// # Errors
    ///
    /// Returns a [`CollectError`] on HTTP failure, non-2xx status, or a
    /// malformed response body.
    pub async fn fetch_product_reviews(
        &self,
        product_id: &str,
    ) -> Result<(Option<f64>, Option<u64>, Vec<Finding>), CollectError> {
        let response: ProductResponse = self
            .get_json(
                &[
                    ("engine", "google_product"),
                    ("product_id", product_id),
                    ("reviews", "1"),
                    ("api_key", &self.api_key),
                ],
                "product reviews",
            )
            .await?;

        let (rating, review_count) = response
            .product_results
            .map_or((None, None), |p| (p.rating, p.reviews));

        let findings = response
            .reviews_results
            .map(|r| r.reviews)
            .unwrap_or_default()
            .iter()
            .filter_map(|entry| {
                entry
                    .text()
                    .map(|text| Finding::new(text, entry.link.clone()))
            })
            .collect();

        Ok((rating, review_count, findings))
    }
}

/// Keep shopping items that plausibly belong to the brand and attach a
/// quality score (`rating * 10 + min(review_count, 100)`).
fn extract_product_hits(items: &[ShoppingItem], brand: &str) -> Vec<ProductHit> {
    let mut hits = Vec::new();
    for item in items {
        let Some(product_id) = item.product_id.as_deref().filter(|id| !id.is_empty()) else {
            continue;
        };
        let title = item.title.clone().unwrap_or_default();
        let source_name = item.source.as_ref().map(SourceField::name).unwrap_or_default();
        if !matches_brand(brand, &title, source_name) {
            continue;
        }

        let review_count = item.reviews.unwrap_or(0);
        #[allow(clippy::cast_precision_loss)]
        let quality_score =
            item.rating.unwrap_or(0.0) * 10.0 + review_count.min(100) as f64;
        hits.push(ProductHit {
            product_id: product_id.to_string(),
            title,
            rating: item.rating,
            review_count,
            quality_score,
        });
    }
    hits
}

/// Relaxed brand match: the full brand name, or any brand word longer than
/// two characters, appearing in the product title or seller name.
fn matches_brand(brand: &str, title: &str, source_name: &str) -> bool {
    let brand_lower = brand.to_lowercase();
    let title_lower = title.to_lowercase();
    let source_lower = source_name.to_lowercase();

    if title_lower.contains(&brand_lower) || source_lower.contains(&brand_lower) {
        return true;
    }
    brand_lower
        .split_whitespace()
        .filter(|word| word.len() > 2)
        .any(|word| title_lower.contains(word) || source_lower.contains(word))
}

/// Ratings source collector.
pub struct RatingsCollector {
    client: RatingsClient,
    max_products: usize,
}

impl RatingsCollector {
    /// # Errors
    ///
    /// Returns [`CollectError::Http`] if the HTTP client cannot be built.
    pub fn new(config: &AppConfig) -> Result<Self, CollectError> {
        Ok(Self::with_client(RatingsClient::new(config)?))
    }

    #[must_use]
    pub fn with_client(client: RatingsClient) -> Self {
        Self {
            client,
            max_products: DEFAULT_MAX_PRODUCTS,
        }
    }

    async fn run(&self, query: &BrandQuery) -> SourceResult {
        let brand = query.brand_name.as_str();
        let search = retry_with_backoff(
            self.client.max_retries,
            self.client.backoff_base_ms,
            || self.client.search_products(brand),
        )
        .await;

        let mut hits = match search {
            Ok(hits) => hits,
            Err(e) => {
                tracing::warn!(brand, error = %e, "shopping search failed");
                return SourceResult::failed(SourceId::Ratings, format!("shopping search failed: {e}"));
            }
        };

        if hits.is_empty() {
            return SourceResult::failed(
                SourceId::Ratings,
                format!("no products matched brand '{brand}'"),
            );
        }

        hits.sort_by(|a, b| {
            b.quality_score
                .partial_cmp(&a.quality_score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        hits.truncate(self.max_products);

        let mut findings: Vec<Finding> = Vec::new();
        let mut rated: Vec<(f64, u64)> = Vec::new();
        let mut fetch_failures = 0usize;

        for hit in &hits {
            let fetched = retry_with_backoff(
                self.client.max_retries,
                self.client.backoff_base_ms,
                || self.client.fetch_product_reviews(&hit.product_id),
            )
            .await;

            match fetched {
                Ok((rating, review_count, product_findings)) => {
                    if let Some(r) = rating.or(hit.rating) {
                        rated.push((r, review_count.unwrap_or(hit.review_count)));
                    }
                    findings.extend(product_findings);
                }
                Err(e) => {
                    tracing::warn!(
                        brand,
                        product_id = %hit.product_id,
                        error = %e,
                        "product review fetch failed"
                    );
                    fetch_failures += 1;
                    // Search data still carries the headline numbers.
                    if let Some(r) = hit.rating {
                        rated.push((r, hit.review_count));
                    }
                }
            }
        }
        findings.truncate(MAX_FINDINGS);

        let signals = SignalSet {
            average_rating: weighted_average_rating(&rated),
            review_count: Some(rated.iter().map(|(_, count)| count).sum()),
            ..SignalSet::default()
        };

        tracing::debug!(
            brand,
            products = hits.len(),
            findings = findings.len(),
            fetch_failures,
            "collected ratings signals"
        );

        if fetch_failures == hits.len() {
            SourceResult::partial(
                SourceId::Ratings,
                findings,
                signals,
                format!("all {fetch_failures} product review fetches failed"),
            )
        } else {
            SourceResult::ok(SourceId::Ratings, findings, signals)
        }
    }
}

/// Average rating weighted by per-product review volume; falls back to a
/// plain mean when no volumes are known.
fn weighted_average_rating(rated: &[(f64, u64)]) -> Option<f64> {
    if rated.is_empty() {
        return None;
    }
    let total_volume: u64 = rated.iter().map(|(_, count)| count).sum();
    #[allow(clippy::cast_precision_loss)]
    let average = if total_volume == 0 {
        rated.iter().map(|(r, _)| r).sum::<f64>() / rated.len() as f64
    } else {
        rated
            .iter()
            .map(|(r, count)| r * *count as f64)
            .sum::<f64>()
            / total_volume as f64
    };
    Some(average)
}

impl SourceCollector for RatingsCollector {
    fn source(&self) -> SourceId {
        SourceId::Ratings
    }

    fn collect<'a>(&'a self, query: &'a BrandQuery) -> BoxFuture<'a, SourceResult> {
        Box::pin(self.run(query))
    }
}
