//! Collection domain model: queries, per-source results, and the aggregate
//! record handed to the scorer.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Immutable input describing one brand-analysis run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrandQuery {
    pub brand_name: String,
    pub social_handle: Option<String>,
    pub website: Option<String>,
}

impl BrandQuery {
    /// Build a query, rejecting empty brand names. Blank optional fields are
    /// normalized to `None`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] if `brand_name` is empty or
    /// whitespace-only.
    pub fn new(
        brand_name: impl Into<String>,
        social_handle: Option<String>,
        website: Option<String>,
    ) -> Result<Self, ConfigError> {
        let brand_name = brand_name.into().trim().to_string();
        if brand_name.is_empty() {
            return Err(ConfigError::Validation(
                "brand name must be non-empty".to_string(),
            ));
        }
        let non_blank = |v: Option<String>| v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty());
        Ok(Self {
            brand_name,
            social_handle: non_blank(social_handle),
            website: non_blank(website),
        })
    }
}

/// Identifier for one of the known signal sources.
///
/// The derived `Ord` fixes the order sources appear in an
/// [`AggregateRecord`] and in the persisted report.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum SourceId {
    Ratings,
    Discussions,
    Microblog,
    WebsiteTrust,
}

impl SourceId {
    pub const ALL: [SourceId; 4] = [
        SourceId::Ratings,
        SourceId::Discussions,
        SourceId::Microblog,
        SourceId::WebsiteTrust,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SourceId::Ratings => "ratings",
            SourceId::Discussions => "discussions",
            SourceId::Microblog => "microblog",
            SourceId::WebsiteTrust => "website_trust",
        }
    }
}

impl std::fmt::Display for SourceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of one collector run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceStatus {
    Ok,
    Partial,
    Failed,
    Skipped,
}

impl std::fmt::Display for SourceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            SourceStatus::Ok => "ok",
            SourceStatus::Partial => "partial",
            SourceStatus::Failed => "failed",
            SourceStatus::Skipped => "skipped",
        };
        f.write_str(s)
    }
}

/// One normalized text snippet collected from a source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Finding {
    pub text: String,
    pub url: Option<String>,
}

impl Finding {
    #[must_use]
    pub fn new(text: impl Into<String>, url: Option<String>) -> Self {
        Self {
            text: text.into(),
            url,
        }
    }
}

/// Numeric signals extracted by collectors.
///
/// Every field is optional so the scorer can treat all sources uniformly
/// while still reaching source-specific numbers.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SignalSet {
    pub average_rating: Option<f64>,
    pub review_count: Option<u64>,
    pub mention_count: Option<u64>,
    pub follower_count: Option<u64>,
    pub ssl_valid: Option<bool>,
    pub contact_channels: Option<u32>,
    pub sections_found: Option<u32>,
    pub content_length: Option<usize>,
    /// Website trust points on the fixed 0-100 scale.
    pub site_trust_points: Option<u32>,
}

/// Result of one collector: status, normalized findings, numeric signals,
/// and the captured error message when status is not `ok`.
///
/// Created by a collector and never mutated after return.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceResult {
    pub source: SourceId,
    pub status: SourceStatus,
    pub findings: Vec<Finding>,
    pub signals: SignalSet,
    pub error: Option<String>,
}

impl SourceResult {
    #[must_use]
    pub fn ok(source: SourceId, findings: Vec<Finding>, signals: SignalSet) -> Self {
        Self {
            source,
            status: SourceStatus::Ok,
            findings,
            signals,
            error: None,
        }
    }

    #[must_use]
    pub fn partial(
        source: SourceId,
        findings: Vec<Finding>,
        signals: SignalSet,
        error: impl Into<String>,
    ) -> Self {
        Self {
            source,
            status: SourceStatus::Partial,
            findings,
            signals,
            error: Some(error.into()),
        }
    }

    #[must_use]
    pub fn failed(source: SourceId, error: impl Into<String>) -> Self {
        Self {
            source,
            status: SourceStatus::Failed,
            findings: Vec::new(),
            signals: SignalSet::default(),
            error: Some(error.into()),
        }
    }

    #[must_use]
    pub fn skipped(source: SourceId, reason: impl Into<String>) -> Self {
        Self {
            source,
            status: SourceStatus::Skipped,
            findings: Vec::new(),
            signals: SignalSet::default(),
            error: Some(reason.into()),
        }
    }

    /// Whether this result carries any usable text snippets.
    #[must_use]
    pub fn has_text(&self) -> bool {
        self.findings.iter().any(|f| !f.text.trim().is_empty())
    }
}

/// One `SourceResult` per known source, keyed in fixed `SourceId` order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregateRecord {
    pub results: BTreeMap<SourceId, SourceResult>,
    pub collected_at: DateTime<Utc>,
}

impl AggregateRecord {
    /// Assemble a record from collector outputs.
    ///
    /// Guarantees exactly one entry per [`SourceId::ALL`]: duplicates keep
    /// the first result seen, and any source with no result is recorded as
    /// `failed`.
    #[must_use]
    pub fn new(results: Vec<SourceResult>) -> Self {
        let mut map = BTreeMap::new();
        for result in results {
            map.entry(result.source).or_insert(result);
        }
        for source in SourceId::ALL {
            map.entry(source)
                .or_insert_with(|| SourceResult::failed(source, "collector produced no result"));
        }
        Self {
            results: map,
            collected_at: Utc::now(),
        }
    }

    /// Look up the result for `source`.
    ///
    /// # Panics
    ///
    /// Panics if the record was constructed without [`AggregateRecord::new`]
    /// and the entry is missing; `new` always fills every source.
    #[must_use]
    pub fn get(&self, source: SourceId) -> &SourceResult {
        self.results
            .get(&source)
            .expect("AggregateRecord invariant: one entry per known source")
    }

    /// All findings from the given sources, in source order.
    #[must_use]
    pub fn findings_from(&self, sources: &[SourceId]) -> Vec<&Finding> {
        sources
            .iter()
            .filter_map(|s| self.results.get(s))
            .flat_map(|r| r.findings.iter())
            .filter(|f| !f.text.trim().is_empty())
            .collect()
    }

    /// All text findings across every source.
    #[must_use]
    pub fn all_findings(&self) -> Vec<&Finding> {
        self.findings_from(&SourceId::ALL)
    }
}
