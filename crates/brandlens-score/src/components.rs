//! Per-component scoring rules.
//!
//! Every component always produces a score: when its data sources are
//! `skipped` or `failed`, or the judge call fails, the component takes
//! [`MIDPOINT_SCORE`] and its fixed weight stays in place. Weights are never
//! redistributed over the available components.

use brandlens_core::{
    AggregateRecord, Component, ComponentScore, Finding, SourceId, SourceStatus, MIDPOINT_SCORE,
};

use crate::judge::{Judge, JudgeRequest};
use crate::rubrics;

/// Review volume at which the ratings confidence factor reaches one half.
/// `n / (n + PIVOT)` discounts a high average backed by very few reviews.
const VOLUME_CONFIDENCE_PIVOT: f64 = 50.0;

/// Snippet cap per judge payload.
const MAX_SNIPPETS: usize = 50;

/// Text findings below this count are "too quiet" to infer support quality
/// from the absence of complaints.
const QUIET_SUPPORT_MIN_FINDINGS: usize = 10;
/// Score granted when substantial review text carries no support complaints.
const QUIET_SUPPORT_SCORE: f64 = 7.0;

const SUPPORT_KEYWORDS: &[&str] = &[
    "support",
    "customer service",
    "customer care",
    "refund",
    "return",
    "replacement",
    "warranty",
    "response",
    "complaint",
    "delivery",
    "shipping",
    "help",
];

/// Ratings component: deterministic volume-confidence adjustment over the
/// ratings source's average rating and review count.
pub(crate) fn score_ratings(record: &AggregateRecord) -> ComponentScore {
    let result = record.get(SourceId::Ratings);
    let Some(average) = result.signals.average_rating else {
        return ComponentScore::new(
            Component::Ratings,
            MIDPOINT_SCORE,
            format!(
                "ratings source {}; midpoint default applied",
                result.status
            ),
        );
    };

    let count = result.signals.review_count.unwrap_or(0);
    // Star average on the 0-10 scale, pulled toward the midpoint when the
    // review volume is too small to trust.
    let base = (average * 2.0).clamp(0.0, 10.0);
    #[allow(clippy::cast_precision_loss)]
    let confidence = count as f64 / (count as f64 + VOLUME_CONFIDENCE_PIVOT);
    let score = MIDPOINT_SCORE + (base - MIDPOINT_SCORE) * confidence;

    ComponentScore::new(
        Component::Ratings,
        score,
        format!("average rating {average:.1} across {count} reviews (volume-adjusted)"),
    )
}

/// Business legitimacy component: the website trust points mapped onto the
/// 0-10 scale, or the midpoint when the website source did not fully
/// succeed.
pub(crate) fn score_business_legitimacy(record: &AggregateRecord) -> ComponentScore {
    let result = record.get(SourceId::WebsiteTrust);
    match (result.status, result.signals.site_trust_points) {
        (SourceStatus::Ok, Some(points)) => ComponentScore::new(
            Component::BusinessLegitimacy,
            f64::from(points) / 10.0,
            format!("website trust points {points}/100 (TLS, contact info, page completeness)"),
        ),
        _ => ComponentScore::new(
            Component::BusinessLegitimacy,
            MIDPOINT_SCORE,
            format!(
                "website source {}; midpoint default applied",
                result.status
            ),
        ),
    }
}

/// Review sentiment component: judge over pooled text from every source.
pub(crate) async fn score_review_sentiment(
    judge: &dyn Judge,
    record: &AggregateRecord,
    warnings: &mut Vec<String>,
) -> ComponentScore {
    let findings = record.all_findings();
    if findings.is_empty() {
        return ComponentScore::new(
            Component::ReviewSentiment,
            MIDPOINT_SCORE,
            "no review text available; midpoint default applied",
        );
    }

    let payload = serde_json::json!({
        "snippet_count": findings.len(),
        "snippets": snippet_texts(&findings),
    });

    judged_score(
        judge,
        Component::ReviewSentiment,
        rubrics::REVIEW_SENTIMENT,
        payload,
        warnings,
    )
    .await
}

/// Social media component: judge over microblog and discussion mentions,
/// with volume numbers attached.
pub(crate) async fn score_social_media(
    judge: &dyn Judge,
    record: &AggregateRecord,
    warnings: &mut Vec<String>,
) -> ComponentScore {
    let findings = record.findings_from(&[SourceId::Discussions, SourceId::Microblog]);
    let mention_count: u64 = [SourceId::Discussions, SourceId::Microblog]
        .iter()
        .filter_map(|&s| record.get(s).signals.mention_count)
        .sum();
    let follower_count = record.get(SourceId::Microblog).signals.follower_count;

    if findings.is_empty() && mention_count == 0 {
        return ComponentScore::new(
            Component::SocialMedia,
            MIDPOINT_SCORE,
            "no social data available; midpoint default applied",
        );
    }

    let payload = serde_json::json!({
        "mention_count": mention_count,
        "follower_count": follower_count,
        "mentions": snippet_texts(&findings),
    });

    judged_score(
        judge,
        Component::SocialMedia,
        rubrics::SOCIAL_MEDIA,
        payload,
        warnings,
    )
    .await
}

/// Customer support component: judge over support-related snippets; when
/// substantial text exists with no support mentions at all, the quiet
/// signal itself scores above the midpoint.
pub(crate) async fn score_customer_support(
    judge: &dyn Judge,
    record: &AggregateRecord,
    warnings: &mut Vec<String>,
) -> ComponentScore {
    let findings = record.all_findings();
    let support_findings: Vec<&Finding> = findings
        .iter()
        .filter(|f| {
            let lower = f.text.to_lowercase();
            SUPPORT_KEYWORDS.iter().any(|k| lower.contains(k))
        })
        .copied()
        .collect();

    if support_findings.is_empty() {
        if findings.len() >= QUIET_SUPPORT_MIN_FINDINGS {
            return ComponentScore::new(
                Component::CustomerSupport,
                QUIET_SUPPORT_SCORE,
                format!(
                    "no support complaints across {} collected snippets",
                    findings.len()
                ),
            );
        }
        return ComponentScore::new(
            Component::CustomerSupport,
            MIDPOINT_SCORE,
            "insufficient text to assess support; midpoint default applied",
        );
    }

    let payload = serde_json::json!({
        "support_mention_count": support_findings.len(),
        "total_snippet_count": findings.len(),
        "support_snippets": snippet_texts(&support_findings),
    });

    judged_score(
        judge,
        Component::CustomerSupport,
        rubrics::CUSTOMER_SUPPORT,
        payload,
        warnings,
    )
    .await
}

/// Run one judge call for `component`, falling back to the midpoint (and
/// recording a degradation warning) on any judge error.
async fn judged_score(
    judge: &dyn Judge,
    component: Component,
    rubric: &'static str,
    payload: serde_json::Value,
    warnings: &mut Vec<String>,
) -> ComponentScore {
    let request = JudgeRequest { rubric, payload };
    match judge.judge(&request).await {
        Ok(judgment) => {
            let justification = if judgment.key_factors.is_empty() {
                format!("{} confidence judgment", judgment.confidence)
            } else {
                judgment.key_factors.join("; ")
            };
            ComponentScore::new(component, judgment.score, justification)
        }
        Err(e) => {
            tracing::warn!(component = %component, error = %e, "judge call failed");
            warnings.push(format!(
                "scoring degraded: {} judgment failed: {e}; midpoint default applied",
                component.as_str()
            ));
            ComponentScore::new(
                component,
                MIDPOINT_SCORE,
                "judge unavailable; midpoint default applied",
            )
        }
    }
}

fn snippet_texts(findings: &[&Finding]) -> Vec<String> {
    findings
        .iter()
        .take(MAX_SNIPPETS)
        .map(|f| f.text.clone())
        .collect()
}
