//! Trust-score assembly: runs the five component scorers over an aggregate
//! record and combines them into the final weighted score.

use brandlens_core::{AggregateRecord, TrustScore};

use crate::components;
use crate::judge::Judge;

/// Result of one scoring pass: the trust score plus any degradation
/// warnings accumulated along the way.
#[derive(Debug)]
pub struct ScoringOutcome {
    pub trust: TrustScore,
    pub warnings: Vec<String>,
}

/// Computes the weighted trust score for an aggregate record.
///
/// Deterministic for a fixed record and a fixed judge: the only
/// non-determinism comes from the judge implementation itself.
pub struct TrustScorer {
    judge: Box<dyn Judge>,
}

impl TrustScorer {
    #[must_use]
    pub fn new(judge: Box<dyn Judge>) -> Self {
        Self { judge }
    }

    /// Score `record`.
    ///
    /// Judge calls run sequentially after collection has completed; a judge
    /// failure downgrades the affected components to the midpoint instead
    /// of aborting, with the reason recorded in the outcome's warnings.
    pub async fn score(&self, record: &AggregateRecord) -> ScoringOutcome {
        let mut warnings = Vec::new();
        let judge = self.judge.as_ref();

        let ratings = components::score_ratings(record);
        let sentiment = components::score_review_sentiment(judge, record, &mut warnings).await;
        let legitimacy = components::score_business_legitimacy(record);
        let social = components::score_social_media(judge, record, &mut warnings).await;
        let support = components::score_customer_support(judge, record, &mut warnings).await;

        let trust =
            TrustScore::from_components(vec![ratings, sentiment, legitimacy, social, support]);

        tracing::info!(
            final_score = trust.final_score,
            interpretation = %trust.interpretation,
            warnings = warnings.len(),
            "trust scoring finished"
        );

        ScoringOutcome { trust, warnings }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    use brandlens_core::{
        Component, Finding, ScoreBand, SignalSet, SourceId, SourceResult, MIDPOINT_SCORE,
    };
    use futures::future::BoxFuture;

    use super::*;
    use crate::error::JudgeError;
    use crate::judge::{JudgeRequest, Judgment};

    /// Judge double returning a fixed score, counting invocations through a
    /// shared counter.
    struct StubJudge {
        score: f64,
        calls: Arc<AtomicU32>,
    }

    impl StubJudge {
        fn scoring(score: f64) -> Self {
            Self {
                score,
                calls: Arc::new(AtomicU32::new(0)),
            }
        }

        fn with_counter(score: f64, calls: Arc<AtomicU32>) -> Self {
            Self { score, calls }
        }
    }

    impl Judge for StubJudge {
        fn judge<'a>(
            &'a self,
            _request: &'a JudgeRequest,
        ) -> BoxFuture<'a, Result<Judgment, JudgeError>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Box::pin(async move {
                Ok(Judgment {
                    score: self.score,
                    confidence: "High".to_string(),
                    key_factors: vec!["stub factor".to_string()],
                })
            })
        }
    }

    /// Judge double that always fails with an auth error.
    struct FailingJudge;

    impl Judge for FailingJudge {
        fn judge<'a>(
            &'a self,
            _request: &'a JudgeRequest,
        ) -> BoxFuture<'a, Result<Judgment, JudgeError>> {
            Box::pin(async { Err(JudgeError::Auth("invalid api key".to_string())) })
        }
    }

    fn component_score(outcome: &ScoringOutcome, component: Component) -> f64 {
        outcome
            .trust
            .components
            .iter()
            .find(|c| c.component == component)
            .expect("component present")
            .score
    }

    fn all_failed_record() -> AggregateRecord {
        AggregateRecord::new(
            SourceId::ALL
                .iter()
                .map(|&s| SourceResult::failed(s, "unavailable"))
                .collect(),
        )
    }

    fn rich_record() -> AggregateRecord {
        let mut review_findings: Vec<Finding> = (0..12)
            .map(|i| Finding::new(format!("review {i}: works well and arrived on time"), None))
            .collect();
        review_findings.push(Finding::new(
            "customer service replaced my unit within a week",
            None,
        ));
        AggregateRecord::new(vec![
            SourceResult::ok(
                SourceId::Ratings,
                review_findings,
                SignalSet {
                    average_rating: Some(4.4),
                    review_count: Some(800),
                    ..SignalSet::default()
                },
            ),
            SourceResult::ok(
                SourceId::Discussions,
                vec![Finding::new("long thread praising the kettle", None)],
                SignalSet {
                    mention_count: Some(1),
                    ..SignalSet::default()
                },
            ),
            SourceResult::skipped(SourceId::Microblog, "no social handle provided"),
            SourceResult::ok(
                SourceId::WebsiteTrust,
                vec![Finding::new("Valid TLS certificate (HTTPS enabled)", None)],
                SignalSet {
                    ssl_valid: Some(true),
                    site_trust_points: Some(82),
                    ..SignalSet::default()
                },
            ),
        ])
    }

    #[tokio::test]
    async fn all_sources_failed_scores_weighted_midpoints_without_judge_calls() {
        let calls = Arc::new(AtomicU32::new(0));
        let scorer = TrustScorer::new(Box::new(StubJudge::with_counter(9.9, Arc::clone(&calls))));

        let outcome = scorer.score(&all_failed_record()).await;

        for component in Component::ALL {
            assert!(
                (component_score(&outcome, component) - MIDPOINT_SCORE).abs() < 1e-9,
                "{component} should sit at the midpoint"
            );
        }
        assert!((outcome.trust.final_score - 5.0).abs() < 1e-9);
        assert_eq!(outcome.trust.interpretation, ScoreBand::BelowAverage);
        assert_eq!(
            calls.load(Ordering::SeqCst),
            0,
            "no text anywhere means the judge is never consulted"
        );
    }

    #[tokio::test]
    async fn judge_failure_degrades_qualitative_components_to_midpoint() {
        let scorer = TrustScorer::new(Box::new(FailingJudge));
        let outcome = scorer.score(&rich_record()).await;

        for component in [
            Component::ReviewSentiment,
            Component::SocialMedia,
            Component::CustomerSupport,
        ] {
            assert!(
                (component_score(&outcome, component) - MIDPOINT_SCORE).abs() < 1e-9,
                "{component} should fall back to the midpoint"
            );
        }
        // Deterministic components are untouched by judge failures.
        assert!(component_score(&outcome, Component::Ratings) > 8.0);
        assert!((component_score(&outcome, Component::BusinessLegitimacy) - 8.2).abs() < 1e-9);

        assert_eq!(outcome.warnings.len(), 3);
        for warning in &outcome.warnings {
            assert!(
                warning.contains("scoring degraded"),
                "warning should be marked as degradation: {warning}"
            );
            assert!(warning.contains("invalid api key"));
        }
    }

    #[tokio::test]
    async fn scoring_is_deterministic_for_fixed_record_and_judge() {
        let record = rich_record();

        let first = TrustScorer::new(Box::new(StubJudge::scoring(7.2)))
            .score(&record)
            .await;
        let second = TrustScorer::new(Box::new(StubJudge::scoring(7.2)))
            .score(&record)
            .await;

        let first_json = serde_json::to_value(&first.trust).unwrap();
        let second_json = serde_json::to_value(&second.trust).unwrap();
        assert_eq!(first_json, second_json);
        assert_eq!(first.warnings, second.warnings);
    }

    #[tokio::test]
    async fn judge_scores_above_range_are_clamped() {
        let scorer = TrustScorer::new(Box::new(StubJudge::scoring(42.0)));
        let outcome = scorer.score(&rich_record()).await;
        assert!((component_score(&outcome, Component::ReviewSentiment) - 10.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn component_order_and_weights_are_fixed() {
        let scorer = TrustScorer::new(Box::new(StubJudge::scoring(6.0)));
        let outcome = scorer.score(&rich_record()).await;

        let order: Vec<Component> = outcome
            .trust
            .components
            .iter()
            .map(|c| c.component)
            .collect();
        assert_eq!(
            order,
            vec![
                Component::Ratings,
                Component::ReviewSentiment,
                Component::BusinessLegitimacy,
                Component::SocialMedia,
                Component::CustomerSupport,
            ]
        );
        let weight_sum: f64 = outcome.trust.components.iter().map(|c| c.weight).sum();
        assert!((weight_sum - 1.0).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn ratings_volume_confidence_discounts_low_volume() {
        fn ratings_only_record(average: f64, count: u64) -> AggregateRecord {
            AggregateRecord::new(vec![SourceResult::ok(
                SourceId::Ratings,
                Vec::new(),
                SignalSet {
                    average_rating: Some(average),
                    review_count: Some(count),
                    ..SignalSet::default()
                },
            )])
        }

        let scorer = TrustScorer::new(Box::new(StubJudge::scoring(5.0)));
        let low_volume = scorer.score(&ratings_only_record(4.8, 3)).await;
        let high_volume = scorer.score(&ratings_only_record(4.8, 3000)).await;

        let low = component_score(&low_volume, Component::Ratings);
        let high = component_score(&high_volume, Component::Ratings);
        assert!(
            low < high,
            "same average over 3 reviews ({low}) must score below 3000 reviews ({high})"
        );
        assert!(low > MIDPOINT_SCORE, "positive average stays above midpoint");
    }

    #[tokio::test]
    async fn quiet_support_signal_scores_above_midpoint() {
        // Plenty of review text, none of it touching support topics.
        let record = AggregateRecord::new(vec![SourceResult::ok(
            SourceId::Ratings,
            (0..15)
                .map(|i| Finding::new(format!("review {i}: tastes great and looks good"), None))
                .collect(),
            SignalSet {
                average_rating: Some(4.2),
                review_count: Some(200),
                ..SignalSet::default()
            },
        )]);

        let scorer = TrustScorer::new(Box::new(StubJudge::scoring(6.0)));
        let outcome = scorer.score(&record).await;
        assert!((component_score(&outcome, Component::CustomerSupport) - 7.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn brand_only_query_shape_scores_in_range() {
        // Mirrors a run where only the brand name was provided: optional
        // sources skipped, ratings failed.
        let record = AggregateRecord::new(vec![
            SourceResult::failed(SourceId::Ratings, "no products matched brand 'x'"),
            SourceResult::ok(
                SourceId::Discussions,
                vec![Finding::new("mixed feelings about the brand", None)],
                SignalSet {
                    mention_count: Some(1),
                    ..SignalSet::default()
                },
            ),
            SourceResult::skipped(SourceId::Microblog, "no social handle provided"),
            SourceResult::skipped(SourceId::WebsiteTrust, "no website URL provided"),
        ]);

        let scorer = TrustScorer::new(Box::new(StubJudge::scoring(6.5)));
        let outcome = scorer.score(&record).await;
        assert!(outcome.trust.final_score >= 0.0 && outcome.trust.final_score <= 10.0);
    }
}
