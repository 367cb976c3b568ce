//! Weighted trust-score model: the five components, their fixed weights,
//! and the interpretation bands.

use serde::{Deserialize, Serialize};

/// Default score applied when a component's data is unavailable.
///
/// Unavailable data drags the final score toward this midpoint; component
/// weights are never redistributed.
pub const MIDPOINT_SCORE: f64 = 5.0;

/// The five scored components. Weights are fixed and sum to 1.0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Component {
    Ratings,
    ReviewSentiment,
    BusinessLegitimacy,
    SocialMedia,
    CustomerSupport,
}

impl Component {
    pub const ALL: [Component; 5] = [
        Component::Ratings,
        Component::ReviewSentiment,
        Component::BusinessLegitimacy,
        Component::SocialMedia,
        Component::CustomerSupport,
    ];

    /// Fixed weight of this component in the final score.
    #[must_use]
    pub fn weight(self) -> f64 {
        match self {
            Component::Ratings => 0.55,
            Component::ReviewSentiment => 0.20,
            Component::BusinessLegitimacy | Component::SocialMedia => 0.10,
            Component::CustomerSupport => 0.05,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Component::Ratings => "ratings",
            Component::ReviewSentiment => "review_sentiment",
            Component::BusinessLegitimacy => "business_legitimacy",
            Component::SocialMedia => "social_media",
            Component::CustomerSupport => "customer_support",
        }
    }

    /// Human-readable name used in CLI output and report summaries.
    #[must_use]
    pub fn display_name(self) -> &'static str {
        match self {
            Component::Ratings => "Ratings",
            Component::ReviewSentiment => "Review Sentiment",
            Component::BusinessLegitimacy => "Business Legitimacy",
            Component::SocialMedia => "Social Media",
            Component::CustomerSupport => "Customer Support",
        }
    }
}

impl std::fmt::Display for Component {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One scored component with its weight and a short justification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentScore {
    pub component: Component,
    pub score: f64,
    pub weight: f64,
    pub justification: String,
}

impl ComponentScore {
    /// Build a component score, clamping `score` into `[0, 10]` and taking
    /// the weight from the component itself.
    #[must_use]
    pub fn new(component: Component, score: f64, justification: impl Into<String>) -> Self {
        Self {
            component,
            score: score.clamp(0.0, 10.0),
            weight: component.weight(),
            justification: justification.into(),
        }
    }

    /// Contribution of this component to the final score, rounded to two
    /// decimals.
    #[must_use]
    pub fn contribution(&self) -> f64 {
        (self.score * self.weight * 100.0).round() / 100.0
    }
}

/// Categorical interpretation of a final score, with fixed inclusive
/// lower-bound breakpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScoreBand {
    #[serde(rename = "Excellent - Strong buy confidence")]
    Excellent,
    #[serde(rename = "Good - Generally trustworthy")]
    Good,
    #[serde(rename = "Average - Proceed with research")]
    Average,
    #[serde(rename = "Below Average - Significant concerns")]
    BelowAverage,
    #[serde(rename = "Poor - High risk, consider alternatives")]
    Poor,
}

impl ScoreBand {
    /// Map a score in `[0, 10]` to its band.
    #[must_use]
    pub fn for_score(score: f64) -> Self {
        if score >= 8.5 {
            ScoreBand::Excellent
        } else if score >= 7.0 {
            ScoreBand::Good
        } else if score >= 5.5 {
            ScoreBand::Average
        } else if score >= 4.0 {
            ScoreBand::BelowAverage
        } else {
            ScoreBand::Poor
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            ScoreBand::Excellent => "Excellent - Strong buy confidence",
            ScoreBand::Good => "Good - Generally trustworthy",
            ScoreBand::Average => "Average - Proceed with research",
            ScoreBand::BelowAverage => "Below Average - Significant concerns",
            ScoreBand::Poor => "Poor - High risk, consider alternatives",
        }
    }
}

impl std::fmt::Display for ScoreBand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Final weighted trust score with its component breakdown.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrustScore {
    pub components: Vec<ComponentScore>,
    pub final_score: f64,
    pub interpretation: ScoreBand,
}

impl TrustScore {
    /// Combine component scores into the final weighted score.
    ///
    /// The weighted sum is clamped to `[0, 10]` and rounded to one decimal;
    /// the interpretation band is derived from the rounded value.
    #[must_use]
    pub fn from_components(components: Vec<ComponentScore>) -> Self {
        let raw: f64 = components.iter().map(|c| c.score * c.weight).sum();
        let final_score = (raw.clamp(0.0, 10.0) * 10.0).round() / 10.0;
        Self {
            components,
            final_score,
            interpretation: ScoreBand::for_score(final_score),
        }
    }
}
