//! End game scoring and leadership classification
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::constants::{
    SCORE_EXCELLENT_ABOVE, SCORE_GOOD_ABOVE, STYLE_HIGH, STYLE_LOW, STYLE_RESILIENCE_ABOVE,
    STYLE_TRUST_ABOVE,
};
use crate::metrics::Metrics;
use crate::numbers::round_to_tenth;
use crate::state::GameState;

/// Score band for the leadership score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoreTier {
    Excellent,
    Good,
    Poor,
}

impl ScoreTier {
    #[must_use]
    pub fn from_score(score: f64) -> Self {
        if score > SCORE_EXCELLENT_ABOVE {
            Self::Excellent
        } else if score > SCORE_GOOD_ABOVE {
            Self::Good
        } else {
            Self::Poor
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Excellent => "excellent",
            Self::Good => "good",
            Self::Poor => "poor",
        }
    }

    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::Excellent => "Excellent! You kept security, freedom and public trust in balance.",
            Self::Good => "Good work, though some goals could have been reached at a lower cost.",
            Self::Poor => "A hard road. Try more safeguards and more targeted measures.",
        }
    }
}

impl fmt::Display for ScoreTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How the player governed, judged from the final metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeadershipStyle {
    AuthoritarianTactician,
    FreedomChampion,
    CommunityBuilder,
    BalancedStrategist,
}

impl LeadershipStyle {
    pub const ALL: [Self; 4] = [
        Self::AuthoritarianTactician,
        Self::FreedomChampion,
        Self::CommunityBuilder,
        Self::BalancedStrategist,
    ];

    /// First matching rule wins.
    #[must_use]
    pub fn classify(metrics: &Metrics) -> Self {
        if metrics.security > STYLE_HIGH && metrics.freedom < STYLE_LOW {
            Self::AuthoritarianTactician
        } else if metrics.freedom > STYLE_HIGH && metrics.security < STYLE_LOW {
            Self::FreedomChampion
        } else if metrics.public_trust > STYLE_TRUST_ABOVE
            && metrics.resilience > STYLE_RESILIENCE_ABOVE
        {
            Self::CommunityBuilder
        } else {
            Self::BalancedStrategist
        }
    }

    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::AuthoritarianTactician => "authoritarian_tactician",
            Self::FreedomChampion => "freedom_champion",
            Self::CommunityBuilder => "community_builder",
            Self::BalancedStrategist => "balanced_strategist",
        }
    }

    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::AuthoritarianTactician => "Authoritarian Tactician",
            Self::FreedomChampion => "Freedom Champion",
            Self::CommunityBuilder => "Community Builder",
            Self::BalancedStrategist => "Balanced Strategist",
        }
    }

    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::AuthoritarianTactician => {
                "In moments of crisis you put security above everything, and freedoms paid the price."
            }
            Self::FreedomChampion => {
                "You prioritized individual freedoms and civil rights, sometimes at the expense of security."
            }
            Self::CommunityBuilder => {
                "You focused on earning public trust and building long-term resilience, a sustainable way to govern."
            }
            Self::BalancedStrategist => {
                "You tried to strike a balance between security, freedom and public trust in your decisions."
            }
        }
    }
}

impl fmt::Display for LeadershipStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

/// Mean of security, freedom and public trust.
#[must_use]
pub fn leadership_score(metrics: &Metrics) -> f64 {
    (metrics.security + metrics.freedom + metrics.public_trust) / 3.0
}

/// Everything the end screen shows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultSummary {
    pub final_metrics: Metrics,
    pub score: f64,
    pub tier: ScoreTier,
    pub tier_message: String,
    pub style: LeadershipStyle,
    pub style_title: String,
    pub style_description: String,
    pub crises_resolved: usize,
    pub crises_total: usize,
    pub crises_skipped: usize,
    pub budget_left: u32,
    pub human_resources_left: u32,
}

impl ResultSummary {
    #[must_use]
    pub fn from_metrics(final_metrics: Metrics) -> Self {
        let score = leadership_score(&final_metrics);
        let tier = ScoreTier::from_score(score);
        let style = LeadershipStyle::classify(&final_metrics);
        Self {
            final_metrics,
            score,
            tier,
            tier_message: tier.message().to_string(),
            style,
            style_title: style.title().to_string(),
            style_description: style.description().to_string(),
            crises_resolved: 0,
            crises_total: 0,
            crises_skipped: 0,
            budget_left: 0,
            human_resources_left: 0,
        }
    }

    #[must_use]
    pub fn display_score(&self) -> f64 {
        round_to_tenth(self.score)
    }
}

/// Summarize a session from its final (or currently observed) metrics.
#[must_use]
pub fn result_summary(state: &GameState) -> ResultSummary {
    ResultSummary {
        crises_resolved: state.decisions.len(),
        crises_total: state.total_crises(),
        crises_skipped: state.decisions.iter().filter(|d| d.skipped).count(),
        budget_left: state.budget,
        human_resources_left: state.human_resources,
        ..ResultSummary::from_metrics(state.final_or_observed())
    }
}
