//! Effect calculation for a resolved decision.
//!
//! Everything here is a pure function of its inputs. Randomness only enters
//! through an explicit `random_factor` or a caller-supplied RNG, so tests can
//! pin outcomes exactly.
use rand::Rng;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::constants::{
    DEFAULT_DELAYED_BONUS, FAST_RESPONSE_RESILIENCE, FREEDOM_HEADLINE_THRESHOLD, METRIC_MAX,
    METRIC_MIN, PROPORTIONATE_COUNTER_FACTUAL, SECURITY_HEADLINE_THRESHOLD, SIDE_EFFECT_SCALE,
    SKIP_COUNTER_FACTUAL, SKIP_FATIGUE_GAIN, SKIP_RESILIENCE_PENALTY, SKIP_SECURITY_PENALTY,
    SKIP_TRUST_PENALTY, TRUST_EROSION_AMOUNT, TRUST_EROSION_THRESHOLD, TRUST_LOSS_PER_FREEDOM,
};
use crate::data::{ActionCard, BalanceConfig, Duration, Safeguard, Scope, Speed};
use crate::error::{InternalInconsistency, ValidationError, inconsistency};
use crate::metrics::{MetricDeltas, Metrics};
use crate::numbers::{clamp_metric, count_to_f64};
use crate::ticker::Headline;

/// Distinct safeguards attached to a decision.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SafeguardSet(SmallVec<[Safeguard; 3]>);

impl SafeguardSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn all() -> Self {
        Self(Safeguard::ALL.into_iter().collect())
    }

    /// Build a set, rejecting repeats.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::DuplicateSafeguard`] on the first repeat.
    pub fn try_from_iter(
        safeguards: impl IntoIterator<Item = Safeguard>,
    ) -> Result<Self, ValidationError> {
        let mut set = Self::new();
        for safeguard in safeguards {
            set.insert(safeguard)?;
        }
        Ok(set)
    }

    /// # Errors
    ///
    /// Returns [`ValidationError::DuplicateSafeguard`] if already present.
    pub fn insert(&mut self, safeguard: Safeguard) -> Result<(), ValidationError> {
        if self.contains(safeguard) {
            return Err(ValidationError::DuplicateSafeguard(
                safeguard.as_str().to_string(),
            ));
        }
        self.0.push(safeguard);
        Ok(())
    }

    #[must_use]
    pub fn contains(&self, safeguard: Safeguard) -> bool {
        self.0.contains(&safeguard)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = Safeguard> + '_ {
        self.0.iter().copied()
    }

    fn first_repeat(&self) -> Option<Safeguard> {
        self.0
            .iter()
            .enumerate()
            .find(|(idx, item)| self.0[..*idx].contains(item))
            .map(|(_, item)| *item)
    }
}

/// Scope, duration, and safeguards chosen alongside an action.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modifiers {
    pub scope: Scope,
    pub duration: Duration,
    pub safeguards: SafeguardSet,
}

impl Modifiers {
    #[must_use]
    pub const fn new(scope: Scope, duration: Duration, safeguards: SafeguardSet) -> Self {
        Self {
            scope,
            duration,
            safeguards,
        }
    }

    /// # Errors
    ///
    /// Returns [`ValidationError::DuplicateSafeguard`] if a deserialized set
    /// repeats an entry.
    pub fn validate(&self) -> Result<(), ValidationError> {
        match self.safeguards.first_repeat() {
            Some(repeated) => Err(ValidationError::DuplicateSafeguard(
                repeated.as_str().to_string(),
            )),
            None => Ok(()),
        }
    }
}

/// Intermediate quantities of the effect formula.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EffectBreakdown {
    pub random_factor: f64,
    pub scope_multiplier: f64,
    pub duration_multiplier: f64,
    pub safeguard_quality: f64,
    pub security_delta: f64,
    pub freedom_cost: f64,
    pub trust_delta: f64,
    pub resilience_delta: f64,
    pub fatigue_delta: f64,
}

impl EffectBreakdown {
    #[must_use]
    pub const fn deltas(&self) -> MetricDeltas {
        MetricDeltas {
            security: self.security_delta,
            freedom: -self.freedom_cost,
            public_trust: self.trust_delta,
            resilience: self.resilience_delta,
            fatigue: self.fatigue_delta,
        }
    }
}

/// Outcome of the immediate-effects pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EffectResult {
    pub metrics: Metrics,
    pub budget: u32,
    pub human_resources: u32,
    pub counter_factual: String,
    pub headlines: Vec<Headline>,
    pub breakdown: Option<EffectBreakdown>,
    pub skipped: bool,
}

/// Draw the per-decision variance factor from the configured range.
pub fn draw_random_factor<R: Rng + ?Sized>(balance: &BalanceConfig, rng: &mut R) -> f64 {
    let (min, max) = (balance.random_min(), balance.random_max());
    if min >= max {
        return min;
    }
    rng.gen_range(min..=max)
}

/// Resolve a chosen action into new metrics and resources.
///
/// # Errors
///
/// Returns [`InternalInconsistency`] if the action costs more than the
/// remaining resources; callers gate affordability before resolving.
pub fn calculate_effects(
    balance: &BalanceConfig,
    metrics: &Metrics,
    budget: u32,
    human_resources: u32,
    action: &ActionCard,
    modifiers: &Modifiers,
    random_factor: f64,
) -> Result<EffectResult, InternalInconsistency> {
    let budget = budget.checked_sub(action.cost).ok_or_else(|| {
        inconsistency(format!(
            "action `{}` resolved with insufficient budget",
            action.id
        ))
    })?;
    let human_resources = human_resources.checked_sub(action.hr_cost).ok_or_else(|| {
        inconsistency(format!(
            "action `{}` resolved with insufficient staff",
            action.id
        ))
    })?;

    let scope_multiplier = balance.scope_multipliers.get(modifiers.scope);
    let duration_multiplier = balance.duration_multipliers.get(modifiers.duration);
    let safeguard_quality =
        count_to_f64(modifiers.safeguards.len()) * balance.safeguard_quality_per_item;
    let transparency = modifiers.safeguards.contains(Safeguard::Transparency);

    let security_delta = balance.threat_severity * action.security_effect / 100.0
        - action.side_effect_risk * random_factor * SIDE_EFFECT_SCALE;
    let mitigation = 1.0 - safeguard_quality * action.safeguard_reduction;
    let freedom_cost = action.freedom_cost * scope_multiplier * duration_multiplier * mitigation;
    let trust_boost = if transparency {
        balance.trust_boost_for_transparency
    } else {
        0.0
    };
    let trust_delta = trust_boost - freedom_cost * TRUST_LOSS_PER_FREEDOM;
    let resilience_delta = match action.speed {
        Speed::Slow => action.security_effect * safeguard_quality / 2.0,
        Speed::Fast | Speed::Medium => FAST_RESPONSE_RESILIENCE,
    };
    let fatigue_delta = duration_multiplier * balance.fatigue_per_duration.get(modifiers.scope);

    let breakdown = EffectBreakdown {
        random_factor,
        scope_multiplier,
        duration_multiplier,
        safeguard_quality,
        security_delta,
        freedom_cost,
        trust_delta,
        resilience_delta,
        fatigue_delta,
    };

    let mut headlines = Vec::new();
    if security_delta > SECURITY_HEADLINE_THRESHOLD {
        headlines.push(Headline::SecurityUp {
            action_name: action.name.clone(),
        });
    }
    if freedom_cost > FREEDOM_HEADLINE_THRESHOLD {
        headlines.push(Headline::FreedomDebate);
    }
    if transparency {
        headlines.push(Headline::TransparencyReport);
    }

    log::debug!(
        "resolved action `{}` ({}/{}, {} safeguards, factor {random_factor:.3}): security {security_delta:+.2}, freedom -{freedom_cost:.2}",
        action.id,
        modifiers.scope,
        modifiers.duration,
        modifiers.safeguards.len()
    );

    Ok(EffectResult {
        metrics: metrics.with_deltas(&breakdown.deltas()),
        budget,
        human_resources,
        counter_factual: action
            .counter_factual
            .clone()
            .unwrap_or_else(|| PROPORTIONATE_COUNTER_FACTUAL.to_string()),
        headlines,
        breakdown: Some(breakdown),
        skipped: false,
    })
}

/// Penalty outcome for a crisis the player could not answer.
#[must_use]
pub fn calculate_skip_effects(metrics: &Metrics, budget: u32, human_resources: u32) -> EffectResult {
    let deltas = MetricDeltas {
        security: SKIP_SECURITY_PENALTY,
        freedom: 0.0,
        public_trust: SKIP_TRUST_PENALTY,
        resilience: SKIP_RESILIENCE_PENALTY,
        fatigue: SKIP_FATIGUE_GAIN,
    };
    log::debug!("crisis skipped for lack of resources");
    EffectResult {
        metrics: metrics.with_deltas(&deltas),
        budget,
        human_resources,
        counter_factual: SKIP_COUNTER_FACTUAL.to_string(),
        headlines: vec![Headline::ResourceShortfall],
        breakdown: None,
        skipped: true,
    }
}

/// Result of the delayed-effects pass.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DelayedOutcome {
    pub previous: Metrics,
    pub metrics: Metrics,
    pub bonus: f64,
    pub trust_eroded: bool,
}

/// The bonus an outcome earns once the dust settles.
#[must_use]
pub fn delayed_bonus_for(action: Option<&ActionCard>) -> f64 {
    action
        .and_then(|card| card.delayed_bonus)
        .unwrap_or(DEFAULT_DELAYED_BONUS)
}

/// Apply the delayed pass with an explicit erosion roll in `[0, 1)`.
#[must_use]
pub fn delayed_effects_with_roll(metrics: &Metrics, bonus: f64, roll: f64) -> DelayedOutcome {
    let mut next = *metrics;
    next.security = (next.security + bonus).min(METRIC_MAX);
    next.resilience = (next.resilience + bonus).min(METRIC_MAX);
    let trust_eroded = roll > TRUST_EROSION_THRESHOLD;
    if trust_eroded {
        next.public_trust = (next.public_trust - TRUST_EROSION_AMOUNT).max(METRIC_MIN);
    }
    next.security = clamp_metric(next.security);
    next.resilience = clamp_metric(next.resilience);
    DelayedOutcome {
        previous: *metrics,
        metrics: next,
        bonus,
        trust_eroded,
    }
}

/// Apply the delayed pass, drawing the erosion roll from `rng`.
pub fn apply_delayed_effects<R: Rng + ?Sized>(
    metrics: &Metrics,
    bonus: f64,
    rng: &mut R,
) -> DelayedOutcome {
    let roll: f64 = rng.r#gen();
    delayed_effects_with_roll(metrics, bonus, roll)
}
