use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crisis_game::gate::affordable;
use crisis_game::{ActionCard, Duration, GameState, Safeguard, SafeguardSet, Scenario, Scope};
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;

/// Decision returned by a [`PlayerPolicy`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyDecision {
    pub action_id: String,
    pub scope: Scope,
    pub duration: Duration,
    pub safeguards: SafeguardSet,
    pub rationale: Option<String>,
}

impl PolicyDecision {
    #[must_use]
    pub fn new(
        card: &ActionCard,
        scope: Scope,
        duration: Duration,
        safeguards: SafeguardSet,
    ) -> Self {
        Self {
            action_id: card.id.clone(),
            scope,
            duration,
            safeguards,
            rationale: None,
        }
    }

    #[must_use]
    pub fn with_rationale(mut self, rationale: impl Into<String>) -> Self {
        self.rationale = Some(rationale.into());
        self
    }
}

/// Policy interface for automated play strategies.
pub trait PlayerPolicy {
    /// Name used for logging/debug output.
    fn name(&self) -> &'static str;

    /// Pick an action for the current crisis. Only called when at least one
    /// card is affordable; `None` means the policy found nothing it would play.
    fn decide(&mut self, state: &GameState, scenario: &Scenario) -> Option<PolicyDecision>;
}

/// Built-in gameplay strategies for automated runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum GameplayStrategy {
    Cautious,
    Hawkish,
    Balanced,
    Frugal,
    Random,
}

impl GameplayStrategy {
    pub const ALL: [Self; 5] = [
        Self::Cautious,
        Self::Hawkish,
        Self::Balanced,
        Self::Frugal,
        Self::Random,
    ];

    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Cautious => "cautious",
            Self::Hawkish => "hawkish",
            Self::Balanced => "balanced",
            Self::Frugal => "frugal",
            Self::Random => "random",
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Cautious => "Cautious",
            Self::Hawkish => "Hawkish",
            Self::Balanced => "Balanced",
            Self::Frugal => "Frugal",
            Self::Random => "Random",
        }
    }

    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::Cautious => "Lowest freedom cost, targeted and short, every safeguard",
            Self::Hawkish => "Highest security effect, general and long, no safeguards",
            Self::Balanced => "Best security-minus-freedom trade, medium duration, transparency",
            Self::Frugal => "Cheapest affordable action, targeted and short, sunset clause",
            Self::Random => "Uniformly random action and modifiers (ChaCha20 seeded)",
        }
    }

    #[must_use]
    pub fn create_policy(self, seed: u64) -> Box<dyn PlayerPolicy + Send> {
        match self {
            Self::Cautious => Box::new(CautiousPolicy),
            Self::Hawkish => Box::new(HawkishPolicy),
            Self::Balanced => Box::new(BalancedPolicy),
            Self::Frugal => Box::new(FrugalPolicy),
            Self::Random => Box::new(RandomPolicy::new(seed)),
        }
    }
}

impl fmt::Display for GameplayStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for GameplayStrategy {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|strategy| strategy.key() == wanted)
            .ok_or(())
    }
}

struct CautiousPolicy;
struct HawkishPolicy;
struct BalancedPolicy;
struct FrugalPolicy;

struct RandomPolicy {
    rng: ChaCha20Rng,
}

impl RandomPolicy {
    fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha20Rng::seed_from_u64(seed),
        }
    }
}

fn affordable_cards<'s>(state: &GameState, scenario: &'s Scenario) -> Vec<&'s ActionCard> {
    affordable(&scenario.action_cards, state.budget, state.human_resources)
}

fn best_by<'s>(
    cards: Vec<&'s ActionCard>,
    mut cmp: impl FnMut(&ActionCard, &ActionCard) -> Ordering,
) -> Option<&'s ActionCard> {
    cards.into_iter().min_by(|a, b| cmp(*a, *b))
}

impl PlayerPolicy for CautiousPolicy {
    fn name(&self) -> &'static str {
        "Cautious"
    }

    fn decide(&mut self, state: &GameState, scenario: &Scenario) -> Option<PolicyDecision> {
        let card = best_by(affordable_cards(state, scenario), |a, b| {
            a.freedom_cost.total_cmp(&b.freedom_cost)
        })?;
        Some(
            PolicyDecision::new(card, Scope::Targeted, Duration::Short, SafeguardSet::all())
                .with_rationale(format!("freedom cost {}", card.freedom_cost)),
        )
    }
}

impl PlayerPolicy for HawkishPolicy {
    fn name(&self) -> &'static str {
        "Hawkish"
    }

    fn decide(&mut self, state: &GameState, scenario: &Scenario) -> Option<PolicyDecision> {
        let card = best_by(affordable_cards(state, scenario), |a, b| {
            b.security_effect.total_cmp(&a.security_effect)
        })?;
        Some(
            PolicyDecision::new(card, Scope::General, Duration::Long, SafeguardSet::new())
                .with_rationale(format!("security effect {}", card.security_effect)),
        )
    }
}

impl PlayerPolicy for BalancedPolicy {
    fn name(&self) -> &'static str {
        "Balanced"
    }

    fn decide(&mut self, state: &GameState, scenario: &Scenario) -> Option<PolicyDecision> {
        let trade = |card: &ActionCard| card.security_effect - card.freedom_cost;
        let card = best_by(affordable_cards(state, scenario), |a, b| {
            trade(b).total_cmp(&trade(a))
        })?;
        let mut safeguards = SafeguardSet::new();
        safeguards.insert(Safeguard::Transparency).ok()?;
        Some(
            PolicyDecision::new(card, Scope::Targeted, Duration::Medium, safeguards)
                .with_rationale(format!("trade {:+}", trade(card))),
        )
    }
}

impl PlayerPolicy for FrugalPolicy {
    fn name(&self) -> &'static str {
        "Frugal"
    }

    fn decide(&mut self, state: &GameState, scenario: &Scenario) -> Option<PolicyDecision> {
        let card = best_by(affordable_cards(state, scenario), |a, b| {
            (a.cost + a.hr_cost).cmp(&(b.cost + b.hr_cost))
        })?;
        let mut safeguards = SafeguardSet::new();
        safeguards.insert(Safeguard::Sunset).ok()?;
        Some(
            PolicyDecision::new(card, Scope::Targeted, Duration::Short, safeguards)
                .with_rationale(format!("cost {}+{}", card.cost, card.hr_cost)),
        )
    }
}

impl PlayerPolicy for RandomPolicy {
    fn name(&self) -> &'static str {
        "Random"
    }

    fn decide(&mut self, state: &GameState, scenario: &Scenario) -> Option<PolicyDecision> {
        let cards = affordable_cards(state, scenario);
        let card = *cards.choose(&mut self.rng)?;
        let scope = *Scope::ALL.choose(&mut self.rng)?;
        let duration = *Duration::ALL.choose(&mut self.rng)?;
        let mut safeguards = SafeguardSet::new();
        for safeguard in Safeguard::ALL {
            if self.rng.gen_bool(0.5) {
                safeguards.insert(safeguard).ok()?;
            }
        }
        Some(PolicyDecision::new(card, scope, duration, safeguards))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crisis_game::ContentBundle;

    fn fixture() -> (ContentBundle, GameState) {
        let content = ContentBundle::load_from_static().unwrap();
        let mut state = GameState::new(content.settings());
        state.crisis_sequence = vec!["cyber_attack".into()];
        (content, state)
    }

    #[test]
    fn strategies_parse_from_keys() {
        for strategy in GameplayStrategy::ALL {
            assert_eq!(strategy.key().parse::<GameplayStrategy>(), Ok(strategy));
        }
        assert_eq!(" Hawkish ".parse::<GameplayStrategy>(), Ok(GameplayStrategy::Hawkish));
        assert!("reckless".parse::<GameplayStrategy>().is_err());
    }

    #[test]
    fn deterministic_policies_pick_expected_cards() {
        let (content, state) = fixture();
        let scenario = content.scenario("cyber_attack").unwrap();
        let pick = |strategy: GameplayStrategy| {
            strategy
                .create_policy(0)
                .decide(&state, scenario)
                .unwrap()
                .action_id
        };
        assert_eq!(pick(GameplayStrategy::Cautious), "C");
        assert_eq!(pick(GameplayStrategy::Hawkish), "A");
        assert_eq!(pick(GameplayStrategy::Frugal), "B");
    }

    #[test]
    fn policies_only_pick_affordable_cards() {
        let (content, mut state) = fixture();
        state.budget = 20;
        let scenario = content.scenario("cyber_attack").unwrap();
        for strategy in GameplayStrategy::ALL {
            let decision = strategy.create_policy(9).decide(&state, scenario).unwrap();
            assert_eq!(decision.action_id, "C", "{strategy}");
        }
        state.budget = 0;
        assert!(GameplayStrategy::Random.create_policy(9).decide(&state, scenario).is_none());
    }

    #[test]
    fn random_policy_is_seed_deterministic() {
        let (content, state) = fixture();
        let scenario = content.scenario("cyber_attack").unwrap();
        let a = GameplayStrategy::Random.create_policy(5).decide(&state, scenario);
        let b = GameplayStrategy::Random.create_policy(5).decide(&state, scenario);
        assert_eq!(a, b);
    }
}
