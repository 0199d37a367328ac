use std::collections::HashSet;
use std::sync::Arc;

use crisis_game::constants::NEWS_TICKER_CAPACITY;
use crisis_game::{
    ContentBundle, Duration, GameError, GamePhase, GameSession, GameState, PlayerAction,
    ResultSummary, SafeguardSet, Scenario, Scope, ValidationError, affordable, is_blocked,
    leadership_score,
};
use thiserror::Error;

use crate::logic::policy::{GameplayStrategy, PlayerPolicy, PolicyDecision};

pub const DEFAULT_MAX_STEPS: usize = 256;

#[derive(Debug, Error)]
pub enum SimulationError {
    #[error(transparent)]
    Engine(#[from] GameError),
    #[error("game did not finish within {0} steps")]
    StepLimit(usize),
}

/// Configuration for a simulated playthrough.
#[derive(Debug, Clone, Copy)]
pub struct SimulationConfig {
    pub seed: u64,
    pub strategy: GameplayStrategy,
    pub max_steps: usize,
}

impl SimulationConfig {
    #[must_use]
    pub const fn new(strategy: GameplayStrategy, seed: u64) -> Self {
        Self {
            seed,
            strategy,
            max_steps: DEFAULT_MAX_STEPS,
        }
    }
}

/// What the policy did with one crisis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecisionEntry {
    pub crisis_number: usize,
    pub scenario_id: String,
    pub action_id: Option<String>,
    pub policy_name: String,
    pub rationale: Option<String>,
}

impl DecisionEntry {
    #[must_use]
    pub const fn skipped(&self) -> bool {
        self.action_id.is_none()
    }
}

/// Result of one complete simulated game.
#[derive(Debug, Clone)]
pub struct GameOutcome {
    pub seed: u64,
    pub run_code: String,
    pub strategy: GameplayStrategy,
    pub crisis_sequence: Vec<String>,
    pub summary: ResultSummary,
    pub decisions: Vec<DecisionEntry>,
    pub steps: usize,
    pub violations: Vec<String>,
}

impl GameOutcome {
    #[must_use]
    pub fn passed(&self) -> bool {
        self.violations.is_empty()
    }

    #[must_use]
    pub fn skips(&self) -> usize {
        self.decisions.iter().filter(|entry| entry.skipped()).count()
    }
}

/// Play one game to the end screen with `config.strategy`, checking the
/// state invariants after every step.
///
/// # Errors
///
/// Returns an error if the engine rejects an action or the game runs past
/// the step limit.
pub fn run_game(
    content: Arc<ContentBundle>,
    config: SimulationConfig,
) -> Result<GameOutcome, SimulationError> {
    let mut session = GameSession::new(content, config.seed);
    let mut policy = config.strategy.create_policy(config.seed);
    let mut decisions = Vec::new();
    let mut violations = Vec::new();
    let mut steps = 0;

    session.apply(PlayerAction::Start)?;

    while !session.state().is_over() {
        steps += 1;
        if steps > config.max_steps {
            return Err(SimulationError::StepLimit(config.max_steps));
        }
        check_invariants(&session, &mut violations);

        if session.state().phase == GamePhase::Decision {
            let entry = decide(&mut session, policy.as_mut())?;
            log::debug!(
                "seed {} crisis {}: {} -> {}",
                config.seed,
                entry.crisis_number,
                entry.scenario_id,
                entry.action_id.as_deref().unwrap_or("skip")
            );
            decisions.push(entry);
        } else {
            session.apply(PlayerAction::Advance)?;
        }
    }

    check_invariants(&session, &mut violations);
    check_final(&session, &mut violations);

    let state = session.state();
    Ok(GameOutcome {
        seed: config.seed,
        run_code: session.run_code(),
        strategy: config.strategy,
        crisis_sequence: state.crisis_sequence.clone(),
        summary: session.summary(),
        decisions,
        steps,
        violations,
    })
}

fn decide(
    session: &mut GameSession,
    policy: &mut dyn PlayerPolicy,
) -> Result<DecisionEntry, SimulationError> {
    let state = session.state();
    let scenario_id = state.current_scenario_id().unwrap_or_default().to_string();
    let scenario = session.content().scenario(&scenario_id).map_err(GameError::from)?;
    let mut entry = DecisionEntry {
        crisis_number: state.crisis_number(),
        scenario_id: scenario_id.clone(),
        action_id: None,
        policy_name: policy.name().to_string(),
        rationale: None,
    };

    if is_blocked(&scenario.action_cards, state.budget, state.human_resources) {
        session.apply(PlayerAction::SkipTurn)?;
        return Ok(entry);
    }

    let decision = match policy.decide(state, scenario) {
        Some(decision) => decision,
        None => fallback_decision(state, scenario)?,
    };

    session.apply(PlayerAction::choose(decision.action_id.clone()))?;
    session.apply(PlayerAction::ConfirmDecision {
        scope: decision.scope,
        duration: decision.duration,
        safeguards: decision.safeguards,
    })?;
    entry.action_id = Some(decision.action_id);
    entry.rationale = decision.rationale;
    Ok(entry)
}

fn fallback_decision(
    state: &GameState,
    scenario: &Scenario,
) -> Result<PolicyDecision, SimulationError> {
    let card = affordable(&scenario.action_cards, state.budget, state.human_resources)
        .into_iter()
        .next()
        .ok_or(GameError::Validation(ValidationError::MustSkip))?;
    Ok(
        PolicyDecision::new(card, Scope::Targeted, Duration::Medium, SafeguardSet::new())
            .with_rationale("fallback: first affordable"),
    )
}

fn check_invariants(session: &GameSession, violations: &mut Vec<String>) {
    let state = session.state();
    let settings = session.content().settings();
    let phase = state.phase;

    let observed = state.observed_metrics();
    if !observed.in_range() {
        violations.push(format!("{phase}: metrics out of range {observed:?}"));
    }
    if state.news_ticker.len() > NEWS_TICKER_CAPACITY {
        violations.push(format!(
            "{phase}: ticker holds {} headlines",
            state.news_ticker.len()
        ));
    }
    if state.budget > settings.budget || state.human_resources > settings.hr {
        violations.push(format!(
            "{phase}: resources grew to {}/{}",
            state.budget, state.human_resources
        ));
    }
    if phase == GamePhase::Story && state.metrics_history.len() != state.current_crisis_index + 1 {
        violations.push(format!(
            "story {}: history has {} snapshots",
            state.crisis_number(),
            state.metrics_history.len()
        ));
    }
    let unique: HashSet<&String> = state.crisis_sequence.iter().collect();
    if unique.len() != state.crisis_sequence.len() {
        violations.push(format!("{phase}: crisis sequence repeats a scenario"));
    }
    match session.view() {
        Ok(view) => log::trace!("{}", serde_json::to_string(&view).unwrap_or_default()),
        Err(err) => violations.push(format!("{phase}: view failed: {err}")),
    }
}

fn check_final(session: &GameSession, violations: &mut Vec<String>) {
    let state = session.state();
    let Some(final_metrics) = state.final_metrics else {
        violations.push("game ended without final metrics".to_string());
        return;
    };
    let summary = session.summary();
    if (summary.score - leadership_score(&final_metrics)).abs() > 1e-9 {
        violations.push(format!("score {} does not match final metrics", summary.score));
    }
    let expected = session
        .content()
        .settings()
        .max_crises
        .min(session.content().scenarios.len());
    if state.crisis_sequence.len() != expected {
        violations.push(format!(
            "played {} crises, expected {expected}",
            state.crisis_sequence.len()
        ));
    }
    if state.decisions.len() != state.current_crisis_index {
        violations.push(format!(
            "{} decisions logged for {} finished crises",
            state.decisions.len(),
            state.current_crisis_index
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn content() -> Arc<ContentBundle> {
        Arc::new(ContentBundle::load_from_static().unwrap())
    }

    #[test]
    fn every_strategy_finishes_cleanly() {
        let content = content();
        for strategy in GameplayStrategy::ALL {
            let outcome = run_game(Arc::clone(&content), SimulationConfig::new(strategy, 1337))
                .unwrap();
            assert!(outcome.passed(), "{strategy}: {:?}", outcome.violations);
            assert_eq!(outcome.decisions.len(), 3);
            assert!(outcome.run_code.starts_with("CR-"));
        }
    }

    #[test]
    fn same_seed_replays_identically() {
        let content = content();
        let config = SimulationConfig::new(GameplayStrategy::Random, 99);
        let a = run_game(Arc::clone(&content), config).unwrap();
        let b = run_game(content, config).unwrap();
        assert_eq!(a.crisis_sequence, b.crisis_sequence);
        assert_eq!(a.decisions, b.decisions);
        assert_eq!(a.summary, b.summary);
    }

    #[test]
    fn tight_budget_forces_skips() {
        let mut bundle = ContentBundle::load_from_static().unwrap();
        bundle.config.initial_settings.budget = 20;
        let outcome = run_game(
            Arc::new(bundle),
            SimulationConfig::new(GameplayStrategy::Hawkish, 4),
        )
        .unwrap();
        assert!(outcome.passed(), "{:?}", outcome.violations);
        assert!(outcome.skips() > 0, "{:?}", outcome.decisions);
        assert_eq!(outcome.summary.crises_skipped, outcome.skips());
    }

    #[test]
    fn step_limit_is_enforced() {
        let err = run_game(
            content(),
            SimulationConfig {
                max_steps: 2,
                ..SimulationConfig::new(GameplayStrategy::Cautious, 1)
            },
        )
        .unwrap_err();
        assert!(matches!(err, SimulationError::StepLimit(2)));
    }
}
