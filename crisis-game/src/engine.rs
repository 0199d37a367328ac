//! The state machine driving a session through its phases.
//!
//! [`step`] never mutates its input. It clones, applies the action to the
//! clone, and returns the clone only if every check passed, so a rejected
//! action leaves the caller's state exactly as it was.
use rand::seq::SliceRandom;

use crate::content::ContentBundle;
use crate::data::{Duration, Scenario, Scope};
use crate::effects::{
    Modifiers, SafeguardSet, apply_delayed_effects, calculate_effects, calculate_skip_effects,
    delayed_bonus_for, draw_random_factor,
};
use crate::error::{ContentError, GameError, ValidationError, inconsistency};
use crate::gate::{can_afford, is_blocked};
use crate::phase::{GamePhase, PlayerAction, Transition, transition};
use crate::rng::RngBundle;
use crate::state::{CrisisRecord, GameState, PendingDecision};

/// Everything a step may read or draw from besides the state itself.
#[derive(Debug)]
pub struct StepContext<'a> {
    pub content: &'a ContentBundle,
    pub rng: &'a mut RngBundle,
}

impl<'a> StepContext<'a> {
    pub const fn new(content: &'a ContentBundle, rng: &'a mut RngBundle) -> Self {
        Self { content, rng }
    }
}

/// Apply one player action.
///
/// # Errors
///
/// - [`GameError::Validation`] when the action is not allowed in the current
///   phase or fails its checks.
/// - [`GameError::Content`] when the game cannot start with the loaded content.
/// - [`GameError::Internal`] when the state violates an engine invariant.
pub fn step(
    state: &GameState,
    action: PlayerAction,
    ctx: &mut StepContext<'_>,
) -> Result<GameState, GameError> {
    let kind = action.kind();
    let Some(route) = transition(state.phase, kind) else {
        return Err(ValidationError::ActionNotAllowed {
            phase: state.phase,
            action: kind,
        }
        .into());
    };

    let mut next = state.clone();
    match action {
        PlayerAction::Reset => {
            log::info!("session reset from the {} phase", state.phase);
            return Ok(GameState::new(ctx.content.settings()));
        }
        PlayerAction::Start => start(&mut next, ctx)?,
        PlayerAction::ChooseAction { action_id } => {
            choose_action(&mut next, ctx.content, action_id)?;
        }
        PlayerAction::ConfirmDecision {
            scope,
            duration,
            safeguards,
        } => confirm_decision(&mut next, ctx, scope, duration, safeguards)?,
        PlayerAction::SkipTurn => skip_turn(&mut next, ctx.content)?,
        PlayerAction::EndGame => end_early(&mut next),
        PlayerAction::Advance => match state.phase {
            GamePhase::Immediate => resolve_delayed(&mut next, ctx)?,
            GamePhase::Report => commit_report(&mut next, ctx.content)?,
            _ => {}
        },
    }

    next.phase = match route {
        Transition::To(phase) => phase,
        Transition::NextCrisisOrEnd if next.current_crisis_index >= next.total_crises() => {
            GamePhase::GameEnd
        }
        Transition::NextCrisisOrEnd => GamePhase::Story,
    };
    if next.phase == GamePhase::GameEnd && next.final_metrics.is_none() {
        next.final_metrics = Some(next.metrics);
        log::info!("game finished after {} crises", next.decisions.len());
    }
    if next.phase == GamePhase::Story {
        check_history(&next)?;
    }
    if state.phase != next.phase {
        log::debug!("{} --{kind}--> {}", state.phase, next.phase);
    }
    Ok(next)
}

fn current_scenario<'c>(
    state: &GameState,
    content: &'c ContentBundle,
) -> Result<&'c Scenario, GameError> {
    let id = state.current_scenario_id().ok_or_else(|| {
        inconsistency(format!(
            "crisis index {} is past a sequence of {}",
            state.current_crisis_index,
            state.total_crises()
        ))
    })?;
    Ok(content.scenario(id)?)
}

fn check_history(state: &GameState) -> Result<(), GameError> {
    if state.metrics_history.len() == state.current_crisis_index + 1 {
        Ok(())
    } else {
        Err(inconsistency(format!(
            "history holds {} snapshots at crisis index {}",
            state.metrics_history.len(),
            state.current_crisis_index
        ))
        .into())
    }
}

fn start(state: &mut GameState, ctx: &mut StepContext<'_>) -> Result<(), GameError> {
    let settings = ctx.content.settings();
    let available = ctx.content.scenarios.len();
    if available < settings.max_crises {
        return Err(ContentError::NotEnoughScenarios {
            needed: settings.max_crises,
            available,
        }
        .into());
    }
    let mut ids: Vec<String> = ctx.content.scenarios.ids().map(str::to_string).collect();
    ids.shuffle(ctx.rng.sequence());
    ids.truncate(settings.max_crises);

    *state = GameState::new(settings);
    state.metrics_history.push(state.metrics);
    log::info!("game started (seed {}): {}", ctx.rng.seed(), ids.join(", "));
    state.crisis_sequence = ids;
    Ok(())
}

fn choose_action(
    state: &mut GameState,
    content: &ContentBundle,
    action_id: String,
) -> Result<(), GameError> {
    let scenario = current_scenario(state, content)?;
    if is_blocked(&scenario.action_cards, state.budget, state.human_resources) {
        return Err(ValidationError::MustSkip.into());
    }
    let card = scenario
        .action(&action_id)
        .ok_or_else(|| ValidationError::UnknownAction(action_id.clone()))?;
    if !can_afford(card, state.budget, state.human_resources) {
        return Err(ValidationError::Unaffordable {
            action_id,
            cost: card.cost,
            hr_cost: card.hr_cost,
            budget: state.budget,
            human_resources: state.human_resources,
        }
        .into());
    }
    state.pending_decision.action_id = Some(action_id);
    Ok(())
}

fn confirm_decision(
    state: &mut GameState,
    ctx: &mut StepContext<'_>,
    scope: Scope,
    duration: Duration,
    safeguards: SafeguardSet,
) -> Result<(), GameError> {
    let scenario = current_scenario(state, ctx.content)?;
    if is_blocked(&scenario.action_cards, state.budget, state.human_resources) {
        return Err(ValidationError::MustSkip.into());
    }
    let action_id = state
        .pending_decision
        .action_id
        .as_deref()
        .ok_or(ValidationError::NoActionSelected)?;
    let card = scenario
        .action(action_id)
        .ok_or_else(|| ValidationError::UnknownAction(action_id.to_string()))?;
    let modifiers = Modifiers::new(scope, duration, safeguards);
    modifiers.validate()?;

    let balance = ctx.content.balance();
    let random_factor = draw_random_factor(balance, ctx.rng.outcome());
    let result = calculate_effects(
        balance,
        &state.metrics,
        state.budget,
        state.human_resources,
        card,
        &modifiers,
        random_factor,
    )?;

    state.budget = result.budget;
    state.human_resources = result.human_resources;
    state.news_ticker.extend(result.headlines.iter().cloned());
    state.pending_decision.modifiers = Some(modifiers);
    state.last_results = Some(result);
    Ok(())
}

fn skip_turn(state: &mut GameState, content: &ContentBundle) -> Result<(), GameError> {
    let scenario = current_scenario(state, content)?;
    if !is_blocked(&scenario.action_cards, state.budget, state.human_resources) {
        return Err(ValidationError::SkipNotAllowed.into());
    }
    let result = calculate_skip_effects(&state.metrics, state.budget, state.human_resources);
    state.news_ticker.extend(result.headlines.iter().cloned());
    state.pending_decision = PendingDecision {
        action_id: None,
        modifiers: None,
        skipped: true,
    };
    state.last_results = Some(result);
    Ok(())
}

fn resolve_delayed(state: &mut GameState, ctx: &mut StepContext<'_>) -> Result<(), GameError> {
    let scenario = current_scenario(state, ctx.content)?;
    let card = state
        .pending_decision
        .action_id
        .as_deref()
        .and_then(|id| scenario.action(id));
    let bonus = delayed_bonus_for(card);
    let result = state
        .last_results
        .as_mut()
        .ok_or_else(|| inconsistency("delayed effects requested before any decision"))?;
    let outcome = apply_delayed_effects(&result.metrics, bonus, ctx.rng.aftermath());
    result.metrics = outcome.metrics;
    state.last_delayed = Some(outcome);
    Ok(())
}

fn commit_report(state: &mut GameState, content: &ContentBundle) -> Result<(), GameError> {
    check_history(state)?;
    let scenario = current_scenario(state, content)?;
    let result = state
        .last_results
        .take()
        .ok_or_else(|| inconsistency("report finalized without results"))?;
    let pending = std::mem::take(&mut state.pending_decision);
    let action_name = pending
        .action_id
        .as_deref()
        .and_then(|id| scenario.action(id))
        .map(|card| card.name.clone());
    let record = CrisisRecord {
        crisis_number: state.crisis_number(),
        scenario_id: scenario.id.clone(),
        action_id: pending.action_id,
        action_name,
        modifiers: pending.modifiers,
        skipped: pending.skipped,
        counter_factual: result.counter_factual,
        metrics_before: state.metrics,
        metrics_after: result.metrics,
        budget_after: state.budget,
        human_resources_after: state.human_resources,
        trust_eroded: state.last_delayed.take().is_some_and(|d| d.trust_eroded),
    };

    state.metrics = result.metrics;
    state.current_crisis_index += 1;
    state.metrics_history.push(state.metrics);
    state.decisions.push(record);
    Ok(())
}

fn end_early(state: &mut GameState) {
    let final_metrics = state
        .last_results
        .as_ref()
        .map_or(state.metrics, |result| result.metrics);
    state.final_metrics = Some(final_metrics);
    log::info!(
        "game ended early during the {} phase of crisis {}",
        state.phase,
        state.crisis_number()
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{ActionCard, Advisor, GameConfig, ScenarioCatalog, Speed};
    use crate::metrics::Metrics;
    use crate::ticker::Headline;

    fn card(id: &str, cost: u32, hr_cost: u32) -> ActionCard {
        ActionCard {
            id: id.into(),
            name: format!("Action {id}"),
            cost,
            hr_cost,
            speed: Speed::Fast,
            security_effect: 40.0,
            freedom_cost: 30.0,
            side_effect_risk: 0.4,
            safeguard_reduction: 0.5,
            tooltip: String::new(),
            counter_factual: None,
            delayed_bonus: None,
        }
    }

    fn scenario(id: &str, cards: Vec<ActionCard>) -> Scenario {
        Scenario {
            id: id.into(),
            title: format!("Crisis {id}"),
            icon: "!".into(),
            story: "Report. **Mission**: Act.".into(),
            advisors: vec![Advisor {
                name: "Aide".into(),
                text: "Do something.".into(),
            }],
            action_cards: cards,
            immediate_text: "Chose {}.".into(),
            delayed_text: "Later.".into(),
        }
    }

    fn bundle(max_crises: usize, budget: u32, hr: u32) -> ContentBundle {
        let mut config = GameConfig::default();
        config.initial_settings.max_crises = max_crises;
        config.initial_settings.budget = budget;
        config.initial_settings.hr = hr;
        ContentBundle::new(
            ScenarioCatalog::from_scenarios([
                scenario("alpha", vec![card("A", 30, 10), card("B", 10, 5)]),
                scenario("beta", vec![card("A", 30, 10)]),
            ]),
            config,
        )
        .unwrap()
    }

    fn run(
        state: &GameState,
        actions: impl IntoIterator<Item = PlayerAction>,
        ctx: &mut StepContext<'_>,
    ) -> GameState {
        actions.into_iter().fold(state.clone(), |current, action| {
            step(&current, action, ctx).unwrap()
        })
    }

    fn confirm() -> PlayerAction {
        PlayerAction::ConfirmDecision {
            scope: Scope::Targeted,
            duration: Duration::Short,
            safeguards: SafeguardSet::new(),
        }
    }

    #[test]
    fn start_samples_distinct_scenarios() {
        let content = bundle(2, 100, 50);
        let mut rng = RngBundle::from_user_seed(11);
        let mut ctx = StepContext::new(&content, &mut rng);
        let state = GameState::new(content.settings());
        let next = step(&state, PlayerAction::Start, &mut ctx).unwrap();
        assert_eq!(next.phase, GamePhase::Story);
        assert_eq!(next.crisis_sequence.len(), 2);
        assert_ne!(next.crisis_sequence[0], next.crisis_sequence[1]);
        assert_eq!(next.metrics_history, vec![Metrics::default()]);
    }

    #[test]
    fn start_fails_without_enough_scenarios() {
        let content = bundle(3, 100, 50);
        let mut rng = RngBundle::from_user_seed(11);
        let mut ctx = StepContext::new(&content, &mut rng);
        let state = GameState::new(content.settings());
        let err = step(&state, PlayerAction::Start, &mut ctx).unwrap_err();
        assert!(matches!(
            err,
            GameError::Content(ContentError::NotEnoughScenarios {
                needed: 3,
                available: 2
            })
        ));
    }

    #[test]
    fn rejected_actions_leave_state_untouched() {
        let content = bundle(1, 100, 50);
        let mut rng = RngBundle::from_user_seed(2);
        let mut ctx = StepContext::new(&content, &mut rng);
        let state = run(
            &GameState::new(content.settings()),
            [PlayerAction::Start, PlayerAction::Advance, PlayerAction::Advance],
            &mut ctx,
        );
        assert_eq!(state.phase, GamePhase::Decision);

        let err = step(&state, PlayerAction::choose("Z"), &mut ctx).unwrap_err();
        assert!(err.is_recoverable());
        let err = step(&state, confirm(), &mut ctx).unwrap_err();
        assert!(matches!(
            err,
            GameError::Validation(ValidationError::NoActionSelected)
        ));
        let err = step(&state, PlayerAction::SkipTurn, &mut ctx).unwrap_err();
        assert!(matches!(
            err,
            GameError::Validation(ValidationError::SkipNotAllowed)
        ));
        let err = step(&state, PlayerAction::Advance, &mut ctx).unwrap_err();
        assert!(matches!(
            err,
            GameError::Validation(ValidationError::ActionNotAllowed { .. })
        ));
        assert_eq!(state.phase, GamePhase::Decision);
        assert!(state.pending_decision.action_id.is_none());
    }

    #[test]
    fn unaffordable_action_is_rejected() {
        let content = bundle(1, 20, 50);
        let mut rng = RngBundle::from_user_seed(4);
        let mut ctx = StepContext::new(&content, &mut rng);
        let mut state = run(
            &GameState::new(content.settings()),
            [PlayerAction::Start, PlayerAction::Advance, PlayerAction::Advance],
            &mut ctx,
        );
        // Force the cheaper-card scenario regardless of the sampled order.
        state.crisis_sequence = vec!["alpha".into()];
        let err = step(&state, PlayerAction::choose("A"), &mut ctx).unwrap_err();
        assert!(matches!(
            err,
            GameError::Validation(ValidationError::Unaffordable { cost: 30, .. })
        ));
        let next = step(&state, PlayerAction::choose("B"), &mut ctx).unwrap();
        assert_eq!(next.pending_decision.action_id.as_deref(), Some("B"));
    }

    #[test]
    fn full_crisis_commits_results_once() {
        let content = bundle(1, 100, 50);
        let mut rng = RngBundle::from_user_seed(8);
        let mut ctx = StepContext::new(&content, &mut rng);
        let state = run(
            &GameState::new(content.settings()),
            [
                PlayerAction::Start,
                PlayerAction::Advance,
                PlayerAction::Advance,
                PlayerAction::choose("A"),
                confirm(),
            ],
            &mut ctx,
        );
        assert_eq!(state.phase, GamePhase::Immediate);
        assert_eq!((state.budget, state.human_resources), (70, 40));
        assert_eq!(state.metrics, Metrics::default());
        let immediate = state.last_results.clone().unwrap().metrics;

        let delayed = step(&state, PlayerAction::Advance, &mut ctx).unwrap();
        let after_delay = delayed.last_results.clone().unwrap().metrics;
        assert!(after_delay.security >= immediate.security);
        assert!((after_delay.resilience - (immediate.resilience + 5.0).min(100.0)).abs() < 1e-9);

        let report = step(&delayed, PlayerAction::Advance, &mut ctx).unwrap();
        assert_eq!(report.phase, GamePhase::Report);
        assert_eq!(report.last_results.as_ref().unwrap().metrics, after_delay);

        let end = step(&report, PlayerAction::Advance, &mut ctx).unwrap();
        assert_eq!(end.phase, GamePhase::GameEnd);
        assert_eq!(end.metrics, after_delay);
        assert_eq!(end.final_metrics, Some(after_delay));
        assert_eq!(end.metrics_history.len(), 2);
        assert_eq!(end.decisions.len(), 1);
        assert_eq!(end.decisions[0].action_id.as_deref(), Some("A"));
    }

    #[test]
    fn blocked_turn_must_be_skipped() {
        let content = bundle(1, 0, 0);
        let mut rng = RngBundle::from_user_seed(1);
        let mut ctx = StepContext::new(&content, &mut rng);
        let state = run(
            &GameState::new(content.settings()),
            [PlayerAction::Start, PlayerAction::Advance, PlayerAction::Advance],
            &mut ctx,
        );
        let err = step(&state, PlayerAction::choose("A"), &mut ctx).unwrap_err();
        assert!(matches!(
            err,
            GameError::Validation(ValidationError::MustSkip)
        ));
        let skipped = step(&state, PlayerAction::SkipTurn, &mut ctx).unwrap();
        let result = skipped.last_results.as_ref().unwrap();
        assert!((result.metrics.security - 25.0).abs() < 1e-9);
        assert!((result.metrics.public_trust - 30.0).abs() < 1e-9);
        assert_eq!((skipped.budget, skipped.human_resources), (0, 0));
        assert_eq!(
            skipped.news_ticker.latest(),
            Some(&Headline::ResourceShortfall)
        );
        assert!(skipped.pending_decision.skipped);
    }

    #[test]
    fn end_game_captures_pending_results() {
        let content = bundle(2, 100, 50);
        let mut rng = RngBundle::from_user_seed(5);
        let mut ctx = StepContext::new(&content, &mut rng);
        let state = run(
            &GameState::new(content.settings()),
            [
                PlayerAction::Start,
                PlayerAction::Advance,
                PlayerAction::Advance,
                PlayerAction::choose("A"),
                confirm(),
            ],
            &mut ctx,
        );
        let pending = state.last_results.clone().unwrap().metrics;
        let ended = step(&state, PlayerAction::EndGame, &mut ctx).unwrap();
        assert_eq!(ended.phase, GamePhase::GameEnd);
        assert_eq!(ended.final_metrics, Some(pending));

        let story = run(
            &GameState::new(content.settings()),
            [PlayerAction::Start],
            &mut ctx,
        );
        let ended = step(&story, PlayerAction::EndGame, &mut ctx).unwrap();
        assert_eq!(ended.final_metrics, Some(story.metrics));
    }

    #[test]
    fn reset_restores_initial_state_from_any_phase() {
        let content = bundle(2, 100, 50);
        let mut rng = RngBundle::from_user_seed(9);
        let mut ctx = StepContext::new(&content, &mut rng);
        let state = run(
            &GameState::new(content.settings()),
            [
                PlayerAction::Start,
                PlayerAction::Advance,
                PlayerAction::Advance,
                PlayerAction::choose("A"),
                confirm(),
                PlayerAction::Advance,
            ],
            &mut ctx,
        );
        let reset = step(&state, PlayerAction::Reset, &mut ctx).unwrap();
        assert_eq!(reset, GameState::new(content.settings()));
        assert_eq!(reset.news_ticker.len(), 1);
    }
}
