use std::sync::Arc;

use crisis_game::{
    ContentBundle, Duration, GameError, GamePhase, GameSession, PlayerAction, PlayerActionKind,
    Safeguard, SafeguardSet, Scope, ScoreTier, ValidationError, leadership_score,
};

fn bundle_with_crises(max_crises: usize) -> Arc<ContentBundle> {
    let mut bundle = ContentBundle::load_from_static().unwrap();
    bundle.config.initial_settings.max_crises = max_crises;
    Arc::new(bundle)
}

fn to_decision(session: &mut GameSession) {
    assert_eq!(session.state().phase, GamePhase::Story);
    session.apply(PlayerAction::Advance).unwrap();
    assert_eq!(session.state().phase, GamePhase::Advisors);
    session.apply(PlayerAction::Advance).unwrap();
    assert_eq!(session.state().phase, GamePhase::Decision);
}

fn play_card(session: &mut GameSession, action_id: &str, safeguards: SafeguardSet) {
    session.apply(PlayerAction::choose(action_id)).unwrap();
    session
        .apply(PlayerAction::ConfirmDecision {
            scope: Scope::Targeted,
            duration: Duration::Short,
            safeguards,
        })
        .unwrap();
    assert_eq!(session.state().phase, GamePhase::Immediate);
    session.apply(PlayerAction::Advance).unwrap();
    assert_eq!(session.state().phase, GamePhase::Delayed);
    session.apply(PlayerAction::Advance).unwrap();
    assert_eq!(session.state().phase, GamePhase::Report);
    session.apply(PlayerAction::Advance).unwrap();
}

#[test]
fn single_crisis_game_reaches_the_end_screen() {
    let mut session = GameSession::new(bundle_with_crises(1), 2024);
    session.apply(PlayerAction::Start).unwrap();
    assert_eq!(session.state().total_crises(), 1);
    to_decision(&mut session);
    play_card(&mut session, "C", SafeguardSet::all());

    let state = session.state();
    assert_eq!(state.phase, GamePhase::GameEnd);
    assert_eq!(state.decisions.len(), 1);
    assert_eq!(state.metrics_history.len(), 2);
    let final_metrics = state.final_metrics.unwrap();
    assert_eq!(final_metrics, state.metrics);

    let summary = session.summary();
    assert!((summary.score - leadership_score(&final_metrics)).abs() < 1e-9);
    assert_eq!(summary.tier, ScoreTier::from_score(summary.score));
    assert_eq!(summary.crises_resolved, 1);
    assert_eq!(summary.crises_skipped, 0);
    assert_eq!(
        session.state().news_ticker.latest().map(|h| h.key()),
        Some("news.transparency")
    );
}

#[test]
fn history_tracks_every_crisis_start() {
    let mut session = GameSession::new(bundle_with_crises(3), 11);
    session.apply(PlayerAction::Start).unwrap();
    for crisis in 0..3 {
        assert_eq!(session.state().current_crisis_index, crisis);
        assert_eq!(session.state().metrics_history.len(), crisis + 1);
        to_decision(&mut session);
        play_card(&mut session, "B", SafeguardSet::new());
    }
    let state = session.state();
    assert_eq!(state.phase, GamePhase::GameEnd);
    assert_eq!(state.metrics_history.len(), 4);
    assert_eq!(state.metrics_history.last(), Some(&state.metrics));
    assert!(state.news_ticker.len() <= 5);
    assert!(
        state
            .decisions
            .windows(2)
            .all(|pair| pair[0].metrics_after == pair[1].metrics_before)
    );
}

#[test]
fn rejected_actions_leave_the_session_untouched() {
    let mut session = GameSession::new(bundle_with_crises(2), 5);
    session.apply(PlayerAction::Start).unwrap();
    to_decision(&mut session);
    let before = session.state().clone();

    let err = session.apply(PlayerAction::choose("Z")).unwrap_err();
    assert!(matches!(
        err,
        GameError::Validation(ValidationError::UnknownAction(_))
    ));
    let err = session
        .apply(PlayerAction::ConfirmDecision {
            scope: Scope::General,
            duration: Duration::Long,
            safeguards: SafeguardSet::new(),
        })
        .unwrap_err();
    assert!(matches!(
        err,
        GameError::Validation(ValidationError::NoActionSelected)
    ));
    let err = session.apply(PlayerAction::SkipTurn).unwrap_err();
    assert!(err.is_recoverable());
    let err = session.apply(PlayerAction::Advance).unwrap_err();
    assert!(matches!(
        err,
        GameError::Validation(ValidationError::ActionNotAllowed {
            phase: GamePhase::Decision,
            action: PlayerActionKind::Advance,
        })
    ));
    assert_eq!(session.state(), &before);
}

#[test]
fn duplicate_safeguards_fail_to_build() {
    let err = SafeguardSet::try_from_iter([Safeguard::Appeal, Safeguard::Appeal]).unwrap_err();
    assert_eq!(err, ValidationError::DuplicateSafeguard("appeal".into()));
}

#[test]
fn ending_early_freezes_observed_metrics() {
    let mut session = GameSession::new(bundle_with_crises(3), 8);
    session.apply(PlayerAction::Start).unwrap();
    to_decision(&mut session);
    session.apply(PlayerAction::choose("A")).unwrap();
    session
        .apply(PlayerAction::ConfirmDecision {
            scope: Scope::General,
            duration: Duration::Long,
            safeguards: SafeguardSet::new(),
        })
        .unwrap();
    let pending = session.state().last_results.clone().unwrap();
    session.apply(PlayerAction::EndGame).unwrap();

    let state = session.state();
    assert_eq!(state.phase, GamePhase::GameEnd);
    assert_eq!(state.final_metrics, Some(pending.metrics));
    assert_eq!(session.summary().final_metrics, pending.metrics);
    assert!(session.apply(PlayerAction::EndGame).is_err());
}

#[test]
fn reset_returns_to_a_fresh_start_screen() {
    let content = bundle_with_crises(2);
    let mut session = GameSession::new(Arc::clone(&content), 77);
    session.apply(PlayerAction::Start).unwrap();
    to_decision(&mut session);
    session.apply(PlayerAction::choose("B")).unwrap();
    session.apply(PlayerAction::Reset).unwrap();

    let state = session.state();
    assert_eq!(state.phase, GamePhase::StartGame);
    assert!(state.crisis_sequence.is_empty());
    assert!(state.metrics_history.is_empty());
    assert_eq!(state.budget, content.settings().budget);
    assert_eq!(state.news_ticker.len(), 1);

    session.apply(PlayerAction::Start).unwrap();
    assert_eq!(session.state().total_crises(), 2);
}

#[test]
fn broke_player_must_skip() {
    let mut bundle = ContentBundle::load_from_static().unwrap();
    bundle.config.initial_settings.budget = 0;
    bundle.config.initial_settings.max_crises = 1;
    let mut session = GameSession::new(Arc::new(bundle), 3);
    session.apply(PlayerAction::Start).unwrap();
    to_decision(&mut session);

    let err = session.apply(PlayerAction::choose("C")).unwrap_err();
    assert!(matches!(err, GameError::Validation(ValidationError::MustSkip)));
    let before = session.state().metrics;
    session.apply(PlayerAction::SkipTurn).unwrap();
    let result = session.state().last_results.clone().unwrap();
    assert!(result.skipped);
    assert!((result.metrics.security - (before.security - 25.0)).abs() < 1e-9);
    assert!((result.metrics.fatigue - (before.fatigue + 15.0)).abs() < 1e-9);
    assert_eq!(result.budget, 0);

    session.apply(PlayerAction::Advance).unwrap();
    session.apply(PlayerAction::Advance).unwrap();
    session.apply(PlayerAction::Advance).unwrap();
    assert_eq!(session.state().phase, GamePhase::GameEnd);
    assert_eq!(session.summary().crises_skipped, 1);
}
