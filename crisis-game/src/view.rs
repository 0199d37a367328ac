//! Read-only, per-phase projections of a session for a presentation layer.
use serde::Serialize;

use crate::constants::{
    SAFEGUARD_MITIGATION_PCT_PER_ITEM, SKIP_DELAYED_TEXT, SKIP_IMMEDIATE_TEXT,
};
use crate::content::ContentBundle;
use crate::data::{ActionCard, Advisor, Scenario};
use crate::effects::EffectResult;
use crate::error::{GameError, inconsistency};
use crate::gate::{can_afford, is_blocked};
use crate::metrics::{MetricKind, Metrics};
use crate::phase::{GamePhase, PlayerActionKind, allowed_actions};
use crate::scoring::{ResultSummary, result_summary};
use crate::state::{CrisisRecord, GameState};

/// Before/after reading of one gauge.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MetricComparison {
    pub kind: MetricKind,
    pub before: f64,
    pub after: f64,
    pub improved: bool,
}

impl MetricComparison {
    #[must_use]
    pub fn new(kind: MetricKind, before: &Metrics, after: &Metrics) -> Self {
        let (before, after) = (before.get(kind), after.get(kind));
        let improved = if kind.higher_is_better() {
            after > before
        } else {
            after < before
        };
        Self {
            kind,
            before,
            after,
            improved,
        }
    }

    #[must_use]
    pub fn delta(&self) -> f64 {
        self.after - self.before
    }
}

fn compare(before: &Metrics, after: &Metrics) -> Vec<MetricComparison> {
    MetricKind::ALL
        .iter()
        .map(|kind| MetricComparison::new(*kind, before, after))
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CardOption {
    pub card: ActionCard,
    pub affordable: bool,
    pub selected: bool,
}

/// Screen-specific content.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "screen", rename_all = "snake_case")]
pub enum Screen {
    Start {
        max_crises: usize,
    },
    Story {
        crisis_number: usize,
        total_crises: usize,
        title: String,
        icon: String,
        report: String,
        mission: String,
    },
    Advisors {
        title: String,
        advisors: Vec<Advisor>,
    },
    Decision {
        cards: Vec<CardOption>,
        blocked: bool,
        selected_action: Option<String>,
    },
    Immediate {
        text: String,
        comparisons: Vec<MetricComparison>,
    },
    Delayed {
        text: String,
        comparisons: Vec<MetricComparison>,
        trust_eroded: bool,
    },
    Report {
        crisis_number: usize,
        comparisons: Vec<MetricComparison>,
        counter_factual: String,
        safeguard_count: usize,
        safeguard_mitigation_pct: u32,
    },
    GameEnd {
        summary: ResultSummary,
        history: Vec<Metrics>,
        decisions: Vec<CrisisRecord>,
    },
}

/// Everything a presentation layer needs to draw the current phase.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PhaseView {
    pub phase: GamePhase,
    pub metrics: Metrics,
    pub budget: u32,
    pub human_resources: u32,
    pub headlines: Vec<String>,
    pub allowed_actions: Vec<PlayerActionKind>,
    pub screen: Screen,
}

/// Project `state` for its current phase.
///
/// # Errors
///
/// Returns an error if the current crisis refers to a scenario that is not in
/// `content`, or if a resolution phase has no results to show.
pub fn phase_view(state: &GameState, content: &ContentBundle) -> Result<PhaseView, GameError> {
    let screen = match state.phase {
        GamePhase::StartGame => Screen::Start {
            max_crises: content.settings().max_crises,
        },
        GamePhase::Story => {
            let scenario = scenario_for(state, content)?;
            let parts = scenario.story_parts();
            Screen::Story {
                crisis_number: state.crisis_number(),
                total_crises: state.total_crises(),
                title: scenario.title.clone(),
                icon: scenario.icon.clone(),
                report: parts.report.to_string(),
                mission: parts.mission.to_string(),
            }
        }
        GamePhase::Advisors => {
            let scenario = scenario_for(state, content)?;
            Screen::Advisors {
                title: scenario.title.clone(),
                advisors: scenario.advisors.clone(),
            }
        }
        GamePhase::Decision => decision_screen(state, scenario_for(state, content)?),
        GamePhase::Immediate => {
            let result = pending_results(state)?;
            let text = if result.skipped {
                SKIP_IMMEDIATE_TEXT.to_string()
            } else {
                scenario_for(state, content)?.render_immediate(&chosen_name(state, content)?)
            };
            Screen::Immediate {
                text,
                comparisons: compare(&state.metrics, &result.metrics),
            }
        }
        GamePhase::Delayed => {
            let outcome = state
                .last_delayed
                .ok_or_else(|| inconsistency("delayed phase without a delayed outcome"))?;
            let text = if state.pending_decision.skipped {
                SKIP_DELAYED_TEXT.to_string()
            } else {
                scenario_for(state, content)?.render_delayed(&chosen_name(state, content)?)
            };
            Screen::Delayed {
                text,
                comparisons: compare(&outcome.previous, &outcome.metrics),
                trust_eroded: outcome.trust_eroded,
            }
        }
        GamePhase::Report => {
            let result = pending_results(state)?;
            let start = state
                .metrics_history
                .get(state.current_crisis_index)
                .copied()
                .unwrap_or(state.metrics);
            let safeguard_count = state
                .pending_decision
                .modifiers
                .as_ref()
                .map_or(0, |modifiers| modifiers.safeguards.len());
            Screen::Report {
                crisis_number: state.crisis_number(),
                comparisons: compare(&start, &result.metrics),
                counter_factual: result.counter_factual.clone(),
                safeguard_count,
                safeguard_mitigation_pct: u32::try_from(safeguard_count)
                    .unwrap_or(0)
                    .saturating_mul(SAFEGUARD_MITIGATION_PCT_PER_ITEM),
            }
        }
        GamePhase::GameEnd => Screen::GameEnd {
            summary: result_summary(state),
            history: state.metrics_history.clone(),
            decisions: state.decisions.clone(),
        },
    };

    Ok(PhaseView {
        phase: state.phase,
        metrics: state.observed_metrics(),
        budget: state.budget,
        human_resources: state.human_resources,
        headlines: state.news_ticker.iter().map(ToString::to_string).collect(),
        allowed_actions: allowed_actions(state.phase),
        screen,
    })
}

fn scenario_for<'c>(
    state: &GameState,
    content: &'c ContentBundle,
) -> Result<&'c Scenario, GameError> {
    let id = state
        .current_scenario_id()
        .ok_or_else(|| inconsistency("no current crisis"))?;
    Ok(content.scenario(id)?)
}

fn pending_results(state: &GameState) -> Result<&EffectResult, GameError> {
    state
        .last_results
        .as_ref()
        .ok_or_else(|| inconsistency(format!("{} phase without results", state.phase)).into())
}

fn chosen_name(state: &GameState, content: &ContentBundle) -> Result<String, GameError> {
    let scenario = scenario_for(state, content)?;
    state
        .pending_decision
        .action_id
        .as_deref()
        .and_then(|id| scenario.action(id))
        .map(|card| card.name.clone())
        .ok_or_else(|| inconsistency("resolved crisis has no chosen action").into())
}

fn decision_screen(state: &GameState, scenario: &Scenario) -> Screen {
    let selected_action = state.pending_decision.action_id.clone();
    let cards = scenario
        .action_cards
        .iter()
        .map(|card| CardOption {
            card: card.clone(),
            affordable: can_afford(card, state.budget, state.human_resources),
            selected: selected_action.as_deref() == Some(card.id.as_str()),
        })
        .collect();
    Screen::Decision {
        cards,
        blocked: is_blocked(&scenario.action_cards, state.budget, state.human_resources),
        selected_action,
    }
}
