//! Session state: one value per game, replaced wholesale on every step.
use serde::{Deserialize, Serialize};

use crate::data::InitialSettings;
use crate::effects::{DelayedOutcome, EffectResult, Modifiers};
use crate::metrics::Metrics;
use crate::phase::GamePhase;
use crate::ticker::NewsTicker;

/// Choices made so far for the current crisis.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingDecision {
    pub action_id: Option<String>,
    pub modifiers: Option<Modifiers>,
    pub skipped: bool,
}

/// Log entry for a crisis whose report has been finalized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrisisRecord {
    pub crisis_number: usize,
    pub scenario_id: String,
    pub action_id: Option<String>,
    pub action_name: Option<String>,
    pub modifiers: Option<Modifiers>,
    pub skipped: bool,
    pub counter_factual: String,
    pub metrics_before: Metrics,
    pub metrics_after: Metrics,
    pub budget_after: u32,
    pub human_resources_after: u32,
    pub trust_eroded: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    pub metrics: Metrics,
    pub budget: u32,
    pub human_resources: u32,
    pub crisis_sequence: Vec<String>,
    pub current_crisis_index: usize,
    pub metrics_history: Vec<Metrics>,
    pub news_ticker: NewsTicker,
    pub pending_decision: PendingDecision,
    pub last_results: Option<EffectResult>,
    pub last_delayed: Option<DelayedOutcome>,
    pub phase: GamePhase,
    pub decisions: Vec<CrisisRecord>,
    pub final_metrics: Option<Metrics>,
}

impl GameState {
    /// Fresh state on the start screen.
    #[must_use]
    pub fn new(settings: &InitialSettings) -> Self {
        let mut metrics = settings.metrics;
        metrics.clamp();
        Self {
            metrics,
            budget: settings.budget,
            human_resources: settings.hr,
            crisis_sequence: Vec::new(),
            current_crisis_index: 0,
            metrics_history: Vec::new(),
            news_ticker: NewsTicker::seeded(),
            pending_decision: PendingDecision::default(),
            last_results: None,
            last_delayed: None,
            phase: GamePhase::StartGame,
            decisions: Vec::new(),
            final_metrics: None,
        }
    }

    #[must_use]
    pub fn current_scenario_id(&self) -> Option<&str> {
        self.crisis_sequence
            .get(self.current_crisis_index)
            .map(String::as_str)
    }

    /// One-based number of the crisis being played.
    #[must_use]
    pub const fn crisis_number(&self) -> usize {
        self.current_crisis_index + 1
    }

    #[must_use]
    pub fn total_crises(&self) -> usize {
        self.crisis_sequence.len()
    }

    #[must_use]
    pub const fn is_over(&self) -> bool {
        self.phase.is_terminal()
    }

    /// Metrics as the player currently sees them: pending results while a
    /// crisis is being resolved, committed metrics otherwise.
    #[must_use]
    pub fn observed_metrics(&self) -> Metrics {
        self.final_metrics
            .or_else(|| self.last_results.as_ref().map(|result| result.metrics))
            .unwrap_or(self.metrics)
    }

    /// Final metrics once the game has ended, otherwise the observed ones.
    #[must_use]
    pub fn final_or_observed(&self) -> Metrics {
        self.final_metrics.unwrap_or_else(|| self.observed_metrics())
    }
}
