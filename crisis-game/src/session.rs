use std::sync::Arc;

use crate::content::ContentBundle;
use crate::engine::{StepContext, step};
use crate::error::GameError;
use crate::phase::PlayerAction;
use crate::rng::RngBundle;
use crate::scoring::{ResultSummary, result_summary};
use crate::seed::encode_friendly;
use crate::state::GameState;
use crate::view::{PhaseView, phase_view};

/// Wraps content, randomness, and state for a single in-memory game.
#[derive(Debug, Clone)]
pub struct GameSession {
    content: Arc<ContentBundle>,
    rng: RngBundle,
    state: GameState,
}

impl GameSession {
    /// Construct a fresh session on the start screen.
    #[must_use]
    pub fn new(content: Arc<ContentBundle>, seed: u64) -> Self {
        let state = GameState::new(content.settings());
        Self {
            content,
            rng: RngBundle::from_user_seed(seed),
            state,
        }
    }

    /// Apply a player action. On error the session is unchanged.
    ///
    /// # Errors
    ///
    /// Propagates any [`GameError`] raised by the transition.
    pub fn apply(&mut self, action: PlayerAction) -> Result<&GameState, GameError> {
        let mut ctx = StepContext::new(&self.content, &mut self.rng);
        let next = step(&self.state, action, &mut ctx)?;
        self.state = next;
        Ok(&self.state)
    }

    #[must_use]
    pub const fn state(&self) -> &GameState {
        &self.state
    }

    #[must_use]
    pub fn content(&self) -> &ContentBundle {
        &self.content
    }

    #[must_use]
    pub const fn rng(&self) -> &RngBundle {
        &self.rng
    }

    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.rng.seed()
    }

    /// Shareable run code for this session's seed.
    #[must_use]
    pub fn run_code(&self) -> String {
        encode_friendly(self.seed())
    }

    /// # Errors
    ///
    /// Returns an error if the state cannot be projected against the content.
    pub fn view(&self) -> Result<PhaseView, GameError> {
        phase_view(&self.state, &self.content)
    }

    #[must_use]
    pub fn summary(&self) -> ResultSummary {
        result_summary(&self.state)
    }
}
