//! Crisis Decision Engine
//!
//! Platform-agnostic core of a turn-based crisis management game. A player
//! resolves a sequence of scenarios, trading security against freedom and
//! public trust with a finite budget and staff. This crate holds the data
//! model, effect calculator, resource gate, phase state machine, and scoring,
//! without any rendering or platform-specific dependencies.

pub mod constants;
pub mod content;
pub mod data;
pub mod effects;
pub mod engine;
pub mod error;
pub mod gate;
pub mod metrics;
pub mod numbers;
pub mod phase;
pub mod rng;
pub mod scoring;
pub mod seed;
pub mod session;
pub mod state;
pub mod ticker;
pub mod view;

use std::sync::Arc;

pub use content::{ContentBundle, DirectoryContent, StaticContent};
pub use data::{
    ActionCard, Advisor, BalanceConfig, Duration, GameConfig, InitialSettings, Safeguard, Scenario,
    ScenarioCatalog, Scope, Speed,
};
pub use effects::{
    EffectBreakdown, EffectResult, Modifiers, SafeguardSet, calculate_effects,
    calculate_skip_effects,
};
pub use engine::{StepContext, step};
pub use error::{ContentError, GameError, InternalInconsistency, ValidationError};
pub use gate::{affordable, is_blocked};
pub use metrics::{MetricKind, Metrics};
pub use phase::{GamePhase, PlayerAction, PlayerActionKind};
pub use rng::RngBundle;
pub use scoring::{LeadershipStyle, ResultSummary, ScoreTier, leadership_score, result_summary};
pub use seed::{decode_to_seed, encode_friendly, generate_code_from_entropy};
pub use session::GameSession;
pub use state::{CrisisRecord, GameState};
pub use ticker::{Headline, NewsTicker};
pub use view::{PhaseView, Screen, phase_view};

/// Source of scenarios and balance config. The embedded defaults and a
/// content directory both implement it; hosts can add their own.
pub trait ContentLoader {
    type Error: std::error::Error + From<ContentError> + Send + Sync + 'static;

    /// Load the scenario catalog
    ///
    /// # Errors
    ///
    /// Returns an error if the scenario source is absent or not a JSON object.
    fn load_scenarios(&self) -> Result<ScenarioCatalog, Self::Error>;

    /// Load balance configuration and initial settings
    ///
    /// # Errors
    ///
    /// Returns an error if the config source is absent, malformed, or invalid.
    fn load_config(&self) -> Result<GameConfig, Self::Error>;

    /// Load both sources into one bundle
    ///
    /// # Errors
    ///
    /// Returns the first error from either source, or a balance error when the
    /// two do not fit together.
    fn load_bundle(&self) -> Result<ContentBundle, Self::Error> {
        Ok(ContentBundle::new(
            self.load_scenarios()?,
            self.load_config()?,
        )?)
    }
}

/// Session factory bound to one content source.
pub struct GameEngine<L>
where
    L: ContentLoader,
{
    loader: L,
}

impl<L> GameEngine<L>
where
    L: ContentLoader,
{
    pub const fn new(loader: L) -> Self {
        Self { loader }
    }

    pub const fn loader(&self) -> &L {
        &self.loader
    }

    /// Load content and construct a session seeded with `seed`.
    ///
    /// Content is read once per call; the session keeps its own snapshot, so
    /// later edits to the source never affect a running game.
    ///
    /// # Errors
    ///
    /// Returns an error if the content cannot be loaded.
    pub fn new_session(&self, seed: u64) -> Result<GameSession, L::Error> {
        let content = Arc::new(self.loader.load_bundle()?);
        Ok(GameSession::new(content, seed))
    }
}
