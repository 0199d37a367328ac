//! Error taxonomy for the crisis engine.
use thiserror::Error;

use crate::phase::{GamePhase, PlayerActionKind};

/// Missing or malformed content. Fatal to starting a game.
#[derive(Debug, Error)]
pub enum ContentError {
    #[error("content source `{0}` is missing")]
    Missing(String),
    #[error("content source `{source_name}` could not be read: {reason}")]
    Unreadable { source_name: String, reason: String },
    #[error("content source `{source_name}` is malformed: {error}")]
    Malformed {
        source_name: String,
        #[source]
        error: serde_json::Error,
    },
    #[error("invalid balance configuration: {0}")]
    InvalidBalance(String),
    #[error("invalid initial settings: {0}")]
    InvalidSettings(String),
    #[error("{needed} crises requested but only {available} scenarios are available")]
    NotEnoughScenarios { needed: usize, available: usize },
    #[error("scenario `{0}` is not part of the loaded content")]
    UnknownScenario(String),
}

/// Invalid player action. Rejected in place without touching state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("`{action}` is not allowed during the {phase} phase")]
    ActionNotAllowed {
        phase: GamePhase,
        action: PlayerActionKind,
    },
    #[error("scenario has no action `{0}`")]
    UnknownAction(String),
    #[error("action `{action_id}` needs {cost} budget and {hr_cost} staff; {budget} budget and {human_resources} staff remain")]
    Unaffordable {
        action_id: String,
        cost: u32,
        hr_cost: u32,
        budget: u32,
        human_resources: u32,
    },
    #[error("no action has been chosen for this crisis")]
    NoActionSelected,
    #[error("resources are exhausted; the only option is to skip this crisis")]
    MustSkip,
    #[error("a turn can only be skipped when no action is affordable")]
    SkipNotAllowed,
    #[error("safeguard `{0}` was selected more than once")]
    DuplicateSafeguard(String),
}

/// Broken engine invariant. Never raised under correct usage; a full reset is
/// the only defined recovery.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("internal inconsistency: {0}")]
pub struct InternalInconsistency(pub String);

/// Any failure surfaced by the engine.
#[derive(Debug, Error)]
pub enum GameError {
    #[error(transparent)]
    Content(#[from] ContentError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Internal(#[from] InternalInconsistency),
}

impl GameError {
    /// Whether the caller can simply retry with a different action.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Whether the only way forward is resetting the session.
    #[must_use]
    pub const fn requires_reset(&self) -> bool {
        matches!(self, Self::Internal(_))
    }
}

pub(crate) fn inconsistency(message: impl Into<String>) -> InternalInconsistency {
    InternalInconsistency(message.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_errors_are_recoverable() {
        let err = GameError::from(ValidationError::UnknownAction("Z".into()));
        assert!(err.is_recoverable());
        assert!(!err.requires_reset());
        assert_eq!(err.to_string(), "scenario has no action `Z`");
    }

    #[test]
    fn inconsistencies_require_reset() {
        let err = GameError::from(inconsistency("history out of step"));
        assert!(err.requires_reset());
        assert!(err.to_string().contains("history out of step"));
    }

    #[test]
    fn not_allowed_message_names_phase_and_action() {
        let err = ValidationError::ActionNotAllowed {
            phase: GamePhase::Story,
            action: PlayerActionKind::SkipTurn,
        };
        assert_eq!(
            err.to_string(),
            "`skip_turn` is not allowed during the story phase"
        );
    }
}
