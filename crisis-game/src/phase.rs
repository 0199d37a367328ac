//! Game phases, player actions, and the transition table between them.
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::data::{Duration, Scope};
use crate::effects::SafeguardSet;

/// Screen the session is currently on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum GamePhase {
    #[default]
    StartGame,
    Story,
    Advisors,
    Decision,
    Immediate,
    Delayed,
    Report,
    GameEnd,
}

impl GamePhase {
    pub const ALL: [Self; 8] = [
        Self::StartGame,
        Self::Story,
        Self::Advisors,
        Self::Decision,
        Self::Immediate,
        Self::Delayed,
        Self::Report,
        Self::GameEnd,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::StartGame => "start_game",
            Self::Story => "story",
            Self::Advisors => "advisors",
            Self::Decision => "decision",
            Self::Immediate => "immediate",
            Self::Delayed => "delayed",
            Self::Report => "report",
            Self::GameEnd => "game_end",
        }
    }

    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::GameEnd)
    }

    /// Phases that belong to an active crisis.
    #[must_use]
    pub const fn in_crisis(self) -> bool {
        !matches!(self, Self::StartGame | Self::GameEnd)
    }
}

impl fmt::Display for GamePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GamePhase {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|phase| phase.as_str() == s)
            .ok_or(())
    }
}

/// One structured player input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum PlayerAction {
    Start,
    ChooseAction {
        action_id: String,
    },
    ConfirmDecision {
        scope: Scope,
        duration: Duration,
        #[serde(default)]
        safeguards: SafeguardSet,
    },
    SkipTurn,
    Advance,
    EndGame,
    Reset,
}

impl PlayerAction {
    #[must_use]
    pub fn choose(action_id: impl Into<String>) -> Self {
        Self::ChooseAction {
            action_id: action_id.into(),
        }
    }

    #[must_use]
    pub const fn kind(&self) -> PlayerActionKind {
        match self {
            Self::Start => PlayerActionKind::Start,
            Self::ChooseAction { .. } => PlayerActionKind::ChooseAction,
            Self::ConfirmDecision { .. } => PlayerActionKind::ConfirmDecision,
            Self::SkipTurn => PlayerActionKind::SkipTurn,
            Self::Advance => PlayerActionKind::Advance,
            Self::EndGame => PlayerActionKind::EndGame,
            Self::Reset => PlayerActionKind::Reset,
        }
    }
}

/// Payload-free discriminant of [`PlayerAction`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayerActionKind {
    Start,
    ChooseAction,
    ConfirmDecision,
    SkipTurn,
    Advance,
    EndGame,
    Reset,
}

impl PlayerActionKind {
    pub const ALL: [Self; 7] = [
        Self::Start,
        Self::ChooseAction,
        Self::ConfirmDecision,
        Self::SkipTurn,
        Self::Advance,
        Self::EndGame,
        Self::Reset,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::ChooseAction => "choose_action",
            Self::ConfirmDecision => "confirm_decision",
            Self::SkipTurn => "skip_turn",
            Self::Advance => "advance",
            Self::EndGame => "end_game",
            Self::Reset => "reset",
        }
    }
}

impl fmt::Display for PlayerActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where an accepted action leads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    To(GamePhase),
    /// Leaving the report: the next story, or the end if crises are exhausted.
    NextCrisisOrEnd,
}

/// The transition table. `None` means the action is not allowed in `phase`.
#[must_use]
pub const fn transition(phase: GamePhase, action: PlayerActionKind) -> Option<Transition> {
    use GamePhase as P;
    use PlayerActionKind as A;
    match (phase, action) {
        (_, A::Reset) => Some(Transition::To(P::StartGame)),
        (phase, A::EndGame) if phase.in_crisis() => Some(Transition::To(P::GameEnd)),
        (P::StartGame, A::Start) => Some(Transition::To(P::Story)),
        (P::Story, A::Advance) => Some(Transition::To(P::Advisors)),
        (P::Advisors, A::Advance) => Some(Transition::To(P::Decision)),
        (P::Decision, A::ChooseAction) => Some(Transition::To(P::Decision)),
        (P::Decision, A::ConfirmDecision | A::SkipTurn) => Some(Transition::To(P::Immediate)),
        (P::Immediate, A::Advance) => Some(Transition::To(P::Delayed)),
        (P::Delayed, A::Advance) => Some(Transition::To(P::Report)),
        (P::Report, A::Advance) => Some(Transition::NextCrisisOrEnd),
        _ => None,
    }
}

/// Actions the table accepts in `phase`.
#[must_use]
pub fn allowed_actions(phase: GamePhase) -> Vec<PlayerActionKind> {
    PlayerActionKind::ALL
        .into_iter()
        .filter(|kind| transition(phase, *kind).is_some())
        .collect()
}
