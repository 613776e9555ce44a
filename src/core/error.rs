//! Engine error types.
//!
//! Errors fall into three tiers:
//! - Invalid player actions (wrong zone, not enough DON!!, already attacked).
//!   Reported back to the caller with the state unchanged; the caller may
//!   retry with another action.
//! - Internal invariant violations (`EngineError::Internal`). Caught at the
//!   action boundary, reported with a generic message and the pre-action
//!   state, and written to stderr for diagnosis.
//! - Terminal conditions (deck-out, life-out) are not errors at all; they are
//!   `GameState::game_over` / `winner`.

use serde::{Deserialize, Serialize};

use super::config::Phase;
use super::entity::EntityId;
use super::player::PlayerId;
use crate::effects::{EffectId, ScriptError};
use crate::zones::ZoneError;

/// Error produced while validating or applying an action.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EngineError {
    /// Zone transfer validation failed.
    Zone(ZoneError),
    /// An effect script failed.
    Script(ScriptError),
    /// The acting player is not the active player.
    NotYourTurn(PlayerId),
    /// The action is not legal in the current phase.
    WrongPhase { expected: Phase, actual: Phase },
    /// The game has already ended.
    GameOver,
    /// Not enough active DON!! to pay a cost.
    InsufficientDon { needed: usize, available: usize },
    /// The card is not in the acting player's hand.
    NotInHand(EntityId),
    /// The attacker already attacked this turn.
    AlreadyAttacked(EntityId),
    /// The card cannot attack right now.
    CannotAttack { attacker: EntityId, reason: String },
    /// The attack target is not a legal target.
    InvalidAttackTarget(EntityId),
    /// The effect cannot be activated right now.
    EffectUnavailable { card: EntityId, effect: EffectId },
    /// An engine invariant was violated.
    Internal(String),
}

impl EngineError {
    /// Check if this error is an internal invariant violation.
    #[must_use]
    pub fn is_internal(&self) -> bool {
        matches!(self, EngineError::Internal(_))
    }

    /// Shorthand for an internal error.
    pub fn internal(msg: impl Into<String>) -> Self {
        EngineError::Internal(msg.into())
    }
}

impl From<ZoneError> for EngineError {
    fn from(err: ZoneError) -> Self {
        EngineError::Zone(err)
    }
}

impl From<ScriptError> for EngineError {
    fn from(err: ScriptError) -> Self {
        EngineError::Script(err)
    }
}

impl std::fmt::Display for EngineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EngineError::Zone(e) => write!(f, "Zone error: {}", e),
            EngineError::Script(e) => write!(f, "Script error: {}", e),
            EngineError::NotYourTurn(p) => write!(f, "{} is not the active player", p),
            EngineError::WrongPhase { expected, actual } => {
                write!(f, "Action requires {} phase, current phase is {}", expected, actual)
            }
            EngineError::GameOver => write!(f, "Game is over"),
            EngineError::InsufficientDon { needed, available } => {
                write!(f, "Need {} active DON!!, have {}", needed, available)
            }
            EngineError::NotInHand(card) => write!(f, "{} is not in hand", card),
            EngineError::AlreadyAttacked(card) => write!(f, "{} already attacked this turn", card),
            EngineError::CannotAttack { attacker, reason } => {
                write!(f, "{} cannot attack: {}", attacker, reason)
            }
            EngineError::InvalidAttackTarget(card) => write!(f, "{} is not a legal attack target", card),
            EngineError::EffectUnavailable { card, effect } => {
                write!(f, "{} of {} cannot be activated", effect, card)
            }
            EngineError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for EngineError {}
