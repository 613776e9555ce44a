//! Player actions.
//!
//! Actions are what the legal-action enumerator produces and what a
//! `PlayerAgent` chooses from during the Main phase. Each variant carries the
//! entities it points at:
//! - "End phase" = no pointers
//! - "Play card X" = the hand card
//! - "Give DON!! D to X" = token + target
//! - "Attack with X targeting Y" = attacker + target

use serde::{Deserialize, Serialize};

use super::entity::EntityId;
use super::player::PlayerId;
use crate::effects::EffectId;

/// A Main-phase action.
///
/// ## Example
///
/// ```
/// use don_rules::core::{Action, EntityId};
///
/// let attack = Action::Attack { attacker: EntityId(5), target: EntityId(20) };
/// assert_eq!(attack.pointers(), vec![EntityId(5), EntityId(20)]);
/// assert!(Action::EndPhase.is_end_phase());
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    /// Pay a hand card's cost and put it into play.
    PlayCard { card: EntityId },

    /// Attach an active DON!! from the cost area to a leader or character.
    GiveDon { don: EntityId, target: EntityId },

    /// Activate an `Activate`-timed effect of an in-play card.
    ActivateEffect { card: EntityId, effect: EffectId },

    /// Declare an attack.
    Attack { attacker: EntityId, target: EntityId },

    /// End the current phase.
    EndPhase,
}

impl Action {
    /// Entities this action points at, in declaration order.
    #[must_use]
    pub fn pointers(&self) -> Vec<EntityId> {
        match self {
            Action::PlayCard { card } => vec![*card],
            Action::GiveDon { don, target } => vec![*don, *target],
            Action::ActivateEffect { card, .. } => vec![*card],
            Action::Attack { attacker, target } => vec![*attacker, *target],
            Action::EndPhase => Vec::new(),
        }
    }

    /// Check if this is the end-phase action.
    #[must_use]
    pub fn is_end_phase(&self) -> bool {
        matches!(self, Action::EndPhase)
    }

    /// Check if this is an attack.
    #[must_use]
    pub fn is_attack(&self) -> bool {
        matches!(self, Action::Attack { .. })
    }

    /// Short verb for diagnostics.
    #[must_use]
    pub fn verb(&self) -> &'static str {
        match self {
            Action::PlayCard { .. } => "play",
            Action::GiveDon { .. } => "give-don",
            Action::ActivateEffect { .. } => "activate",
            Action::Attack { .. } => "attack",
            Action::EndPhase => "end-phase",
        }
    }
}

/// A recorded action with metadata for history tracking.
///
/// Used for replay, debugging and desync checks between peers.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionRecord {
    /// The player who took this action.
    pub player: PlayerId,

    /// The action taken.
    pub action: Action,

    /// Turn number when action was taken.
    pub turn: u32,

    /// Sequence number within the turn (for ordering).
    pub sequence: u32,
}

impl ActionRecord {
    /// Create a new action record.
    #[must_use]
    pub fn new(player: PlayerId, action: Action, turn: u32, sequence: u32) -> Self {
        Self {
            player,
            action,
            turn,
            sequence,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_pointers() {
        assert!(Action::EndPhase.pointers().is_empty());
        assert_eq!(Action::PlayCard { card: EntityId(3) }.pointers(), vec![EntityId(3)]);
        assert_eq!(
            Action::GiveDon { don: EntityId(1), target: EntityId(2) }.pointers(),
            vec![EntityId(1), EntityId(2)]
        );
    }

    #[test]
    fn test_action_equality() {
        let a1 = Action::Attack { attacker: EntityId(5), target: EntityId(9) };
        let a2 = Action::Attack { attacker: EntityId(5), target: EntityId(9) };
        let a3 = Action::Attack { attacker: EntityId(5), target: EntityId(8) };

        assert_eq!(a1, a2);
        assert_ne!(a1, a3);
        assert!(a1.is_attack());
        assert!(!a1.is_end_phase());
    }

    #[test]
    fn test_action_hash_dedup() {
        use std::collections::HashSet;

        let set: HashSet<Action> = [
            Action::EndPhase,
            Action::EndPhase,
            Action::PlayCard { card: EntityId(1) },
        ]
        .into_iter()
        .collect();

        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_action_record_serialization() {
        let action = Action::ActivateEffect { card: EntityId(5), effect: EffectId(2) };
        let record = ActionRecord::new(PlayerId::new(1), action, 2, 3);

        let json = serde_json::to_string(&record).unwrap();
        let deserialized: ActionRecord = serde_json::from_str(&json).unwrap();

        assert_eq!(record, deserialized);
    }
}
