//! Timed modifiers.
//!
//! A `Modifier` lives in `CardInstance::modifiers` and adjusts a computed
//! value (power or cost) for a declared duration. Modifiers are only ever
//! removed by the expiry sweeps the phase machine and battle resolver run,
//! or when the card leaves the field.

use serde::{Deserialize, Serialize};

use crate::core::{EntityId, PlayerId};

/// Unique modifier identifier (allocated from the game state's clock).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ModifierId(pub u64);

/// What a modifier adjusts.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModifierKind {
    /// Adds to computed power.
    Power,
    /// Adds to play cost.
    Cost,
    /// Script-defined bookkeeping value.
    Other(String),
}

/// How long a modifier lasts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Duration {
    /// Never expires while the card stays on the field.
    Permanent,
    /// Expires in the End phase.
    UntilEndOfTurn,
    /// Expires in the End phase.
    DuringThisTurn,
    /// Expires in the Refresh phase of the creating player's next turn.
    UntilStartOfNextTurn,
    /// Expires when the current battle ends.
    ThisBattle,
}

impl Duration {
    /// Swept by the End phase.
    #[must_use]
    pub fn expires_at_end_of_turn(self) -> bool {
        matches!(
            self,
            Duration::UntilEndOfTurn | Duration::DuringThisTurn | Duration::ThisBattle
        )
    }
}

/// A timed adjustment on a card.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modifier {
    pub id: ModifierId,
    pub kind: ModifierKind,
    pub value: i64,
    pub duration: Duration,
    /// Card whose effect created this modifier.
    pub source: Option<EntityId>,
    /// Player who controlled the creating effect.
    pub controller: PlayerId,
    /// Game clock value at creation.
    pub timestamp: u64,
}

impl Modifier {
    /// Create a power modifier.
    #[must_use]
    pub fn power(id: ModifierId, value: i64, duration: Duration, controller: PlayerId) -> Self {
        Self {
            id,
            kind: ModifierKind::Power,
            value,
            duration,
            source: None,
            controller,
            timestamp: id.0,
        }
    }

    /// Create a cost modifier.
    #[must_use]
    pub fn cost(id: ModifierId, value: i64, duration: Duration, controller: PlayerId) -> Self {
        Self {
            kind: ModifierKind::Cost,
            ..Self::power(id, value, duration, controller)
        }
    }

    /// Set the source card (builder pattern).
    #[must_use]
    pub fn with_source(mut self, source: EntityId) -> Self {
        self.source = Some(source);
        self
    }

    /// Set the creation timestamp (builder pattern).
    #[must_use]
    pub fn at(mut self, timestamp: u64) -> Self {
        self.timestamp = timestamp;
        self
    }
}
