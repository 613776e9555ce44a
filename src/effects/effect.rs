//! Effect definitions.
//!
//! An `EffectDefinition` is one ability printed on a card: when it fires
//! (`EffectTiming`), what it costs to activate, and what it does. The body
//! is a list of declarative `TargetedEffect`s, an optional named script, or
//! both; declarative parts resolve first.

use serde::{Deserialize, Serialize};

use super::script::ScriptId;
use super::targeting::EffectTarget;
use crate::cards::Duration;
use crate::core::Phase;
use crate::zones::{Zone, ZonePosition};

/// Identifier of an effect within its card definition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EffectId(pub u32);

impl std::fmt::Display for EffectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Effect({})", self.0)
    }
}

/// When an effect fires.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EffectTiming {
    /// The card was played from hand.
    OnPlay,
    /// Activated by its controller during the given phase.
    Activate(Phase),
    /// This card declared an attack.
    WhenAttacking,
    /// One of the controller's cards was attacked.
    OnOpponentAttack,
    /// This card was declared as a blocker.
    OnBlock,
    /// This card was knocked out.
    OnKo,
    /// Start of the controller's turn.
    StartOfTurn,
    /// End of the controller's turn.
    EndOfTurn,
    /// Revealed from the life zone as damage.
    Trigger,
}

impl EffectTiming {
    /// Activated (player-initiated) rather than automatic.
    #[must_use]
    pub fn is_activate(&self) -> bool {
        matches!(self, EffectTiming::Activate(_))
    }
}

/// An atomic effect.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Effect {
    // === Card Values ===

    /// Add a power modifier.
    /// Target: field card
    ModifyPower { amount: i64, duration: Duration },

    /// Add a cost modifier.
    /// Target: any card
    ModifyCost { amount: i64, duration: Duration },

    // === Card Movement ===

    /// Move a card to a zone of its owner.
    /// Target: card
    MoveTo { zone: Zone, position: ZonePosition },

    /// Knock out a character (trash it and fire `OnKo`).
    /// Target: field character
    KnockOut,

    /// Draw cards.
    /// Target: player
    Draw { count: usize },

    /// Move DON!! from the DON!! deck to the cost area.
    /// Target: player
    AddDon { count: usize },

    // === Card State ===

    Rest,
    SetActive,

    /// Set a bookkeeping flag.
    /// Target: card
    SetFlag { key: String, value: i64 },

    // === Composite ===

    /// Execute multiple effects in sequence.
    Batch(Vec<Effect>),
}

impl Effect {
    /// Power boost for a duration.
    pub fn power(amount: i64, duration: Duration) -> Self {
        Self::ModifyPower { amount, duration }
    }

    /// Draw `count` cards.
    pub fn draw(count: usize) -> Self {
        Self::Draw { count }
    }

    /// Move to the top of a zone.
    pub fn move_to(zone: Zone) -> Self {
        Self::MoveTo { zone, position: ZonePosition::Top }
    }

    /// Create a batch of effects.
    pub fn batch(effects: impl IntoIterator<Item = Effect>) -> Self {
        Self::Batch(effects.into_iter().collect())
    }
}

/// An effect paired with what it applies to.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetedEffect {
    pub effect: Effect,
    pub target: EffectTarget,
}

/// One ability of a card.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectDefinition {
    pub id: EffectId,
    pub timing: EffectTiming,
    /// Declarative body, resolved in order.
    pub effects: Vec<TargetedEffect>,
    /// Named script run after the declarative body.
    pub script: Option<ScriptId>,
    /// May only be used once per turn per card.
    pub once_per_turn: bool,
    /// Attached DON!! the card needs for the effect to be usable.
    pub don_requirement: usize,
    /// Activation cost: rest this card.
    pub rest_cost: bool,
    pub description: String,
}

impl EffectDefinition {
    /// Create an effect with an empty body.
    #[must_use]
    pub fn new(id: EffectId, timing: EffectTiming) -> Self {
        Self {
            id,
            timing,
            effects: Vec::new(),
            script: None,
            once_per_turn: false,
            don_requirement: 0,
            rest_cost: false,
            description: String::new(),
        }
    }

    /// Add a declarative effect (builder pattern).
    #[must_use]
    pub fn with_effect(mut self, effect: Effect, target: EffectTarget) -> Self {
        self.effects.push(TargetedEffect { effect, target });
        self
    }

    /// Set the script (builder pattern).
    #[must_use]
    pub fn with_script(mut self, script: impl Into<ScriptId>) -> Self {
        self.script = Some(script.into());
        self
    }

    /// Mark once-per-turn (builder pattern).
    #[must_use]
    pub fn once_per_turn(mut self) -> Self {
        self.once_per_turn = true;
        self
    }

    /// Require attached DON!! (builder pattern).
    #[must_use]
    pub fn with_don_requirement(mut self, count: usize) -> Self {
        self.don_requirement = count;
        self
    }

    /// Add a rest-this-card cost (builder pattern).
    #[must_use]
    pub fn with_rest_cost(mut self) -> Self {
        self.rest_cost = true;
        self
    }

    /// Set the description (builder pattern).
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}
