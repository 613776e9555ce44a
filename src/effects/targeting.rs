//! Effect targeting.
//!
//! `EffectTarget` names what an effect applies to relative to the effect's
//! source card and controller. `TargetSelector` turns it into concrete
//! cards or players against a state and the event that fired the effect.

use serde::{Deserialize, Serialize};

use crate::core::{EntityId, GameState, PlayerId};
use crate::triggers::GameEvent;

/// What an effect applies to.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EffectTarget {
    // === Cards ===

    /// The card carrying the effect.
    Source,
    /// The controller's leader.
    OwnLeader,
    /// The opponent's leader.
    OpponentLeader,
    /// Every character the controller controls.
    OwnCharacters,
    /// Every character the opponent controls.
    OpponentCharacters,
    /// Every rested character the opponent controls.
    OpponentRestedCharacters,
    /// The card the firing event is about (attacker, played card, blocker).
    EventSubject,
    /// The card the firing event points at (attack target).
    EventTarget,
    /// A specific card.
    Entity(EntityId),

    // === Players ===

    /// The effect's controller.
    Controller,
    /// The controller's opponent.
    Opponent,
}

/// A resolved target.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Target {
    Card(EntityId),
    Player(PlayerId),
}

/// Resolves an `EffectTarget` for one effect instance.
#[derive(Clone, Debug)]
pub struct TargetSelector {
    target: EffectTarget,
    controller: PlayerId,
    source: EntityId,
}

impl TargetSelector {
    /// Create a selector for an effect of `source` controlled by `controller`.
    pub fn new(target: EffectTarget, controller: PlayerId, source: EntityId) -> Self {
        Self { target, controller, source }
    }

    /// Concrete targets, in a stable order.
    ///
    /// Cards that no longer exist are dropped; an empty result means the
    /// effect has nothing to do.
    pub fn resolve(&self, state: &GameState, event: &GameEvent) -> Vec<Target> {
        let me = self.controller;
        let them = me.opponent();
        let cards: Vec<EntityId> = match &self.target {
            EffectTarget::Controller => return vec![Target::Player(me)],
            EffectTarget::Opponent => return vec![Target::Player(them)],
            EffectTarget::Source => vec![self.source],
            EffectTarget::OwnLeader => state.player(me).leader.into_iter().collect(),
            EffectTarget::OpponentLeader => state.player(them).leader.into_iter().collect(),
            EffectTarget::OwnCharacters => state.player(me).characters.iter().copied().collect(),
            EffectTarget::OpponentCharacters => state.player(them).characters.iter().copied().collect(),
            EffectTarget::OpponentRestedCharacters => state
                .player(them)
                .characters
                .iter()
                .copied()
                .filter(|c| state.card(*c).map_or(false, |card| card.is_rested()))
                .collect(),
            EffectTarget::EventSubject => event.subject().into_iter().collect(),
            EffectTarget::EventTarget => event.target().into_iter().collect(),
            EffectTarget::Entity(id) => vec![*id],
        };

        cards
            .into_iter()
            .filter(|c| state.card(*c).is_some())
            .map(Target::Card)
            .collect()
    }
}
