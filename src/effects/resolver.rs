//! Effect resolution - executing effects on game state.
//!
//! The `EffectResolver` applies declarative effects to a working copy of the
//! state and records the events they produce. Per-target failures (a card
//! that already left the field, an empty deck) are reported as
//! `ResolveResult::Failed` and do not abort the rest of the effect.

use crate::cards::{CardCategory, CardState, Modifier};
use crate::core::{EntityId, GameState, PlayerId, RulesConfig};
use crate::triggers::{raise, GameEvent};
use crate::zones::{self, Zone, ZoneError, ZonePosition};

use super::effect::{Effect, EffectDefinition, EffectId, TargetedEffect};
use super::targeting::{Target, TargetSelector};

/// Who is resolving an effect.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EffectOrigin {
    pub source: EntityId,
    pub controller: PlayerId,
    pub effect: EffectId,
}

/// Result of resolving an effect on one target.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ResolveResult {
    /// Effect resolved successfully.
    Success,
    /// Effect failed (e.g., invalid target).
    Failed(String),
    /// Nothing to apply to.
    Skipped,
}

impl ResolveResult {
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, ResolveResult::Success)
    }
}

/// Resolves effects on game state.
pub struct EffectResolver<'a> {
    config: &'a RulesConfig,
}

impl<'a> EffectResolver<'a> {
    pub fn new(config: &'a RulesConfig) -> Self {
        Self { config }
    }

    /// Resolve the declarative body of an effect definition.
    pub fn resolve_definition(
        &self,
        state: &mut GameState,
        events: &mut Vec<GameEvent>,
        definition: &EffectDefinition,
        origin: EffectOrigin,
        event: &GameEvent,
    ) -> Vec<ResolveResult> {
        definition
            .effects
            .iter()
            .flat_map(|targeted| self.resolve_targeted(state, events, targeted, origin, event))
            .collect()
    }

    /// Resolve one targeted effect against every target it names.
    pub fn resolve_targeted(
        &self,
        state: &mut GameState,
        events: &mut Vec<GameEvent>,
        targeted: &TargetedEffect,
        origin: EffectOrigin,
        event: &GameEvent,
    ) -> Vec<ResolveResult> {
        let targets = TargetSelector::new(targeted.target.clone(), origin.controller, origin.source)
            .resolve(state, event);
        if targets.is_empty() {
            return vec![ResolveResult::Skipped];
        }
        targets
            .into_iter()
            .map(|target| self.apply(state, events, &targeted.effect, target, origin))
            .collect()
    }

    /// Apply a single effect to a single target.
    pub fn apply(
        &self,
        state: &mut GameState,
        events: &mut Vec<GameEvent>,
        effect: &Effect,
        target: Target,
        origin: EffectOrigin,
    ) -> ResolveResult {
        match (effect, target) {
            (Effect::ModifyPower { amount, duration }, Target::Card(card)) => {
                let Some(old) = state
                    .card(card)
                    .filter(|c| c.is_on_field())
                    .map(|c| c.power(self.config.don_power_bonus))
                else {
                    return ResolveResult::Failed(format!("{} is not on the field", card));
                };
                let id = state.next_modifier_id();
                let modifier = Modifier::power(id, *amount, *duration, origin.controller)
                    .with_source(origin.source)
                    .at(state.clock);
                let Some(instance) = state.card_mut(card) else {
                    return ResolveResult::Failed(format!("{} not found", card));
                };
                instance.add_modifier(modifier);
                let new = instance.power(self.config.don_power_bonus);
                events.push(GameEvent::PowerChanged { card, old, new });
                ResolveResult::Success
            }

            (Effect::ModifyCost { amount, duration }, Target::Card(card)) => {
                let id = state.next_modifier_id();
                let modifier = Modifier::cost(id, *amount, *duration, origin.controller)
                    .with_source(origin.source)
                    .at(state.clock);
                match state.card_mut(card) {
                    Some(instance) => {
                        instance.add_modifier(modifier);
                        ResolveResult::Success
                    }
                    None => ResolveResult::Failed(format!("{} not found", card)),
                }
            }

            (Effect::MoveTo { zone, position }, Target::Card(card)) => {
                to_result(zones::move_card(state, self.config, card, *zone, *position, events))
            }

            (Effect::KnockOut, Target::Card(card)) => {
                to_result(knock_out(state, self.config, card, events))
            }

            (Effect::Draw { count }, Target::Player(player)) => {
                let drawn = (0..*count)
                    .take_while(|_| zones::draw(state, player, events).is_ok())
                    .count();
                if drawn > 0 || *count == 0 {
                    ResolveResult::Success
                } else {
                    ResolveResult::Failed("Deck was empty".to_string())
                }
            }

            (Effect::AddDon { count }, Target::Player(player)) => {
                zones::add_don_to_cost_area(state, player, *count, events);
                ResolveResult::Success
            }

            (Effect::Rest, Target::Card(card)) => {
                to_result(zones::set_card_state(state, card, CardState::Rested, events))
            }

            (Effect::SetActive, Target::Card(card)) => {
                to_result(zones::set_card_state(state, card, CardState::Active, events))
            }

            (Effect::SetFlag { key, value }, Target::Card(card)) => match state.card_mut(card) {
                Some(instance) => {
                    instance.set_flag(key.clone(), *value);
                    ResolveResult::Success
                }
                None => ResolveResult::Failed(format!("{} not found", card)),
            },

            (Effect::Batch(effects), target) => {
                let mut result = ResolveResult::Success;
                for inner in effects {
                    let r = self.apply(state, events, inner, target, origin);
                    if !r.is_success() && result.is_success() {
                        result = r;
                    }
                }
                result
            }

            (_, Target::Player(_)) => ResolveResult::Failed("Target is a player, not a card".to_string()),
            (_, Target::Card(_)) => ResolveResult::Failed("Target is a card, not a player".to_string()),
        }
    }
}

fn to_result(result: Result<(), ZoneError>) -> ResolveResult {
    match result {
        Ok(()) => ResolveResult::Success,
        Err(e) => ResolveResult::Failed(e.to_string()),
    }
}

/// Knock out a character: trash it and raise `CardKnockedOut`.
///
/// Leaders cannot be knocked out.
pub fn knock_out(
    state: &mut GameState,
    config: &RulesConfig,
    card: EntityId,
    events: &mut Vec<GameEvent>,
) -> Result<(), ZoneError> {
    let instance = state.require_card(card)?;
    if !instance.is_on_field() {
        return Err(ZoneError::NotOnField(card));
    }
    if instance.category() != CardCategory::Character {
        return Err(ZoneError::InvalidTarget(card));
    }
    let owner = instance.owner;
    zones::move_card(state, config, card, Zone::Trash, ZonePosition::Top, events)?;
    raise(state, events, GameEvent::CardKnockedOut { card, owner });
    Ok(())
}

/// Drop every modifier matching `pred` from every card. Field cards whose
/// power moved get a `PowerChanged`.
pub fn expire_modifiers(
    state: &mut GameState,
    config: &RulesConfig,
    pred: impl Fn(&Modifier) -> bool,
    events: &mut Vec<GameEvent>,
) {
    let mut carrying: Vec<EntityId> = state
        .cards
        .iter()
        .filter(|(_, card)| card.modifiers.iter().any(&pred))
        .map(|(id, _)| *id)
        .collect();
    carrying.sort_unstable();

    for card in carrying {
        let Some(instance) = state.card_mut(card) else { continue };
        let old = instance.power(config.don_power_bonus);
        instance.expire_modifiers(&pred);
        let new = instance.power(config.don_power_bonus);
        if instance.is_on_field() && old != new {
            events.push(GameEvent::PowerChanged { card, old, new });
        }
    }
}
