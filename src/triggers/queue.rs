//! Pending trigger queue.
//!
//! AUTO effects are matched against events by `raise` and appended to
//! `GameState::pending_triggers`; activated effects are appended directly
//! by the action executor. A resolution pass takes a snapshot of the queue,
//! orders it active-player-first (stable within a player), empties the
//! queue and resolves each entry in order. Each entry resolves on its own
//! working copy: if a script fails or panics, that entry's changes are
//! discarded and the pass moves on. Triggers queued while a pass runs wait
//! for the next pass.

use serde::{Deserialize, Serialize};

use crate::core::{EngineError, EntityId, GameState, PlayerId, RulesConfig};
use crate::effects::{
    EffectDefinition, EffectId, EffectOrigin, EffectResolver, EffectTiming, ScriptContext, ScriptError,
    ScriptRegistry,
};
use crate::zones::ZoneError;

use super::event::GameEvent;

/// An effect waiting to resolve.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingTrigger {
    pub source: EntityId,
    pub controller: PlayerId,
    pub effect: EffectDefinition,
    /// The event that caused it.
    pub event: GameEvent,
    /// 0 for the active player's effects, 1 otherwise.
    pub priority: u8,
}

/// Resolution order key: the active player's effects go first.
#[must_use]
pub fn priority_for(state: &GameState, controller: PlayerId) -> u8 {
    if controller == state.active_player {
        0
    } else {
        1
    }
}

/// Append an effect to the pending queue.
pub fn enqueue(
    state: &mut GameState,
    events: &mut Vec<GameEvent>,
    source: EntityId,
    controller: PlayerId,
    effect: EffectDefinition,
    event: GameEvent,
) {
    events.push(GameEvent::EffectTriggered { source, effect: effect.id, controller });
    let priority = priority_for(state, controller);
    state.pending_triggers.push_back(PendingTrigger {
        source,
        controller,
        effect,
        event,
        priority,
    });
}

/// AUTO effects an event fires, in field order.
///
/// Once-per-turn effects already used this turn are left out.
#[must_use]
pub fn auto_triggers(state: &GameState, event: &GameEvent) -> Vec<(EntityId, PlayerId, EffectDefinition)> {
    let on_card = |card: EntityId, timing: EffectTiming| -> Vec<(EntityId, PlayerId, EffectDefinition)> {
        let Some(instance) = state.card(card) else {
            return Vec::new();
        };
        instance
            .definition
            .effects_where(move |t| *t == timing)
            .filter(|e| !(e.once_per_turn && instance.effect_used_on(e.id, state.turn_number)))
            .map(|e| (card, instance.controller, e.clone()))
            .collect()
    };
    let on_field = |player: PlayerId, timing: EffectTiming| -> Vec<(EntityId, PlayerId, EffectDefinition)> {
        state
            .player(player)
            .field_cards()
            .into_iter()
            .flat_map(|card| on_card(card, timing))
            .collect()
    };

    match event {
        GameEvent::CardPlayed { card, .. } => on_card(*card, EffectTiming::OnPlay),
        GameEvent::AttackDeclared { attacker, target, .. } => {
            let mut matched = on_card(*attacker, EffectTiming::WhenAttacking);
            if let Some(defender) = state.card(*target).map(|c| c.controller) {
                matched.extend(on_field(defender, EffectTiming::OnOpponentAttack));
            }
            matched
        }
        GameEvent::BlockDeclared { blocker, .. } => on_card(*blocker, EffectTiming::OnBlock),
        GameEvent::CardKnockedOut { card, .. } => on_card(*card, EffectTiming::OnKo),
        GameEvent::TurnStarted { player, .. } => on_field(*player, EffectTiming::StartOfTurn),
        GameEvent::TurnEnded { player, .. } => on_field(*player, EffectTiming::EndOfTurn),
        _ => Vec::new(),
    }
}

/// Record an event and queue the AUTO effects it fires.
pub fn raise(state: &mut GameState, events: &mut Vec<GameEvent>, event: GameEvent) {
    let matched = auto_triggers(state, &event);
    events.push(event.clone());
    for (source, controller, effect) in matched {
        enqueue(state, events, source, controller, effect, event.clone());
    }
}

/// Check that `player` may activate `effect` on `card` right now.
///
/// Returns the effect definition on success.
pub fn can_activate(
    state: &GameState,
    player: PlayerId,
    card: EntityId,
    effect: EffectId,
) -> Result<EffectDefinition, EngineError> {
    let instance = state.require_card(card)?;
    if instance.controller != player {
        return Err(ZoneError::NotController { entity: card, player }.into());
    }
    if !instance.is_on_field() {
        return Err(ZoneError::NotOnField(card).into());
    }
    let unavailable = || EngineError::EffectUnavailable { card, effect };
    let definition = instance.definition.effect(effect).ok_or_else(unavailable)?;

    let usable = definition.timing == EffectTiming::Activate(state.phase)
        && !(definition.once_per_turn && instance.effect_used_on(effect, state.turn_number))
        && instance.given_don.len() >= definition.don_requirement
        && (!definition.rest_cost || instance.is_active());
    if !usable {
        return Err(unavailable());
    }
    Ok(definition.clone())
}

/// Resolves the pending queue against a working state.
pub struct TriggerQueue<'a> {
    config: &'a RulesConfig,
    scripts: &'a ScriptRegistry,
}

impl<'a> TriggerQueue<'a> {
    pub fn new(config: &'a RulesConfig, scripts: &'a ScriptRegistry) -> Self {
        Self { config, scripts }
    }

    /// Run one resolution pass. Returns how many entries resolved cleanly.
    ///
    /// Entries left when the game ends mid-pass report as failed.
    pub fn resolve_pass(&self, state: &mut GameState, events: &mut Vec<GameEvent>) -> usize {
        let mut batch: Vec<PendingTrigger> = state.pending_triggers.iter().cloned().collect();
        batch.sort_by_key(|t| t.priority);
        state.pending_triggers.clear();

        let mut resolved = 0;
        for entry in batch {
            if state.game_over {
                if self.config.debug {
                    eprintln!("DEBUG: game over, skipping {} of {}", entry.effect.id, entry.source);
                }
                events.push(GameEvent::EffectResolved {
                    source: entry.source,
                    effect: entry.effect.id,
                    success: false,
                });
                continue;
            }
            let mut working = state.clone();
            let mut local = Vec::new();
            match self.resolve_entry(&mut working, &mut local, &entry) {
                Ok(ran) => {
                    *state = working;
                    events.extend(local);
                    events.push(GameEvent::EffectResolved {
                        source: entry.source,
                        effect: entry.effect.id,
                        success: ran,
                    });
                    if ran {
                        resolved += 1;
                    }
                }
                Err(e) => {
                    eprintln!(
                        "WARNING: {} of {} failed and was discarded: {}",
                        entry.effect.id, entry.source, e
                    );
                    events.push(GameEvent::EffectResolved {
                        source: entry.source,
                        effect: entry.effect.id,
                        success: false,
                    });
                }
            }
        }
        resolved
    }

    /// Run passes until the queue is empty, the game is over, or the pass
    /// cap is hit. Entries still queued at the cap are dropped.
    pub fn drain(&self, state: &mut GameState, events: &mut Vec<GameEvent>) -> usize {
        let mut passes = 0;
        while !state.pending_triggers.is_empty() && !state.game_over {
            if passes >= self.config.max_trigger_passes {
                eprintln!(
                    "WARNING: trigger resolution hit {} passes, dropping {} pending",
                    passes,
                    state.pending_triggers.len()
                );
                state.pending_triggers.clear();
                break;
            }
            self.resolve_pass(state, events);
            passes += 1;
        }
        passes
    }

    /// Returns `Ok(false)` when a once-per-turn AUTO effect was already used.
    fn resolve_entry(
        &self,
        state: &mut GameState,
        events: &mut Vec<GameEvent>,
        entry: &PendingTrigger,
    ) -> Result<bool, ScriptError> {
        let definition = &entry.effect;
        if definition.once_per_turn && !definition.timing.is_activate() {
            let turn = state.turn_number;
            if let Some(card) = state.card_mut(entry.source) {
                if card.effect_used_on(definition.id, turn) {
                    return Ok(false);
                }
                card.mark_effect_used(definition.id, turn);
            }
        }

        let origin = EffectOrigin {
            source: entry.source,
            controller: entry.controller,
            effect: definition.id,
        };
        let results =
            EffectResolver::new(self.config).resolve_definition(state, events, definition, origin, &entry.event);
        if self.config.debug {
            for result in results.iter().filter(|r| !r.is_success()) {
                eprintln!("DEBUG: {} of {}: {:?}", definition.id, entry.source, result);
            }
        }

        if let Some(script) = &definition.script {
            let mut ctx = ScriptContext::new(state, self.config, events, origin, &entry.event);
            self.scripts.run(script, &mut ctx)?;
        }
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::cards::{CardDefinition, CardId, CardInstance, Duration};
    use crate::core::Phase;
    use crate::effects::{Effect, EffectTarget};
    use crate::zones::Zone;

    const MINE: EntityId = EntityId(1);
    const THEIRS: EntityId = EntityId(2);

    fn pump(id: u32, timing: EffectTiming) -> EffectDefinition {
        EffectDefinition::new(EffectId(id), timing)
            .with_effect(Effect::power(1000, Duration::UntilEndOfTurn), EffectTarget::Source)
    }

    fn state(effect: EffectDefinition) -> GameState {
        let mut state = GameState::new(PlayerId::FIRST);
        state.phase = Phase::Main;
        let def = Arc::new(CardDefinition::character(CardId::new(1), "Bruiser", 2, 3000).with_effect(effect));
        state.add_card(CardInstance::new(MINE, Arc::clone(&def), PlayerId::FIRST, Zone::Character));
        state.add_card(CardInstance::new(THEIRS, def, PlayerId::SECOND, Zone::Character));
        state
    }

    fn power(state: &GameState, card: EntityId) -> i64 {
        state.power_of(card, &RulesConfig::default()).unwrap()
    }

    #[test]
    fn test_active_player_resolves_first() {
        let mut state = state(pump(1, EffectTiming::OnPlay));
        let event = GameEvent::TurnStarted { turn: 1, player: PlayerId::FIRST };
        let mut events = Vec::new();
        let effect = pump(1, EffectTiming::OnPlay);
        enqueue(&mut state, &mut events, THEIRS, PlayerId::SECOND, effect.clone(), event.clone());
        enqueue(&mut state, &mut events, MINE, PlayerId::FIRST, effect, event);

        let config = RulesConfig::default();
        let scripts = ScriptRegistry::new();
        let mut resolved_order = Vec::new();
        TriggerQueue::new(&config, &scripts).resolve_pass(&mut state, &mut events);
        for e in &events {
            if let GameEvent::EffectResolved { source, .. } = e {
                resolved_order.push(*source);
            }
        }

        assert_eq!(resolved_order, vec![MINE, THEIRS]);
        assert!(state.pending_triggers.is_empty());
    }

    #[test]
    fn test_raise_matches_on_play() {
        let mut state = state(pump(1, EffectTiming::OnPlay));
        let mut events = Vec::new();

        raise(&mut state, &mut events, GameEvent::CardPlayed { card: MINE, player: PlayerId::FIRST });

        assert_eq!(state.pending_triggers.len(), 1);
        assert_eq!(state.pending_triggers[0].priority, 0);
        assert!(matches!(events[0], GameEvent::CardPlayed { .. }));
        assert!(matches!(events[1], GameEvent::EffectTriggered { .. }));
    }

    #[test]
    fn test_opponent_attack_fires_on_defender() {
        let state = state(pump(1, EffectTiming::OnOpponentAttack));
        let event = GameEvent::AttackDeclared { attacker: MINE, target: THEIRS, player: PlayerId::FIRST, power: 3000 };

        let matched = auto_triggers(&state, &event);

        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].0, THEIRS);
        assert_eq!(matched[0].1, PlayerId::SECOND);
    }

    #[test]
    fn test_once_per_turn_auto() {
        let mut state = state(pump(1, EffectTiming::StartOfTurn).once_per_turn());
        let config = RulesConfig::default();
        let scripts = ScriptRegistry::new();
        let queue = TriggerQueue::new(&config, &scripts);
        let mut events = Vec::new();

        raise(&mut state, &mut events, GameEvent::TurnStarted { turn: 1, player: PlayerId::FIRST });
        queue.drain(&mut state, &mut events);
        raise(&mut state, &mut events, GameEvent::TurnStarted { turn: 1, player: PlayerId::FIRST });

        assert_eq!(power(&state, MINE), 4000);
        assert!(state.pending_triggers.is_empty());
    }

    #[test]
    fn test_failed_script_is_discarded() {
        let effect = pump(1, EffectTiming::OnPlay).with_script("explode");
        let mut state = state(effect.clone());
        let mut scripts = ScriptRegistry::new();
        scripts.register("explode", |_ctx| Err(ScriptError::Failed("nope".into())));
        let config = RulesConfig::default();
        let mut events = Vec::new();
        let event = GameEvent::CardPlayed { card: MINE, player: PlayerId::FIRST };
        enqueue(&mut state, &mut events, MINE, PlayerId::FIRST, effect, event);

        let resolved = TriggerQueue::new(&config, &scripts).resolve_pass(&mut state, &mut events);

        assert_eq!(resolved, 0);
        assert_eq!(power(&state, MINE), 3000);
        assert!(events.contains(&GameEvent::EffectResolved { source: MINE, effect: EffectId(1), success: false }));
    }

    #[test]
    fn test_finished_game_reports_skipped_entries() {
        let effect = pump(1, EffectTiming::OnPlay);
        let mut state = state(effect.clone());
        let mut events = Vec::new();
        let event = GameEvent::CardPlayed { card: MINE, player: PlayerId::FIRST };
        enqueue(&mut state, &mut events, MINE, PlayerId::FIRST, effect.clone(), event.clone());
        enqueue(&mut state, &mut events, THEIRS, PlayerId::SECOND, effect, event);
        state.set_game_over(PlayerId::SECOND, crate::core::WinReason::LifeOut);
        let config = RulesConfig::default();
        let scripts = ScriptRegistry::new();
        events.clear();

        let resolved = TriggerQueue::new(&config, &scripts).resolve_pass(&mut state, &mut events);

        assert_eq!(resolved, 0);
        assert_eq!(power(&state, MINE), 3000);
        assert!(state.pending_triggers.is_empty());
        assert_eq!(
            events,
            vec![
                GameEvent::EffectResolved { source: MINE, effect: EffectId(1), success: false },
                GameEvent::EffectResolved { source: THEIRS, effect: EffectId(1), success: false },
            ]
        );
    }

    #[test]
    fn test_drain_stops_at_cap() {
        let looping = EffectDefinition::new(EffectId(1), EffectTiming::OnPlay).with_script("again");
        let mut state = state(looping.clone());
        let mut scripts = ScriptRegistry::new();
        scripts.register("again", |ctx| {
            let loops = ctx.get_flag(ctx.source(), "loops");
            ctx.set_flag(ctx.source(), "loops", loops + 1)?;
            ctx.raise(GameEvent::CardPlayed { card: ctx.source(), player: ctx.controller() });
            Ok(())
        });
        let config = RulesConfig { max_trigger_passes: 3, ..RulesConfig::default() };
        let mut events = Vec::new();
        enqueue(&mut state, &mut events, MINE, PlayerId::FIRST, looping, GameEvent::CardPlayed {
            card: MINE,
            player: PlayerId::FIRST,
        });

        let passes = TriggerQueue::new(&config, &scripts).drain(&mut state, &mut events);

        assert_eq!(passes, 3);
        assert_eq!(state.card(MINE).unwrap().get_flag("loops", 0), 3);
        assert!(state.pending_triggers.is_empty());
    }

    #[test]
    fn test_can_activate_checks() {
        let effect = EffectDefinition::new(EffectId(5), EffectTiming::Activate(Phase::Main))
            .once_per_turn()
            .with_don_requirement(1);
        let mut state = state(effect);

        assert_eq!(
            can_activate(&state, PlayerId::FIRST, MINE, EffectId(5)),
            Err(EngineError::EffectUnavailable { card: MINE, effect: EffectId(5) })
        );

        state.card_mut(MINE).unwrap().given_don.push_back(EntityId(100));
        assert!(can_activate(&state, PlayerId::FIRST, MINE, EffectId(5)).is_ok());

        state.card_mut(MINE).unwrap().mark_effect_used(EffectId(5), 1);
        assert!(can_activate(&state, PlayerId::FIRST, MINE, EffectId(5)).is_err());

        assert_eq!(
            can_activate(&state, PlayerId::FIRST, THEIRS, EffectId(5)),
            Err(EngineError::Zone(ZoneError::NotController { entity: THEIRS, player: PlayerId::FIRST }))
        );
    }
}
