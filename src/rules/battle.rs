//! Battle resolution.
//!
//! One declared attack runs through these steps in order:
//! 1. Rest the attacker and declare (`WhenAttacking`, `OnOpponentAttack`)
//! 2. Block: the defender may swap in an active `Blocker`
//! 3. Counter: the defender may trash hand cards for `ThisBattle` power
//! 4. Compare power; damage the leader or knock out the character
//! 5. End the battle and expire `ThisBattle` modifiers
//!
//! The attacked mark is written by the caller before any of this runs. Any
//! error aborts the whole battle; the caller discards the working state.

use crate::agents::PlayerAgent;
use crate::cards::{CardCategory, CardState, Duration, Keyword, Modifier};
use crate::core::{EngineError, EntityId, GameState, PlayerId, RulesConfig, WinReason};
use crate::effects::{expire_modifiers, knock_out, EffectTiming};
use crate::triggers::{enqueue, raise, BattleOutcome, GameEvent, TriggerQueue};
use crate::zones::{self, Zone, ZonePosition};

use super::end_game;

/// Runs a single attack against a working state.
pub struct BattleResolver<'a> {
    config: &'a RulesConfig,
    triggers: TriggerQueue<'a>,
}

impl<'a> BattleResolver<'a> {
    pub fn new(config: &'a RulesConfig, triggers: TriggerQueue<'a>) -> Self {
        Self { config, triggers }
    }

    /// Resolve `attacker` attacking `target`, asking `defender` for blocks
    /// and counters.
    pub fn resolve(
        &self,
        state: &mut GameState,
        events: &mut Vec<GameEvent>,
        attacker: EntityId,
        target: EntityId,
        defender: &mut dyn PlayerAgent,
    ) -> Result<BattleOutcome, EngineError> {
        let player = state.require_card(attacker)?.controller;
        let defending = state.require_card(target)?.controller;

        zones::set_card_state(state, attacker, CardState::Rested, events)?;
        let power = self.power(state, attacker)?;
        if self.config.debug {
            eprintln!("DEBUG: {} attacks {} with {} power", attacker, target, power);
        }
        raise(state, events, GameEvent::AttackDeclared { attacker, target, player, power });
        self.triggers.drain(state, events);
        if self.fizzled(state, attacker, target) {
            return Ok(self.finish(state, events, attacker, target, BattleOutcome::Fizzled));
        }

        let target = self.block_step(state, events, attacker, target, defending, defender)?;
        if self.fizzled(state, attacker, target) {
            return Ok(self.finish(state, events, attacker, target, BattleOutcome::Fizzled));
        }

        self.counter_step(state, events, target, defending, defender)?;

        let attack = self.power(state, attacker)?;
        let defense = self.power(state, target)?;
        let outcome = match state.require_card(target)?.category() {
            CardCategory::Leader => {
                if self.config.leader_power_check && attack < defense {
                    BattleOutcome::Repelled
                } else {
                    let double = state.require_card(attacker)?.has_keyword(Keyword::DoubleAttack);
                    let banish = state.require_card(attacker)?.has_keyword(Keyword::Banish);
                    let damage = if double { 2 } else { 1 };
                    self.damage_leader(state, events, defending, damage, banish)?;
                    BattleOutcome::LeaderDamaged { damage }
                }
            }
            CardCategory::Character if attack >= defense => {
                knock_out(state, self.config, target, events)?;
                BattleOutcome::CharacterKnockedOut
            }
            CardCategory::Character => BattleOutcome::Repelled,
            CardCategory::Event | CardCategory::Stage => {
                return Err(EngineError::internal(format!("{} is not a battle target", target)));
            }
        };

        Ok(self.finish(state, events, attacker, target, outcome))
    }

    fn power(&self, state: &GameState, card: EntityId) -> Result<i64, EngineError> {
        Ok(state.require_card(card)?.power(self.config.don_power_bonus))
    }

    fn fizzled(&self, state: &GameState, attacker: EntityId, target: EntityId) -> bool {
        state.game_over
            || [attacker, target]
                .iter()
                .any(|c| state.card(*c).map_or(true, |i| !i.is_on_field()))
    }

    /// Returns the card now being attacked.
    fn block_step(
        &self,
        state: &mut GameState,
        events: &mut Vec<GameEvent>,
        attacker: EntityId,
        target: EntityId,
        defending: PlayerId,
        defender: &mut dyn PlayerAgent,
    ) -> Result<EntityId, EngineError> {
        let candidates = blockers(state, defending, target);
        if candidates.is_empty() {
            return Ok(target);
        }
        let Some(blocker) = defender
            .choose_blocker(state, attacker, &candidates)
            .filter(|b| candidates.contains(b))
        else {
            return Ok(target);
        };

        zones::set_card_state(state, blocker, CardState::Rested, events)?;
        raise(
            state,
            events,
            GameEvent::BlockDeclared { blocker, attacker, original_target: target, player: defending },
        );
        self.triggers.drain(state, events);
        Ok(blocker)
    }

    fn counter_step(
        &self,
        state: &mut GameState,
        events: &mut Vec<GameEvent>,
        target: EntityId,
        defending: PlayerId,
        defender: &mut dyn PlayerAgent,
    ) -> Result<(), EngineError> {
        let candidates = counters(state, defending);
        let mut chosen = if candidates.is_empty() {
            Vec::new()
        } else {
            defender.choose_counters(state, target, &candidates)
        };
        let mut seen = Vec::new();
        chosen.retain(|c| {
            let keep = candidates.contains(c) && !seen.contains(c);
            seen.push(*c);
            keep
        });

        let old = self.power(state, target)?;
        let mut boost = 0;
        for &card in &chosen {
            let value = state.require_card(card)?.definition.counter.unwrap_or(0);
            zones::move_card(state, self.config, card, Zone::Trash, ZonePosition::Top, events)?;
            let id = state.next_modifier_id();
            let modifier = Modifier::power(id, value, Duration::ThisBattle, defending).with_source(card);
            state
                .card_mut(target)
                .ok_or(zones::ZoneError::CardNotFound(target))?
                .add_modifier(modifier);
            boost += value;
        }

        events.push(GameEvent::CounterStep { defender: defending, target, cards: chosen, boost });
        if boost != 0 {
            let new = self.power(state, target)?;
            events.push(GameEvent::PowerChanged { card: target, old, new });
        }
        Ok(())
    }

    fn damage_leader(
        &self,
        state: &mut GameState,
        events: &mut Vec<GameEvent>,
        defending: PlayerId,
        damage: usize,
        banish: bool,
    ) -> Result<(), EngineError> {
        for _ in 0..damage {
            let Some(card) = state.player(defending).life.last().copied() else {
                end_game(state, events, defending.opponent(), WinReason::LifeOut);
                return Ok(());
            };

            let life_triggers: Vec<_> = state
                .require_card(card)?
                .definition
                .effects_where(|t| *t == EffectTiming::Trigger)
                .cloned()
                .collect();
            let activate = self.config.auto_activate_life_triggers && !life_triggers.is_empty();
            let to = if activate || banish { Zone::Trash } else { Zone::Hand };
            zones::move_card(state, self.config, card, to, ZonePosition::Top, events)?;

            let remaining = state.player(defending).life.len();
            let lost = GameEvent::LifeLost { player: defending, card, remaining };
            events.push(lost.clone());
            if activate {
                for effect in life_triggers {
                    enqueue(state, events, card, defending, effect, lost.clone());
                }
            }

            if remaining == 0 {
                end_game(state, events, defending.opponent(), WinReason::LifeOut);
                return Ok(());
            }
        }
        Ok(())
    }

    fn finish(
        &self,
        state: &mut GameState,
        events: &mut Vec<GameEvent>,
        attacker: EntityId,
        target: EntityId,
        outcome: BattleOutcome,
    ) -> BattleOutcome {
        events.push(GameEvent::BattleEnded { attacker, target, outcome });
        expire_modifiers(state, self.config, |m| m.duration == Duration::ThisBattle, events);
        self.triggers.drain(state, events);
        outcome
    }
}

/// Active `Blocker` characters of `player` other than the current target.
#[must_use]
pub fn blockers(state: &GameState, player: PlayerId, target: EntityId) -> Vec<EntityId> {
    state
        .player(player)
        .characters
        .iter()
        .copied()
        .filter(|&c| c != target)
        .filter(|c| {
            state
                .card(*c)
                .map_or(false, |i| i.is_active() && i.has_keyword(Keyword::Blocker))
        })
        .collect()
}

/// Hand cards of `player` with a counter value.
#[must_use]
pub fn counters(state: &GameState, player: PlayerId) -> Vec<EntityId> {
    state
        .player(player)
        .hand
        .iter()
        .copied()
        .filter(|c| state.card(*c).map_or(false, |i| i.definition.counter.is_some()))
        .collect()
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::agents::{PassingAgent, ScriptedAgent};
    use crate::cards::{CardDefinition, CardId, CardInstance};
    use crate::effects::ScriptRegistry;

    const LEADER: EntityId = EntityId(1);
    const FOE_LEADER: EntityId = EntityId(2);
    const ATTACKER: EntityId = EntityId(3);
    const FOE_CHAR: EntityId = EntityId(4);
    const BLOCKER: EntityId = EntityId(5);
    const COUNTER: EntityId = EntityId(6);

    fn board() -> GameState {
        let mut state = GameState::new(PlayerId::FIRST);
        state.turn_number = 3;
        let leader = Arc::new(CardDefinition::leader(CardId::new(1), "Captain", 5000, 2));
        let grunt = Arc::new(CardDefinition::character(CardId::new(2), "Grunt", 2, 5000));
        let wall = Arc::new(CardDefinition::character(CardId::new(3), "Wall", 2, 6000).with_keyword(Keyword::Blocker));
        let dodge = Arc::new(CardDefinition::event(CardId::new(4), "Dodge", 1).with_counter(2000));
        state.add_card(CardInstance::new(LEADER, Arc::clone(&leader), PlayerId::FIRST, Zone::Leader));
        state.add_card(CardInstance::new(FOE_LEADER, leader, PlayerId::SECOND, Zone::Leader));
        state.add_card(CardInstance::new(ATTACKER, Arc::clone(&grunt), PlayerId::FIRST, Zone::Character));
        state.add_card(CardInstance::new(FOE_CHAR, Arc::clone(&grunt), PlayerId::SECOND, Zone::Character));
        state.add_card(CardInstance::new(BLOCKER, wall, PlayerId::SECOND, Zone::Character));
        state.add_card(CardInstance::new(COUNTER, dodge, PlayerId::SECOND, Zone::Hand));
        for n in 0..2 {
            state.add_card(CardInstance::new(EntityId(40 + n), Arc::clone(&grunt), PlayerId::SECOND, Zone::Life));
        }
        state.card_mut(FOE_CHAR).unwrap().state = CardState::Rested;
        state
    }

    fn run(state: &mut GameState, target: EntityId, defender: &mut dyn PlayerAgent) -> (BattleOutcome, Vec<GameEvent>) {
        let config = RulesConfig::default();
        let scripts = ScriptRegistry::default();
        let resolver = BattleResolver::new(&config, TriggerQueue::new(&config, &scripts));
        let mut events = Vec::new();
        let outcome = resolver.resolve(state, &mut events, ATTACKER, target, defender).unwrap();
        (outcome, events)
    }

    #[test]
    fn test_leader_hit_moves_life_to_hand() {
        let mut state = board();
        let (outcome, events) = run(&mut state, FOE_LEADER, &mut PassingAgent);

        assert_eq!(outcome, BattleOutcome::LeaderDamaged { damage: 1 });
        assert_eq!(state.player(PlayerId::SECOND).life.len(), 1);
        assert!(state.player(PlayerId::SECOND).hand.contains(&EntityId(41)));
        assert!(state.card(ATTACKER).unwrap().is_rested());
        assert!(matches!(events.last(), Some(GameEvent::BattleEnded { .. })));
        assert!(!state.game_over);
    }

    #[test]
    fn test_last_life_loses() {
        let mut state = board();
        let life: Vec<_> = state.player(PlayerId::SECOND).life.iter().copied().collect();
        state.player_mut(PlayerId::SECOND).life.pop_back();
        state.player_mut(PlayerId::SECOND).hand.push_back(life[1]);
        state.card_mut(life[1]).unwrap().zone = Zone::Hand;

        let (_, events) = run(&mut state, FOE_LEADER, &mut PassingAgent);

        assert!(state.game_over);
        assert_eq!(state.winner, Some(PlayerId::FIRST));
        assert_eq!(state.win_reason, Some(WinReason::LifeOut));
        assert!(events.contains(&GameEvent::GameOver { winner: PlayerId::FIRST, reason: WinReason::LifeOut }));
    }

    #[test]
    fn test_equal_power_knocks_out() {
        let mut state = board();
        let (outcome, _) = run(&mut state, FOE_CHAR, &mut PassingAgent);

        assert_eq!(outcome, BattleOutcome::CharacterKnockedOut);
        assert_eq!(state.card(FOE_CHAR).unwrap().zone, Zone::Trash);
    }

    #[test]
    fn test_block_redirects_and_repels() {
        let mut state = board();
        let mut defender = ScriptedAgent::new().block_with(Some(BLOCKER));

        let (outcome, events) = run(&mut state, FOE_LEADER, &mut defender);

        assert_eq!(outcome, BattleOutcome::Repelled);
        assert!(state.card(BLOCKER).unwrap().is_rested());
        assert_eq!(state.player(PlayerId::SECOND).life.len(), 2);
        assert!(events.iter().any(|e| matches!(e, GameEvent::BlockDeclared { blocker: BLOCKER, .. })));
    }

    #[test]
    fn test_counter_saves_character_and_expires() {
        let mut state = board();
        let mut defender = ScriptedAgent::new().counter_with(vec![COUNTER]);

        let (outcome, events) = run(&mut state, FOE_CHAR, &mut defender);

        assert_eq!(outcome, BattleOutcome::Repelled);
        assert_eq!(state.card(FOE_CHAR).unwrap().zone, Zone::Character);
        assert_eq!(state.card(COUNTER).unwrap().zone, Zone::Trash);
        assert!(!state.card(FOE_CHAR).unwrap().has_modifier_with(Duration::ThisBattle));
        assert!(events.contains(&GameEvent::CounterStep {
            defender: PlayerId::SECOND,
            target: FOE_CHAR,
            cards: vec![COUNTER],
            boost: 2000,
        }));
    }

    #[test]
    fn test_double_attack_and_banish() {
        let mut state = board();
        let def = CardDefinition::character(CardId::new(8), "Brute", 4, 6000)
            .with_keyword(Keyword::DoubleAttack)
            .with_keyword(Keyword::Banish);
        state.card_mut(ATTACKER).unwrap().definition = Arc::new(def);

        let (outcome, _) = run(&mut state, FOE_LEADER, &mut PassingAgent);

        assert_eq!(outcome, BattleOutcome::LeaderDamaged { damage: 2 });
        assert_eq!(state.player(PlayerId::SECOND).hand.len(), 1);
        assert_eq!(state.player(PlayerId::SECOND).trash.len(), 2);
        assert!(state.game_over);
    }
}
