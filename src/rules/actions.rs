//! Action execution.
//!
//! `execute_action` is the boundary between a player's choice and the
//! state: the action either fully applies (triggers drained, events
//! published) or is rejected with the caller's state. Internal errors and
//! panics are caught here, logged, and reported with a generic message.

use std::panic::{catch_unwind, AssertUnwindSafe};

use crate::agents::PlayerAgent;
use crate::cards::{CardCategory, CardState};
use crate::core::{Action, EngineError, EntityId, GameState, PlayerId};
use crate::effects::EffectId;
use crate::triggers::{can_activate, enqueue, raise, GameEvent};
use crate::zones::{self, Zone, ZonePosition};

use super::battle::BattleResolver;
use super::engine::{ActionResult, GameEngine};
use super::legal;

impl GameEngine {
    /// Validate and apply one Main-phase action for `player`.
    ///
    /// `defender` answers block and counter prompts if the action is an
    /// attack. `state` is never modified.
    pub fn execute_action(
        &self,
        state: &GameState,
        player: PlayerId,
        action: &Action,
        defender: &mut dyn PlayerAgent,
    ) -> ActionResult {
        if let Err(error) = legal::check_turn(state, player) {
            return self.reject(state, player, action, error);
        }

        // An attack that passes validation stays marked even if it fails later.
        let mut base = state.clone();
        if let Action::Attack { attacker, target } = *action {
            if let Err(error) = legal::check_attack(state, player, attacker, target, self.config()) {
                return self.reject(state, player, action, error);
            }
            base.mark_attacked(attacker);
        }

        let mut working = base.clone();
        let mut events = Vec::new();
        let applied = catch_unwind(AssertUnwindSafe(|| {
            self.apply(&mut working, &mut events, player, action, defender)
        }))
        .unwrap_or_else(|panic| {
            let detail = panic
                .downcast_ref::<&str>()
                .map(|s| (*s).to_string())
                .or_else(|| panic.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            Err(EngineError::internal(detail))
        });

        match applied {
            Ok(()) => {
                working.record_action(player, action.clone());
                self.triggers().drain(&mut working, &mut events);
                if self.config().debug {
                    eprintln!("DEBUG: {} {} applied", player, action.verb());
                }
                self.commit(events);
                ActionResult::accepted(working)
            }
            Err(error) if error.is_internal() => {
                eprintln!("WARNING: {} {} hit an internal error: {}", player, action.verb(), error);
                self.reject(&base, player, action, EngineError::internal("action could not be applied"))
            }
            Err(error) => self.reject(&base, player, action, error),
        }
    }

    fn reject(&self, state: &GameState, player: PlayerId, action: &Action, error: EngineError) -> ActionResult {
        if self.config().debug {
            eprintln!("DEBUG: rejected {} from {}: {}", action.verb(), player, error);
        }
        self.events().emit(GameEvent::ActionRejected {
            player,
            action: action.clone(),
            reason: error.to_string(),
        });
        ActionResult::rejected(state.clone(), error)
    }

    fn apply(
        &self,
        state: &mut GameState,
        events: &mut Vec<GameEvent>,
        player: PlayerId,
        action: &Action,
        defender: &mut dyn PlayerAgent,
    ) -> Result<(), EngineError> {
        match *action {
            Action::PlayCard { card } => self.play_card(state, events, player, card),
            Action::GiveDon { don, target } => {
                zones::give_don(state, self.config(), player, don, target, events)?;
                Ok(())
            }
            Action::ActivateEffect { card, effect } => self.activate(state, events, player, card, effect),
            Action::Attack { attacker, target } => {
                BattleResolver::new(self.config(), self.triggers())
                    .resolve(state, events, attacker, target, defender)
                    .map(|_| ())
            }
            Action::EndPhase => Ok(()),
        }
    }

    fn play_card(
        &self,
        state: &mut GameState,
        events: &mut Vec<GameEvent>,
        player: PlayerId,
        card: EntityId,
    ) -> Result<(), EngineError> {
        legal::can_play(state, player, card, self.config())?;
        let instance = state.require_card(card)?;
        let cost = instance.cost();
        let dest = match instance.category() {
            CardCategory::Character => Zone::Character,
            CardCategory::Stage => Zone::Stage,
            CardCategory::Event => Zone::Trash,
            CardCategory::Leader => return Err(EngineError::internal("leader in hand")),
        };

        zones::rest_active_don(state, player, cost, events);
        if dest == Zone::Stage {
            if let Some(old) = state.player(player).stage {
                zones::move_card(state, self.config(), old, Zone::Trash, ZonePosition::Top, events)?;
            }
        }
        zones::move_card(state, self.config(), card, dest, ZonePosition::Top, events)?;
        raise(state, events, GameEvent::CardPlayed { card, player });
        Ok(())
    }

    fn activate(
        &self,
        state: &mut GameState,
        events: &mut Vec<GameEvent>,
        player: PlayerId,
        card: EntityId,
        effect: EffectId,
    ) -> Result<(), EngineError> {
        let definition = can_activate(state, player, card, effect)?;
        if definition.rest_cost {
            zones::set_card_state(state, card, CardState::Rested, events)?;
        }
        let turn = state.turn_number;
        if let Some(instance) = state.card_mut(card) {
            instance.mark_effect_used(effect, turn);
        }

        let activated = GameEvent::EffectActivated { card, effect, player };
        events.push(activated.clone());
        enqueue(state, events, card, player, definition, activated);
        Ok(())
    }
}
