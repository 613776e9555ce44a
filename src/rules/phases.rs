//! Turn and phase sequencing.
//!
//! A turn is: start-of-turn hook, the configured phases in order, then the
//! end-of-turn hook and the hand-over to the other player. Game over after
//! any phase skips the remaining phases, but the turn still ends and
//! advances so turn bookkeeping stays consistent.

use crate::agents::Agents;
use crate::cards::{CardState, Duration, Modifier};
use crate::core::{Action, GameState, Phase, PlayerId, RulesConfig, WinReason};
use crate::effects::expire_modifiers;
use crate::triggers::{raise, GameEvent};
use crate::zones::{self, ZoneError};

use super::engine::GameEngine;
use super::{end_game, legal};

impl GameEngine {
    /// Play one full turn for the active player.
    pub async fn run_turn(&self, state: &GameState, agents: &mut Agents) -> GameState {
        let mut current = state.clone();
        if current.game_over {
            return current;
        }

        let mut events = Vec::new();
        let turn = current.turn_number;
        let player = current.active_player;
        if self.config().debug {
            eprintln!("DEBUG: turn {} begins for {}", turn, player);
        }
        raise(&mut current, &mut events, GameEvent::TurnStarted { turn, player });
        self.triggers().drain(&mut current, &mut events);
        self.commit(events);

        for &phase in &self.config().phase_order {
            if current.game_over {
                break;
            }
            current = self.run_phase(&current, phase, agents).await;
        }

        self.finish_turn(&current)
    }

    /// Enter `phase` and run it, including the Main-phase action loop.
    pub async fn run_phase(&self, state: &GameState, phase: Phase, agents: &mut Agents) -> GameState {
        let entered = self.step_phase(state, phase);
        if phase == Phase::Main {
            self.main_loop(&entered, agents).await
        } else {
            entered
        }
    }

    /// Enter `phase` and apply its automatic work.
    ///
    /// For `Main` this only switches the phase; the action loop is
    /// `run_phase`'s job.
    #[must_use]
    pub fn step_phase(&self, state: &GameState, phase: Phase) -> GameState {
        let mut next = state.clone();
        let mut events = Vec::new();
        let player = next.active_player;

        next.phase = phase;
        events.push(GameEvent::PhaseChanged { turn: next.turn_number, player, phase });

        match phase {
            Phase::Refresh => self.refresh(&mut next, &mut events, player),
            Phase::Draw => self.draw(&mut next, &mut events, player),
            Phase::Don => {
                let count = self.config().don_for_turn(next.turn_number);
                zones::add_don_to_cost_area(&mut next, player, count, &mut events);
            }
            Phase::Main => {}
            Phase::End => end_of_turn_cleanup(&mut next, self.config(), &mut events),
        }

        self.triggers().drain(&mut next, &mut events);
        self.commit(events);
        next
    }

    /// Play turns until the game ends or `max_turns` have been played.
    pub async fn play_game(&self, state: &GameState, agents: &mut Agents, max_turns: u32) -> GameState {
        let mut current = state.clone();
        for _ in 0..max_turns {
            if current.game_over {
                break;
            }
            current = self.run_turn(&current, agents).await;
        }
        current
    }

    fn refresh(&self, state: &mut GameState, events: &mut Vec<GameEvent>, player: PlayerId) {
        let expires = |m: &Modifier| m.duration == Duration::UntilStartOfNextTurn && m.controller == player;
        expire_modifiers(state, self.config(), expires, events);

        zones::return_attached_don(state, self.config(), player, events);
        zones::refresh_don(state, player, events);
        for card in state.player(player).field_cards() {
            let rested = state.card(card).map_or(false, |c| c.is_rested());
            if rested {
                if let Err(e) = zones::set_card_state(state, card, CardState::Active, events) {
                    eprintln!("WARNING: could not refresh {}: {}", card, e);
                }
            }
        }
    }

    fn draw(&self, state: &mut GameState, events: &mut Vec<GameEvent>, player: PlayerId) {
        let skip = self.config().skip_first_draw && state.turn_number == 1 && player == state.starting_player;
        if skip {
            return;
        }
        match zones::draw(state, player, events) {
            Ok(_) => {}
            Err(ZoneError::EmptyZone { .. }) => {
                if self.config().debug {
                    eprintln!("DEBUG: {} decked out", player);
                }
                end_game(state, events, player.opponent(), WinReason::DeckOut);
            }
            Err(e) => eprintln!("WARNING: draw for {} failed: {}", player, e),
        }
    }

    async fn main_loop(&self, state: &GameState, agents: &mut Agents) -> GameState {
        let mut current = state.clone();
        let player = current.active_player;

        for _ in 0..self.config().max_action_iterations {
            if current.game_over {
                return current;
            }
            let legal = legal::legal_actions(&current, player, self.config());
            self.events().emit(GameEvent::AwaitingInput { player, choices: legal.len() });

            let (agent, defender) = agents.split_mut(player);
            let action = match agent.choose_action(&current, &legal).await {
                None | Some(Action::EndPhase) => return current,
                Some(action) => action,
            };

            let result = self.execute_action(&current, player, &action, &mut **defender);
            current = result.new_state;
        }

        eprintln!(
            "WARNING: main phase for {} hit {} iterations, ending it",
            player,
            self.config().max_action_iterations
        );
        current
    }

    fn finish_turn(&self, state: &GameState) -> GameState {
        let mut next = state.clone();
        let mut events = Vec::new();
        let turn = next.turn_number;
        let player = next.active_player;

        raise(&mut next, &mut events, GameEvent::TurnEnded { turn, player });
        if !next.game_over {
            self.triggers().drain(&mut next, &mut events);
        } else {
            next.pending_triggers.clear();
        }

        next.attacked_this_turn.clear();
        next.turn_number += 1;
        next.active_player = player.opponent();
        next.action_sequence = 0;
        next.phase = self.config().phase_order.first().copied().unwrap_or(Phase::Refresh);

        self.commit(events);
        next
    }
}

/// End-phase sweep: end-of-turn modifiers everywhere, attacked set.
fn end_of_turn_cleanup(state: &mut GameState, config: &RulesConfig, events: &mut Vec<GameEvent>) {
    expire_modifiers(state, config, |m| m.duration.expires_at_end_of_turn(), events);
    state.attacked_this_turn.clear();
}
