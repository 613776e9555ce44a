//! The rules engine.
//!
//! - `engine`: `GameEngine` context, `RulesEngine` trait, `ActionResult`
//! - `legal`: Legal-action enumeration and shared validation
//! - `actions`: Action execution and the commit/reject boundary
//! - `battle`: Attack, block, counter, damage
//! - `phases`: Turn structure and the async Main-phase loop
//! - `setup`: Opening state from leaders and decks

mod actions;
pub mod battle;
pub mod engine;
pub mod legal;
mod phases;
pub mod setup;

pub use battle::BattleResolver;
pub use engine::{ActionResult, GameEngine, GameResult, RulesEngine};
pub use legal::legal_actions;
pub use setup::{GameBuilder, SetupError};

use crate::core::{GameState, PlayerId, WinReason};
use crate::triggers::GameEvent;

/// End the game and record `GameOver` if it was still running.
pub(crate) fn end_game(state: &mut GameState, events: &mut Vec<GameEvent>, winner: PlayerId, reason: WinReason) {
    if state.set_game_over(winner, reason) {
        events.push(GameEvent::GameOver { winner, reason });
    }
}
