//! Core engine types: entities, players, state, actions, RNG, configuration.
//!
//! Everything here is plain data. Rules live in `rules`, card movement in
//! `zones`, effect resolution in `effects` and `triggers`.

pub mod action;
pub mod config;
pub mod entity;
pub mod error;
pub mod player;
pub mod rng;
pub mod state;

pub use action::{Action, ActionRecord};
pub use config::{Phase, RulesConfig};
pub use entity::{EntityAllocator, EntityId};
pub use error::EngineError;
pub use player::{PlayerId, PlayerMap, PLAYER_COUNT};
pub use rng::GameRng;
pub use state::{GameState, Player, WinReason};
