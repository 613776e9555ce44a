//! # don-rules
//!
//! Rules engine for a two-player DON!!-style collectible card game.
//!
//! ## Design Principles
//!
//! 1. **Immutable Snapshots**: Every operation takes a `&GameState` and
//!    returns a new one. `im` persistent collections keep clones O(1).
//!
//! 2. **All or Nothing**: An action either fully applies (triggers resolved,
//!    events published) or is rejected with the caller's state untouched.
//!
//! 3. **Configuration Over Convention**: Phase order and numeric constants
//!    live in `RulesConfig`, loadable from JSON.
//!
//! ## Architecture
//!
//! - **Phase machine** drives Refresh, Draw, DON!!, Main and End, and awaits
//!   the active `PlayerAgent` for each Main-phase action.
//!
//! - **Battle resolver** runs attack, block, counter and damage steps.
//!
//! - **Trigger queue** orders AUTO and activated effects active-player
//!   first and resolves them through declarative effects and named scripts.
//!
//! - **Event sink** publishes typed `GameEvent`s on a tokio channel.
//!
//! ## Modules
//!
//! - `core`: Entity IDs, players, state, actions, RNG, configuration, errors
//! - `cards`: Card definitions, instances, modifiers, registry
//! - `zones`: Zone transfers and DON!! handling
//! - `effects`: Effect definitions, targeting, resolver, scripts
//! - `triggers`: Events, event sink, pending trigger queue
//! - `rules`: Engine, legal actions, battle, phases, setup
//! - `agents`: Player decision interface and bundled agents

pub mod agents;
pub mod cards;
pub mod core;
pub mod effects;
pub mod rules;
pub mod triggers;
pub mod zones;

// Re-export commonly used types
pub use crate::core::{
    Action, ActionRecord, EngineError, EntityId, GameRng, GameState, Phase, PlayerId, PlayerMap, RulesConfig,
    WinReason,
};

pub use crate::cards::{CardDefinition, CardId, CardInstance, CardRegistry, CardState, Duration, Keyword, Modifier};

pub use crate::zones::{DonToken, Zone, ZoneError, ZonePosition};

pub use crate::effects::{Effect, EffectDefinition, EffectId, EffectTiming, ScriptContext, ScriptRegistry};

pub use crate::triggers::{EventSink, GameEvent, PendingTrigger};

pub use crate::rules::{ActionResult, GameBuilder, GameEngine, GameResult, RulesEngine};

pub use crate::agents::{Agents, PassingAgent, PlayerAgent, RandomAgent, ScriptedAgent};
