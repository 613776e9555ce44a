//! Named effect scripts.
//!
//! Card text that does not fit the declarative `Effect` vocabulary is
//! written as a Rust closure and registered under a `ScriptId`. Scripts run
//! against a `ScriptContext`, which wraps the working copy of the state and
//! exposes the modifier and zone APIs. A script that returns an error or
//! panics has its changes discarded by the trigger queue.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use super::effect::Effect;
use super::resolver::{EffectOrigin, EffectResolver, ResolveResult};
use super::targeting::Target;
use crate::cards::Duration;
use crate::core::{EntityId, GameState, PlayerId, RulesConfig};
use crate::triggers::GameEvent;
use crate::zones::{Zone, ZoneError, ZonePosition};

/// Name of a registered script.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScriptId(pub String);

impl ScriptId {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }
}

impl From<&str> for ScriptId {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for ScriptId {
    fn from(name: String) -> Self {
        Self(name)
    }
}

impl std::fmt::Display for ScriptId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Script failure.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScriptError {
    /// No script registered under this id.
    NotRegistered(ScriptId),
    /// The script reported a failure.
    Failed(String),
    /// The script panicked.
    Panicked(String),
    /// A zone operation inside the script failed.
    Zone(ZoneError),
}

impl From<ZoneError> for ScriptError {
    fn from(err: ZoneError) -> Self {
        ScriptError::Zone(err)
    }
}

impl std::fmt::Display for ScriptError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScriptError::NotRegistered(id) => write!(f, "script '{}' is not registered", id),
            ScriptError::Failed(msg) => write!(f, "script failed: {}", msg),
            ScriptError::Panicked(msg) => write!(f, "script panicked: {}", msg),
            ScriptError::Zone(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for ScriptError {}

/// A registered script body.
pub type ScriptFn = Arc<dyn Fn(&mut ScriptContext<'_>) -> Result<(), ScriptError> + Send + Sync>;

/// Registry of named scripts.
///
/// ## Example
///
/// ```
/// use don_rules::effects::ScriptRegistry;
///
/// let mut scripts = ScriptRegistry::new();
/// scripts.register("draw_one", |ctx| {
///     ctx.draw(ctx.controller(), 1);
///     Ok(())
/// });
/// assert!(scripts.contains(&"draw_one".into()));
/// ```
#[derive(Clone, Default)]
pub struct ScriptRegistry {
    scripts: FxHashMap<ScriptId, ScriptFn>,
}

impl ScriptRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a script, replacing any previous one with the same id.
    pub fn register<F>(&mut self, id: impl Into<ScriptId>, script: F)
    where
        F: Fn(&mut ScriptContext<'_>) -> Result<(), ScriptError> + Send + Sync + 'static,
    {
        self.scripts.insert(id.into(), Arc::new(script));
    }

    #[must_use]
    pub fn get(&self, id: &ScriptId) -> Option<&ScriptFn> {
        self.scripts.get(id)
    }

    #[must_use]
    pub fn contains(&self, id: &ScriptId) -> bool {
        self.scripts.contains_key(id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.scripts.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.scripts.is_empty()
    }

    /// Run a script. Panics inside the script are caught and reported as
    /// `ScriptError::Panicked`.
    pub fn run(&self, id: &ScriptId, ctx: &mut ScriptContext<'_>) -> Result<(), ScriptError> {
        let script = self
            .scripts
            .get(id)
            .ok_or_else(|| ScriptError::NotRegistered(id.clone()))?;
        match catch_unwind(AssertUnwindSafe(|| script(ctx))) {
            Ok(result) => result,
            Err(payload) => {
                let msg = payload
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| payload.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "unknown panic".to_string());
                Err(ScriptError::Panicked(msg))
            }
        }
    }
}

impl std::fmt::Debug for ScriptRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut ids: Vec<&str> = self.scripts.keys().map(|k| k.0.as_str()).collect();
        ids.sort_unstable();
        f.debug_struct("ScriptRegistry").field("scripts", &ids).finish()
    }
}

/// What a script sees while it runs.
pub struct ScriptContext<'a> {
    state: &'a mut GameState,
    config: &'a RulesConfig,
    events: &'a mut Vec<GameEvent>,
    origin: EffectOrigin,
    event: &'a GameEvent,
}

impl<'a> ScriptContext<'a> {
    pub(crate) fn new(
        state: &'a mut GameState,
        config: &'a RulesConfig,
        events: &'a mut Vec<GameEvent>,
        origin: EffectOrigin,
        event: &'a GameEvent,
    ) -> Self {
        Self { state, config, events, origin, event }
    }

    // === Read Access ===

    #[must_use]
    pub fn state(&self) -> &GameState {
        self.state
    }

    #[must_use]
    pub fn config(&self) -> &RulesConfig {
        self.config
    }

    /// The card carrying the effect.
    #[must_use]
    pub fn source(&self) -> EntityId {
        self.origin.source
    }

    #[must_use]
    pub fn controller(&self) -> PlayerId {
        self.origin.controller
    }

    #[must_use]
    pub fn opponent(&self) -> PlayerId {
        self.origin.controller.opponent()
    }

    /// The event that fired the effect.
    #[must_use]
    pub fn trigger_event(&self) -> &GameEvent {
        self.event
    }

    #[must_use]
    pub fn power_of(&self, card: EntityId) -> Option<i64> {
        self.state.power_of(card, self.config)
    }

    #[must_use]
    pub fn leader(&self, player: PlayerId) -> Option<EntityId> {
        self.state.player(player).leader
    }

    #[must_use]
    pub fn characters(&self, player: PlayerId) -> Vec<EntityId> {
        self.state.player(player).characters.iter().copied().collect()
    }

    #[must_use]
    pub fn get_flag(&self, card: EntityId, key: &str) -> i64 {
        self.state.card(card).map_or(0, |c| c.get_flag(key, 0))
    }

    // === Effects ===

    /// Apply a declarative effect to a target.
    pub fn apply(&mut self, effect: &Effect, target: Target) -> ResolveResult {
        EffectResolver::new(self.config).apply(self.state, self.events, effect, target, self.origin)
    }

    fn apply_strict(&mut self, effect: Effect, target: Target) -> Result<(), ScriptError> {
        match self.apply(&effect, target) {
            ResolveResult::Failed(msg) => Err(ScriptError::Failed(msg)),
            _ => Ok(()),
        }
    }

    /// Add a power modifier to a field card.
    pub fn add_power(&mut self, card: EntityId, amount: i64, duration: Duration) -> Result<(), ScriptError> {
        self.apply_strict(Effect::ModifyPower { amount, duration }, Target::Card(card))
    }

    /// Add a cost modifier to a card.
    pub fn add_cost(&mut self, card: EntityId, amount: i64, duration: Duration) -> Result<(), ScriptError> {
        self.apply_strict(Effect::ModifyCost { amount, duration }, Target::Card(card))
    }

    /// Move a card to a zone of its owner.
    pub fn move_card(&mut self, card: EntityId, zone: Zone, position: ZonePosition) -> Result<(), ScriptError> {
        crate::zones::move_card(self.state, self.config, card, zone, position, self.events)?;
        Ok(())
    }

    /// Knock out a character.
    pub fn knock_out(&mut self, card: EntityId) -> Result<(), ScriptError> {
        super::resolver::knock_out(self.state, self.config, card, self.events)?;
        Ok(())
    }

    /// Draw up to `count` cards. Returns how many were drawn.
    pub fn draw(&mut self, player: PlayerId, count: usize) -> usize {
        let mut drawn = 0;
        while drawn < count && crate::zones::draw(self.state, player, self.events).is_ok() {
            drawn += 1;
        }
        drawn
    }

    pub fn rest(&mut self, card: EntityId) -> Result<(), ScriptError> {
        self.apply_strict(Effect::Rest, Target::Card(card))
    }

    pub fn set_active(&mut self, card: EntityId) -> Result<(), ScriptError> {
        self.apply_strict(Effect::SetActive, Target::Card(card))
    }

    /// Raise an event. AUTO effects it fires wait for the next pass.
    pub fn raise(&mut self, event: GameEvent) {
        crate::triggers::raise(self.state, self.events, event);
    }

    pub fn set_flag(&mut self, card: EntityId, key: impl Into<String>, value: i64) -> Result<(), ScriptError> {
        let key = key.into();
        let instance = self.state.card_mut(card).ok_or(ZoneError::CardNotFound(card))?;
        instance.set_flag(key, value);
        Ok(())
    }
}
