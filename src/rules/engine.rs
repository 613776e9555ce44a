//! Engine context and the `RulesEngine` trait.
//!
//! A `GameEngine` is built once per match and holds everything that is not
//! game state: the rules config, the script table and the event sink.
//! Every operation takes a `&GameState` and hands back a new one.

use crate::agents::PassingAgent;
use crate::core::{Action, EngineError, GameState, PlayerId, RulesConfig};
use crate::effects::ScriptRegistry;
use crate::triggers::{EventSink, GameEvent, TriggerQueue};

use super::legal;

/// Result of a completed game.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GameResult {
    /// Single winner.
    Winner(PlayerId),
    /// The game stopped without a winner.
    Draw,
}

impl GameResult {
    /// Check if a player won.
    #[must_use]
    pub fn is_winner(&self, player: PlayerId) -> bool {
        match self {
            GameResult::Winner(p) => *p == player,
            GameResult::Draw => false,
        }
    }
}

/// Outcome of one action.
///
/// On failure `new_state` is the state the caller passed in, except that a
/// rejected attack which passed validation keeps its attacked mark.
#[derive(Clone, Debug)]
pub struct ActionResult {
    pub success: bool,
    pub error: Option<EngineError>,
    pub new_state: GameState,
}

impl ActionResult {
    #[must_use]
    pub fn accepted(new_state: GameState) -> Self {
        Self { success: true, error: None, new_state }
    }

    #[must_use]
    pub fn rejected(state: GameState, error: EngineError) -> Self {
        Self { success: false, error: Some(error), new_state: state }
    }
}

/// Rules engine trait.
///
/// ## Implementation Notes
///
/// - `legal_actions`: Only `EndPhase` outside the player's Main phase
/// - `apply_action`: Deterministic; never mutates `state`
/// - `is_terminal`: Return None if game continues
pub trait RulesEngine {
    /// Get the rules configuration.
    fn config(&self) -> &RulesConfig;

    /// Enumerate all legal actions for a player.
    fn legal_actions(&self, state: &GameState, player: PlayerId) -> Vec<Action>;

    /// Apply an action with no defender decisions (no blocks, no counters).
    fn apply_action(&self, state: &GameState, player: PlayerId, action: &Action) -> ActionResult;

    /// Check if the game is over.
    ///
    /// Returns `Some(result)` if the game has ended, `None` if it continues.
    fn is_terminal(&self, state: &GameState) -> Option<GameResult>;
}

/// Per-match engine context.
///
/// ## Example
///
/// ```
/// use don_rules::core::RulesConfig;
/// use don_rules::rules::GameEngine;
/// use don_rules::triggers::EventSink;
///
/// let (sink, _rx) = EventSink::channel();
/// let engine = GameEngine::new(RulesConfig::default()).with_event_sink(sink);
/// assert!(engine.events().is_enabled());
/// ```
#[derive(Clone, Debug)]
pub struct GameEngine {
    config: RulesConfig,
    scripts: ScriptRegistry,
    events: EventSink,
}

impl GameEngine {
    /// Create an engine with no scripts and a disabled event sink.
    #[must_use]
    pub fn new(config: RulesConfig) -> Self {
        Self {
            config,
            scripts: ScriptRegistry::default(),
            events: EventSink::disabled(),
        }
    }

    /// Set the script table (builder pattern).
    #[must_use]
    pub fn with_scripts(mut self, scripts: ScriptRegistry) -> Self {
        self.scripts = scripts;
        self
    }

    /// Set the event sink (builder pattern).
    #[must_use]
    pub fn with_event_sink(mut self, events: EventSink) -> Self {
        self.events = events;
        self
    }

    #[must_use]
    pub fn config(&self) -> &RulesConfig {
        &self.config
    }

    #[must_use]
    pub fn scripts(&self) -> &ScriptRegistry {
        &self.scripts
    }

    #[must_use]
    pub fn events(&self) -> &EventSink {
        &self.events
    }

    pub(crate) fn triggers(&self) -> TriggerQueue<'_> {
        TriggerQueue::new(&self.config, &self.scripts)
    }

    /// Publish the events of a committed step.
    pub(crate) fn commit(&self, events: Vec<GameEvent>) {
        self.events.emit_all(events);
    }
}

impl RulesEngine for GameEngine {
    fn config(&self) -> &RulesConfig {
        &self.config
    }

    fn legal_actions(&self, state: &GameState, player: PlayerId) -> Vec<Action> {
        legal::legal_actions(state, player, &self.config)
    }

    fn apply_action(&self, state: &GameState, player: PlayerId, action: &Action) -> ActionResult {
        self.execute_action(state, player, action, &mut PassingAgent)
    }

    fn is_terminal(&self, state: &GameState) -> Option<GameResult> {
        if !state.game_over {
            return None;
        }
        Some(state.winner.map_or(GameResult::Draw, GameResult::Winner))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::WinReason;

    #[test]
    fn test_game_result_is_winner() {
        let result = GameResult::Winner(PlayerId::SECOND);
        assert!(!result.is_winner(PlayerId::FIRST));
        assert!(result.is_winner(PlayerId::SECOND));

        let draw = GameResult::Draw;
        assert!(!draw.is_winner(PlayerId::FIRST));
    }

    #[test]
    fn test_is_terminal() {
        let engine = GameEngine::new(RulesConfig::default());
        let mut state = GameState::new(PlayerId::FIRST);
        assert_eq!(engine.is_terminal(&state), None);

        state.set_game_over(PlayerId::SECOND, WinReason::LifeOut);
        assert_eq!(engine.is_terminal(&state), Some(GameResult::Winner(PlayerId::SECOND)));
    }

    #[test]
    fn test_apply_action_outside_main_is_rejected() {
        let engine = GameEngine::new(RulesConfig::default());
        let state = GameState::new(PlayerId::FIRST);

        let result = engine.apply_action(&state, PlayerId::FIRST, &Action::EndPhase);

        assert!(!result.success);
        assert_eq!(
            result.error,
            Some(EngineError::WrongPhase { expected: crate::core::Phase::Main, actual: crate::core::Phase::Refresh })
        );
        assert_eq!(result.new_state, state);
    }
}
