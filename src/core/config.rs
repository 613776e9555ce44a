//! Rules configuration.
//!
//! `RulesConfig` is pure data: the phase order and the numeric constants the
//! phase machine, enumerator and battle resolver read. Rule variants are
//! expressed by swapping the config (or loading one from JSON), never by
//! changing engine code.
//!
//! ```
//! use don_rules::core::{Phase, RulesConfig};
//!
//! let config = RulesConfig::default();
//! assert_eq!(config.phase_order.first(), Some(&Phase::Refresh));
//! assert_eq!(config.don_per_turn, 2);
//! ```

use serde::{Deserialize, Serialize};

/// Turn phases, in default order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    /// Untap everything, return attached DON!!.
    Refresh,
    /// Draw one card.
    Draw,
    /// Add DON!! to the cost area.
    Don,
    /// Player actions.
    Main,
    /// Expire turn-scoped modifiers.
    End,
}

impl Phase {
    /// All phases in their canonical order.
    pub const ALL: [Phase; 5] = [Phase::Refresh, Phase::Draw, Phase::Don, Phase::Main, Phase::End];
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Phase::Refresh => "Refresh",
            Phase::Draw => "Draw",
            Phase::Don => "DON!!",
            Phase::Main => "Main",
            Phase::End => "End",
        };
        f.write_str(name)
    }
}

/// Static rules data consumed by the engine.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RulesConfig {
    /// Order the phase machine runs phases in.
    pub phase_order: Vec<Phase>,

    /// DON!! added per turn after the first.
    pub don_per_turn: usize,

    /// DON!! added on turn 1 for the starting player.
    pub first_turn_don: usize,

    /// Size of each player's DON!! deck.
    pub don_deck_size: usize,

    /// Required main deck size (checked at setup when `enforce_deck_size`).
    pub deck_size: usize,

    /// Reject decks whose size differs from `deck_size`.
    pub enforce_deck_size: bool,

    /// Cards drawn into the opening hand.
    pub starting_hand_size: usize,

    /// Maximum number of characters in a character area.
    pub max_characters: usize,

    /// Power added per attached DON!!.
    pub don_power_bonus: i64,

    /// The starting player skips the draw on turn 1.
    pub skip_first_draw: bool,

    /// Neither player may attack during their own first turn.
    pub restrict_first_turn_attacks: bool,

    /// Leader damage requires attacker power >= leader power.
    pub leader_power_check: bool,

    /// Life cards with a `Trigger` effect activate automatically and are trashed.
    pub auto_activate_life_triggers: bool,

    /// Hard cap on main-phase loop iterations.
    pub max_action_iterations: usize,

    /// Hard cap on trigger resolution passes per drain.
    pub max_trigger_passes: usize,

    /// Emit DEBUG diagnostics on stderr.
    pub debug: bool,
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            phase_order: Phase::ALL.to_vec(),
            don_per_turn: 2,
            first_turn_don: 1,
            don_deck_size: 10,
            deck_size: 50,
            enforce_deck_size: false,
            starting_hand_size: 5,
            max_characters: 5,
            don_power_bonus: 1000,
            skip_first_draw: false,
            restrict_first_turn_attacks: true,
            leader_power_check: false,
            auto_activate_life_triggers: true,
            max_action_iterations: 1000,
            max_trigger_passes: 32,
            debug: false,
        }
    }
}

impl RulesConfig {
    /// Parse a config from JSON. Missing fields take their default values.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Serialize the config to pretty JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// DON!! granted in the DON phase of `turn_number`.
    #[must_use]
    pub fn don_for_turn(&self, turn_number: u32) -> usize {
        if turn_number <= 1 {
            self.first_turn_don
        } else {
            self.don_per_turn
        }
    }

    /// Set the phase order (builder pattern).
    #[must_use]
    pub fn with_phase_order(mut self, order: Vec<Phase>) -> Self {
        self.phase_order = order;
        self
    }

    /// Enable or disable the first-turn attack restriction (builder pattern).
    #[must_use]
    pub fn with_first_turn_attacks_restricted(mut self, restricted: bool) -> Self {
        self.restrict_first_turn_attacks = restricted;
        self
    }

    /// Enable debug diagnostics (builder pattern).
    #[must_use]
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }
}
