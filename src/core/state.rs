//! Game state.
//!
//! ## GameState
//!
//! An immutable snapshot of a match:
//! - Turn number, active player, phase
//! - Per-player zones (`Player`)
//! - Card instances and DON!! tokens by entity ID
//! - Pending trigger queue, attacked-this-turn set
//! - Game-over flag, winner and reason
//! - Action history
//!
//! Uses `im` persistent data structures so `clone()` is O(1) and structurally
//! shared. Every engine operation takes `&GameState`, works on a clone and
//! returns the clone; the input snapshot is never observed to change.

use im::{HashMap as ImHashMap, HashSet as ImHashSet, Vector};
use serde::{Deserialize, Serialize};

use super::action::{Action, ActionRecord};
use super::config::{Phase, RulesConfig};
use super::entity::EntityId;
use super::player::{PlayerId, PlayerMap};
use crate::cards::{CardInstance, CardState, ModifierId};
use crate::triggers::PendingTrigger;
use crate::zones::{insert_at, remove_from, DonLocation, DonToken, Zone, ZoneError, ZonePosition};

/// Why the game ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WinReason {
    /// The loser had to draw from an empty deck.
    DeckOut,
    /// The loser's life zone ran out.
    LifeOut,
}

impl std::fmt::Display for WinReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WinReason::DeckOut => f.write_str("deck out"),
            WinReason::LifeOut => f.write_str("life out"),
        }
    }
}

/// One player's zones.
///
/// Ordered zones put the top card at the end of the list.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub deck: Vector<EntityId>,
    pub hand: Vector<EntityId>,
    pub trash: Vector<EntityId>,
    pub life: Vector<EntityId>,
    pub don_deck: Vector<EntityId>,
    pub cost_area: Vector<EntityId>,
    pub leader: Option<EntityId>,
    pub characters: Vector<EntityId>,
    pub stage: Option<EntityId>,
}

impl Player {
    /// Create a player with empty zones.
    #[must_use]
    pub fn new(id: PlayerId) -> Self {
        Self {
            id,
            deck: Vector::new(),
            hand: Vector::new(),
            trash: Vector::new(),
            life: Vector::new(),
            don_deck: Vector::new(),
            cost_area: Vector::new(),
            leader: None,
            characters: Vector::new(),
            stage: None,
        }
    }

    fn list(&self, zone: Zone) -> Option<&Vector<EntityId>> {
        match zone {
            Zone::Deck => Some(&self.deck),
            Zone::Hand => Some(&self.hand),
            Zone::Trash => Some(&self.trash),
            Zone::Life => Some(&self.life),
            Zone::Character => Some(&self.characters),
            Zone::Leader | Zone::Stage => None,
        }
    }

    fn list_mut(&mut self, zone: Zone) -> Option<&mut Vector<EntityId>> {
        match zone {
            Zone::Deck => Some(&mut self.deck),
            Zone::Hand => Some(&mut self.hand),
            Zone::Trash => Some(&mut self.trash),
            Zone::Life => Some(&mut self.life),
            Zone::Character => Some(&mut self.characters),
            Zone::Leader | Zone::Stage => None,
        }
    }

    /// Cards in a zone, bottom first.
    #[must_use]
    pub fn zone_cards(&self, zone: Zone) -> Vec<EntityId> {
        match zone {
            Zone::Leader => self.leader.into_iter().collect(),
            Zone::Stage => self.stage.into_iter().collect(),
            _ => self.list(zone).map(|l| l.iter().copied().collect()).unwrap_or_default(),
        }
    }

    /// Number of cards in a zone.
    #[must_use]
    pub fn zone_len(&self, zone: Zone) -> usize {
        match zone {
            Zone::Leader => usize::from(self.leader.is_some()),
            Zone::Stage => usize::from(self.stage.is_some()),
            _ => self.list(zone).map_or(0, Vector::len),
        }
    }

    /// Leader, characters (in play order), then stage.
    #[must_use]
    pub fn field_cards(&self) -> Vec<EntityId> {
        self.leader
            .into_iter()
            .chain(self.characters.iter().copied())
            .chain(self.stage)
            .collect()
    }

    pub(crate) fn remove(&mut self, zone: Zone, card: EntityId) -> bool {
        match zone {
            Zone::Leader => self.leader.take_if_eq(card),
            Zone::Stage => self.stage.take_if_eq(card),
            _ => self.list_mut(zone).map_or(false, |l| remove_from(l, card)),
        }
    }

    pub(crate) fn insert(&mut self, zone: Zone, card: EntityId, position: ZonePosition) {
        match zone {
            Zone::Leader => self.leader = Some(card),
            Zone::Stage => self.stage = Some(card),
            _ => {
                if let Some(list) = self.list_mut(zone) {
                    insert_at(list, card, position);
                }
            }
        }
    }
}

trait TakeIfEq {
    fn take_if_eq(&mut self, card: EntityId) -> bool;
}

impl TakeIfEq for Option<EntityId> {
    fn take_if_eq(&mut self, card: EntityId) -> bool {
        if *self == Some(card) {
            *self = None;
            true
        } else {
            false
        }
    }
}

/// Complete game state.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    // === Game Progression ===
    /// Turn number (starts at 1).
    pub turn_number: u32,

    /// Player whose turn it is.
    pub active_player: PlayerId,

    /// Player who took turn 1.
    pub starting_player: PlayerId,

    /// Current phase.
    pub phase: Phase,

    // === Zones and Entities ===
    pub players: PlayerMap<Player>,

    /// Card instances by entity ID.
    pub cards: ImHashMap<EntityId, CardInstance>,

    /// DON!! tokens by entity ID.
    pub dons: ImHashMap<EntityId, DonToken>,

    // === Turn Bookkeeping ===
    /// Auto/activated effects waiting for resolution.
    pub pending_triggers: Vector<PendingTrigger>,

    /// Attackers that already attacked this turn.
    pub attacked_this_turn: ImHashSet<EntityId>,

    // === Outcome ===
    pub game_over: bool,
    pub winner: Option<PlayerId>,
    pub win_reason: Option<WinReason>,

    // === History ===
    pub action_history: Vector<ActionRecord>,

    /// Action sequence within the turn.
    pub action_sequence: u32,

    /// Monotonic counter for modifier ids and timestamps.
    pub clock: u64,
}

impl GameState {
    /// Create an empty state at turn 1, Refresh phase.
    #[must_use]
    pub fn new(starting_player: PlayerId) -> Self {
        Self {
            turn_number: 1,
            active_player: starting_player,
            starting_player,
            phase: Phase::Refresh,
            players: PlayerMap::new(Player::new),
            cards: ImHashMap::new(),
            dons: ImHashMap::new(),
            pending_triggers: Vector::new(),
            attacked_this_turn: ImHashSet::new(),
            game_over: false,
            winner: None,
            win_reason: None,
            action_history: Vector::new(),
            action_sequence: 0,
            clock: 0,
        }
    }

    // === Players ===

    #[must_use]
    pub fn player(&self, player: PlayerId) -> &Player {
        &self.players[player]
    }

    pub fn player_mut(&mut self, player: PlayerId) -> &mut Player {
        &mut self.players[player]
    }

    /// Check if this is `player`'s first turn of the game.
    #[must_use]
    pub fn is_first_turn_of(&self, player: PlayerId) -> bool {
        if player == self.starting_player {
            self.turn_number <= 1
        } else {
            self.turn_number <= 2
        }
    }

    // === Cards ===

    /// Add a card instance and list it in its zone (on top).
    pub fn add_card(&mut self, card: CardInstance) {
        let id = card.entity_id;
        let zone = card.zone;
        let holder = if zone.is_field() { card.controller } else { card.owner };
        self.cards.insert(id, card);
        self.players[holder].insert(zone, id, ZonePosition::Top);
    }

    #[must_use]
    pub fn card(&self, id: EntityId) -> Option<&CardInstance> {
        self.cards.get(&id)
    }

    pub fn card_mut(&mut self, id: EntityId) -> Option<&mut CardInstance> {
        self.cards.get_mut(&id)
    }

    /// Get a card or fail with `ZoneError::CardNotFound`.
    pub fn require_card(&self, id: EntityId) -> Result<&CardInstance, ZoneError> {
        self.card(id).ok_or(ZoneError::CardNotFound(id))
    }

    /// Computed power of a card.
    #[must_use]
    pub fn power_of(&self, id: EntityId, config: &RulesConfig) -> Option<i64> {
        self.card(id).map(|c| c.power(config.don_power_bonus))
    }

    // === DON!! ===

    /// Add a DON!! token and list it where its location says.
    pub fn add_don(&mut self, token: DonToken) {
        let id = token.id;
        let owner = token.owner;
        let location = token.location;
        self.dons.insert(id, token);
        match location {
            DonLocation::DonDeck => self.players[owner].don_deck.push_back(id),
            DonLocation::CostArea => self.players[owner].cost_area.push_back(id),
            DonLocation::Attached(card) => {
                if let Some(instance) = self.cards.get_mut(&card) {
                    instance.given_don.push_back(id);
                }
            }
        }
    }

    #[must_use]
    pub fn don(&self, id: EntityId) -> Option<&DonToken> {
        self.dons.get(&id)
    }

    pub fn don_mut(&mut self, id: EntityId) -> Option<&mut DonToken> {
        self.dons.get_mut(&id)
    }

    /// Active DON!! in a player's cost area, in cost-area order.
    #[must_use]
    pub fn active_don(&self, player: PlayerId) -> Vec<EntityId> {
        self.players[player]
            .cost_area
            .iter()
            .copied()
            .filter(|d| self.don(*d).map_or(false, |t| t.state == CardState::Active))
            .collect()
    }

    /// Number of active DON!! in a player's cost area.
    #[must_use]
    pub fn active_don_count(&self, player: PlayerId) -> usize {
        self.active_don(player).len()
    }

    // === Attacks ===

    #[must_use]
    pub fn has_attacked(&self, card: EntityId) -> bool {
        self.attacked_this_turn.contains(&card)
    }

    pub fn mark_attacked(&mut self, card: EntityId) {
        self.attacked_this_turn.insert(card);
    }

    // === Clock ===

    /// Advance the clock and return the new value.
    pub fn tick(&mut self) -> u64 {
        self.clock += 1;
        self.clock
    }

    /// Allocate a modifier id.
    pub fn next_modifier_id(&mut self) -> ModifierId {
        ModifierId(self.tick())
    }

    // === Outcome ===

    /// End the game. The first call wins; later calls are ignored.
    ///
    /// Returns true if this call ended the game.
    pub fn set_game_over(&mut self, winner: PlayerId, reason: WinReason) -> bool {
        if self.game_over {
            return false;
        }
        self.game_over = true;
        self.winner = Some(winner);
        self.win_reason = Some(reason);
        true
    }

    // === Action History ===

    /// Append an action to the history.
    pub fn record_action(&mut self, player: PlayerId, action: Action) {
        let record = ActionRecord::new(player, action, self.turn_number, self.action_sequence);
        self.action_sequence += 1;
        self.action_history.push_back(record);
    }

    // === Snapshots ===

    /// Encode the full state with bincode.
    pub fn to_snapshot(&self) -> Result<Vec<u8>, bincode::Error> {
        bincode::serialize(self)
    }

    /// Decode a state produced by `to_snapshot`.
    pub fn from_snapshot(bytes: &[u8]) -> Result<Self, bincode::Error> {
        bincode::deserialize(bytes)
    }
}
