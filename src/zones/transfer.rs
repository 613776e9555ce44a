//! Card movement between zones.
//!
//! Cards on the field (leader slot, character area, stage slot) are listed
//! under their controller; every other zone lists a card under its owner.
//! Ordered zones follow the deck convention: index 0 is the bottom, the last
//! element is the top.

use im::Vector;
use serde::{Deserialize, Serialize};

use crate::cards::CardState;
use crate::core::{EntityId, GameState, PlayerId, RulesConfig};
use crate::triggers::GameEvent;

use super::don::DonLocation;

/// A per-player zone.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Zone {
    Deck,
    Hand,
    Trash,
    Life,
    Leader,
    Character,
    Stage,
}

impl Zone {
    /// Leader slot, character area, or stage slot.
    #[must_use]
    pub fn is_field(self) -> bool {
        matches!(self, Zone::Leader | Zone::Character | Zone::Stage)
    }

    /// Zones holding at most one card.
    #[must_use]
    pub fn is_slot(self) -> bool {
        matches!(self, Zone::Leader | Zone::Stage)
    }
}

impl std::fmt::Display for Zone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Zone::Deck => "deck",
            Zone::Hand => "hand",
            Zone::Trash => "trash",
            Zone::Life => "life",
            Zone::Leader => "leader area",
            Zone::Character => "character area",
            Zone::Stage => "stage area",
        };
        f.write_str(name)
    }
}

/// Position for inserting a card into an ordered zone.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ZonePosition {
    /// Add to top of zone (end of the list).
    Top,
    /// Add to bottom of zone.
    Bottom,
    /// Insert at specific index (0 = bottom).
    Index(usize),
}

/// Zone transfer validation failure.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ZoneError {
    /// No card instance with this id.
    CardNotFound(EntityId),
    /// No DON!! token with this id.
    DonNotFound(EntityId),
    /// The DON!! token is not in its owner's cost area.
    DonNotInCostArea(EntityId),
    /// The DON!! token is rested.
    DonNotActive(EntityId),
    /// The acting player does not own the entity.
    NotOwner { entity: EntityId, player: PlayerId },
    /// The acting player does not control the card.
    NotController { entity: EntityId, player: PlayerId },
    /// The card is not a leader or character.
    InvalidTarget(EntityId),
    /// The card is not on the field.
    NotOnField(EntityId),
    /// The card's zone list does not contain it.
    NotInZone { entity: EntityId, zone: Zone },
    /// The destination zone has no room.
    ZoneFull { player: PlayerId, zone: Zone },
    /// The source zone is empty.
    EmptyZone { player: PlayerId, zone: Zone },
}

impl std::fmt::Display for ZoneError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ZoneError::CardNotFound(id) => write!(f, "card {} not found", id),
            ZoneError::DonNotFound(id) => write!(f, "DON!! {} not found", id),
            ZoneError::DonNotInCostArea(id) => write!(f, "DON!! {} is not in the cost area", id),
            ZoneError::DonNotActive(id) => write!(f, "DON!! {} is rested", id),
            ZoneError::NotOwner { entity, player } => {
                write!(f, "{} does not own {}", player, entity)
            }
            ZoneError::NotController { entity, player } => {
                write!(f, "{} does not control {}", player, entity)
            }
            ZoneError::InvalidTarget(id) => write!(f, "{} is not a leader or character", id),
            ZoneError::NotOnField(id) => write!(f, "{} is not on the field", id),
            ZoneError::NotInZone { entity, zone } => write!(f, "{} missing from {}", entity, zone),
            ZoneError::ZoneFull { player, zone } => write!(f, "{}'s {} is full", player, zone),
            ZoneError::EmptyZone { player, zone } => write!(f, "{}'s {} is empty", player, zone),
        }
    }
}

impl std::error::Error for ZoneError {}

pub(crate) fn insert_at(list: &mut Vector<EntityId>, entity: EntityId, position: ZonePosition) {
    match position {
        ZonePosition::Top => list.push_back(entity),
        ZonePosition::Bottom => list.push_front(entity),
        ZonePosition::Index(i) => {
            let idx = i.min(list.len());
            list.insert(idx, entity);
        }
    }
}

pub(crate) fn remove_from(list: &mut Vector<EntityId>, entity: EntityId) -> bool {
    match list.index_of(&entity) {
        Some(i) => {
            list.remove(i);
            true
        }
        None => false,
    }
}

/// Move a card to another zone.
///
/// Validates capacity before touching anything. Leaving the field returns
/// attached DON!! rested to the owner's cost area and clears modifiers,
/// flags and control changes. Entering the field from elsewhere makes the
/// card active and stamps `entered_turn`.
pub fn move_card(
    state: &mut GameState,
    config: &RulesConfig,
    card: EntityId,
    to: Zone,
    position: ZonePosition,
    events: &mut Vec<GameEvent>,
) -> Result<(), ZoneError> {
    let instance = state.card(card).ok_or(ZoneError::CardNotFound(card))?;
    let dest = if to.is_field() && instance.zone.is_field() {
        instance.controller
    } else {
        instance.owner
    };

    if instance.zone != to {
        let player = state.player(dest);
        let full = match to {
            Zone::Leader => player.leader.is_some(),
            Zone::Stage => player.stage.is_some(),
            Zone::Character => player.characters.len() >= config.max_characters,
            _ => false,
        };
        if full {
            return Err(ZoneError::ZoneFull { player: dest, zone: to });
        }
    }

    relocate(state, card, to, position, events)
}

/// Draw the top card of a player's deck into their hand.
pub fn draw(
    state: &mut GameState,
    player: PlayerId,
    events: &mut Vec<GameEvent>,
) -> Result<EntityId, ZoneError> {
    let top = state
        .player(player)
        .deck
        .last()
        .copied()
        .ok_or(ZoneError::EmptyZone { player, zone: Zone::Deck })?;
    relocate(state, top, Zone::Hand, ZonePosition::Top, events)?;
    Ok(top)
}

/// Set a field card active or rested.
pub fn set_card_state(
    state: &mut GameState,
    card: EntityId,
    new_state: CardState,
    events: &mut Vec<GameEvent>,
) -> Result<(), ZoneError> {
    let instance = state.card_mut(card).ok_or(ZoneError::CardNotFound(card))?;
    if !instance.is_on_field() {
        return Err(ZoneError::NotOnField(card));
    }
    let old = instance.state;
    if old != new_state {
        instance.state = new_state;
        events.push(GameEvent::StateChanged { entity: card, from: old, to: new_state });
    }
    Ok(())
}

/// Unchecked move: no capacity test.
fn relocate(
    state: &mut GameState,
    card: EntityId,
    to: Zone,
    position: ZonePosition,
    events: &mut Vec<GameEvent>,
) -> Result<(), ZoneError> {
    let instance = state.card(card).ok_or(ZoneError::CardNotFound(card))?;
    let from = instance.zone;
    let owner = instance.owner;
    let holder = if from.is_field() { instance.controller } else { owner };
    let dest = if to.is_field() && from.is_field() { holder } else { owner };
    let attached: Vec<EntityId> = instance.given_don.iter().copied().collect();

    if !state.player_mut(holder).remove(from, card) {
        return Err(ZoneError::NotInZone { entity: card, zone: from });
    }

    if from.is_field() && !to.is_field() {
        let mut returned = PlayerReturns::default();
        for don in attached {
            if let Some(token) = state.don_mut(don) {
                token.location = DonLocation::CostArea;
                token.state = CardState::Rested;
                let don_owner = token.owner;
                state.player_mut(don_owner).cost_area.push_back(don);
                returned.add(don_owner);
            }
        }
        for (player, count) in returned.iter() {
            events.push(GameEvent::DonReturned { player, count });
        }
    }

    let turn = state.turn_number;
    let instance = state.card_mut(card).ok_or(ZoneError::CardNotFound(card))?;
    if from.is_field() && !to.is_field() {
        instance.clear_field_state();
    }
    instance.zone = to;
    if !to.is_field() {
        instance.state = CardState::None;
    } else if !from.is_field() {
        instance.state = CardState::Active;
        instance.entered_turn = Some(turn);
    }

    state.player_mut(dest).insert(to, card, position);
    events.push(GameEvent::CardMoved { card, owner, from, to });
    Ok(())
}

#[derive(Default)]
struct PlayerReturns([usize; 2]);

impl PlayerReturns {
    fn add(&mut self, player: PlayerId) {
        self.0[player.index()] += 1;
    }

    fn iter(&self) -> impl Iterator<Item = (PlayerId, usize)> + '_ {
        PlayerId::both()
            .map(move |p| (p, self.0[p.index()]))
            .filter(|&(_, n)| n > 0)
    }
}
