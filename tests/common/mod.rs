//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use don_rules::agents::{Agents, PlayerAgent};
use don_rules::cards::{CardDefinition, CardId, CardInstance, CardState};
use don_rules::core::{EntityId, GameState, Phase, PlayerId};
use don_rules::zones::{DonLocation, DonToken, Zone};

pub const LEADER: EntityId = EntityId(1);
pub const FOE_LEADER: EntityId = EntityId(2);

pub fn leader_def() -> Arc<CardDefinition> {
    Arc::new(CardDefinition::leader(CardId::new(1), "Captain", 5000, 3))
}

pub fn grunt_def() -> Arc<CardDefinition> {
    Arc::new(CardDefinition::character(CardId::new(2), "Grunt", 1, 3000))
}

/// Turn 3, `PlayerId::FIRST` active in Main, leaders, 3 life and 5 deck
/// cards each, 10 DON!! in each DON!! deck.
pub fn board() -> GameState {
    let mut state = GameState::new(PlayerId::FIRST);
    state.turn_number = 3;
    state.phase = Phase::Main;
    state.add_card(CardInstance::new(LEADER, leader_def(), PlayerId::FIRST, Zone::Leader));
    state.add_card(CardInstance::new(FOE_LEADER, leader_def(), PlayerId::SECOND, Zone::Leader));

    for seat in PlayerId::both() {
        let base = 1000 + 100 * seat.index() as u32;
        for n in 0..3 {
            state.add_card(CardInstance::new(EntityId(base + n), grunt_def(), seat, Zone::Life));
        }
        for n in 10..15 {
            state.add_card(CardInstance::new(EntityId(base + n), grunt_def(), seat, Zone::Deck));
        }
        for n in 50..60 {
            state.add_don(DonToken::new(EntityId(base + n), seat));
        }
    }
    state
}

/// Put a character straight onto `owner`'s field.
pub fn add_character(state: &mut GameState, id: u32, owner: PlayerId, def: Arc<CardDefinition>, rested: bool) -> EntityId {
    let id = EntityId(id);
    let mut card = CardInstance::new(id, def, owner, Zone::Character);
    if rested {
        card.state = CardState::Rested;
    }
    state.add_card(card);
    id
}

/// Put a card into `owner`'s hand.
pub fn add_to_hand(state: &mut GameState, id: u32, owner: PlayerId, def: Arc<CardDefinition>) -> EntityId {
    let id = EntityId(id);
    state.add_card(CardInstance::new(id, def, owner, Zone::Hand));
    id
}

/// Put an active DON!! into `owner`'s cost area.
pub fn add_active_don(state: &mut GameState, id: u32, owner: PlayerId) -> EntityId {
    let id = EntityId(id);
    let mut don = DonToken::new(id, owner);
    don.location = DonLocation::CostArea;
    don.state = CardState::Active;
    state.add_don(don);
    id
}

pub fn agents(first: impl PlayerAgent + 'static, second: impl PlayerAgent + 'static) -> Agents {
    Agents::from_pair(Box::new(first), Box::new(second))
}
