//! DON!! tokens.
//!
//! A token sits in one of three places: its owner's DON!! deck, its owner's
//! cost area (active or rested), or attached to a leader/character. Costs
//! are paid by resting active tokens in the cost area; attaching a token
//! adds `don_power_bonus` to the card's power until the owner's next
//! Refresh phase.

use serde::{Deserialize, Serialize};

use crate::cards::CardState;
use crate::core::{EntityId, GameState, PlayerId, RulesConfig};
use crate::triggers::GameEvent;

use super::transfer::{remove_from, ZoneError};

/// Where a DON!! token is.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DonLocation {
    DonDeck,
    CostArea,
    Attached(EntityId),
}

/// A DON!! token.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DonToken {
    pub id: EntityId,
    pub owner: PlayerId,
    pub location: DonLocation,
    pub state: CardState,
}

impl DonToken {
    /// A token in its owner's DON!! deck.
    #[must_use]
    pub fn new(id: EntityId, owner: PlayerId) -> Self {
        Self {
            id,
            owner,
            location: DonLocation::DonDeck,
            state: CardState::None,
        }
    }

    /// Active and in the cost area.
    #[must_use]
    pub fn is_available(&self) -> bool {
        self.location == DonLocation::CostArea && self.state == CardState::Active
    }

    /// The card this token is attached to, if any.
    #[must_use]
    pub fn attached_to(&self) -> Option<EntityId> {
        match self.location {
            DonLocation::Attached(card) => Some(card),
            _ => None,
        }
    }
}

/// Move up to `count` tokens from the DON!! deck to the cost area, active.
///
/// Returns how many were placed; a short DON!! deck is not an error.
pub fn add_don_to_cost_area(
    state: &mut GameState,
    player: PlayerId,
    count: usize,
    events: &mut Vec<GameEvent>,
) -> usize {
    let mut placed = 0;
    while placed < count {
        let Some(don) = state.player_mut(player).don_deck.pop_back() else {
            break;
        };
        if let Some(token) = state.don_mut(don) {
            token.location = DonLocation::CostArea;
            token.state = CardState::Active;
        }
        state.player_mut(player).cost_area.push_back(don);
        placed += 1;
    }
    if placed > 0 {
        events.push(GameEvent::DonAdded { player, count: placed });
    }
    placed
}

/// Attach an active cost-area DON!! to a leader or character.
///
/// Checks run in a fixed order and the first failure is returned: token
/// exists, it is in the cost area, acting player owns it, it is active,
/// target exists, target is a leader or character, target is on the field,
/// acting player controls the target. Nothing changes on failure.
pub fn give_don(
    state: &mut GameState,
    config: &RulesConfig,
    player: PlayerId,
    don: EntityId,
    target: EntityId,
    events: &mut Vec<GameEvent>,
) -> Result<(), ZoneError> {
    let token = state.don(don).ok_or(ZoneError::DonNotFound(don))?;
    if token.location != DonLocation::CostArea {
        return Err(ZoneError::DonNotInCostArea(don));
    }
    if token.owner != player {
        return Err(ZoneError::NotOwner { entity: don, player });
    }
    if token.state != CardState::Active {
        return Err(ZoneError::DonNotActive(don));
    }

    let card = state.card(target).ok_or(ZoneError::CardNotFound(target))?;
    if !card.is_leader_or_character() {
        return Err(ZoneError::InvalidTarget(target));
    }
    if !card.is_on_field() {
        return Err(ZoneError::NotOnField(target));
    }
    if card.controller != player {
        return Err(ZoneError::NotController { entity: target, player });
    }
    let old = card.power(config.don_power_bonus);

    remove_from(&mut state.player_mut(player).cost_area, don);
    if let Some(token) = state.don_mut(don) {
        token.location = DonLocation::Attached(target);
    }
    let card = state.card_mut(target).ok_or(ZoneError::CardNotFound(target))?;
    card.given_don.push_back(don);
    let new = card.power(config.don_power_bonus);

    events.push(GameEvent::DonGiven { don, target, player });
    events.push(GameEvent::PowerChanged { card: target, old, new });
    Ok(())
}

/// Return every token `player` owns that is attached to a card back to the
/// cost area, active. Returns the number returned.
///
/// Each card that lost DON gets a `PowerChanged` after the `DonReturned`.
pub fn return_attached_don(
    state: &mut GameState,
    config: &RulesConfig,
    player: PlayerId,
    events: &mut Vec<GameEvent>,
) -> usize {
    let mut attached = Vec::new();
    for seat in PlayerId::both() {
        for card in state.player(seat).field_cards() {
            if let Some(instance) = state.card(card) {
                attached.extend(
                    instance
                        .given_don
                        .iter()
                        .filter(|d| state.don(**d).map_or(false, |t| t.owner == player))
                        .map(|&d| (card, d)),
                );
            }
        }
    }

    let mut touched: Vec<(EntityId, i64)> = Vec::new();
    for &(card, don) in &attached {
        if let Some(instance) = state.card_mut(card) {
            if !touched.iter().any(|(c, _)| *c == card) {
                touched.push((card, instance.power(config.don_power_bonus)));
            }
            remove_from(&mut instance.given_don, don);
        }
        if let Some(token) = state.don_mut(don) {
            token.location = DonLocation::CostArea;
            token.state = CardState::Active;
        }
        state.player_mut(player).cost_area.push_back(don);
    }

    if !attached.is_empty() {
        events.push(GameEvent::DonReturned { player, count: attached.len() });
    }
    for (card, old) in touched {
        if let Some(new) = state.power_of(card, config) {
            if new != old {
                events.push(GameEvent::PowerChanged { card, old, new });
            }
        }
    }
    attached.len()
}

/// Set every cost-area token of `player` active.
pub fn refresh_don(state: &mut GameState, player: PlayerId, events: &mut Vec<GameEvent>) {
    let pool: Vec<EntityId> = state.player(player).cost_area.iter().copied().collect();
    for don in pool {
        if let Some(token) = state.don_mut(don) {
            if token.state != CardState::Active {
                let from = token.state;
                token.state = CardState::Active;
                events.push(GameEvent::StateChanged { entity: don, from, to: CardState::Active });
            }
        }
    }
}

/// Rest up to `count` active cost-area tokens, in cost-area order.
///
/// Returns how many were rested. Callers check availability first.
pub fn rest_active_don(
    state: &mut GameState,
    player: PlayerId,
    count: usize,
    events: &mut Vec<GameEvent>,
) -> usize {
    let available: Vec<EntityId> = state.active_don(player).into_iter().take(count).collect();
    for &don in &available {
        if let Some(token) = state.don_mut(don) {
            token.state = CardState::Rested;
        }
        events.push(GameEvent::StateChanged {
            entity: don,
            from: CardState::Active,
            to: CardState::Rested,
        });
    }
    available.len()
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::cards::{CardDefinition, CardId, CardInstance};
    use crate::zones::Zone;

    const LEADER: EntityId = EntityId(1);
    const CHARACTER: EntityId = EntityId(2);
    const HAND_CARD: EntityId = EntityId(3);

    fn setup() -> GameState {
        let mut state = GameState::new(PlayerId::FIRST);
        let leader = Arc::new(CardDefinition::leader(CardId::new(1), "Captain", 5000, 5));
        let character = Arc::new(CardDefinition::character(CardId::new(2), "Navigator", 1, 2000));
        state.add_card(CardInstance::new(LEADER, leader, PlayerId::FIRST, Zone::Leader));
        state.add_card(CardInstance::new(CHARACTER, Arc::clone(&character), PlayerId::FIRST, Zone::Character));
        state.add_card(CardInstance::new(HAND_CARD, character, PlayerId::FIRST, Zone::Hand));
        for n in 0..4 {
            state.add_don(DonToken::new(EntityId(100 + n), PlayerId::FIRST));
            state.add_don(DonToken::new(EntityId(200 + n), PlayerId::SECOND));
        }
        add_don_to_cost_area(&mut state, PlayerId::FIRST, 2, &mut Vec::new());
        state
    }

    fn first_active(state: &GameState) -> EntityId {
        state.active_don(PlayerId::FIRST)[0]
    }

    #[test]
    fn test_add_don_stops_when_deck_empty() {
        let mut state = setup();
        let mut events = Vec::new();

        let placed = add_don_to_cost_area(&mut state, PlayerId::FIRST, 5, &mut events);

        assert_eq!(placed, 2);
        assert_eq!(state.player(PlayerId::FIRST).cost_area.len(), 4);
        assert!(state.player(PlayerId::FIRST).don_deck.is_empty());
        assert_eq!(events, vec![GameEvent::DonAdded { player: PlayerId::FIRST, count: 2 }]);
    }

    #[test]
    fn test_give_don_to_leader() {
        let mut state = setup();
        let don = first_active(&state);
        let mut events = Vec::new();

        give_don(&mut state, &RulesConfig::default(), PlayerId::FIRST, don, LEADER, &mut events).unwrap();

        assert_eq!(state.don(don).unwrap().location, DonLocation::Attached(LEADER));
        assert_eq!(state.card(LEADER).unwrap().power(1000), 6000);
        assert_eq!(state.player(PlayerId::FIRST).cost_area.len(), 1);
        assert_eq!(
            events,
            vec![
                GameEvent::DonGiven { don, target: LEADER, player: PlayerId::FIRST },
                GameEvent::PowerChanged { card: LEADER, old: 5000, new: 6000 },
            ]
        );
    }

    #[test]
    fn test_give_don_validation_order() {
        let mut state = setup();
        let config = RulesConfig::default();
        let mut events = Vec::new();
        let don = first_active(&state);

        assert_eq!(
            give_don(&mut state, &config, PlayerId::FIRST, EntityId(999), LEADER, &mut events),
            Err(ZoneError::DonNotFound(EntityId(999)))
        );
        assert_eq!(
            give_don(&mut state, &config, PlayerId::SECOND, don, EntityId(999), &mut events),
            Err(ZoneError::NotOwner { entity: don, player: PlayerId::SECOND })
        );
        assert_eq!(
            give_don(&mut state, &config, PlayerId::SECOND, EntityId(200), LEADER, &mut events),
            Err(ZoneError::DonNotInCostArea(EntityId(200)))
        );
        // Location is checked before ownership.
        assert_eq!(
            give_don(&mut state, &config, PlayerId::SECOND, EntityId(100), LEADER, &mut events),
            Err(ZoneError::DonNotInCostArea(EntityId(100)))
        );
        assert_eq!(
            give_don(&mut state, &config, PlayerId::FIRST, don, EntityId(999), &mut events),
            Err(ZoneError::CardNotFound(EntityId(999)))
        );
        assert_eq!(
            give_don(&mut state, &config, PlayerId::FIRST, don, HAND_CARD, &mut events),
            Err(ZoneError::NotOnField(HAND_CARD))
        );

        rest_active_don(&mut state, PlayerId::FIRST, 1, &mut events);
        assert_eq!(
            give_don(&mut state, &config, PlayerId::FIRST, don, LEADER, &mut events),
            Err(ZoneError::DonNotActive(don))
        );
    }

    #[test]
    fn test_give_don_requires_control() {
        let mut state = setup();
        let don = first_active(&state);
        state.card_mut(CHARACTER).unwrap().controller = PlayerId::SECOND;

        let err = give_don(&mut state, &RulesConfig::default(), PlayerId::FIRST, don, CHARACTER, &mut Vec::new())
            .unwrap_err();

        assert_eq!(err, ZoneError::NotController { entity: CHARACTER, player: PlayerId::FIRST });
    }

    #[test]
    fn test_return_attached_don() {
        let mut state = setup();
        let config = RulesConfig::default();
        let a = state.active_don(PlayerId::FIRST)[0];
        let b = state.active_don(PlayerId::FIRST)[1];
        give_don(&mut state, &config, PlayerId::FIRST, a, LEADER, &mut Vec::new()).unwrap();
        give_don(&mut state, &config, PlayerId::FIRST, b, CHARACTER, &mut Vec::new()).unwrap();
        let mut events = Vec::new();

        let returned = return_attached_don(&mut state, &config, PlayerId::FIRST, &mut events);

        assert_eq!(returned, 2);
        assert!(state.card(LEADER).unwrap().given_don.is_empty());
        assert_eq!(state.active_don_count(PlayerId::FIRST), 2);
        assert_eq!(
            events,
            vec![
                GameEvent::DonReturned { player: PlayerId::FIRST, count: 2 },
                GameEvent::PowerChanged { card: LEADER, old: 6000, new: 5000 },
                GameEvent::PowerChanged { card: CHARACTER, old: 3000, new: 2000 },
            ]
        );
    }

    #[test]
    fn test_rest_and_refresh() {
        let mut state = setup();
        let mut events = Vec::new();

        assert_eq!(rest_active_don(&mut state, PlayerId::FIRST, 5, &mut events), 2);
        assert_eq!(state.active_don_count(PlayerId::FIRST), 0);

        refresh_don(&mut state, PlayerId::FIRST, &mut events);
        assert_eq!(state.active_don_count(PlayerId::FIRST), 2);
        assert_eq!(events.len(), 4);
    }
}
