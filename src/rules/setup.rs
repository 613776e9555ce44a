//! Game setup.
//!
//! `GameBuilder` turns two leaders and two decks into the opening state:
//! shuffled decks, full DON!! decks, opening hands and life cards. Entity
//! ids are handed out in a fixed order, so the same seed and decks always
//! give the same state.

use std::sync::Arc;

use crate::cards::{CardCategory, CardDefinition, CardId, CardInstance, CardRegistry};
use crate::core::{EntityAllocator, GameRng, GameState, PlayerId, PlayerMap, RulesConfig};
use crate::zones::{self, DonToken, Zone, ZoneError, ZonePosition};

/// Why a game could not be set up.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SetupError {
    MissingLeader(PlayerId),
    NotALeader { player: PlayerId, card: CardId },
    LeaderInDeck { player: PlayerId, card: CardId },
    DeckSize { player: PlayerId, expected: usize, actual: usize },
    /// The deck cannot cover the opening hand plus life cards.
    NotEnoughCards { player: PlayerId, needed: usize, available: usize },
    UnknownCard(CardId),
    Zone(ZoneError),
}

impl From<ZoneError> for SetupError {
    fn from(err: ZoneError) -> Self {
        SetupError::Zone(err)
    }
}

impl std::fmt::Display for SetupError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SetupError::MissingLeader(p) => write!(f, "{} has no leader", p),
            SetupError::NotALeader { player, card } => write!(f, "{} for {} is not a leader", card, player),
            SetupError::LeaderInDeck { player, card } => write!(f, "{}'s deck contains leader {}", player, card),
            SetupError::DeckSize { player, expected, actual } => {
                write!(f, "{}'s deck has {} cards, expected {}", player, actual, expected)
            }
            SetupError::NotEnoughCards { player, needed, available } => {
                write!(f, "{}'s deck needs at least {} cards, has {}", player, needed, available)
            }
            SetupError::UnknownCard(card) => write!(f, "Unknown card {}", card),
            SetupError::Zone(e) => write!(f, "Zone error: {}", e),
        }
    }
}

impl std::error::Error for SetupError {}

/// Builder for an opening game state.
///
/// ## Example
///
/// ```
/// use std::sync::Arc;
/// use don_rules::cards::{CardDefinition, CardId};
/// use don_rules::core::{PlayerId, RulesConfig};
/// use don_rules::rules::GameBuilder;
///
/// let leader = Arc::new(CardDefinition::leader(CardId::new(1), "Captain", 5000, 4));
/// let grunt = Arc::new(CardDefinition::character(CardId::new(2), "Grunt", 1, 2000));
/// let deck = vec![grunt; 20];
///
/// let state = GameBuilder::new(RulesConfig::default())
///     .seed(7)
///     .leader(PlayerId::FIRST, Arc::clone(&leader))
///     .deck(PlayerId::FIRST, deck.clone())
///     .leader(PlayerId::SECOND, leader)
///     .deck(PlayerId::SECOND, deck)
///     .build()
///     .unwrap();
///
/// assert_eq!(state.player(PlayerId::FIRST).hand.len(), 5);
/// assert_eq!(state.player(PlayerId::FIRST).life.len(), 4);
/// ```
#[derive(Clone, Debug)]
pub struct GameBuilder {
    config: RulesConfig,
    seed: u64,
    starting_player: PlayerId,
    leaders: PlayerMap<Option<Arc<CardDefinition>>>,
    decks: PlayerMap<Vec<Arc<CardDefinition>>>,
}

impl GameBuilder {
    #[must_use]
    pub fn new(config: RulesConfig) -> Self {
        Self {
            config,
            seed: 0,
            starting_player: PlayerId::FIRST,
            leaders: PlayerMap::new(|_| None),
            decks: PlayerMap::new(|_| Vec::new()),
        }
    }

    #[must_use]
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    #[must_use]
    pub fn starting_player(mut self, player: PlayerId) -> Self {
        self.starting_player = player;
        self
    }

    #[must_use]
    pub fn leader(mut self, player: PlayerId, leader: Arc<CardDefinition>) -> Self {
        self.leaders[player] = Some(leader);
        self
    }

    #[must_use]
    pub fn deck(mut self, player: PlayerId, deck: Vec<Arc<CardDefinition>>) -> Self {
        self.decks[player] = deck;
        self
    }

    /// Take a leader and a `(card, count)` list from a registry.
    pub fn from_registry(
        self,
        player: PlayerId,
        registry: &CardRegistry,
        leader: CardId,
        list: &[(CardId, usize)],
    ) -> Result<Self, SetupError> {
        let leader = registry.get(leader).cloned().ok_or(SetupError::UnknownCard(leader))?;
        let deck = registry.build_deck(list).map_err(SetupError::UnknownCard)?;
        Ok(self.leader(player, leader).deck(player, deck))
    }

    /// Build the opening state.
    pub fn build(self) -> Result<GameState, SetupError> {
        for player in PlayerId::both() {
            self.validate(player)?;
        }

        let rng = GameRng::new(self.seed);
        let mut ids = EntityAllocator::new();
        let mut state = GameState::new(self.starting_player);
        let mut events = Vec::new();

        for player in PlayerId::both() {
            let leader = self.leaders[player].clone().ok_or(SetupError::MissingLeader(player))?;
            let life = leader.life;
            state.add_card(CardInstance::new(ids.next_id(), leader, player, Zone::Leader));

            let mut deck = self.decks[player].clone();
            rng.seat(player).shuffle(&mut deck);
            for definition in deck {
                state.add_card(CardInstance::new(ids.next_id(), definition, player, Zone::Deck));
            }

            for _ in 0..self.config.don_deck_size {
                state.add_don(DonToken::new(ids.next_id(), player));
            }

            for _ in 0..self.config.starting_hand_size {
                zones::draw(&mut state, player, &mut events)?;
            }
            for _ in 0..life {
                let top = state
                    .player(player)
                    .deck
                    .last()
                    .copied()
                    .ok_or(ZoneError::EmptyZone { player, zone: Zone::Deck })?;
                zones::move_card(&mut state, &self.config, top, Zone::Life, ZonePosition::Top, &mut events)?;
            }
        }

        if self.config.debug {
            eprintln!(
                "DEBUG: setup seed {} created {} entities, {} starts",
                self.seed,
                ids.allocated(),
                self.starting_player
            );
        }
        Ok(state)
    }

    fn validate(&self, player: PlayerId) -> Result<(), SetupError> {
        let leader = self.leaders[player].as_ref().ok_or(SetupError::MissingLeader(player))?;
        if leader.category != CardCategory::Leader {
            return Err(SetupError::NotALeader { player, card: leader.id });
        }

        let deck = &self.decks[player];
        if let Some(card) = deck.iter().find(|d| d.category == CardCategory::Leader) {
            return Err(SetupError::LeaderInDeck { player, card: card.id });
        }
        if self.config.enforce_deck_size && deck.len() != self.config.deck_size {
            return Err(SetupError::DeckSize {
                player,
                expected: self.config.deck_size,
                actual: deck.len(),
            });
        }
        let needed = self.config.starting_hand_size + leader.life;
        if deck.len() < needed {
            return Err(SetupError::NotEnoughCards { player, needed, available: deck.len() });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leader() -> Arc<CardDefinition> {
        Arc::new(CardDefinition::leader(CardId::new(1), "Captain", 5000, 5))
    }

    fn deck(size: usize) -> Vec<Arc<CardDefinition>> {
        (0..size)
            .map(|n| Arc::new(CardDefinition::character(CardId::new(10 + n as u32), "Grunt", 1, 1000)))
            .collect()
    }

    fn builder(size: usize) -> GameBuilder {
        GameBuilder::new(RulesConfig::default())
            .seed(42)
            .leader(PlayerId::FIRST, leader())
            .deck(PlayerId::FIRST, deck(size))
            .leader(PlayerId::SECOND, leader())
            .deck(PlayerId::SECOND, deck(size))
    }

    #[test]
    fn test_opening_state() {
        let state = builder(50).build().unwrap();

        for player in PlayerId::both() {
            let p = state.player(player);
            assert!(p.leader.is_some());
            assert_eq!(p.hand.len(), 5);
            assert_eq!(p.life.len(), 5);
            assert_eq!(p.deck.len(), 40);
            assert_eq!(p.don_deck.len(), 10);
            assert!(p.cost_area.is_empty());
        }
        assert_eq!(state.turn_number, 1);
        assert_eq!(state.active_player, PlayerId::FIRST);
    }

    #[test]
    fn test_same_seed_same_state() {
        assert_eq!(builder(50).build().unwrap(), builder(50).build().unwrap());
        assert_ne!(builder(50).build().unwrap(), builder(50).seed(43).build().unwrap());
    }

    #[test]
    fn test_missing_leader() {
        let result = GameBuilder::new(RulesConfig::default())
            .deck(PlayerId::FIRST, deck(50))
            .build();
        assert_eq!(result, Err(SetupError::MissingLeader(PlayerId::FIRST)));
    }

    #[test]
    fn test_leader_in_deck() {
        let mut cards = deck(20);
        cards.push(leader());
        let result = builder(20).deck(PlayerId::SECOND, cards).build();
        assert_eq!(result, Err(SetupError::LeaderInDeck { player: PlayerId::SECOND, card: CardId::new(1) }));
    }

    #[test]
    fn test_deck_size_enforced() {
        let config = RulesConfig { enforce_deck_size: true, ..RulesConfig::default() };
        let result = GameBuilder::new(config)
            .leader(PlayerId::FIRST, leader())
            .deck(PlayerId::FIRST, deck(30))
            .leader(PlayerId::SECOND, leader())
            .deck(PlayerId::SECOND, deck(50))
            .build();
        assert_eq!(
            result,
            Err(SetupError::DeckSize { player: PlayerId::FIRST, expected: 50, actual: 30 })
        );
    }

    #[test]
    fn test_not_enough_cards() {
        let result = builder(9).build();
        assert_eq!(
            result,
            Err(SetupError::NotEnoughCards { player: PlayerId::FIRST, needed: 10, available: 9 })
        );
    }

    #[test]
    fn test_from_registry() {
        let mut registry = CardRegistry::new();
        registry.register(CardDefinition::leader(CardId::new(1), "Captain", 5000, 4));
        registry.register(CardDefinition::character(CardId::new(2), "Grunt", 1, 2000));

        let state = GameBuilder::new(RulesConfig::default())
            .from_registry(PlayerId::FIRST, &registry, CardId::new(1), &[(CardId::new(2), 12)])
            .unwrap()
            .from_registry(PlayerId::SECOND, &registry, CardId::new(1), &[(CardId::new(2), 12)])
            .unwrap()
            .build()
            .unwrap();
        assert_eq!(state.player(PlayerId::SECOND).deck.len(), 3);

        let unknown = GameBuilder::new(RulesConfig::default())
            .from_registry(PlayerId::FIRST, &registry, CardId::new(1), &[(CardId::new(99), 1)]);
        assert_eq!(unknown.err(), Some(SetupError::UnknownCard(CardId::new(99))));
    }
}
