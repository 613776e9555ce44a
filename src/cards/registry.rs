//! Card registry for definition lookup.
//!
//! The `CardRegistry` stores the card definitions a match uses and turns
//! `(CardId, count)` deck lists into the definition lists `GameBuilder`
//! consumes. The full card database is external; games register whatever
//! subset they need.

use std::sync::Arc;

use rustc_hash::FxHashMap;

use super::definition::{CardCategory, CardDefinition, CardId};

/// Registry of card definitions.
///
/// ## Example
///
/// ```
/// use don_rules::cards::{CardDefinition, CardId, CardRegistry};
///
/// let mut registry = CardRegistry::new();
/// registry.register(CardDefinition::character(CardId::new(1), "Sniper", 2, 3000));
///
/// let deck = registry.build_deck(&[(CardId::new(1), 4)]).unwrap();
/// assert_eq!(deck.len(), 4);
/// ```
#[derive(Clone, Debug, Default)]
pub struct CardRegistry {
    cards: FxHashMap<CardId, Arc<CardDefinition>>,
}

impl CardRegistry {
    /// Create a new empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a card definition and return the shared handle.
    ///
    /// Panics if a card with the same ID already exists.
    pub fn register(&mut self, card: CardDefinition) -> Arc<CardDefinition> {
        if self.cards.contains_key(&card.id) {
            panic!("Card with ID {:?} already registered", card.id);
        }
        let id = card.id;
        let shared = Arc::new(card);
        self.cards.insert(id, Arc::clone(&shared));
        shared
    }

    /// Get a card definition by ID.
    #[must_use]
    pub fn get(&self, id: CardId) -> Option<&Arc<CardDefinition>> {
        self.cards.get(&id)
    }

    /// Check if a card ID is registered.
    #[must_use]
    pub fn contains(&self, id: CardId) -> bool {
        self.cards.contains_key(&id)
    }

    /// Get the number of registered cards.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    /// Check if the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Iterate over all card definitions.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<CardDefinition>> {
        self.cards.values()
    }

    /// Find cards by category.
    pub fn find_by_category(&self, category: CardCategory) -> impl Iterator<Item = &Arc<CardDefinition>> {
        self.cards.values().filter(move |c| c.category == category)
    }

    /// Expand a deck list into definitions, in list order.
    ///
    /// Returns the first unknown id on failure.
    pub fn build_deck(&self, list: &[(CardId, usize)]) -> Result<Vec<Arc<CardDefinition>>, CardId> {
        let mut deck = Vec::with_capacity(list.iter().map(|(_, n)| n).sum());
        for &(id, count) in list {
            let def = self.cards.get(&id).ok_or(id)?;
            deck.extend(std::iter::repeat_with(|| Arc::clone(def)).take(count));
        }
        Ok(deck)
    }
}
