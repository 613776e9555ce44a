//! Card definitions - static card data.
//!
//! `CardDefinition` holds the immutable properties of a printed card:
//! category, cost, base power, counter value, keywords and effect
//! declarations. Instances share one definition through an `Arc`.
//!
//! Instance-specific data (zone, rested/active, attached DON!!, modifiers)
//! lives in `CardInstance`.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::effects::{EffectDefinition, EffectId, EffectTiming};

/// Unique identifier for a card definition.
///
/// This identifies the printed card, not a specific instance in a game.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CardId(pub u32);

impl CardId {
    /// Create a new card ID.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw ID value.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for CardId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Card({})", self.0)
    }
}

/// Card category.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CardCategory {
    Leader,
    Character,
    Event,
    Stage,
}

/// Keyword abilities the core understands.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Keyword {
    /// May attack the turn it is played, and may attack while rested.
    Rush,
    /// May redirect an attack to itself during the block step.
    Blocker,
    /// Deals two damage to a leader instead of one.
    DoubleAttack,
    /// Life cards removed by this card's damage go to the trash.
    Banish,
}

/// Static card definition.
///
/// ## Example
///
/// ```
/// use don_rules::cards::{CardDefinition, CardId, Keyword};
///
/// let zoro = CardDefinition::character(CardId::new(1), "Swordsman", 3, 5000)
///     .with_keyword(Keyword::Rush)
///     .with_counter(1000);
///
/// assert_eq!(zoro.power, 5000);
/// assert!(zoro.has_keyword(Keyword::Rush));
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardDefinition {
    /// Unique identifier for this card definition.
    pub id: CardId,

    /// Card name (for display/debugging).
    pub name: String,

    /// Card category.
    pub category: CardCategory,

    /// Play cost in DON!!.
    pub cost: i64,

    /// Base power. Events have 0.
    pub power: i64,

    /// Starting life cards (leaders only).
    pub life: usize,

    /// Counter value when trashed from hand during a counter step.
    pub counter: Option<i64>,

    /// Keyword abilities.
    pub keywords: Vec<Keyword>,

    /// Effect declarations.
    pub effects: SmallVec<[EffectDefinition; 2]>,

    /// Printed rules text.
    pub text: String,
}

impl CardDefinition {
    /// Create a card definition with no effects.
    #[must_use]
    pub fn new(id: CardId, name: impl Into<String>, category: CardCategory) -> Self {
        Self {
            id,
            name: name.into(),
            category,
            cost: 0,
            power: 0,
            life: 0,
            counter: None,
            keywords: Vec::new(),
            effects: SmallVec::new(),
            text: String::new(),
        }
    }

    /// Create a leader.
    #[must_use]
    pub fn leader(id: CardId, name: impl Into<String>, power: i64, life: usize) -> Self {
        let mut def = Self::new(id, name, CardCategory::Leader);
        def.power = power;
        def.life = life;
        def
    }

    /// Create a character.
    #[must_use]
    pub fn character(id: CardId, name: impl Into<String>, cost: i64, power: i64) -> Self {
        let mut def = Self::new(id, name, CardCategory::Character);
        def.cost = cost;
        def.power = power;
        def
    }

    /// Create an event.
    #[must_use]
    pub fn event(id: CardId, name: impl Into<String>, cost: i64) -> Self {
        let mut def = Self::new(id, name, CardCategory::Event);
        def.cost = cost;
        def
    }

    /// Create a stage.
    #[must_use]
    pub fn stage(id: CardId, name: impl Into<String>, cost: i64) -> Self {
        let mut def = Self::new(id, name, CardCategory::Stage);
        def.cost = cost;
        def
    }

    /// Add a keyword (builder pattern).
    #[must_use]
    pub fn with_keyword(mut self, keyword: Keyword) -> Self {
        if !self.keywords.contains(&keyword) {
            self.keywords.push(keyword);
        }
        self
    }

    /// Set the counter value (builder pattern).
    #[must_use]
    pub fn with_counter(mut self, counter: i64) -> Self {
        self.counter = Some(counter);
        self
    }

    /// Add an effect (builder pattern).
    #[must_use]
    pub fn with_effect(mut self, effect: EffectDefinition) -> Self {
        self.effects.push(effect);
        self
    }

    /// Set the rules text (builder pattern).
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Check for a keyword.
    #[must_use]
    pub fn has_keyword(&self, keyword: Keyword) -> bool {
        self.keywords.contains(&keyword)
    }

    /// Find an effect by id.
    #[must_use]
    pub fn effect(&self, id: EffectId) -> Option<&EffectDefinition> {
        self.effects.iter().find(|e| e.id == id)
    }

    /// Effects whose timing matches a predicate.
    pub fn effects_where<'a>(
        &'a self,
        pred: impl Fn(&EffectTiming) -> bool + 'a,
    ) -> impl Iterator<Item = &'a EffectDefinition> + 'a {
        self.effects.iter().filter(move |e| pred(&e.timing))
    }

    /// Check if this card has a life-card trigger.
    #[must_use]
    pub fn has_life_trigger(&self) -> bool {
        self.effects.iter().any(|e| e.timing == EffectTiming::Trigger)
    }
}
