//! Card instances - runtime card state.
//!
//! `CardInstance` represents one physical card in a game. It shares its
//! static `CardDefinition` and tracks the mutable runtime fields: zone,
//! owner/controller, active/rested state, attached DON!!, timed modifiers and
//! a generic flag map scripts use for bookkeeping.

use std::sync::Arc;

use im::Vector;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use super::definition::{CardCategory, CardDefinition, Keyword};
use super::modifier::{Duration, Modifier, ModifierKind};
use crate::core::entity::EntityId;
use crate::core::player::PlayerId;
use crate::effects::EffectId;
use crate::zones::Zone;

/// Activity state of a card or DON!! token.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CardState {
    /// Upright; may attack, block, or pay costs.
    Active,
    /// Turned sideways.
    Rested,
    /// Not on the field (deck, hand, trash, life).
    None,
}

/// A card instance in a game.
///
/// ## Flags (i64 only)
///
/// `flags` is a `FxHashMap<String, i64>` for effect bookkeeping:
/// - Booleans: use 0/1
/// - Turn numbers: "used:<effect>" holds the turn the effect was used in
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CardInstance {
    /// Unique entity ID for this instance.
    pub entity_id: EntityId,

    /// Shared static definition.
    pub definition: Arc<CardDefinition>,

    /// Current zone.
    pub zone: Zone,

    /// Owner (whose deck it started in).
    pub owner: PlayerId,

    /// Controller (differs from owner under control-changing effects).
    pub controller: PlayerId,

    /// Active / rested / none.
    pub state: CardState,

    /// DON!! tokens attached to this card.
    pub given_don: Vector<EntityId>,

    /// Timed modifiers.
    pub modifiers: Vector<Modifier>,

    /// Effect bookkeeping.
    #[serde(default)]
    pub flags: FxHashMap<String, i64>,

    /// Turn this card last entered the field.
    pub entered_turn: Option<u32>,
}

impl CardInstance {
    /// Create a card instance owned and controlled by `owner`.
    #[must_use]
    pub fn new(entity_id: EntityId, definition: Arc<CardDefinition>, owner: PlayerId, zone: Zone) -> Self {
        let state = if zone.is_field() { CardState::Active } else { CardState::None };
        Self {
            entity_id,
            definition,
            zone,
            owner,
            controller: owner,
            state,
            given_don: Vector::new(),
            modifiers: Vector::new(),
            flags: FxHashMap::default(),
            entered_turn: None,
        }
    }

    // === Definition shortcuts ===

    /// Card name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.definition.name
    }

    /// Card category.
    #[must_use]
    pub fn category(&self) -> CardCategory {
        self.definition.category
    }

    /// Check for a keyword.
    #[must_use]
    pub fn has_keyword(&self, keyword: Keyword) -> bool {
        self.definition.has_keyword(keyword)
    }

    /// Leader or character (the only legal DON!! and attack targets).
    #[must_use]
    pub fn is_leader_or_character(&self) -> bool {
        matches!(self.category(), CardCategory::Leader | CardCategory::Character)
    }

    /// Check if the card is on the field.
    #[must_use]
    pub fn is_on_field(&self) -> bool {
        self.zone.is_field()
    }

    /// Check if the card is active.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.state == CardState::Active
    }

    /// Check if the card is rested.
    #[must_use]
    pub fn is_rested(&self) -> bool {
        self.state == CardState::Rested
    }

    // === Computed values ===

    /// Sum of modifiers of a kind.
    #[must_use]
    pub fn modifier_total(&self, kind: &ModifierKind) -> i64 {
        self.modifiers
            .iter()
            .filter(|m| &m.kind == kind)
            .map(|m| m.value)
            .sum()
    }

    /// Computed power: base + power modifiers + bonus per attached DON!!.
    #[must_use]
    pub fn power(&self, don_bonus: i64) -> i64 {
        self.definition.power
            + self.modifier_total(&ModifierKind::Power)
            + don_bonus * self.given_don.len() as i64
    }

    /// Effective play cost, floored at zero.
    #[must_use]
    pub fn cost(&self) -> usize {
        (self.definition.cost + self.modifier_total(&ModifierKind::Cost)).max(0) as usize
    }

    // === Modifiers ===

    /// Attach a modifier.
    pub fn add_modifier(&mut self, modifier: Modifier) {
        self.modifiers.push_back(modifier);
    }

    /// Remove modifiers matching a predicate. Returns how many were removed.
    pub fn expire_modifiers(&mut self, pred: impl Fn(&Modifier) -> bool) -> usize {
        let before = self.modifiers.len();
        self.modifiers.retain(|m| !pred(m));
        before - self.modifiers.len()
    }

    /// Check whether any modifier with a duration exists.
    #[must_use]
    pub fn has_modifier_with(&self, duration: Duration) -> bool {
        self.modifiers.iter().any(|m| m.duration == duration)
    }

    // === Flags ===

    /// Get a flag value with a default.
    #[must_use]
    pub fn get_flag(&self, key: &str, default: i64) -> i64 {
        self.flags.get(key).copied().unwrap_or(default)
    }

    /// Set a flag value.
    pub fn set_flag(&mut self, key: impl Into<String>, value: i64) {
        self.flags.insert(key.into(), value);
    }

    /// Check if a flag is set (non-zero).
    #[must_use]
    pub fn has_flag(&self, key: &str) -> bool {
        self.get_flag(key, 0) != 0
    }

    /// Flag key recording the turn an effect was last used.
    #[must_use]
    pub fn used_flag_key(effect: EffectId) -> String {
        format!("used:{}", effect.0)
    }

    /// Check if an effect was used during `turn`.
    #[must_use]
    pub fn effect_used_on(&self, effect: EffectId, turn: u32) -> bool {
        self.flags.get(&Self::used_flag_key(effect)) == Some(&(turn as i64))
    }

    /// Record that an effect was used during `turn`.
    pub fn mark_effect_used(&mut self, effect: EffectId, turn: u32) {
        self.set_flag(Self::used_flag_key(effect), turn as i64);
    }

    /// Reset runtime fields that do not survive leaving the field.
    pub fn clear_field_state(&mut self) {
        self.given_don.clear();
        self.modifiers.clear();
        self.flags.clear();
        self.entered_turn = None;
        self.controller = self.owner;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::{CardId, ModifierId};

    fn character() -> Arc<CardDefinition> {
        Arc::new(CardDefinition::character(CardId::new(1), "Cook", 2, 4000))
    }

    #[test]
    fn test_new_in_hand_has_no_state() {
        let card = CardInstance::new(EntityId(10), character(), PlayerId::FIRST, Zone::Hand);

        assert_eq!(card.state, CardState::None);
        assert_eq!(card.controller, PlayerId::FIRST);
        assert!(!card.is_on_field());
    }

    #[test]
    fn test_new_on_field_is_active() {
        let card = CardInstance::new(EntityId(10), character(), PlayerId::FIRST, Zone::Character);
        assert!(card.is_active());
    }

    #[test]
    fn test_power_includes_modifiers_and_don() {
        let mut card = CardInstance::new(EntityId(10), character(), PlayerId::FIRST, Zone::Character);
        card.add_modifier(Modifier::power(ModifierId(1), 2000, Duration::UntilEndOfTurn, PlayerId::FIRST));
        card.given_don.push_back(EntityId(50));

        assert_eq!(card.power(1000), 4000 + 2000 + 1000);
    }

    #[test]
    fn test_cost_floor() {
        let mut card = CardInstance::new(EntityId(10), character(), PlayerId::FIRST, Zone::Hand);
        card.add_modifier(Modifier::cost(ModifierId(1), -5, Duration::Permanent, PlayerId::FIRST));
        assert_eq!(card.cost(), 0);
    }

    #[test]
    fn test_expire_modifiers() {
        let mut card = CardInstance::new(EntityId(10), character(), PlayerId::FIRST, Zone::Character);
        card.add_modifier(Modifier::power(ModifierId(1), 1000, Duration::Permanent, PlayerId::FIRST));
        card.add_modifier(Modifier::power(ModifierId(2), 1000, Duration::UntilEndOfTurn, PlayerId::FIRST));

        let removed = card.expire_modifiers(|m| m.duration.expires_at_end_of_turn());

        assert_eq!(removed, 1);
        assert!(card.has_modifier_with(Duration::Permanent));
        assert!(!card.has_modifier_with(Duration::UntilEndOfTurn));
    }

    #[test]
    fn test_effect_used_is_keyed_by_turn() {
        let mut card = CardInstance::new(EntityId(10), character(), PlayerId::FIRST, Zone::Character);
        card.mark_effect_used(EffectId(3), 4);

        assert!(card.effect_used_on(EffectId(3), 4));
        assert!(!card.effect_used_on(EffectId(3), 5));
        assert!(!card.effect_used_on(EffectId(2), 4));
    }

    #[test]
    fn test_clear_field_state() {
        let mut card = CardInstance::new(EntityId(10), character(), PlayerId::FIRST, Zone::Character);
        card.controller = PlayerId::SECOND;
        card.given_don.push_back(EntityId(50));
        card.set_flag("x", 1);

        card.clear_field_state();

        assert!(card.given_don.is_empty());
        assert!(!card.has_flag("x"));
        assert_eq!(card.controller, PlayerId::FIRST);
    }

    #[test]
    fn test_card_instance_serialization() {
        let mut card = CardInstance::new(EntityId(10), character(), PlayerId::FIRST, Zone::Character);
        card.set_flag("damage", 3);

        let json = serde_json::to_string(&card).unwrap();
        let deserialized: CardInstance = serde_json::from_str(&json).unwrap();

        assert_eq!(card, deserialized);
    }
}
