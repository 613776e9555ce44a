//! Entity identification system.
//!
//! Every physical game object (card instance or DON!! token) has a unique
//! `EntityId`. Ids are allocated once during game setup and never reused:
//! objects migrate between zones but are never deleted.
//!
//! ## Usage
//!
//! ```
//! use don_rules::core::{EntityAllocator, EntityId};
//!
//! let mut alloc = EntityAllocator::new();
//! let first = alloc.next_id();
//! let second = alloc.next_id();
//!
//! assert_eq!(first, EntityId(1));
//! assert_ne!(first, second);
//! ```

use serde::{Deserialize, Serialize};

/// Unique identifier for a card instance or DON!! token.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityId(pub u32);

impl EntityId {
    /// Create an entity ID.
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

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Entity({})", self.0)
    }
}

/// Sequential allocator used while a game is being set up.
///
/// Id 0 is never handed out so it can't be confused with a default value.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityAllocator {
    next: u32,
}

impl EntityAllocator {
    /// Create an allocator starting at id 1.
    #[must_use]
    pub fn new() -> Self {
        Self { next: 1 }
    }

    /// Allocate the next id.
    pub fn next_id(&mut self) -> EntityId {
        let id = EntityId(self.next);
        self.next += 1;
        id
    }

    /// Number of ids handed out so far.
    #[must_use]
    pub fn allocated(&self) -> u32 {
        self.next - 1
    }
}

impl Default for EntityAllocator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_id_display() {
        assert_eq!(format!("{}", EntityId(7)), "Entity(7)");
        assert_eq!(EntityId::new(7).raw(), 7);
    }

    #[test]
    fn test_allocator_is_sequential() {
        let mut alloc = EntityAllocator::new();
        let ids: Vec<_> = (0..4).map(|_| alloc.next_id()).collect();

        assert_eq!(ids, vec![EntityId(1), EntityId(2), EntityId(3), EntityId(4)]);
        assert_eq!(alloc.allocated(), 4);
    }

    #[test]
    fn test_entity_id_ordering() {
        assert!(EntityId(1) < EntityId(2));
    }

    #[test]
    fn test_entity_id_serialization() {
        let id = EntityId(42);
        let json = serde_json::to_string(&id).unwrap();
        let back: EntityId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, back);
    }
}
