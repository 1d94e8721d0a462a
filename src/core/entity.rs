//! Entity identification for creatures and items.
//!
//! Every creature and every tool/spell in a battle carries a unique id.
//! Ids are allocated once by the deck generator and never reused within a
//! battle, so an id that disappears from a field stays gone (no revival).
//!
//! ## Usage
//!
//! ```
//! use creature_clash::core::{CreatureId, ItemId};
//!
//! let creature = CreatureId(7);
//! let item = ItemId(3);
//!
//! assert_eq!(format!("{}", creature), "Creature(7)");
//! assert_eq!(format!("{}", item), "Item(3)");
//! ```

use serde::{Deserialize, Serialize};

/// Unique identifier for a creature instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CreatureId(pub u32);

impl CreatureId {
    /// Get the raw ID value.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl From<u32> for CreatureId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for CreatureId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Creature({})", self.0)
    }
}

/// Unique identifier for a tool or spell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ItemId(pub u32);

impl ItemId {
    /// Get the raw ID value.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl From<u32> for ItemId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for ItemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Item({})", self.0)
    }
}

/// Sequential id allocator shared by creatures and items.
///
/// Creatures and items live in separate id spaces, but drawing both from a
/// single counter keeps logs unambiguous.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdAllocator {
    next: u32,
}

impl IdAllocator {
    /// Create an allocator starting at `first`.
    #[must_use]
    pub const fn starting_at(first: u32) -> Self {
        Self { next: first }
    }

    /// Allocate a creature id.
    pub fn creature(&mut self) -> CreatureId {
        CreatureId(self.bump())
    }

    /// Allocate an item id.
    pub fn item(&mut self) -> ItemId {
        ItemId(self.bump())
    }

    fn bump(&mut self) -> u32 {
        let id = self.next;
        self.next += 1;
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", CreatureId(42)), "Creature(42)");
        assert_eq!(format!("{}", ItemId(9)), "Item(9)");
    }

    #[test]
    fn test_allocator_is_sequential() {
        let mut ids = IdAllocator::starting_at(100);

        assert_eq!(ids.creature(), CreatureId(100));
        assert_eq!(ids.item(), ItemId(101));
        assert_eq!(ids.creature(), CreatureId(102));
    }

    #[test]
    fn test_serialization() {
        let id = CreatureId(123);
        let json = serde_json::to_string(&id).unwrap();
        let deserialized: CreatureId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, deserialized);
    }
}
