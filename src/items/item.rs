//! Tools and spells.
//!
//! Tools are free; spells cost energy and are cast by a field creature. The
//! battle engine only looks at an item's identity, cost and targeting. What
//! the item does is the resolver's business.

use serde::{Deserialize, Serialize};

use crate::core::ItemId;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemKind {
    Tool,
    Spell,
}

/// Who an item lands on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemTarget {
    /// One creature on the user's field.
    Ally,
    /// One creature on the enemy field.
    Enemy,
    /// Every creature on the enemy field.
    AllEnemies,
    /// Every creature on the user's field.
    AllAllies,
}

impl ItemTarget {
    /// Whether the action must name a target creature.
    #[must_use]
    pub const fn needs_target(self) -> bool {
        matches!(self, ItemTarget::Ally | ItemTarget::Enemy)
    }

    /// Whether the item lands on the enemy side.
    #[must_use]
    pub const fn is_hostile(self) -> bool {
        matches!(self, ItemTarget::Enemy | ItemTarget::AllEnemies)
    }
}

/// What an item does when resolved.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum ItemEffect {
    Heal { amount: i32 },
    /// Direct damage; spells add half the caster's magical attack.
    Damage { amount: i32 },
    AttackBoost { amount: i32, turns: u32 },
    Shield { reduction: f64, turns: u32 },
    /// Healing over time.
    Echo { per_turn: i32, turns: u32 },
    /// Magical attack boost.
    Charge { amount: i32, turns: u32 },
    Stun { turns: u32 },
}

/// Coarse purpose of an item, used by the AI to pick candidates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ItemRole {
    Offense,
    Recovery,
    Empower,
    Protection,
    Control,
}

impl ItemEffect {
    #[must_use]
    pub const fn role(&self) -> ItemRole {
        match self {
            ItemEffect::Damage { .. } => ItemRole::Offense,
            ItemEffect::Heal { .. } | ItemEffect::Echo { .. } => ItemRole::Recovery,
            ItemEffect::AttackBoost { .. } | ItemEffect::Charge { .. } => ItemRole::Empower,
            ItemEffect::Shield { .. } => ItemRole::Protection,
            ItemEffect::Stun { .. } => ItemRole::Control,
        }
    }
}

/// A tool or spell in a side's inventory.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub name: String,
    pub kind: ItemKind,
    /// Energy cost; always 0 for tools.
    pub cost: i32,
    pub targeting: ItemTarget,
    pub effect: ItemEffect,
}

impl Item {
    /// A free tool.
    pub fn tool(
        id: ItemId,
        name: impl Into<String>,
        targeting: ItemTarget,
        effect: ItemEffect,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            kind: ItemKind::Tool,
            cost: 0,
            targeting,
            effect,
        }
    }

    /// A spell with an energy cost.
    pub fn spell(
        id: ItemId,
        name: impl Into<String>,
        cost: i32,
        targeting: ItemTarget,
        effect: ItemEffect,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            kind: ItemKind::Spell,
            cost: cost.max(0),
            targeting,
            effect,
        }
    }

    #[must_use]
    pub fn is_spell(&self) -> bool {
        self.kind == ItemKind::Spell
    }

    /// Energy spent to use the item; tools are always free.
    #[must_use]
    pub fn energy_cost(&self) -> i32 {
        match self.kind {
            ItemKind::Tool => 0,
            ItemKind::Spell => self.cost,
        }
    }

    #[must_use]
    pub fn role(&self) -> ItemRole {
        self.effect.role()
    }
}

impl std::fmt::Display for Item {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.kind {
            ItemKind::Tool => write!(f, "{}", self.name),
            ItemKind::Spell => write!(f, "{} ({} energy)", self.name, self.cost),
        }
    }
}
