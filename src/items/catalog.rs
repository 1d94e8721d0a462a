//! The built-in tool and spell roster.

use crate::core::IdAllocator;

use super::item::{Item, ItemEffect, ItemTarget};

/// Every standard tool, with fresh ids.
pub fn standard_tools(ids: &mut IdAllocator) -> Vec<Item> {
    vec![
        Item::tool(ids.item(), "Healing Salve", ItemTarget::Ally, ItemEffect::Heal { amount: 25 }),
        Item::tool(
            ids.item(),
            "Iron Ward",
            ItemTarget::Ally,
            ItemEffect::Shield { reduction: 0.3, turns: 2 },
        ),
        Item::tool(
            ids.item(),
            "Echo Chime",
            ItemTarget::Ally,
            ItemEffect::Echo { per_turn: 6, turns: 3 },
        ),
        Item::tool(
            ids.item(),
            "Focus Crystal",
            ItemTarget::Ally,
            ItemEffect::Charge { amount: 6, turns: 2 },
        ),
        Item::tool(
            ids.item(),
            "Battle Horn",
            ItemTarget::AllAllies,
            ItemEffect::AttackBoost { amount: 4, turns: 1 },
        ),
    ]
}

/// Every standard spell, with fresh ids.
pub fn standard_spells(ids: &mut IdAllocator) -> Vec<Item> {
    vec![
        Item::spell(
            ids.item(),
            "Firebolt",
            3,
            ItemTarget::Enemy,
            ItemEffect::Damage { amount: 20 },
        ),
        Item::spell(
            ids.item(),
            "Shockwave",
            5,
            ItemTarget::AllEnemies,
            ItemEffect::Damage { amount: 10 },
        ),
        Item::spell(
            ids.item(),
            "Stunning Glare",
            4,
            ItemTarget::Enemy,
            ItemEffect::Stun { turns: 1 },
        ),
        Item::spell(
            ids.item(),
            "Rally",
            2,
            ItemTarget::AllAllies,
            ItemEffect::AttackBoost { amount: 3, turns: 2 },
        ),
        Item::spell(
            ids.item(),
            "Mending Light",
            3,
            ItemTarget::Ally,
            ItemEffect::Heal { amount: 30 },
        ),
    ]
}
