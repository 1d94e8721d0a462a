//! Item resolution.
//!
//! The battle engine hands a resolver the item, the caster and copies of
//! the target creatures. The resolver returns updated copies plus a
//! description line for the log; the engine merges them back by id.

use crate::core::Difficulty;
use crate::creatures::{ActiveEffect, Creature, EffectCategory, EffectDuration, StatModifiers};
use crate::stats::damage::mitigation;

use super::item::{Item, ItemEffect};

/// Everything a resolver may look at.
#[derive(Clone, Copy, Debug)]
pub struct ItemRequest<'a> {
    pub item: &'a Item,
    /// Spell caster; `None` for tools.
    pub caster: Option<&'a Creature>,
    pub targets: &'a [Creature],
    pub difficulty: Difficulty,
    pub turn: u32,
}

/// Result of resolving an item.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ItemOutcome {
    /// Updated copies of the targets. Creatures not listed are unchanged.
    pub updated: Vec<Creature>,
    pub description: String,
}

/// Applies item effects to creatures.
pub trait ItemResolver {
    fn resolve(&self, request: &ItemRequest<'_>) -> ItemOutcome;
}

/// Built-in resolver for every `ItemEffect`.
#[derive(Clone, Copy, Debug, Default)]
pub struct StandardItemResolver;

impl StandardItemResolver {
    /// Damage of a damage spell or tool against one target.
    ///
    /// `amount + caster magical attack / 2`, reduced by the target's damage
    /// reduction and magical defense mitigation. At least 1.
    #[must_use]
    pub fn damage_amount(amount: i32, caster: Option<&Creature>, target: &Creature) -> i32 {
        let bonus = caster.map_or(0, |c| c.stats().magical_attack / 2);
        let raw = f64::from((amount + bonus).max(0));
        let reduced = raw
            * (1.0 - target.damage_reduction())
            * (1.0 - mitigation(target.stats().magical_defense));
        (reduced.round() as i32).max(1)
    }

    fn apply(item: &Item, caster: Option<&Creature>, target: &mut Creature) -> String {
        match item.effect {
            ItemEffect::Heal { amount } => {
                let healed = target.heal(amount);
                format!("{} recovers {healed} health", target.name)
            }
            ItemEffect::Damage { amount } => {
                let damage = Self::damage_amount(amount, caster, target);
                let dealt = target.take_damage(damage);
                if target.is_alive() {
                    format!("{} takes {dealt} damage", target.name)
                } else {
                    format!("{} takes {dealt} damage and is defeated", target.name)
                }
            }
            ItemEffect::AttackBoost { amount, turns } => {
                let duration = EffectDuration::Turns(turns);
                target.add_effect(
                    ActiveEffect::new(&item.name, EffectCategory::Buff, duration)
                        .with_stat_modifiers(StatModifiers::attack(amount, amount)),
                );
                format!("{} gains +{amount} attack", target.name)
            }
            ItemEffect::Shield { reduction, turns } => {
                let duration = EffectDuration::Turns(turns);
                let effect = ActiveEffect::new(&item.name, EffectCategory::Shield, duration)
                    .with_damage_reduction(reduction);
                let percent = (effect.damage_reduction * 100.0).round();
                target.add_effect(effect);
                format!("{} is shielded ({percent}% reduction)", target.name)
            }
            ItemEffect::Echo { per_turn, turns } => {
                let duration = EffectDuration::Turns(turns);
                target.add_effect(
                    ActiveEffect::new(&item.name, EffectCategory::Buff, duration)
                        .with_health_per_tick(per_turn),
                );
                format!("{} will recover {per_turn} health for {turns} turns", target.name)
            }
            ItemEffect::Charge { amount, turns } => {
                let duration = EffectDuration::Turns(turns);
                target.add_effect(
                    ActiveEffect::new(&item.name, EffectCategory::Buff, duration)
                        .with_stat_modifiers(StatModifiers::attack(0, amount)),
                );
                format!("{} charges +{amount} magical attack", target.name)
            }
            ItemEffect::Stun { turns } => {
                target.add_effect(ActiveEffect::new(
                    &item.name,
                    EffectCategory::Stun,
                    EffectDuration::Turns(turns),
                ));
                format!("{} is stunned", target.name)
            }
        }
    }
}

impl ItemResolver for StandardItemResolver {
    fn resolve(&self, request: &ItemRequest<'_>) -> ItemOutcome {
        let mut updated = Vec::with_capacity(request.targets.len());
        let mut lines = Vec::with_capacity(request.targets.len());

        for target in request.targets {
            let mut copy = target.clone();
            lines.push(Self::apply(request.item, request.caster, &mut copy));
            updated.push(copy);
        }

        let user = request.caster.map_or_else(|| "Tool".to_string(), |c| c.name.clone());
        let description = if lines.is_empty() {
            format!("{user} uses {} to no effect", request.item.name)
        } else {
            format!("{user} uses {}: {}", request.item.name, lines.join(", "))
        };

        ItemOutcome { updated, description }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{CreatureId, ItemId};
    use crate::creatures::{BaseStats, Rarity};
    use crate::items::ItemTarget;

    fn creature(id: u32) -> Creature {
        Creature::new(CreatureId(id), "Mossback", Rarity::Common, 0, BaseStats::uniform(5))
    }

    fn resolve(item: &Item, caster: Option<&Creature>, targets: &[Creature]) -> ItemOutcome {
        StandardItemResolver.resolve(&ItemRequest {
            item,
            caster,
            targets,
            difficulty: Difficulty::Medium,
            turn: 1,
        })
    }

    #[test]
    fn test_heal_is_capped() {
        let salve = Item::tool(
            ItemId(1),
            "Salve",
            ItemTarget::Ally,
            ItemEffect::Heal { amount: 50 },
        );
        let outcome = resolve(&salve, None, &[creature(1).with_health(100)]);

        assert_eq!(outcome.updated[0].current_health(), 120);
        assert!(outcome.description.contains("recovers 20 health"));
    }

    #[test]
    fn test_spell_damage_scales_with_caster() {
        let caster = creature(1);
        let target = creature(2);
        // (20 + 30/2) × (1 − 20/120) = 29.2
        assert_eq!(StandardItemResolver::damage_amount(20, Some(&caster), &target), 29);
        // 20 × 5/6 = 16.7
        assert_eq!(StandardItemResolver::damage_amount(20, None, &target), 17);
    }

    #[test]
    fn test_area_damage_hits_every_target() {
        let wave = Item::spell(
            ItemId(3),
            "Shockwave",
            5,
            ItemTarget::AllEnemies,
            ItemEffect::Damage { amount: 10 },
        );
        let caster = creature(1);
        let outcome = resolve(&wave, Some(&caster), &[creature(2), creature(3)]);

        assert_eq!(outcome.updated.len(), 2);
        assert!(outcome.updated.iter().all(|c| c.current_health() < 120));
    }

    #[test]
    fn test_buffs_attach_effects() {
        let horn = Item::tool(
            ItemId(4),
            "Battle Horn",
            ItemTarget::AllAllies,
            ItemEffect::AttackBoost { amount: 4, turns: 2 },
        );
        let outcome = resolve(&horn, None, &[creature(1)]);
        let mut boosted = outcome.updated[0].clone();
        boosted.recompute(&[]);

        assert_eq!(boosted.stats().physical_attack, 34);
        assert!(boosted.has_effect("Battle Horn"));
    }

    #[test]
    fn test_stun() {
        let glare = Item::spell(
            ItemId(5),
            "Glare",
            4,
            ItemTarget::Enemy,
            ItemEffect::Stun { turns: 1 },
        );
        let outcome = resolve(&glare, Some(&creature(1)), &[creature(2)]);
        assert!(outcome.updated[0].is_incapacitated());
    }

    #[test]
    fn test_no_targets() {
        let horn = Item::tool(
            ItemId(6),
            "Horn",
            ItemTarget::AllAllies,
            ItemEffect::Heal { amount: 1 },
        );
        let outcome = resolve(&horn, None, &[]);
        assert!(outcome.updated.is_empty());
        assert_eq!(outcome.description, "Tool uses Horn to no effect");
    }
}
