//! Battle analysis: the first planner stage.
//!
//! Aggregates both sides, flags critical creatures, ranks enemy targets,
//! estimates the damage deliverable this turn and spots item combos.
//! Everything here is a pure function of a `PlanContext`.

use smallvec::SmallVec;
use tracing::trace;

use crate::core::{CreatureId, ItemId};
use crate::creatures::{Creature, Rarity};
use crate::items::{Item, ItemRole, ItemTarget};
use crate::stats::{best_attack, AttackKind};

use super::context::{creature_power, PlanContext};

/// Bonus for a target that can be finished this turn.
pub const LETHAL_BONUS: f64 = 100.0;

/// Health fraction under which a creature counts as critical.
#[must_use]
pub const fn critical_threshold(rarity: Rarity) -> f64 {
    match rarity {
        Rarity::Common => 0.25,
        Rarity::Rare => 0.30,
        Rarity::Epic => 0.35,
        Rarity::Legendary => 0.40,
    }
}

#[must_use]
pub fn is_critical(creature: &Creature) -> bool {
    creature.is_alive() && creature.health_fraction() < critical_threshold(creature.rarity)
}

fn rarity_weight(rarity: Rarity) -> f64 {
    match rarity {
        Rarity::Common => 0.0,
        Rarity::Rare => 5.0,
        Rarity::Epic => 10.0,
        Rarity::Legendary => 20.0,
    }
}

/// One ranked enemy.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TargetScore {
    pub id: CreatureId,
    pub score: f64,
    /// Best single estimated hit any ready ally lands on it.
    pub best_hit: i32,
    pub best_kind: AttackKind,
    /// Whether the combined attacks available this turn can finish it.
    pub lethal: bool,
}

/// Score one enemy against the ready attackers.
///
/// `threat power + finishability + rarity weight + effect weight`, plus
/// `LETHAL_BONUS` when this turn's attacks can finish it.
#[must_use]
pub fn score_target(ctx: &PlanContext<'_>, target: &Creature) -> TargetScore {
    let attacks_affordable = if ctx.config.attack_cost > 0 {
        (ctx.own.energy / ctx.config.attack_cost).max(0) as usize
    } else {
        usize::MAX
    };

    let mut hits: SmallVec<[(AttackKind, i32); 4]> =
        ctx.ready_creatures().map(|a| best_attack(a, target)).collect();
    hits.sort_by(|a, b| b.1.cmp(&a.1));
    let (best_kind, best_hit) = hits.first().copied().unwrap_or((AttackKind::Physical, 0));
    let combined: i32 = hits.iter().take(attacks_affordable).map(|h| h.1).sum();
    let lethal = combined >= target.current_health() && combined > 0;

    let threat = f64::from(target.stats().total_attack()) / 2.0;
    let finishability = (1.0 - target.health_fraction()) * 30.0;
    let effects = target
        .effects
        .iter()
        .filter(|e| e.category.is_beneficial())
        .count() as f64
        * 4.0;
    let mut score = threat + finishability + rarity_weight(target.rarity) + effects;
    if lethal {
        score += LETHAL_BONUS;
    }

    trace!(
        target = %target.id,
        threat,
        finishability,
        effects,
        lethal,
        score,
        "scored target"
    );
    TargetScore {
        id: target.id,
        score,
        best_hit,
        best_kind,
        lethal,
    }
}

/// Enemies by descending score; ties keep field order.
#[must_use]
pub fn rank_targets(ctx: &PlanContext<'_>) -> Vec<TargetScore> {
    let mut ranked: Vec<TargetScore> = ctx.enemies().map(|t| score_target(ctx, t)).collect();
    ranked.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
    ranked
}

/// Damage the side can put out this turn with plain attacks.
///
/// Each affordable attack goes to the strongest remaining attacker against
/// its best target.
#[must_use]
pub fn deliverable_damage(ctx: &PlanContext<'_>) -> i32 {
    let affordable = if ctx.config.attack_cost > 0 {
        (ctx.own.energy / ctx.config.attack_cost).max(0) as usize
    } else {
        usize::MAX
    };
    let mut per_attacker: SmallVec<[i32; 4]> = ctx
        .ready_creatures()
        .map(|a| ctx.enemies().map(|t| best_attack(a, t).1).max().unwrap_or(0))
        .collect();
    per_attacker.sort_unstable_by(|a, b| b.cmp(a));
    per_attacker.iter().take(affordable).sum()
}

/// Health `item` would take off `target`, previewed through the engine's
/// resolver. Zero for items that do not hurt.
#[must_use]
pub fn item_damage(
    ctx: &PlanContext<'_>,
    item: &Item,
    caster: Option<&Creature>,
    target: &Creature,
) -> i32 {
    let after = ctx.preview_item(item, caster, target);
    (target.current_health() - after.current_health()).max(0)
}

/// Item sequences worth playing together.
#[derive(Clone, Debug, PartialEq)]
pub enum ItemCombo {
    /// Empower an attacker, then attack with it.
    BuffThenAttack { item: ItemId, attacker: CreatureId },
    /// Shield or heal a critical ally.
    EmergencyShield { item: ItemId, target: CreatureId },
    /// Several damage spells that fit in this turn's energy.
    MultiSpell { spells: SmallVec<[ItemId; 4]> },
}

/// Combos available this turn, most urgent first.
#[must_use]
pub fn detect_combos(ctx: &PlanContext<'_>) -> Vec<ItemCombo> {
    let mut combos = Vec::new();
    let energy = ctx.own.energy;

    let critical = ctx.own.living().find(|c| is_critical(c));
    if let Some(ally) = critical {
        let saver = ctx.items().find(|i| {
            matches!(i.role(), ItemRole::Protection | ItemRole::Recovery)
                && i.targeting == ItemTarget::Ally
                && i.energy_cost() <= energy
        });
        if let Some(item) = saver {
            combos.push(ItemCombo::EmergencyShield {
                item: item.id,
                target: ally.id,
            });
        }
    }

    let has_target = ctx.enemies().next().is_some();
    let strongest = ctx.ready_creatures().max_by_key(|c| c.stats().total_attack());
    if let Some(attacker) = strongest.filter(|_| has_target) {
        let buff = ctx.items().find(|i| {
            i.role() == ItemRole::Empower
                && matches!(i.targeting, ItemTarget::Ally | ItemTarget::AllAllies)
                && i.energy_cost() + ctx.config.attack_cost <= energy
        });
        if let Some(item) = buff {
            combos.push(ItemCombo::BuffThenAttack {
                item: item.id,
                attacker: attacker.id,
            });
        }
    }

    if has_target && ctx.ready_creatures().next().is_some() {
        let mut budget = energy;
        let mut spells: SmallVec<[ItemId; 4]> = SmallVec::new();
        for spell in ctx.own.spells.iter() {
            if spell.role() == ItemRole::Offense && spell.cost <= budget {
                budget -= spell.cost;
                spells.push(spell.id);
            }
        }
        if spells.len() >= 2 {
            combos.push(ItemCombo::MultiSpell { spells });
        }
    }

    combos
}

/// Everything the later planner stages read.
#[derive(Clone, Debug, PartialEq)]
pub struct BattleAnalysis {
    pub own_power: i32,
    pub enemy_power: i32,
    pub own_health: i32,
    pub enemy_health: i32,
    /// Own creatures below their critical threshold.
    pub critical: SmallVec<[CreatureId; 4]>,
    /// Enemy targets, best first.
    pub targets: Vec<TargetScore>,
    pub deliverable_damage: i32,
    pub combos: Vec<ItemCombo>,
}

impl BattleAnalysis {
    /// Whether some enemy can be finished this turn.
    #[must_use]
    pub fn lethal_available(&self) -> bool {
        self.targets.iter().any(|t| t.lethal)
    }

    /// Own power over enemy power; 2.0 when the enemy field is empty.
    #[must_use]
    pub fn power_ratio(&self) -> f64 {
        if self.enemy_power == 0 {
            return 2.0;
        }
        f64::from(self.own_power) / f64::from(self.enemy_power)
    }
}

/// Run the analysis stage.
#[must_use]
pub fn analyze(ctx: &PlanContext<'_>) -> BattleAnalysis {
    BattleAnalysis {
        own_power: ctx.own.living().map(creature_power).sum(),
        enemy_power: ctx.enemies().map(creature_power).sum(),
        own_health: ctx.own.living().map(Creature::current_health).sum(),
        enemy_health: ctx.enemies().map(Creature::current_health).sum(),
        critical: ctx.own.living().filter(|c| is_critical(c)).map(|c| c.id).collect(),
        targets: rank_targets(ctx),
        deliverable_damage: deliverable_damage(ctx),
        combos: detect_combos(ctx),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Side;
    use crate::core::{BattleConfig, Difficulty, DifficultyConfig};
    use crate::items::{Item, ItemEffect, ItemOutcome, ItemRequest, ItemResolver};
    use crate::rules::fixtures::{engine, firebolt, second_turn};
    use crate::rules::BattleEngine;

    /// Resolver whose items do nothing.
    struct Inert;

    impl ItemResolver for Inert {
        fn resolve(&self, _request: &ItemRequest<'_>) -> ItemOutcome {
            ItemOutcome {
                updated: Vec::new(),
                description: "nothing happens".into(),
            }
        }
    }

    #[test]
    fn test_critical_thresholds_rise_with_rarity() {
        let thresholds: Vec<f64> = Rarity::ALL.iter().map(|&r| critical_threshold(r)).collect();
        assert_eq!(thresholds, vec![0.25, 0.30, 0.35, 0.40]);
    }

    #[test]
    fn test_wounded_target_ranks_first() {
        let engine = engine();
        let knobs = engine.difficulty().clone();
        let mut state = second_turn(&engine);
        let mut extra = state.sides[Side::Opponent].hand[0].clone();
        extra.restore();
        extra.take_damage(80);
        state.side_mut(Side::Opponent).hand.pop_front();
        state.side_mut(Side::Opponent).field.push_back(extra.clone());

        let ctx = PlanContext::new(&engine, &state, &knobs);
        let ranked = rank_targets(&ctx);

        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].id, extra.id);
        assert!(ranked[0].score > ranked[1].score);
    }

    #[test]
    fn test_lethal_flag_and_bonus() {
        let engine = engine();
        let knobs = engine.difficulty().clone();
        let mut state = second_turn(&engine);
        state.side_mut(Side::Opponent).field[0].set_health(5);

        let ctx = PlanContext::new(&engine, &state, &knobs);
        let score = score_target(&ctx, &state.sides[Side::Opponent].field[0]);
        assert!(score.lethal);
        assert!(score.score >= LETHAL_BONUS);
    }

    #[test]
    fn test_deliverable_damage_limited_by_energy() {
        let engine = engine();
        let knobs = engine.difficulty().clone();
        let mut state = second_turn(&engine);

        let ctx = PlanContext::new(&engine, &state, &knobs);
        let full = deliverable_damage(&ctx);
        assert!(full > 0);

        state.side_mut(Side::Player).energy = 1;
        let ctx = PlanContext::new(&engine, &state, &knobs);
        assert_eq!(deliverable_damage(&ctx), 0);
    }

    #[test]
    fn test_detects_emergency_shield_and_multi_spell() {
        let engine = engine();
        let knobs = engine.difficulty().clone();
        let mut state = second_turn(&engine);
        let player = state.side_mut(Side::Player);
        player.field[0].set_health(10);
        player.tools.push_back(Item::tool(
            ItemId(70),
            "Healing Salve",
            ItemTarget::Ally,
            ItemEffect::Heal { amount: 25 },
        ));
        player.spells.push_back(firebolt(71));

        let ctx = PlanContext::new(&engine, &state, &knobs);
        let combos = detect_combos(&ctx);

        assert_eq!(
            combos[0],
            ItemCombo::EmergencyShield {
                item: ItemId(70),
                target: CreatureId(1),
            }
        );
        assert!(combos
            .iter()
            .any(|c| matches!(c, ItemCombo::MultiSpell { spells } if spells.len() == 2)));
    }

    #[test]
    fn test_item_damage_follows_engine_resolver() {
        let standard = engine();
        let state = second_turn(&standard);
        let knobs = standard.difficulty().clone();
        let caster = &state.sides[Side::Player].field[0];
        let target = &state.sides[Side::Opponent].field[0];
        let spell = &state.sides[Side::Player].spells[0];

        let ctx = PlanContext::new(&standard, &state, &knobs);
        assert!(item_damage(&ctx, spell, Some(caster), target) > 0);

        let inert = BattleEngine::with_resolver(
            BattleConfig::default(),
            DifficultyConfig::for_tier(Difficulty::Medium).with_starting_energy(10),
            Inert,
        );
        let ctx = PlanContext::new(&inert, &state, &knobs);
        assert_eq!(item_damage(&ctx, spell, Some(caster), target), 0);
    }
}
