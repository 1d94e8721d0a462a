//! Best-effort lethal search.
//!
//! For each ranked target, greedily stacks one attack buff, damage spells
//! and attacks until the estimated damage covers the target's health or the
//! energy runs out. Buffed attackers are estimated on a recomputed copy;
//! nothing in the battle state is touched.

use smallvec::SmallVec;
use tracing::debug;

use crate::core::{Action, ActionBatch, CreatureId};
use crate::creatures::Creature;
use crate::items::{Item, ItemRole, ItemTarget};
use crate::stats::best_attack;

use super::analysis::{item_damage, BattleAnalysis};
use super::context::PlanContext;

/// A sequence expected to eliminate one enemy.
#[derive(Clone, Debug, PartialEq)]
pub struct LethalPlan {
    pub target: CreatureId,
    pub actions: ActionBatch,
    pub expected_damage: i32,
    pub energy: i32,
}

/// `attacker` after `item` lands on it, with stats recomputed.
fn buffed(ctx: &PlanContext<'_>, item: &Item, attacker: &Creature) -> Creature {
    let mut copy = ctx.preview_item(item, None, attacker);
    copy.recompute(&ctx.own.synergies);
    copy
}

/// A spell or tool use of `item`, cast by `caster` when it is a spell.
fn use_item(item: &Item, caster: Option<CreatureId>, target: Option<CreatureId>) -> Action {
    match (item.is_spell(), caster) {
        (true, Some(caster)) => Action::UseSpell {
            spell: item.id,
            caster,
            target,
        },
        _ => Action::UseTool {
            tool: item.id,
            target,
        },
    }
}

fn plan_against(ctx: &PlanContext<'_>, target: &Creature) -> Option<LethalPlan> {
    let health = target.current_health();
    let mut energy = ctx.own.energy;
    let mut actions = ActionBatch::new();
    let mut dealt = 0;
    let mut busy: SmallVec<[CreatureId; 4]> = SmallVec::new();

    let mut attackers: Vec<Creature> = ctx.ready_creatures().cloned().collect();
    if attackers.is_empty() {
        return None;
    }
    attackers.sort_by_key(|a| std::cmp::Reverse(best_attack(a, target).1));

    let buff = ctx.items().find(|i| {
        i.role() == ItemRole::Empower
            && matches!(i.targeting, ItemTarget::Ally | ItemTarget::AllAllies)
            && i.energy_cost() + ctx.config.attack_cost <= energy
            && (!i.is_spell() || attackers.len() > 1)
    });
    if let Some(item) = buff {
        let boosted = buffed(ctx, item, &attackers[0]);
        if best_attack(&boosted, target).1 > best_attack(&attackers[0], target).1 {
            let ally = (item.targeting == ItemTarget::Ally).then_some(attackers[0].id);
            let caster = attackers.last().map(|c| c.id).filter(|_| item.is_spell());
            actions.push(use_item(item, caster, ally));
            if let Some(id) = caster {
                busy.push(id);
            }
            energy -= item.energy_cost();
            attackers[0] = boosted;
        }
    }

    let mut spells: SmallVec<[&Item; 4]> = ctx
        .own
        .spells
        .iter()
        .filter(|s| s.targeting.is_hostile() && s.role() == ItemRole::Offense)
        .collect();
    spells.sort_by_key(|s| std::cmp::Reverse(item_damage(ctx, s, None, target)));

    for spell in spells {
        if dealt >= health || spell.cost > energy {
            continue;
        }
        // Cast from the weakest free attacker so the strong ones keep attacking.
        let Some(caster) = attackers.iter().rev().find(|c| !busy.contains(&c.id)) else {
            break;
        };
        let aim = (spell.targeting == ItemTarget::Enemy).then_some(target.id);
        dealt += item_damage(ctx, spell, Some(caster), target);
        energy -= spell.cost;
        busy.push(caster.id);
        actions.push(use_item(spell, Some(caster.id), aim));
    }

    for attacker in &attackers {
        if dealt >= health || energy < ctx.config.attack_cost {
            break;
        }
        if busy.contains(&attacker.id) {
            continue;
        }
        let (kind, damage) = best_attack(attacker, target);
        dealt += damage;
        energy -= ctx.config.attack_cost;
        busy.push(attacker.id);
        actions.push(Action::Attack {
            attacker: attacker.id,
            target: target.id,
            kind,
        });
    }

    (dealt >= health).then(|| LethalPlan {
        target: target.id,
        actions,
        expected_damage: dealt,
        energy: ctx.own.energy - energy,
    })
}

/// The first ranked target that can be finished this turn.
#[must_use]
pub fn find_lethal(ctx: &PlanContext<'_>, analysis: &BattleAnalysis) -> Option<LethalPlan> {
    let plan = analysis
        .targets
        .iter()
        .filter_map(|t| ctx.enemy_creature(t.id))
        .find_map(|target| plan_against(ctx, target))?;
    debug!(
        side = %ctx.side,
        target = %plan.target,
        actions = plan.actions.len(),
        expected = plan.expected_damage,
        "lethal line found"
    );
    Some(plan)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::analysis::analyze;
    use crate::core::{ItemId, Side};
    use crate::rules::fixtures::{engine, second_turn};

    #[test]
    fn test_no_lethal_against_full_health() {
        let engine = engine();
        let knobs = engine.difficulty().clone();
        let mut state = second_turn(&engine);
        state.side_mut(Side::Player).spells.clear();

        let ctx = PlanContext::new(&engine, &state, &knobs);
        assert!(find_lethal(&ctx, &analyze(&ctx)).is_none());
    }

    #[test]
    fn test_spell_plus_attack_finishes_target() {
        let engine = engine();
        let knobs = engine.difficulty().clone();
        let mut state = second_turn(&engine);
        let player = state.side_mut(Side::Player);
        let second = player.hand[0].clone();
        player.hand.pop_front();
        player.field.push_back(second);
        state.side_mut(Side::Opponent).field[0].set_health(45);

        let ctx = PlanContext::new(&engine, &state, &knobs);
        let plan = find_lethal(&ctx, &analyze(&ctx)).unwrap();

        assert_eq!(plan.target, CreatureId(11));
        assert!(plan.expected_damage >= 45);
        assert!(plan.energy <= 9);
        assert!(plan
            .actions
            .iter()
            .any(|a| matches!(a, Action::UseSpell { spell: ItemId(50), .. })));
    }

    #[test]
    fn test_plan_respects_energy() {
        let engine = engine();
        let knobs = engine.difficulty().clone();
        let mut state = second_turn(&engine);
        state.side_mut(Side::Opponent).field[0].set_health(20);
        state.side_mut(Side::Player).energy = 2;

        let ctx = PlanContext::new(&engine, &state, &knobs);
        let plan = find_lethal(&ctx, &analyze(&ctx)).unwrap();
        assert_eq!(plan.actions.len(), 1);
        assert!(matches!(plan.actions[0], Action::Attack { .. }));
        assert_eq!(plan.energy, 2);
    }
}
