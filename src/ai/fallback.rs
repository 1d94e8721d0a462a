//! Single-action fallbacks, one per tier.
//!
//! Used when the batch planner commits nothing. Every pick comes from
//! `legal_actions`, so whatever is returned validates against `state`.
//! Creatures that already acted this turn are not picked again.

use tracing::debug;

use crate::core::{Action, BattleState, Difficulty, GameRng};
use crate::items::ItemResolver;
use crate::rules::BattleEngine;
use crate::stats::estimate_damage;

use super::analysis::BattleAnalysis;
use super::context::{creature_power, PlanContext};
use super::lethal::find_lethal;

fn deploys(legal: &[Action]) -> impl Iterator<Item = &Action> {
    legal.iter().filter(|a| matches!(a, Action::Deploy { .. }))
}

fn attacks(legal: &[Action]) -> impl Iterator<Item = &Action> {
    legal.iter().filter(|a| matches!(a, Action::Attack { .. }))
}

/// Random attack, else random deploy.
fn easy(legal: &[Action], rng: &mut GameRng) -> Option<Action> {
    let attacks: Vec<&Action> = attacks(legal).collect();
    if let Some(action) = rng.choose(&attacks) {
        return Some((*action).clone());
    }
    let deploys: Vec<&Action> = deploys(legal).collect();
    rng.choose(&deploys).map(|a| (*a).clone())
}

/// Cheapest deploy while the field is thin, else hit the weakest enemy.
fn medium(ctx: &PlanContext<'_>, legal: &[Action]) -> Option<Action> {
    let cheapest = deploys(legal).min_by_key(|a| match a {
        Action::Deploy { creature } => {
            ctx.own.hand_creature(*creature).map_or(i32::MAX, |c| c.deploy_cost())
        }
        _ => i32::MAX,
    });
    if ctx.own.living().count() < 2 {
        if let Some(action) = cheapest {
            return Some(action.clone());
        }
    }
    let weakest = attacks(legal).min_by_key(|a| match a {
        Action::Attack { target, .. } => {
            ctx.enemy_creature(*target).map_or(i32::MAX, |t| t.current_health())
        }
        _ => i32::MAX,
    });
    weakest.or(cheapest).cloned()
}

/// Hardest hit, else strongest deploy, else brace a critical ally.
fn hard(ctx: &PlanContext<'_>, analysis: &BattleAnalysis, legal: &[Action]) -> Option<Action> {
    let best_hit = attacks(legal)
        .filter_map(|a| match a {
            Action::Attack { attacker, target, kind } => {
                let attacker = ctx.own_creature(*attacker)?;
                let target = ctx.enemy_creature(*target)?;
                Some((a, estimate_damage(attacker, target, *kind)))
            }
            _ => None,
        })
        .max_by_key(|(_, damage)| *damage);
    if let Some((action, _)) = best_hit {
        return Some(action.clone());
    }

    let strongest = deploys(legal).max_by_key(|a| match a {
        Action::Deploy { creature } => ctx.own.hand_creature(*creature).map_or(0, creature_power),
        _ => 0,
    });
    if let Some(action) = strongest {
        return Some(action.clone());
    }

    legal
        .iter()
        .find(|a| matches!(a, Action::Defend { creature } if analysis.critical.contains(creature)))
        .cloned()
}

fn expert(ctx: &PlanContext<'_>, analysis: &BattleAnalysis, legal: &[Action]) -> Option<Action> {
    let opener = find_lethal(ctx, analysis)
        .and_then(|plan| plan.actions.into_iter().next())
        .filter(|a| legal.contains(a));
    opener.or_else(|| hard(ctx, analysis, legal))
}

/// The tier's fallback pick, or `None` when only ending the turn is legal.
pub fn fallback_action<R: ItemResolver>(
    engine: &BattleEngine<R>,
    state: &BattleState,
    ctx: &PlanContext<'_>,
    analysis: &BattleAnalysis,
    rng: &mut GameRng,
) -> Option<Action> {
    let legal: Vec<Action> = engine
        .legal_actions(state)
        .into_iter()
        .filter(|a| *a != Action::EndTurn)
        .filter(|a| !(a.is_exclusive() && a.actor().is_some_and(|id| ctx.acted.contains(&id))))
        .collect();
    if legal.is_empty() {
        return None;
    }

    let action = match ctx.knobs.tier {
        Difficulty::Easy => easy(&legal, rng),
        Difficulty::Medium => medium(ctx, &legal),
        Difficulty::Hard => hard(ctx, analysis, &legal),
        Difficulty::Expert => expert(ctx, analysis, &legal),
    };
    debug!(
        side = %ctx.side,
        tier = %ctx.knobs.tier,
        action = ?action,
        candidates = legal.len(),
        "fallback pick"
    );
    action
}
