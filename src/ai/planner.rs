//! The batch planner.
//!
//! Each turn runs analyze → choose strategy → decide batching → plan
//! greedily. The greedy stage walks a fixed priority order and commits an
//! action only when a `Budget` says its cost fits and its actor is free:
//!
//! 1. emergency defense for critical creatures
//! 2. the best available item combo
//! 3. deployment up to the optimal field size
//! 4. pre-attack buffs
//! 5. lethal spells
//! 6. focused or distributed attacks
//! 7. low-priority setup (leftover recovery and empower tools, precautionary
//!    defend)
//!
//! Expert tiers seed the budget with a lethal line before step 1. When the
//! greedy stage commits nothing, the tier's fallback picks a single legal
//! action instead.

use rustc_hash::{FxHashMap, FxHashSet};
use smallvec::SmallVec;
use tracing::debug;

use crate::core::{
    Action, ActionBatch, BattleState, CreatureId, Difficulty, DifficultyConfig, GameRng, ItemId,
    Phase,
};
use crate::creatures::Creature;
use crate::items::{Item, ItemResolver, ItemRole, ItemTarget};
use crate::rules::BattleEngine;
use crate::stats::best_attack;
use crate::synergy::check_field_synergies;

use super::analysis::{analyze, item_damage, BattleAnalysis, ItemCombo};
use super::context::{creature_power, PlanContext};
use super::fallback::fallback_action;
use super::lethal::find_lethal;
use super::strategy::{choose_strategy, Stance, Strategy};

/// Energy a side needs before it will consider batching.
pub const BATCH_MIN_ENERGY: i32 = 6;

/// Health fraction below which a creature braces as low-priority setup.
const PRECAUTION_THRESHOLD: f64 = 0.6;

/// What the planner wants the side to do next.
#[derive(Clone, Debug, PartialEq)]
pub enum AiDecision {
    Single(Action),
    Batch(ActionBatch),
    EndTurn,
}

impl AiDecision {
    /// The planned actions, in order. Empty for `EndTurn`.
    #[must_use]
    pub fn actions(&self) -> &[Action] {
        match self {
            AiDecision::Single(action) => std::slice::from_ref(action),
            AiDecision::Batch(batch) => batch,
            AiDecision::EndTurn => &[],
        }
    }
}

/// A decision together with the reasoning that produced it.
#[derive(Clone, Debug, PartialEq)]
pub struct AiPlan {
    pub decision: AiDecision,
    pub strategy: Strategy,
    pub stance: Stance,
}

/// A policy that picks the next move for the active side.
pub trait TurnPolicy {
    /// Choose what the active side of `state` does next.
    fn decide<R: ItemResolver>(
        &mut self,
        engine: &BattleEngine<R>,
        state: &BattleState,
    ) -> AiDecision;

    /// Most actions the policy may take in one turn.
    fn action_limit(&self) -> usize;

    /// Presentation mood after the last decision.
    fn stance(&self) -> Stance {
        Stance::Balanced
    }
}

/// Energy, actors and items already spoken for this turn.
#[derive(Debug)]
struct Budget {
    energy: i32,
    limit: usize,
    capacity: usize,
    field_size: usize,
    actions: ActionBatch,
    committed: FxHashSet<CreatureId>,
    used_items: FxHashSet<ItemId>,
    deployed: SmallVec<[CreatureId; 4]>,
    /// Estimated damage already queued against each enemy.
    pending: FxHashMap<CreatureId, i32>,
    /// Attacker a buff was spent on; it attacks first.
    focus: Option<CreatureId>,
}

impl Budget {
    /// A budget for the rest of the turn. Creatures that already acted
    /// this turn start out committed.
    fn new(ctx: &PlanContext<'_>, limit: usize) -> Self {
        Self {
            energy: ctx.own.energy,
            limit,
            capacity: ctx.capacity,
            field_size: ctx.own.field.len(),
            actions: ActionBatch::new(),
            committed: ctx.acted.iter().copied().collect(),
            used_items: FxHashSet::default(),
            deployed: SmallVec::new(),
            pending: FxHashMap::default(),
            focus: None,
        }
    }

    fn is_full(&self) -> bool {
        self.actions.len() >= self.limit
    }

    fn is_free(&self, id: CreatureId) -> bool {
        !self.committed.contains(&id)
    }

    fn remaining(&self, target: &Creature) -> i32 {
        target.current_health() - self.pending.get(&target.id).copied().unwrap_or(0)
    }

    fn add_pending(&mut self, target: CreatureId, damage: i32) {
        *self.pending.entry(target).or_insert(0) += damage;
    }

    fn cost(ctx: &PlanContext<'_>, action: &Action) -> Option<i32> {
        match action {
            Action::Deploy { creature } => {
                ctx.own.hand_creature(*creature).map(|c| c.deploy_cost())
            }
            Action::Attack { .. } => Some(ctx.config.attack_cost),
            Action::Defend { .. } => Some(ctx.config.defend_cost),
            Action::UseTool { tool: id, .. } | Action::UseSpell { spell: id, .. } => {
                ctx.own.item(*id).map(Item::energy_cost)
            }
            Action::EndTurn => None,
        }
    }

    /// Commit `action` if it fits; returns whether it was taken.
    fn commit(&mut self, ctx: &PlanContext<'_>, action: Action) -> bool {
        let Some(cost) = Self::cost(ctx, &action) else {
            return false;
        };
        if self.is_full() || cost > self.energy {
            return false;
        }
        if action.is_exclusive() && action.actor().is_some_and(|id| !self.is_free(id)) {
            return false;
        }
        if action.item().is_some_and(|id| self.used_items.contains(&id)) {
            return false;
        }
        if let Action::Deploy { creature } = &action {
            if self.field_size >= self.capacity || self.deployed.contains(creature) {
                return false;
            }
            self.deployed.push(*creature);
            self.field_size += 1;
        }

        if action.is_exclusive() {
            if let Some(id) = action.actor() {
                self.committed.insert(id);
            }
        }
        if let Some(id) = action.item() {
            self.used_items.insert(id);
        }
        self.energy -= cost;
        self.actions.push(action);
        true
    }
}

/// Field size the side deploys toward.
///
/// One more than the enemy field, at least two, at most capacity. Synergy
/// and defensive strategies fill the field.
#[must_use]
pub fn optimal_field_size(ctx: &PlanContext<'_>, strategy: Strategy) -> usize {
    match strategy {
        Strategy::SynergyFocus | Strategy::DefensiveSetup => ctx.capacity,
        _ => (ctx.enemies().count() + 1).max(2).min(ctx.capacity),
    }
}

/// Difficulty-driven planner with its own RNG stream.
///
/// The planner's noise never draws from the battle RNG, so planning does
/// not change how the battle itself rolls.
#[derive(Clone, Debug)]
pub struct AiPlanner {
    knobs: DifficultyConfig,
    rng: GameRng,
    stance: Stance,
}

impl AiPlanner {
    pub fn new(knobs: DifficultyConfig, seed: u64) -> Self {
        Self {
            knobs,
            rng: GameRng::new(seed).for_context("planner"),
            stance: Stance::Balanced,
        }
    }

    /// Planner with the engine's AI-side knobs.
    pub fn for_engine<R: ItemResolver>(engine: &BattleEngine<R>, seed: u64) -> Self {
        Self::new(engine.difficulty().clone(), seed)
    }

    pub fn knobs(&self) -> &DifficultyConfig {
        &self.knobs
    }

    /// Plan the active side's next move.
    pub fn plan<R: ItemResolver>(
        &mut self,
        engine: &BattleEngine<R>,
        state: &BattleState,
    ) -> AiPlan {
        if state.phase != Phase::Battle {
            return AiPlan {
                decision: AiDecision::EndTurn,
                strategy: Strategy::ResourceEfficiency,
                stance: Stance::Balanced,
            };
        }

        let knobs = self.knobs.clone();
        let ctx = PlanContext::new(engine, state, &knobs);
        let analysis = analyze(&ctx);
        let strategy = choose_strategy(&ctx, &analysis);
        let stance = Stance::from_strategy(strategy, &analysis);
        let batching = self.rng.gen_bool(knobs.multi_action_probability)
            && ctx.own.energy >= BATCH_MIN_ENERGY
            && strategy.wants_batch();

        let limit = knobs.max_batch_actions.max(1).saturating_sub(ctx.taken);
        if limit == 0 {
            debug!(side = %ctx.side, taken = ctx.taken, "action limit reached");
            self.stance = stance;
            return AiPlan {
                decision: AiDecision::EndTurn,
                strategy,
                stance,
            };
        }
        let mut budget = Budget::new(&ctx, limit);
        if knobs.tier == Difficulty::Expert {
            if let Some(line) = find_lethal(&ctx, &analysis) {
                for action in line.actions {
                    budget.commit(&ctx, action);
                }
            }
        }
        Self::emergency_defense(&ctx, &analysis, &mut budget);
        Self::item_combo(&ctx, &analysis, &mut budget);
        self.deploy(&ctx, &analysis, strategy, &mut budget);
        Self::pre_attack_buffs(&ctx, &analysis, strategy, &mut budget);
        Self::lethal_spells(&ctx, &analysis, &mut budget);
        self.attacks(&ctx, &analysis, strategy, &mut budget);
        Self::setup(&ctx, strategy, &mut budget);

        let decision = if budget.actions.is_empty() {
            match fallback_action(engine, state, &ctx, &analysis, &mut self.rng) {
                Some(action) => AiDecision::Single(action),
                None => AiDecision::EndTurn,
            }
        } else if batching && budget.actions.len() > 1 {
            AiDecision::Batch(budget.actions)
        } else {
            AiDecision::Single(budget.actions[0].clone())
        };

        debug!(
            side = %ctx.side,
            tier = %knobs.tier,
            %strategy,
            %stance,
            batching,
            planned = decision.actions().len(),
            "planned turn"
        );
        self.stance = stance;
        AiPlan {
            decision,
            strategy,
            stance,
        }
    }

    /// Ready creatures plus those deployed earlier in the plan, minus the
    /// committed ones.
    fn actors<'a>(ctx: &PlanContext<'a>, budget: &Budget) -> Vec<&'a Creature> {
        let deployed = budget.deployed.iter().filter_map(|id| ctx.own.hand_creature(*id));
        ctx.ready_creatures()
            .chain(deployed)
            .filter(|c| budget.is_free(c.id))
            .collect()
    }

    /// Build and commit an item use. Spells are cast by the weakest free
    /// creature other than `spare`.
    fn use_item(
        ctx: &PlanContext<'_>,
        budget: &mut Budget,
        item: &Item,
        target: Option<CreatureId>,
        spare: Option<CreatureId>,
    ) -> bool {
        let action = if item.is_spell() {
            let caster = Self::actors(ctx, budget)
                .into_iter()
                .filter(|c| Some(c.id) != spare)
                .min_by_key(|c| c.stats().total_attack());
            let Some(caster) = caster else {
                return false;
            };
            Action::UseSpell {
                spell: item.id,
                caster: caster.id,
                target,
            }
        } else {
            Action::UseTool {
                tool: item.id,
                target,
            }
        };
        let caster = match &action {
            Action::UseSpell { caster, .. } => ctx
                .own
                .field_creature(*caster)
                .or_else(|| ctx.own.hand_creature(*caster)),
            _ => None,
        };
        if !budget.commit(ctx, action) {
            return false;
        }

        let struck: SmallVec<[&Creature; 4]> = match item.targeting {
            ItemTarget::Enemy => target.and_then(|id| ctx.enemy_creature(id)).into_iter().collect(),
            ItemTarget::AllEnemies => ctx.enemies().collect(),
            ItemTarget::Ally | ItemTarget::AllAllies => SmallVec::new(),
        };
        for victim in struck {
            budget.add_pending(victim.id, item_damage(ctx, item, caster, victim));
        }
        true
    }

    fn emergency_defense(ctx: &PlanContext<'_>, analysis: &BattleAnalysis, budget: &mut Budget) {
        for id in &analysis.critical {
            let Some(creature) = ctx.own_creature(*id) else {
                continue;
            };
            if creature.is_defending || creature.is_incapacitated() {
                continue;
            }
            budget.commit(ctx, Action::Defend { creature: *id });
        }
    }

    fn item_combo(ctx: &PlanContext<'_>, analysis: &BattleAnalysis, budget: &mut Budget) {
        let Some(combo) = analysis.combos.first() else {
            return;
        };
        match combo {
            ItemCombo::EmergencyShield { item, target } => {
                if let Some(item) = ctx.own.item(*item) {
                    Self::use_item(ctx, budget, item, Some(*target), None);
                }
            }
            ItemCombo::BuffThenAttack { item, attacker } => {
                let Some(item) = ctx.own.item(*item) else {
                    return;
                };
                let target = (item.targeting == ItemTarget::Ally).then_some(*attacker);
                if Self::use_item(ctx, budget, item, target, Some(*attacker)) {
                    budget.focus = Some(*attacker);
                }
            }
            ItemCombo::MultiSpell { spells } => {
                for spell in spells.iter().filter_map(|id| ctx.own.item(*id)) {
                    let target = analysis
                        .targets
                        .iter()
                        .filter_map(|t| ctx.enemy_creature(t.id))
                        .find(|t| budget.remaining(t) > 0);
                    let Some(target) = target else {
                        break;
                    };
                    let aim = (spell.targeting == ItemTarget::Enemy).then_some(target.id);
                    Self::use_item(ctx, budget, spell, aim, None);
                }
            }
        }
    }

    /// Deployment value: power per energy, plus a bonus for new synergies.
    fn deploy_value(
        ctx: &PlanContext<'_>,
        fielded: &[&Creature],
        synergies: usize,
        strategy: Strategy,
        candidate: &Creature,
    ) -> f64 {
        let mut value =
            f64::from(creature_power(candidate)) / f64::from(candidate.deploy_cost().max(1));
        let with = fielded.iter().copied().chain(std::iter::once(candidate));
        if check_field_synergies(with, ctx.capacity).len() > synergies {
            value += if strategy == Strategy::SynergyFocus { 100.0 } else { 5.0 };
        }
        value
    }

    fn deploy(
        &mut self,
        ctx: &PlanContext<'_>,
        analysis: &BattleAnalysis,
        strategy: Strategy,
        budget: &mut Budget,
    ) {
        let goal = optimal_field_size(ctx, strategy);
        // Keep one attack's worth of energy when going all-in with targets up.
        let reserve = if strategy == Strategy::MaximumAggression && !analysis.targets.is_empty() {
            ctx.config.attack_cost
        } else {
            0
        };

        while budget.field_size < goal && !budget.is_full() {
            let candidates: SmallVec<[&Creature; 8]> = ctx
                .own
                .hand
                .iter()
                .filter(|c| !budget.deployed.contains(&c.id))
                .filter(|c| c.deploy_cost() + reserve <= budget.energy)
                .collect();
            if candidates.is_empty() {
                break;
            }

            let pick = if self.rng.gen_bool(ctx.knobs.suboptimal_deploy_chance) {
                candidates[self.rng.gen_range_usize(0..candidates.len())]
            } else {
                let fielded: Vec<&Creature> = ctx
                    .own
                    .living()
                    .chain(budget.deployed.iter().filter_map(|id| ctx.own.hand_creature(*id)))
                    .collect();
                let synergies = check_field_synergies(fielded.iter().copied(), ctx.capacity).len();
                let mut best = candidates[0];
                let mut best_value =
                    Self::deploy_value(ctx, &fielded, synergies, strategy, candidates[0]);
                for &candidate in &candidates[1..] {
                    let value = Self::deploy_value(ctx, &fielded, synergies, strategy, candidate);
                    if value > best_value {
                        best = candidate;
                        best_value = value;
                    }
                }
                best
            };

            if !budget.commit(ctx, Action::Deploy { creature: pick.id }) {
                break;
            }
        }
    }

    fn pre_attack_buffs(
        ctx: &PlanContext<'_>,
        analysis: &BattleAnalysis,
        strategy: Strategy,
        budget: &mut Budget,
    ) {
        let eager = strategy.focuses_fire() || ctx.knobs.tier == Difficulty::Expert;
        if !eager || analysis.targets.is_empty() || budget.focus.is_some() {
            return;
        }
        let buff = ctx.items().find(|i| {
            i.role() == ItemRole::Empower
                && matches!(i.targeting, ItemTarget::Ally | ItemTarget::AllAllies)
                && !budget.used_items.contains(&i.id)
                && i.energy_cost() + ctx.config.attack_cost <= budget.energy
        });
        let Some(item) = buff else {
            return;
        };
        let attacker = ctx
            .ready_creatures()
            .filter(|c| budget.is_free(c.id))
            .max_by_key(|c| c.stats().total_attack());
        let Some(attacker) = attacker else {
            return;
        };
        let target = (item.targeting == ItemTarget::Ally).then_some(attacker.id);
        if Self::use_item(ctx, budget, item, target, Some(attacker.id)) {
            budget.focus = Some(attacker.id);
        }
    }

    /// Cast a damage spell wherever one alone finishes a target.
    fn lethal_spells(ctx: &PlanContext<'_>, analysis: &BattleAnalysis, budget: &mut Budget) {
        let spare = budget.focus;
        for ranked in &analysis.targets {
            let Some(target) = ctx.enemy_creature(ranked.id) else {
                continue;
            };
            let remaining = budget.remaining(target);
            if remaining <= 0 {
                continue;
            }
            let Some(caster) = Self::actors(ctx, budget)
                .into_iter()
                .filter(|c| Some(c.id) != spare)
                .min_by_key(|c| c.stats().total_attack())
            else {
                return;
            };
            let finisher = ctx.own.spells.iter().find(|s| {
                s.targeting == ItemTarget::Enemy
                    && s.role() == ItemRole::Offense
                    && !budget.used_items.contains(&s.id)
                    && s.cost <= budget.energy
                    && item_damage(ctx, s, Some(caster), target) >= remaining
            });
            if let Some(spell) = finisher {
                Self::use_item(ctx, budget, spell, Some(target.id), spare);
            }
        }
    }

    fn pick_target<'a>(
        &mut self,
        ctx: &PlanContext<'a>,
        strategy: Strategy,
        budget: &Budget,
        live: &[&'a Creature],
        attacker: &Creature,
    ) -> &'a Creature {
        if self.rng.gen_bool(ctx.knobs.random_target_chance) {
            return live[self.rng.gen_range_usize(0..live.len())];
        }
        if strategy.focuses_fire() || ctx.knobs.tier == Difficulty::Expert {
            // Finish something if possible, else pile onto the top target.
            return live
                .iter()
                .copied()
                .find(|t| best_attack(attacker, t).1 >= budget.remaining(t))
                .unwrap_or(live[0]);
        }
        // Spread out: least damage already queued, best hit breaks ties.
        live.iter()
            .copied()
            .min_by_key(|t| {
                let queued = budget.pending.get(&t.id).copied().unwrap_or(0);
                (queued, std::cmp::Reverse(best_attack(attacker, t).1))
            })
            .unwrap_or(live[0])
    }

    fn attacks(
        &mut self,
        ctx: &PlanContext<'_>,
        analysis: &BattleAnalysis,
        strategy: Strategy,
        budget: &mut Budget,
    ) {
        let mut attackers = Self::actors(ctx, budget);
        attackers.sort_by_key(|c| {
            (Some(c.id) != budget.focus, std::cmp::Reverse(c.stats().total_attack()))
        });
        let mut swings = 0;

        for attacker in attackers {
            if budget.is_full() || budget.energy < ctx.config.attack_cost {
                break;
            }
            let live: SmallVec<[&Creature; 4]> = analysis
                .targets
                .iter()
                .filter_map(|t| ctx.enemy_creature(t.id))
                .filter(|t| budget.remaining(t) > 0)
                .collect();
            if live.is_empty() {
                break;
            }

            let target = self.pick_target(ctx, strategy, budget, &live, attacker);
            let (kind, damage) = best_attack(attacker, target);
            let finishes = damage >= budget.remaining(target);
            if strategy == Strategy::ResourceEfficiency && swings > 0 && !finishes {
                continue;
            }
            let action = Action::Attack {
                attacker: attacker.id,
                target: target.id,
                kind,
            };
            if budget.commit(ctx, action) {
                budget.add_pending(target.id, damage);
                swings += 1;
            }
        }
    }

    fn setup(ctx: &PlanContext<'_>, strategy: Strategy, budget: &mut Budget) {
        for tool in ctx.own.tools.iter() {
            if budget.used_items.contains(&tool.id) {
                continue;
            }
            let target = match tool.role() {
                ItemRole::Recovery => ctx
                    .own
                    .living()
                    .filter(|c| c.health_fraction() < 1.0)
                    .min_by(|a, b| a.health_fraction().total_cmp(&b.health_fraction())),
                ItemRole::Empower => ctx.ready_creatures().max_by_key(|c| c.stats().total_attack()),
                _ => continue,
            };
            let Some(target) = target else {
                continue;
            };
            let aim = (tool.targeting == ItemTarget::Ally).then_some(target.id);
            Self::use_item(ctx, budget, tool, aim, None);
        }

        let wary = strategy == Strategy::DefensiveSetup;
        let bracing: SmallVec<[CreatureId; 4]> = ctx
            .ready_creatures()
            .filter(|c| !c.is_defending && budget.is_free(c.id))
            .filter(|c| wary || c.health_fraction() < PRECAUTION_THRESHOLD)
            .map(|c| c.id)
            .collect();
        for id in bracing {
            budget.commit(ctx, Action::Defend { creature: id });
        }
    }
}

impl TurnPolicy for AiPlanner {
    fn decide<R: ItemResolver>(
        &mut self,
        engine: &BattleEngine<R>,
        state: &BattleState,
    ) -> AiDecision {
        self.plan(engine, state).decision
    }

    fn action_limit(&self) -> usize {
        self.knobs.max_batch_actions.max(1)
    }

    fn stance(&self) -> Stance {
        self.stance
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Side;
    use crate::rules::fixtures::{battle, engine, second_turn};

    fn planner(tier: Difficulty) -> AiPlanner {
        AiPlanner::new(
            DifficultyConfig::for_tier(tier)
                .with_multi_action_probability(1.0)
                .with_noise(0.0, 0.0),
            9,
        )
    }

    /// Apply every planned action in order, asserting none is rejected.
    fn apply_in_order(engine: &BattleEngine, state: &BattleState, actions: &[Action]) {
        let mut state = state.clone();
        for action in actions {
            state = engine
                .try_apply(&state, action)
                .unwrap_or_else(|e| panic!("{action} rejected: {e}"));
        }
    }

    #[test]
    fn test_opening_turn_deploys() {
        let engine = engine();
        let state = battle(&engine);
        let plan = planner(Difficulty::Hard).plan(&engine, &state);

        let actions = plan.decision.actions();
        assert!(!actions.is_empty());
        assert!(actions.iter().all(|a| matches!(a, Action::Deploy { .. })));
        apply_in_order(&engine, &state, actions);
    }

    #[test]
    fn test_batch_fits_energy_and_cap() {
        let engine = engine();
        let state = second_turn(&engine);

        for tier in Difficulty::ALL {
            let mut planner = planner(tier);
            let plan = planner.plan(&engine, &state);
            let actions = plan.decision.actions();
            assert!(actions.len() <= planner.action_limit(), "{tier}");
            apply_in_order(&engine, &state, actions);
        }
    }

    #[test]
    fn test_no_actor_acts_twice() {
        let engine = engine();
        let mut state = second_turn(&engine);
        state.side_mut(Side::Player).energy = 25;

        let plan = planner(Difficulty::Expert).plan(&engine, &state);
        let mut seen = FxHashSet::default();
        for action in plan.decision.actions().iter().filter(|a| a.is_exclusive()) {
            let actor = action.actor().unwrap();
            assert!(seen.insert(actor), "{actor} acts twice");
        }
    }

    #[test]
    fn test_creature_that_acted_is_not_planned_again() {
        let engine = engine();
        let state = second_turn(&engine);
        let strike = Action::Attack {
            attacker: CreatureId(1),
            target: CreatureId(11),
            kind: crate::stats::AttackKind::Physical,
        };
        let mut state = engine.try_apply(&state, &strike).unwrap();
        state.side_mut(Side::Player).energy = 25;

        for tier in Difficulty::ALL {
            let plan = planner(tier).plan(&engine, &state);
            for action in plan.decision.actions() {
                assert!(
                    !(action.is_exclusive() && action.actor() == Some(CreatureId(1))),
                    "{tier}: {action}"
                );
            }
            apply_in_order(&engine, &state, plan.decision.actions());
        }
    }

    #[test]
    fn test_action_limit_counts_earlier_actions() {
        let engine = engine();
        let mut state = second_turn(&engine);
        let knobs = DifficultyConfig::for_tier(Difficulty::Easy);
        state.side_mut(Side::Player).energy = 25;
        for _ in 0..knobs.max_batch_actions {
            state.record(Side::Player, Action::Defend { creature: CreatureId(1) });
        }

        let plan = AiPlanner::new(knobs, 2).plan(&engine, &state);
        assert_eq!(plan.decision, AiDecision::EndTurn);
    }

    #[test]
    fn test_critical_creature_braces_first() {
        let engine = engine();
        let mut state = second_turn(&engine);
        state.side_mut(Side::Player).field[0].set_health(10);

        let plan = planner(Difficulty::Medium).plan(&engine, &state);
        assert_eq!(plan.strategy, Strategy::DefensiveSetup);
        assert_eq!(plan.stance, Stance::Defensive);
        assert_eq!(
            plan.decision.actions()[0],
            Action::Defend {
                creature: CreatureId(1)
            }
        );
    }

    #[test]
    fn test_finishing_blow_targets_wounded() {
        let engine = engine();
        let mut state = second_turn(&engine);
        state.side_mut(Side::Opponent).field[0].set_health(5);
        state.side_mut(Side::Player).spells.clear();

        let plan = planner(Difficulty::Hard).plan(&engine, &state);
        assert!(plan.decision.actions().iter().any(|a| matches!(
            a,
            Action::Attack {
                attacker: CreatureId(1),
                target: CreatureId(11),
                ..
            }
        )));
    }

    #[test]
    fn test_no_energy_ends_turn() {
        let engine = engine();
        let mut state = second_turn(&engine);
        state.side_mut(Side::Player).energy = 0;

        let plan = planner(Difficulty::Easy).plan(&engine, &state);
        assert_eq!(plan.decision, AiDecision::EndTurn);
    }

    #[test]
    fn test_single_when_batching_disabled() {
        let engine = engine();
        let state = second_turn(&engine);
        let knobs = DifficultyConfig::for_tier(Difficulty::Hard).with_multi_action_probability(0.0);
        let plan = AiPlanner::new(knobs, 9).plan(&engine, &state);
        assert!(matches!(plan.decision, AiDecision::Single(_)));
    }

    #[test]
    fn test_same_seed_same_plan() {
        let engine = engine();
        let state = second_turn(&engine);
        let knobs = DifficultyConfig::for_tier(Difficulty::Easy);

        let a = AiPlanner::new(knobs.clone(), 3).plan(&engine, &state);
        let b = AiPlanner::new(knobs, 3).plan(&engine, &state);
        assert_eq!(a, b);
    }

    #[test]
    fn test_not_in_battle_ends_turn() {
        let engine = engine();
        let state = BattleState::new(1, Difficulty::Easy);
        let plan = planner(Difficulty::Easy).plan(&engine, &state);
        assert_eq!(plan.decision, AiDecision::EndTurn);
    }
}
