//! The planner's read-only view of a battle.
//!
//! A `PlanContext` borrows the acting side, the opponent's field, the rule
//! constants and the engine's item resolver. Nothing reachable from it is
//! mutable; item previews resolve against copies.

use smallvec::SmallVec;

use crate::core::{
    BattleConfig, BattleState, CreatureId, Difficulty, DifficultyConfig, Side, SideState,
};
use crate::creatures::Creature;
use crate::items::{Item, ItemRequest, ItemResolver};
use crate::rules::BattleEngine;

/// Read-only snapshot handed to every scoring helper.
#[derive(Clone)]
pub struct PlanContext<'a> {
    /// The side being planned for.
    pub side: Side,
    pub own: &'a SideState,
    pub enemy: &'a SideState,
    pub turn: u32,
    pub config: &'a BattleConfig,
    /// Knobs of the planner's tier.
    pub knobs: &'a DifficultyConfig,
    /// Field capacity of the acting side.
    pub capacity: usize,
    pub difficulty: Difficulty,
    /// Own creatures already spent on an attack, defend or cast this turn.
    pub acted: SmallVec<[CreatureId; 4]>,
    /// Actions already taken this turn.
    pub taken: usize,
    pub resolver: &'a dyn ItemResolver,
}

impl std::fmt::Debug for PlanContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlanContext")
            .field("side", &self.side)
            .field("turn", &self.turn)
            .field("capacity", &self.capacity)
            .field("acted", &self.acted)
            .field("taken", &self.taken)
            .finish_non_exhaustive()
    }
}

impl<'a> PlanContext<'a> {
    /// View of `state` for its active side.
    pub fn new<R: ItemResolver>(
        engine: &'a BattleEngine<R>,
        state: &'a BattleState,
        knobs: &'a DifficultyConfig,
    ) -> Self {
        let side = state.active;
        Self {
            side,
            own: state.side(side),
            enemy: state.side(side.opponent()),
            turn: state.turn,
            config: engine.config(),
            knobs,
            capacity: engine.max_field_size(side),
            difficulty: state.difficulty,
            acted: state.acted_this_turn(),
            taken: state.this_turn().count(),
            resolver: engine.resolver(),
        }
    }

    /// Own field creatures that can still act this turn.
    pub fn ready_creatures(&self) -> impl Iterator<Item = &'a Creature> + '_ {
        let acted = &self.acted;
        self.own
            .living()
            .filter(move |c| !c.is_incapacitated() && !acted.contains(&c.id))
    }

    /// Living enemy field creatures.
    pub fn enemies(&self) -> impl Iterator<Item = &'a Creature> {
        self.enemy.living()
    }

    pub fn own_creature(&self, id: CreatureId) -> Option<&'a Creature> {
        self.own.field_creature(id)
    }

    pub fn enemy_creature(&self, id: CreatureId) -> Option<&'a Creature> {
        self.enemy.field_creature(id)
    }

    /// Tools and spells still in hand, tools first.
    pub fn items(&self) -> impl Iterator<Item = &'a Item> {
        self.own.tools.iter().chain(self.own.spells.iter())
    }

    /// Free field slots.
    #[must_use]
    pub fn open_slots(&self) -> usize {
        self.capacity.saturating_sub(self.own.living().count())
    }

    /// `target` as the resolver would leave it after `item` lands on it.
    #[must_use]
    pub fn preview_item(
        &self,
        item: &Item,
        caster: Option<&Creature>,
        target: &Creature,
    ) -> Creature {
        let targets = [target.clone()];
        let outcome = self.resolver.resolve(&ItemRequest {
            item,
            caster,
            targets: &targets,
            difficulty: self.difficulty,
            turn: self.turn,
        });
        outcome
            .updated
            .into_iter()
            .find(|c| c.id == target.id)
            .unwrap_or_else(|| target.clone())
    }

    /// Own power over enemy power; `f64::MAX` with no enemy on the field.
    #[must_use]
    pub fn strength_ratio(&self) -> f64 {
        let enemy: i32 = self.enemies().map(creature_power).sum();
        if enemy == 0 {
            return f64::MAX;
        }
        let own: i32 = self.own.living().map(creature_power).sum();
        f64::from(own) / f64::from(enemy)
    }
}

/// Rough fighting strength: best attack plus a share of defenses and health.
#[must_use]
pub fn creature_power(creature: &Creature) -> i32 {
    let stats = creature.stats();
    stats.physical_attack.max(stats.magical_attack)
        + (stats.physical_defense + stats.magical_defense) / 4
        + creature.current_health() / 5
}
