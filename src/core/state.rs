//! Battle state.
//!
//! ## SideState
//!
//! Everything one side owns:
//! - Deck (draw queue, front is drawn first), hand and field
//! - Energy pool, momentum and the consecutive-action counter
//! - Tool and spell inventories
//! - The synergy set currently applied to its field
//!
//! ## BattleState
//!
//! Both sides plus turn bookkeeping, the battle log, the last-action
//! descriptor for presentation, action history and the battle RNG.
//!
//! Collections use `im` persistent structures so the engine can clone a
//! state per transition cheaply and never mutate its input.

use im::Vector;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::action::{Action, ActionRecord};
use super::config::Difficulty;
use super::entity::{CreatureId, ItemId};
use super::rng::GameRng;
use super::side::{Side, SideMap};
use crate::creatures::{Creature, StatKind};
use crate::items::Item;
use crate::stats::DamageType;
use crate::synergy::Synergy;

/// Coarse battle phase.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    #[default]
    Setup,
    TeamSelect,
    Battle,
    /// The AI side has lost.
    Victory,
    /// The player side has lost.
    Defeat,
}

impl Phase {
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Phase::Victory | Phase::Defeat)
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Phase::Setup => "setup",
            Phase::TeamSelect => "team-select",
            Phase::Battle => "battle",
            Phase::Victory => "victory",
            Phase::Defeat => "defeat",
        };
        f.write_str(name)
    }
}

/// One plain-text battle log line.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub turn: u32,
    /// Side that caused the event; `None` for system events.
    pub side: Option<Side>,
    pub message: String,
}

impl std::fmt::Display for LogEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.side {
            Some(side) => write!(f, "[turn {}] {}: {}", self.turn, side, self.message),
            None => write!(f, "[turn {}] {}", self.turn, self.message),
        }
    }
}

/// Outcome of the most recent action, enough to drive presentation.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LastAction {
    pub attacker_id: Option<CreatureId>,
    pub target_id: Option<CreatureId>,
    pub damage: i32,
    pub is_critical: bool,
    pub is_blocked: bool,
    #[serde(default)]
    pub is_dodged: bool,
    pub damage_type: DamageType,
}

/// State owned by one side.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SideState {
    /// Draw queue; the front is drawn first.
    pub deck: Vector<Creature>,
    pub hand: Vector<Creature>,
    pub field: Vector<Creature>,
    /// Always within `[0, max_energy]`.
    pub energy: i32,
    /// Actions taken in the current turn.
    pub consecutive_actions: u32,
    /// Energy spent since the last regeneration.
    pub momentum: i32,
    pub tools: Vector<Item>,
    pub spells: Vector<Item>,
    /// Synergies currently applied to the field.
    pub synergies: Vec<Synergy>,
    /// Whether the combo buff was granted this turn.
    pub combo_granted: bool,
}

impl SideState {
    /// Position of a living field creature.
    #[must_use]
    pub fn field_index(&self, id: CreatureId) -> Option<usize> {
        self.field.iter().position(|c| c.id == id && c.is_alive())
    }

    /// A living field creature.
    #[must_use]
    pub fn field_creature(&self, id: CreatureId) -> Option<&Creature> {
        self.field.iter().find(|c| c.id == id && c.is_alive())
    }

    #[must_use]
    pub fn hand_index(&self, id: CreatureId) -> Option<usize> {
        self.hand.iter().position(|c| c.id == id)
    }

    #[must_use]
    pub fn hand_creature(&self, id: CreatureId) -> Option<&Creature> {
        self.hand.iter().find(|c| c.id == id)
    }

    /// A tool or spell by id.
    #[must_use]
    pub fn item(&self, id: ItemId) -> Option<&Item> {
        self.tools.iter().chain(self.spells.iter()).find(|i| i.id == id)
    }

    /// Remove an item from whichever inventory holds it.
    pub fn take_item(&mut self, id: ItemId) -> Option<Item> {
        if let Some(pos) = self.tools.iter().position(|i| i.id == id) {
            return Some(self.tools.remove(pos));
        }
        let pos = self.spells.iter().position(|i| i.id == id)?;
        Some(self.spells.remove(pos))
    }

    /// Living creatures on the field.
    pub fn living(&self) -> impl Iterator<Item = &Creature> {
        self.field.iter().filter(|c| c.is_alive())
    }

    /// Sum of the energy base stat across living field creatures.
    #[must_use]
    pub fn fielded_energy_stat(&self) -> i32 {
        self.living().map(|c| c.base_stats.sanitized().get(StatKind::Energy)).sum()
    }

    /// A side with nothing left to fight with has lost.
    #[must_use]
    pub fn is_defeated(&self) -> bool {
        self.deck.is_empty() && self.hand.is_empty() && self.living().next().is_none()
    }

    /// Creatures remaining across deck, hand and field.
    #[must_use]
    pub fn creatures_remaining(&self) -> usize {
        self.deck.len() + self.hand.len() + self.living().count()
    }
}

/// Complete battle state.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BattleState {
    pub sides: SideMap<SideState>,

    /// Completed cycles + 1. Increments when the opponent side ends its turn.
    pub turn: u32,

    /// Side whose turn it is.
    pub active: Side,

    pub phase: Phase,

    /// Tier of the AI side.
    pub difficulty: Difficulty,

    /// Append-only battle log.
    pub log: Vector<LogEntry>,

    pub last_action: Option<LastAction>,

    /// Every applied action, in order.
    pub history: Vector<ActionRecord>,

    /// Sequence number of the next action within the current turn.
    pub action_sequence: u32,

    /// Battle RNG; every roll in `apply` draws from here.
    pub rng: GameRng,
}

impl BattleState {
    /// An empty battle in the setup phase.
    #[must_use]
    pub fn new(seed: u64, difficulty: Difficulty) -> Self {
        Self {
            sides: SideMap::default(),
            turn: 1,
            active: Side::Player,
            phase: Phase::Setup,
            difficulty,
            log: Vector::new(),
            last_action: None,
            history: Vector::new(),
            action_sequence: 0,
            rng: GameRng::new(seed),
        }
    }

    #[must_use]
    pub fn side(&self, side: Side) -> &SideState {
        &self.sides[side]
    }

    pub fn side_mut(&mut self, side: Side) -> &mut SideState {
        &mut self.sides[side]
    }

    /// The side whose turn it is.
    #[must_use]
    pub fn active_side(&self) -> &SideState {
        &self.sides[self.active]
    }

    #[must_use]
    pub fn is_over(&self) -> bool {
        self.phase.is_terminal()
    }

    /// The side that won, once the battle is over.
    #[must_use]
    pub fn winner(&self) -> Option<Side> {
        match self.phase {
            Phase::Victory => Some(Side::Player),
            Phase::Defeat => Some(Side::Opponent),
            _ => None,
        }
    }

    /// Actions the active side has taken so far this turn, latest first.
    pub fn this_turn(&self) -> impl Iterator<Item = &ActionRecord> {
        self.history.iter().rev().take_while(move |r| {
            r.side == self.active && r.turn == self.turn && r.action != Action::EndTurn
        })
    }

    /// Creatures of the active side that already attacked, defended or
    /// cast this turn.
    #[must_use]
    pub fn acted_this_turn(&self) -> SmallVec<[CreatureId; 4]> {
        self.this_turn()
            .filter(|r| r.action.is_exclusive())
            .filter_map(|r| r.action.actor())
            .collect()
    }

    /// Append a log line for the current turn.
    pub fn push_log(&mut self, side: Option<Side>, message: impl Into<String>) {
        self.log.push_back(LogEntry {
            turn: self.turn,
            side,
            message: message.into(),
        });
    }

    /// Record an applied action.
    pub fn record(&mut self, side: Side, action: Action) {
        self.history
            .push_back(ActionRecord::new(side, action, self.turn, self.action_sequence));
        self.action_sequence += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::creatures::{BaseStats, Rarity};
    use crate::items::{ItemEffect, ItemTarget};
    use crate::stats::AttackKind;

    fn creature(id: u32) -> Creature {
        Creature::new(CreatureId(id), "Voltkit", Rarity::Common, 0, BaseStats::new(9, 3, 5, 4, 5))
    }

    #[test]
    fn test_new_battle() {
        let state = BattleState::new(1, Difficulty::Hard);
        assert_eq!(state.phase, Phase::Setup);
        assert_eq!(state.turn, 1);
        assert_eq!(state.active, Side::Player);
        assert!(state.winner().is_none());
    }

    #[test]
    fn test_defeat_requires_everything_gone() {
        let mut side = SideState::default();
        assert!(side.is_defeated());

        side.deck.push_back(creature(1));
        assert!(!side.is_defeated());

        side.deck.clear();
        side.field.push_back(creature(2).with_health(0));
        assert!(side.is_defeated());
    }

    #[test]
    fn test_fielded_energy_stat() {
        let mut side = SideState::default();
        side.field.push_back(creature(1));
        side.field.push_back(creature(2));
        assert_eq!(side.fielded_energy_stat(), 18);
    }

    #[test]
    fn test_take_item() {
        let mut side = SideState::default();
        let heal = ItemEffect::Heal { amount: 5 };
        let salve = Item::tool(ItemId(4), "Salve", ItemTarget::Ally, heal);
        side.tools.push_back(salve);

        assert!(side.item(ItemId(4)).is_some());
        assert_eq!(side.take_item(ItemId(4)).map(|i| i.id), Some(ItemId(4)));
        assert!(side.item(ItemId(4)).is_none());
        assert!(side.take_item(ItemId(4)).is_none());
    }

    #[test]
    fn test_log_display() {
        let mut state = BattleState::new(1, Difficulty::Easy);
        state.push_log(Some(Side::Opponent), "Voltkit attacks");
        state.push_log(None, "Battle begins");

        assert_eq!(state.log[0].to_string(), "[turn 1] Opponent: Voltkit attacks");
        assert_eq!(state.log[1].to_string(), "[turn 1] Battle begins");
    }

    #[test]
    fn test_acted_this_turn_stops_at_turn_boundary() {
        let mut state = BattleState::new(1, Difficulty::Easy);
        state.record(Side::Player, Action::Defend { creature: CreatureId(1) });
        state.record(Side::Player, Action::EndTurn);
        state.active = Side::Opponent;
        state.record(Side::Opponent, Action::Deploy { creature: CreatureId(12) });
        state.record(
            Side::Opponent,
            Action::Attack {
                attacker: CreatureId(11),
                target: CreatureId(1),
                kind: AttackKind::Physical,
            },
        );

        assert_eq!(state.this_turn().count(), 2);
        assert_eq!(state.acted_this_turn().as_slice(), &[CreatureId(11)]);
    }

    #[test]
    fn test_state_serialization() {
        let mut state = BattleState::new(3, Difficulty::Medium);
        state.sides[Side::Player].hand.push_back(creature(1));

        let json = serde_json::to_string(&state).unwrap();
        let restored: BattleState = serde_json::from_str(&json).unwrap();

        assert_eq!(state, restored);
    }
}
