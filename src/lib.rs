//! # creature-clash
//!
//! A deterministic, turn-based creature battle engine with a
//! difficulty-tiered AI planner.
//!
//! ## Design Principles
//!
//! 1. **Single Writer**: Only `BattleEngine` produces new battle states.
//!    `apply` takes a state and an action and returns a new state; the
//!    input is never mutated. The planner and synergy code only read.
//!
//! 2. **Invalid Means No-Op**: An illegal or under-resourced action leaves
//!    the state untouched. `try_apply` and `validate` report why.
//!
//! 3. **Replayable**: Every random draw comes from a seeded `GameRng`
//!    carried in the state. Same seed + same actions = same battle.
//!
//! ## Architecture
//!
//! - **Persistent Data Structures**: O(1) cloning via `im-rs`, so every
//!   transition can hand back a fresh state cheaply.
//!
//! - **Derived Stats**: Creature battle stats are derived from base stats,
//!   form, rarity and active synergies, then cached on the creature and
//!   recomputed whenever the field changes.
//!
//! ## Modules
//!
//! - `core`: ids, sides, RNG, configuration, actions, battle state, errors
//! - `creatures`: base attributes, species, effects, creature instances
//! - `stats`: stat derivation, effectiveness, attack resolution
//! - `synergy`: field synergy detection and application
//! - `items`: tools, spells and the item resolver
//! - `rules`: the battle engine
//! - `ai`: the planner and the AI turn runner
//! - `setup`: deck generation and battle construction

pub mod ai;
pub mod core;
pub mod creatures;
pub mod items;
pub mod rules;
pub mod setup;
pub mod stats;
pub mod synergy;

// Re-export commonly used types
pub use crate::core::{
    Action, ActionBatch, ActionError, BattleConfig, BattleState, CreatureId, Difficulty,
    DifficultyConfig, DifficultyProvider, GameRng, ItemId, Phase, SetupError, Side, SideMap,
    StandardDifficulty,
};

pub use crate::creatures::{BaseStats, Creature, Rarity, SpeciesRegistry, StatKind};

pub use crate::stats::{compute_attack, derive_stats, AttackKind, AttackResult, BattleStats};

pub use crate::synergy::check_field_synergies;

pub use crate::items::{Item, ItemEffect, ItemResolver, ItemTarget, StandardItemResolver};

pub use crate::rules::{BatchReport, BattleEngine, SkipReason};

pub use crate::ai::{run_ai_turn, AiDecision, AiPlanner, AiTurnReport, Stance, Strategy, TurnPolicy};

pub use crate::setup::{BattleBuilder, DeckGenerator, SideAllocation, StandardDeckGenerator};
