//! The difficulty-tiered AI planner.
//!
//! The planner only reads battle state. It turns a `PlanContext` into an
//! `AiDecision` (one action, an ordered batch, or an explicit end-turn) and
//! leaves applying it to the engine, usually through `run_ai_turn`.
//!
//! - `context`: read-only view of the acting side and the enemy field
//! - `analysis`: power totals, critical creatures, ranked targets, combos
//! - `strategy`: strategy scoring and the cosmetic stance
//! - `planner`: budgeted greedy batch planning
//! - `fallback`: per-tier single-action fallbacks
//! - `lethal`: best-effort lethal search for the top tier
//! - `runner`: plays a whole turn through the engine

pub mod analysis;
pub mod context;
mod fallback;
pub mod lethal;
pub mod planner;
pub mod runner;
pub mod strategy;

pub use analysis::{analyze, BattleAnalysis, ItemCombo, TargetScore};
pub use context::{creature_power, PlanContext};
pub use fallback::fallback_action;
pub use lethal::{find_lethal, LethalPlan};
pub use planner::{optimal_field_size, AiDecision, AiPlan, AiPlanner, TurnPolicy};
pub use runner::{run_ai_turn, AiTurnReport};
pub use strategy::{choose_strategy, Stance, Strategy};
