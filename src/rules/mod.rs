//! The battle rules engine.
//!
//! `BattleEngine` owns the rules (`BattleConfig`), the AI side's tier knobs
//! and the item resolver. It is the only thing that produces new battle
//! states:
//!
//! - `apply` / `try_apply` / `validate` for single actions
//! - `apply_batch` for ordered multi-action turns
//! - `force_end_turn` for external watchdogs
//! - `enter_team_select` / `start_battle` for phase control
//! - `legal_actions` for enumerating what the active side may do

mod actions;
pub mod batch;
pub mod engine;
mod legal;
pub mod turn;
mod validate;

pub use batch::{BatchReport, SkipReason, SkippedAction};
pub use engine::BattleEngine;
pub use turn::COMBO_EFFECT;
