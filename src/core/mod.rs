//! Core battle types: ids, sides, state, actions, RNG, configuration, errors.
//!
//! Everything else in the crate builds on these. Nothing in here knows how
//! an action is resolved; that lives in `rules`.

pub mod action;
pub mod config;
pub mod entity;
pub mod error;
pub mod rng;
pub mod side;
pub mod state;

pub use action::{Action, ActionBatch, ActionKind, ActionRecord};
pub use config::{
    BattleConfig, Difficulty, DifficultyConfig, DifficultyProvider, StandardDifficulty,
};
pub use entity::{CreatureId, IdAllocator, ItemId};
pub use error::{ActionError, SetupError};
pub use rng::{GameRng, GameRngState};
pub use side::{Side, SideMap};
pub use state::{BattleState, LastAction, LogEntry, Phase, SideState};
