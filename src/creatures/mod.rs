//! Creature system: attributes, effects, instances and species registry.
//!
//! ## Key Types
//!
//! - `StatKind` / `BaseStats`: the five raw attributes and the stat cycle
//! - `Rarity`: stat multiplier and draw weight
//! - `ActiveEffect`: timed or permanent modifiers on a field creature
//! - `Creature`: battle-time state with the health invariant
//! - `SpeciesRegistry`: static templates used by deck generation

pub mod attributes;
pub mod effect;
pub mod instance;
pub mod registry;

pub use attributes::{BaseStats, Rarity, StatKind, DEFAULT_BASE_STAT, MAX_BASE_STAT};
pub use effect::{ActiveEffect, EffectCategory, EffectDuration, StatModifiers};
pub use instance::{Creature, DEFAULT_DEFEND_REDUCTION};
pub use registry::{SpeciesRegistry, SpeciesTemplate};
