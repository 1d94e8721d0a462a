//! Stat derivation, effectiveness and damage.
//!
//! Everything here is pure: functions take creatures (and, for damage, an
//! explicit RNG or pre-drawn rolls) and return values without touching
//! battle state.

pub mod damage;
pub mod derive;
pub mod effectiveness;

pub use damage::{
    best_attack, compute_attack, compute_attack_with_rolls, estimate_damage, AttackKind,
    AttackResult, AttackRolls, DamageType,
};
pub use derive::{derive_stats, deployment_cost, BattleStats, DerivedStat, SoftCap};
pub use effectiveness::effectiveness;
