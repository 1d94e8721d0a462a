//! Field synergies: composition bonuses for creatures fighting together.
//!
//! `check_field_synergies` is a pure detector over a field;
//! `apply_synergies` runs the full stat recompute for every member.
//! Each synergy carries a scope deciding which members it boosts.

pub mod apply;
pub mod detect;

use serde::{Deserialize, Serialize};

use crate::creatures::{Creature, Rarity, StatKind};

pub use apply::{apply_synergies, refresh_field};
pub use detect::{check_field_synergies, COMPLEMENTARY_PAIRS};

/// Which synergy rule fired.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SynergyKind {
    /// Two or more of one species.
    Species,
    /// A legendary inspires its allies.
    Legendary,
    /// Two members strong in a complementary stat pair.
    Complementary(StatKind, StatKind),
    /// Wide spread of specialties.
    Balanced,
    /// Field at capacity.
    FullForce,
}

impl std::fmt::Display for SynergyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SynergyKind::Species => f.write_str("Kinship"),
            SynergyKind::Legendary => f.write_str("Legendary Presence"),
            SynergyKind::Complementary(a, b) => write!(f, "{}/{} Harmony", a.name(), b.name()),
            SynergyKind::Balanced => f.write_str("Balanced Team"),
            SynergyKind::FullForce => f.write_str("Full Force"),
        }
    }
}

/// Which field members a synergy boosts.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SynergyScope {
    AllMembers,
    NonLegendary,
    Species(String),
}

/// A detected synergy.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Synergy {
    pub kind: SynergyKind,
    /// Added to the synergy multiplier of every member in scope.
    pub bonus: f64,
    /// Flat initiative for members in scope.
    #[serde(default)]
    pub initiative_bonus: i32,
    pub scope: SynergyScope,
}

impl Synergy {
    #[must_use]
    pub fn new(kind: SynergyKind, bonus: f64, scope: SynergyScope) -> Self {
        Self {
            kind,
            bonus,
            initiative_bonus: 0,
            scope,
        }
    }

    #[must_use]
    pub fn with_initiative(mut self, bonus: i32) -> Self {
        self.initiative_bonus = bonus;
        self
    }

    /// Whether `creature` is boosted by this synergy.
    #[must_use]
    pub fn applies_to(&self, creature: &Creature) -> bool {
        match &self.scope {
            SynergyScope::AllMembers => true,
            SynergyScope::NonLegendary => creature.rarity != Rarity::Legendary,
            SynergyScope::Species(species) => creature.species == *species,
        }
    }
}

impl std::fmt::Display for Synergy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} (+{:.1}%)", self.kind, self.bonus * 100.0)?;
        if self.initiative_bonus != 0 {
            write!(f, " (+{} initiative)", self.initiative_bonus)?;
        }
        Ok(())
    }
}
