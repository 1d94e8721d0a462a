//! Creature base attributes: the five stat axes and rarity.
//!
//! Base stats are small integers (roughly 1..=10 for natural creatures,
//! clamped to `MAX_BASE_STAT`). A missing or negative stat is replaced by
//! `DEFAULT_BASE_STAT` so one malformed creature cannot stall a battle.

use serde::{Deserialize, Serialize};

/// Substitute for missing or malformed base stats.
pub const DEFAULT_BASE_STAT: i32 = 5;

/// Upper bound for any base stat.
pub const MAX_BASE_STAT: i32 = 20;

/// One of the five base stat axes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum StatKind {
    Energy,
    Strength,
    Magic,
    Stamina,
    Speed,
}

impl StatKind {
    /// All stats in cycle order: each one beats the next.
    pub const CYCLE: [StatKind; 5] = [
        StatKind::Strength,
        StatKind::Stamina,
        StatKind::Speed,
        StatKind::Magic,
        StatKind::Energy,
    ];

    /// The stat this one has the advantage over.
    ///
    /// strength > stamina > speed > magic > energy > strength
    #[must_use]
    pub const fn beats(self) -> StatKind {
        match self {
            StatKind::Strength => StatKind::Stamina,
            StatKind::Stamina => StatKind::Speed,
            StatKind::Speed => StatKind::Magic,
            StatKind::Magic => StatKind::Energy,
            StatKind::Energy => StatKind::Strength,
        }
    }

    /// Position in `CYCLE`, used for stable tie-breaking.
    #[must_use]
    pub const fn cycle_index(self) -> usize {
        match self {
            StatKind::Strength => 0,
            StatKind::Stamina => 1,
            StatKind::Speed => 2,
            StatKind::Magic => 3,
            StatKind::Energy => 4,
        }
    }

    /// Lowercase display name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            StatKind::Energy => "energy",
            StatKind::Strength => "strength",
            StatKind::Magic => "magic",
            StatKind::Stamina => "stamina",
            StatKind::Speed => "speed",
        }
    }
}

fn default_stat() -> i32 {
    DEFAULT_BASE_STAT
}

/// The five raw attributes of a creature.
///
/// Deserializing a record with a missing field yields `DEFAULT_BASE_STAT`
/// for that axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BaseStats {
    #[serde(default = "default_stat")]
    pub energy: i32,
    #[serde(default = "default_stat")]
    pub strength: i32,
    #[serde(default = "default_stat")]
    pub magic: i32,
    #[serde(default = "default_stat")]
    pub stamina: i32,
    #[serde(default = "default_stat")]
    pub speed: i32,
}

impl Default for BaseStats {
    fn default() -> Self {
        Self::uniform(DEFAULT_BASE_STAT)
    }
}

impl BaseStats {
    /// Create base stats in `energy, strength, magic, stamina, speed` order.
    #[must_use]
    pub const fn new(energy: i32, strength: i32, magic: i32, stamina: i32, speed: i32) -> Self {
        Self {
            energy,
            strength,
            magic,
            stamina,
            speed,
        }
    }

    /// All five stats set to `value`.
    #[must_use]
    pub const fn uniform(value: i32) -> Self {
        Self::new(value, value, value, value, value)
    }

    /// Read one axis.
    #[must_use]
    pub const fn get(&self, stat: StatKind) -> i32 {
        match stat {
            StatKind::Energy => self.energy,
            StatKind::Strength => self.strength,
            StatKind::Magic => self.magic,
            StatKind::Stamina => self.stamina,
            StatKind::Speed => self.speed,
        }
    }

    /// Replace one axis.
    #[must_use]
    pub const fn with(mut self, stat: StatKind, value: i32) -> Self {
        match stat {
            StatKind::Energy => self.energy = value,
            StatKind::Strength => self.strength = value,
            StatKind::Magic => self.magic = value,
            StatKind::Stamina => self.stamina = value,
            StatKind::Speed => self.speed = value,
        }
        self
    }

    /// Negative stats become the default, oversized ones are clamped.
    #[must_use]
    pub fn sanitized(self) -> Self {
        let fix = |v: i32| if v < 0 { DEFAULT_BASE_STAT } else { v.min(MAX_BASE_STAT) };
        Self::new(
            fix(self.energy),
            fix(self.strength),
            fix(self.magic),
            fix(self.stamina),
            fix(self.speed),
        )
    }

    /// The highest stat, ties broken by cycle order.
    #[must_use]
    pub fn dominant(&self) -> StatKind {
        let mut best = StatKind::CYCLE[0];
        for stat in StatKind::CYCLE {
            if self.get(stat) > self.get(best) {
                best = stat;
            }
        }
        best
    }

    /// Sum of all five stats.
    #[must_use]
    pub fn total(&self) -> i32 {
        self.energy + self.strength + self.magic + self.stamina + self.speed
    }
}

/// Creature rarity.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Rarity {
    #[default]
    Common,
    Rare,
    Epic,
    Legendary,
}

impl Rarity {
    /// All rarities, most common first.
    pub const ALL: [Rarity; 4] = [Rarity::Common, Rarity::Rare, Rarity::Epic, Rarity::Legendary];

    /// Stat multiplier applied during derivation.
    #[must_use]
    pub const fn multiplier(self) -> f64 {
        match self {
            Rarity::Common => 1.0,
            Rarity::Rare => 1.1,
            Rarity::Epic => 1.2,
            Rarity::Legendary => 1.3,
        }
    }

    /// Relative draw weight for deck generation.
    #[must_use]
    pub const fn draw_weight(self) -> f32 {
        match self {
            Rarity::Common => 55.0,
            Rarity::Rare => 28.0,
            Rarity::Epic => 13.0,
            Rarity::Legendary => 4.0,
        }
    }
}

impl std::fmt::Display for Rarity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Rarity::Common => "Common",
            Rarity::Rare => "Rare",
            Rarity::Epic => "Epic",
            Rarity::Legendary => "Legendary",
        };
        f.write_str(name)
    }
}
