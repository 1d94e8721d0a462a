//! Battle stat derivation.
//!
//! Every derived score follows the same chain:
//!
//! ```text
//! raw   = (base + per_point × stat)
//!       × specialty   (1.8 with one matching specialty, 1.4 with two or more)
//!       × form        (1 + 0.25 × form)
//!       × rarity      (1.0 / 1.1 / 1.2 / 1.3)
//!       × combination (1 + 0.1 × level)
//!       × synergy     (1 + Σ applicable synergy bonuses)
//! value = round(soft_cap(raw))
//! ```
//!
//! Deployment cost is outside this chain: it is always `5 + form`.

use serde::{Deserialize, Serialize};

use crate::creatures::{Creature, StatKind};
use crate::synergy::Synergy;

/// A diminishing-returns ceiling.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SoftCap {
    /// Values at or below this pass through unchanged.
    pub soft: f64,
    /// Asymptote that compressed values approach but never reach.
    pub hard: f64,
}

impl SoftCap {
    pub const ATTACK: SoftCap = SoftCap { soft: 150.0, hard: 250.0 };
    pub const DEFENSE: SoftCap = SoftCap { soft: 120.0, hard: 200.0 };
    pub const HEALTH: SoftCap = SoftCap { soft: 400.0, hard: 600.0 };
    pub const INITIATIVE: SoftCap = SoftCap { soft: 60.0, hard: 100.0 };

    /// Compress `raw` above the soft threshold.
    ///
    /// `soft + range × (1 − e^(−excess / range))` where `range = hard − soft`.
    #[must_use]
    pub fn apply(self, raw: f64) -> f64 {
        if !raw.is_finite() {
            return self.soft;
        }
        if raw <= self.soft {
            return raw;
        }
        let range = self.hard - self.soft;
        if range <= 0.0 {
            return self.soft;
        }
        let excess = raw - self.soft;
        self.soft + range * (1.0 - (-excess / range).exp())
    }
}

/// Fully derived combat stats of a creature.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BattleStats {
    pub physical_attack: i32,
    pub magical_attack: i32,
    pub physical_defense: i32,
    pub magical_defense: i32,
    pub max_health: i32,
    pub initiative: i32,
    /// Percent in `[0, 100]`.
    pub critical_chance: f64,
    /// Percent in `[0, 100]`.
    pub dodge_chance: f64,
    /// Always `5 + form`.
    pub deployment_energy_cost: i32,
}

impl BattleStats {
    /// Sum of both attack scores, used as a quick power estimate.
    #[must_use]
    pub fn total_attack(&self) -> i32 {
        self.physical_attack + self.magical_attack
    }
}

/// The six soft-capped scores.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DerivedStat {
    PhysicalAttack,
    MagicalAttack,
    PhysicalDefense,
    MagicalDefense,
    MaxHealth,
    Initiative,
}

impl DerivedStat {
    pub const ALL: [DerivedStat; 6] = [
        DerivedStat::PhysicalAttack,
        DerivedStat::MagicalAttack,
        DerivedStat::PhysicalDefense,
        DerivedStat::MagicalDefense,
        DerivedStat::MaxHealth,
        DerivedStat::Initiative,
    ];

    /// The base stat that feeds this score.
    #[must_use]
    pub const fn governing_stat(self) -> StatKind {
        match self {
            DerivedStat::PhysicalAttack => StatKind::Strength,
            DerivedStat::MagicalAttack => StatKind::Magic,
            DerivedStat::PhysicalDefense | DerivedStat::MaxHealth => StatKind::Stamina,
            DerivedStat::MagicalDefense => StatKind::Energy,
            DerivedStat::Initiative => StatKind::Speed,
        }
    }

    /// `(flat base, per stat point)`.
    const fn linear(self) -> (f64, f64) {
        match self {
            DerivedStat::PhysicalAttack | DerivedStat::MagicalAttack => (10.0, 4.0),
            DerivedStat::PhysicalDefense | DerivedStat::MagicalDefense => (5.0, 3.0),
            DerivedStat::MaxHealth => (60.0, 12.0),
            DerivedStat::Initiative => (5.0, 3.0),
        }
    }

    /// Ceiling for this score.
    #[must_use]
    pub const fn cap(self) -> SoftCap {
        match self {
            DerivedStat::PhysicalAttack | DerivedStat::MagicalAttack => SoftCap::ATTACK,
            DerivedStat::PhysicalDefense | DerivedStat::MagicalDefense => SoftCap::DEFENSE,
            DerivedStat::MaxHealth => SoftCap::HEALTH,
            DerivedStat::Initiative => SoftCap::INITIATIVE,
        }
    }
}

/// 1.8 when `stat` is the creature's only specialty, 1.4 when it is one of
/// several, 1.0 otherwise.
#[must_use]
pub fn specialty_multiplier(specialties: &[StatKind], stat: StatKind) -> f64 {
    if !specialties.contains(&stat) {
        return 1.0;
    }
    if specialties.len() == 1 {
        1.8
    } else {
        1.4
    }
}

/// `1 + 0.25 × form`.
#[must_use]
pub fn form_multiplier(form: u8) -> f64 {
    1.0 + 0.25 * f64::from(form)
}

/// `1 + 0.1 × level`.
#[must_use]
pub fn combination_multiplier(level: u8) -> f64 {
    1.0 + 0.1 * f64::from(level)
}

/// `1 + Σ bonus` over the synergies that apply to `creature`.
#[must_use]
pub fn synergy_multiplier(creature: &Creature, synergies: &[Synergy]) -> f64 {
    let bonus: f64 = synergies
        .iter()
        .filter(|s| s.applies_to(creature))
        .map(|s| s.bonus)
        .filter(|b| b.is_finite())
        .sum();
    (1.0 + bonus).max(0.0)
}

/// Flat initiative granted by synergies that apply to `creature`.
#[must_use]
pub fn synergy_initiative(creature: &Creature, synergies: &[Synergy]) -> i32 {
    synergies
        .iter()
        .filter(|s| s.applies_to(creature))
        .map(|s| s.initiative_bonus)
        .sum()
}

/// Deployment energy cost: `5 + form`, independent of every stat.
#[must_use]
pub const fn deployment_cost(form: u8) -> i32 {
    5 + form as i32
}

/// Raw (pre-cap) value of one score.
#[must_use]
pub fn raw_score(creature: &Creature, stat: DerivedStat, synergy_mult: f64) -> f64 {
    let base_stats = creature.base_stats.sanitized();
    let governing = stat.governing_stat();
    let (flat, per_point) = stat.linear();

    (flat + per_point * f64::from(base_stats.get(governing)))
        * specialty_multiplier(&creature.specialties, governing)
        * form_multiplier(creature.form)
        * creature.rarity.multiplier()
        * combination_multiplier(creature.combination_level)
        * synergy_mult
}

/// Derive battle stats from base data and the active synergy set.
///
/// Pure: the result depends only on the creature's base data (species,
/// rarity, form, combination level, base stats, specialties) and
/// `active_synergies`. Active effects are layered on separately by
/// `Creature::recompute`.
#[must_use]
pub fn derive_stats(creature: &Creature, active_synergies: &[Synergy]) -> BattleStats {
    let synergy_mult = synergy_multiplier(creature, active_synergies);
    let score = |stat: DerivedStat| -> i32 {
        stat.cap().apply(raw_score(creature, stat, synergy_mult)).round() as i32
    };

    let speed = f64::from(creature.base_stats.sanitized().speed);

    BattleStats {
        physical_attack: score(DerivedStat::PhysicalAttack),
        magical_attack: score(DerivedStat::MagicalAttack),
        physical_defense: score(DerivedStat::PhysicalDefense),
        magical_defense: score(DerivedStat::MagicalDefense),
        max_health: score(DerivedStat::MaxHealth).max(1),
        initiative: score(DerivedStat::Initiative) + synergy_initiative(creature, active_synergies),
        critical_chance: (5.0 + 0.8 * speed + f64::from(creature.form)).min(35.0),
        dodge_chance: (2.0 + 0.6 * speed).min(25.0),
        deployment_energy_cost: deployment_cost(creature.form),
    }
}
