//! Creature instances: battle-time state of one creature.
//!
//! `Creature` owns the health invariant: `0 <= current_health <= max_health`
//! holds after every mutation. Health and stats are therefore private and
//! change only through the update helpers below.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::attributes::{BaseStats, Rarity, StatKind};
use super::effect::{ActiveEffect, EffectCategory, StatModifiers};
use crate::core::CreatureId;
use crate::stats::{derive_stats, BattleStats};
use crate::synergy::{Synergy, SynergyKind};

/// Damage reduction of a defend stance that carries no explicit effect.
pub const DEFAULT_DEFEND_REDUCTION: f64 = 0.5;

/// A creature in a deck, hand or on the field.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Creature {
    /// Unique for the whole battle.
    pub id: CreatureId,

    /// Species name; drives the same-species synergy.
    pub species: String,

    /// Display name.
    pub name: String,

    pub rarity: Rarity,

    /// Evolution stage, usually 0..=4.
    pub form: u8,

    #[serde(default)]
    pub combination_level: u8,

    pub base_stats: BaseStats,

    /// Specialty stats (at most two in generated decks).
    #[serde(default)]
    pub specialties: SmallVec<[StatKind; 2]>,

    stats: BattleStats,

    current_health: i32,

    /// Active effects, oldest first.
    #[serde(default)]
    pub effects: Vec<ActiveEffect>,

    /// Whether a defend stance is active.
    #[serde(default)]
    pub is_defending: bool,

    /// Synergies that applied at the last recompute.
    #[serde(default)]
    pub synergies: SmallVec<[SynergyKind; 4]>,
}

impl Creature {
    /// Create a creature with freshly derived stats and full health.
    pub fn new(
        id: CreatureId,
        species: impl Into<String>,
        rarity: Rarity,
        form: u8,
        base_stats: BaseStats,
    ) -> Self {
        let species = species.into();
        let mut creature = Self {
            id,
            name: species.clone(),
            species,
            rarity,
            form,
            combination_level: 0,
            base_stats,
            specialties: SmallVec::new(),
            stats: BattleStats::default(),
            current_health: 0,
            effects: Vec::new(),
            is_defending: false,
            synergies: SmallVec::new(),
        };
        creature.restore();
        creature
    }

    /// Set the display name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Set specialties and re-derive at full health. Repeats are dropped.
    #[must_use]
    pub fn with_specialties(mut self, specialties: &[StatKind]) -> Self {
        self.specialties.clear();
        for &stat in specialties {
            if !self.specialties.contains(&stat) {
                self.specialties.push(stat);
            }
        }
        self.restore();
        self
    }

    /// Set the combination level and re-derive at full health.
    #[must_use]
    pub fn with_combination_level(mut self, level: u8) -> Self {
        self.combination_level = level;
        self.restore();
        self
    }

    /// Replace derived stats outright, at full health.
    ///
    /// The next `recompute` overwrites them again.
    #[must_use]
    pub fn with_stats(mut self, stats: BattleStats) -> Self {
        self.stats = stats;
        self.stats.max_health = self.stats.max_health.max(1);
        self.current_health = self.stats.max_health;
        self
    }

    /// Set current health (clamped).
    #[must_use]
    pub fn with_health(mut self, health: i32) -> Self {
        self.set_health(health);
        self
    }

    /// Derived stats including effect deltas.
    #[must_use]
    pub fn stats(&self) -> &BattleStats {
        &self.stats
    }

    #[must_use]
    pub fn current_health(&self) -> i32 {
        self.current_health
    }

    #[must_use]
    pub fn max_health(&self) -> i32 {
        self.stats.max_health
    }

    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.current_health > 0
    }

    /// Current health over max health, in `[0, 1]`.
    #[must_use]
    pub fn health_fraction(&self) -> f64 {
        if self.stats.max_health <= 0 {
            return 0.0;
        }
        f64::from(self.current_health) / f64::from(self.stats.max_health)
    }

    /// Energy needed to deploy this creature.
    #[must_use]
    pub fn deploy_cost(&self) -> i32 {
        self.stats.deployment_energy_cost
    }

    /// A stunned creature cannot attack, defend or cast.
    #[must_use]
    pub fn is_incapacitated(&self) -> bool {
        self.effects.iter().any(|e| e.category == EffectCategory::Stun && !e.is_expired())
    }

    /// Strongest damage reduction currently protecting this creature.
    #[must_use]
    pub fn damage_reduction(&self) -> f64 {
        let from_effects = self
            .effects
            .iter()
            .map(|e| e.damage_reduction)
            .fold(0.0_f64, f64::max);

        let has_defense_effect = self.effects.iter().any(|e| e.category == EffectCategory::Defense);
        if self.is_defending && !has_defense_effect {
            from_effects.max(DEFAULT_DEFEND_REDUCTION)
        } else {
            from_effects
        }
    }

    /// Sum of all effect stat deltas.
    #[must_use]
    pub fn effect_modifiers(&self) -> StatModifiers {
        self.effects
            .iter()
            .fold(StatModifiers::default(), |acc, e| acc.plus(e.stat_modifiers))
    }

    /// Whether any active effect has the given name.
    #[must_use]
    pub fn has_effect(&self, name: &str) -> bool {
        self.effects.iter().any(|e| e.name == name)
    }

    /// Set health, clamped into `[0, max_health]`.
    pub fn set_health(&mut self, health: i32) {
        self.current_health = health.clamp(0, self.stats.max_health);
    }

    /// Apply damage. Returns the health actually lost.
    pub fn take_damage(&mut self, amount: i32) -> i32 {
        let before = self.current_health;
        self.set_health(before - amount.max(0));
        before - self.current_health
    }

    /// Apply healing. Returns the health actually gained.
    ///
    /// Dead creatures stay dead.
    pub fn heal(&mut self, amount: i32) -> i32 {
        if !self.is_alive() {
            return 0;
        }
        let before = self.current_health;
        self.set_health(before + amount.max(0));
        self.current_health - before
    }

    /// Attach an effect. A `Defense` effect also raises the defend flag.
    ///
    /// Stat deltas take hold at the next `recompute`.
    pub fn add_effect(&mut self, effect: ActiveEffect) {
        if effect.category == EffectCategory::Defense {
            self.is_defending = true;
        }
        self.effects.push(effect);
    }

    /// Tick effects of one expiry class and drop the expired ones.
    ///
    /// `opponent_turn` selects `Defense` effects (ticked when the enemy side
    /// ends its turn); otherwise every other category ticks. Per-tick health
    /// deltas are applied. Returns the net health change.
    pub fn tick_effects(&mut self, opponent_turn: bool) -> i32 {
        let mut delta = 0;
        for effect in &mut self.effects {
            if effect.category.ticks_on_opponent_turn() == opponent_turn {
                delta += effect.tick();
            }
        }
        self.effects.retain(|e| !e.is_expired());

        if opponent_turn && !self.effects.iter().any(|e| e.category == EffectCategory::Defense) {
            self.is_defending = false;
        }

        if delta == 0 || !self.is_alive() {
            return 0;
        }
        let before = self.current_health;
        self.current_health = (before + delta).clamp(0, self.stats.max_health);
        self.current_health - before
    }

    /// Full stat recompute from base data, synergies and effects.
    ///
    /// Health is rescaled by ratio when max health changes, and a living
    /// creature never drops to zero from a rescale.
    pub fn recompute(&mut self, active_synergies: &[Synergy]) {
        let old_max = self.stats.max_health;
        let mut stats = derive_stats(self, active_synergies);

        let m = self.effect_modifiers();
        stats.physical_attack = (stats.physical_attack + m.physical_attack).max(0);
        stats.magical_attack = (stats.magical_attack + m.magical_attack).max(0);
        stats.physical_defense = (stats.physical_defense + m.physical_defense).max(0);
        stats.magical_defense = (stats.magical_defense + m.magical_defense).max(0);
        stats.max_health = (stats.max_health + m.max_health).max(1);
        stats.initiative = (stats.initiative + m.initiative).max(0);

        self.synergies = active_synergies
            .iter()
            .filter(|s| s.applies_to(self))
            .map(|s| s.kind)
            .collect();

        let new_max = stats.max_health;
        self.stats = stats;
        self.rescale_health(old_max, new_max);
    }

    fn rescale_health(&mut self, old_max: i32, new_max: i32) {
        if old_max == new_max || self.current_health <= 0 {
            self.current_health = self.current_health.clamp(0, new_max);
            return;
        }
        if old_max <= 0 {
            self.current_health = new_max;
            return;
        }
        let scaled =
            (f64::from(self.current_health) * f64::from(new_max) / f64::from(old_max)).round();
        self.current_health = (scaled as i32).clamp(1, new_max);
    }

    /// Clear battle state and re-derive at full health.
    ///
    /// Used when a creature is built and again when it is deployed.
    pub fn restore(&mut self) {
        self.effects.clear();
        self.is_defending = false;
        self.synergies.clear();
        self.stats = derive_stats(self, &[]);
        self.current_health = self.stats.max_health;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::creatures::effect::EffectDuration;
    use crate::synergy::SynergyScope;

    fn sample() -> Creature {
        Creature::new(CreatureId(7), "Mossback", Rarity::Common, 0, BaseStats::uniform(5))
    }

    #[test]
    fn test_new_creature_has_full_health() {
        let c = sample();
        assert_eq!(c.current_health(), 120);
        assert_eq!(c.max_health(), 120);
        assert_eq!(c.name, "Mossback");
        assert_eq!(c.deploy_cost(), 5);
    }

    #[test]
    fn test_repeated_specialty_counts_once() {
        let single = sample().with_specialties(&[StatKind::Strength]);
        let repeated = sample().with_specialties(&[StatKind::Strength, StatKind::Strength]);

        assert_eq!(repeated.specialties.as_slice(), &[StatKind::Strength]);
        assert_eq!(repeated.stats(), single.stats());
    }

    #[test]
    fn test_damage_and_heal_are_clamped() {
        let mut c = sample();
        assert_eq!(c.take_damage(50), 50);
        assert_eq!(c.heal(500), 50);
        assert_eq!(c.current_health(), 120);
        assert_eq!(c.take_damage(1000), 120);
        assert!(!c.is_alive());
        assert_eq!(c.heal(10), 0);
    }

    #[test]
    fn test_recompute_rescales_by_ratio() {
        let mut c = sample().with_health(60);
        let synergy = Synergy::new(SynergyKind::Balanced, 0.5, SynergyScope::AllMembers);

        c.recompute(&[synergy]);

        assert_eq!(c.max_health(), 180);
        assert_eq!(c.current_health(), 90);
        assert_eq!(c.synergies.as_slice(), &[SynergyKind::Balanced]);

        c.recompute(&[]);
        assert_eq!(c.max_health(), 120);
        assert_eq!(c.current_health(), 60);
    }

    #[test]
    fn test_recompute_never_kills() {
        let mut c = sample().with_health(1);
        c.add_effect(
            ActiveEffect::new("Wither", EffectCategory::Debuff, EffectDuration::Turns(2))
                .with_stat_modifiers(StatModifiers {
                    max_health: -100,
                    ..StatModifiers::default()
                }),
        );
        c.recompute(&[]);
        assert_eq!(c.max_health(), 20);
        assert_eq!(c.current_health(), 1);
    }

    #[test]
    fn test_effect_modifiers_are_reapplied_not_stacked() {
        let mut c = sample();
        c.add_effect(
            ActiveEffect::new("Combo Surge", EffectCategory::Buff, EffectDuration::Permanent)
                .with_stat_modifiers(StatModifiers::attack(2, 2)),
        );
        c.recompute(&[]);
        c.recompute(&[]);
        assert_eq!(c.stats().physical_attack, 32);
        assert_eq!(c.stats().magical_attack, 32);
    }

    #[test]
    fn test_defense_expires_on_opponent_tick() {
        let mut c = sample();
        c.add_effect(ActiveEffect::defense(0.5));
        assert!(c.is_defending);
        assert_eq!(c.damage_reduction(), 0.5);

        c.tick_effects(false);
        assert!(c.is_defending);

        c.tick_effects(true);
        assert!(!c.is_defending);
        assert!(c.effects.is_empty());
        assert_eq!(c.damage_reduction(), 0.0);
    }

    #[test]
    fn test_stun_incapacitates_until_expiry() {
        let mut c = sample();
        c.add_effect(ActiveEffect::new("Stun", EffectCategory::Stun, EffectDuration::Turns(1)));
        assert!(c.is_incapacitated());
        c.tick_effects(false);
        assert!(!c.is_incapacitated());
    }

    #[test]
    fn test_damage_over_time_can_defeat() {
        let mut c = sample().with_health(5);
        c.add_effect(
            ActiveEffect::new("Burn", EffectCategory::Debuff, EffectDuration::Turns(3))
                .with_health_per_tick(-10),
        );
        assert_eq!(c.tick_effects(false), -5);
        assert_eq!(c.current_health(), 0);
        assert!(!c.is_alive());
        // Nothing more ticks off a defeated creature.
        assert_eq!(c.tick_effects(false), 0);
    }

    #[test]
    fn test_flag_without_effect_uses_default_reduction() {
        let mut c = sample();
        c.is_defending = true;
        assert_eq!(c.damage_reduction(), DEFAULT_DEFEND_REDUCTION);
    }
}
