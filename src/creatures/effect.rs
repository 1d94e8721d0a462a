//! Active effects attached to field creatures.
//!
//! An effect has a category, a remaining duration, a per-tick health delta
//! and flat stat deltas. Stat deltas are re-applied on every full stat
//! recompute; they never patch derived stats in place.
//!
//! ## Expiry
//!
//! - Non-defense effects tick when their owner's side ends its turn.
//! - `Defense` effects tick only when the *opposing* side ends its turn, so a
//!   defend blocks exactly one enemy turn.
//! - `Permanent` effects never expire.

use serde::{Deserialize, Serialize};

/// Effect category; decides expiry and how the AI weighs the effect.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EffectCategory {
    /// Defend stance. Special expiry rule (see module docs).
    Defense,
    /// Beneficial effect.
    Buff,
    /// Harmful effect.
    Debuff,
    /// Damage reduction granted by an item.
    Shield,
    /// Cannot attack, defend or cast while active.
    Stun,
}

impl EffectCategory {
    /// Whether this category ticks on the opponent's end-turn.
    #[must_use]
    pub const fn ticks_on_opponent_turn(self) -> bool {
        matches!(self, EffectCategory::Defense)
    }

    /// Whether the effect helps its bearer.
    #[must_use]
    pub const fn is_beneficial(self) -> bool {
        matches!(self, EffectCategory::Defense | EffectCategory::Buff | EffectCategory::Shield)
    }
}

/// How long an effect lasts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EffectDuration {
    /// Remaining ticks before removal.
    Turns(u32),
    /// Never expires.
    Permanent,
}

/// Flat deltas applied on top of derived stats.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StatModifiers {
    pub physical_attack: i32,
    pub magical_attack: i32,
    pub physical_defense: i32,
    pub magical_defense: i32,
    pub max_health: i32,
    pub initiative: i32,
}

impl StatModifiers {
    /// Attack-only modifier.
    #[must_use]
    pub const fn attack(physical: i32, magical: i32) -> Self {
        Self {
            physical_attack: physical,
            magical_attack: magical,
            physical_defense: 0,
            magical_defense: 0,
            max_health: 0,
            initiative: 0,
        }
    }

    /// Component-wise sum.
    #[must_use]
    pub const fn plus(self, other: Self) -> Self {
        Self {
            physical_attack: self.physical_attack + other.physical_attack,
            magical_attack: self.magical_attack + other.magical_attack,
            physical_defense: self.physical_defense + other.physical_defense,
            magical_defense: self.magical_defense + other.magical_defense,
            max_health: self.max_health + other.max_health,
            initiative: self.initiative + other.initiative,
        }
    }

    /// Whether every delta is zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        *self == Self::default()
    }
}

/// An effect currently applied to a creature.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ActiveEffect {
    /// Display name ("Defense", "Combo Surge", item names).
    pub name: String,

    /// Category.
    pub category: EffectCategory,

    /// Remaining duration.
    pub duration: EffectDuration,

    /// Health change applied on each tick (negative for damage over time).
    #[serde(default)]
    pub health_per_tick: i32,

    /// Flat stat deltas.
    #[serde(default)]
    pub stat_modifiers: StatModifiers,

    /// Fraction of incoming damage absorbed, in `[0, 1)`.
    #[serde(default)]
    pub damage_reduction: f64,
}

impl ActiveEffect {
    /// Create an effect with no deltas.
    pub fn new(
        name: impl Into<String>,
        category: EffectCategory,
        duration: EffectDuration,
    ) -> Self {
        Self {
            name: name.into(),
            category,
            duration,
            health_per_tick: 0,
            stat_modifiers: StatModifiers::default(),
            damage_reduction: 0.0,
        }
    }

    /// The defend stance: one enemy turn of `reduction` damage reduction.
    pub fn defense(reduction: f64) -> Self {
        Self::new("Defense", EffectCategory::Defense, EffectDuration::Turns(1))
            .with_damage_reduction(reduction)
    }

    /// Set the per-tick health delta.
    #[must_use]
    pub fn with_health_per_tick(mut self, delta: i32) -> Self {
        self.health_per_tick = delta;
        self
    }

    /// Set stat deltas.
    #[must_use]
    pub fn with_stat_modifiers(mut self, modifiers: StatModifiers) -> Self {
        self.stat_modifiers = modifiers;
        self
    }

    /// Set damage reduction, clamped into `[0, 0.95]`.
    #[must_use]
    pub fn with_damage_reduction(mut self, reduction: f64) -> Self {
        self.damage_reduction = if reduction.is_finite() {
            reduction.clamp(0.0, 0.95)
        } else {
            0.0
        };
        self
    }

    /// Whether the effect has run out.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        matches!(self.duration, EffectDuration::Turns(0))
    }

    /// Consume one tick of duration. Returns the health delta to apply.
    pub fn tick(&mut self) -> i32 {
        if let EffectDuration::Turns(n) = &mut self.duration {
            *n = n.saturating_sub(1);
        }
        self.health_per_tick
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defense_effect() {
        let effect = ActiveEffect::defense(0.5);
        assert_eq!(effect.category, EffectCategory::Defense);
        assert_eq!(effect.duration, EffectDuration::Turns(1));
        assert_eq!(effect.damage_reduction, 0.5);
        assert!(effect.category.ticks_on_opponent_turn());
    }

    #[test]
    fn test_tick_counts_down_and_expires() {
        let mut effect =
            ActiveEffect::new("Regrowth", EffectCategory::Buff, EffectDuration::Turns(2))
                .with_health_per_tick(4);

        assert_eq!(effect.tick(), 4);
        assert!(!effect.is_expired());
        assert_eq!(effect.tick(), 4);
        assert!(effect.is_expired());
    }

    #[test]
    fn test_permanent_never_expires() {
        let mut effect =
            ActiveEffect::new("Combo Surge", EffectCategory::Buff, EffectDuration::Permanent);
        for _ in 0..10 {
            effect.tick();
        }
        assert!(!effect.is_expired());
    }

    #[test]
    fn test_reduction_is_clamped() {
        assert_eq!(ActiveEffect::defense(3.0).damage_reduction, 0.95);
        assert_eq!(ActiveEffect::defense(f64::NAN).damage_reduction, 0.0);
    }

    #[test]
    fn test_modifiers_plus() {
        let sum = StatModifiers::attack(2, 2).plus(StatModifiers {
            initiative: 3,
            ..StatModifiers::default()
        });
        assert_eq!(sum.physical_attack, 2);
        assert_eq!(sum.initiative, 3);
        assert!(!sum.is_zero());
    }
}
