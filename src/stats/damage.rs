//! Damage calculation.
//!
//! An attack resolves in fixed stages:
//!
//! 1. Pick attack and defense scores for the attack kind.
//! 2. Effectiveness from the stat cycle.
//! 3. Dodge roll: a dodged attack deals nothing.
//! 4. Critical roll (×1.5).
//! 5. Variance in `[0.85, 1.15]`.
//! 6. Strongest damage reduction on the defender (defend, shields).
//! 7. Defense mitigation `def / (def + 100)`, capped at 70%.
//! 8. Form difference scaling and max-health caps.
//! 9. Floor of `2 × attacker form + 1`.
//!
//! All three random numbers are drawn up front by `AttackRolls::roll`, so
//! the RNG advances by the same amount whether or not the attack lands.

use serde::{Deserialize, Serialize};
use tracing::trace;

use super::effectiveness::effectiveness;
use crate::core::GameRng;
use crate::creatures::Creature;

pub const CRITICAL_MULTIPLIER: f64 = 1.5;
pub const VARIANCE_MIN: f64 = 0.85;
pub const VARIANCE_MAX: f64 = 1.15;
pub const MAX_MITIGATION: f64 = 0.7;

/// Physical attacks use physical attack/defense; magical ones the magical pair.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttackKind {
    #[default]
    Physical,
    Magical,
}

impl AttackKind {
    pub const BOTH: [AttackKind; 2] = [AttackKind::Physical, AttackKind::Magical];
}

impl std::fmt::Display for AttackKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AttackKind::Physical => f.write_str("physical"),
            AttackKind::Magical => f.write_str("magical"),
        }
    }
}

/// Presentation tag for a damage result.
///
/// Precedence: glancing, reduced, devastating, powerful, normal.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DamageType {
    #[default]
    Normal,
    /// Defender is of a higher form.
    Glancing,
    /// Attacker's higher form penalty, or a reduction absorbed part of it.
    Reduced,
    /// Critical and super-effective.
    Devastating,
    /// Critical or super-effective.
    Powerful,
}

impl DamageType {
    /// Pick the tag for a landed hit.
    #[must_use]
    pub fn classify(
        attacker_form: u8,
        defender_form: u8,
        is_blocked: bool,
        is_critical: bool,
        effectiveness: f64,
    ) -> Self {
        if defender_form > attacker_form {
            DamageType::Glancing
        } else if attacker_form > defender_form || is_blocked {
            DamageType::Reduced
        } else if is_critical && effectiveness > 1.0 {
            DamageType::Devastating
        } else if is_critical || effectiveness > 1.0 {
            DamageType::Powerful
        } else {
            DamageType::Normal
        }
    }
}

impl std::fmt::Display for DamageType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            DamageType::Normal => "normal",
            DamageType::Glancing => "glancing",
            DamageType::Reduced => "reduced",
            DamageType::Devastating => "devastating",
            DamageType::Powerful => "powerful",
        };
        f.write_str(name)
    }
}

/// Outcome of one attack.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AttackResult {
    /// Final damage, `>= 0`. Zero only on a dodge.
    pub damage: i32,
    pub is_critical: bool,
    pub is_dodged: bool,
    /// A damage reduction effect absorbed part of the hit.
    pub is_blocked: bool,
    pub effectiveness: f64,
    pub damage_type: DamageType,
}

/// The three random inputs of an attack.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AttackRolls {
    /// Percent roll compared against the defender's dodge chance.
    pub dodge: f64,
    /// Percent roll compared against the attacker's critical chance.
    pub critical: f64,
    /// Multiplier in `[0.85, 1.15]`.
    pub variance: f64,
}

impl AttackRolls {
    /// Draw rolls in a fixed order: dodge, critical, variance.
    pub fn roll(rng: &mut GameRng) -> Self {
        let dodge = rng.roll_percent();
        let critical = rng.roll_percent();
        let variance = rng.gen_f64(VARIANCE_MIN, VARIANCE_MAX);
        Self { dodge, critical, variance }
    }

    /// No dodge, no critical, no variance. Used for estimates.
    #[must_use]
    pub const fn neutral() -> Self {
        Self {
            dodge: 100.0,
            critical: 100.0,
            variance: 1.0,
        }
    }
}

/// Damage multiplier and max-health cap fraction for a form difference.
///
/// A higher-form attacker is both scaled down and capped; a lower-form one
/// is only scaled down.
#[must_use]
pub fn form_scaling(attacker_form: u8, defender_form: u8) -> (f64, Option<f64>) {
    let diff = i32::from(attacker_form) - i32::from(defender_form);
    match diff {
        d if d <= -2 => (0.5, None),
        -1 => (0.75, None),
        0 => (1.0, None),
        1 => (0.8, Some(0.35)),
        2 => (0.6, Some(0.50)),
        _ => (0.5, Some(0.60)),
    }
}

/// Minimum damage of a landed hit.
#[must_use]
pub fn damage_floor(attacker_form: u8) -> i32 {
    2 * i32::from(attacker_form) + 1
}

/// Mitigation fraction for a defense score, in `[0, 0.7]`.
#[must_use]
pub fn mitigation(defense: i32) -> f64 {
    let def = f64::from(defense.max(0));
    (def / (def + 100.0)).min(MAX_MITIGATION)
}

/// Resolve an attack with explicit rolls.
///
/// `combo_multiplier` is the attacking side's `1 + 0.05 × consecutive
/// actions` scaling.
#[must_use]
pub fn compute_attack_with_rolls(
    attacker: &Creature,
    defender: &Creature,
    kind: AttackKind,
    combo_multiplier: f64,
    rolls: AttackRolls,
) -> AttackResult {
    let atk = attacker.stats();
    let def = defender.stats();
    let (attack, defense) = match kind {
        AttackKind::Physical => (atk.physical_attack, def.physical_defense),
        AttackKind::Magical => (atk.magical_attack, def.magical_defense),
    };

    let effectiveness = effectiveness(attacker, defender);
    let (form_mult, health_cap) = form_scaling(attacker.form, defender.form);

    if rolls.dodge < def.dodge_chance {
        return AttackResult {
            damage: 0,
            is_critical: false,
            is_dodged: true,
            is_blocked: false,
            effectiveness,
            damage_type: DamageType::Normal,
        };
    }

    let is_critical = rolls.critical < atk.critical_chance;
    let combo = if combo_multiplier.is_finite() { combo_multiplier.max(1.0) } else { 1.0 };

    let mut damage = f64::from(attack.max(0)) * effectiveness * combo;
    if is_critical {
        damage *= CRITICAL_MULTIPLIER;
    }
    damage *= rolls.variance.clamp(VARIANCE_MIN, VARIANCE_MAX);

    let reduction = defender.damage_reduction();
    let is_blocked = reduction > 0.0;
    damage *= 1.0 - reduction;

    damage *= 1.0 - mitigation(defense);
    damage *= form_mult;
    if let Some(fraction) = health_cap {
        damage = damage.min(f64::from(defender.max_health()) * fraction);
    }

    let damage = (damage.round() as i32).max(damage_floor(attacker.form));
    let damage_type =
        DamageType::classify(attacker.form, defender.form, is_blocked, is_critical, effectiveness);

    AttackResult {
        damage,
        is_critical,
        is_dodged: false,
        is_blocked,
        effectiveness,
        damage_type,
    }
}

/// Resolve an attack, drawing rolls from `rng`.
pub fn compute_attack(
    attacker: &Creature,
    defender: &Creature,
    kind: AttackKind,
    combo_multiplier: f64,
    rng: &mut GameRng,
) -> AttackResult {
    let rolls = AttackRolls::roll(rng);
    let result = compute_attack_with_rolls(attacker, defender, kind, combo_multiplier, rolls);
    trace!(
        attacker = %attacker.name,
        defender = %defender.name,
        dodge = rolls.dodge,
        critical = rolls.critical,
        variance = rolls.variance,
        damage = result.damage,
        "attack rolled"
    );
    result
}

/// Damage of an average hit: no dodge, no critical, no variance.
#[must_use]
pub fn estimate_damage(attacker: &Creature, defender: &Creature, kind: AttackKind) -> i32 {
    compute_attack_with_rolls(attacker, defender, kind, 1.0, AttackRolls::neutral()).damage
}

/// The better attack kind against `defender` and its estimated damage.
#[must_use]
pub fn best_attack(attacker: &Creature, defender: &Creature) -> (AttackKind, i32) {
    let physical = estimate_damage(attacker, defender, AttackKind::Physical);
    let magical = estimate_damage(attacker, defender, AttackKind::Magical);
    if magical > physical {
        (AttackKind::Magical, magical)
    } else {
        (AttackKind::Physical, physical)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::CreatureId;
    use crate::creatures::{BaseStats, Rarity};
    use crate::stats::BattleStats;

    fn fighter(id: u32, form: u8, attack: i32, defense: i32) -> Creature {
        let stats = BattleStats {
            physical_attack: attack,
            magical_attack: attack,
            physical_defense: defense,
            magical_defense: defense,
            max_health: 200,
            initiative: 10,
            critical_chance: 10.0,
            dodge_chance: 5.0,
            deployment_energy_cost: 5 + i32::from(form),
        };
        Creature::new(CreatureId(id), "Dummy", Rarity::Common, form, BaseStats::uniform(5))
            .with_stats(stats)
    }

    #[test]
    fn test_neutral_hit() {
        // 40 × (1 − 20/120) = 33.3
        let attacker = fighter(1, 0, 40, 0);
        let defender = fighter(2, 0, 0, 20);
        let result = estimate_damage(&attacker, &defender, AttackKind::Physical);
        assert_eq!(result, 33);
    }

    #[test]
    fn test_dodge_deals_nothing() {
        let rolls = AttackRolls { dodge: 1.0, ..AttackRolls::neutral() };
        let attacker = fighter(1, 0, 40, 0);
        let defender = fighter(2, 0, 0, 20);
        let result =
            compute_attack_with_rolls(&attacker, &defender, AttackKind::Physical, 1.0, rolls);
        assert!(result.is_dodged);
        assert_eq!(result.damage, 0);
    }

    #[test]
    fn test_critical() {
        let rolls = AttackRolls { critical: 0.0, ..AttackRolls::neutral() };
        let attacker = fighter(1, 0, 40, 0);
        let defender = fighter(2, 0, 0, 20);
        let result =
            compute_attack_with_rolls(&attacker, &defender, AttackKind::Physical, 1.0, rolls);
        assert!(result.is_critical);
        assert_eq!(result.damage, 50);
    }

    #[test]
    fn test_defending_halves_damage() {
        let mut defender = fighter(2, 0, 0, 20);
        defender.is_defending = true;
        let attacker = fighter(1, 0, 40, 0);
        let result = compute_attack_with_rolls(
            &attacker,
            &defender,
            AttackKind::Physical,
            1.0,
            AttackRolls::neutral(),
        );
        assert!(result.is_blocked);
        assert_eq!(result.damage, 17);
    }

    #[test]
    fn test_mitigation_cap() {
        assert!((mitigation(100) - 0.5).abs() < 1e-9);
        assert_eq!(mitigation(10_000), MAX_MITIGATION);
        assert_eq!(mitigation(-5), 0.0);
    }

    #[test]
    fn test_form_scaling_table() {
        assert_eq!(form_scaling(0, 3), (0.5, None));
        assert_eq!(form_scaling(1, 2), (0.75, None));
        assert_eq!(form_scaling(2, 2), (1.0, None));
        assert_eq!(form_scaling(3, 2), (0.8, Some(0.35)));
        assert_eq!(form_scaling(4, 2), (0.6, Some(0.50)));
        assert_eq!(form_scaling(4, 0), (0.5, Some(0.60)));
    }

    #[test]
    fn test_damage_type_precedence() {
        assert_eq!(DamageType::classify(0, 1, true, true, 1.3), DamageType::Glancing);
        assert_eq!(DamageType::classify(2, 1, false, true, 1.3), DamageType::Reduced);
        assert_eq!(DamageType::classify(1, 1, true, true, 1.3), DamageType::Reduced);
        assert_eq!(DamageType::classify(1, 1, false, true, 1.3), DamageType::Devastating);
        assert_eq!(DamageType::classify(1, 1, false, true, 1.0), DamageType::Powerful);
        assert_eq!(DamageType::classify(1, 1, false, false, 1.3), DamageType::Powerful);
        assert_eq!(DamageType::classify(1, 1, false, false, 0.75), DamageType::Normal);
    }

    #[test]
    fn test_higher_form_is_capped_by_max_health() {
        let attacker = fighter(1, 4, 1000, 0);
        let defender = fighter(2, 0, 0, 0);
        let result = estimate_damage(&attacker, &defender, AttackKind::Physical);
        // 60% of 200
        assert_eq!(result, 120);
    }

    #[test]
    fn test_floor_applies_to_landed_hits() {
        let attacker = fighter(1, 2, 1, 0);
        let defender = fighter(2, 4, 0, 500);
        let result = estimate_damage(&attacker, &defender, AttackKind::Magical);
        assert_eq!(result, damage_floor(2));
    }

    #[test]
    fn test_rolls_consume_fixed_rng() {
        let mut a = GameRng::new(9);
        let mut b = GameRng::new(9);
        let _ = AttackRolls::roll(&mut a);
        let _ = AttackRolls::roll(&mut b);
        assert_eq!(a, b);
    }
}
