//! Stat-cycle effectiveness.
//!
//! strength > stamina > speed > magic > energy > strength
//!
//! A creature's affinities are its specialty stats, or its dominant base
//! stat when it has none. Every (attacker affinity, defender affinity) pair
//! contributes ×1.3 when the attacker's stat beats the defender's and ×0.75
//! when it is beaten. The product is clamped to `[0.5, 1.8]`.

use smallvec::{smallvec, SmallVec};

use crate::creatures::{Creature, StatKind};

pub const ADVANTAGE: f64 = 1.3;
pub const DISADVANTAGE: f64 = 0.75;
pub const MIN_EFFECTIVENESS: f64 = 0.5;
pub const MAX_EFFECTIVENESS: f64 = 1.8;

/// Stats that define a creature's side of the cycle.
#[must_use]
pub fn affinities(creature: &Creature) -> SmallVec<[StatKind; 2]> {
    if creature.specialties.is_empty() {
        smallvec![creature.base_stats.sanitized().dominant()]
    } else {
        creature.specialties.clone()
    }
}

/// Multiplier for a single stat pairing.
#[must_use]
pub fn pair_factor(attacker: StatKind, defender: StatKind) -> f64 {
    if attacker.beats() == defender {
        ADVANTAGE
    } else if defender.beats() == attacker {
        DISADVANTAGE
    } else {
        1.0
    }
}

/// Effectiveness of `attacker` against `defender`, in `[0.5, 1.8]`.
#[must_use]
pub fn effectiveness(attacker: &Creature, defender: &Creature) -> f64 {
    let defending = affinities(defender);
    let product: f64 = affinities(attacker)
        .iter()
        .flat_map(|a| defending.iter().map(move |d| pair_factor(*a, *d)))
        .product();
    product.clamp(MIN_EFFECTIVENESS, MAX_EFFECTIVENESS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::CreatureId;
    use crate::creatures::{BaseStats, Rarity};

    fn with(specialties: &[StatKind]) -> Creature {
        Creature::new(CreatureId(1), "Probe", Rarity::Common, 0, BaseStats::uniform(5))
            .with_specialties(specialties)
    }

    #[test]
    fn test_pair_factor() {
        assert_eq!(pair_factor(StatKind::Strength, StatKind::Stamina), ADVANTAGE);
        assert_eq!(pair_factor(StatKind::Stamina, StatKind::Strength), DISADVANTAGE);
        assert_eq!(pair_factor(StatKind::Strength, StatKind::Magic), 1.0);
        assert_eq!(pair_factor(StatKind::Speed, StatKind::Speed), 1.0);
    }

    #[test]
    fn test_single_specialty() {
        let strong = with(&[StatKind::Strength]);
        let tough = with(&[StatKind::Stamina]);
        assert_eq!(effectiveness(&strong, &tough), ADVANTAGE);
        assert_eq!(effectiveness(&tough, &strong), DISADVANTAGE);
    }

    #[test]
    fn test_dominant_stat_fallback() {
        let mut brute = with(&[]);
        brute.base_stats = BaseStats::new(1, 9, 1, 1, 1);
        let mage = with(&[StatKind::Magic]);
        // strength vs magic: no relation
        assert_eq!(effectiveness(&brute, &mage), 1.0);

        let energetic = with(&[StatKind::Energy]);
        assert_eq!(effectiveness(&energetic, &brute), ADVANTAGE);
    }

    #[test]
    fn test_product_is_clamped() {
        // energy+magic against strength+energy: 1.3 (energy>strength) × 1.3 (magic>energy) = 1.69
        let attacker = with(&[StatKind::Energy, StatKind::Magic]);
        let defender = with(&[StatKind::Strength, StatKind::Energy]);
        let value = effectiveness(&attacker, &defender);
        assert!((value - 1.69).abs() < 1e-9);

        for a in StatKind::CYCLE {
            for b in StatKind::CYCLE {
                let e = effectiveness(&with(&[a, b]), &with(&[b.beats(), a.beats()]));
                assert!((MIN_EFFECTIVENESS..=MAX_EFFECTIVENESS).contains(&e));
            }
        }
    }
}
