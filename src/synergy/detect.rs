//! Synergy detection.
//!
//! Rules are evaluated in a fixed order and each fires at most once per
//! evaluation, so the output is stable for a given field.

use smallvec::SmallVec;

use super::{Synergy, SynergyKind, SynergyScope};
use crate::creatures::{Creature, Rarity, StatKind};

/// Stat pairs that combine into a complementary synergy, in priority order.
pub const COMPLEMENTARY_PAIRS: [(StatKind, StatKind); 5] = [
    (StatKind::Strength, StatKind::Stamina),
    (StatKind::Magic, StatKind::Energy),
    (StatKind::Speed, StatKind::Strength),
    (StatKind::Stamina, StatKind::Magic),
    (StatKind::Energy, StatKind::Speed),
];

const SPECIES_STEP: f64 = 0.05;
const SPECIES_MAX_STEPS: usize = 3;
const LEGENDARY_BONUS: f64 = 0.05;
const COMPLEMENTARY_BONUS: f64 = 0.06;
const COMPLEMENTARY_THRESHOLD: i32 = 7;
const BALANCED_BONUS: f64 = 0.05;
const BALANCED_MIN_FIELD: usize = 3;
const BALANCED_MIN_SPECIALTIES: u32 = 4;
const FULL_FORCE_BONUS: f64 = 0.025;
const FULL_FORCE_INITIATIVE: i32 = 3;

/// Detect every synergy on `field`.
///
/// `max_field_size` decides when the full force synergy fires.
#[must_use]
pub fn check_field_synergies<'a>(
    field: impl IntoIterator<Item = &'a Creature>,
    max_field_size: usize,
) -> Vec<Synergy> {
    let members: SmallVec<[&Creature; 8]> = field.into_iter().filter(|c| c.is_alive()).collect();
    let mut synergies = Vec::new();

    if let Some(s) = species_synergy(&members) {
        synergies.push(s);
    }
    if members.iter().any(|c| c.rarity == Rarity::Legendary) {
        synergies.push(Synergy::new(
            SynergyKind::Legendary,
            LEGENDARY_BONUS,
            SynergyScope::NonLegendary,
        ));
    }
    if let Some((a, b)) = complementary_pair(&members) {
        synergies.push(Synergy::new(
            SynergyKind::Complementary(a, b),
            COMPLEMENTARY_BONUS,
            SynergyScope::AllMembers,
        ));
    }
    if members.len() >= BALANCED_MIN_FIELD
        && distinct_specialties(&members) >= BALANCED_MIN_SPECIALTIES
    {
        synergies.push(Synergy::new(
            SynergyKind::Balanced,
            BALANCED_BONUS,
            SynergyScope::AllMembers,
        ));
    }
    if max_field_size > 0 && members.len() >= max_field_size {
        synergies.push(
            Synergy::new(SynergyKind::FullForce, FULL_FORCE_BONUS, SynergyScope::AllMembers)
                .with_initiative(FULL_FORCE_INITIATIVE),
        );
    }

    synergies
}

/// The most common species, if it has two or more members.
///
/// Ties go to the species that appears first on the field.
fn species_synergy(members: &[&Creature]) -> Option<Synergy> {
    let mut counts: SmallVec<[(&str, usize); 8]> = SmallVec::new();
    for creature in members {
        match counts.iter_mut().find(|(name, _)| *name == creature.species) {
            Some((_, n)) => *n += 1,
            None => counts.push((creature.species.as_str(), 1)),
        }
    }

    let mut best: Option<(&str, usize)> = None;
    for &(name, count) in &counts {
        if best.map_or(true, |(_, n)| count > n) {
            best = Some((name, count));
        }
    }

    let (species, count) = best?;
    if count < 2 {
        return None;
    }
    let steps = (count - 1).min(SPECIES_MAX_STEPS);
    Some(Synergy::new(
        SynergyKind::Species,
        SPECIES_STEP * steps as f64,
        SynergyScope::Species(species.to_string()),
    ))
}

/// The first pair for which two distinct members each cover one half.
fn complementary_pair(members: &[&Creature]) -> Option<(StatKind, StatKind)> {
    COMPLEMENTARY_PAIRS.into_iter().find(|&(a, b)| {
        members.iter().enumerate().any(|(i, first)| {
            first.base_stats.sanitized().get(a) >= COMPLEMENTARY_THRESHOLD
                && members.iter().enumerate().any(|(j, second)| {
                    i != j && second.base_stats.sanitized().get(b) >= COMPLEMENTARY_THRESHOLD
                })
        })
    })
}

fn distinct_specialties(members: &[&Creature]) -> u32 {
    let mask = members
        .iter()
        .flat_map(|c| c.specialties.iter())
        .fold(0u8, |mask, stat| mask | (1 << stat.cycle_index()));
    mask.count_ones()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::CreatureId;
    use crate::creatures::BaseStats;

    fn member(
        id: u32,
        species: &str,
        rarity: Rarity,
        stats: BaseStats,
        specialties: &[StatKind],
    ) -> Creature {
        Creature::new(CreatureId(id), species, rarity, 0, stats).with_specialties(specialties)
    }

    fn plain(id: u32, species: &str) -> Creature {
        member(id, species, Rarity::Common, BaseStats::uniform(5), &[])
    }

    #[test]
    fn test_empty_field() {
        let field: Vec<Creature> = Vec::new();
        assert!(check_field_synergies(&field, 4).is_empty());
    }

    #[test]
    fn test_two_of_a_species() {
        let field = vec![plain(1, "Cinderpup"), plain(2, "Cinderpup")];
        let synergies = check_field_synergies(&field, 4);

        assert_eq!(synergies.len(), 1);
        assert_eq!(synergies[0].kind, SynergyKind::Species);
        assert!((synergies[0].bonus - 0.05).abs() < 1e-12);
        assert_eq!(synergies[0].scope, SynergyScope::Species("Cinderpup".into()));
    }

    #[test]
    fn test_species_bonus_is_capped_and_single() {
        let field: Vec<_> = (0..4).map(|i| plain(i, "Mossback")).collect();
        let synergies = check_field_synergies(&field, 5);
        let species: Vec<_> = synergies.iter().filter(|s| s.kind == SynergyKind::Species).collect();

        assert_eq!(species.len(), 1);
        assert!((species[0].bonus - 0.15).abs() < 1e-12);
    }

    #[test]
    fn test_legendary_boosts_others_only() {
        let legend = member(1, "Skyking", Rarity::Legendary, BaseStats::uniform(5), &[]);
        let ally = plain(2, "Gustling");
        let synergies = check_field_synergies(&[legend.clone(), ally.clone()], 4);

        let legendary = synergies.iter().find(|s| s.kind == SynergyKind::Legendary).unwrap();
        assert!(!legendary.applies_to(&legend));
        assert!(legendary.applies_to(&ally));
    }

    #[test]
    fn test_complementary_needs_two_members() {
        let solo = member(1, "Ironhorn", Rarity::Common, BaseStats::new(3, 8, 2, 8, 3), &[]);
        assert!(check_field_synergies(&[solo.clone()], 4).is_empty());

        let partner = member(2, "Mossback", Rarity::Common, BaseStats::new(3, 2, 2, 9, 2), &[]);
        let synergies = check_field_synergies(&[solo, partner], 4);
        assert_eq!(
            synergies[0].kind,
            SynergyKind::Complementary(StatKind::Strength, StatKind::Stamina)
        );
        assert_eq!(synergies.len(), 1);
    }

    #[test]
    fn test_balanced_and_full_force() {
        let field = vec![
            member(1, "A", Rarity::Common, BaseStats::uniform(5), &[StatKind::Strength]),
            member(2, "B", Rarity::Common, BaseStats::uniform(5), &[StatKind::Magic]),
            member(
                3,
                "C",
                Rarity::Common,
                BaseStats::uniform(5),
                &[StatKind::Speed, StatKind::Energy],
            ),
        ];
        let kinds: Vec<_> = check_field_synergies(&field, 3).iter().map(|s| s.kind).collect();
        assert_eq!(kinds, vec![SynergyKind::Balanced, SynergyKind::FullForce]);

        let full = check_field_synergies(&field, 3);
        assert_eq!(full[1].initiative_bonus, 3);
    }

    #[test]
    fn test_dead_members_do_not_count() {
        let field = vec![plain(1, "Cinderpup"), plain(2, "Cinderpup").with_health(0)];
        assert!(check_field_synergies(&field, 4).is_empty());
    }

    #[test]
    fn test_detection_is_stable() {
        let field = vec![plain(1, "X"), plain(2, "X"), plain(3, "Y"), plain(4, "Y")];
        let first = check_field_synergies(&field, 4);
        let second = check_field_synergies(&field, 4);
        assert_eq!(first, second);
        assert_eq!(first[0].scope, SynergyScope::Species("X".into()));
    }
}
