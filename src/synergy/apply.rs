//! Applying synergies to a field.

use super::detect::check_field_synergies;
use super::Synergy;
use crate::creatures::Creature;

/// Fully recompute every creature against `synergies`.
///
/// Stats are re-derived from base data and current health is rescaled by
/// ratio, so calling this twice with the same set changes nothing.
pub fn apply_synergies<'a>(
    field: impl IntoIterator<Item = &'a mut Creature>,
    synergies: &[Synergy],
) {
    for creature in field {
        creature.recompute(synergies);
    }
}

/// Detect the field's synergies, recompute every member and return the set.
pub fn refresh_field(field: &mut im::Vector<Creature>, max_field_size: usize) -> Vec<Synergy> {
    let synergies = check_field_synergies(field.iter(), max_field_size);
    apply_synergies(field.iter_mut(), &synergies);
    synergies
}
