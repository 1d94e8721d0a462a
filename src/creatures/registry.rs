//! Species registry for template lookup.
//!
//! A `SpeciesTemplate` is the static half of a creature: base stats and
//! specialties shared by every member of a species. Rarity, form and id are
//! decided when the template is instantiated.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::attributes::{BaseStats, Rarity, StatKind};
use super::instance::Creature;
use crate::core::CreatureId;

/// Static species data.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpeciesTemplate {
    pub name: String,
    pub base_stats: BaseStats,
    #[serde(default)]
    pub specialties: SmallVec<[StatKind; 2]>,
}

impl SpeciesTemplate {
    pub fn new(name: impl Into<String>, base_stats: BaseStats, specialties: &[StatKind]) -> Self {
        Self {
            name: name.into(),
            base_stats,
            specialties: specialties.iter().copied().collect(),
        }
    }

    /// Build a creature of this species at full health.
    #[must_use]
    pub fn instantiate(&self, id: CreatureId, rarity: Rarity, form: u8) -> Creature {
        Creature::new(id, self.name.clone(), rarity, form, self.base_stats)
            .with_specialties(&self.specialties)
    }
}

/// Registry of species templates.
///
/// Iteration follows registration order so that generators built on top of
/// it stay deterministic.
///
/// ## Example
///
/// ```
/// use creature_clash::creatures::{BaseStats, SpeciesRegistry, SpeciesTemplate, StatKind};
///
/// let mut registry = SpeciesRegistry::new();
/// registry.register(SpeciesTemplate::new(
///     "Cinderpup",
///     BaseStats::new(4, 8, 3, 5, 6),
///     &[StatKind::Strength],
/// ));
///
/// let found = registry.get("Cinderpup").unwrap();
/// assert_eq!(found.base_stats.strength, 8);
/// ```
#[derive(Clone, Debug, Default)]
pub struct SpeciesRegistry {
    templates: Vec<SpeciesTemplate>,
    index: FxHashMap<String, usize>,
}

impl SpeciesRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in roster.
    #[must_use]
    pub fn standard() -> Self {
        use StatKind::*;

        let mut registry = Self::new();
        let roster = [
            ("Cinderpup", BaseStats::new(4, 8, 3, 5, 6), &[Strength][..]),
            ("Mossback", BaseStats::new(3, 5, 2, 9, 2), &[Stamina][..]),
            ("Gustling", BaseStats::new(4, 4, 4, 3, 9), &[Speed][..]),
            ("Runewisp", BaseStats::new(6, 2, 9, 3, 5), &[Magic][..]),
            ("Voltkit", BaseStats::new(9, 3, 5, 4, 5), &[Energy][..]),
            ("Ironhorn", BaseStats::new(3, 8, 2, 8, 3), &[Strength, Stamina][..]),
            ("Tidecaller", BaseStats::new(7, 2, 8, 5, 4), &[Magic, Energy][..]),
            ("Duskfang", BaseStats::new(4, 7, 3, 3, 8), &[Speed, Strength][..]),
            ("Glimmerbug", BaseStats::new(5, 4, 6, 5, 5), &[][..]),
            ("Stonewarden", BaseStats::new(5, 5, 7, 8, 2), &[Stamina, Magic][..]),
        ];
        for (name, stats, specialties) in roster {
            registry.register(SpeciesTemplate::new(name, stats, specialties));
        }
        registry
    }

    /// Register a template, replacing any existing one with the same name.
    ///
    /// Returns the replaced template.
    pub fn register(&mut self, template: SpeciesTemplate) -> Option<SpeciesTemplate> {
        match self.index.get(&template.name) {
            Some(&slot) => Some(std::mem::replace(&mut self.templates[slot], template)),
            None => {
                self.index.insert(template.name.clone(), self.templates.len());
                self.templates.push(template);
                None
            }
        }
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&SpeciesTemplate> {
        self.index.get(name).map(|&slot| &self.templates[slot])
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.templates.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    /// Templates in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &SpeciesTemplate> {
        self.templates.iter()
    }

    /// Templates that list `stat` as a specialty.
    pub fn with_specialty(&self, stat: StatKind) -> impl Iterator<Item = &SpeciesTemplate> {
        self.templates.iter().filter(move |t| t.specialties.contains(&stat))
    }
}
