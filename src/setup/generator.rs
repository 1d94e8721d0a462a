//! Deck generation.

use tracing::debug;

use crate::core::{Difficulty, GameRng, IdAllocator, Side, SideMap};
use crate::creatures::{Rarity, SpeciesRegistry};
use crate::items::{standard_spells, standard_tools};

use super::SideAllocation;

/// Supplies the starting allocation of each side.
pub trait DeckGenerator {
    /// Allocation for `side` in a battle at tier `difficulty`.
    ///
    /// Every creature and item must take its id from `ids`.
    fn generate(
        &self,
        side: Side,
        difficulty: Difficulty,
        ids: &mut IdAllocator,
        rng: &mut GameRng,
    ) -> SideAllocation;
}

/// Random rarity-weighted decks from a species registry.
#[derive(Clone, Debug)]
pub struct StandardDeckGenerator {
    registry: SpeciesRegistry,
    deck_size: usize,
    tools_per_side: usize,
    spells_per_side: usize,
}

impl Default for StandardDeckGenerator {
    fn default() -> Self {
        Self::new(SpeciesRegistry::standard())
    }
}

impl StandardDeckGenerator {
    #[must_use]
    pub fn new(registry: SpeciesRegistry) -> Self {
        Self {
            registry,
            deck_size: 6,
            tools_per_side: 2,
            spells_per_side: 2,
        }
    }

    #[must_use]
    pub fn with_deck_size(mut self, size: usize) -> Self {
        self.deck_size = size;
        self
    }

    #[must_use]
    pub fn with_items(mut self, tools: usize, spells: usize) -> Self {
        self.tools_per_side = tools;
        self.spells_per_side = spells;
        self
    }

    /// Form level for a creature of `rarity`: higher rarities skew mature.
    fn roll_form(rarity: Rarity, rng: &mut GameRng) -> u8 {
        let ceiling = match rarity {
            Rarity::Common => 1,
            Rarity::Rare => 2,
            Rarity::Epic | Rarity::Legendary => 3,
        };
        rng.gen_range(0..ceiling + 1) as u8
    }
}

impl DeckGenerator for StandardDeckGenerator {
    fn generate(
        &self,
        side: Side,
        difficulty: Difficulty,
        ids: &mut IdAllocator,
        rng: &mut GameRng,
    ) -> SideAllocation {
        let species: Vec<_> = self.registry.iter().collect();
        let weights: Vec<f32> = Rarity::ALL.iter().map(|r| r.draw_weight()).collect();

        let mut creatures = Vec::with_capacity(self.deck_size);
        if !species.is_empty() {
            for _ in 0..self.deck_size {
                let template = species[rng.gen_range_usize(0..species.len())];
                let rarity = rng
                    .choose_weighted(&weights)
                    .map_or(Rarity::Common, |i| Rarity::ALL[i]);
                let form = Self::roll_form(rarity, rng);
                creatures.push(template.instantiate(ids.creature(), rarity, form));
            }
        }

        let mut tools = standard_tools(ids);
        rng.shuffle(&mut tools);
        tools.truncate(self.tools_per_side);

        let mut spells = standard_spells(ids);
        rng.shuffle(&mut spells);
        spells.truncate(self.spells_per_side);

        debug!(
            %side,
            tier = %difficulty,
            creatures = creatures.len(),
            tools = tools.len(),
            spells = spells.len(),
            "generated allocation"
        );
        SideAllocation {
            creatures,
            tools,
            spells,
        }
    }
}

/// Prepared allocations handed out as-is.
///
/// Ids are taken from the prepared data; the allocator is left alone.
#[derive(Clone, Debug, Default)]
pub struct FixedAllocations {
    allocations: SideMap<SideAllocation>,
}

impl FixedAllocations {
    #[must_use]
    pub fn new(player: SideAllocation, opponent: SideAllocation) -> Self {
        Self {
            allocations: SideMap::from_pair(player, opponent),
        }
    }
}

impl DeckGenerator for FixedAllocations {
    fn generate(
        &self,
        side: Side,
        _difficulty: Difficulty,
        _ids: &mut IdAllocator,
        _rng: &mut GameRng,
    ) -> SideAllocation {
        self.allocations[side].clone()
    }
}
