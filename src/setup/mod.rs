//! Battle setup: deck allocation and battle construction.
//!
//! - `SideAllocation`: the creatures, tools and spells one side starts with
//! - `DeckGenerator`: supplies allocations (`StandardDeckGenerator` draws
//!   rarity-weighted creatures from a `SpeciesRegistry`; `FixedAllocations`
//!   hands out prepared ones)
//! - `BattleBuilder`: wires config, difficulty and a generator into an
//!   engine plus a state already in the battle phase

pub mod builder;
pub mod generator;

use serde::{Deserialize, Serialize};

use crate::creatures::Creature;
use crate::items::Item;

pub use builder::BattleBuilder;
pub use generator::{DeckGenerator, FixedAllocations, StandardDeckGenerator};

/// What one side brings into a battle.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SideAllocation {
    /// Deck order; the front is drawn first.
    pub creatures: Vec<Creature>,
    pub tools: Vec<Item>,
    pub spells: Vec<Item>,
}

impl SideAllocation {
    #[must_use]
    pub fn new(creatures: Vec<Creature>) -> Self {
        Self {
            creatures,
            tools: Vec::new(),
            spells: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_tools(mut self, tools: Vec<Item>) -> Self {
        self.tools = tools;
        self
    }

    #[must_use]
    pub fn with_spells(mut self, spells: Vec<Item>) -> Self {
        self.spells = spells;
        self
    }
}
