//! Battle sides and per-side data storage.
//!
//! ## Side
//!
//! A battle always has exactly two sides: the human `Player` and the
//! AI-controlled `Opponent`. The player acts first in every cycle.
//!
//! ## SideMap
//!
//! Fixed two-slot storage indexed by `Side`, so per-side data never needs a
//! hash lookup and both sides are always present.

use serde::{Deserialize, Serialize};
use std::ops::{Index, IndexMut};

/// One of the two battle sides.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    /// The human-controlled side. Acts first each cycle.
    Player,
    /// The AI-controlled side. Its end-turn closes a cycle.
    Opponent,
}

impl Side {
    /// Both sides in turn order.
    pub const BOTH: [Side; 2] = [Side::Player, Side::Opponent];

    /// The other side.
    #[must_use]
    pub const fn opponent(self) -> Self {
        match self {
            Side::Player => Side::Opponent,
            Side::Opponent => Side::Player,
        }
    }

    /// Slot index (0 for player, 1 for opponent).
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Side::Player => 0,
            Side::Opponent => 1,
        }
    }

    /// Whether this side's end-turn completes a full cycle.
    #[must_use]
    pub const fn closes_cycle(self) -> bool {
        matches!(self, Side::Opponent)
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::Player => write!(f, "Player"),
            Side::Opponent => write!(f, "Opponent"),
        }
    }
}

/// Per-side data storage with O(1) access.
///
/// ## Example
///
/// ```
/// use creature_clash::core::{Side, SideMap};
///
/// let mut energy: SideMap<i32> = SideMap::new(|_| 10);
/// energy[Side::Opponent] = 12;
///
/// assert_eq!(energy[Side::Player], 10);
/// assert_eq!(energy[Side::Opponent], 12);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SideMap<T> {
    data: [T; 2],
}

impl<T> SideMap<T> {
    /// Create a new SideMap with values from a factory function.
    pub fn new(factory: impl Fn(Side) -> T) -> Self {
        Self {
            data: [factory(Side::Player), factory(Side::Opponent)],
        }
    }

    /// Create from explicit values.
    pub fn from_pair(player: T, opponent: T) -> Self {
        Self {
            data: [player, opponent],
        }
    }

    /// Create a new SideMap with all entries set to the same value.
    pub fn with_value(value: T) -> Self
    where
        T: Clone,
    {
        Self::new(|_| value.clone())
    }

    /// Get a reference to a side's data.
    #[must_use]
    pub fn get(&self, side: Side) -> &T {
        &self.data[side.index()]
    }

    /// Get a mutable reference to a side's data.
    pub fn get_mut(&mut self, side: Side) -> &mut T {
        &mut self.data[side.index()]
    }

    /// Iterate over (Side, &T) pairs in turn order.
    pub fn iter(&self) -> impl Iterator<Item = (Side, &T)> {
        Side::BOTH.into_iter().zip(self.data.iter())
    }

    /// Iterate over (Side, &mut T) pairs in turn order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (Side, &mut T)> {
        Side::BOTH.into_iter().zip(self.data.iter_mut())
    }
}

impl<T: Default> Default for SideMap<T> {
    fn default() -> Self {
        Self::new(|_| T::default())
    }
}

impl<T> Index<Side> for SideMap<T> {
    type Output = T;

    fn index(&self, side: Side) -> &Self::Output {
        self.get(side)
    }
}

impl<T> IndexMut<Side> for SideMap<T> {
    fn index_mut(&mut self, side: Side) -> &mut Self::Output {
        self.get_mut(side)
    }
}
