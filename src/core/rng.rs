//! Deterministic random number generation.
//!
//! ## Key Features
//!
//! - **Deterministic**: Same seed produces identical sequence
//! - **Context streams**: Deck generation and the AI planner each get their
//!   own named stream so they never perturb the battle's own rolls
//! - **Serializable**: O(1) state capture and restore for replays
//!
//! The battle RNG lives inside `BattleState`, which makes every transition a
//! pure function of `(state, action)`.
//!
//! ```
//! use creature_clash::core::GameRng;
//!
//! let battle = GameRng::new(42);
//! let mut planner = battle.for_context("planner");
//!
//! // Same seed and context, same sequence.
//! let mut planner2 = GameRng::new(42).for_context("planner");
//! assert_eq!(planner.gen_range(0..100), planner2.gen_range(0..100));
//! ```

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};

/// Deterministic RNG with named context streams.
///
/// Uses ChaCha8 for speed while maintaining high-quality randomness.
/// Serializes as its `GameRngState`.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(from = "GameRngState", into = "GameRngState")]
pub struct GameRng {
    inner: ChaCha8Rng,
    seed: u64,
}

impl GameRng {
    /// Create a new RNG with the given seed.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            inner: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }

    /// Create an independent stream for a specific context.
    ///
    /// The same context always produces the same stream from the same seed.
    #[must_use]
    pub fn for_context(&self, context: &str) -> Self {
        use std::collections::hash_map::DefaultHasher;

        let mut hasher = DefaultHasher::new();
        self.seed.hash(&mut hasher);
        context.hash(&mut hasher);
        let context_seed = hasher.finish();

        Self {
            inner: ChaCha8Rng::seed_from_u64(context_seed),
            seed: context_seed,
        }
    }

    /// Generate a random integer in the given range.
    pub fn gen_range(&mut self, range: std::ops::Range<i32>) -> i32 {
        self.inner.gen_range(range)
    }

    /// Generate a random usize in the given range.
    pub fn gen_range_usize(&mut self, range: std::ops::Range<usize>) -> usize {
        self.inner.gen_range(range)
    }

    /// Generate a float uniformly in `[low, high)`.
    ///
    /// Returns `low` when the range is empty.
    pub fn gen_f64(&mut self, low: f64, high: f64) -> f64 {
        if high <= low {
            return low;
        }
        self.inner.gen_range(low..high)
    }

    /// Roll a percentage in `[0, 100)`.
    pub fn roll_percent(&mut self) -> f64 {
        self.inner.gen::<f64>() * 100.0
    }

    /// Generate a random boolean with given probability of true.
    ///
    /// Probabilities outside `[0, 1]` are clamped.
    pub fn gen_bool(&mut self, probability: f64) -> bool {
        let p = if probability.is_finite() { probability.clamp(0.0, 1.0) } else { 0.0 };
        self.inner.gen_bool(p)
    }

    /// Shuffle a slice in place.
    pub fn shuffle<T>(&mut self, slice: &mut [T]) {
        use rand::seq::SliceRandom;
        slice.shuffle(&mut self.inner);
    }

    /// Choose a random element from a slice.
    #[must_use]
    pub fn choose<'a, T>(&mut self, slice: &'a [T]) -> Option<&'a T> {
        use rand::seq::SliceRandom;
        slice.choose(&mut self.inner)
    }

    /// Choose a random element with weighted probability.
    ///
    /// Returns the index of the chosen element, or `None` if weights are
    /// empty or all zero.
    pub fn choose_weighted(&mut self, weights: &[f32]) -> Option<usize> {
        if weights.is_empty() {
            return None;
        }

        let total: f32 = weights.iter().sum();
        if total <= 0.0 {
            return None;
        }

        let mut threshold = self.inner.gen::<f32>() * total;

        for (i, &weight) in weights.iter().enumerate() {
            threshold -= weight;
            if threshold <= 0.0 {
                return Some(i);
            }
        }

        // Floating point edge case - return last index
        Some(weights.len() - 1)
    }

    /// Get the current state for serialization.
    #[must_use]
    pub fn state(&self) -> GameRngState {
        GameRngState {
            seed: self.seed,
            word_pos: self.inner.get_word_pos(),
        }
    }

    /// Restore from a saved state.
    #[must_use]
    pub fn from_state(state: &GameRngState) -> Self {
        let mut inner = ChaCha8Rng::seed_from_u64(state.seed);
        inner.set_word_pos(state.word_pos);
        Self {
            inner,
            seed: state.seed,
        }
    }
}

impl From<GameRngState> for GameRng {
    fn from(state: GameRngState) -> Self {
        Self::from_state(&state)
    }
}

impl From<GameRng> for GameRngState {
    fn from(rng: GameRng) -> Self {
        rng.state()
    }
}

impl PartialEq for GameRng {
    fn eq(&self, other: &Self) -> bool {
        self.state() == other.state()
    }
}

/// Serializable RNG state for checkpointing and replay.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameRngState {
    /// Original seed
    pub seed: u64,
    /// ChaCha8 word position (128-bit counter)
    pub word_pos: u128,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_determinism() {
        let mut rng1 = GameRng::new(42);
        let mut rng2 = GameRng::new(42);

        for _ in 0..100 {
            assert_eq!(rng1.gen_range(0..1000), rng2.gen_range(0..1000));
        }
    }

    #[test]
    fn test_context_differs_from_parent() {
        let mut rng = GameRng::new(42);
        let mut planner = rng.for_context("planner");

        let seq1: Vec<_> = (0..10).map(|_| rng.gen_range(0..1000)).collect();
        let seq2: Vec<_> = (0..10).map(|_| planner.gen_range(0..1000)).collect();

        assert_ne!(seq1, seq2);
    }

    #[test]
    fn test_context_is_deterministic() {
        let mut ctx1 = GameRng::new(42).for_context("deck");
        let mut ctx2 = GameRng::new(42).for_context("deck");

        for _ in 0..10 {
            assert_eq!(ctx1.gen_range(0..1000), ctx2.gen_range(0..1000));
        }
    }

    #[test]
    fn test_serde_resumes_sequence() {
        let mut rng = GameRng::new(5);
        rng.gen_range(0..10);

        let json = serde_json::to_string(&rng).unwrap();
        let mut restored: GameRng = serde_json::from_str(&json).unwrap();

        assert_eq!(rng.gen_range(0..1000), restored.gen_range(0..1000));
    }

    #[test]
    fn test_gen_f64_bounds() {
        let mut rng = GameRng::new(7);
        for _ in 0..200 {
            let v = rng.gen_f64(0.85, 1.15);
            assert!((0.85..1.15).contains(&v));
        }
        assert_eq!(rng.gen_f64(1.0, 1.0), 1.0);
    }

    #[test]
    fn test_gen_bool_clamps() {
        let mut rng = GameRng::new(7);
        assert!(rng.gen_bool(2.0));
        assert!(!rng.gen_bool(-1.0));
        assert!(!rng.gen_bool(f64::NAN));
    }

    #[test]
    fn test_choose_weighted() {
        let mut rng = GameRng::new(42);

        let weights = vec![100.0, 0.0, 0.0];
        for _ in 0..10 {
            assert_eq!(rng.choose_weighted(&weights), Some(0));
        }

        assert_eq!(rng.choose_weighted(&[]), None);
        assert_eq!(rng.choose_weighted(&[0.0, 0.0]), None);
    }

    #[test]
    fn test_state_roundtrip_continues_sequence() {
        let mut rng = GameRng::new(42);
        for _ in 0..100 {
            rng.gen_range(0..1000);
        }

        let state = rng.state();
        let expected: Vec<_> = (0..10).map(|_| rng.gen_range(0..1000)).collect();

        let mut restored = GameRng::from_state(&state);
        let actual: Vec<_> = (0..10).map(|_| restored.gen_range(0..1000)).collect();

        assert_eq!(expected, actual);
    }

    #[test]
    fn test_equality_tracks_position() {
        let mut a = GameRng::new(1);
        let b = GameRng::new(1);
        assert_eq!(a, b);

        a.roll_percent();
        assert_ne!(a, b);
    }
}
