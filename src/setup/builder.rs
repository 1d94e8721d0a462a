//! Battle construction.

use crate::core::{
    BattleConfig, BattleState, Difficulty, DifficultyProvider, GameRng, IdAllocator, SetupError,
    Side, StandardDifficulty,
};
use crate::rules::BattleEngine;

use super::generator::{DeckGenerator, StandardDeckGenerator};

/// Builds an engine and a state ready for the first player action.
///
/// ```
/// use creature_clash::core::{Difficulty, Phase};
/// use creature_clash::setup::BattleBuilder;
///
/// let (engine, state) = BattleBuilder::new().difficulty(Difficulty::Hard).build(42).unwrap();
///
/// assert_eq!(state.phase, Phase::Battle);
/// assert_eq!(engine.difficulty().tier, Difficulty::Hard);
/// ```
pub struct BattleBuilder {
    config: BattleConfig,
    difficulty: Difficulty,
    provider: Box<dyn DifficultyProvider>,
    generator: Box<dyn DeckGenerator>,
}

impl Default for BattleBuilder {
    fn default() -> Self {
        Self {
            config: BattleConfig::default(),
            difficulty: Difficulty::default(),
            provider: Box::new(StandardDifficulty),
            generator: Box::new(StandardDeckGenerator::default()),
        }
    }
}

impl BattleBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn config(mut self, config: BattleConfig) -> Self {
        self.config = config;
        self
    }

    pub fn difficulty(mut self, tier: Difficulty) -> Self {
        self.difficulty = tier;
        self
    }

    pub fn provider(mut self, provider: impl DifficultyProvider + 'static) -> Self {
        self.provider = Box::new(provider);
        self
    }

    pub fn generator(mut self, generator: impl DeckGenerator + 'static) -> Self {
        self.generator = Box::new(generator);
        self
    }

    /// Generate both allocations and move the battle into its first turn.
    ///
    /// Decks come from a stream derived from `seed`, separate from the
    /// battle RNG, so the same seed always deals the same decks.
    pub fn build(self, seed: u64) -> Result<(BattleEngine, BattleState), SetupError> {
        let engine = BattleEngine::new(self.config, self.provider.config(self.difficulty));

        let mut deck_rng = GameRng::new(seed).for_context("decks");
        let mut ids = IdAllocator::starting_at(1);
        let player = self
            .generator
            .generate(Side::Player, self.difficulty, &mut ids, &mut deck_rng);
        let opponent = self
            .generator
            .generate(Side::Opponent, self.difficulty, &mut ids, &mut deck_rng);

        let state = BattleState::new(seed, self.difficulty);
        let state = engine.enter_team_select(&state)?;
        let state = engine.start_battle(&state, player, opponent)?;
        Ok((engine, state))
    }
}
