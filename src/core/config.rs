//! Battle configuration and difficulty tuning.
//!
//! - `BattleConfig`: rules constants for the energy economy, field size,
//!   action costs and combo scaling
//! - `Difficulty` / `DifficultyConfig`: per-tier numeric knobs for the AI
//!   side (regen bonus, batching probability, noise, batch caps)
//! - `DifficultyProvider`: the collaborator that supplies those knobs
//!
//! None of the AI knobs are hard-coded in the planner; it always reads them
//! from a `DifficultyConfig`.

use serde::{Deserialize, Serialize};

/// Rules constants for a battle.
///
/// Deserializing fills missing fields from `Default`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BattleConfig {
    /// Energy ceiling; every spend and regen clamps into `[0, max_energy]`.
    pub max_energy: i32,

    /// Field capacity per side.
    pub max_field_size: usize,

    /// Flat energy regenerated per full cycle.
    pub base_regen: i32,

    /// Sides above this energy decay at the end of the opponent's turn.
    pub decay_threshold: i32,

    /// Fraction of current energy lost to decay (floored).
    pub decay_rate: f64,

    /// Energy cost of an attack.
    pub attack_cost: i32,

    /// Energy cost of a defend.
    pub defend_cost: i32,

    /// Consecutive actions needed for the combo attack buff.
    pub combo_threshold: u32,

    /// Flat physical and magical attack granted by a combo.
    pub combo_attack_bonus: i32,

    /// Damage scaling per consecutive action (`1 + step × actions`).
    pub combo_step: f64,

    /// Momentum converted to one point of bonus regen.
    pub momentum_divisor: i32,

    /// Maximum bonus regen from momentum.
    pub momentum_cap: i32,

    /// Hand size above which turn-start draws are skipped.
    pub max_hand_size: usize,

    /// Opening hand size drawn when the battle starts.
    pub opening_hand_size: usize,

    /// Energy the player side starts with.
    pub player_starting_energy: i32,

    /// Damage reduction granted by a defend.
    pub defend_reduction: f64,
}

impl Default for BattleConfig {
    fn default() -> Self {
        Self {
            max_energy: 25,
            max_field_size: 4,
            base_regen: 3,
            decay_threshold: 10,
            decay_rate: 0.10,
            attack_cost: 2,
            defend_cost: 1,
            combo_threshold: 3,
            combo_attack_bonus: 2,
            combo_step: 0.05,
            momentum_divisor: 5,
            momentum_cap: 3,
            max_hand_size: 5,
            opening_hand_size: 3,
            player_starting_energy: 10,
            defend_reduction: 0.5,
        }
    }
}

impl BattleConfig {
    /// Set the field capacity.
    #[must_use]
    pub fn with_max_field_size(mut self, size: usize) -> Self {
        self.max_field_size = size;
        self
    }

    /// Set the player's starting energy.
    #[must_use]
    pub fn with_player_starting_energy(mut self, energy: i32) -> Self {
        self.player_starting_energy = energy;
        self
    }

    /// Set the opening hand size.
    #[must_use]
    pub fn with_opening_hand_size(mut self, size: usize) -> Self {
        self.opening_hand_size = size;
        self
    }

    /// Clamp an energy value into the legal range.
    #[must_use]
    pub fn clamp_energy(&self, energy: i32) -> i32 {
        energy.clamp(0, self.max_energy)
    }

    /// Damage multiplier for a side with `consecutive_actions` this turn.
    #[must_use]
    pub fn combo_multiplier(&self, consecutive_actions: u32) -> f64 {
        1.0 + self.combo_step * f64::from(consecutive_actions)
    }

    /// Bonus regen earned from accumulated momentum.
    #[must_use]
    pub fn momentum_bonus(&self, momentum: i32) -> i32 {
        if self.momentum_divisor <= 0 {
            return 0;
        }
        (momentum.max(0) / self.momentum_divisor).min(self.momentum_cap)
    }

    /// Energy lost to decay at `energy`, zero at or below the threshold.
    #[must_use]
    pub fn decay_amount(&self, energy: i32) -> i32 {
        if energy > self.decay_threshold {
            (f64::from(energy) * self.decay_rate).floor() as i32
        } else {
            0
        }
    }
}

/// AI difficulty tier.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
    Expert,
}

impl Difficulty {
    /// All tiers, easiest first.
    pub const ALL: [Difficulty; 4] = [
        Difficulty::Easy,
        Difficulty::Medium,
        Difficulty::Hard,
        Difficulty::Expert,
    ];

    /// Parse a tier name (case-insensitive).
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "easy" => Some(Difficulty::Easy),
            "medium" => Some(Difficulty::Medium),
            "hard" => Some(Difficulty::Hard),
            "expert" => Some(Difficulty::Expert),
            _ => None,
        }
    }
}

impl std::fmt::Display for Difficulty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
            Difficulty::Expert => "expert",
        };
        f.write_str(name)
    }
}

/// Numeric knobs for one difficulty tier.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DifficultyConfig {
    /// Tier these knobs belong to.
    pub tier: Difficulty,

    /// Extra energy regenerated by the AI side each cycle.
    pub regen_bonus: i32,

    /// How many turns ahead the planner looks when weighing lethal lines.
    pub predictive_depth: u32,

    /// Probability that the planner submits a multi-action batch.
    pub multi_action_probability: f64,

    /// Bias toward aggressive strategies in `[0, 1]`.
    pub aggression_bias: f64,

    /// Field capacity for the AI side.
    pub max_field_size: usize,

    /// Energy the AI side starts with.
    pub starting_energy: i32,

    /// Maximum actions in one planned batch.
    pub max_batch_actions: usize,

    /// Chance to pick a random attack target instead of the best one.
    pub random_target_chance: f64,

    /// Chance to deploy a random affordable creature instead of the best one.
    pub suboptimal_deploy_chance: f64,
}

impl DifficultyConfig {
    /// Default knobs for a tier.
    #[must_use]
    pub fn for_tier(tier: Difficulty) -> Self {
        match tier {
            Difficulty::Easy => Self {
                tier,
                regen_bonus: 0,
                predictive_depth: 1,
                multi_action_probability: 0.30,
                aggression_bias: 0.30,
                max_field_size: 4,
                starting_energy: 8,
                max_batch_actions: 3,
                random_target_chance: 0.40,
                suboptimal_deploy_chance: 0.30,
            },
            Difficulty::Medium => Self {
                tier,
                regen_bonus: 1,
                predictive_depth: 1,
                multi_action_probability: 0.55,
                aggression_bias: 0.50,
                max_field_size: 4,
                starting_energy: 10,
                max_batch_actions: 4,
                random_target_chance: 0.15,
                suboptimal_deploy_chance: 0.10,
            },
            Difficulty::Hard => Self {
                tier,
                regen_bonus: 2,
                predictive_depth: 2,
                multi_action_probability: 0.80,
                aggression_bias: 0.70,
                max_field_size: 4,
                starting_energy: 12,
                max_batch_actions: 5,
                random_target_chance: 0.05,
                suboptimal_deploy_chance: 0.0,
            },
            Difficulty::Expert => Self {
                tier,
                regen_bonus: 3,
                predictive_depth: 3,
                multi_action_probability: 1.0,
                aggression_bias: 0.90,
                max_field_size: 4,
                starting_energy: 14,
                max_batch_actions: 7,
                random_target_chance: 0.0,
                suboptimal_deploy_chance: 0.0,
            },
        }
    }

    /// Override the batching probability.
    #[must_use]
    pub fn with_multi_action_probability(mut self, p: f64) -> Self {
        self.multi_action_probability = p;
        self
    }

    /// Override the noise knobs.
    #[must_use]
    pub fn with_noise(mut self, random_target: f64, suboptimal_deploy: f64) -> Self {
        self.random_target_chance = random_target;
        self.suboptimal_deploy_chance = suboptimal_deploy;
        self
    }

    /// Override the starting energy.
    #[must_use]
    pub fn with_starting_energy(mut self, energy: i32) -> Self {
        self.starting_energy = energy;
        self
    }
}

impl Default for DifficultyConfig {
    fn default() -> Self {
        Self::for_tier(Difficulty::default())
    }
}

/// Supplies difficulty knobs per tier.
pub trait DifficultyProvider {
    /// Knobs for `tier`.
    fn config(&self, tier: Difficulty) -> DifficultyConfig;
}

/// The built-in tier table.
#[derive(Clone, Copy, Debug, Default)]
pub struct StandardDifficulty;

impl DifficultyProvider for StandardDifficulty {
    fn config(&self, tier: Difficulty) -> DifficultyConfig {
        DifficultyConfig::for_tier(tier)
    }
}
