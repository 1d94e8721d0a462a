//! The battle state machine.
//!
//! `BattleEngine::apply` is the single entry point that produces new
//! states. It never mutates its input and never fails: an invalid action
//! returns the state unchanged. `try_apply` and `validate` expose the
//! rejection reason for callers that want to show one.

use tracing::{debug, info};

use crate::core::{
    Action, ActionError, BattleConfig, BattleState, DifficultyConfig, Phase, SetupError, Side,
};
use crate::items::{ItemResolver, StandardItemResolver};
use crate::setup::SideAllocation;

/// Rules of a battle plus the collaborators it consults.
///
/// ## Example
///
/// ```
/// use creature_clash::core::{Action, BattleConfig, BattleState, Difficulty, DifficultyConfig};
/// use creature_clash::rules::BattleEngine;
///
/// let knobs = DifficultyConfig::for_tier(Difficulty::Easy);
/// let engine = BattleEngine::new(BattleConfig::default(), knobs);
/// let state = BattleState::new(7, Difficulty::Easy);
///
/// // Not in battle yet: the action is a no-op.
/// let next = engine.apply(&state, &Action::EndTurn);
/// assert_eq!(next, state);
/// ```
#[derive(Clone, Debug)]
pub struct BattleEngine<R = StandardItemResolver> {
    pub(super) config: BattleConfig,
    pub(super) difficulty: DifficultyConfig,
    pub(super) resolver: R,
}

impl BattleEngine<StandardItemResolver> {
    /// Create an engine with the standard item resolver.
    #[must_use]
    pub fn new(config: BattleConfig, difficulty: DifficultyConfig) -> Self {
        Self::with_resolver(config, difficulty, StandardItemResolver)
    }
}

impl Default for BattleEngine<StandardItemResolver> {
    fn default() -> Self {
        Self::new(BattleConfig::default(), DifficultyConfig::default())
    }
}

impl<R: ItemResolver> BattleEngine<R> {
    /// Create an engine with a custom item resolver.
    pub fn with_resolver(config: BattleConfig, difficulty: DifficultyConfig, resolver: R) -> Self {
        Self {
            config,
            difficulty,
            resolver,
        }
    }

    #[must_use]
    pub fn config(&self) -> &BattleConfig {
        &self.config
    }

    /// The item resolver the engine applies items with.
    #[must_use]
    pub fn resolver(&self) -> &R {
        &self.resolver
    }

    /// Knobs of the AI side's tier.
    #[must_use]
    pub fn difficulty(&self) -> &DifficultyConfig {
        &self.difficulty
    }

    /// Field capacity of `side`; the AI side uses its tier's limit.
    #[must_use]
    pub fn max_field_size(&self, side: Side) -> usize {
        match side {
            Side::Player => self.config.max_field_size,
            Side::Opponent => self.difficulty.max_field_size,
        }
    }

    /// Check an action against the state without applying it.
    pub fn validate(&self, state: &BattleState, action: &Action) -> Result<(), ActionError> {
        super::validate::validate_action(self, state, action)
    }

    /// Apply an action, or explain why it was rejected.
    pub fn try_apply(
        &self,
        state: &BattleState,
        action: &Action,
    ) -> Result<BattleState, ActionError> {
        self.validate(state, action)?;

        let mut next = state.clone();
        let side = next.active;
        next.record(side, action.clone());
        debug!(%side, %action, turn = next.turn, "applying action");

        match action {
            Action::Deploy { creature } => self.deploy(&mut next, side, *creature),
            Action::Attack { attacker, target, kind } => {
                self.attack(&mut next, side, *attacker, *target, *kind);
            }
            Action::Defend { creature } => self.defend(&mut next, side, *creature),
            Action::UseTool { tool, target } => {
                self.use_item(&mut next, side, *tool, None, *target)
            }
            Action::UseSpell { spell, caster, target } => {
                self.use_item(&mut next, side, *spell, Some(*caster), *target);
            }
            Action::EndTurn => self.end_turn(&mut next),
        }

        self.check_victory(&mut next);
        Ok(next)
    }

    /// Apply an action. Invalid actions leave the state unchanged.
    #[must_use]
    pub fn apply(&self, state: &BattleState, action: &Action) -> BattleState {
        match self.try_apply(state, action) {
            Ok(next) => next,
            Err(reason) => {
                debug!(side = %state.active, %action, %reason, "action rejected");
                state.clone()
            }
        }
    }

    /// End `side`'s turn if it is the active side; otherwise a no-op.
    ///
    /// Calling it twice with the same side ends the turn once.
    #[must_use]
    pub fn force_end_turn(&self, state: &BattleState, side: Side) -> BattleState {
        if state.phase != Phase::Battle || state.active != side {
            return state.clone();
        }
        debug!(%side, "forcing end of turn");
        self.apply(state, &Action::EndTurn)
    }

    /// Setup → team selection.
    pub fn enter_team_select(&self, state: &BattleState) -> Result<BattleState, SetupError> {
        if state.phase != Phase::Setup {
            return Err(SetupError::WrongPhase {
                action: "enter team select",
                phase: state.phase,
            });
        }
        let mut next = state.clone();
        next.phase = Phase::TeamSelect;
        info!("entering team select");
        Ok(next)
    }

    /// Team selection → battle.
    ///
    /// Installs both allocations, seeds energy (player from the battle
    /// config, AI side from its tier) and draws opening hands.
    pub fn start_battle(
        &self,
        state: &BattleState,
        player: SideAllocation,
        opponent: SideAllocation,
    ) -> Result<BattleState, SetupError> {
        if state.phase != Phase::TeamSelect {
            return Err(SetupError::WrongPhase {
                action: "start battle",
                phase: state.phase,
            });
        }
        if player.creatures.is_empty() {
            return Err(SetupError::EmptyTeam(Side::Player));
        }
        if opponent.creatures.is_empty() {
            return Err(SetupError::EmptyTeam(Side::Opponent));
        }

        let mut next = state.clone();
        for (side, allocation) in [(Side::Player, player), (Side::Opponent, opponent)] {
            let starting_energy = match side {
                Side::Player => self.config.player_starting_energy,
                Side::Opponent => self.difficulty.starting_energy,
            };
            let s = next.side_mut(side);
            s.deck = allocation
                .creatures
                .into_iter()
                .map(|mut c| {
                    c.restore();
                    c
                })
                .collect();
            s.hand.clear();
            s.field.clear();
            s.tools = allocation.tools.into_iter().collect();
            s.spells = allocation.spells.into_iter().collect();
            s.energy = self.config.clamp_energy(starting_energy);
            s.consecutive_actions = 0;
            s.momentum = 0;
            s.synergies.clear();
            s.combo_granted = false;

            for _ in 0..self.config.opening_hand_size {
                Self::draw(&mut next, side);
            }
        }

        next.phase = Phase::Battle;
        next.active = Side::Player;
        next.turn = 1;
        next.action_sequence = 0;
        next.push_log(None, "The battle begins");
        info!(
            tier = %next.difficulty,
            player_energy = next.sides[Side::Player].energy,
            opponent_energy = next.sides[Side::Opponent].energy,
            "battle started"
        );
        Ok(next)
    }

    /// Move to victory or defeat once a side has nothing left.
    pub(super) fn check_victory(&self, state: &mut BattleState) {
        if state.phase != Phase::Battle {
            return;
        }
        let outcome = if state.sides[Side::Player].is_defeated() {
            Phase::Defeat
        } else if state.sides[Side::Opponent].is_defeated() {
            Phase::Victory
        } else {
            return;
        };

        state.phase = outcome;
        let message = match outcome {
            Phase::Victory => "Victory: the opponent has no creatures left",
            _ => "Defeat: the player has no creatures left",
        };
        state.push_log(None, message);
        info!(phase = %outcome, turn = state.turn, "battle over");
    }
}
