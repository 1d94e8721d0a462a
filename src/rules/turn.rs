//! End of turn: effect ticks, combo grant, recompute, energy economy, draw.
//!
//! For ending side S and opponent O:
//!
//! 1. S ticks its non-defense effects.
//! 2. O ticks its defense effects (this is O's opponent's end-turn).
//! 3. S earns the combo buff if it reached the combo threshold.
//! 4. Both fields drop the fallen and fully recompute.
//! 5. If S closes the cycle: both sides regenerate, momentum resets, turn + 1.
//! 6. O decays if hoarding energy.
//! 7. O becomes active, its combo counter resets and it draws.

use tracing::debug;

use crate::core::{BattleState, Side};
use crate::creatures::{ActiveEffect, EffectCategory, EffectDuration, StatModifiers};
use crate::items::ItemResolver;

use super::engine::BattleEngine;

/// Name of the permanent buff granted by a combo.
pub const COMBO_EFFECT: &str = "Combo Surge";

impl<R: ItemResolver> BattleEngine<R> {
    pub(super) fn end_turn(&self, state: &mut BattleState) {
        let ending = state.active;
        let other = ending.opponent();

        for creature in state.side_mut(ending).field.iter_mut() {
            creature.tick_effects(false);
        }
        for creature in state.side_mut(other).field.iter_mut() {
            creature.tick_effects(true);
        }

        self.grant_combo(state, ending);

        for side in Side::BOTH {
            self.remove_fallen(state, side);
            self.refresh_synergies(state, side);
        }

        if ending.closes_cycle() {
            for side in Side::BOTH {
                self.regenerate(state, side);
            }
            state.turn += 1;
        }

        self.decay(state, other);

        state.active = other;
        state.action_sequence = 0;
        let next = state.side_mut(other);
        next.consecutive_actions = 0;
        next.combo_granted = false;
        if state.sides[other].hand.len() < self.config.max_hand_size {
            Self::draw(state, other);
        }

        state.push_log(Some(ending), "ends the turn");
        debug!(ended = %ending, now_active = %other, turn = state.turn, "turn ended");
    }

    fn grant_combo(&self, state: &mut BattleState, side: Side) {
        let s = state.side_mut(side);
        if s.combo_granted || s.consecutive_actions < self.config.combo_threshold {
            return;
        }
        let bonus = self.config.combo_attack_bonus;
        for creature in s.field.iter_mut() {
            creature.add_effect(
                ActiveEffect::new(COMBO_EFFECT, EffectCategory::Buff, EffectDuration::Permanent)
                    .with_stat_modifiers(StatModifiers::attack(bonus, bonus)),
            );
        }
        s.combo_granted = true;
        let actions = s.consecutive_actions;
        state.push_log(
            Some(side),
            format!("{actions}-action combo: field gains +{bonus}/+{bonus} attack"),
        );
        debug!(%side, actions, "combo granted");
    }

    /// Energy regenerated by `side` at the end of a cycle.
    ///
    /// `base + fielded energy stat / 10 + tier bonus (AI side) + momentum bonus`
    #[must_use]
    pub fn regeneration(&self, state: &BattleState, side: Side) -> i32 {
        let s = &state.sides[side];
        let tier_bonus = match side {
            Side::Player => 0,
            Side::Opponent => self.difficulty.regen_bonus,
        };
        self.config.base_regen
            + s.fielded_energy_stat() / 10
            + tier_bonus
            + self.config.momentum_bonus(s.momentum)
    }

    fn regenerate(&self, state: &mut BattleState, side: Side) {
        let amount = self.regeneration(state, side);
        let s = state.side_mut(side);
        let before = s.energy;
        s.energy = self.config.clamp_energy(before + amount);
        s.momentum = 0;
        debug!(%side, amount, before, after = s.energy, "energy regenerated");
    }

    fn decay(&self, state: &mut BattleState, side: Side) {
        let s = state.side_mut(side);
        let lost = self.config.decay_amount(s.energy);
        if lost == 0 {
            return;
        }
        s.energy = self.config.clamp_energy(s.energy - lost);
        let remaining = s.energy;
        state.push_log(Some(side), format!("loses {lost} energy to decay"));
        debug!(%side, lost, remaining, "energy decayed");
    }

    /// Move the front of `side`'s deck into its hand.
    pub(super) fn draw(state: &mut BattleState, side: Side) {
        let s = state.side_mut(side);
        let Some(creature) = s.deck.pop_front() else {
            return;
        };
        let name = creature.name.clone();
        s.hand.push_back(creature);
        state.push_log(Some(side), format!("draws {name}"));
    }
}
