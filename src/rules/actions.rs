//! Resolution of validated actions.
//!
//! These run on a private copy of the state after `validate_action` has
//! accepted the action, so they may assume every referenced creature and
//! item exists.

use smallvec::SmallVec;
use tracing::{debug, trace};

use crate::core::{BattleState, CreatureId, ItemId, LastAction, Side};
use crate::creatures::{ActiveEffect, Creature};
use crate::items::{ItemRequest, ItemResolver, ItemTarget};
use crate::stats::{compute_attack, AttackKind, DamageType};
use crate::synergy::refresh_field;

use super::engine::BattleEngine;

impl<R: ItemResolver> BattleEngine<R> {
    /// Deduct energy and bank it as momentum.
    pub(super) fn spend(&self, state: &mut BattleState, side: Side, amount: i32) {
        let s = state.side_mut(side);
        let before = s.energy;
        s.energy = self.config.clamp_energy(before - amount);
        s.momentum += before - s.energy;
    }

    /// Re-detect `side`'s synergies and recompute its field.
    pub(super) fn refresh_synergies(&self, state: &mut BattleState, side: Side) {
        let capacity = self.max_field_size(side);
        let s = state.side_mut(side);
        let synergies = refresh_field(&mut s.field, capacity);
        if synergies != s.synergies {
            debug!(%side, count = synergies.len(), "synergies changed");
        }
        s.synergies = synergies;
    }

    /// Drop defeated creatures from `side`'s field. Returns whether any left.
    pub(super) fn remove_fallen(&self, state: &mut BattleState, side: Side) -> bool {
        let fallen: SmallVec<[String; 2]> = state.sides[side]
            .field
            .iter()
            .filter(|c| !c.is_alive())
            .map(|c| c.name.clone())
            .collect();
        if fallen.is_empty() {
            return false;
        }
        state.side_mut(side).field.retain(|c| c.is_alive());
        for name in fallen {
            state.push_log(Some(side), format!("{name} is defeated"));
        }
        true
    }

    pub(super) fn deploy(&self, state: &mut BattleState, side: Side, id: CreatureId) {
        let Some(index) = state.sides[side].hand_index(id) else {
            return;
        };
        let mut creature = state.side_mut(side).hand.remove(index);
        creature.restore();
        let cost = creature.deploy_cost();
        let name = creature.name.clone();

        self.spend(state, side, cost);
        let s = state.side_mut(side);
        s.field.push_back(creature);
        s.consecutive_actions += 1;
        self.refresh_synergies(state, side);

        state.push_log(Some(side), format!("{name} enters the field ({cost} energy)"));
        state.last_action = Some(LastAction {
            attacker_id: Some(id),
            ..LastAction::default()
        });
    }

    pub(super) fn attack(
        &self,
        state: &mut BattleState,
        side: Side,
        attacker_id: CreatureId,
        target_id: CreatureId,
        kind: AttackKind,
    ) {
        let foe = side.opponent();
        let (Some(attacker), Some(target_index)) = (
            state.sides[side].field_creature(attacker_id).cloned(),
            state.sides[foe].field_index(target_id),
        ) else {
            return;
        };

        self.spend(state, side, self.config.attack_cost);
        let combo = self.config.combo_multiplier(state.sides[side].consecutive_actions);

        let defender = state.sides[foe].field[target_index].clone();
        let result = compute_attack(&attacker, &defender, kind, combo, &mut state.rng);
        trace!(
            attacker = %attacker_id,
            target = %target_id,
            effectiveness = result.effectiveness,
            combo,
            critical = result.is_critical,
            dodged = result.is_dodged,
            "attack rolled"
        );

        let dealt = state.side_mut(foe).field[target_index].take_damage(result.damage);
        state.side_mut(side).consecutive_actions += 1;

        let message = if result.is_dodged {
            format!("{} dodges {}'s {kind} attack", defender.name, attacker.name)
        } else {
            let mut line =
                format!("{} hits {} for {dealt} {kind} damage", attacker.name, defender.name);
            if result.is_critical {
                line.push_str(" (critical)");
            }
            if result.damage_type != DamageType::Normal {
                line.push_str(&format!(" [{}]", result.damage_type));
            }
            line
        };
        state.push_log(Some(side), message);

        state.last_action = Some(LastAction {
            attacker_id: Some(attacker_id),
            target_id: Some(target_id),
            damage: dealt,
            is_critical: result.is_critical,
            is_blocked: result.is_blocked,
            is_dodged: result.is_dodged,
            damage_type: result.damage_type,
        });

        if self.remove_fallen(state, foe) {
            self.refresh_synergies(state, foe);
        }
    }

    pub(super) fn defend(&self, state: &mut BattleState, side: Side, id: CreatureId) {
        let Some(index) = state.sides[side].field_index(id) else {
            return;
        };
        self.spend(state, side, self.config.defend_cost);

        let s = state.side_mut(side);
        let creature = &mut s.field[index];
        creature.add_effect(ActiveEffect::defense(self.config.defend_reduction));
        let name = creature.name.clone();
        s.consecutive_actions += 1;

        state.push_log(Some(side), format!("{name} braces for the next attack"));
        state.last_action = Some(LastAction {
            attacker_id: Some(id),
            is_blocked: true,
            ..LastAction::default()
        });
    }

    /// Use a tool (no caster) or cast a spell. The item is consumed.
    pub(super) fn use_item(
        &self,
        state: &mut BattleState,
        side: Side,
        item_id: ItemId,
        caster_id: Option<CreatureId>,
        target_id: Option<CreatureId>,
    ) {
        let foe = side.opponent();
        let Some(item) = state.side_mut(side).take_item(item_id) else {
            return;
        };
        if item.is_spell() {
            self.spend(state, side, item.cost);
        }

        let caster: Option<Creature> =
            caster_id.and_then(|id| state.sides[side].field_creature(id).cloned());
        let targets: Vec<Creature> = match item.targeting {
            ItemTarget::Ally => target_id
                .and_then(|id| state.sides[side].field_creature(id).cloned())
                .into_iter()
                .collect(),
            ItemTarget::Enemy => target_id
                .and_then(|id| state.sides[foe].field_creature(id).cloned())
                .into_iter()
                .collect(),
            ItemTarget::AllAllies => state.sides[side].living().cloned().collect(),
            ItemTarget::AllEnemies => state.sides[foe].living().cloned().collect(),
        };

        let outcome = self.resolver.resolve(&ItemRequest {
            item: &item,
            caster: caster.as_ref(),
            targets: &targets,
            difficulty: state.difficulty,
            turn: state.turn,
        });

        let mut damage = 0;
        for updated in outcome.updated {
            for owner in Side::BOTH {
                let synergies = state.sides[owner].synergies.clone();
                let s = state.side_mut(owner);
                if let Some(slot) = s.field.iter_mut().find(|c| c.id == updated.id) {
                    damage += (slot.current_health() - updated.current_health()).max(0);
                    *slot = updated;
                    slot.recompute(&synergies);
                    break;
                }
            }
        }

        state.push_log(Some(side), outcome.description);
        state.side_mut(side).consecutive_actions += 1;
        state.last_action = Some(LastAction {
            attacker_id: caster_id,
            target_id,
            damage,
            ..LastAction::default()
        });

        for owner in Side::BOTH {
            if self.remove_fallen(state, owner) {
                self.refresh_synergies(state, owner);
            }
        }
    }
}
