//! Action validation.
//!
//! Every check runs against the unmodified state before anything is
//! mutated. The acting side is always the state's active side.

use crate::core::{
    Action, ActionError, ActionKind, BattleState, CreatureId, Phase, Side, SideState,
};
use crate::creatures::Creature;
use crate::items::{Item, ItemKind, ItemResolver, ItemTarget};

use super::engine::BattleEngine;

pub(super) fn validate_action<R: ItemResolver>(
    engine: &BattleEngine<R>,
    state: &BattleState,
    action: &Action,
) -> Result<(), ActionError> {
    if state.phase != Phase::Battle {
        return Err(ActionError::WrongPhase(state.phase));
    }

    let side = state.active;
    let me = state.side(side);
    let foe = state.side(side.opponent());
    let config = engine.config();

    match action {
        Action::Deploy { creature } => {
            let candidate = me
                .hand_creature(*creature)
                .ok_or(ActionError::NotInHand(side, *creature))?;
            let capacity = engine.max_field_size(side);
            if me.field.len() >= capacity {
                return Err(ActionError::FieldFull(capacity));
            }
            require_energy(me, ActionKind::Deploy, candidate.deploy_cost())
        }

        Action::Attack { attacker, target, .. } => {
            ready_actor(me, side, *attacker)?;
            if foe.field_creature(*target).is_none() {
                return Err(ActionError::InvalidTarget(*target));
            }
            require_energy(me, ActionKind::Attack, config.attack_cost)
        }

        Action::Defend { creature } => {
            let defender = ready_actor(me, side, *creature)?;
            if defender.is_defending {
                return Err(ActionError::AlreadyDefending(*creature));
            }
            require_energy(me, ActionKind::Defend, config.defend_cost)
        }

        Action::UseTool { tool, target } => {
            let item = me
                .tools
                .iter()
                .find(|i| i.id == *tool && i.kind == ItemKind::Tool)
                .ok_or(ActionError::UnknownItem(side, *tool))?;
            check_item_target(item, *target, me, foe)
        }

        Action::UseSpell { spell, caster, target } => {
            let item = me
                .spells
                .iter()
                .find(|i| i.id == *spell && i.kind == ItemKind::Spell)
                .ok_or(ActionError::UnknownItem(side, *spell))?;
            ready_actor(me, side, *caster)?;
            check_item_target(item, *target, me, foe)?;
            require_energy(me, ActionKind::UseSpell, item.cost)
        }

        Action::EndTurn => Ok(()),
    }
}

/// A living, non-incapacitated creature on the acting side's field.
fn ready_actor(me: &SideState, side: Side, id: CreatureId) -> Result<&Creature, ActionError> {
    let creature = me.field_creature(id).ok_or(ActionError::NotOnField(side, id))?;
    if creature.is_incapacitated() {
        return Err(ActionError::Incapacitated(id));
    }
    Ok(creature)
}

fn require_energy(me: &SideState, action: ActionKind, required: i32) -> Result<(), ActionError> {
    if me.energy < required {
        return Err(ActionError::InsufficientEnergy {
            action,
            required,
            available: me.energy,
        });
    }
    Ok(())
}

fn check_item_target(
    item: &Item,
    target: Option<CreatureId>,
    me: &SideState,
    foe: &SideState,
) -> Result<(), ActionError> {
    let pool = match item.targeting {
        ItemTarget::Ally => me,
        ItemTarget::Enemy => foe,
        ItemTarget::AllAllies | ItemTarget::AllEnemies => return Ok(()),
    };
    let id = target.ok_or(ActionError::MissingTarget(item.id))?;
    if pool.field_creature(id).is_none() {
        return Err(ActionError::InvalidTarget(id));
    }
    Ok(())
}
