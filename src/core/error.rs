//! Rejection reasons and setup errors.
//!
//! Battle actions never fail loudly: `BattleEngine::apply` turns an invalid
//! action into a no-op. `ActionError` exists so callers (UI, tests, the
//! skirmish runner) can ask *why* an action was rejected via
//! `BattleEngine::validate`.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::action::ActionKind;
use super::entity::{CreatureId, ItemId};
use super::side::Side;
use super::state::Phase;

/// Why an action was rejected.
#[derive(Clone, Debug, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum ActionError {
    #[error("actions are only accepted during battle (phase is {0:?})")]
    WrongPhase(Phase),

    #[error("{0} has no creature {1} in hand")]
    NotInHand(Side, CreatureId),

    #[error("{0} has no live creature {1} on its field")]
    NotOnField(Side, CreatureId),

    #[error("target {0} is not on the enemy field")]
    InvalidTarget(CreatureId),

    #[error("field is full ({0} creatures)")]
    FieldFull(usize),

    #[error("{action:?} needs {required} energy, {available} available")]
    InsufficientEnergy {
        action: ActionKind,
        required: i32,
        available: i32,
    },

    #[error("{0} is incapacitated")]
    Incapacitated(CreatureId),

    #[error("{0} is already defending")]
    AlreadyDefending(CreatureId),

    #[error("{0} has no item {1}")]
    UnknownItem(Side, ItemId),

    #[error("item {0} needs a target")]
    MissingTarget(ItemId),
}

/// Problems building or advancing a battle outside the action loop.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum SetupError {
    #[error("cannot {action} from phase {phase:?}")]
    WrongPhase { action: &'static str, phase: Phase },

    #[error("{0} has no creatures")]
    EmptyTeam(Side),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_are_readable() {
        let err = ActionError::InsufficientEnergy {
            action: ActionKind::Attack,
            required: 2,
            available: 1,
        };
        assert_eq!(err.to_string(), "Attack needs 2 energy, 1 available");

        let err = ActionError::NotOnField(Side::Player, CreatureId(3));
        assert_eq!(err.to_string(), "Player has no live creature Creature(3) on its field");
    }
}
