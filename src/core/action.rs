//! Battle actions.
//!
//! Actions form a closed set of intents, matched exhaustively by the rules
//! engine. Each variant carries the creature and item ids it refers to; the
//! acting side is always the state's active side.
//!
//! ```
//! use creature_clash::core::{Action, CreatureId};
//! use creature_clash::stats::AttackKind;
//!
//! let strike = Action::Attack {
//!     attacker: CreatureId(4),
//!     target: CreatureId(9),
//!     kind: AttackKind::Physical,
//! };
//!
//! assert_eq!(strike.actor(), Some(CreatureId(4)));
//! assert_eq!(strike.referenced_creatures().as_slice(), &[CreatureId(4), CreatureId(9)]);
//! ```

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::entity::{CreatureId, ItemId};
use super::side::Side;
use crate::stats::AttackKind;

/// A complete battle action.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    /// Move a creature from hand to field.
    Deploy { creature: CreatureId },

    /// Attack an enemy field creature.
    Attack {
        attacker: CreatureId,
        target: CreatureId,
        kind: AttackKind,
    },

    /// Brace a field creature against the next enemy turn.
    Defend { creature: CreatureId },

    /// Use a tool (free). Area tools take no target.
    UseTool {
        tool: ItemId,
        target: Option<CreatureId>,
    },

    /// Cast a spell (costs energy) from a field creature.
    UseSpell {
        spell: ItemId,
        caster: CreatureId,
        target: Option<CreatureId>,
    },

    /// Finish the active side's turn.
    EndTurn,
}

/// Discriminant-only view of an action, for logs and reports.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActionKind {
    Deploy,
    Attack,
    Defend,
    UseTool,
    UseSpell,
    EndTurn,
}

impl Action {
    /// The action's kind.
    #[must_use]
    pub fn kind(&self) -> ActionKind {
        match self {
            Action::Deploy { .. } => ActionKind::Deploy,
            Action::Attack { .. } => ActionKind::Attack,
            Action::Defend { .. } => ActionKind::Defend,
            Action::UseTool { .. } => ActionKind::UseTool,
            Action::UseSpell { .. } => ActionKind::UseSpell,
            Action::EndTurn => ActionKind::EndTurn,
        }
    }

    /// The creature performing the action, if any.
    ///
    /// Tools have no actor: the side uses them directly.
    #[must_use]
    pub fn actor(&self) -> Option<CreatureId> {
        match self {
            Action::Deploy { creature } | Action::Defend { creature } => Some(*creature),
            Action::Attack { attacker, .. } => Some(*attacker),
            Action::UseSpell { caster, .. } => Some(*caster),
            Action::UseTool { .. } | Action::EndTurn => None,
        }
    }

    /// Every creature id the action refers to, actor first.
    #[must_use]
    pub fn referenced_creatures(&self) -> SmallVec<[CreatureId; 2]> {
        let mut ids = SmallVec::new();
        match self {
            Action::Deploy { creature } | Action::Defend { creature } => ids.push(*creature),
            Action::Attack { attacker, target, .. } => {
                ids.push(*attacker);
                ids.push(*target);
            }
            Action::UseTool { target, .. } => ids.extend(target.iter().copied()),
            Action::UseSpell { caster, target, .. } => {
                ids.push(*caster);
                ids.extend(target.iter().copied());
            }
            Action::EndTurn => {}
        }
        ids
    }

    /// The item the action consumes, if any.
    #[must_use]
    pub fn item(&self) -> Option<ItemId> {
        match self {
            Action::UseTool { tool, .. } => Some(*tool),
            Action::UseSpell { spell, .. } => Some(*spell),
            _ => None,
        }
    }

    /// Whether this action occupies its actor for the rest of the turn in
    /// the planner's bookkeeping (attack, defend, cast).
    #[must_use]
    pub fn is_exclusive(&self) -> bool {
        matches!(
            self,
            Action::Attack { .. } | Action::Defend { .. } | Action::UseSpell { .. }
        )
    }

    /// Whether the action counts toward the consecutive-action combo.
    #[must_use]
    pub fn counts_toward_combo(&self) -> bool {
        !matches!(self, Action::EndTurn)
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Action::Deploy { creature } => write!(f, "deploy {creature}"),
            Action::Attack { attacker, target, kind } => {
                write!(f, "{attacker} {kind} attack on {target}")
            }
            Action::Defend { creature } => write!(f, "{creature} defends"),
            Action::UseTool { tool, target: Some(t) } => write!(f, "use {tool} on {t}"),
            Action::UseTool { tool, target: None } => write!(f, "use {tool}"),
            Action::UseSpell { spell, caster, target: Some(t) } => {
                write!(f, "{caster} casts {spell} on {t}")
            }
            Action::UseSpell { spell, caster, target: None } => write!(f, "{caster} casts {spell}"),
            Action::EndTurn => write!(f, "end turn"),
        }
    }
}

/// An ordered list of actions planned for one turn.
///
/// SmallVec keeps typical batches (the expert cap is 7) off the heap.
pub type ActionBatch = SmallVec<[Action; 8]>;

/// A recorded action with metadata for history tracking.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionRecord {
    /// The side that took this action.
    pub side: Side,

    /// The action taken.
    pub action: Action,

    /// Turn number when action was taken.
    pub turn: u32,

    /// Sequence number within the turn (for ordering).
    pub sequence: u32,
}

impl ActionRecord {
    /// Create a new action record.
    #[must_use]
    pub fn new(side: Side, action: Action, turn: u32, sequence: u32) -> Self {
        Self {
            side,
            action,
            turn,
            sequence,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_actor() {
        assert_eq!(Action::Deploy { creature: CreatureId(1) }.actor(), Some(CreatureId(1)));
        assert_eq!(
            Action::UseTool { tool: ItemId(2), target: Some(CreatureId(3)) }.actor(),
            None
        );
        assert_eq!(Action::EndTurn.actor(), None);
    }

    #[test]
    fn test_referenced_creatures() {
        let cast = Action::UseSpell {
            spell: ItemId(5),
            caster: CreatureId(1),
            target: Some(CreatureId(8)),
        };
        assert_eq!(cast.referenced_creatures().as_slice(), &[CreatureId(1), CreatureId(8)]);

        let area = Action::UseTool { tool: ItemId(5), target: None };
        assert!(area.referenced_creatures().is_empty());
    }

    #[test]
    fn test_exclusive_actions() {
        assert!(Action::Defend { creature: CreatureId(1) }.is_exclusive());
        assert!(!Action::Deploy { creature: CreatureId(1) }.is_exclusive());
        assert!(!Action::UseTool { tool: ItemId(1), target: None }.is_exclusive());
    }

    #[test]
    fn test_display() {
        let attack = Action::Attack {
            attacker: CreatureId(1),
            target: CreatureId(2),
            kind: AttackKind::Magical,
        };
        assert_eq!(attack.to_string(), "Creature(1) magical attack on Creature(2)");
    }

    #[test]
    fn test_action_record_serialization() {
        let record = ActionRecord::new(Side::Opponent, Action::EndTurn, 2, 3);

        let json = serde_json::to_string(&record).unwrap();
        let deserialized: ActionRecord = serde_json::from_str(&json).unwrap();

        assert_eq!(record, deserialized);
    }
}
