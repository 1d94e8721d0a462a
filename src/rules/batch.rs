//! Multi-action batches.
//!
//! A batch is applied in order against a private working state. Before each
//! action the referenced creatures are looked up in an id-keyed index of the
//! working state, so an action that names a creature eliminated earlier in
//! the batch (or one still in hand) is skipped while the rest of the batch
//! carries on.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::{Action, ActionError, BattleState, CreatureId, Side};
use crate::items::ItemResolver;

use super::engine::BattleEngine;

/// Why a batch action was not applied.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SkipReason {
    /// A referenced creature left the battle.
    Eliminated(CreatureId),
    /// A referenced creature is still in a deck or hand.
    NotDeployed(CreatureId),
    /// The engine rejected the action.
    Rejected(ActionError),
    /// The battle ended earlier in the batch.
    BattleOver,
    /// The batch already ended the turn.
    AfterEndTurn,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::Eliminated(id) => write!(f, "{id} was eliminated"),
            SkipReason::NotDeployed(id) => write!(f, "{id} is not deployed"),
            SkipReason::Rejected(err) => write!(f, "rejected: {err}"),
            SkipReason::BattleOver => write!(f, "battle is over"),
            SkipReason::AfterEndTurn => write!(f, "turn already ended"),
        }
    }
}

/// A skipped batch entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedAction {
    /// Position in the submitted batch.
    pub index: usize,
    pub action: Action,
    pub reason: SkipReason,
}

/// What happened to a submitted batch.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchReport {
    /// Number of actions applied.
    pub applied: usize,
    pub skipped: Vec<SkippedAction>,
    /// Whether the batch ended the turn.
    pub ended_turn: bool,
}

impl BatchReport {
    /// Whether every action was applied.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.skipped.is_empty()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Zone {
    Reserve,
    Field,
}

/// Where every creature still in the battle currently is.
fn index_creatures(state: &BattleState) -> FxHashMap<CreatureId, (Side, Zone)> {
    let mut index = FxHashMap::default();
    for (side, s) in state.sides.iter() {
        for c in s.deck.iter().chain(s.hand.iter()) {
            index.insert(c.id, (side, Zone::Reserve));
        }
        for c in s.living() {
            index.insert(c.id, (side, Zone::Field));
        }
    }
    index
}

fn screen(action: &Action, index: &FxHashMap<CreatureId, (Side, Zone)>) -> Option<SkipReason> {
    for id in action.referenced_creatures() {
        match index.get(&id) {
            None => return Some(SkipReason::Eliminated(id)),
            Some((_, Zone::Reserve)) if !matches!(action, Action::Deploy { .. }) => {
                return Some(SkipReason::NotDeployed(id));
            }
            Some(_) => {}
        }
    }
    None
}

impl<R: ItemResolver> BattleEngine<R> {
    /// Apply an ordered batch for the active side.
    ///
    /// Later actions see the results of earlier ones. Skipped actions are
    /// reported and do not stop the batch; an `EndTurn` or the end of the
    /// battle does.
    pub fn apply_batch(
        &self,
        state: &BattleState,
        actions: &[Action],
    ) -> (BattleState, BatchReport) {
        let mut working = state.clone();
        let mut report = BatchReport::default();
        let mut index = index_creatures(&working);

        for (i, action) in actions.iter().enumerate() {
            let blocked = if working.is_over() {
                Some(SkipReason::BattleOver)
            } else if report.ended_turn {
                Some(SkipReason::AfterEndTurn)
            } else {
                screen(action, &index)
            };

            let reason = match blocked {
                Some(reason) => reason,
                None => match self.try_apply(&working, action) {
                    Ok(next) => {
                        working = next;
                        index = index_creatures(&working);
                        report.applied += 1;
                        if matches!(action, Action::EndTurn) {
                            report.ended_turn = true;
                        }
                        continue;
                    }
                    Err(err) => SkipReason::Rejected(err),
                },
            };

            debug!(index = i, %action, %reason, "batch action skipped");
            report.skipped.push(SkippedAction {
                index: i,
                action: action.clone(),
                reason,
            });
        }

        debug!(
            applied = report.applied,
            skipped = report.skipped.len(),
            ended_turn = report.ended_turn,
            "batch applied"
        );
        (working, report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{ActionError, ItemId};
    use crate::rules::fixtures::{engine, second_turn};
    use crate::stats::AttackKind;

    fn attack(attacker: u32, target: u32) -> Action {
        Action::Attack {
            attacker: CreatureId(attacker),
            target: CreatureId(target),
            kind: AttackKind::Physical,
        }
    }

    fn defend(id: u32) -> Action {
        Action::Defend { creature: CreatureId(id) }
    }

    #[test]
    fn test_eliminated_target_is_skipped_without_aborting() {
        let engine = engine();
        let mut state = second_turn(&engine);
        state.side_mut(Side::Opponent).field[0].set_health(1);

        let batch = [
            Action::UseSpell {
                spell: ItemId(50),
                caster: CreatureId(1),
                target: Some(CreatureId(11)),
            },
            attack(1, 11),
            defend(1),
        ];
        let (next, report) = engine.apply_batch(&state, &batch);

        assert_eq!(report.applied, 2);
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].index, 1);
        assert_eq!(report.skipped[0].reason, SkipReason::Eliminated(CreatureId(11)));
        assert!(next.sides[Side::Opponent].field.is_empty());
        assert!(next.sides[Side::Player].field[0].is_defending);
        assert_eq!(next.sides[Side::Player].energy, 9 - 3 - 1);
    }

    #[test]
    fn test_undeployed_actor_is_skipped() {
        let engine = engine();
        let state = second_turn(&engine);

        let (_, report) = engine.apply_batch(&state, &[attack(2, 11), defend(1)]);
        assert_eq!(report.applied, 1);
        assert_eq!(report.skipped[0].reason, SkipReason::NotDeployed(CreatureId(2)));
    }

    #[test]
    fn test_rejected_action_is_reported() {
        let engine = engine();
        let state = second_turn(&engine);

        let (_, report) = engine.apply_batch(&state, &[defend(1), defend(1)]);
        assert_eq!(report.applied, 1);
        assert_eq!(
            report.skipped[0].reason,
            SkipReason::Rejected(ActionError::AlreadyDefending(CreatureId(1)))
        );
    }

    #[test]
    fn test_batch_stops_after_end_turn() {
        let engine = engine();
        let state = second_turn(&engine);

        let (next, report) = engine.apply_batch(&state, &[Action::EndTurn, defend(1)]);
        assert!(report.ended_turn);
        assert_eq!(report.skipped[0].reason, SkipReason::AfterEndTurn);
        assert_eq!(next.active, Side::Opponent);
        assert!(!next.sides[Side::Player].field[0].is_defending);
    }

    #[test]
    fn test_clean_batch_matches_sequential_apply() {
        let engine = engine();
        let state = second_turn(&engine);
        let actions = [defend(1), Action::EndTurn];

        let (batched, report) = engine.apply_batch(&state, &actions);
        let sequential = actions.iter().fold(state, |s, a| engine.apply(&s, a));

        assert!(report.is_clean());
        assert_eq!(batched, sequential);
    }
}
