//! Running one AI turn against the engine.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::core::{Action, BattleState, Phase, Side};
use crate::items::ItemResolver;
use crate::rules::{BattleEngine, SkipReason, SkippedAction};

use super::planner::{AiDecision, TurnPolicy};
use super::strategy::Stance;

/// What an AI turn did.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AiTurnReport {
    pub side: Side,
    /// Actions applied, not counting the closing end-turn.
    pub applied: usize,
    pub skipped: Vec<SkippedAction>,
    /// Whether the policy submitted a batch.
    pub batched: bool,
    /// Whether the turn passed to the other side.
    pub ended_turn: bool,
    pub stance: Stance,
}

/// Play the active side's whole turn with `policy`.
///
/// A batch is applied in one go. Single decisions are applied one at a
/// time, asking the policy again after each, up to its action limit. A
/// rejected single action stops the loop. Whatever happens, the turn is
/// ended afterwards unless the battle is over.
pub fn run_ai_turn<R: ItemResolver, P: TurnPolicy>(
    engine: &BattleEngine<R>,
    policy: &mut P,
    state: &BattleState,
) -> (BattleState, AiTurnReport) {
    let side = state.active;
    let mut report = AiTurnReport {
        side,
        applied: 0,
        skipped: Vec::new(),
        batched: false,
        ended_turn: false,
        stance: policy.stance(),
    };
    if state.phase != Phase::Battle {
        return (state.clone(), report);
    }

    let mut current = state.clone();
    let limit = policy.action_limit();
    while report.applied < limit && current.phase == Phase::Battle && current.active == side {
        match policy.decide(engine, &current) {
            AiDecision::EndTurn => break,
            AiDecision::Batch(actions) => {
                let (next, batch) = engine.apply_batch(&current, &actions);
                current = next;
                report.batched = true;
                report.applied += batch.applied;
                report.skipped.extend(batch.skipped);
                break;
            }
            AiDecision::Single(action) => match engine.try_apply(&current, &action) {
                Ok(next) => {
                    current = next;
                    if action != Action::EndTurn {
                        report.applied += 1;
                    }
                }
                Err(err) => {
                    debug!(%side, %action, %err, "planned action rejected, ending turn");
                    report.skipped.push(SkippedAction {
                        index: report.applied,
                        action,
                        reason: SkipReason::Rejected(err),
                    });
                    break;
                }
            },
        }
    }

    current = engine.force_end_turn(&current, side);
    report.ended_turn = current.active != side;
    report.stance = policy.stance();
    info!(
        %side,
        applied = report.applied,
        skipped = report.skipped.len(),
        stance = %report.stance,
        "ai turn finished"
    );
    (current, report)
}

#[cfg(test)]
mod tests {
    use rustc_hash::FxHashSet;

    use super::*;
    use crate::ai::planner::AiPlanner;
    use crate::core::{CreatureId, Difficulty, DifficultyConfig};
    use crate::rules::fixtures::{engine, second_turn};
    use crate::stats::AttackKind;

    /// Replays a fixed script, then ends the turn.
    struct Scripted {
        decisions: Vec<AiDecision>,
    }

    impl TurnPolicy for Scripted {
        fn decide<R: ItemResolver>(
            &mut self,
            _engine: &BattleEngine<R>,
            _state: &BattleState,
        ) -> AiDecision {
            if self.decisions.is_empty() {
                AiDecision::EndTurn
            } else {
                self.decisions.remove(0)
            }
        }

        fn action_limit(&self) -> usize {
            4
        }
    }

    #[test]
    fn test_turn_always_passes() {
        let engine = engine();
        let state = second_turn(&engine);
        let mut planner = AiPlanner::new(DifficultyConfig::for_tier(Difficulty::Medium), 4);

        let (next, report) = run_ai_turn(&engine, &mut planner, &state);
        assert!(report.ended_turn);
        assert_eq!(next.active, Side::Opponent);
        assert!(report.applied <= planner.knobs().max_batch_actions);
    }

    #[test]
    fn test_single_decisions_use_each_creature_once() {
        let engine = engine();
        let mut state = second_turn(&engine);
        let player = state.side_mut(Side::Player);
        player.hand.clear();
        player.spells.clear();
        player.energy = 20;
        let knobs = DifficultyConfig::for_tier(Difficulty::Hard)
            .with_multi_action_probability(0.0)
            .with_noise(0.0, 0.0);
        let mut planner = AiPlanner::new(knobs, 4);

        let (next, report) = run_ai_turn(&engine, &mut planner, &state);

        assert!(!report.batched);
        assert_eq!(report.applied, 1);
        let turn: Vec<&Action> = next
            .history
            .iter()
            .filter(|r| r.side == Side::Player && r.turn == state.turn)
            .map(|r| &r.action)
            .filter(|a| **a != Action::EndTurn)
            .collect();
        assert_eq!(turn.len(), 1);
        assert_eq!(turn[0].actor(), Some(CreatureId(1)));
    }

    /// Planning one action at a time never reuses an actor, at any tier.
    #[test]
    fn test_single_mode_respects_commitments_at_every_tier() {
        let engine = engine();
        for tier in Difficulty::ALL {
            let mut state = second_turn(&engine);
            state.side_mut(Side::Player).energy = 25;
            let knobs = DifficultyConfig::for_tier(tier).with_multi_action_probability(0.0);
            let mut planner = AiPlanner::new(knobs, 11);

            let (next, report) = run_ai_turn(&engine, &mut planner, &state);
            assert!(!report.batched, "{tier}");

            let mut seen = FxHashSet::default();
            for record in next.history.iter().filter(|r| r.side == Side::Player) {
                if record.turn != state.turn || !record.action.is_exclusive() {
                    continue;
                }
                let actor = record.action.actor().unwrap();
                assert!(seen.insert(actor), "{tier}: {actor} acted twice");
            }
        }
    }

    #[test]
    fn test_rejected_single_ends_turn() {
        let engine = engine();
        let state = second_turn(&engine);
        let mut policy = Scripted {
            decisions: vec![
                AiDecision::Single(Action::Defend {
                    creature: CreatureId(1),
                }),
                AiDecision::Single(Action::Defend {
                    creature: CreatureId(1),
                }),
                AiDecision::Single(Action::Deploy {
                    creature: CreatureId(2),
                }),
            ],
        };

        let (next, report) = run_ai_turn(&engine, &mut policy, &state);
        assert_eq!(report.applied, 1);
        assert_eq!(report.skipped.len(), 1);
        assert!(report.ended_turn);
        assert_eq!(next.sides[Side::Player].field.len(), 1);
    }

    #[test]
    fn test_batch_skips_are_reported() {
        let engine = engine();
        let state = second_turn(&engine);
        let mut policy = Scripted {
            decisions: vec![AiDecision::Batch(
                [
                    Action::Attack {
                        attacker: CreatureId(2),
                        target: CreatureId(11),
                        kind: AttackKind::Physical,
                    },
                    Action::Defend {
                        creature: CreatureId(1),
                    },
                ]
                .into_iter()
                .collect(),
            )],
        };

        let (_, report) = run_ai_turn(&engine, &mut policy, &state);
        assert!(report.batched);
        assert_eq!(report.applied, 1);
        assert_eq!(report.skipped[0].reason, SkipReason::NotDeployed(CreatureId(2)));
    }

    #[test]
    fn test_outside_battle_is_noop() {
        let engine = engine();
        let state = BattleState::new(3, Difficulty::Easy);
        let mut policy = Scripted {
            decisions: Vec::new(),
        };

        let (next, report) = run_ai_turn(&engine, &mut policy, &state);
        assert_eq!(next, state);
        assert!(!report.ended_turn);
    }
}
