//! Legal action enumeration.

use smallvec::{smallvec, SmallVec};

use crate::core::{Action, BattleState, CreatureId, Phase, SideState};
use crate::items::{Item, ItemResolver, ItemTarget};
use crate::stats::AttackKind;

use super::engine::BattleEngine;

/// Target choices for an item: `None` for area items.
fn item_targets(
    item: &Item,
    me: &SideState,
    foe: &SideState,
) -> SmallVec<[Option<CreatureId>; 4]> {
    match item.targeting {
        ItemTarget::Ally => me.living().map(|c| Some(c.id)).collect(),
        ItemTarget::Enemy => foe.living().map(|c| Some(c.id)).collect(),
        ItemTarget::AllAllies | ItemTarget::AllEnemies => smallvec![None],
    }
}

impl<R: ItemResolver> BattleEngine<R> {
    /// Every action the active side may take, `EndTurn` last.
    ///
    /// Empty once the battle is not in progress.
    #[must_use]
    pub fn legal_actions(&self, state: &BattleState) -> Vec<Action> {
        if state.phase != Phase::Battle {
            return Vec::new();
        }
        let me = state.active_side();
        let foe = state.side(state.active.opponent());
        let mut candidates = Vec::new();

        for c in me.hand.iter() {
            candidates.push(Action::Deploy { creature: c.id });
        }
        for attacker in me.living() {
            for target in foe.living() {
                for kind in AttackKind::BOTH {
                    candidates.push(Action::Attack {
                        attacker: attacker.id,
                        target: target.id,
                        kind,
                    });
                }
            }
            candidates.push(Action::Defend { creature: attacker.id });
        }
        for tool in me.tools.iter() {
            for target in item_targets(tool, me, foe) {
                candidates.push(Action::UseTool { tool: tool.id, target });
            }
        }
        for spell in me.spells.iter() {
            for caster in me.living() {
                for target in item_targets(spell, me, foe) {
                    candidates.push(Action::UseSpell {
                        spell: spell.id,
                        caster: caster.id,
                        target,
                    });
                }
            }
        }

        let mut legal: Vec<Action> = candidates
            .into_iter()
            .filter(|action| self.validate(state, action).is_ok())
            .collect();
        legal.push(Action::EndTurn);
        legal
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{ItemId, Side};
    use crate::rules::fixtures::{battle, engine, second_turn};

    #[test]
    fn test_opening_moves_are_deploys() {
        let engine = engine();
        let state = battle(&engine);

        let legal = engine.legal_actions(&state);
        assert_eq!(
            legal,
            vec![
                Action::Deploy { creature: CreatureId(1) },
                Action::Deploy { creature: CreatureId(2) },
                Action::Deploy { creature: CreatureId(3) },
                Action::EndTurn,
            ]
        );
    }

    #[test]
    fn test_every_listed_action_validates() {
        let engine = engine();
        let state = second_turn(&engine);

        let legal = engine.legal_actions(&state);
        for action in &legal {
            assert!(engine.validate(&state, action).is_ok(), "{action} should be legal");
        }
        assert!(legal.contains(&Action::Attack {
            attacker: CreatureId(1),
            target: CreatureId(11),
            kind: AttackKind::Magical,
        }));
        assert!(legal.contains(&Action::UseSpell {
            spell: ItemId(50),
            caster: CreatureId(1),
            target: Some(CreatureId(11)),
        }));
    }

    #[test]
    fn test_no_actions_outside_battle() {
        let engine = engine();
        let mut state = battle(&engine);
        state.phase = Phase::Victory;
        assert!(engine.legal_actions(&state).is_empty());

        state.phase = Phase::Battle;
        state.side_mut(Side::Player).energy = 0;
        assert_eq!(engine.legal_actions(&state), vec![Action::EndTurn]);
    }
}
