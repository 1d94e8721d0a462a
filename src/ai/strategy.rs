//! Strategy selection and the presentation stance.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::synergy::check_field_synergies;

use super::analysis::BattleAnalysis;
use super::context::PlanContext;

/// Overall plan for the turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Strategy {
    MaximumAggression,
    DefensiveSetup,
    ComboSetup,
    ResourceEfficiency,
    SynergyFocus,
}

impl Strategy {
    /// Every strategy, in tie-break order.
    pub const ALL: [Strategy; 5] = [
        Strategy::MaximumAggression,
        Strategy::DefensiveSetup,
        Strategy::ComboSetup,
        Strategy::ResourceEfficiency,
        Strategy::SynergyFocus,
    ];

    /// Whether the planner concentrates attacks on the top target.
    #[must_use]
    pub const fn focuses_fire(self) -> bool {
        matches!(self, Strategy::MaximumAggression | Strategy::ComboSetup)
    }

    /// Whether the strategy wants more than one action per turn.
    #[must_use]
    pub const fn wants_batch(self) -> bool {
        !matches!(self, Strategy::ResourceEfficiency)
    }
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Strategy::MaximumAggression => "maximum-aggression",
            Strategy::DefensiveSetup => "defensive-setup",
            Strategy::ComboSetup => "combo-setup",
            Strategy::ResourceEfficiency => "resource-efficiency",
            Strategy::SynergyFocus => "synergy-focus",
        };
        f.write_str(name)
    }
}

/// Cosmetic mood signal for the presentation layer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Stance {
    Aggressive,
    Defensive,
    Calculating,
    Opportunistic,
    #[default]
    Balanced,
}

impl Stance {
    #[must_use]
    pub fn from_strategy(strategy: Strategy, analysis: &BattleAnalysis) -> Self {
        match strategy {
            Strategy::MaximumAggression if analysis.lethal_available() => Stance::Opportunistic,
            Strategy::MaximumAggression => Stance::Aggressive,
            Strategy::DefensiveSetup => Stance::Defensive,
            Strategy::ComboSetup => Stance::Calculating,
            Strategy::ResourceEfficiency | Strategy::SynergyFocus => Stance::Balanced,
        }
    }
}

impl std::fmt::Display for Stance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Stance::Aggressive => "aggressive",
            Stance::Defensive => "defensive",
            Stance::Calculating => "calculating",
            Stance::Opportunistic => "opportunistic",
            Stance::Balanced => "balanced",
        };
        f.write_str(name)
    }
}

/// Whether deploying some creature from hand would add a synergy.
#[must_use]
pub fn synergy_reachable(ctx: &PlanContext<'_>) -> bool {
    if ctx.open_slots() == 0 {
        return false;
    }
    let current = check_field_synergies(ctx.own.living(), ctx.capacity).len();
    ctx.own.hand.iter().any(|candidate| {
        candidate.deploy_cost() <= ctx.own.energy
            && check_field_synergies(
                ctx.own.living().chain(std::iter::once(candidate)),
                ctx.capacity,
            )
            .len()
                > current
    })
}

/// Priority score of each strategy.
#[must_use]
pub fn score_strategies(
    ctx: &PlanContext<'_>,
    analysis: &BattleAnalysis,
) -> [(Strategy, f64); 5] {
    let energy = ctx.own.energy;
    let bias = ctx.knobs.aggression_bias.clamp(0.0, 1.0);
    let has_targets = !analysis.targets.is_empty();

    let mut aggression = 40.0 * bias;
    if analysis.lethal_available() {
        aggression += 50.0;
    }
    if has_targets && analysis.power_ratio() > 1.2 {
        aggression += 20.0;
    }
    if !has_targets {
        aggression = 0.0;
    }

    let mut defensive = 25.0 * analysis.critical.len() as f64;
    if f64::from(analysis.own_health) < f64::from(analysis.enemy_health) * 0.6 {
        defensive += 20.0;
    }
    defensive *= 1.0 - bias / 2.0;

    let mut combo = 0.0;
    if !analysis.combos.is_empty() {
        combo += 30.0;
    }
    if ctx.own.consecutive_actions + 2 >= ctx.config.combo_threshold && energy >= 6 {
        combo += 15.0;
    }

    let resource = if energy < 6 { 35.0 } else { 0.0 };
    let can_deploy =
        ctx.open_slots() > 0 && ctx.own.hand.iter().any(|c| c.deploy_cost() <= energy);
    let synergy = if synergy_reachable(ctx) {
        30.0
    } else if can_deploy {
        10.0
    } else {
        0.0
    };

    [
        (Strategy::MaximumAggression, aggression),
        (Strategy::DefensiveSetup, defensive),
        (Strategy::ComboSetup, combo),
        (Strategy::ResourceEfficiency, resource),
        (Strategy::SynergyFocus, synergy),
    ]
}

/// Highest-scoring strategy; ties go to the earlier one in `Strategy::ALL`.
#[must_use]
pub fn choose_strategy(ctx: &PlanContext<'_>, analysis: &BattleAnalysis) -> Strategy {
    let scores = score_strategies(ctx, analysis);
    let mut best = scores[0];
    for candidate in &scores[1..] {
        if candidate.1 > best.1 {
            best = *candidate;
        }
    }
    debug!(side = %ctx.side, strategy = %best.0, score = best.1, "strategy chosen");
    best.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::analysis::analyze;
    use crate::core::Side;
    use crate::rules::fixtures::{battle, engine, second_turn};

    #[test]
    fn test_low_energy_prefers_efficiency() {
        let engine = engine();
        let knobs = engine.difficulty().clone();
        let mut state = second_turn(&engine);
        state.side_mut(Side::Player).energy = 3;

        let ctx = PlanContext::new(&engine, &state, &knobs);
        let analysis = analyze(&ctx);
        assert_eq!(choose_strategy(&ctx, &analysis), Strategy::ResourceEfficiency);
    }

    #[test]
    fn test_lethal_prefers_aggression() {
        let engine = engine();
        let knobs = engine.difficulty().clone();
        let mut state = second_turn(&engine);
        state.side_mut(Side::Opponent).field[0].set_health(5);

        let ctx = PlanContext::new(&engine, &state, &knobs);
        let analysis = analyze(&ctx);
        let strategy = choose_strategy(&ctx, &analysis);

        assert_eq!(strategy, Strategy::MaximumAggression);
        assert_eq!(Stance::from_strategy(strategy, &analysis), Stance::Opportunistic);
    }

    #[test]
    fn test_critical_allies_prefer_defense() {
        let engine = engine();
        let knobs = engine.difficulty().clone();
        let mut state = second_turn(&engine);
        state.side_mut(Side::Player).field[0].set_health(10);

        let ctx = PlanContext::new(&engine, &state, &knobs);
        let analysis = analyze(&ctx);
        assert_eq!(choose_strategy(&ctx, &analysis), Strategy::DefensiveSetup);
    }

    #[test]
    fn test_no_targets_no_aggression() {
        let engine = engine();
        let knobs = engine.difficulty().clone();
        let state = battle(&engine);

        let ctx = PlanContext::new(&engine, &state, &knobs);
        let analysis = analyze(&ctx);
        let scores = score_strategies(&ctx, &analysis);
        assert_eq!(scores[0], (Strategy::MaximumAggression, 0.0));
        assert_ne!(choose_strategy(&ctx, &analysis), Strategy::MaximumAggression);
    }
}
