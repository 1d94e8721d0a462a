//! Headless Skirmish Runner
//!
//! Plays AI vs AI battles for balancing and prints the battle log or a JSON
//! summary.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use serde::Serialize;

use creature_clash::{
    run_ai_turn, AiPlanner, BattleBuilder, BattleConfig, BattleEngine, BattleState, Difficulty,
    DifficultyConfig, Side,
};

/// Headless Skirmish Runner - AI vs AI creature battles
#[derive(Parser, Debug)]
#[command(name = "skirmish")]
#[command(about = "Run AI vs AI creature battles and print the log or a JSON summary")]
struct Args {
    /// Tier of the opponent side
    #[arg(long, default_value = "medium", value_parser = parse_tier)]
    difficulty: Difficulty,

    /// Tier whose planner plays the player side (defaults to --difficulty)
    #[arg(long, value_parser = parse_tier)]
    player_tier: Option<Difficulty>,

    /// Random seed for deterministic runs
    #[arg(long)]
    seed: Option<u64>,

    /// Number of battles to run with consecutive seeds
    #[arg(long, default_value_t = 1)]
    battles: u32,

    /// Turn limit before the battle counts as a draw
    #[arg(long, default_value_t = 60)]
    max_turns: u32,

    /// Battle rules as JSON (defaults apply to missing fields)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output format: text or json
    #[arg(long, default_value = "text")]
    format: String,
}

fn parse_tier(name: &str) -> Result<Difficulty, String> {
    Difficulty::parse(name).ok_or_else(|| format!("unknown difficulty '{name}'"))
}

/// JSON output structure
#[derive(Serialize)]
struct SkirmishResult {
    seed: u64,
    difficulty: Difficulty,
    player_tier: Difficulty,
    outcome: String,
    winner: Option<Side>,
    turns: u32,
    actions: usize,
    player_remaining: usize,
    opponent_remaining: usize,
    skipped_actions: usize,
}

fn load_config(path: Option<&PathBuf>) -> Result<BattleConfig, String> {
    let Some(path) = path else {
        return Ok(BattleConfig::default());
    };
    let text = std::fs::read_to_string(path)
        .map_err(|e| format!("failed to read {}: {e}", path.display()))?;
    serde_json::from_str(&text).map_err(|e| format!("invalid config {}: {e}", path.display()))
}

/// Play one battle to the end or the turn limit.
fn play(
    engine: &BattleEngine,
    mut state: BattleState,
    player_tier: Difficulty,
    seed: u64,
    max_turns: u32,
) -> (BattleState, usize) {
    let mut player = AiPlanner::new(DifficultyConfig::for_tier(player_tier), seed);
    let mut opponent = AiPlanner::for_engine(engine, seed.wrapping_add(1));
    let mut skipped = 0;

    while !state.is_over() && state.turn <= max_turns {
        let (next, report) = match state.active {
            Side::Player => run_ai_turn(engine, &mut player, &state),
            Side::Opponent => run_ai_turn(engine, &mut opponent, &state),
        };
        skipped += report.skipped.len();
        if !report.ended_turn && !next.is_over() {
            tracing::warn!(side = %report.side, "turn did not pass, stopping");
            state = next;
            break;
        }
        state = next;
    }
    (state, skipped)
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = match load_config(args.config.as_ref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    };
    let base_seed = args.seed.unwrap_or_else(rand::random);
    let player_tier = args.player_tier.unwrap_or(args.difficulty);

    for offset in 0..args.battles {
        let seed = base_seed.wrapping_add(u64::from(offset));
        let built = BattleBuilder::new()
            .config(config.clone())
            .difficulty(args.difficulty)
            .build(seed);
        let (engine, state) = match built {
            Ok(battle) => battle,
            Err(e) => {
                eprintln!("failed to set up battle: {e}");
                return ExitCode::FAILURE;
            }
        };

        let (state, skipped) = play(&engine, state, player_tier, seed, args.max_turns);
        let outcome = if state.is_over() {
            state.phase.to_string()
        } else {
            "draw".to_string()
        };

        if args.format == "json" {
            let result = SkirmishResult {
                seed,
                difficulty: args.difficulty,
                player_tier,
                outcome,
                winner: state.winner(),
                turns: state.turn,
                actions: state.history.len(),
                player_remaining: state.sides[Side::Player].creatures_remaining(),
                opponent_remaining: state.sides[Side::Opponent].creatures_remaining(),
                skipped_actions: skipped,
            };
            match serde_json::to_string(&result) {
                Ok(line) => println!("{line}"),
                Err(e) => {
                    eprintln!("failed to encode result: {e}");
                    return ExitCode::FAILURE;
                }
            }
        } else {
            println!("=== seed {seed}: {} vs {} ===", player_tier, args.difficulty);
            for entry in state.log.iter() {
                println!("{entry}");
            }
            println!("=== {outcome} after {} turns ===", state.turn);
        }
    }
    ExitCode::SUCCESS
}
