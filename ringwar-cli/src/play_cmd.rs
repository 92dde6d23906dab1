//! Play command - run one match between computer players
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: run() - orchestration
//! - Level 2: build_config(), report_results()
//! - Level 3: apply_overrides()
//! - Level 4: formatting utilities

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};

use ringwar_play::{GameOutcome, GameRunner, MatchConfig, PlayerSetup, Strategy};

// ============================================================================
// COMMAND ARGUMENTS (Level 4 - Configuration)
// ============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum StrategyArg {
    Random,
    Weighted,
    Best,
    AlphaBeta,
    Mcts,
}

impl From<StrategyArg> for Strategy {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::Random => Strategy::Random,
            StrategyArg::Weighted => Strategy::WeightedFitness,
            StrategyArg::Best => Strategy::BestFitness,
            StrategyArg::AlphaBeta => Strategy::AlphaBeta,
            StrategyArg::Mcts => Strategy::MonteCarlo,
        }
    }
}

#[derive(Args, Debug, Default)]
pub struct PlayArgs {
    /// Match config JSON file; flags below override it
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Number of players
    #[arg(long)]
    pub players: Option<usize>,

    /// Strategy of every player
    #[arg(long, value_enum)]
    pub strategy: Option<StrategyArg>,

    /// Alpha-beta search depth
    #[arg(long)]
    pub depth: Option<u32>,

    /// MCTS iterations per move
    #[arg(long)]
    pub iterations: Option<u32>,

    /// Search time budget per move in milliseconds
    #[arg(long)]
    pub timeout_ms: Option<u64>,

    /// Order alpha-beta moves by fitness
    #[arg(long)]
    pub ordering: bool,

    /// Total moves before the match is a draw
    #[arg(long)]
    pub max_turns: Option<u32>,

    /// Write the effective config to this file
    #[arg(long, value_name = "FILE")]
    pub save_config: Option<PathBuf>,

    /// Output results as JSON
    #[arg(long)]
    pub json: bool,
}

// ============================================================================
// LEVEL 1 - ORCHESTRATION
// ============================================================================

/// Run play command
///
/// 1. Build the match config from file and flags
/// 2. Play the match
/// 3. Report results
pub fn run(args: PlayArgs, seed: Option<u64>) -> Result<()> {
    let config = build_config(&args, seed)?;

    if let Some(path) = &args.save_config {
        config.save(path)?;
        tracing::info!("Saved match config to {}", path.display());
    }

    tracing::info!(
        "Starting match: {} players, {:?}, max {} turns",
        config.players.len(),
        config.ai.strategy,
        config.max_turns
    );

    let mut runner = GameRunner::new(config.clone())?;
    let outcome = runner.play().context("Match aborted")?;

    report_results(&outcome, &config, args.json);
    Ok(())
}

// ============================================================================
// LEVEL 2 - PHASES
// ============================================================================

fn build_config(args: &PlayArgs, seed: Option<u64>) -> Result<MatchConfig> {
    let base = match &args.config {
        Some(path) => MatchConfig::load(path)
            .with_context(|| format!("Failed to load match config: {}", path.display()))?,
        None => MatchConfig::default(),
    };
    let config = apply_overrides(base, args, seed);
    config.validate()?;
    Ok(config)
}

fn report_results(outcome: &GameOutcome, config: &MatchConfig, json: bool) {
    if json {
        print_json_results(outcome);
    } else {
        print_text_results(outcome, config);
    }
}

// ============================================================================
// LEVEL 3 - STEPS
// ============================================================================

fn apply_overrides(mut config: MatchConfig, args: &PlayArgs, seed: Option<u64>) -> MatchConfig {
    if let Some(count) = args.players {
        config.players = (0..count).map(|i| PlayerSetup::new(seat_name(i, count))).collect();
    }
    if let Some(strategy) = args.strategy {
        config.ai.strategy = strategy.into();
        for player in &mut config.players {
            player.ai = None;
        }
    }
    if let Some(depth) = args.depth {
        config.ai.alpha_beta = config.ai.alpha_beta.clone().with_depth(depth);
    }
    if let Some(iterations) = args.iterations {
        config.ai.mcts = config.ai.mcts.clone().with_iterations(iterations);
    }
    if let Some(ms) = args.timeout_ms {
        config.ai = config.ai.clone().with_timeout(Duration::from_millis(ms));
    }
    if args.ordering {
        config.ai.alpha_beta = config.ai.alpha_beta.clone().with_ordering(true);
    }
    if let Some(max_turns) = args.max_turns {
        config.max_turns = max_turns;
    }
    if let Some(seed) = seed {
        config.ai = config.ai.clone().with_seed(seed);
    }
    config
}

// ============================================================================
// LEVEL 4 - UTILITIES
// ============================================================================

fn seat_name(index: usize, count: usize) -> String {
    match (count, index) {
        (2, 0) => "North".to_string(),
        (2, 1) => "South".to_string(),
        _ => format!("Player {}", index + 1),
    }
}

/// Print results as JSON
fn print_json_results(outcome: &GameOutcome) {
    if let Ok(json) = serde_json::to_string_pretty(outcome) {
        println!("{}", json);
    }
}

/// Print results as text
fn print_text_results(outcome: &GameOutcome, config: &MatchConfig) {
    println!("\n=== Match Results ===");
    match &outcome.winner_name {
        Some(name) => println!("Winner:      {}", name),
        None => println!("Winner:      none (draw)"),
    }
    println!("Turns:       {}", outcome.turns);
    println!("Moves:       {}", outcome.moves.len());

    if !outcome.eliminated.is_empty() {
        println!("\nEliminations:");
        for e in &outcome.eliminated {
            let name = config
                .players
                .get(usize::from(e.player.0))
                .map_or_else(|| e.player.to_string(), |p| p.name.clone());
            println!("  Turn {}: {}", e.turn, name);
        }
    }

    let total_ms: u128 = outcome.moves.iter().map(|m| m.elapsed_ms).sum();
    if !outcome.moves.is_empty() {
        println!(
            "\nAvg think time: {:.1}ms",
            total_ms as f64 / outcome.moves.len() as f64
        );
    }
}

// ============================================================================
// TESTS
// ============================================================================
