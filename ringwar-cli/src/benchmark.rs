//! Benchmark command - compare alpha-beta and MCTS move times
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: run() - orchestration
//! - Level 2: run_alpha_beta_benchmarks(), run_mcts_benchmark(), report_results()
//! - Level 3: benchmark_alpha_beta(), benchmark_mcts(), play_moves()
//! - Level 4: timing utilities, formatting

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Args;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use ringwar_core::{
    AlphaBetaAI, AlphaBetaConfig, Board, ConnectivityGraph, EngineError, GameState, Move,
    PathCache, PlayerId, UnitClass,
};
use ringwar_mcts::{MctsConfig, MctsPlayer};
use ringwar_play::{deploy_armies, MatchConfig};

// ============================================================================
// COMMAND ARGUMENTS (Level 4 - Configuration)
// ============================================================================

#[derive(Args)]
pub struct BenchmarkArgs {
    /// Moves to play per benchmark
    #[arg(long, default_value = "10")]
    pub moves: u32,

    /// Maximum alpha-beta depth to test
    #[arg(long, default_value = "3")]
    pub depth: u32,

    /// MCTS iterations per move
    #[arg(long, default_value = "500")]
    pub mcts_iterations: u32,

    /// Time budget per move in milliseconds
    #[arg(long, default_value = "10000")]
    pub timeout_ms: u64,

    /// Output results as JSON
    #[arg(long)]
    pub json: bool,
}

/// Results of a single benchmark run
#[derive(Clone, Debug)]
struct BenchmarkResult {
    name: String,
    moves: u32,
    total_time: Duration,
    avg_time_per_move: Duration,
    notes: String,
}

/// All benchmark results
#[derive(Clone, Debug)]
struct AllResults {
    results: Vec<BenchmarkResult>,
    system_info: String,
}

// ============================================================================
// LEVEL 1 - ORCHESTRATION
// ============================================================================

/// Run benchmark command
///
/// 1. Set up the standard opening position
/// 2. Run alpha-beta at every depth up to the maximum
/// 3. Run MCTS
/// 4. Report all results
pub fn run(args: BenchmarkArgs, seed: Option<u64>) -> Result<()> {
    tracing::info!("Starting benchmarks: {} moves, max depth {}", args.moves, args.depth);

    let (cache, state) = opening_position()?;
    let mut all_results = AllResults {
        results: Vec::new(),
        system_info: get_system_info(),
    };

    run_alpha_beta_benchmarks(&args, &cache, &state, &mut all_results)?;
    run_mcts_benchmark(&args, seed, &cache, &state, &mut all_results)?;

    report_results(&all_results, &args);
    Ok(())
}

// ============================================================================
// LEVEL 2 - PHASES
// ============================================================================

/// Default match board with both armies deployed
fn opening_position() -> Result<(PathCache, GameState)> {
    let config = MatchConfig::default();
    let graph = ConnectivityGraph::ring_board(config.layout).context("Failed to build board")?;
    let players: Vec<PlayerId> = (0..config.players.len()).map(|i| PlayerId(i as u8)).collect();

    let mut board = Board::new(&graph, players.clone());
    deploy_armies(&graph, &mut board, &config.army).context("Failed to deploy armies")?;
    let state = GameState::new(board, players[0])?;

    let cache = PathCache::new(Arc::new(graph));
    let start = Instant::now();
    cache.warm(UnitClass::all_restrictions())?;
    tracing::info!(
        "Path tables for {} restrictions built in {}",
        cache.len(),
        format_duration(start.elapsed())
    );
    Ok((cache, state))
}

fn run_alpha_beta_benchmarks(
    args: &BenchmarkArgs,
    cache: &PathCache,
    state: &GameState,
    results: &mut AllResults,
) -> Result<()> {
    for depth in 1..=args.depth.max(1) {
        tracing::info!("Benchmarking alpha-beta at depth {}...", depth);
        let result = benchmark_alpha_beta(args, depth, cache, state)?;
        results.results.push(result);
    }
    Ok(())
}

fn run_mcts_benchmark(
    args: &BenchmarkArgs,
    seed: Option<u64>,
    cache: &PathCache,
    state: &GameState,
    results: &mut AllResults,
) -> Result<()> {
    tracing::info!("Benchmarking MCTS ({} iterations)...", args.mcts_iterations);
    let result = benchmark_mcts(args, seed, cache, state)?;
    results.results.push(result);
    Ok(())
}

/// Report all benchmark results
fn report_results(results: &AllResults, args: &BenchmarkArgs) {
    if args.json {
        print_json_results(results);
    } else {
        print_text_results(results);
    }
}

// ============================================================================
// LEVEL 3 - STEPS
// ============================================================================

fn benchmark_alpha_beta(
    args: &BenchmarkArgs,
    depth: u32,
    cache: &PathCache,
    initial: &GameState,
) -> Result<BenchmarkResult> {
    let config = AlphaBetaConfig::default()
        .with_depth(depth)
        .with_timeout(Duration::from_millis(args.timeout_ms));
    let mut ai = AlphaBetaAI::new(config);

    let mut explored = 0;
    let mut pruned = 0;
    let mut timeouts = 0;
    let (moves, total_time) = play_moves(initial, args.moves, |state| {
        let outcome = ai.search(state, cache)?;
        explored += outcome.explored;
        pruned += outcome.pruned;
        timeouts += u32::from(outcome.timed_out);
        Ok(outcome.best)
    })?;

    Ok(BenchmarkResult {
        name: format!("Alpha-Beta D{}", depth),
        moves,
        total_time,
        avg_time_per_move: average(total_time, moves),
        notes: format!("leaves {}, cutoffs {}, timeouts {}", explored, pruned, timeouts),
    })
}

fn benchmark_mcts(
    args: &BenchmarkArgs,
    seed: Option<u64>,
    cache: &PathCache,
    initial: &GameState,
) -> Result<BenchmarkResult> {
    let mut rng = create_rng(seed);
    let config = MctsConfig::default()
        .with_iterations(args.mcts_iterations)
        .with_time_budget(Duration::from_millis(args.timeout_ms))
        .with_seed(rng.gen());
    let mut player = MctsPlayer::new(config);

    let mut iterations = 0;
    let (moves, total_time) = play_moves(initial, args.moves, |state| {
        let result = player.search(state, cache)?;
        iterations += result.total_simulations;
        result.best_move().ok_or(EngineError::NoResult)
    })?;

    Ok(BenchmarkResult {
        name: format!("MCTS {} iters", args.mcts_iterations),
        moves,
        total_time,
        avg_time_per_move: average(total_time, moves),
        notes: format!("iterations {}", iterations),
    })
}

/// Play up to `limit` moves with one AI for every side, timing the decisions
fn play_moves<F>(initial: &GameState, limit: u32, mut choose: F) -> Result<(u32, Duration)>
where
    F: FnMut(&GameState) -> ringwar_core::Result<Move>,
{
    let mut state = initial.clone();
    let mut moves = 0;
    let mut thinking = Duration::ZERO;

    while !state.is_over() && moves < limit {
        let start = Instant::now();
        let mv = match choose(&state) {
            Ok(mv) => mv,
            Err(EngineError::NoLegalMoves(_)) => break,
            Err(e) => return Err(e.into()),
        };
        thinking += start.elapsed();
        state.simulate(mv)?;
        state.eliminate_defeated();
        moves += 1;
    }

    Ok((moves, thinking))
}

// ============================================================================
// LEVEL 4 - UTILITIES
// ============================================================================

/// Create RNG from seed or random
fn create_rng(seed: Option<u64>) -> ChaCha8Rng {
    match seed {
        Some(s) => ChaCha8Rng::seed_from_u64(s),
        None => ChaCha8Rng::from_entropy(),
    }
}

fn average(total: Duration, moves: u32) -> Duration {
    if moves == 0 {
        Duration::ZERO
    } else {
        total / moves
    }
}

/// Get system information string
fn get_system_info() -> String {
    format!(
        "ringwar {}, {} CPUs",
        env!("CARGO_PKG_VERSION"),
        std::thread::available_parallelism()
            .map(|p| p.get())
            .unwrap_or(1)
    )
}

/// Format duration for display
fn format_duration(d: Duration) -> String {
    if d.as_secs() >= 60 {
        format!("{}m {:.1}s", d.as_secs() / 60, (d.as_secs() % 60) as f64 + d.subsec_millis() as f64 / 1000.0)
    } else if d.as_secs() >= 1 {
        format!("{:.2}s", d.as_secs_f64())
    } else if d.as_millis() >= 1 {
        format!("{:.1}ms", d.as_secs_f64() * 1000.0)
    } else {
        format!("{:.1}us", d.as_secs_f64() * 1_000_000.0)
    }
}

/// Print results as JSON
fn print_json_results(results: &AllResults) {
    #[derive(serde::Serialize)]
    struct JsonBenchmark {
        name: String,
        moves: u32,
        total_time_ms: u64,
        avg_time_ms: f64,
        notes: String,
    }

    #[derive(serde::Serialize)]
    struct JsonOutput {
        system_info: String,
        benchmarks: Vec<JsonBenchmark>,
    }

    let output = JsonOutput {
        system_info: results.system_info.clone(),
        benchmarks: results
            .results
            .iter()
            .map(|r| JsonBenchmark {
                name: r.name.clone(),
                moves: r.moves,
                total_time_ms: r.total_time.as_millis() as u64,
                avg_time_ms: r.avg_time_per_move.as_secs_f64() * 1000.0,
                notes: r.notes.clone(),
            })
            .collect(),
    };

    if let Ok(json) = serde_json::to_string_pretty(&output) {
        println!("{}", json);
    }
}

/// Print results as text table
fn print_text_results(results: &AllResults) {
    println!("\n=== RINGWAR Benchmark Results ===");
    println!("System: {}\n", results.system_info);

    println!(
        "{:<20} {:>8} {:>12} {:>12}  {}",
        "Benchmark", "Moves", "Total Time", "Avg/Move", "Notes"
    );
    println!("{}", "-".repeat(80));

    for r in &results.results {
        println!(
            "{:<20} {:>8} {:>12} {:>12}  {}",
            r.name,
            r.moves,
            format_duration(r.total_time),
            format_duration(r.avg_time_per_move),
            r.notes
        );
    }
}
