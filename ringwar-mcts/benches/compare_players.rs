//! MCTS vs Alpha-Beta Performance Benchmark
//!
//! Compares:
//! 1. Time to find a move at various depths/iteration counts
//! 2. Move quality via head-to-head games

use std::sync::Arc;
use std::time::{Duration, Instant};

use ringwar_core::{
    AlphaBetaAI, AlphaBetaConfig, Board, BoardLayout, ConnectivityGraph, GameState, PathCache,
    PlayerId, UnitClass,
};
use ringwar_mcts::{MctsConfig, MctsPlayer};

const WHITE: PlayerId = PlayerId(0);
const BLACK: PlayerId = PlayerId(1);

// ============================================================================
// TEST POSITIONS
// ============================================================================

fn cache() -> (PathCache, ConnectivityGraph) {
    let graph = ConnectivityGraph::ring_board(BoardLayout::default()).expect("default layout");
    (PathCache::new(Arc::new(graph.clone())), graph)
}

/// Matron + 2 units per side on opposite halves of the board
fn test_position_balanced(graph: &ConnectivityGraph) -> GameState {
    let mut board = Board::new(graph, vec![WHITE, BLACK]);
    let setup = [
        (WHITE, UnitClass::MatronMother, 52),
        (WHITE, UnitClass::Warrior, 51),
        (WHITE, UnitClass::Wizard, 53),
        (BLACK, UnitClass::MatronMother, 60),
        (BLACK, UnitClass::Warrior, 59),
        (BLACK, UnitClass::Wizard, 61),
    ];
    for (owner, class, node) in setup {
        board.place(owner, class, node).expect("free node");
    }
    GameState::new(board, WHITE).expect("white is seated")
}

/// Closer contact, pawns and a priestess each
fn test_position_midgame(graph: &ConnectivityGraph) -> GameState {
    let mut board = Board::new(graph, vec![WHITE, BLACK]);
    let setup = [
        (WHITE, UnitClass::MatronMother, 49),
        (WHITE, UnitClass::Priestess, 33),
        (WHITE, UnitClass::Warrior, 18),
        (WHITE, UnitClass::Pawn, 34),
        (WHITE, UnitClass::Pawn, 20),
        (BLACK, UnitClass::MatronMother, 57),
        (BLACK, UnitClass::Priestess, 41),
        (BLACK, UnitClass::Warrior, 26),
        (BLACK, UnitClass::Pawn, 40),
        (BLACK, UnitClass::Pawn, 24),
    ];
    for (owner, class, node) in setup {
        board.place(owner, class, node).expect("free node");
    }
    GameState::new(board, WHITE).expect("white is seated")
}

// ============================================================================
// BENCHMARK STRUCTURES
// ============================================================================

#[derive(Clone, Debug)]
struct BenchmarkResult {
    player: String,
    config: String,
    avg_move_time_ms: f64,
    moves_per_second: f64,
    total_time_ms: f64,
}

impl BenchmarkResult {
    fn to_table_row(&self) -> String {
        format!(
            "| {} | {} | {:.2}ms | {:.0} | {:.0}ms |",
            self.player, self.config, self.avg_move_time_ms, self.moves_per_second, self.total_time_ms
        )
    }
}

fn ab_config(depth: u32) -> AlphaBetaConfig {
    AlphaBetaConfig::default()
        .with_depth(depth)
        .with_timeout(Duration::from_secs(30))
}

fn mcts_config(iterations: u32) -> MctsConfig {
    MctsConfig::default()
        .with_iterations(iterations)
        .with_time_budget(Duration::from_secs(30))
        .with_max_rollout_depth(60)
        .with_seed(7)
}

// ============================================================================
// BENCHMARK: Time to Find Move
// ============================================================================

fn benchmark_move_time(state: &GameState, cache: &PathCache, position_name: &str) -> Vec<BenchmarkResult> {
    println!("\n=== MOVE TIME BENCHMARK: {} ===", position_name);
    let mut results = Vec::new();
    let repeats = 3;

    for depth in [1, 2, 3] {
        print!("  AB depth {} ... ", depth);
        let mut ai = AlphaBetaAI::new(ab_config(depth));
        let mut total_time = 0.0;
        let mut pruned = 0;

        for _ in 0..repeats {
            let start = Instant::now();
            if let Ok(outcome) = ai.search(state, cache) {
                pruned = outcome.pruned;
            }
            total_time += start.elapsed().as_secs_f64() * 1000.0;
        }

        let avg_time = total_time / repeats as f64;
        results.push(BenchmarkResult {
            player: "Alpha-Beta".to_string(),
            config: format!("Depth {}", depth),
            avg_move_time_ms: avg_time,
            moves_per_second: 1000.0 / avg_time,
            total_time_ms: total_time,
        });
        println!("{:.2}ms ({} cutoffs)", avg_time, pruned);
    }

    for iterations in [100, 500, 1000] {
        print!("  MCTS {} iterations ... ", iterations);
        let mut player = MctsPlayer::new(mcts_config(iterations));
        let mut total_time = 0.0;

        for _ in 0..repeats {
            let start = Instant::now();
            let _ = player.best_move(state, cache);
            total_time += start.elapsed().as_secs_f64() * 1000.0;
        }

        let avg_time = total_time / repeats as f64;
        results.push(BenchmarkResult {
            player: "MCTS".to_string(),
            config: format!("{} iterations", iterations),
            avg_move_time_ms: avg_time,
            moves_per_second: 1000.0 / avg_time,
            total_time_ms: total_time,
        });
        println!("{:.2}ms", avg_time);
    }

    results
}

// ============================================================================
// BENCHMARK: Move Quality (Head-to-Head Games)
// ============================================================================

fn benchmark_move_quality(initial: &GameState, cache: &PathCache, position_name: &str) {
    println!("\n=== MOVE QUALITY BENCHMARK: {} ===", position_name);
    let max_moves = 80;

    for game_num in 0..3 {
        let mut ab = AlphaBetaAI::new(ab_config(2));
        let mut mcts = MctsPlayer::new(mcts_config(300).with_seed(game_num));
        let mut state = initial.clone();
        let mut moves = 0;

        while !state.is_over() && moves < max_moves {
            let choice = if state.current_player() == WHITE {
                ab.best_move(&state, cache)
            } else {
                mcts.best_move(&state, cache)
            };
            let Ok(mv) = choice else { break };
            if state.simulate(mv).is_err() {
                break;
            }
            state.eliminate_defeated();
            moves += 1;
        }

        let winner = match state.winner() {
            Some(WHITE) => "AB D2 (White)",
            Some(_) => "MCTS 300 (Black)",
            None => "Draw",
        };
        println!("  Game {}: {} ({} moves)", game_num + 1, winner, moves);
    }
}

// ============================================================================
// MAIN
// ============================================================================

fn main() {
    println!("\n╔════════════════════════════════════════════════════════════╗");
    println!("║  RINGWAR: MCTS vs Alpha-Beta Benchmark                    ║");
    println!("╚════════════════════════════════════════════════════════════╝");

    let (cache, graph) = cache();
    cache.warm(UnitClass::all_restrictions()).expect("class restrictions are valid");

    let balanced = test_position_balanced(&graph);
    let midgame = test_position_midgame(&graph);

    let mut all_results = benchmark_move_time(&balanced, &cache, "Balanced (Matron + 2)");
    all_results.extend(benchmark_move_time(&midgame, &cache, "Mid-Game (Matron + 4)"));

    benchmark_move_quality(&balanced, &cache, "Balanced");

    println!("\n| Player      | Config        | Avg Move Time | Moves/Sec | Total Time |");
    println!("├─────────────┼───────────────┼───────────────┼───────────┼────────────┤");
    for result in &all_results {
        println!("{}", result.to_table_row());
    }
    println!();
}
