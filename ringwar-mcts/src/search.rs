//! MCTS Search Loop
//!
//! Implements the core MCTS algorithm:
//! 1. Selection/Expansion - UCT descent, generating children on first visit
//! 2. Simulation - Random rollout to a terminal state
//! 3. Backpropagation - Update statistics up to the root
//!
//! ## Architecture
//! - Level 2: Search loop coordination
//! - Level 3: Individual MCTS phases
//! - Level 4: Statistics collection

use rand::Rng;
use ringwar_core::{Budget, EngineError, Move, PathCache, Result};

use crate::rollout::cpu_rollout;
use crate::tree::{MctsTree, NodeId};
use crate::MctsConfig;

// ============================================================================
// SEARCH RESULT
// ============================================================================

/// Result of MCTS search
#[derive(Debug)]
pub struct SearchResult {
    /// The final tree after search
    pub tree: MctsTree,
    /// Total simulations performed
    pub total_simulations: u32,
    /// Statistics for each root move
    pub move_stats: Vec<MoveStatistics>,
}

/// Statistics for a single move at root
#[derive(Clone, Debug, PartialEq)]
pub struct MoveStatistics {
    pub mv: Move,
    pub visits: u32,
    pub mean_value: f32,
}

impl SearchResult {
    /// Get the best move (most visited)
    pub fn best_move(&self) -> Option<Move> {
        self.tree.best_move()
    }

    /// Get all moves sorted by visits
    pub fn moves_by_visits(&self) -> Vec<(Move, u32)> {
        let mut moves: Vec<_> = self.move_stats.iter().map(|s| (s.mv, s.visits)).collect();
        moves.sort_by(|a, b| b.1.cmp(&a.1));
        moves
    }
}

// ============================================================================
// SEARCH LOOP (Level 2 - Main Coordination)
// ============================================================================

/// Run MCTS until the budget expires or the iteration cap is reached
///
/// Fails with `NoLegalMoves` when the root has no children and with
/// `NoResult` when the budget runs out before the first iteration.
pub fn run_search<R: Rng>(
    mut tree: MctsTree,
    config: &MctsConfig,
    cache: &PathCache,
    budget: &Budget,
    rng: &mut R,
) -> Result<SearchResult> {
    let root = tree.root();
    let searcher = tree.get(root).state.current_player();

    tree.expand(root, cache)?;
    if tree.get(root).children.is_empty() {
        return Err(EngineError::NoLegalMoves(searcher));
    }

    let limit = config.max_iterations.unwrap_or(u32::MAX);
    let mut iterations = 0;
    while iterations < limit && !budget.expired() {
        run_single_iteration(&mut tree, config, cache, rng)?;
        iterations += 1;
    }

    if iterations == 0 {
        return Err(EngineError::NoResult);
    }

    let total_simulations = tree.total_simulations();
    let move_stats = collect_move_statistics(&tree);

    tracing::debug!(
        "MCTS {}: {} iterations, {} nodes in {:?}",
        searcher,
        total_simulations,
        tree.len(),
        budget.elapsed()
    );

    Ok(SearchResult {
        tree,
        total_simulations,
        move_stats,
    })
}

// ============================================================================
// ITERATION (Level 3 - MCTS Phases)
// ============================================================================

fn run_single_iteration<R: Rng>(
    tree: &mut MctsTree,
    config: &MctsConfig,
    cache: &PathCache,
    rng: &mut R,
) -> Result<()> {
    let searcher = tree.get(tree.root()).state.current_player();

    // Phase 1: Selection + expansion
    let path = tree.select_leaf(cache, config.exploration)?;
    let leaf_id = path.last().copied().unwrap_or(NodeId::ROOT);

    // Phase 2: Simulation
    let rollout = cpu_rollout(
        &tree.get(leaf_id).state,
        cache,
        searcher,
        config.max_rollout_depth,
        rng,
    )?;

    // Phase 3: Backpropagation
    tree.backpropagate(leaf_id, rollout.score);
    Ok(())
}

// ============================================================================
// STATISTICS COLLECTION (Level 4 - Utilities)
// ============================================================================

fn collect_move_statistics(tree: &MctsTree) -> Vec<MoveStatistics> {
    tree.move_statistics()
        .into_iter()
        .map(|(mv, visits, mean_value)| MoveStatistics {
            mv,
            visits,
            mean_value,
        })
        .collect()
}

// ============================================================================
// TESTS
// ============================================================================
