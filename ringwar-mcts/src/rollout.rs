//! Random rollouts from a leaf state
//!
//! ## Architecture
//! - Level 3: Single rollout implementation
//! - Level 4: Terminal test, random move selection

use rand::prelude::*;
use ringwar_core::{evaluate, GameState, Move, PathCache, PlayerId, Result};

// ============================================================================
// ROLLOUT RESULT
// ============================================================================

/// Result of a rollout simulation
#[derive(Clone, Debug)]
pub struct RolloutResult {
    /// Material ratio for the searching player at the end of the rollout
    pub score: f32,
    /// Number of moves played
    pub moves_played: u32,
}

// ============================================================================
// CPU ROLLOUT (Level 3 - Single Rollout)
// ============================================================================

/// Play uniformly random legal moves until a terminal position or `max_depth`
///
/// A player without legal moves passes. The rollout also stops once nobody
/// can move.
pub fn cpu_rollout<R: Rng>(
    state: &GameState,
    cache: &PathCache,
    searcher: PlayerId,
    max_depth: u32,
    rng: &mut R,
) -> Result<RolloutResult> {
    let mut current = state.clone();
    let mut moves_played = 0;
    let mut stalled = 0;

    while !is_terminal(&current) && moves_played < max_depth {
        let legal_moves = current.legal_moves(cache)?;
        if legal_moves.is_empty() {
            stalled += 1;
            if stalled >= current.board().active_players().len() {
                break;
            }
            current.pass_turn();
            continue;
        }

        stalled = 0;
        let mv = select_random_move(&legal_moves, rng);
        current.simulate(mv)?;
        moves_played += 1;
    }

    Ok(RolloutResult {
        score: evaluate(current.board(), searcher),
        moves_played,
    })
}

// ============================================================================
// HELPERS (Level 4)
// ============================================================================

/// Game over, or some player is down to essential units only
fn is_terminal(state: &GameState) -> bool {
    state.is_over()
        || state
            .board()
            .active_players()
            .into_iter()
            .any(|p| state.board().only_essential(p))
}

fn select_random_move<R: Rng>(moves: &[Move], rng: &mut R) -> Move {
    let idx = rng.gen_range(0..moves.len());
    moves[idx]
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand_chacha::ChaCha8Rng;
    use ringwar_core::{Board, BoardLayout, ConnectivityGraph, UnitClass};
    use std::sync::Arc;

    const A: PlayerId = PlayerId(0);
    const B: PlayerId = PlayerId(1);

    fn cache_and_board() -> (PathCache, Board) {
        let graph = ConnectivityGraph::ring_board(BoardLayout::default()).unwrap();
        let board = Board::new(&graph, vec![A, B]);
        (PathCache::new(Arc::new(graph)), board)
    }

    #[test]
    fn test_rollout_respects_depth_cap() {
        let (cache, mut board) = cache_and_board();
        board.place(A, UnitClass::MatronMother, 16).unwrap();
        board.place(A, UnitClass::Warrior, 20).unwrap();
        board.place(A, UnitClass::Wizard, 36).unwrap();
        board.place(B, UnitClass::MatronMother, 56).unwrap();
        board.place(B, UnitClass::Warrior, 52).unwrap();
        board.place(B, UnitClass::Wizard, 44).unwrap();
        let state = GameState::new(board, A).unwrap();

        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let result = cpu_rollout(&state, &cache, A, 12, &mut rng).unwrap();
        assert!(result.moves_played <= 12);
        assert!(result.score >= 0.0);
    }

    #[test]
    fn test_terminal_start_scores_immediately() {
        let (cache, mut board) = cache_and_board();
        board.place(A, UnitClass::MatronMother, 16).unwrap();
        board.place(A, UnitClass::Warrior, 17).unwrap();
        board.place(B, UnitClass::MatronMother, 40).unwrap();
        let state = GameState::new(board, A).unwrap();

        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let result = cpu_rollout(&state, &cache, A, 50, &mut rng).unwrap();
        assert_eq!(result.moves_played, 0);
        assert!((result.score - 13.0 / 10.0).abs() < 1e-6);
    }

    #[test]
    fn test_same_seed_same_rollout() {
        let (cache, mut board) = cache_and_board();
        board.place(A, UnitClass::MatronMother, 16).unwrap();
        board.place(A, UnitClass::Pawn, 33).unwrap();
        board.place(B, UnitClass::MatronMother, 24).unwrap();
        board.place(B, UnitClass::Pawn, 41).unwrap();
        let state = GameState::new(board, A).unwrap();

        let run = |seed| {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            cpu_rollout(&state, &cache, A, 40, &mut rng).unwrap().score
        };
        assert_eq!(run(9), run(9));
    }
}
