//! Depth- and time-bounded minimax AI with alpha-beta pruning
//!
//! Node type follows whose turn it is: the searching player maximises the
//! evaluation, every other player minimises it. Children are explored with
//! simulate -> recurse -> undo on a single working copy.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::appraise::{AppraiserWeights, PathAppraiser};
use crate::budget::{Budget, CancelToken};
use crate::cache::PathCache;
use crate::error::{EngineError, Result};
use crate::eval::evaluate;
use crate::game::{GameState, Move};
use crate::units::PlayerId;

// ============================================================================
// CONSTANTS
// ============================================================================

/// Consecutive timed-out searches tolerated before the depth is reduced
const ADAPTIVE_TIMEOUT_LIMIT: u32 = 5;

// ============================================================================
// CONFIGURATION
// ============================================================================

/// Alpha-beta search settings
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlphaBetaConfig {
    pub max_depth: u32,
    pub timeout: Duration,
    /// Reduce depth after repeated timeouts
    pub adaptive_depth: bool,
    /// Try moves in lite-fitness order
    pub ordering: bool,
    pub pruning: bool,
    pub weights: AppraiserWeights,
}

impl Default for AlphaBetaConfig {
    fn default() -> Self {
        Self {
            max_depth: 3,
            timeout: Duration::from_secs(10),
            adaptive_depth: true,
            ordering: false,
            pruning: true,
            weights: AppraiserWeights::default(),
        }
    }
}

impl AlphaBetaConfig {
    pub fn with_depth(mut self, depth: u32) -> Self {
        self.max_depth = depth.max(1);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_ordering(mut self, ordering: bool) -> Self {
        self.ordering = ordering;
        self
    }

    /// Plain minimax, for checking pruning against
    pub fn without_pruning(mut self) -> Self {
        self.pruning = false;
        self
    }
}

/// Result and diagnostics of one search
#[derive(Clone, Debug, PartialEq)]
pub struct SearchOutcome {
    pub best: Move,
    pub value: f32,
    /// Leaves evaluated
    pub explored: u64,
    /// Cutoffs taken
    pub pruned: u64,
    pub timed_out: bool,
    pub depth: u32,
    pub elapsed: Duration,
}

// ============================================================================
// ALPHA-BETA AI
// ============================================================================

/// Alpha-beta player; keeps its adaptive depth across turns
pub struct AlphaBetaAI {
    config: AlphaBetaConfig,
    timeouts: u32,
    cancel: Option<CancelToken>,
}

impl AlphaBetaAI {
    pub fn new(config: AlphaBetaConfig) -> Self {
        Self {
            config,
            timeouts: 0,
            cancel: None,
        }
    }

    pub fn with_cancel(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub fn config(&self) -> &AlphaBetaConfig {
        &self.config
    }

    /// Current depth limit, after any adaptive reductions
    pub fn max_depth(&self) -> u32 {
        self.config.max_depth
    }

    /// Search for the best move of the player to move
    pub fn search(&mut self, state: &GameState, cache: &PathCache) -> Result<SearchOutcome> {
        let budget = Budget::new(self.config.timeout, self.cancel.clone());
        let appraiser = self
            .config
            .ordering
            .then(|| PathAppraiser::new(cache, self.config.weights));

        let mut search = Search {
            cache,
            appraiser,
            budget: &budget,
            searcher: state.current_player(),
            max_depth: self.config.max_depth,
            pruning: self.config.pruning,
            explored: 0,
            pruned: 0,
            timed_out: false,
        };

        let mut working = state.clone();
        let result = search.root(&mut working);
        let (explored, pruned, timed_out) = (search.explored, search.pruned, search.timed_out);
        let depth = self.config.max_depth;
        self.record_timeout(timed_out);
        let (best, value) = result?;

        tracing::debug!(
            "Alpha-beta {}: {:?} value={:.3} explored={} pruned={} depth={} timed_out={} in {:?}",
            state.current_player(),
            best,
            value,
            explored,
            pruned,
            depth,
            timed_out,
            budget.elapsed()
        );

        Ok(SearchOutcome {
            best,
            value,
            explored,
            pruned,
            timed_out,
            depth,
            elapsed: budget.elapsed(),
        })
    }

    /// Get best move for current position
    pub fn best_move(&mut self, state: &GameState, cache: &PathCache) -> Result<Move> {
        self.search(state, cache).map(|outcome| outcome.best)
    }

    fn record_timeout(&mut self, timed_out: bool) {
        if !self.config.adaptive_depth {
            return;
        }
        if !timed_out {
            self.timeouts = 0;
            return;
        }
        self.timeouts += 1;
        if self.timeouts >= ADAPTIVE_TIMEOUT_LIMIT {
            self.timeouts = 0;
            if self.config.max_depth > 1 {
                self.config.max_depth -= 1;
                tracing::warn!(
                    "{} consecutive timed-out searches, reducing depth to {}",
                    ADAPTIVE_TIMEOUT_LIMIT,
                    self.config.max_depth
                );
            }
        }
    }
}

// ============================================================================
// MINIMAX WITH ALPHA-BETA
// ============================================================================

struct Search<'a> {
    cache: &'a PathCache,
    appraiser: Option<PathAppraiser<'a>>,
    budget: &'a Budget,
    searcher: PlayerId,
    max_depth: u32,
    pruning: bool,
    explored: u64,
    pruned: u64,
    timed_out: bool,
}

impl Search<'_> {
    fn expired(&mut self) -> bool {
        if self.budget.expired() {
            self.timed_out = true;
        }
        self.timed_out
    }

    fn root(&mut self, state: &mut GameState) -> Result<(Move, f32)> {
        if self.expired() {
            return Err(EngineError::NoResult);
        }
        let moves = self.ordered_moves(state)?;
        if moves.is_empty() {
            return Err(EngineError::NoLegalMoves(self.searcher));
        }

        let mut best: Option<(Move, f32)> = None;
        let mut alpha = f32::NEG_INFINITY;
        for mv in moves {
            if best.is_some() && self.expired() {
                break;
            }
            let (score, interrupted) = self.explore_child(state, mv, alpha)?;
            // A partly searched reply tree only bounds the score
            if interrupted && best.is_some() {
                break;
            }

            if best.map_or(true, |(_, value)| score > value) {
                best = Some((mv, score));
            }
            alpha = alpha.max(score);
        }

        best.ok_or(EngineError::NoResult)
    }

    /// Score one root move; flags whether the budget ran out inside its subtree
    fn explore_child(&mut self, state: &mut GameState, mv: Move, alpha: f32) -> Result<(f32, bool)> {
        let was_timed_out = self.timed_out;
        let undo = state.simulate(mv)?;
        let score = self.minimax(state, 1, alpha, f32::INFINITY);
        state.undo(&undo);
        Ok((score?, self.timed_out && !was_timed_out))
    }

    fn minimax(&mut self, state: &mut GameState, depth: u32, mut alpha: f32, mut beta: f32) -> Result<f32> {
        if depth >= self.max_depth || self.expired() {
            return Ok(self.leaf(state));
        }

        let moves = self.ordered_moves(state)?;
        if moves.is_empty() {
            return Ok(self.leaf(state));
        }

        let maximizing = state.current_player() == self.searcher;
        let mut best = if maximizing { f32::NEG_INFINITY } else { f32::INFINITY };

        for mv in moves {
            let undo = state.simulate(mv)?;
            let score = self.minimax(state, depth + 1, alpha, beta);
            state.undo(&undo);
            let score = score?;

            if maximizing {
                best = best.max(score);
                alpha = alpha.max(score);
            } else {
                best = best.min(score);
                beta = beta.min(score);
            }

            if self.pruning && alpha >= beta {
                self.pruned += 1;
                break;
            }
        }

        Ok(best)
    }

    fn leaf(&mut self, state: &GameState) -> f32 {
        self.explored += 1;
        evaluate(state.board(), self.searcher)
    }

    // ========================================================================
    // MOVE ORDERING
    // ========================================================================

    /// Legal moves, best lite fitness first when ordering is on
    fn ordered_moves(&self, state: &GameState) -> Result<Vec<Move>> {
        let moves = state.legal_moves(self.cache)?;
        let Some(appraiser) = &self.appraiser else {
            return Ok(moves);
        };

        let mut scored: Vec<(Move, f32)> = Vec::with_capacity(moves.len());
        let mut i = 0;
        while i < moves.len() {
            // Moves of one unit are contiguous
            let from = moves[i].from;
            let end = moves[i..].iter().position(|m| m.from != from).map_or(moves.len(), |n| i + n);
            let destinations: Vec<_> = moves[i..end].iter().map(|m| m.to).collect();
            for rating in appraiser.rate_moves_lite(state.board(), from, &destinations) {
                scored.push((Move::new(from, rating.destination), rating.fitness));
            }
            i = end;
        }

        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        Ok(scored.into_iter().map(|(mv, _)| mv).collect())
    }
}

// ============================================================================
// TESTS
// ============================================================================
