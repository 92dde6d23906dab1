//! RINGWAR MCTS - Monte Carlo Tree Search
//!
//! This crate provides a time-budgeted MCTS player:
//! - Tree policy (UCT), full expansion on first visit
//! - Uniform random rollouts scored by material ratio
//! - Backpropagation, robust-child move selection

pub mod rollout;
pub mod search;
pub mod tree;

use std::time::Duration;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use ringwar_core::{Budget, CancelToken, EngineError, GameState, Move, PathCache, Result};
use serde::{Deserialize, Serialize};

pub use search::{run_search, MoveStatistics, SearchResult};
pub use tree::{MctsNode, MctsTree, NodeId, NodeStats};

/// MCTS configuration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MctsConfig {
    pub time_budget: Duration,
    /// Stop early after this many iterations
    pub max_iterations: Option<u32>,
    pub exploration: f32,
    pub max_rollout_depth: u32,
    pub seed: Option<u64>,
}

impl Default for MctsConfig {
    fn default() -> Self {
        Self {
            time_budget: Duration::from_secs(10),
            max_iterations: None,
            exploration: 1.5,
            max_rollout_depth: 200,
            seed: None,
        }
    }
}

impl MctsConfig {
    pub fn with_iterations(mut self, iterations: u32) -> Self {
        self.max_iterations = Some(iterations);
        self
    }

    pub fn with_time_budget(mut self, budget: Duration) -> Self {
        self.time_budget = budget;
        self
    }

    pub fn with_exploration(mut self, exploration: f32) -> Self {
        self.exploration = exploration;
        self
    }

    pub fn with_max_rollout_depth(mut self, depth: u32) -> Self {
        self.max_rollout_depth = depth;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

/// MCTS player; builds a fresh tree every move
pub struct MctsPlayer {
    config: MctsConfig,
    rng: ChaCha8Rng,
    cancel: Option<CancelToken>,
}

impl MctsPlayer {
    pub fn new(config: MctsConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        Self {
            config,
            rng,
            cancel: None,
        }
    }

    pub fn with_cancel(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub fn config(&self) -> &MctsConfig {
        &self.config
    }

    /// Search from `state` within the configured budget
    pub fn search(&mut self, state: &GameState, cache: &PathCache) -> Result<SearchResult> {
        let budget = Budget::new(self.config.time_budget, self.cancel.clone());
        run_search(MctsTree::new(state.clone()), &self.config, cache, &budget, &mut self.rng)
    }

    /// Get best move using MCTS
    pub fn best_move(&mut self, state: &GameState, cache: &PathCache) -> Result<Move> {
        self.search(state, cache)?.best_move().ok_or(EngineError::NoResult)
    }
}
