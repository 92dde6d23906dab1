//! Search controller - one computer player's decision maker
//!
//! Level 2 - owns the strategy, its time/depth policy and the shared
//! path cache, and turns a game state into a move.

use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use ringwar_core::{
    AlphaBetaAI, CancelToken, FitnessAI, GameState, Move, PathCache, Restriction, Result,
};
use ringwar_mcts::{MctsPlayer, MoveStatistics};
use serde::Serialize;

use crate::config::{AiConfig, Strategy};

/// Search diagnostics; informational only
#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum Diagnostics {
    Fitness,
    AlphaBeta {
        explored: u64,
        pruned: u64,
        depth: u32,
        timed_out: bool,
    },
    MonteCarlo {
        iterations: u32,
        best_visits: u32,
    },
}

/// Chosen move plus how it was found
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Decision {
    pub mv: Move,
    pub diagnostics: Diagnostics,
    pub elapsed: Duration,
}

/// AI wrapper enum
enum Backend {
    Fitness(FitnessAI),
    AlphaBeta(AlphaBetaAI),
    Mcts(MctsPlayer),
}

/// Dispatches decisions to the configured strategy
pub struct SearchController {
    strategy: Strategy,
    backend: Backend,
    cache: Arc<PathCache>,
    cancel: CancelToken,
}

impl SearchController {
    pub fn new(config: &AiConfig, cache: Arc<PathCache>) -> Self {
        let cancel = CancelToken::new();
        let backend = match config.strategy.fitness_mode() {
            Some(mode) => {
                let ai = FitnessAI::new(mode, config.weights);
                Backend::Fitness(match config.seed {
                    Some(seed) => ai.with_seed(seed),
                    None => ai,
                })
            }
            None if config.strategy == Strategy::MonteCarlo => {
                Backend::Mcts(MctsPlayer::new(config.mcts_config()).with_cancel(cancel.clone()))
            }
            None => Backend::AlphaBeta(
                AlphaBetaAI::new(config.alpha_beta_config()).with_cancel(cancel.clone()),
            ),
        };

        Self {
            strategy: config.strategy,
            backend,
            cache,
            cancel,
        }
    }

    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    pub fn cache(&self) -> &Arc<PathCache> {
        &self.cache
    }

    /// Token that ends an in-flight search at its next deadline check
    ///
    /// Cancellation is sticky; build a new controller to search again.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Pick a move for the player to move
    pub fn decide(&mut self, state: &GameState) -> Result<Decision> {
        let start = Instant::now();
        let cache = self.cache.as_ref();

        let (mv, diagnostics) = match &mut self.backend {
            Backend::Fitness(ai) => (ai.choose(state, cache)?, Diagnostics::Fitness),
            Backend::AlphaBeta(ai) => {
                let outcome = ai.search(state, cache)?;
                let diagnostics = Diagnostics::AlphaBeta {
                    explored: outcome.explored,
                    pruned: outcome.pruned,
                    depth: outcome.depth,
                    timed_out: outcome.timed_out,
                };
                (outcome.best, diagnostics)
            }
            Backend::Mcts(player) => {
                let result = player.search(state, cache)?;
                let mv = result.best_move().ok_or(ringwar_core::EngineError::NoResult)?;
                let diagnostics = Diagnostics::MonteCarlo {
                    iterations: result.total_simulations,
                    best_visits: best_visits(&result.move_stats, mv),
                };
                (mv, diagnostics)
            }
        };

        tracing::info!("{} ({:?}) plays {} -> {}", state.current_player(), self.strategy, mv.from, mv.to);
        Ok(Decision {
            mv,
            diagnostics,
            elapsed: start.elapsed(),
        })
    }

    /// Run one decision on a background thread
    ///
    /// Path tables for every unit on the board are generated first, so the
    /// worker only reads the cache. The controller comes back with the result.
    pub fn spawn_search(mut self, state: GameState) -> Result<JoinHandle<(Self, Result<Decision>)>> {
        let restrictions: Vec<Restriction> = state
            .board()
            .units()
            .flat_map(|unit| unit.rule.restrictions())
            .collect();
        self.cache.warm(restrictions)?;

        Ok(thread::spawn(move || {
            let decision = self.decide(&state);
            (self, decision)
        }))
    }
}

fn best_visits(stats: &[MoveStatistics], mv: Move) -> u32 {
    stats.iter().find(|s| s.mv == mv).map_or(0, |s| s.visits)
}
