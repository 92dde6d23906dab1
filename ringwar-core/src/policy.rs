//! Cheap move policies driven by the fitness heuristic

use rand::distributions::WeightedIndex;
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::appraise::{AppraiserWeights, PathAppraiser};
use crate::cache::PathCache;
use crate::error::{EngineError, Result};
use crate::game::{GameState, Move};

/// How a fitness player picks among its rated moves
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FitnessMode {
    /// Uniform over legal moves, no rating
    Random,
    /// Sampled with probability proportional to fitness
    Weighted,
    /// Highest fitness, ties broken at random
    Best,
}

pub struct FitnessAI {
    mode: FitnessMode,
    weights: AppraiserWeights,
    rng: ChaCha8Rng,
}

impl FitnessAI {
    pub fn new(mode: FitnessMode, weights: AppraiserWeights) -> Self {
        Self {
            mode,
            weights,
            rng: ChaCha8Rng::from_entropy(),
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = ChaCha8Rng::seed_from_u64(seed);
        self
    }

    pub fn mode(&self) -> FitnessMode {
        self.mode
    }

    /// Pick a move for the player to move
    pub fn choose(&mut self, state: &GameState, cache: &PathCache) -> Result<Move> {
        let player = state.current_player();

        if self.mode == FitnessMode::Random {
            let moves = state.legal_moves(cache)?;
            return moves
                .choose(&mut self.rng)
                .copied()
                .ok_or(EngineError::NoLegalMoves(player));
        }

        let rated = PathAppraiser::new(cache, self.weights).rate_all(state.board(), player)?;
        if rated.is_empty() {
            return Err(EngineError::NoLegalMoves(player));
        }

        let mv = match self.mode {
            FitnessMode::Weighted => self.sample(&rated),
            _ => self.best(&rated),
        };
        tracing::debug!("{} picks {:?} from {} rated moves", player, mv, rated.len());
        Ok(mv)
    }

    fn sample(&mut self, rated: &[(Move, f32)]) -> Move {
        match WeightedIndex::new(rated.iter().map(|(_, f)| *f)) {
            Ok(dist) => rated[dist.sample(&mut self.rng)].0,
            // All weights zero
            Err(_) => rated[self.rng.gen_range(0..rated.len())].0,
        }
    }

    fn best(&mut self, rated: &[(Move, f32)]) -> Move {
        let top = rated.iter().map(|(_, f)| *f).fold(f32::NEG_INFINITY, f32::max);
        let ties: Vec<Move> = rated
            .iter()
            .filter(|(_, f)| *f == top)
            .map(|(mv, _)| *mv)
            .collect();
        ties.choose(&mut self.rng).copied().unwrap_or(rated[0].0)
    }
}
