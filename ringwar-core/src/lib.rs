//! RINGWAR Core - Board graph, path tables and AI
//!
//! This crate provides the core engine for RINGWAR:
//! - Concentric ring board graph with adjacency and distance matrices
//! - Path generation per movement restriction, cached per board
//! - Unit classes with movement rules and legal-destination filtering
//! - Game state with reversible simulate/undo
//! - Fitness heuristic, material evaluation and alpha-beta AI

pub mod error;
pub mod graph;
pub mod restriction;
pub mod paths;
pub mod cache;
pub mod units;
pub mod board;
pub mod filter;
pub mod game;
pub mod eval;
pub mod appraise;
pub mod budget;
pub mod ai;
pub mod policy;

// Re-exports for convenient access
pub use error::{EngineError, Result};
pub use graph::{BoardLayout, ConnectivityGraph, NodeId, NO_RELATION};
pub use restriction::{Regime, Restriction};
pub use paths::{Path, PathSet};
pub use cache::PathCache;
pub use units::{MoveRule, PlayerId, Unit, UnitClass, UnitId};
pub use board::{Board, Occupancy, OccupancyView};
pub use game::{GameState, Move, Undo};
pub use eval::evaluate;
pub use appraise::{AppraiserWeights, PathAppraiser, Rating};
pub use budget::{Budget, CancelToken};
pub use ai::{AlphaBetaAI, AlphaBetaConfig, SearchOutcome};
pub use policy::{FitnessAI, FitnessMode};
