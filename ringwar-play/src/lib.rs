//! RINGWAR Play - Computer players and full matches
//!
//! This crate wires the engine into playable matches:
//! - Per-player AI configuration, loadable from JSON
//! - Search controller dispatching to fitness, alpha-beta or MCTS players
//! - Army deployment and a game runner with player elimination
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 2: SearchController::decide (one decision)
//! - Level 3: GameRunner::play (one match)
//! - Level 4: configuration

mod config;
mod controller;
mod game_runner;

pub use config::{AiConfig, ArmySpec, MatchConfig, PlayerSetup, Strategy};
pub use controller::{Decision, Diagnostics, SearchController};
pub use game_runner::{deploy_armies, Elimination, GameOutcome, GameRunner, TurnRecord};
