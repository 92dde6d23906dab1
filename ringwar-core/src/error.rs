//! Engine error types

use crate::graph::NodeId;
use crate::restriction::Restriction;
use crate::units::PlayerId;

/// Errors raised by the movement and search engines
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("Invalid movement restriction: {0:?}")]
    InvalidRestriction(Restriction),

    #[error("Invalid board layout: {0}")]
    InvalidLayout(String),

    #[error("Malformed connectivity matrices: {0}")]
    MalformedMatrices(String),

    #[error("Node {node} out of range (board has {size} nodes)")]
    NodeOutOfRange { node: NodeId, size: usize },

    #[error("Node {0} is not part of the board")]
    AbsentNode(NodeId),

    #[error("Node {0} is already occupied")]
    Occupied(NodeId),

    #[error("Unknown player: {0}")]
    UnknownPlayer(PlayerId),

    #[error("Illegal move {from} -> {to}")]
    IllegalMove { from: NodeId, to: NodeId },

    #[error("No legal moves for player {0}")]
    NoLegalMoves(PlayerId),

    #[error("Search budget expired before any move was evaluated")]
    NoResult,
}

pub type Result<T> = std::result::Result<T, EngineError>;
