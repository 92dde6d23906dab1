//! Position evaluation

use crate::board::Board;
use crate::units::PlayerId;

/// Own material over the material of every other player
///
/// With no opposing material left the own material is returned undivided.
pub fn evaluate(board: &Board, me: PlayerId) -> f32 {
    let own = board.material(me);
    let others: f32 = board
        .players()
        .iter()
        .filter(|p| **p != me)
        .map(|p| board.material(*p))
        .sum();

    if others > 0.0 {
        own / others
    } else {
        own
    }
}
