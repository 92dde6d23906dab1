//! Game state, move generation and reversible move application

use serde::{Deserialize, Serialize};

use crate::board::{Board, Occupancy, OccupancyView};
use crate::cache::PathCache;
use crate::error::{EngineError, Result};
use crate::filter;
use crate::graph::NodeId;
use crate::units::{PlayerId, Unit};

// ============================================================================
// CORE TYPES
// ============================================================================

/// A unit move from one node to another
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Move {
    pub from: NodeId,
    pub to: NodeId,
}

impl Move {
    pub const fn new(from: NodeId, to: NodeId) -> Self {
        Self { from, to }
    }
}

/// Prior field values needed to reverse one simulated move
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Undo {
    pub mv: Move,
    pub mover: Unit,
    pub captured: Option<Unit>,
    pub prior_to_move: usize,
    pub prior_perspective: PlayerId,
    /// View cells of `mv.from` and `mv.to` before the move
    pub from_cell: Occupancy,
    pub to_cell: Occupancy,
}

// ============================================================================
// GAME STATE
// ============================================================================

/// Board, the mover's occupancy view and whose turn it is
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    board: Board,
    view: OccupancyView,
    to_move: usize,
}

impl GameState {
    /// Start with `first` to move
    pub fn new(board: Board, first: PlayerId) -> Result<Self> {
        let to_move = board
            .players()
            .iter()
            .position(|p| *p == first)
            .ok_or(EngineError::UnknownPlayer(first))?;
        let view = OccupancyView::for_player(&board, first);
        Ok(Self { board, view, to_move })
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn view(&self) -> &OccupancyView {
        &self.view
    }

    pub fn current_player(&self) -> PlayerId {
        self.view.perspective()
    }

    /// At most one player still owns an essential unit
    pub fn is_over(&self) -> bool {
        self.board.active_players().len() <= 1
    }

    /// Sole remaining player, once the game is over
    pub fn winner(&self) -> Option<PlayerId> {
        let active = self.board.active_players();
        match active.as_slice() {
            [only] => Some(*only),
            _ => None,
        }
    }

    // ========================================================================
    // MOVE GENERATION
    // ========================================================================

    /// Every legal move of the player to move, board order
    pub fn legal_moves(&self, cache: &PathCache) -> Result<Vec<Move>> {
        let player = self.current_player();
        let mut moves = Vec::new();
        for unit in self.board.units_of(player) {
            for to in filter::legal_destinations(cache, &self.view, unit, unit.position)? {
                moves.push(Move::new(unit.position, to));
            }
        }
        Ok(moves)
    }

    /// Legal destinations of the unit on `node`, from its owner's perspective
    pub fn destinations(&self, cache: &PathCache, node: NodeId) -> Result<Vec<NodeId>> {
        let Some(unit) = self.board.unit_at(node) else {
            return Ok(Vec::new());
        };
        if unit.owner == self.current_player() {
            filter::legal_destinations(cache, &self.view, unit, node)
        } else {
            let view = OccupancyView::for_player(&self.board, unit.owner);
            filter::legal_destinations(cache, &view, unit, node)
        }
    }

    // ========================================================================
    // SIMULATE / UNDO
    // ========================================================================

    /// Apply `mv` in place and pass the turn; the record reverses it exactly
    ///
    /// Only checks ownership and occupancy, not rule legality.
    pub fn simulate(&mut self, mv: Move) -> Result<Undo> {
        let player = self.current_player();
        let mover = match self.board.unit_at(mv.from) {
            Some(unit) if unit.owner == player && mv.from != mv.to => unit.clone(),
            _ => return Err(EngineError::IllegalMove { from: mv.from, to: mv.to }),
        };
        if !self.view.get(mv.to).accessible {
            return Err(EngineError::IllegalMove { from: mv.from, to: mv.to });
        }

        let undo = Undo {
            mv,
            mover,
            captured: self.board.unit_at(mv.to).cloned(),
            prior_to_move: self.to_move,
            prior_perspective: player,
            from_cell: self.view.get(mv.from),
            to_cell: self.view.get(mv.to),
        };

        self.board.relocate(mv.from, mv.to);
        self.advance_turn(&[mv.from, mv.to]);
        Ok(undo)
    }

    /// Reverse a record produced by [`GameState::simulate`]
    pub fn undo(&mut self, undo: &Undo) {
        self.board.put(undo.mv.from, Some(undo.mover.clone()));
        self.board.put(undo.mv.to, undo.captured.clone());
        self.to_move = undo.prior_to_move;
        if self.view.perspective() == undo.prior_perspective {
            self.view.set(undo.mv.from, undo.from_cell);
            self.view.set(undo.mv.to, undo.to_cell);
        } else {
            self.view.reorient(&self.board, undo.prior_perspective);
        }
    }

    /// Skip the current player without moving
    pub fn pass_turn(&mut self) {
        self.advance_turn(&[]);
    }

    /// Next player in turn order that still owns an essential unit
    ///
    /// `touched` lists the cells changed since the view was last derived.
    fn advance_turn(&mut self, touched: &[NodeId]) {
        let players = self.board.players();
        let count = players.len();
        for step in 1..=count {
            let index = (self.to_move + step) % count;
            if self.board.has_essential(players[index]) {
                self.to_move = index;
                break;
            }
        }
        let next = self.board.players()[self.to_move];
        if next == self.view.perspective() {
            for &node in touched {
                self.view.refresh(&self.board, node);
            }
        } else {
            self.view.reorient(&self.board, next);
        }
    }

    /// Remove every unit of players without essential units, returning them
    pub fn eliminate_defeated(&mut self) -> Vec<PlayerId> {
        let defeated: Vec<PlayerId> = self
            .board
            .players()
            .iter()
            .copied()
            .filter(|p| !self.board.has_essential(*p) && self.board.units_of(*p).next().is_some())
            .collect();
        for player in &defeated {
            self.board.remove_units_of(*player);
        }
        if !defeated.is_empty() {
            let current = self.current_player();
            self.view.reorient(&self.board, current);
        }
        defeated
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{BoardLayout, ConnectivityGraph};
    use crate::units::UnitClass;
    use std::sync::Arc;

    const A: PlayerId = PlayerId(0);
    const B: PlayerId = PlayerId(1);
    const C: PlayerId = PlayerId(2);

    fn setup(players: Vec<PlayerId>) -> (PathCache, Board) {
        let graph = ConnectivityGraph::ring_board(BoardLayout::default()).unwrap();
        let board = Board::new(&graph, players);
        (PathCache::new(Arc::new(graph)), board)
    }

    #[test]
    fn test_simulate_then_undo_restores_everything() {
        let (cache, mut board) = setup(vec![A, B]);
        board.place(A, UnitClass::MatronMother, 16).unwrap();
        board.place(A, UnitClass::Wizard, 18).unwrap();
        board.place(B, UnitClass::MatronMother, 24).unwrap();
        board.place(B, UnitClass::Warrior, 17).unwrap();
        let mut state = GameState::new(board, A).unwrap();
        let before = state.clone();

        for mv in state.legal_moves(&cache).unwrap() {
            let undo = state.simulate(mv).unwrap();
            assert_ne!(state, before);
            state.undo(&undo);
            assert_eq!(state, before);
            assert_eq!(state.view(), before.view());
        }
    }

    #[test]
    fn test_nested_undo_and_serialized_record() {
        let (cache, mut board) = setup(vec![A, B]);
        board.place(A, UnitClass::MatronMother, 16).unwrap();
        board.place(B, UnitClass::MatronMother, 17).unwrap();
        board.place(B, UnitClass::Pawn, 31).unwrap();
        let mut state = GameState::new(board, A).unwrap();
        let before = state.clone();

        let capture = state.simulate(Move::new(16, 17)).unwrap();
        assert!(capture.captured.is_some());
        assert!(state.is_over());
        assert_eq!(state.winner(), Some(A));

        let json = serde_json::to_string(&capture).unwrap();
        let decoded: Undo = serde_json::from_str(&json).unwrap();
        state.undo(&decoded);
        assert_eq!(state, before);
        assert!(!state.legal_moves(&cache).unwrap().is_empty());
    }

    #[test]
    fn test_turn_skips_players_without_essentials() {
        let (_, mut board) = setup(vec![A, B, C]);
        board.place(A, UnitClass::MatronMother, 16).unwrap();
        board.place(B, UnitClass::Pawn, 20).unwrap();
        board.place(C, UnitClass::MatronMother, 40).unwrap();
        let mut state = GameState::new(board, A).unwrap();
        state.simulate(Move::new(16, 17)).unwrap();
        assert_eq!(state.current_player(), C);
    }

    #[test]
    fn test_simulate_rejects_foreign_unit() {
        let (_, mut board) = setup(vec![A, B]);
        board.place(A, UnitClass::MatronMother, 16).unwrap();
        board.place(B, UnitClass::MatronMother, 24).unwrap();
        let mut state = GameState::new(board, A).unwrap();
        assert!(matches!(
            state.simulate(Move::new(24, 25)),
            Err(EngineError::IllegalMove { .. })
        ));
    }

    #[test]
    fn test_eliminate_defeated_clears_units() {
        let (_, mut board) = setup(vec![A, B]);
        board.place(A, UnitClass::MatronMother, 16).unwrap();
        board.place(B, UnitClass::Warrior, 24).unwrap();
        board.place(B, UnitClass::Pawn, 25).unwrap();
        let mut state = GameState::new(board, A).unwrap();
        assert_eq!(state.eliminate_defeated(), vec![B]);
        assert_eq!(state.board().units_of(B).count(), 0);
        assert!(state.view().get(24).accessible);
    }

    #[test]
    fn test_view_tracks_mover_and_restores_cells() {
        let (cache, mut board) = setup(vec![A, B]);
        board.place(A, UnitClass::MatronMother, 16).unwrap();
        board.place(A, UnitClass::Warrior, 18).unwrap();
        // B has no essential unit, so A moves again
        board.place(B, UnitClass::Pawn, 17).unwrap();
        let mut state = GameState::new(board, A).unwrap();
        let before = state.clone();

        for mv in state.legal_moves(&cache).unwrap() {
            let undo = state.simulate(mv).unwrap();
            assert_eq!(state.current_player(), A);
            assert_eq!(state.view(), &OccupancyView::for_player(state.board(), A));
            state.undo(&undo);
            assert_eq!(state, before);
        }

        let undo = state.simulate(Move::new(16, 31)).unwrap();
        state.pass_turn();
        assert_eq!(state.view(), &OccupancyView::for_player(state.board(), A));
        state.undo(&undo);
        assert_eq!(state, before);
    }
}
