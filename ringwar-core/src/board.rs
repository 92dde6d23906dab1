//! Unit placement and per-player occupancy views

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};
use crate::graph::{ConnectivityGraph, NodeId};
use crate::units::{PlayerId, Unit, UnitClass, UnitId};

// ============================================================================
// BOARD
// ============================================================================

/// Node -> occupant, plus the ordered player list
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Board {
    cells: Vec<Option<Unit>>,
    present: Vec<bool>,
    players: Vec<PlayerId>,
    next_unit_id: u32,
}

impl Board {
    /// Empty board over the graph's nodes
    pub fn new(graph: &ConnectivityGraph, players: Vec<PlayerId>) -> Self {
        Self {
            cells: vec![None; graph.len()],
            present: (0..graph.len()).map(|n| graph.is_present(n)).collect(),
            players,
            next_unit_id: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn is_present(&self, node: NodeId) -> bool {
        self.present.get(node).copied().unwrap_or(false)
    }

    pub fn players(&self) -> &[PlayerId] {
        &self.players
    }

    fn check_slot(&self, node: NodeId) -> Result<()> {
        if node >= self.cells.len() {
            return Err(EngineError::NodeOutOfRange { node, size: self.cells.len() });
        }
        if !self.present[node] {
            return Err(EngineError::AbsentNode(node));
        }
        if self.cells[node].is_some() {
            return Err(EngineError::Occupied(node));
        }
        Ok(())
    }

    /// Place a unit of `class` with its class defaults
    pub fn place(&mut self, owner: PlayerId, class: UnitClass, node: NodeId) -> Result<UnitId> {
        let id = UnitId(self.next_unit_id);
        self.place_unit(Unit::new(id, owner, class, node))
    }

    /// Place a prepared unit at `unit.position`
    pub fn place_unit(&mut self, unit: Unit) -> Result<UnitId> {
        if !self.players.contains(&unit.owner) {
            return Err(EngineError::UnknownPlayer(unit.owner));
        }
        self.check_slot(unit.position)?;
        let id = unit.id;
        self.next_unit_id = self.next_unit_id.max(id.0 + 1);
        let node = unit.position;
        self.cells[node] = Some(unit);
        Ok(id)
    }

    pub fn unit_at(&self, node: NodeId) -> Option<&Unit> {
        self.cells.get(node).and_then(Option::as_ref)
    }

    pub fn units(&self) -> impl Iterator<Item = &Unit> {
        self.cells.iter().flatten()
    }

    pub fn units_of(&self, player: PlayerId) -> impl Iterator<Item = &Unit> {
        self.units().filter(move |u| u.owner == player)
    }

    /// Summed unit value of a player
    pub fn material(&self, player: PlayerId) -> f32 {
        self.units_of(player).map(|u| u.value).sum()
    }

    pub fn has_essential(&self, player: PlayerId) -> bool {
        self.units_of(player).any(|u| u.essential)
    }

    /// Player still fields units and all of them are essential
    pub fn only_essential(&self, player: PlayerId) -> bool {
        let mut units = self.units_of(player).peekable();
        units.peek().is_some() && units.all(|u| u.essential)
    }

    /// Players still owning an essential unit, in turn order
    pub fn active_players(&self) -> Vec<PlayerId> {
        self.players
            .iter()
            .copied()
            .filter(|p| self.has_essential(*p))
            .collect()
    }

    /// Move the occupant of `from` to `to`, returning whatever was captured
    pub(crate) fn relocate(&mut self, from: NodeId, to: NodeId) -> Option<Unit> {
        let mut unit = self.cells[from].take()?;
        unit.position = to;
        self.cells[to].replace(unit)
    }

    pub(crate) fn put(&mut self, node: NodeId, unit: Option<Unit>) {
        self.cells[node] = unit;
    }

    /// Take every unit of `player` off the board
    pub fn remove_units_of(&mut self, player: PlayerId) -> Vec<Unit> {
        let mut removed = Vec::new();
        for cell in self.cells.iter_mut() {
            if cell.as_ref().is_some_and(|u| u.owner == player) {
                if let Some(unit) = cell.take() {
                    removed.push(unit);
                }
            }
        }
        removed
    }
}

// ============================================================================
// OCCUPANCY VIEW
// ============================================================================

/// One cell as seen by a player
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Occupancy {
    pub has_ally: bool,
    pub has_enemy: bool,
    pub accessible: bool,
}

impl Occupancy {
    pub fn of(unit: Option<&Unit>, present: bool, perspective: PlayerId) -> Self {
        match unit {
            None => Self {
                has_ally: false,
                has_enemy: false,
                accessible: present,
            },
            Some(u) if u.owner == perspective => Self {
                has_ally: true,
                has_enemy: false,
                accessible: false,
            },
            Some(u) => Self {
                has_ally: false,
                has_enemy: true,
                accessible: u.can_die,
            },
        }
    }

    pub fn is_occupied(&self) -> bool {
        self.has_ally || self.has_enemy
    }
}

/// Occupancy of every cell relative to one player
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OccupancyView {
    perspective: PlayerId,
    cells: Vec<Occupancy>,
}

impl OccupancyView {
    pub fn for_player(board: &Board, player: PlayerId) -> Self {
        let cells = (0..board.len())
            .map(|n| Occupancy::of(board.unit_at(n), board.is_present(n), player))
            .collect();
        Self {
            perspective: player,
            cells,
        }
    }

    pub fn perspective(&self) -> PlayerId {
        self.perspective
    }

    pub fn get(&self, node: NodeId) -> Occupancy {
        self.cells.get(node).copied().unwrap_or_default()
    }

    pub fn set(&mut self, node: NodeId, occupancy: Occupancy) {
        if let Some(cell) = self.cells.get_mut(node) {
            *cell = occupancy;
        }
    }

    /// Re-derive a single cell from the board
    pub fn refresh(&mut self, board: &Board, node: NodeId) {
        let occupancy = Occupancy::of(board.unit_at(node), board.is_present(node), self.perspective);
        self.set(node, occupancy);
    }

    /// Re-derive every cell for another player, reusing the buffer
    pub fn reorient(&mut self, board: &Board, player: PlayerId) {
        self.perspective = player;
        self.cells.resize(board.len(), Occupancy::default());
        for (node, cell) in self.cells.iter_mut().enumerate() {
            *cell = Occupancy::of(board.unit_at(node), board.is_present(node), player);
        }
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}
