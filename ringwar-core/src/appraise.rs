//! Move fitness heuristic
//!
//! Scores a (source, destination) pair in [0, 1] from three terms: the value
//! of what gets captured, how much safer the destination is than the source,
//! and whether the move baits an enemy into a trade.
//!
//! ## Architecture
//! - Level 2: rate_moves, rate_moves_lite, rate_all
//! - Level 3: kill, danger, bait terms
//! - Level 4: threat maps, multiplier

use serde::{Deserialize, Serialize};

use crate::board::{Board, Occupancy, OccupancyView};
use crate::cache::PathCache;
use crate::error::Result;
use crate::filter;
use crate::game::Move;
use crate::graph::NodeId;
use crate::units::{PlayerId, Unit};

/// Multiplier applied to a player's only essential unit
const SOLE_ESSENTIAL_FACTOR: f32 = 999.0;

/// Term weights of the fitness sum
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct AppraiserWeights {
    pub kill: f32,
    pub danger: f32,
    pub bait: f32,
}

impl Default for AppraiserWeights {
    fn default() -> Self {
        Self {
            kill: 0.6,
            danger: 0.6,
            bait: 0.2,
        }
    }
}

/// Fitness of moving to one destination
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rating {
    pub destination: NodeId,
    pub fitness: f32,
}

/// Fitness heuristic over one board's path tables
pub struct PathAppraiser<'a> {
    cache: &'a PathCache,
    weights: AppraiserWeights,
}

impl<'a> PathAppraiser<'a> {
    pub fn new(cache: &'a PathCache, weights: AppraiserWeights) -> Self {
        Self { cache, weights }
    }

    pub fn weights(&self) -> AppraiserWeights {
        self.weights
    }

    // ========================================================================
    // LEVEL 2 - RATINGS
    // ========================================================================

    /// Full fitness for each destination of the unit on `source`
    ///
    /// Enemy reach is derived from every enemy's own legal moves.
    pub fn rate_moves(
        &self,
        board: &Board,
        source: NodeId,
        destinations: &[NodeId],
    ) -> Result<Vec<Rating>> {
        let Some(unit) = board.unit_at(source) else {
            return Ok(Vec::new());
        };
        if destinations.is_empty() {
            return Ok(Vec::new());
        }
        for &destination in destinations {
            self.cache.graph().check_node(destination)?;
        }

        let threats = self.threat_map(board, unit.owner)?;
        let multiplier = danger_multiplier(board, unit);
        let start_danger = multiplier / (1.0 + threats[source].len() as f32);
        let mut view = OccupancyView::for_player(board, unit.owner);

        let mut ratings = Vec::with_capacity(destinations.len());
        for &destination in destinations {
            let kill = kill_value(board, unit, destination);
            let danger = multiplier / (1.0 + threats[destination].len() as f32);
            let bait = self.bait_value(board, &mut view, unit, destination, &threats[destination])?;
            ratings.push(Rating {
                destination,
                fitness: self.combine(kill, danger / start_danger, bait),
            });
        }
        Ok(ratings)
    }

    /// Cheap fitness: kill and danger terms, danger from adjacent enemies only
    pub fn rate_moves_lite(&self, board: &Board, source: NodeId, destinations: &[NodeId]) -> Vec<Rating> {
        let Some(unit) = board.unit_at(source) else {
            return Vec::new();
        };
        let multiplier = danger_multiplier(board, unit);
        let start_danger = multiplier / (1.0 + self.adjacent_threats(board, unit.owner, source) as f32);

        destinations
            .iter()
            .map(|&destination| {
                let kill = kill_value(board, unit, destination);
                let danger = multiplier
                    / (1.0 + self.adjacent_threats(board, unit.owner, destination) as f32);
                Rating {
                    destination,
                    fitness: self.combine(kill, danger / start_danger, 0.0),
                }
            })
            .collect()
    }

    /// Full fitness of every legal move of `player`
    pub fn rate_all(&self, board: &Board, player: PlayerId) -> Result<Vec<(Move, f32)>> {
        let view = OccupancyView::for_player(board, player);
        let mut table = Vec::new();
        for unit in board.units_of(player) {
            let destinations = filter::legal_destinations(self.cache, &view, unit, unit.position)?;
            for rating in self.rate_moves(board, unit.position, &destinations)? {
                table.push((Move::new(unit.position, rating.destination), rating.fitness));
            }
        }
        Ok(table)
    }

    fn combine(&self, kill: f32, danger_ratio: f32, bait: f32) -> f32 {
        let w = self.weights;
        let fitness = w.kill * kill.tanh() + w.danger * danger_ratio.tanh() + w.bait * bait.tanh();
        if fitness.is_nan() {
            return 0.0;
        }
        fitness.clamp(0.0, 1.0)
    }

    // ========================================================================
    // LEVEL 3 - TERMS
    // ========================================================================

    /// Retaliation potential if an enemy takes the unit on `destination`
    fn bait_value(
        &self,
        board: &Board,
        view: &mut OccupancyView,
        unit: &Unit,
        destination: NodeId,
        attackers: &[f32],
    ) -> Result<f32> {
        if unit.essential || attackers.is_empty() {
            return Ok(0.0);
        }

        // Source vacated, destination held by the capturing enemy
        let prior_source = view.get(unit.position);
        let prior_destination = view.get(destination);
        view.set(
            unit.position,
            Occupancy {
                has_ally: false,
                has_enemy: false,
                accessible: true,
            },
        );
        view.set(
            destination,
            Occupancy {
                has_enemy: true,
                has_ally: false,
                ..prior_destination
            },
        );

        let mut avengers = 0usize;
        let mut outcome = Ok(());
        for ally in board.units_of(unit.owner).filter(|u| u.id != unit.id) {
            match filter::legal_destinations(self.cache, view, ally, ally.position) {
                Ok(reach) if reach.contains(&destination) => avengers += 1,
                Ok(_) => {}
                Err(e) => {
                    outcome = Err(e);
                    break;
                }
            }
        }

        view.set(unit.position, prior_source);
        view.set(destination, prior_destination);
        outcome?;

        if avengers == 0 {
            return Ok(0.0);
        }
        let cheapest = attackers.iter().copied().fold(f32::INFINITY, f32::min);
        Ok((cheapest / unit.value) * (avengers as f32).sqrt())
    }

    // ========================================================================
    // LEVEL 4 - HELPERS
    // ========================================================================

    /// Per node, values of enemy units that can move there
    fn threat_map(&self, board: &Board, me: PlayerId) -> Result<Vec<Vec<f32>>> {
        let mut threats = vec![Vec::new(); board.len()];
        for &player in board.players().iter().filter(|p| **p != me) {
            let view = OccupancyView::for_player(board, player);
            for enemy in board.units_of(player) {
                for node in filter::legal_destinations(self.cache, &view, enemy, enemy.position)? {
                    threats[node].push(enemy.value);
                }
            }
        }
        Ok(threats)
    }

    /// Killing-capable enemy units directly linked to `node`
    fn adjacent_threats(&self, board: &Board, me: PlayerId, node: NodeId) -> usize {
        self.cache
            .graph()
            .neighbors(node)
            .filter(|n| {
                board
                    .unit_at(*n)
                    .is_some_and(|u| u.owner != me && u.can_kill)
            })
            .count()
    }
}

fn kill_value(board: &Board, unit: &Unit, destination: NodeId) -> f32 {
    match board.unit_at(destination) {
        Some(target) if target.owner != unit.owner => (target.value / unit.value).sqrt(),
        _ => 0.0,
    }
}

/// Weight of the unit within its own army
fn danger_multiplier(board: &Board, unit: &Unit) -> f32 {
    let mut same_class = 0usize;
    let mut essentials = 0usize;
    let mut army_value = 0.0f32;
    for ally in board.units_of(unit.owner) {
        if ally.class == unit.class {
            same_class += 1;
        }
        if ally.essential {
            essentials += 1;
        }
        army_value += ally.value;
    }

    let essential_factor = if !unit.essential {
        1.0
    } else if essentials > 1 {
        unit.value / essentials as f32
    } else {
        SOLE_ESSENTIAL_FACTOR
    };

    (unit.value / same_class.max(1) as f32) * (unit.value / army_value) * essential_factor
}
