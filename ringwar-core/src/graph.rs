//! Ring board geometry: adjacency and distance matrices
//!
//! Nodes are numbered `ring * ring_size + position`. Ring 0 is the inner ring
//! and only uses its first four indices; the rest of that block is absent.

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};

/// Node index into the flattened board
pub type NodeId = usize;

/// Distance entry for node pairs with no direct ring or radial relation
pub const NO_RELATION: i32 = -888;

/// Number of cells on the innermost ring
pub const INNER_RING_SIZE: usize = 4;

// ============================================================================
// LAYOUT
// ============================================================================

/// Concentric ring layout description
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardLayout {
    /// Cells on every ring except the inner one
    pub ring_size: usize,
    /// Number of rings, inner ring included
    pub rings: usize,
    /// Every `radial_frequency`-th cell of ring 1 starts a radial chain
    pub radial_frequency: usize,
}

impl Default for BoardLayout {
    fn default() -> Self {
        Self {
            ring_size: 16,
            rings: 4,
            radial_frequency: 2,
        }
    }
}

impl BoardLayout {
    pub fn new(ring_size: usize, rings: usize, radial_frequency: usize) -> Self {
        Self {
            ring_size,
            rings,
            radial_frequency,
        }
    }

    /// Total node count, absent inner-ring slots included
    pub fn node_count(&self) -> usize {
        self.ring_size * self.rings
    }

    /// Check the layout and round the radial frequency to a divisor of the ring size
    pub fn validate(&self) -> Result<BoardLayout> {
        if self.ring_size <= INNER_RING_SIZE || self.ring_size % INNER_RING_SIZE != 0 {
            return Err(EngineError::InvalidLayout(format!(
                "ring size {} must be a multiple of {} greater than {}",
                self.ring_size, INNER_RING_SIZE, INNER_RING_SIZE
            )));
        }
        if self.rings < 2 {
            return Err(EngineError::InvalidLayout(format!(
                "at least 2 rings required, got {}",
                self.rings
            )));
        }
        if self.radial_frequency == 0 || self.radial_frequency > self.ring_size {
            return Err(EngineError::InvalidLayout(format!(
                "radial frequency {} outside 1..={}",
                self.radial_frequency, self.ring_size
            )));
        }

        let mut layout = *self;
        if self.ring_size % self.radial_frequency != 0 {
            let groups = (self.ring_size + self.radial_frequency - 1) / self.radial_frequency;
            layout.radial_frequency = self.ring_size / groups;
            tracing::debug!(
                "Radial frequency {} adjusted to {} for ring size {}",
                self.radial_frequency,
                layout.radial_frequency,
                self.ring_size
            );
        }
        Ok(layout)
    }
}

// ============================================================================
// CONNECTIVITY GRAPH
// ============================================================================

/// Immutable adjacency and distance matrices for one board
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectivityGraph {
    size: usize,
    ring_size: usize,
    present: Vec<bool>,
    adjacency: Vec<bool>,
    distances: Vec<i32>,
    ring_lengths: Vec<usize>,
}

impl ConnectivityGraph {
    /// Build the matrices for a concentric ring layout
    pub fn ring_board(layout: BoardLayout) -> Result<Self> {
        let layout = layout.validate()?;
        let size = layout.node_count();
        let ring = layout.ring_size;

        let mut present = vec![false; size];
        for (node, slot) in present.iter_mut().enumerate() {
            *slot = node >= ring || node < INNER_RING_SIZE;
        }

        let mut ring_lengths = vec![ring; layout.rings];
        ring_lengths[0] = INNER_RING_SIZE;

        let mut graph = Self {
            size,
            ring_size: ring,
            present,
            adjacency: vec![false; size * size],
            distances: vec![NO_RELATION; size * size],
            ring_lengths,
        };

        // Self relations
        for node in 0..size {
            if graph.present[node] {
                graph.set_adjacent(node, node);
                graph.set_distance(node, node, 0);
            }
        }

        // Ring links and folded ring distances
        for r in 0..layout.rings {
            let len = graph.ring_lengths[r];
            let base = r * ring;
            for p in 0..len {
                graph.set_adjacent(base + p, base + (p + 1) % len);
                for q in (p + 1)..len {
                    let mut d = q - p;
                    if d > len / 2 {
                        d = len - d;
                    }
                    graph.set_distance(base + p, base + q, d as i32);
                }
            }
        }

        // Radial chains anchored on ring 1
        let per_inner = ring / INNER_RING_SIZE;
        for p in 0..ring {
            if (p + 1) % layout.radial_frequency != 0 {
                continue;
            }
            let mut chain = vec![p / per_inner];
            chain.extend((1..layout.rings).map(|r| r * ring + p));

            for pair in chain.windows(2) {
                graph.set_adjacent(pair[0], pair[1]);
            }
            for i in 0..chain.len() {
                for j in (i + 1)..chain.len() {
                    graph.set_distance(chain[i], chain[j], (j - i) as i32);
                }
            }
        }

        tracing::debug!(
            "Built ring board: {} rings x {} cells, {} present nodes",
            layout.rings,
            ring,
            graph.node_count()
        );

        Ok(graph)
    }

    /// Build from externally computed matrices
    ///
    /// `adjacency[i][i]` marks node presence. Both matrices must be square,
    /// of equal size, and symmetric.
    pub fn from_matrices(
        adjacency: &[Vec<bool>],
        distances: &[Vec<i32>],
        ring_size: usize,
    ) -> Result<Self> {
        let size = adjacency.len();
        if distances.len() != size {
            return Err(EngineError::MalformedMatrices(format!(
                "adjacency has {} rows, distances has {}",
                size,
                distances.len()
            )));
        }
        if ring_size == 0 || size % ring_size != 0 {
            return Err(EngineError::MalformedMatrices(format!(
                "{} nodes cannot be split into rings of {}",
                size, ring_size
            )));
        }
        for (i, (adj_row, dist_row)) in adjacency.iter().zip(distances).enumerate() {
            if adj_row.len() != size || dist_row.len() != size {
                return Err(EngineError::MalformedMatrices(format!("row {} is not {} wide", i, size)));
            }
        }

        let mut present = vec![false; size];
        let mut flat_adj = vec![false; size * size];
        let mut flat_dist = vec![NO_RELATION; size * size];
        for i in 0..size {
            present[i] = adjacency[i][i];
            for j in 0..size {
                if adjacency[i][j] != adjacency[j][i] || distances[i][j] != distances[j][i] {
                    return Err(EngineError::MalformedMatrices(format!(
                        "asymmetric entry at ({}, {})",
                        i, j
                    )));
                }
                flat_adj[i * size + j] = adjacency[i][j];
                flat_dist[i * size + j] = distances[i][j];
            }
        }

        let ring_lengths = (0..size / ring_size)
            .map(|r| {
                (0..ring_size)
                    .take_while(|p| present[r * ring_size + p])
                    .count()
            })
            .collect();

        Ok(Self {
            size,
            ring_size,
            present,
            adjacency: flat_adj,
            distances: flat_dist,
            ring_lengths,
        })
    }

    fn set_adjacent(&mut self, a: NodeId, b: NodeId) {
        self.adjacency[a * self.size + b] = true;
        self.adjacency[b * self.size + a] = true;
    }

    fn set_distance(&mut self, a: NodeId, b: NodeId, d: i32) {
        self.distances[a * self.size + b] = d;
        self.distances[b * self.size + a] = d;
    }

    // ========================================================================
    // ACCESSORS
    // ========================================================================

    /// Matrix dimension (absent nodes included)
    pub fn len(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Number of present nodes
    pub fn node_count(&self) -> usize {
        self.present.iter().filter(|p| **p).count()
    }

    pub fn ring_size(&self) -> usize {
        self.ring_size
    }

    pub fn rings(&self) -> usize {
        self.ring_lengths.len()
    }

    /// Number of present cells on a ring
    pub fn ring_len(&self, ring: usize) -> usize {
        self.ring_lengths.get(ring).copied().unwrap_or(0)
    }

    pub fn is_present(&self, node: NodeId) -> bool {
        node < self.size && self.present[node]
    }

    /// Error unless `node` is a present node
    pub fn check_node(&self, node: NodeId) -> Result<()> {
        if node >= self.size {
            return Err(EngineError::NodeOutOfRange { node, size: self.size });
        }
        if !self.present[node] {
            return Err(EngineError::AbsentNode(node));
        }
        Ok(())
    }

    /// Direct link between two distinct present nodes
    pub fn adjacent(&self, a: NodeId, b: NodeId) -> bool {
        a != b && a < self.size && b < self.size && self.adjacency[a * self.size + b]
    }

    /// Raw matrix entry, `adj[i][i]` included
    pub fn adjacency_entry(&self, a: NodeId, b: NodeId) -> bool {
        self.adjacency[a * self.size + b]
    }

    pub fn distance(&self, a: NodeId, b: NodeId) -> i32 {
        if a >= self.size || b >= self.size {
            return NO_RELATION;
        }
        self.distances[a * self.size + b]
    }

    pub fn ring_of(&self, node: NodeId) -> usize {
        node / self.ring_size
    }

    pub fn position_of(&self, node: NodeId) -> usize {
        node % self.ring_size
    }

    /// Next cell clockwise on the same ring
    pub fn next_on_ring(&self, node: NodeId) -> NodeId {
        let ring = self.ring_of(node);
        let len = self.ring_len(ring).max(1);
        ring * self.ring_size + (self.position_of(node) + 1) % len
    }

    /// Present nodes in index order
    pub fn nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.size).filter(move |n| self.present[*n])
    }

    /// Nodes directly linked to `node`
    pub fn neighbors(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.size).filter(move |other| self.adjacent(node, *other))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn default_board() -> ConnectivityGraph {
        ConnectivityGraph::ring_board(BoardLayout::default()).unwrap()
    }

    #[test]
    fn test_matrices_symmetric() {
        let graph = default_board();
        for a in 0..graph.len() {
            for b in 0..graph.len() {
                assert_eq!(graph.adjacent(a, b), graph.adjacent(b, a), "adj ({}, {})", a, b);
                assert_eq!(graph.distance(a, b), graph.distance(b, a), "dist ({}, {})", a, b);
            }
        }
    }

    #[test]
    fn test_inner_ring_layout() {
        let graph = default_board();
        assert_eq!(graph.len(), 64);
        assert_eq!(graph.node_count(), 4 + 3 * 16);
        assert!(graph.is_present(3));
        assert!(!graph.is_present(4));
        assert!(!graph.is_present(15));

        // Inner node 0: ring neighbours 1 and 3, radial links to 17 and 19
        let neighbors: Vec<_> = graph.neighbors(0).collect();
        assert_eq!(neighbors, vec![1, 3, 17, 19]);
        assert_eq!(graph.distance(0, 2), 2);
        assert_eq!(graph.distance(1, 3), 2);
    }

    #[test]
    fn test_ring_distance_folds() {
        let graph = default_board();
        assert_eq!(graph.distance(16, 17), 1);
        assert_eq!(graph.distance(16, 31), 1);
        assert_eq!(graph.distance(16, 24), 8);
        assert_eq!(graph.distance(16, 26), 6);
    }

    #[test]
    fn test_radial_chain_distances() {
        let graph = default_board();
        // Chain for ring-1 position 1: 0 <-> 17 <-> 33 <-> 49
        assert!(graph.adjacent(0, 17));
        assert!(graph.adjacent(17, 33));
        assert!(graph.adjacent(33, 49));
        assert_eq!(graph.distance(0, 49), 3);
        assert_eq!(graph.distance(17, 49), 2);
        // Position 0 carries no radial link
        assert!(!graph.adjacent(16, 32));
        assert_eq!(graph.distance(16, 32), NO_RELATION);
    }

    #[test]
    fn test_absent_nodes_isolated() {
        let graph = default_board();
        for node in 4..16 {
            assert_eq!(graph.neighbors(node).count(), 0);
            assert!(matches!(graph.check_node(node), Err(EngineError::AbsentNode(_))));
        }
        assert!(matches!(
            graph.check_node(64),
            Err(EngineError::NodeOutOfRange { .. })
        ));
    }

    #[test]
    fn test_layout_validation() {
        assert!(BoardLayout::new(10, 4, 2).validate().is_err());
        assert!(BoardLayout::new(16, 1, 2).validate().is_err());
        assert!(BoardLayout::new(16, 4, 0).validate().is_err());
        let adjusted = BoardLayout::new(16, 4, 3).validate().unwrap();
        assert_eq!(adjusted.radial_frequency, 2);
    }

    #[test]
    fn test_from_matrices_rejects_asymmetry() {
        let adj = vec![vec![true, true], vec![false, true]];
        let dist = vec![vec![0, 1], vec![1, 0]];
        assert!(matches!(
            ConnectivityGraph::from_matrices(&adj, &dist, 2),
            Err(EngineError::MalformedMatrices(_))
        ));
    }

    #[test]
    fn test_next_on_ring_wraps() {
        let graph = default_board();
        assert_eq!(graph.next_on_ring(3), 0);
        assert_eq!(graph.next_on_ring(31), 16);
        assert_eq!(graph.next_on_ring(20), 21);
    }
}
