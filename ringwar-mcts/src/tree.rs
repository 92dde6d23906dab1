//! MCTS Tree structure and node management
//!
//! Uses arena allocation; the whole tree is dropped once a move is chosen.
//!
//! ## Architecture
//! - Level 2: Tree operations (select_leaf, expand, backpropagate)
//! - Level 3: UCT calculation, best move selection
//! - Level 4: Statistics

use ringwar_core::{GameState, Move, PathCache, Result};

// ============================================================================
// TYPES
// ============================================================================

/// Node identifier (index into arena)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeId(pub usize);

impl NodeId {
    pub const ROOT: NodeId = NodeId(0);
}

/// Statistics for a tree node
#[derive(Clone, Debug, Default)]
pub struct NodeStats {
    /// Number of times this node was visited
    pub visits: u32,
    /// Summed rollout scores, searching player's perspective
    pub total_value: f32,
}

impl NodeStats {
    pub fn mean_value(&self) -> f32 {
        if self.visits == 0 {
            0.0
        } else {
            self.total_value / self.visits as f32
        }
    }
}

/// A node in the MCTS tree
#[derive(Clone, Debug)]
pub struct MctsNode {
    /// Game state at this node
    pub state: GameState,
    /// Parent node (None for root)
    pub parent: Option<NodeId>,
    /// Move that led to this node (None for root)
    pub incoming_move: Option<Move>,
    /// Children: (move, node_id) pairs
    pub children: Vec<(Move, NodeId)>,
    /// Children generated
    pub expanded: bool,
    /// Game over at this node
    pub terminal: bool,
    pub stats: NodeStats,
}

impl MctsNode {
    pub fn new(state: GameState, parent: Option<NodeId>, incoming_move: Option<Move>) -> Self {
        let terminal = state.is_over();
        Self {
            state,
            parent,
            incoming_move,
            children: Vec::new(),
            expanded: false,
            terminal,
            stats: NodeStats::default(),
        }
    }

    pub fn is_visited(&self) -> bool {
        self.stats.visits > 0
    }
}

// ============================================================================
// MCTS TREE (Level 2 - Tree Operations)
// ============================================================================

/// MCTS search tree with arena allocation
#[derive(Debug)]
pub struct MctsTree {
    nodes: Vec<MctsNode>,
}

impl MctsTree {
    /// Create a new tree with the given root state
    pub fn new(root_state: GameState) -> Self {
        Self {
            nodes: vec![MctsNode::new(root_state, None, None)],
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    pub fn get(&self, id: NodeId) -> &MctsNode {
        &self.nodes[id.0]
    }

    pub fn get_mut(&mut self, id: NodeId) -> &mut MctsNode {
        &mut self.nodes[id.0]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    // ========================================================================
    // Level 2: Tree Operations
    // ========================================================================

    /// Descend by UCT to the first unvisited node, expanding on the way
    ///
    /// Returns the path from root to the selected leaf.
    pub fn select_leaf(&mut self, cache: &PathCache, exploration: f32) -> Result<Vec<NodeId>> {
        let mut path = vec![self.root()];
        let mut current = self.root();

        loop {
            if self.get(current).terminal {
                break;
            }
            self.expand(current, cache)?;

            let node = self.get(current);
            if node.children.is_empty() {
                break;
            }
            if let Some(&(_, fresh)) = node.children.iter().find(|(_, id)| !self.get(*id).is_visited()) {
                path.push(fresh);
                break;
            }
            match self.select_best_child(current, exploration) {
                Some(child) => {
                    path.push(child);
                    current = child;
                }
                None => break,
            }
        }

        Ok(path)
    }

    /// Generate one child per legal move; a no-op once expanded
    pub fn expand(&mut self, node_id: NodeId, cache: &PathCache) -> Result<()> {
        if self.get(node_id).expanded {
            return Ok(());
        }

        let parent_state = self.get(node_id).state.clone();
        let mut children = Vec::new();
        for mv in parent_state.legal_moves(cache)? {
            let mut child_state = parent_state.clone();
            child_state.simulate(mv)?;
            let child_id = NodeId(self.nodes.len());
            self.nodes.push(MctsNode::new(child_state, Some(node_id), Some(mv)));
            children.push((mv, child_id));
        }

        let node = self.get_mut(node_id);
        node.children = children;
        node.expanded = true;
        Ok(())
    }

    // ========================================================================
    // Level 3: Selection Helpers
    // ========================================================================

    fn select_best_child(&self, node_id: NodeId, exploration: f32) -> Option<NodeId> {
        let node = self.get(node_id);
        let parent_visits = node.stats.visits;

        node.children
            .iter()
            .max_by(|(_, a), (_, b)| {
                let uct_a = self.uct(*a, parent_visits, exploration);
                let uct_b = self.uct(*b, parent_visits, exploration);
                uct_a.partial_cmp(&uct_b).unwrap_or(std::cmp::Ordering::Equal)
            })
            .map(|(_, id)| *id)
    }

    /// UCT = value/visits + C * sqrt(ln(parent_visits) / visits)
    fn uct(&self, node_id: NodeId, parent_visits: u32, exploration: f32) -> f32 {
        let stats = &self.get(node_id).stats;
        if stats.visits == 0 {
            return f32::INFINITY;
        }
        let exploration_term =
            exploration * ((parent_visits.max(1) as f32).ln() / stats.visits as f32).sqrt();
        stats.mean_value() + exploration_term
    }

    // ========================================================================
    // Level 2: Backpropagation
    // ========================================================================

    /// Add one visit and `score` to the leaf and every ancestor
    pub fn backpropagate(&mut self, leaf_id: NodeId, score: f32) {
        let mut current = Some(leaf_id);
        while let Some(node_id) = current {
            let node = self.get_mut(node_id);
            node.stats.visits += 1;
            node.stats.total_value += score;
            current = node.parent;
        }
    }

    // ========================================================================
    // Level 3: Best Move Selection
    // ========================================================================

    /// Move of the most visited root child
    pub fn best_move(&self) -> Option<Move> {
        self.get(self.root())
            .children
            .iter()
            .max_by_key(|(_, id)| self.get(*id).stats.visits)
            .map(|(mv, _)| *mv)
    }

    /// (move, visits, mean value) per root child
    pub fn move_statistics(&self) -> Vec<(Move, u32, f32)> {
        self.get(self.root())
            .children
            .iter()
            .map(|(mv, id)| {
                let stats = &self.get(*id).stats;
                (*mv, stats.visits, stats.mean_value())
            })
            .collect()
    }

    /// Root visits
    pub fn total_simulations(&self) -> u32 {
        self.get(self.root()).stats.visits
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use ringwar_core::{Board, BoardLayout, ConnectivityGraph, PlayerId, UnitClass};
    use std::sync::Arc;

    fn setup() -> (PathCache, GameState) {
        let graph = ConnectivityGraph::ring_board(BoardLayout::default()).unwrap();
        let mut board = Board::new(&graph, vec![PlayerId(0), PlayerId(1)]);
        board.place(PlayerId(0), UnitClass::MatronMother, 16).unwrap();
        board.place(PlayerId(0), UnitClass::Warrior, 18).unwrap();
        board.place(PlayerId(1), UnitClass::MatronMother, 24).unwrap();
        let state = GameState::new(board, PlayerId(0)).unwrap();
        (PathCache::new(Arc::new(graph)), state)
    }

    #[test]
    fn test_tree_creation() {
        let (_, state) = setup();
        let tree = MctsTree::new(state);
        assert_eq!(tree.len(), 1);
        assert_eq!(tree.root(), NodeId::ROOT);
        assert!(!tree.get(NodeId::ROOT).expanded);
    }

    #[test]
    fn test_expansion_is_idempotent() {
        let (cache, state) = setup();
        let moves = state.legal_moves(&cache).unwrap();
        let mut tree = MctsTree::new(state);

        tree.expand(NodeId::ROOT, &cache).unwrap();
        assert_eq!(tree.get(NodeId::ROOT).children.len(), moves.len());
        let size = tree.len();

        tree.expand(NodeId::ROOT, &cache).unwrap();
        assert_eq!(tree.len(), size);
        assert_eq!(tree.get(NodeId(1)).parent, Some(NodeId::ROOT));
    }

    #[test]
    fn test_select_prefers_unvisited() {
        let (cache, state) = setup();
        let mut tree = MctsTree::new(state);

        let first = tree.select_leaf(&cache, 1.5).unwrap();
        assert_eq!(first.len(), 2);
        tree.backpropagate(*first.last().unwrap(), 1.0);

        let second = tree.select_leaf(&cache, 1.5).unwrap();
        assert_ne!(first.last(), second.last());
    }

    #[test]
    fn test_backpropagation_reaches_root() {
        let (cache, state) = setup();
        let mut tree = MctsTree::new(state);
        let path = tree.select_leaf(&cache, 1.5).unwrap();
        tree.backpropagate(*path.last().unwrap(), 0.25);

        for id in path {
            assert_eq!(tree.get(id).stats.visits, 1);
            assert_eq!(tree.get(id).stats.total_value, 0.25);
        }
        assert_eq!(tree.total_simulations(), 1);
    }

    #[test]
    fn test_uct_unvisited_is_infinite() {
        let (cache, state) = setup();
        let mut tree = MctsTree::new(state);
        tree.expand(NodeId::ROOT, &cache).unwrap();
        assert!(tree.uct(NodeId(1), 10, 1.5).is_infinite());
    }

    #[test]
    fn test_best_move_is_most_visited() {
        let (cache, state) = setup();
        let mut tree = MctsTree::new(state);
        tree.expand(NodeId::ROOT, &cache).unwrap();
        let (target_move, target) = tree.get(NodeId::ROOT).children[2];
        tree.backpropagate(target, 0.0);
        tree.backpropagate(target, 0.0);
        tree.backpropagate(NodeId(1), 1.0);
        assert_eq!(tree.best_move(), Some(target_move));
    }
}
