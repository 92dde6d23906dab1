//! Raw path generation from board geometry and a movement restriction
//!
//! ## Architecture
//! - Level 2: generate (regime dispatch)
//! - Level 3: adjacent pairs, line pairs, free walks
//! - Level 4: complete_route, pair insertion

use rustc_hash::FxHashMap;

use crate::error::Result;
use crate::graph::{ConnectivityGraph, NodeId};
use crate::restriction::{Regime, Restriction};

/// Ordered node sequence; the first node is the start
pub type Path = Vec<NodeId>;

/// All raw paths for one restriction, keyed by start node
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PathSet {
    paths: FxHashMap<NodeId, Vec<Path>>,
}

impl PathSet {
    /// Paths starting at `node` (empty if none)
    pub fn from(&self, node: NodeId) -> &[Path] {
        self.paths.get(&node).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Total number of stored paths
    pub fn len(&self) -> usize {
        self.paths.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.values().all(Vec::is_empty)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&NodeId, &Vec<Path>)> {
        self.paths.iter()
    }

    fn push(&mut self, path: Path) {
        if let Some(&start) = path.first() {
            self.paths.entry(start).or_default().push(path);
        }
    }

    /// Store a pair-derived path under its start and its reverse under its end
    fn push_both_ways(&mut self, path: Path) {
        let reversed: Path = path.iter().rev().copied().collect();
        self.push(path);
        self.push(reversed);
    }
}

// ============================================================================
// LEVEL 2 - DISPATCH
// ============================================================================

/// Generate every raw path the restriction allows on this graph
pub fn generate(graph: &ConnectivityGraph, restriction: Restriction) -> Result<PathSet> {
    let set = match restriction.regime()? {
        Regime::Adjacent => adjacent_pairs(graph),
        Regime::Lines { ring, radial } => line_pairs(graph, ring, radial),
        Regime::Walk(hops) => free_walks(graph, hops as usize),
    };

    tracing::debug!(
        "Generated path table for {:?}: {} paths over {} nodes",
        restriction,
        set.len(),
        graph.node_count()
    );

    Ok(set)
}

// ============================================================================
// LEVEL 3 - REGIMES
// ============================================================================

fn adjacent_pairs(graph: &ConnectivityGraph) -> PathSet {
    let mut set = PathSet::default();
    for a in graph.nodes() {
        for b in (a + 1)..graph.len() {
            if graph.adjacent(a, b) {
                set.push_both_ways(vec![a, b]);
            }
        }
    }
    set
}

fn line_pairs(graph: &ConnectivityGraph, ring: bool, radial: bool) -> PathSet {
    let mut set = PathSet::default();
    for a in graph.nodes() {
        for b in (a + 1)..graph.len() {
            let distance = graph.distance(a, b);
            if distance < 0 {
                continue;
            }
            if on_allowed_line(graph, a, b, distance, ring, radial) {
                for path in complete_route(graph, a, b) {
                    set.push_both_ways(path);
                }
            }
        }
    }
    set
}

/// Passes if any one enabled constraint holds
fn on_allowed_line(
    graph: &ConnectivityGraph,
    a: NodeId,
    b: NodeId,
    distance: i32,
    ring: bool,
    radial: bool,
) -> bool {
    let ring_size = graph.ring_size();
    if ring && graph.ring_of(a) == graph.ring_of(b) {
        return true;
    }
    if radial && graph.position_of(a) == graph.position_of(b) {
        return true;
    }
    // Inner-ring cells sit at a different position index than their chain
    radial
        && (a < ring_size || b < ring_size)
        && graph.ring_of(a) != graph.ring_of(b)
        && distance > 0
}

/// Backtracking walk from every node; no node repeats inside one path
fn free_walks(graph: &ConnectivityGraph, hops: usize) -> PathSet {
    let mut set = PathSet::default();
    let mut path = Vec::with_capacity(hops + 1);
    for start in graph.nodes() {
        path.clear();
        path.push(start);
        walk(graph, hops + 1, &mut path, &mut set);
    }
    set
}

fn walk(graph: &ConnectivityGraph, target_len: usize, path: &mut Path, set: &mut PathSet) {
    if path.len() == target_len {
        set.push(path.clone());
        return;
    }

    let Some(&last) = path.last() else {
        return;
    };

    let mut extended = false;
    for next in graph.neighbors(last) {
        if path.contains(&next) {
            continue;
        }
        extended = true;
        path.push(next);
        walk(graph, target_len, path, set);
        path.pop();
    }

    // Dead end: the walk is maximal even though it is short
    if !extended && path.len() > 1 {
        set.push(path.clone());
    }
}

// ============================================================================
// LEVEL 4 - ROUTE COMPLETION
// ============================================================================

/// Fill in the intermediate cells between two related nodes
///
/// Adjacent pairs give `[a, b]`. Pairs on different rings walk the radial
/// chain. Pairs on the same ring give one route per rotational direction.
/// Every returned route starts at `a`.
pub fn complete_route(graph: &ConnectivityGraph, a: NodeId, b: NodeId) -> Vec<Path> {
    if graph.adjacent(a, b) {
        return vec![vec![a, b]];
    }

    let mut routes = if graph.ring_of(a) != graph.ring_of(b) {
        vec![radial_route(graph, a, b)]
    } else {
        let forward = ring_route(graph, a, b);
        let mut backward = ring_route(graph, b, a);
        backward.reverse();
        vec![forward, backward]
    };

    for route in routes.iter_mut() {
        if route.first() != Some(&a) {
            route.reverse();
        }
    }
    routes
}

/// From the outer node down the chain to the inner one
fn radial_route(graph: &ConnectivityGraph, a: NodeId, b: NodeId) -> Path {
    let ring_size = graph.ring_size();
    let (low, high) = (a.min(b), a.max(b));
    let mut route = Vec::new();
    let mut index = high;
    while index > low && index >= ring_size {
        route.push(index);
        index -= ring_size;
    }
    route.push(low);
    route
}

/// Clockwise from `from` to `to`, both included
fn ring_route(graph: &ConnectivityGraph, from: NodeId, to: NodeId) -> Path {
    let mut route = vec![from];
    let mut index = from;
    let limit = graph.ring_len(graph.ring_of(from));
    while index != to && route.len() <= limit {
        index = graph.next_on_ring(index);
        route.push(index);
    }
    route
}
