//! Shared memo of path tables, one per distinct restriction

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use rustc_hash::FxHashMap;

use crate::error::Result;
use crate::graph::ConnectivityGraph;
use crate::paths::{self, PathSet};
use crate::restriction::Restriction;

/// Path tables for one board, generated at most once per restriction
///
/// Entries are never mutated or evicted once stored.
#[derive(Debug)]
pub struct PathCache {
    graph: Arc<ConnectivityGraph>,
    tables: Mutex<FxHashMap<Restriction, Arc<PathSet>>>,
    generations: AtomicUsize,
}

impl PathCache {
    pub fn new(graph: Arc<ConnectivityGraph>) -> Self {
        Self {
            graph,
            tables: Mutex::new(FxHashMap::default()),
            generations: AtomicUsize::new(0),
        }
    }

    pub fn graph(&self) -> &ConnectivityGraph {
        &self.graph
    }

    pub fn shared_graph(&self) -> Arc<ConnectivityGraph> {
        Arc::clone(&self.graph)
    }

    /// Path table for `restriction`, generating it on first request
    pub fn paths(&self, restriction: Restriction) -> Result<Arc<PathSet>> {
        let mut tables = self.tables.lock();
        if let Some(set) = tables.get(&restriction) {
            return Ok(Arc::clone(set));
        }

        // Lock stays held so concurrent first requests generate only once
        let set = Arc::new(paths::generate(&self.graph, restriction)?);
        self.generations.fetch_add(1, Ordering::Relaxed);
        tables.insert(restriction, Arc::clone(&set));
        Ok(set)
    }

    /// Precompute tables before a concurrent phase
    pub fn warm<I>(&self, restrictions: I) -> Result<()>
    where
        I: IntoIterator<Item = Restriction>,
    {
        for restriction in restrictions {
            self.paths(restriction)?;
        }
        Ok(())
    }

    /// Number of tables generated so far
    pub fn generations(&self) -> usize {
        self.generations.load(Ordering::Relaxed)
    }

    pub fn len(&self) -> usize {
        self.tables.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::BoardLayout;

    fn cache() -> PathCache {
        let graph = ConnectivityGraph::ring_board(BoardLayout::default()).unwrap();
        PathCache::new(Arc::new(graph))
    }

    #[test]
    fn test_equal_restrictions_share_table() {
        let cache = cache();
        let first = cache.paths(Restriction::hops(2)).unwrap();
        let second = cache.paths(Restriction::hops(2)).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.generations(), 1);

        cache.paths(Restriction::hops(1)).unwrap();
        assert_eq!(cache.generations(), 2);
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_warm_is_idempotent() {
        let cache = cache();
        let rules = [Restriction::hops(1), Restriction::lines(true, true), Restriction::hops(1)];
        cache.warm(rules).unwrap();
        cache.warm(rules).unwrap();
        assert_eq!(cache.generations(), 2);
    }

    #[test]
    fn test_invalid_restriction_not_cached() {
        let cache = cache();
        assert!(cache.paths(Restriction::hops(0)).is_err());
        assert!(cache.is_empty());
        assert_eq!(cache.generations(), 0);
    }

    #[test]
    fn test_shared_across_threads() {
        let cache = Arc::new(cache());
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let cache = Arc::clone(&cache);
                std::thread::spawn(move || cache.paths(Restriction::hops(3)).unwrap())
            })
            .collect();
        let tables: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert!(tables.windows(2).all(|w| Arc::ptr_eq(&w[0], &w[1])));
        assert_eq!(cache.generations(), 1);
    }
}
