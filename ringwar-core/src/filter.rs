//! Legal movement per unit rule
//!
//! Raw paths come from the [`PathCache`]; this module applies live occupancy.

use rustc_hash::FxHashMap;

use crate::board::OccupancyView;
use crate::cache::PathCache;
use crate::error::Result;
use crate::graph::NodeId;
use crate::paths::Path;
use crate::restriction::Restriction;
use crate::units::{MoveRule, Unit};

/// Legal paths for `unit` standing on `source`
pub fn legal_paths(
    cache: &PathCache,
    view: &OccupancyView,
    unit: &Unit,
    source: NodeId,
) -> Result<Vec<Path>> {
    match unit.rule {
        MoveRule::Plain(r) => plain(cache, view, unit, source, r),
        MoveRule::Blocker(r) => blocked(cache, view, unit, source, r),
        MoveRule::ForcedAdvance { step, scan } => forced_advance(cache, view, unit, source, step, scan),
        MoveRule::Union(a, b) => {
            let mut paths = blocked(cache, view, unit, source, a)?;
            for path in blocked(cache, view, unit, source, b)? {
                if !paths.contains(&path) {
                    paths.push(path);
                }
            }
            Ok(paths)
        }
    }
}

/// Distinct final nodes of the legal paths, first-seen order
pub fn legal_destinations(
    cache: &PathCache,
    view: &OccupancyView,
    unit: &Unit,
    source: NodeId,
) -> Result<Vec<NodeId>> {
    let paths = legal_paths(cache, view, unit, source)?;
    Ok(destinations_of(&paths))
}

pub fn destinations_of(paths: &[Path]) -> Vec<NodeId> {
    let mut destinations = Vec::new();
    for path in paths {
        if let Some(&end) = path.last() {
            if !destinations.contains(&end) {
                destinations.push(end);
            }
        }
    }
    destinations
}

// ============================================================================
// RULE VARIANTS
// ============================================================================

fn ends_legally(view: &OccupancyView, unit: &Unit, path: &Path) -> bool {
    let Some(&end) = path.last() else {
        return false;
    };
    let cell = view.get(end);
    cell.accessible && (!cell.has_enemy || unit.can_kill)
}

fn clear_between(view: &OccupancyView, path: &Path) -> bool {
    path.len() < 3 || path[1..path.len() - 1].iter().all(|n| !view.get(*n).is_occupied())
}

fn plain(
    cache: &PathCache,
    view: &OccupancyView,
    unit: &Unit,
    source: NodeId,
    restriction: Restriction,
) -> Result<Vec<Path>> {
    let table = cache.paths(restriction)?;
    Ok(table
        .from(source)
        .iter()
        .filter(|p| ends_legally(view, unit, p))
        .cloned()
        .collect())
}

fn blocked(
    cache: &PathCache,
    view: &OccupancyView,
    unit: &Unit,
    source: NodeId,
    restriction: Restriction,
) -> Result<Vec<Path>> {
    let table = cache.paths(restriction)?;
    Ok(table
        .from(source)
        .iter()
        .filter(|p| ends_legally(view, unit, p) && clear_between(view, p))
        .cloned()
        .collect())
}

/// Enemies visible along `scan` from `origin`, with their minimum hop count
fn visible_enemies(
    cache: &PathCache,
    view: &OccupancyView,
    origin: NodeId,
    scan: Restriction,
) -> Result<FxHashMap<NodeId, usize>> {
    let table = cache.paths(scan)?;
    let mut enemies: FxHashMap<NodeId, usize> = FxHashMap::default();
    for path in table.from(origin) {
        let Some(&end) = path.last() else {
            continue;
        };
        if !view.get(end).has_enemy || !clear_between(view, path) {
            continue;
        }
        let hops = path.len() - 1;
        enemies
            .entry(end)
            .and_modify(|h| *h = (*h).min(hops))
            .or_insert(hops);
    }
    Ok(enemies)
}

fn forced_advance(
    cache: &PathCache,
    view: &OccupancyView,
    unit: &Unit,
    source: NodeId,
    step: Restriction,
    scan: Restriction,
) -> Result<Vec<Path>> {
    let steps = plain(cache, view, unit, source, step)?;
    let targets = visible_enemies(cache, view, source, scan)?;
    if targets.is_empty() {
        return Ok(steps);
    }

    let mut kept = Vec::new();
    for path in steps {
        let Some(&end) = path.last() else {
            continue;
        };
        let closes_in = targets.contains_key(&end)
            || visible_enemies(cache, view, end, scan)?
                .iter()
                .any(|(enemy, hops)| targets.get(enemy).is_some_and(|before| hops < before));
        if closes_in {
            kept.push(path);
        }
    }
    Ok(kept)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Board;
    use crate::graph::{BoardLayout, ConnectivityGraph};
    use crate::units::{PlayerId, UnitClass};
    use std::sync::Arc;

    const A: PlayerId = PlayerId(0);
    const B: PlayerId = PlayerId(1);

    fn setup() -> (PathCache, Board) {
        let graph = ConnectivityGraph::ring_board(BoardLayout::default()).unwrap();
        let board = Board::new(&graph, vec![A, B]);
        (PathCache::new(Arc::new(graph)), board)
    }

    fn destinations(cache: &PathCache, board: &Board, node: NodeId) -> Vec<NodeId> {
        let unit = board.unit_at(node).unwrap();
        let view = OccupancyView::for_player(board, unit.owner);
        let mut d = legal_destinations(cache, &view, unit, node).unwrap();
        d.sort();
        d
    }

    #[test]
    fn test_never_lands_on_ally() {
        let (cache, mut board) = setup();
        board.place(A, UnitClass::Wizard, 17).unwrap();
        board.place(A, UnitClass::Warrior, 18).unwrap();
        board.place(A, UnitClass::Pawn, 33).unwrap();
        board.place(A, UnitClass::Priestess, 20).unwrap();
        for node in [17, 18, 33, 20] {
            for dest in destinations(&cache, &board, node) {
                let occupant = board.unit_at(dest);
                assert!(occupant.map_or(true, |u| u.owner != A), "{} -> {}", node, dest);
            }
        }
    }

    #[test]
    fn test_warrior_captures_adjacent() {
        let (cache, mut board) = setup();
        board.place(A, UnitClass::Warrior, 16).unwrap();
        board.place(B, UnitClass::Pawn, 17).unwrap();
        assert_eq!(destinations(&cache, &board, 16), vec![17, 31]);
    }

    #[test]
    fn test_untouchable_enemy_blocks_destination() {
        let (cache, mut board) = setup();
        board.place(A, UnitClass::Warrior, 16).unwrap();
        board.place(B, UnitClass::HolyChampion, 17).unwrap();
        assert_eq!(destinations(&cache, &board, 16), vec![31]);
    }

    #[test]
    fn test_holy_champion_cannot_capture() {
        let (cache, mut board) = setup();
        board.place(A, UnitClass::HolyChampion, 16).unwrap();
        board.place(B, UnitClass::Pawn, 17).unwrap();
        assert!(!destinations(&cache, &board, 16).contains(&17));
    }

    #[test]
    fn test_priestess_blocked_by_units() {
        let (cache, mut board) = setup();
        board.place(A, UnitClass::Priestess, 16).unwrap();
        board.place(B, UnitClass::Pawn, 18).unwrap();
        board.place(B, UnitClass::Pawn, 30).unwrap();
        // Both rotational routes stop at the first enemy, which is capturable
        assert_eq!(destinations(&cache, &board, 16), vec![17, 18, 30, 31]);
    }

    #[test]
    fn test_pawn_free_when_no_enemy_visible() {
        let (cache, mut board) = setup();
        board.place(A, UnitClass::Pawn, 16).unwrap();
        // Node 16 has no radial link; enemy on another ring is invisible
        board.place(B, UnitClass::Warrior, 40).unwrap();
        assert_eq!(destinations(&cache, &board, 16), vec![17, 31]);
    }

    #[test]
    fn test_pawn_forced_toward_enemy() {
        let (cache, mut board) = setup();
        board.place(A, UnitClass::Pawn, 16).unwrap();
        board.place(B, UnitClass::Warrior, 20).unwrap();
        // Enemy at 4 hops clockwise; stepping to 17 closes in, 31 does not
        assert_eq!(destinations(&cache, &board, 16), vec![17]);
    }

    #[test]
    fn test_pawn_captures_adjacent_enemy() {
        let (cache, mut board) = setup();
        board.place(A, UnitClass::Pawn, 16).unwrap();
        board.place(B, UnitClass::Warrior, 17).unwrap();
        assert_eq!(destinations(&cache, &board, 16), vec![17]);
    }

    #[test]
    fn test_union_rule_blocks_and_deduplicates() {
        let (cache, mut board) = setup();
        board.place(A, UnitClass::HolyChampion, 16).unwrap();
        board.place(A, UnitClass::Warrior, 17).unwrap();
        let unit = board.unit_at(16).unwrap();
        let view = OccupancyView::for_player(&board, A);

        // The raw walk table does route through the ally
        let walks = cache.paths(Restriction::hops(3)).unwrap();
        assert!(walks.from(16).iter().any(|p| p[1] == 17));

        let paths = legal_paths(&cache, &view, unit, 16).unwrap();
        for path in &paths {
            assert!(!path[1..].contains(&17), "{:?}", path);
        }
        for (i, path) in paths.iter().enumerate() {
            assert!(!paths[i + 1..].contains(path), "duplicate {:?}", path);
        }

        let found = legal_destinations(&cache, &view, unit, 16).unwrap();
        let mut unique = found.clone();
        unique.sort();
        unique.dedup();
        assert_eq!(unique.len(), found.len());
        // 18 and 20 only via the long way round the ring
        assert!(found.contains(&18));
        assert!(found.contains(&20));
        assert!(!found.contains(&17));
    }
}
