//! Dijkstra search over the adventure map
//!
//! Eight-way movement; the cost of a step is the cost of the tile entered.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use ahash::AHashMap;
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

use super::adventure_map::AdventureMap;
use crate::core::types::GridPos;

/// Orthogonal directions first, then diagonals
pub const DIRECTIONS: [(i32, i32); 8] = [
    (0, -1),
    (1, 0),
    (0, 1),
    (-1, 0),
    (1, -1),
    (1, 1),
    (-1, 1),
    (-1, -1),
];

/// A found route
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapPath {
    /// Tiles to walk, excluding the start
    pub steps: Vec<GridPos>,
    pub cost: f64,
}

/// Node in the open set
#[derive(Debug, Clone, Copy)]
struct PathNode {
    pos: GridPos,
    cost: OrderedFloat<f64>,
}

impl PartialEq for PathNode {
    fn eq(&self, other: &Self) -> bool {
        self.cost == other.cost && self.pos == other.pos
    }
}

impl Eq for PathNode {}

impl Ord for PathNode {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse order for min-heap
        other.cost.cmp(&self.cost)
    }
}

impl PartialOrd for PathNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Cheapest route from `start` to `goal`
///
/// Returns None when the goal is impassable or unreachable. A path to the
/// start itself is empty with zero cost.
pub fn find_path(map: &AdventureMap, start: GridPos, goal: GridPos) -> Option<MapPath> {
    if !map.is_passable(goal) {
        return None;
    }

    let mut open_set = BinaryHeap::new();
    let mut came_from: AHashMap<GridPos, GridPos> = AHashMap::new();
    let mut best: AHashMap<GridPos, OrderedFloat<f64>> = AHashMap::new();

    best.insert(start, OrderedFloat(0.0));
    open_set.push(PathNode {
        pos: start,
        cost: OrderedFloat(0.0),
    });

    while let Some(current) = open_set.pop() {
        if current.pos == goal {
            return Some(MapPath {
                steps: reconstruct_path(&came_from, start, goal),
                cost: current.cost.into_inner(),
            });
        }

        // Stale heap entry
        if best.get(&current.pos).is_some_and(|&b| current.cost > b) {
            continue;
        }

        for (dx, dy) in DIRECTIONS {
            let next = current.pos.offset(dx, dy);
            if !map.is_passable(next) {
                continue;
            }

            let tentative = OrderedFloat(current.cost.into_inner() + map.move_cost(next));
            let known = best
                .get(&next)
                .copied()
                .unwrap_or(OrderedFloat(f64::INFINITY));
            if tentative < known {
                came_from.insert(next, current.pos);
                best.insert(next, tentative);
                open_set.push(PathNode {
                    pos: next,
                    cost: tentative,
                });
            }
        }
    }

    None
}

fn reconstruct_path(
    came_from: &AHashMap<GridPos, GridPos>,
    start: GridPos,
    goal: GridPos,
) -> Vec<GridPos> {
    let mut path = Vec::new();
    let mut current = goal;
    while current != start {
        path.push(current);
        match came_from.get(&current) {
            Some(&prev) => current = prev,
            None => break,
        }
    }
    path.reverse();
    path
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::terrain::Terrain;

    #[test]
    fn test_straight_path_on_grass() {
        let map = AdventureMap::new(10, 10);
        let path = find_path(&map, GridPos::new(1, 1), GridPos::new(4, 1)).expect("open field");
        assert_eq!(path.steps.len(), 3);
        assert_eq!(path.steps.last(), Some(&GridPos::new(4, 1)));
        assert_eq!(path.cost, 3.0);
    }

    #[test]
    fn test_diagonal_steps_cost_one_tile() {
        let map = AdventureMap::new(10, 10);
        let path = find_path(&map, GridPos::new(0, 0), GridPos::new(3, 3)).expect("open field");
        assert_eq!(path.steps.len(), 3);
        assert_eq!(path.cost, 3.0);
    }

    #[test]
    fn test_prefers_road_over_swamp() {
        let mut map = AdventureMap::new(5, 3);
        for x in 0..5 {
            map.set_terrain(GridPos::new(x, 0), Terrain::Road);
            map.set_terrain(GridPos::new(x, 1), Terrain::Swamp);
            map.set_terrain(GridPos::new(x, 2), Terrain::Water);
        }
        let path = find_path(&map, GridPos::new(0, 1), GridPos::new(4, 1)).expect("route exists");
        // Up onto the road, along it, and down into the swamp at the end
        assert_eq!(path.cost, 0.5 * 3.0 + 3.0);
        assert!(path.steps.iter().any(|p| p.y == 0));
    }

    #[test]
    fn test_unreachable_goal() {
        let mut map = AdventureMap::new(6, 6);
        for y in 0..6 {
            map.set_terrain(GridPos::new(3, y), Terrain::Mountain);
        }
        assert!(find_path(&map, GridPos::new(0, 0), GridPos::new(5, 5)).is_none());
        assert!(find_path(&map, GridPos::new(0, 0), GridPos::new(3, 3)).is_none());
    }

    #[test]
    fn test_path_to_self_is_empty() {
        let map = AdventureMap::new(4, 4);
        let path = find_path(&map, GridPos::new(2, 2), GridPos::new(2, 2)).expect("trivial");
        assert!(path.steps.is_empty());
        assert_eq!(path.cost, 0.0);
    }
}
