//! Jump Point Search (§4.D "JPS variant"). Honors a bounding box and the same
//! corner-cutting rule as local A*; used for larger same-cluster refinement
//! searches.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};

use super::astar::Bounds;
use super::grid_map::GridMap;
use super::types::Cell;
use crate::game::fixed_math::octile;

const COST_STRAIGHT: f32 = 1.0;
const COST_DIAGONAL: f32 = std::f32::consts::SQRT_2;

fn passable(map: &impl GridMap, bounds: &Bounds, c: Cell) -> bool {
    bounds.contains(c) && map.is_passable(c.x, c.y)
}

fn can_diag(map: &impl GridMap, a: Cell, dx: i32, dy: i32) -> bool {
    map.is_passable(a.x + dx, a.y) && map.is_passable(a.x, a.y + dy)
}

fn jump(map: &impl GridMap, bounds: &Bounds, curr: Cell, goal: Cell, dx: i32, dy: i32) -> Option<Cell> {
    let n = Cell::new(curr.x + dx, curr.y + dy);
    if !passable(map, bounds, n) {
        return None;
    }
    if n == goal {
        return Some(n);
    }

    if dx != 0 && dy == 0 {
        if (!map.is_passable(n.x, n.y + 1) && map.is_passable(n.x - dx, n.y + 1))
            || (!map.is_passable(n.x, n.y - 1) && map.is_passable(n.x - dx, n.y - 1))
        {
            return Some(n);
        }
    } else if dy != 0 && dx == 0 {
        if (!map.is_passable(n.x + 1, n.y) && map.is_passable(n.x + 1, n.y - dy))
            || (!map.is_passable(n.x - 1, n.y) && map.is_passable(n.x - 1, n.y - dy))
        {
            return Some(n);
        }
    } else {
        if !can_diag(map, curr, dx, dy) {
            return None;
        }
        if (!map.is_passable(n.x - dx, n.y) && map.is_passable(n.x - dx, n.y + dy))
            || (!map.is_passable(n.x, n.y - dy) && map.is_passable(n.x + dx, n.y - dy))
        {
            return Some(n);
        }
        if jump(map, bounds, n, goal, dx, 0).is_some() {
            return Some(n);
        }
        if jump(map, bounds, n, goal, 0, dy).is_some() {
            return Some(n);
        }
    }
    jump(map, bounds, n, goal, dx, dy)
}

fn pruned_directions(parent: Option<Cell>, cur: Cell) -> Vec<(i32, i32)> {
    const DIRS8: [(i32, i32); 8] = [
        (-1, 0),
        (1, 0),
        (0, -1),
        (0, 1),
        (-1, -1),
        (1, -1),
        (-1, 1),
        (1, 1),
    ];
    let Some(parent) = parent else {
        return DIRS8.to_vec();
    };
    let dx = (cur.x - parent.x).signum();
    let dy = (cur.y - parent.y).signum();
    if dx != 0 && dy != 0 {
        vec![(dx, dy), (dx, 0), (0, dy)]
    } else if dx != 0 {
        vec![(dx, 0), (dx, 1), (dx, -1)]
    } else {
        vec![(0, dy), (1, dy), (-1, dy)]
    }
}

#[derive(Clone, Copy, PartialEq)]
struct Rec {
    f: f32,
    seq: u64,
    cell: Cell,
}

impl Eq for Rec {}
impl Ord for Rec {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .f
            .partial_cmp(&self.f)
            .unwrap_or(Ordering::Equal)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}
impl PartialOrd for Rec {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

pub struct JpsResult {
    pub cells: Vec<Cell>,
    pub cost: f32,
}

/// Find a jump-point path from `start` to `goal`, restricted to `bounds`.
pub fn find_path_jps(map: &impl GridMap, start: Cell, goal: Cell, bounds: Bounds) -> Option<JpsResult> {
    if !passable(map, &bounds, start) || !passable(map, &bounds, goal) {
        return None;
    }

    let mut open = BinaryHeap::new();
    let mut seq = 0u64;
    let mut g: HashMap<Cell, f32> = HashMap::new();
    let mut parent: HashMap<Cell, Cell> = HashMap::new();

    g.insert(start, 0.0);
    open.push(Rec {
        f: octile(goal.x - start.x, goal.y - start.y),
        seq,
        cell: start,
    });

    while let Some(Rec { cell: cur, .. }) = open.pop() {
        if cur == goal {
            return Some(reconstruct(&parent, start, goal, g[&goal]));
        }

        let parent_node = parent.get(&cur).copied();
        for (dx, dy) in pruned_directions(parent_node, cur) {
            if dx != 0 && dy != 0 && !can_diag(map, cur, dx, dy) {
                continue;
            }
            if let Some(jp) = jump(map, &bounds, cur, goal, dx, dy) {
                let steps = (jp.x - cur.x).abs().max((jp.y - cur.y).abs());
                let step_cost = if dx != 0 && dy != 0 { COST_DIAGONAL } else { COST_STRAIGHT };
                let add = step_cost * steps as f32 + map.extra_cost(jp.x, jp.y).max(0.0);
                let tentative = g[&cur] + add;
                if tentative < *g.get(&jp).unwrap_or(&f32::INFINITY) {
                    g.insert(jp, tentative);
                    parent.insert(jp, cur);
                    seq += 1;
                    open.push(Rec {
                        f: tentative + octile(goal.x - jp.x, goal.y - jp.y),
                        seq,
                        cell: jp,
                    });
                }
            }
        }
    }
    None
}

/// Reconstructs the jump-point chain, then string-pulls consecutive collinear
/// points into a single segment endpoint (matching the C++ original's "simple
/// collinearity prune"). Callers needing every intermediate grid cell (e.g. for
/// movement) should expand segments themselves; this keeps the returned path the
/// same minimal waypoint list JPS naturally produces.
fn reconstruct(parent: &HashMap<Cell, Cell>, start: Cell, goal: Cell, cost: f32) -> JpsResult {
    let mut rev = vec![goal];
    let mut at = goal;
    while at != start {
        at = parent[&at];
        rev.push(at);
    }
    rev.reverse();

    let mut pulled: Vec<Cell> = Vec::new();
    for c in rev {
        if pulled.len() < 2 {
            pulled.push(c);
            continue;
        }
        let a = pulled[pulled.len() - 2];
        let b = *pulled.last().unwrap();
        let n1 = ((b.x - a.x).signum(), (b.y - a.y).signum());
        let n2 = ((c.x - b.x).signum(), (c.y - b.y).signum());
        if n1 == n2 {
            *pulled.last_mut().unwrap() = c;
        } else {
            pulled.push(c);
        }
    }
    JpsResult { cells: pulled, cost }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::pathfinding::grid_map::BoolGrid;

    #[test]
    fn straight_line_finds_direct_path() {
        let g = BoolGrid::all_passable(10, 10);
        let bounds = Bounds::whole_map(&g);
        let r = find_path_jps(&g, Cell::new(0, 0), Cell::new(9, 0), bounds).unwrap();
        assert_eq!(r.cost, 9.0);
        assert_eq!(r.cells.first(), Some(&Cell::new(0, 0)));
        assert_eq!(r.cells.last(), Some(&Cell::new(9, 0)));
    }

    #[test]
    fn diagonal_straight_shot() {
        let g = BoolGrid::all_passable(10, 10);
        let bounds = Bounds::whole_map(&g);
        let r = find_path_jps(&g, Cell::new(0, 0), Cell::new(5, 5), bounds).unwrap();
        assert!((r.cost - 5.0 * COST_DIAGONAL).abs() < 1e-3);
    }

    #[test]
    fn blocked_goal_returns_none() {
        let mut g = BoolGrid::all_passable(5, 5);
        g.set(4, 4, false);
        let bounds = Bounds::whole_map(&g);
        assert!(find_path_jps(&g, Cell::new(0, 0), Cell::new(4, 4), bounds).is_none());
    }

    #[test]
    fn routes_around_a_wall() {
        let mut g = BoolGrid::all_passable(10, 3);
        for x in 0..9 {
            g.set(x, 1, false);
        }
        let bounds = Bounds::whole_map(&g);
        let r = find_path_jps(&g, Cell::new(0, 0), Cell::new(0, 2), bounds).unwrap();
        assert!(r.cost > 2.0);
    }
}
