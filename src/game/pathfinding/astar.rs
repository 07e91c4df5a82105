//! Local A* shared by the HPA\* intra-cluster build and bounded-region refinement
//! (§4.D "Local A* (shared with 4.E)").

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};

use super::grid_map::GridMap;
use super::types::Cell;
use crate::game::fixed_math::{manhattan, octile};

const SQRT2: f32 = std::f32::consts::SQRT_2;

const DIRS8: [(i32, i32); 8] = [
    (1, 0),
    (-1, 0),
    (0, 1),
    (0, -1),
    (1, 1),
    (1, -1),
    (-1, 1),
    (-1, -1),
];

#[derive(Clone, Copy, PartialEq)]
struct Frontier {
    f: f32,
    seq: u64,
    cell: Cell,
}

impl Eq for Frontier {}

impl Ord for Frontier {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed for a min-heap on `f`; ties broken by insertion order (lower
        // `seq` first), matching §4.D's "stable" tie-break requirement.
        other
            .f
            .partial_cmp(&self.f)
            .unwrap_or(Ordering::Equal)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for Frontier {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// A rectangular bound `[x0,x1) × [y0,y1)` local search is restricted to.
#[derive(Clone, Copy, Debug)]
pub struct Bounds {
    pub x0: i32,
    pub x1: i32,
    pub y0: i32,
    pub y1: i32,
}

impl Bounds {
    pub fn contains(&self, c: Cell) -> bool {
        c.x >= self.x0 && c.x < self.x1 && c.y >= self.y0 && c.y < self.y1
    }

    pub fn whole_map(map: &impl GridMap) -> Self {
        Self {
            x0: 0,
            x1: map.width(),
            y0: 0,
            y1: map.height(),
        }
    }
}

pub struct PathResult {
    pub cells: Vec<Cell>,
    pub cost: f32,
}

/// 8-connected (or 4-connected when `allow_diagonal` is false) A* restricted to
/// `bounds`. Diagonal moves forbid corner-cutting: both cardinal neighbors of a
/// diagonal step must be passable.
pub fn find_path_bounded(
    map: &impl GridMap,
    start: Cell,
    goal: Cell,
    bounds: Bounds,
    allow_diagonal: bool,
) -> Option<PathResult> {
    if !bounds.contains(start) || !bounds.contains(goal) {
        return None;
    }
    if !map.is_passable(start.x, start.y) || !map.is_passable(goal.x, goal.y) {
        return None;
    }
    if start == goal {
        return Some(PathResult {
            cells: vec![start],
            cost: 0.0,
        });
    }

    let dirs: &[(i32, i32)] = if allow_diagonal { &DIRS8 } else { &DIRS8[0..4] };

    let mut open = BinaryHeap::new();
    let mut seq = 0u64;
    let mut g_score: HashMap<Cell, f32> = HashMap::new();
    let mut came_from: HashMap<Cell, Cell> = HashMap::new();

    g_score.insert(start, 0.0);
    open.push(Frontier {
        f: heuristic(start, goal, allow_diagonal),
        seq,
        cell: start,
    });

    while let Some(Frontier { cell: current, .. }) = open.pop() {
        if current == goal {
            return Some(reconstruct(&came_from, current, g_score[&current]));
        }
        let current_g = g_score[&current];

        for &(dx, dy) in dirs {
            let nx = current.x + dx;
            let ny = current.y + dy;
            let neighbor = Cell::new(nx, ny);
            if !bounds.contains(neighbor) || !map.is_passable(nx, ny) {
                continue;
            }
            if dx != 0 && dy != 0 {
                // Corner-cutting guard: both cardinal neighbors must be passable.
                if !map.is_passable(current.x + dx, current.y) || !map.is_passable(current.x, current.y + dy) {
                    continue;
                }
            }

            let step = if dx != 0 && dy != 0 { SQRT2 } else { 1.0 };
            let step = step * (1.0 + map.extra_cost(nx, ny).max(0.0));
            let tentative_g = current_g + step;

            if tentative_g < *g_score.get(&neighbor).unwrap_or(&f32::INFINITY) {
                came_from.insert(neighbor, current);
                g_score.insert(neighbor, tentative_g);
                seq += 1;
                open.push(Frontier {
                    f: tentative_g + heuristic(neighbor, goal, allow_diagonal),
                    seq,
                    cell: neighbor,
                });
            }
        }
    }
    None
}

fn heuristic(a: Cell, b: Cell, allow_diagonal: bool) -> f32 {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    if allow_diagonal {
        octile(dx, dy)
    } else {
        manhattan(dx, dy)
    }
}

fn reconstruct(came_from: &HashMap<Cell, Cell>, mut current: Cell, cost: f32) -> PathResult {
    let mut cells = vec![current];
    while let Some(&prev) = came_from.get(&current) {
        current = prev;
        cells.push(current);
    }
    cells.reverse();
    PathResult { cells, cost }
}
