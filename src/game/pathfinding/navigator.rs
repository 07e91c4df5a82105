//! Top-level `find_path` query (§4.D "Query"): same-cluster fast path, abstract
//! portal-graph search, segment stitching, and optional line-of-sight smoothing.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};

use crate::game::errors::NavError;
use crate::game::fixed_math::octile;

use super::astar::{find_path_bounded, Bounds};
use super::graph::HierarchicalGraph;
use super::grid_map::GridMap;
use super::jps::find_path_jps;
use super::types::{Cell, NodeId};

/// Bounded local search shared by every refinement step below (§4.D "Local A*
/// (shared with 4.E)" / "JPS variant"). JPS's forced-neighbor pruning only
/// covers 8-connected movement, so it is used whenever diagonals are allowed
/// — the larger, more common case for same-cluster and intra-cluster
/// refinement — falling back to plain bounded A* in 4-connected mode.
fn local_search(map: &impl GridMap, start: Cell, goal: Cell, bounds: Bounds, allow_diagonal: bool) -> Option<(Vec<Cell>, f32)> {
    if allow_diagonal {
        find_path_jps(map, start, goal, bounds).map(|r| (r.cells, r.cost))
    } else {
        find_path_bounded(map, start, goal, bounds, allow_diagonal).map(|r| (r.cells, r.cost))
    }
}

#[derive(Debug, PartialEq)]
pub struct Path {
    pub cells: Vec<Cell>,
    pub cost: f32,
}

#[derive(Clone, Copy, PartialEq)]
struct Frontier {
    f: f32,
    seq: u64,
    node: NodeId,
}

impl Eq for Frontier {}
impl Ord for Frontier {
    fn cmp(&self, other: &Self) -> Ordering {
        other.f.partial_cmp(&self.f).unwrap_or(Ordering::Equal).then_with(|| other.seq.cmp(&self.seq))
    }
}
impl PartialOrd for Frontier {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Full `find_path(start, goal)` query. `allow_diagonal` and `enable_smoothing`
/// mirror the matching `GameConfig` fields.
pub fn find_path(
    graph: &HierarchicalGraph,
    map: &impl GridMap,
    start: Cell,
    goal: Cell,
    allow_diagonal: bool,
    enable_smoothing: bool,
) -> Result<Path, NavError> {
    if !map.in_bounds(start.x, start.y) || !map.in_bounds(goal.x, goal.y) || !map.is_passable(start.x, start.y) || !map.is_passable(goal.x, goal.y) {
        return Err(NavError::BlockedStartOrGoal);
    }

    let start_cluster_id = graph.cluster_of(start);
    let goal_cluster_id = graph.cluster_of(goal);

    if start_cluster_id == goal_cluster_id {
        let bounds = cluster_bounds_of(graph, start_cluster_id, map);
        let (cells, cost) = local_search(map, start, goal, bounds, allow_diagonal).ok_or(NavError::UnreachableGoal)?;
        let cells = if enable_smoothing { smooth_los(map, bounds, &cells) } else { cells };
        return Ok(Path { cells, cost });
    }

    let start_bounds = cluster_bounds_of(graph, start_cluster_id, map);
    let Some(start_cluster) = graph.cluster(start_cluster_id) else {
        return Err(NavError::UnreachableGoal);
    };

    // Step 1: virtual start edges — local A* from `start` to every portal of
    // its own cluster.
    let mut prefixes: HashMap<NodeId, (Vec<Cell>, f32)> = HashMap::new();
    for &portal_id in &start_cluster.portals {
        let Some(portal) = graph.portal(portal_id) else { continue };
        if let Some((cells, cost)) = local_search(map, start, portal.cell, start_bounds, allow_diagonal) {
            prefixes.insert(portal_id, (cells, cost));
        }
    }
    if prefixes.is_empty() {
        return Err(NavError::UnreachableGoal);
    }

    let goal_portal_set: Vec<NodeId> = graph.cluster(goal_cluster_id).map(|c| c.portals.clone()).unwrap_or_default();

    let mut open = BinaryHeap::new();
    let mut seq = 0u64;
    let mut g_score: HashMap<NodeId, f32> = HashMap::new();
    let mut parent: HashMap<NodeId, NodeId> = HashMap::new();
    let mut via_inter: HashMap<NodeId, bool> = HashMap::new();

    for (&portal_id, &(_, cost)) in &prefixes {
        g_score.insert(portal_id, cost);
        let Some(portal) = graph.portal(portal_id) else { continue };
        open.push(Frontier {
            f: cost + octile(goal.x - portal.cell.x, goal.y - portal.cell.y),
            seq,
            node: portal_id,
        });
        seq += 1;
    }

    let mut reached: Option<NodeId> = None;
    while let Some(Frontier { node: current, .. }) = open.pop() {
        if goal_portal_set.contains(&current) {
            reached = Some(current);
            break;
        }
        let current_g = g_score[&current];
        for edge in graph.edges_of(current) {
            let tentative = current_g + edge.weight;
            if tentative < *g_score.get(&edge.to).unwrap_or(&f32::INFINITY) {
                g_score.insert(edge.to, tentative);
                parent.insert(edge.to, current);
                via_inter.insert(edge.to, edge.inter_cluster);
                let Some(to_portal) = graph.portal(edge.to) else { continue };
                seq += 1;
                open.push(Frontier {
                    f: tentative + octile(goal.x - to_portal.cell.x, goal.y - to_portal.cell.y),
                    seq,
                    node: edge.to,
                });
            }
        }
    }

    let Some(final_portal) = reached else {
        return Err(NavError::UnreachableGoal);
    };

    // Walk the portal chain back to a virtual-start root.
    let mut chain = vec![final_portal];
    while let Some(&p) = parent.get(chain.last().unwrap()) {
        chain.push(p);
    }
    chain.reverse();

    let root = chain[0];
    let (prefix_cells, prefix_cost) = prefixes.get(&root).cloned().unwrap_or((vec![start], 0.0));
    let mut cells = prefix_cells;
    let mut cost = prefix_cost;

    for i in 1..chain.len() {
        let (prev, next) = (chain[i - 1], chain[i]);
        let inter = *via_inter.get(&next).unwrap_or(&false);
        let Some(next_portal) = graph.portal(next) else { continue };
        if inter {
            cells.push(next_portal.cell);
        } else if let Some(cached) = graph.intra_path(prev, next) {
            extend_skip_first(&mut cells, cached);
        } else {
            let Some(prev_portal) = graph.portal(prev) else { continue };
            let cluster_bounds = cluster_bounds_of(graph, prev_portal.cluster, map);
            if let Some((segment, _)) = local_search(map, prev_portal.cell, next_portal.cell, cluster_bounds, allow_diagonal) {
                extend_skip_first(&mut cells, &segment);
            }
        }
        cost += graph.edges_of(prev).iter().find(|e| e.to == next).map(|e| e.weight).unwrap_or(0.0);
    }

    let goal_bounds = cluster_bounds_of(graph, goal_cluster_id, map);
    let last_cell = *cells.last().unwrap();
    let (suffix_cells, suffix_cost) = local_search(map, last_cell, goal, goal_bounds, allow_diagonal).ok_or(NavError::UnreachableGoal)?;
    cost += suffix_cost;
    extend_skip_first(&mut cells, &suffix_cells);

    if enable_smoothing {
        // Only the portion inside the start cluster is eligible for
        // shortcutting (§4.D step 6).
        let split = cells.iter().position(|c| !start_bounds.contains(*c)).unwrap_or(cells.len());
        let mut head = smooth_los(map, start_bounds, &cells[..split]);
        head.extend_from_slice(&cells[split..]);
        cells = head;
    }

    Ok(Path { cells, cost })
}

fn extend_skip_first(cells: &mut Vec<Cell>, segment: &[Cell]) {
    if segment.is_empty() {
        return;
    }
    let start = if cells.last() == Some(&segment[0]) { 1 } else { 0 };
    cells.extend_from_slice(&segment[start..]);
}

fn cluster_bounds_of(graph: &HierarchicalGraph, id: super::types::ClusterId, map: &impl GridMap) -> Bounds {
    graph
        .cluster(id)
        .map(|c| Bounds { x0: c.x0, x1: c.x1, y0: c.y0, y1: c.y1 })
        .unwrap_or_else(|| Bounds::whole_map(map))
}

/// Greedy line-of-sight shortcut: repeatedly jumps to the farthest waypoint
/// still visible by straight-line (Bresenham) sampling, bounded to `bounds`.
/// Does not change the reported path cost (§4.D step 6 / Open Question #3).
fn smooth_los(map: &impl GridMap, bounds: Bounds, cells: &[Cell]) -> Vec<Cell> {
    if cells.len() < 3 {
        return cells.to_vec();
    }
    let mut out = vec![cells[0]];
    let mut anchor = 0;
    while anchor < cells.len() - 1 {
        let mut farthest = anchor + 1;
        for k in (anchor + 2)..cells.len() {
            if !bounds.contains(cells[k]) {
                break;
            }
            if line_of_sight(map, bounds, cells[anchor], cells[k]) {
                farthest = k;
            }
        }
        out.push(cells[farthest]);
        anchor = farthest;
    }
    out
}

fn line_of_sight(map: &impl GridMap, bounds: Bounds, a: Cell, b: Cell) -> bool {
    for c in bresenham(a, b) {
        if !bounds.contains(c) || !map.is_passable(c.x, c.y) {
            return false;
        }
    }
    true
}

fn bresenham(a: Cell, b: Cell) -> Vec<Cell> {
    let mut points = Vec::new();
    let (mut x0, mut y0) = (a.x, a.y);
    let (x1, y1) = (b.x, b.y);
    let dx = (x1 - x0).abs();
    let dy = -(y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;
    loop {
        points.push(Cell::new(x0, y0));
        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
    points
}
