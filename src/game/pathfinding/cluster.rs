//! Cluster partitioning and border-entrance scanning (§4.D build pipeline steps 1-2).

use super::grid_map::GridMap;
use super::types::{Cell, Cluster, ClusterId};

pub fn cluster_id_for(cell: Cell, cluster_size: i32) -> ClusterId {
    ClusterId {
        cx: cell.x.div_euclid(cluster_size),
        cy: cell.y.div_euclid(cluster_size),
    }
}

pub fn cluster_bounds(id: ClusterId, cluster_size: i32, world_w: i32, world_h: i32) -> Cluster {
    let x0 = id.cx * cluster_size;
    let y0 = id.cy * cluster_size;
    Cluster {
        x0,
        x1: (x0 + cluster_size).min(world_w),
        y0,
        y1: (y0 + cluster_size).min(world_h),
        portals: Vec::new(),
    }
}

pub fn partition(cluster_size: i32, world_w: i32, world_h: i32) -> Vec<ClusterId> {
    let cols = (world_w + cluster_size - 1) / cluster_size;
    let rows = (world_h + cluster_size - 1) / cluster_size;
    let mut ids = Vec::with_capacity((cols * rows) as usize);
    for cy in 0..rows {
        for cx in 0..cols {
            ids.push(ClusterId { cx, cy });
        }
    }
    ids
}

/// A contiguous run of mutually-passable cells along a shared cluster border.
pub struct Entrance {
    /// Cell on the first (lower-coordinate) side of the border.
    pub a_start: Cell,
    pub a_end: Cell,
    /// Matching cell on the second (higher-coordinate) side.
    pub b_start: Cell,
    pub b_end: Cell,
    pub len: i32,
}

/// Scans the vertical border between a cluster and its right neighbor (columns
/// `x` and `x+1`, rows `y0..y1`), returning one `Entrance` per maximal run of
/// cells where both sides are passable.
pub fn scan_vertical_border(map: &impl GridMap, x: i32, y0: i32, y1: i32) -> Vec<Entrance> {
    let mut out = Vec::new();
    let mut run_start: Option<i32> = None;
    for y in y0..y1 {
        let ok = map.is_passable(x, y) && map.is_passable(x + 1, y);
        if ok {
            if run_start.is_none() {
                run_start = Some(y);
            }
        } else if let Some(s) = run_start.take() {
            out.push(make_vertical(x, s, y - 1));
        }
    }
    if let Some(s) = run_start {
        out.push(make_vertical(x, s, y1 - 1));
    }
    out
}

fn make_vertical(x: i32, y_start: i32, y_end: i32) -> Entrance {
    Entrance {
        a_start: Cell::new(x, y_start),
        a_end: Cell::new(x, y_end),
        b_start: Cell::new(x + 1, y_start),
        b_end: Cell::new(x + 1, y_end),
        len: y_end - y_start + 1,
    }
}

/// Scans the horizontal border between a cluster and its neighbor below (rows
/// `y` and `y+1`, columns `x0..x1`).
pub fn scan_horizontal_border(map: &impl GridMap, y: i32, x0: i32, x1: i32) -> Vec<Entrance> {
    let mut out = Vec::new();
    let mut run_start: Option<i32> = None;
    for x in x0..x1 {
        let ok = map.is_passable(x, y) && map.is_passable(x, y + 1);
        if ok {
            if run_start.is_none() {
                run_start = Some(x);
            }
        } else if let Some(s) = run_start.take() {
            out.push(make_horizontal(y, s, x - 1));
        }
    }
    if let Some(s) = run_start {
        out.push(make_horizontal(y, s, x1 - 1));
    }
    out
}

fn make_horizontal(y: i32, x_start: i32, x_end: i32) -> Entrance {
    Entrance {
        a_start: Cell::new(x_start, y),
        a_end: Cell::new(x_end, y),
        b_start: Cell::new(x_start, y + 1),
        b_end: Cell::new(x_end, y + 1),
        len: x_end - x_start + 1,
    }
}

/// Portal placement cells for one entrance, per §4.D step 3: a single midpoint
/// pair if `len <= split_threshold`, else one pair at each end.
pub fn portal_placements(e: &Entrance, split_threshold: i32) -> Vec<(Cell, Cell)> {
    if e.len <= split_threshold {
        let mid = e.len / 2;
        vec![(offset(e.a_start, e.a_end, mid), offset(e.b_start, e.b_end, mid))]
    } else {
        vec![(e.a_start, e.b_start), (e.a_end, e.b_end)]
    }
}

fn offset(start: Cell, end: Cell, n: i32) -> Cell {
    if start.x == end.x {
        Cell::new(start.x, start.y + n)
    } else {
        Cell::new(start.x + n, start.y)
    }
}
