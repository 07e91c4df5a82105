//! The abstract HPA\* graph: cluster partitioning, portal placement, and
//! intra/inter-cluster edges (§4.D build pipeline + incremental rebuild).

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::astar::{find_path_bounded, Bounds};
use super::cluster::{cluster_bounds, cluster_id_for, partition, portal_placements, scan_horizontal_border, scan_vertical_border};
use super::grid_map::GridMap;
use super::types::{Cell, Cluster, ClusterId, Edge, NodeId, PortalNode};

#[derive(Clone, Serialize, Deserialize)]
pub struct HierarchicalGraph {
    pub cluster_size: i32,
    pub entrance_split_threshold: i32,
    world_w: i32,
    world_h: i32,
    clusters: HashMap<ClusterId, Cluster>,
    nodes: Vec<Option<PortalNode>>,
    edges: HashMap<NodeId, Vec<Edge>>,
    intra_cache: HashMap<(NodeId, NodeId), Vec<Cell>>,
}

impl HierarchicalGraph {
    pub fn new(cluster_size: i32, entrance_split_threshold: i32, world_w: i32, world_h: i32) -> Self {
        Self {
            cluster_size,
            entrance_split_threshold,
            world_w,
            world_h,
            clusters: HashMap::new(),
            nodes: Vec::new(),
            edges: HashMap::new(),
            intra_cache: HashMap::new(),
        }
    }

    pub fn cluster_of(&self, cell: Cell) -> ClusterId {
        cluster_id_for(cell, self.cluster_size)
    }

    pub fn cluster(&self, id: ClusterId) -> Option<&Cluster> {
        self.clusters.get(&id)
    }

    pub fn portal(&self, id: NodeId) -> Option<&PortalNode> {
        self.nodes.get(id.0 as usize).and_then(|o| o.as_ref())
    }

    pub fn edges_of(&self, id: NodeId) -> &[Edge] {
        self.edges.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn intra_path(&self, a: NodeId, b: NodeId) -> Option<&[Cell]> {
        self.intra_cache.get(&(a, b)).map(Vec::as_slice)
    }

    fn new_node(&mut self, node: PortalNode) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Some(node));
        id
    }

    fn add_inter_edge(&mut self, a: NodeId, b: NodeId, weight: f32) {
        self.edges.entry(a).or_default().push(Edge {
            to: b,
            weight,
            inter_cluster: true,
        });
        self.edges.entry(b).or_default().push(Edge {
            to: a,
            weight,
            inter_cluster: true,
        });
    }

    /// Full rebuild from scratch (§4.D "rebuild_all"). Partitions the grid,
    /// scans every shared border for entrances, places portals, and computes
    /// intra-cluster edges for every cluster.
    pub fn rebuild_all(&mut self, map: &impl GridMap) {
        self.clusters.clear();
        self.nodes.clear();
        self.edges.clear();
        self.intra_cache.clear();

        let ids = partition(self.cluster_size, self.world_w, self.world_h);
        for id in &ids {
            self.clusters.insert(*id, cluster_bounds(*id, self.cluster_size, self.world_w, self.world_h));
        }

        for id in &ids {
            let east = ClusterId { cx: id.cx + 1, cy: id.cy };
            if self.clusters.contains_key(&east) {
                self.build_border(map, *id, east);
            }
            let south = ClusterId { cx: id.cx, cy: id.cy + 1 };
            if self.clusters.contains_key(&south) {
                self.build_border(map, *id, south);
            }
        }

        for id in &ids {
            self.rebuild_intra_edges(map, *id);
        }
    }

    /// Incremental rebuild after the tile at `(x, y)` changes passability
    /// (§4.D "rebuild_cluster_at"). Touches the containing cluster and its
    /// (up to 4) existing neighbors: only the borders between the touched
    /// cluster and each neighbor are re-scanned, so a neighbor's portals facing
    /// *other* clusters are left untouched. Intra edges are recomputed for
    /// every affected cluster once its portal set is final.
    pub fn rebuild_cluster_at(&mut self, map: &impl GridMap, x: i32, y: i32) {
        let touched = self.cluster_of(Cell::new(x, y));
        if !self.clusters.contains_key(&touched) {
            return;
        }
        let neighbor_dirs = [(-1, 0), (1, 0), (0, -1), (0, 1)];
        let mut affected = vec![touched];

        for (dx, dy) in neighbor_dirs {
            let n = ClusterId { cx: touched.cx + dx, cy: touched.cy + dy };
            if !self.clusters.contains_key(&n) {
                continue;
            }
            affected.push(n);
            let (a, b) = if dx == 1 || dy == 1 { (touched, n) } else { (n, touched) };
            self.clear_border(a, b);
            self.build_border(map, a, b);
        }

        for id in affected {
            self.rebuild_intra_edges(map, id);
        }
    }

    /// Removes the portals (and their edges/intra-cache entries) that sit on
    /// the shared border between adjacent clusters `a` (west/north side) and
    /// `b` (east/south side).
    fn clear_border(&mut self, a: ClusterId, b: ClusterId) {
        // Collect removals from both sides against the *original* edge set
        // first: stripping `a`'s side would otherwise delete the matching
        // symmetric edge on `b`'s portals before `b`'s side gets evaluated,
        // leaving an orphaned (edgeless) portal behind in `b`'s list.
        let mut to_remove: Vec<NodeId> = Vec::new();
        for (cluster_id, other) in [(a, b), (b, a)] {
            let Some(cluster) = self.clusters.get(&cluster_id) else { continue };
            to_remove.extend(cluster.portals.iter().copied().filter(|&pid| {
                self.edges_of(pid).iter().any(|e| e.inter_cluster && self.portal(e.to).map(|p| p.cluster) == Some(other))
            }));
        }

        for pid in &to_remove {
            for e in self.edges_of(*pid).to_vec() {
                self.edges.entry(e.to).or_default().retain(|edge| edge.to != *pid);
            }
            self.edges.remove(pid);
            self.intra_cache.retain(|&(x, y), _| x != *pid && y != *pid);
            self.nodes[pid.0 as usize] = None;
        }
        for cluster_id in [a, b] {
            if let Some(cluster) = self.clusters.get_mut(&cluster_id) {
                cluster.portals.retain(|p| !to_remove.contains(p));
            }
        }
    }

    /// Scans the border between `a` (west/north) and `b` (east/south), placing
    /// portals per §4.D step 3 and linking them with an inter-cluster edge.
    fn build_border(&mut self, map: &impl GridMap, a: ClusterId, b: ClusterId) {
        let ca = self.clusters[&a].clone();
        let cb = self.clusters[&b].clone();

        let entrances = if b.cx > a.cx {
            let x = ca.x1 - 1;
            let y0 = ca.y0.max(cb.y0);
            let y1 = ca.y1.min(cb.y1);
            scan_vertical_border(map, x, y0, y1)
        } else {
            let y = ca.y1 - 1;
            let x0 = ca.x0.max(cb.x0);
            let x1 = ca.x1.min(cb.x1);
            scan_horizontal_border(map, y, x0, x1)
        };

        for entrance in &entrances {
            for (cell_a, cell_b) in portal_placements(entrance, self.entrance_split_threshold) {
                let cost_a = map.extra_cost(cell_a.x, cell_a.y).max(0.0) + 1.0;
                let cost_b = map.extra_cost(cell_b.x, cell_b.y).max(0.0) + 1.0;
                let weight = 0.5 * (cost_a + cost_b);

                let id_a = self.new_node(PortalNode { cell: cell_a, cluster: a });
                let id_b = self.new_node(PortalNode { cell: cell_b, cluster: b });
                self.clusters.get_mut(&a).unwrap().portals.push(id_a);
                self.clusters.get_mut(&b).unwrap().portals.push(id_b);
                self.add_inter_edge(id_a, id_b, weight);
            }
        }
    }

    /// Recomputes every intra-cluster edge for `id` from its current portal
    /// set, running bounded local A\* between each pair (§4.D step 4).
    fn rebuild_intra_edges(&mut self, map: &impl GridMap, id: ClusterId) {
        let Some(cluster) = self.clusters.get(&id) else { return };
        let portals = cluster.portals.clone();
        let bounds = Bounds {
            x0: cluster.x0,
            x1: cluster.x1,
            y0: cluster.y0,
            y1: cluster.y1,
        };

        // Drop old intra edges/cache entries between this cluster's portals;
        // inter edges (to other clusters) are untouched.
        for &p in &portals {
            if let Some(list) = self.edges.get_mut(&p) {
                list.retain(|e| e.inter_cluster);
            }
        }
        self.intra_cache.retain(|&(x, _), _| !portals.contains(&x));

        for i in 0..portals.len() {
            for j in (i + 1)..portals.len() {
                let (pa, pb) = (portals[i], portals[j]);
                let Some(na) = self.portal(pa) else { continue };
                let Some(nb) = self.portal(pb) else { continue };
                if let Some(result) = find_path_bounded(map, na.cell, nb.cell, bounds, true) {
                    self.edges.entry(pa).or_default().push(Edge {
                        to: pb,
                        weight: result.cost,
                        inter_cluster: false,
                    });
                    self.edges.entry(pb).or_default().push(Edge {
                        to: pa,
                        weight: result.cost,
                        inter_cluster: false,
                    });
                    self.intra_cache.insert((pa, pb), result.cells.clone());
                    let mut rev = result.cells;
                    rev.reverse();
                    self.intra_cache.insert((pb, pa), rev);
                }
            }
        }
    }
}
