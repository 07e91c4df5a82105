//! HPA\* hierarchical pathfinding: cluster/portal graph build + incremental
//! rebuild, local A\*/JPS refinement searches, and the top-level query (§4.D).

mod astar;
mod cluster;
mod graph;
mod grid_map;
mod jps;
mod navigator;
mod types;

pub use astar::{find_path_bounded, Bounds, PathResult};
pub use cluster::{cluster_bounds, cluster_id_for, partition, portal_placements, scan_horizontal_border, scan_vertical_border, Entrance};
pub use graph::HierarchicalGraph;
pub use grid_map::{BoolGrid, GridMap};
pub use jps::{find_path_jps, JpsResult};
pub use navigator::{find_path, Path};
pub use types::{Cell, Cluster, ClusterId, Edge, NodeId, PortalNode, DEFAULT_CLUSTER_SIZE, DEFAULT_ENTRANCE_SPLIT_THRESHOLD};
