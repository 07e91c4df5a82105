//! End-to-end HPA* queries over concrete grids (§4.D, §8 scenarios).

use frontier::game::grid::{Inventory, TileCosts, TileType, World};
use frontier::game::pathfinding::{find_path, Cell as PfCell, HierarchicalGraph};

fn world(width: i32, height: i32) -> World {
    World::new(width, height, 1, Inventory { wood: 0, food: 0.0 }, TileCosts::default())
}

fn graph_for(world: &World) -> HierarchicalGraph {
    let mut graph = HierarchicalGraph::new(16, 5, world.width(), world.height());
    graph.rebuild_all(world);
    graph
}

#[test]
fn open_grid_path_is_short_and_reaches_goal() {
    let world = world(32, 32);
    let graph = graph_for(&world);

    let path = find_path(&graph, &world, PfCell::new(0, 0), PfCell::new(31, 31), true, true).unwrap();

    assert_eq!(path.cells.first(), Some(&PfCell::new(0, 0)));
    assert_eq!(path.cells.last(), Some(&PfCell::new(31, 31)));
    assert!(!path.cells.is_empty());
    // Chebyshev distance is 31 with diagonal movement allowed; a correct
    // path never needs more than one step per unit of remaining distance.
    assert!(path.cells.len() <= 62);
}

#[test]
fn path_routes_through_the_only_gap_in_a_wall() {
    let mut world = world(32, 32);
    for x in 0..32 {
        if x != 16 {
            world.cell_mut(x, 15).unwrap().built = TileType::Wall;
        }
    }
    let graph = graph_for(&world);

    let path = find_path(&graph, &world, PfCell::new(4, 10), PfCell::new(28, 20), true, true).unwrap();

    assert!(path.cells.iter().any(|c| c.x == 16 && c.y == 15), "path must pass through the only gap at (16, 15)");
}

#[test]
fn path_crosses_a_dividing_wall_through_its_one_vertical_corridor() {
    // A wall spans the whole width at y = 48 except for a single gap at
    // x = 48, the only corridor connecting the top and bottom halves.
    let mut world = world(96, 96);
    for x in 0..96 {
        if x != 48 {
            world.cell_mut(x, 48).unwrap().built = TileType::Wall;
        }
    }
    let graph = graph_for(&world);

    let path = find_path(&graph, &world, PfCell::new(4, 4), PfCell::new(90, 90), true, true);

    assert!(path.is_ok(), "the one corridor must still connect both halves");
    let path = path.unwrap();
    assert_eq!(path.cells.first(), Some(&PfCell::new(4, 4)));
    assert_eq!(path.cells.last(), Some(&PfCell::new(90, 90)));
    assert!(path.cells.iter().any(|c| c.x == 48 && c.y == 48), "path must funnel through the only corridor at (48, 48)");
}
