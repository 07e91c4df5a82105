//! Job dispatch: matching an idle agent to the best reachable planned cell
//! (§4.F "Job dispatch").

use crate::game::agent::AgentId;
use crate::game::fixed_math::octile;
use crate::game::grid::World;
use crate::game::pathfinding::{find_path, Cell as PfCell, HierarchicalGraph, Path};

/// Scans every planned-but-unreserved cell, ranks candidates by §4.F's
/// selection order — higher `plan_priority` first, then nearer by octile
/// lower bound, then `(x, y)` lexicographic order for determinism — and
/// reserves the first one actually reachable from `agent_cell`.
///
/// On success the winning cell's `reserved_by` is set to `agent_id` and the
/// path to it is returned. Candidates that turn out unreachable are skipped
/// (not reserved) rather than failing the whole call, so one unreachable plan
/// never starves every other one.
pub fn acquire_job(
    world: &mut World,
    graph: &HierarchicalGraph,
    agent_id: AgentId,
    agent_cell: (i32, i32),
    allow_diagonal: bool,
    enable_smoothing: bool,
) -> Option<Path> {
    let mut candidates: Vec<(u8, f32, i32, i32)> = Vec::new();
    for y in 0..world.height() {
        for x in 0..world.width() {
            let cell = world.cell(x, y).expect("in-bounds cell");
            if cell.has_active_plan() && cell.reserved_by.is_none() {
                let dist = octile(x - agent_cell.0, y - agent_cell.1);
                candidates.push((cell.plan_priority, dist, x, y));
            }
        }
    }

    candidates.sort_by(|a, b| {
        b.0.cmp(&a.0)
            .then_with(|| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
            .then_with(|| a.2.cmp(&b.2))
            .then_with(|| a.3.cmp(&b.3))
    });

    for (_, _, x, y) in candidates {
        let start = PfCell::new(agent_cell.0, agent_cell.1);
        let goal = PfCell::new(x, y);
        if let Ok(path) = find_path(graph, world, start, goal, allow_diagonal, enable_smoothing) {
            world.cell_mut(x, y).expect("in-bounds cell").reserved_by = Some(agent_id);
            return Some(path);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::agent::Arena;
    use crate::game::agent::Colonist;
    use crate::game::grid::{Inventory, TileCosts, TileType};

    fn world_with_two_plans() -> World {
        let mut world = World::new(8, 8, 1, Inventory { wood: 100, food: 0.0 }, TileCosts::default());
        world.place_plan(1, 1, TileType::Wall, 2).unwrap();
        world.place_plan(6, 6, TileType::Floor, 0).unwrap();
        world
    }

    fn graph_for(world: &World) -> HierarchicalGraph {
        let mut graph = HierarchicalGraph::new(32, 5, world.width(), world.height());
        graph.rebuild_all(world);
        graph
    }

    #[test]
    fn higher_priority_plan_wins_even_if_farther() {
        let mut world = world_with_two_plans();
        let graph = graph_for(&world);
        let mut arena: Arena<Colonist> = Arena::new();
        let id = arena.insert(Colonist::new((4.0, 4.0)));

        let path = acquire_job(&mut world, &graph, id, (4, 4), true, false).unwrap();
        assert_eq!(path.cells.last(), Some(&PfCell::new(1, 1)));
        assert_eq!(world.cell(1, 1).unwrap().reserved_by, Some(id));
        assert!(world.cell(6, 6).unwrap().reserved_by.is_none());
    }

    #[test]
    fn second_agent_cannot_double_reserve() {
        let mut world = World::new(4, 4, 1, Inventory { wood: 100, food: 0.0 }, TileCosts::default());
        world.place_plan(2, 2, TileType::Wall, 1).unwrap();
        let graph = graph_for(&world);
        let mut arena: Arena<Colonist> = Arena::new();
        let a = arena.insert(Colonist::new((0.0, 0.0)));
        let b = arena.insert(Colonist::new((3.0, 3.0)));

        let first = acquire_job(&mut world, &graph, a, (0, 0), true, false);
        assert!(first.is_some());
        let second = acquire_job(&mut world, &graph, b, (3, 3), true, false);
        assert!(second.is_none());
    }

    #[test]
    fn no_plans_yields_no_job() {
        let mut world = World::new(4, 4, 1, Inventory { wood: 10, food: 0.0 }, TileCosts::default());
        let graph = graph_for(&world);
        let mut arena: Arena<Colonist> = Arena::new();
        let id = arena.insert(Colonist::new((0.0, 0.0)));
        assert!(acquire_job(&mut world, &graph, id, (0, 0), true, false).is_none());
    }

    #[test]
    fn unreachable_plan_is_skipped_for_a_reachable_one() {
        let mut world = World::new(10, 10, 1, Inventory { wood: 100, food: 0.0 }, TileCosts::default());
        // Seal (9,9) behind a wall so it is unreachable, but leave (2,2) open.
        for y in 0..10 {
            world.cell_mut(8, y).unwrap().built = TileType::Wall;
        }
        world.place_plan(9, 9, TileType::Floor, 3).unwrap();
        world.place_plan(2, 2, TileType::Floor, 0).unwrap();
        let graph = graph_for(&world);
        let mut arena: Arena<Colonist> = Arena::new();
        let id = arena.insert(Colonist::new((0.0, 0.0)));

        let path = acquire_job(&mut world, &graph, id, (0, 0), true, false).unwrap();
        assert_eq!(path.cells.last(), Some(&PfCell::new(2, 2)));
        assert!(world.cell(9, 9).unwrap().reserved_by.is_none());
    }
}
