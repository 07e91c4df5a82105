//! Per-tick colonist state machine (§4.G "Agent Stepper"): `Idle -> Walking ->
//! Working -> Idle`. `step_agent` is a plain function so it can be unit tested
//! without any ECS scaffolding; [`crate::game::context::SimulationContext`]
//! calls it once per live agent, in ascending [`AgentId`] order, per the §5
//! tick ordering guarantee.

use super::arena::AgentId;
use super::colonist::{AgentState, Colonist};
use crate::game::grid::World;
use crate::game::pathfinding::{Cell as PfCell, HierarchicalGraph};
use crate::game::plan::acquire_job;

/// The subset of `GameConfig` the stepper needs, threaded in rather than
/// reaching for a global (§9 "Global mutable state" design note).
#[derive(Debug, Clone, Copy)]
pub struct StepConfig {
    pub work_rate: f32,
    pub unit_speed: f32,
    pub arrival_threshold: f32,
    pub allow_diagonal: bool,
    pub enable_smoothing: bool,
}

/// Signals that a `Working` agent just finished a build whose tile flipped
/// passability, so the caller must invalidate the navigator at that cell
/// (§4.F: "notify the navigator to `rebuild_cluster_at(x,y)` if the built tile
/// changes passability").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildEvent {
    None,
    PassabilityChanged { x: i32, y: i32 },
}

/// Advances one agent by `dt`. `world` and `graph` are taken separately (not
/// bundled into a capability object) so the navigator stays read-only here;
/// any resulting `rebuild_cluster_at` call is the caller's responsibility.
pub fn step_agent(
    world: &mut World,
    graph: &HierarchicalGraph,
    id: AgentId,
    agent: &mut Colonist,
    dt: f32,
    cfg: &StepConfig,
) -> BuildEvent {
    match agent.state {
        AgentState::Idle => {
            step_idle(world, graph, id, agent, cfg);
            BuildEvent::None
        }
        AgentState::Walking => {
            step_walking(agent, dt, cfg);
            BuildEvent::None
        }
        AgentState::Working => step_working(world, id, agent, dt, cfg),
    }
}

fn step_idle(world: &mut World, graph: &HierarchicalGraph, id: AgentId, agent: &mut Colonist, cfg: &StepConfig) {
    let agent_cell = (agent.pos.0.round() as i32, agent.pos.1.round() as i32);
    let Some(path) = acquire_job(world, graph, id, agent_cell, cfg.allow_diagonal, cfg.enable_smoothing) else {
        return;
    };
    let target = *path.cells.last().expect("a path always has at least one cell");
    agent.target = Some((target.x, target.y));
    agent.path = path.cells.iter().map(|c| (c.x, c.y)).collect();
    agent.path_index = 0;
    agent.state = if agent.path.len() <= 1 {
        AgentState::Working
    } else {
        AgentState::Walking
    };
}

fn step_walking(agent: &mut Colonist, dt: f32, cfg: &StepConfig) {
    let mut budget = cfg.unit_speed * dt;
    loop {
        let Some(waypoint) = agent.next_waypoint() else {
            agent.state = AgentState::Working;
            return;
        };
        let target = (waypoint.0 as f32, waypoint.1 as f32);
        let dx = target.0 - agent.pos.0;
        let dy = target.1 - agent.pos.1;
        let dist = (dx * dx + dy * dy).sqrt();

        if dist <= cfg.arrival_threshold {
            agent.pos = target;
            agent.path_index += 1;
            if agent.path_index >= agent.path.len() {
                agent.state = AgentState::Working;
                return;
            }
            continue;
        }

        if budget <= 0.0 {
            return;
        }
        let step = budget.min(dist);
        agent.pos.0 += dx / dist * step;
        agent.pos.1 += dy / dist * step;
        budget -= step;
        if step < dist {
            return;
        }
    }
}

fn step_working(world: &mut World, id: AgentId, agent: &mut Colonist, dt: f32, cfg: &StepConfig) -> BuildEvent {
    let Some((x, y)) = agent.target else {
        agent.release();
        return BuildEvent::None;
    };
    let Some(cell) = world.cell_mut(x, y) else {
        agent.release();
        return BuildEvent::None;
    };
    // The reservation can be pulled out from under the agent by an undo
    // between ticks; treat that exactly like a failed path request (§4.G).
    if cell.reserved_by != Some(id) {
        agent.release();
        return BuildEvent::None;
    }

    cell.work_remaining -= cfg.work_rate * dt;
    if cell.work_remaining > 0.0 {
        return BuildEvent::None;
    }

    let was_passable = cell.is_passable();
    cell.built = cell.planned;
    cell.reserved_by = None;
    let now_passable = cell.is_passable();
    agent.release();

    if was_passable != now_passable {
        BuildEvent::PassabilityChanged { x, y }
    } else {
        BuildEvent::None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::agent::Arena;
    use crate::game::grid::{Inventory, TileCosts, TileType};

    fn cfg() -> StepConfig {
        StepConfig {
            work_rate: 1.0,
            unit_speed: 10.0,
            arrival_threshold: 0.05,
            allow_diagonal: true,
            enable_smoothing: false,
        }
    }

    fn graph_for(world: &World) -> HierarchicalGraph {
        let mut g = HierarchicalGraph::new(32, 5, world.width(), world.height());
        g.rebuild_all(world);
        g
    }

    #[test]
    fn idle_agent_acquires_a_job_and_starts_walking() {
        let mut world = World::new(8, 8, 1, Inventory { wood: 100, food: 0.0 }, TileCosts::default());
        world.place_plan(5, 0, TileType::Floor, 0).unwrap();
        let graph = graph_for(&world);
        let mut arena: Arena<Colonist> = Arena::new();
        let id = arena.insert(Colonist::new((0.0, 0.0)));
        let agent = arena.get_mut(id).unwrap();

        let ev = step_agent(&mut world, &graph, id, agent, 1.0 / 30.0, &cfg());
        assert_eq!(ev, BuildEvent::None);
        assert_eq!(agent.target, Some((5, 0)));
        assert!(matches!(agent.state, AgentState::Walking));
        assert_eq!(world.cell(5, 0).unwrap().reserved_by, Some(id));
    }

    #[test]
    fn walking_agent_advances_toward_target() {
        let mut world = World::new(8, 8, 1, Inventory { wood: 100, food: 0.0 }, TileCosts::default());
        let mut agent = Colonist::new((0.0, 0.0));
        agent.target = Some((3, 0));
        agent.path = vec![(0, 0), (1, 0), (2, 0), (3, 0)];
        agent.path_index = 0;
        agent.state = AgentState::Walking;
        let graph = graph_for(&world);
        let id_arena_placeholder = {
            let mut a: Arena<Colonist> = Arena::new();
            a.insert(Colonist::new((0.0, 0.0)))
        };

        step_walking(&mut agent, 0.1, &cfg());
        assert!(agent.pos.0 > 0.0);
        let _ = (&mut world, &graph, id_arena_placeholder);
    }

    #[test]
    fn working_agent_completes_build_and_reports_passability_change() {
        let mut world = World::new(4, 4, 1, Inventory { wood: 100, food: 0.0 }, TileCosts::default());
        world.place_plan(1, 1, TileType::Wall, 0).unwrap();
        let mut arena: Arena<Colonist> = Arena::new();
        let id = arena.insert(Colonist::new((1.0, 1.0)));
        let agent = arena.get_mut(id).unwrap();
        agent.target = Some((1, 1));
        agent.state = AgentState::Working;
        world.cell_mut(1, 1).unwrap().reserved_by = Some(id);
        world.cell_mut(1, 1).unwrap().work_remaining = 0.01;

        let ev = step_agent(&mut world, &HierarchicalGraph::new(32, 5, 4, 4), id, agent, 1.0, &cfg());
        assert_eq!(ev, BuildEvent::PassabilityChanged { x: 1, y: 1 });
        assert_eq!(world.cell(1, 1).unwrap().built, TileType::Wall);
        assert!(matches!(agent.state, AgentState::Idle));
    }

    #[test]
    fn working_agent_whose_reservation_was_pulled_releases() {
        let mut world = World::new(4, 4, 1, Inventory { wood: 100, food: 0.0 }, TileCosts::default());
        world.place_plan(1, 1, TileType::Wall, 0).unwrap();
        let mut arena: Arena<Colonist> = Arena::new();
        let id = arena.insert(Colonist::new((1.0, 1.0)));
        let agent = arena.get_mut(id).unwrap();
        agent.target = Some((1, 1));
        agent.state = AgentState::Working;
        // Reservation was never actually granted to `id` (simulating an undo).

        let ev = step_agent(&mut world, &HierarchicalGraph::new(32, 5, 4, 4), id, agent, 1.0, &cfg());
        assert_eq!(ev, BuildEvent::None);
        assert!(matches!(agent.state, AgentState::Idle));
        assert!(agent.target.is_none());
    }
}
