//! App wiring (§4.N): `SimulationContext` is the explicit, non-global value
//! threaded through every tick (§3.1), and `CorePlugin` is the thin bevy layer
//! that drives it from a `Time<Fixed>` schedule. Brush input is exposed as a
//! plain function table rather than wired to any concrete input backend.

use bevy::prelude::*;

use crate::game::agent::{step_agent, AgentId, Arena, BuildEvent, Colonist, StepConfig};
use crate::game::config::GameConfig;
use crate::game::errors::{GameError, NavError};
use crate::game::grid::{Inventory, TileType, World};
use crate::game::pathfinding::{find_path, Cell as PfCell, HierarchicalGraph, Path};
use crate::game::plan::{acquire_job, PlanHistory};

/// Owns the `World`, the navigator's abstract graph, the undo/redo history,
/// and the agent arena for one running simulation (§3.1). Replaces any notion
/// of process-global mutable state; the bevy layer stores one of these per
/// world as a `Resource`.
#[derive(Resource)]
pub struct SimulationContext {
    pub world: World,
    pub graph: HierarchicalGraph,
    pub history: PlanHistory,
    pub agents: Arena<Colonist>,
    pub seed: u64,
    step_config: StepConfig,
}

impl SimulationContext {
    pub fn new(world: World, config: &GameConfig) -> Self {
        let mut graph = HierarchicalGraph::new(config.cluster_size, config.entrance_split_threshold, world.width(), world.height());
        graph.rebuild_all(&world);
        let seed = world.seed;
        Self {
            world,
            graph,
            history: PlanHistory::new(),
            agents: Arena::new(),
            seed,
            step_config: StepConfig {
                work_rate: config.work_rate,
                unit_speed: config.unit_speed,
                arrival_threshold: config.arrival_threshold,
                allow_diagonal: config.allow_diagonal,
                enable_smoothing: config.enable_smoothing,
            },
        }
    }

    pub fn spawn_agent(&mut self, pos: (f32, f32)) -> AgentId {
        self.agents.insert(Colonist::new(pos))
    }

    /// Advances every live agent by one tick, in ascending `AgentId` order
    /// (§5 ordering guarantee), then applies any navigator invalidation a
    /// completed build triggered (§4.F/§4.G).
    pub fn tick(&mut self, dt: f32) {
        let ids: Vec<AgentId> = self.agents.iter().map(|(id, _)| id).collect();
        let mut rebuilds: Vec<(i32, i32)> = Vec::new();

        for id in ids {
            let Self { world, graph, agents, step_config, .. } = self;
            let Some(agent) = agents.get_mut(id) else { continue };
            match step_agent(world, graph, id, agent, dt, step_config) {
                BuildEvent::None => {}
                BuildEvent::PassabilityChanged { x, y } => rebuilds.push((x, y)),
            }
        }

        for (x, y) in rebuilds {
            self.graph.rebuild_cluster_at(&self.world, x, y);
        }
    }

    /// Direct job dispatch entry point, exposed separately from `tick` for
    /// tests and tools that want to drive job acquisition without a full
    /// agent stepper pass.
    pub fn acquire_job_for(&mut self, agent_id: AgentId, agent_cell: (i32, i32)) -> Option<Path> {
        acquire_job(
            &mut self.world,
            &self.graph,
            agent_id,
            agent_cell,
            self.step_config.allow_diagonal,
            self.step_config.enable_smoothing,
        )
    }

    /// `NavQuery(start, goal) -> Option<Path>` (§6 "Outputs exposed to
    /// collaborators").
    pub fn nav_query(&self, start: (i32, i32), goal: (i32, i32)) -> Result<Path, NavError> {
        find_path(
            &self.graph,
            &self.world,
            PfCell::new(start.0, start.1),
            PfCell::new(goal.0, goal.1),
            self.step_config.allow_diagonal,
            self.step_config.enable_smoothing,
        )
    }

    /// An immutable copy of everything rendering needs (§6 `WorldSnapshot`).
    pub fn snapshot(&self) -> WorldSnapshot {
        let cells = self
            .world
            .cells()
            .iter()
            .map(|c| CellSnapshot {
                built: c.built,
                planned: c.planned,
                plan_priority: c.plan_priority,
                work_remaining: c.work_remaining,
                reserved_by: c.reserved_by,
            })
            .collect();
        let agents = self
            .agents
            .iter()
            .map(|(id, a)| AgentSnapshot {
                id,
                pos: a.pos,
                state: a.state,
                path: a.path.clone(),
            })
            .collect();
        WorldSnapshot {
            width: self.world.width(),
            height: self.world.height(),
            cells,
            agents,
            inventory: self.world.inventory,
        }
    }

    // --- Brush command function table (§4.N input -> plan-brush actions) ---

    pub fn begin_stroke(&mut self) {
        self.history.begin_command(self.world.inventory.wood);
    }

    pub fn place(&mut self, x: i32, y: i32, plan: TileType, priority: u8) -> Result<(), GameError> {
        let change = self.world.place_plan(x, y, plan, priority)?;
        self.history.record_change(change);
        Ok(())
    }

    pub fn erase(&mut self, x: i32, y: i32) -> Result<(), GameError> {
        self.place(x, y, TileType::Empty, 0)
    }

    pub fn end_stroke(&mut self) {
        if self.history.commit_command(self.world.inventory.wood) {
            self.world.cancel_all_jobs_and_clear_reservations();
        }
    }

    pub fn undo(&mut self) -> bool {
        let applied = self.history.undo(&mut self.world);
        if applied {
            self.world.cancel_all_jobs_and_clear_reservations();
        }
        applied
    }

    pub fn redo(&mut self) -> bool {
        let applied = self.history.redo(&mut self.world);
        if applied {
            self.world.cancel_all_jobs_and_clear_reservations();
        }
        applied
    }
}

#[derive(Debug, Clone)]
pub struct CellSnapshot {
    pub built: TileType,
    pub planned: TileType,
    pub plan_priority: u8,
    pub work_remaining: f32,
    pub reserved_by: Option<AgentId>,
}

#[derive(Debug, Clone)]
pub struct AgentSnapshot {
    pub id: AgentId,
    pub pos: (f32, f32),
    pub state: crate::game::agent::AgentState,
    pub path: Vec<(i32, i32)>,
}

#[derive(Debug, Clone)]
pub struct WorldSnapshot {
    pub width: i32,
    pub height: i32,
    pub cells: Vec<CellSnapshot>,
    pub agents: Vec<AgentSnapshot>,
    pub inventory: Inventory,
}

/// Wraps `SimulationContext` as a bevy `Resource` driven from a fixed
/// `Time<Fixed>` schedule (§4.N). Rendering, camera, input-device binding, and
/// the ImGui editor live outside this plugin's scope (§1 Non-goals); this is
/// the headless tick driver other collaborators build on.
pub struct CorePlugin {
    pub world: World,
    pub config: GameConfig,
}

impl Plugin for CorePlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(Time::<Fixed>::from_seconds(1.0 / self.config.tick_hz as f64));
        app.insert_resource(SimulationContext::new(self.world.clone(), &self.config));
        app.add_systems(FixedUpdate, tick_simulation);
    }
}

fn tick_simulation(mut ctx: ResMut<SimulationContext>, time: Res<Time<Fixed>>) {
    let dt = time.delta_secs();
    ctx.tick(dt);
}
