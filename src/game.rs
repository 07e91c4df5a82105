//! Core crate modules: RNG, world generation, grid/tile model, HPA\*
//! navigation, the plan/job system, agents, persistence, and the thin bevy
//! wiring layer that drives it all from a fixed tick.

pub mod agent;
pub mod config;
pub mod context;
pub mod errors;
pub mod fixed_math;
pub mod fixed_step;
pub mod grid;
pub mod pathfinding;
pub mod plan;
pub mod rng;
pub mod save;
pub mod worldgen;

pub use config::{GameConfig, GameConfigPlugin};
pub use context::{CorePlugin, SimulationContext, WorldSnapshot};
