//! Colonist agents: stable ids, state, and the per-tick stepper (§3, §4.G).

mod arena;
mod colonist;
mod stepper;

pub use arena::{Arena, AgentId};
pub use colonist::{AgentState, Colonist, ResourceStack};
pub use stepper::{step_agent, BuildEvent, StepConfig};
