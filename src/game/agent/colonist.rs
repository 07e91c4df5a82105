//! Colonist agent state (§3 "Agent (Colonist)", §4.G).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AgentState {
    Idle,
    Walking,
    Working,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceStack {
    pub kind: String,
    pub amount: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Colonist {
    pub pos: (f32, f32),
    pub target: Option<(i32, i32)>,
    pub path: Vec<(i32, i32)>,
    pub path_index: usize,
    pub carry: Option<ResourceStack>,
    pub state: AgentState,
}

impl Colonist {
    pub fn new(pos: (f32, f32)) -> Self {
        Self {
            pos,
            target: None,
            path: Vec::new(),
            path_index: 0,
            carry: None,
            state: AgentState::Idle,
        }
    }

    /// Clears the path and target, returning to `Idle`. Called when a reservation
    /// is pulled out from under the agent (e.g. by an undo), or when a path
    /// request fails outright (§4.G).
    pub fn release(&mut self) {
        self.target = None;
        self.path.clear();
        self.path_index = 0;
        self.state = AgentState::Idle;
    }

    pub fn next_waypoint(&self) -> Option<(i32, i32)> {
        self.path.get(self.path_index).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_colonist_starts_idle() {
        let c = Colonist::new((1.0, 2.0));
        assert_eq!(c.state, AgentState::Idle);
        assert!(c.target.is_none());
    }

    #[test]
    fn release_clears_path_and_target() {
        let mut c = Colonist::new((0.0, 0.0));
        c.target = Some((3, 3));
        c.path = vec![(1, 1), (2, 2), (3, 3)];
        c.path_index = 1;
        c.state = AgentState::Walking;
        c.release();
        assert_eq!(c.state, AgentState::Idle);
        assert!(c.target.is_none());
        assert!(c.path.is_empty());
        assert_eq!(c.path_index, 0);
    }
}
