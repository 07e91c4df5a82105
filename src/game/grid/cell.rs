//! A single world cell and its plan/reservation overlay (§3 "Cell").

use serde::{Deserialize, Serialize};

use crate::game::agent::AgentId;
use super::tile::TileType;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cell {
    pub built: TileType,
    pub planned: TileType,
    pub plan_priority: u8,
    pub work_remaining: f32,
    pub reserved_by: Option<AgentId>,
}

impl Default for Cell {
    fn default() -> Self {
        Self {
            built: TileType::Empty,
            planned: TileType::Empty,
            plan_priority: 0,
            work_remaining: 0.0,
            reserved_by: None,
        }
    }
}

impl Cell {
    /// A cell whose `planned == built` carries no active plan, regardless of
    /// leftover bookkeeping (§3 invariant).
    pub fn has_active_plan(&self) -> bool {
        self.planned != self.built
    }

    pub fn is_passable(&self) -> bool {
        !self.built.blocks_passage()
    }

    /// Entry cost for pathfinding: flat 1.0 today. Kept as a method (not a
    /// constant) since per-tile movement costs are an intended extension point.
    pub fn entry_cost(&self) -> f32 {
        1.0
    }
}

/// A point-in-time copy of a cell's plan-relevant fields, used by undo/redo
/// (§3 "PlanHistory").
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TileSnapshot {
    pub built: TileType,
    pub planned: TileType,
    pub plan_priority: u8,
    pub work_remaining_bits: u32,
}

impl TileSnapshot {
    pub fn capture(cell: &Cell) -> Self {
        Self {
            built: cell.built,
            planned: cell.planned,
            plan_priority: cell.plan_priority,
            work_remaining_bits: cell.work_remaining.to_bits(),
        }
    }

    pub fn work_remaining(self) -> f32 {
        f32::from_bits(self.work_remaining_bits)
    }

    pub fn restore(self, cell: &mut Cell) {
        cell.built = self.built;
        cell.planned = self.planned;
        cell.plan_priority = self.plan_priority;
        cell.work_remaining = self.work_remaining();
        cell.reserved_by = None;
    }
}
