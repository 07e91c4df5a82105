//! The world grid: cells, inventory, and the plan-placement operations of §4.C.

use serde::{Deserialize, Serialize};

use crate::game::errors::PlanError;
use super::cell::{Cell, TileSnapshot};
use super::inventory::Inventory;
use super::tile::{TileCosts, TileType};

/// One successful edit, recorded for undo/redo (§3 "PlanHistory" `TileChange`).
#[derive(Debug, Clone)]
pub struct TileChange {
    pub x: i32,
    pub y: i32,
    pub before: TileSnapshot,
    pub after: TileSnapshot,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct World {
    width: i32,
    height: i32,
    cells: Vec<Cell>,
    pub inventory: Inventory,
    pub costs: TileCosts,
    pub seed: u64,
}

impl World {
    pub fn new(width: i32, height: i32, seed: u64, inventory: Inventory, costs: TileCosts) -> Self {
        assert!(width > 0 && height > 0, "world dimensions must be positive");
        Self {
            width,
            height,
            cells: vec![Cell::default(); (width * height) as usize],
            inventory,
            costs,
            seed,
        }
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && x < self.width && y < self.height
    }

    fn index(&self, x: i32, y: i32) -> usize {
        (y * self.width + x) as usize
    }

    pub fn cell(&self, x: i32, y: i32) -> Option<&Cell> {
        self.in_bounds(x, y).then(|| &self.cells[self.index(x, y)])
    }

    pub fn cell_mut(&mut self, x: i32, y: i32) -> Option<&mut Cell> {
        if !self.in_bounds(x, y) {
            return None;
        }
        let i = self.index(x, y);
        Some(&mut self.cells[i])
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Places or clears a plan at `(x, y)` (§4.C). On success returns the
    /// `TileChange` the caller should hand to the active `Command` via
    /// `record_change`; the wood delta has already been applied to `inventory`.
    ///
    /// Clearing a plan (`plan == Empty`) that has not yet consumed any work
    /// (`work_remaining` still equals its full build time) refunds the existing
    /// plan's wood cost in full; clearing one that is already partway built does
    /// not — the wood spent on progress already made is sunk.
    pub fn place_plan(&mut self, x: i32, y: i32, plan: TileType, priority: u8) -> Result<TileChange, PlanError> {
        if !self.in_bounds(x, y) {
            return Err(PlanError::OutOfBounds { x, y });
        }
        let i = self.index(x, y);
        let cell = &self.cells[i];
        if cell.built == plan {
            return Err(PlanError::AlreadyBuilt { x, y, tile: plan });
        }

        let new_cost = self.costs.wood_cost(plan);
        let has_active_plan = cell.planned != cell.built;
        let no_work_consumed = cell.work_remaining >= self.costs.build_time(cell.planned);
        let existing_cost = if !has_active_plan {
            // `planned == built` means the cell is unplanned (§3): nothing to
            // refund or carry over.
            0
        } else if plan == TileType::Empty && !no_work_consumed {
            0
        } else {
            self.costs.wood_cost(cell.planned)
        };
        let delta = new_cost - existing_cost;

        if delta > 0 && self.inventory.wood < delta {
            return Err(PlanError::NotEnoughWood {
                needed: delta,
                have: self.inventory.wood,
            });
        }

        let before = TileSnapshot::capture(cell);

        let cell = &mut self.cells[i];
        cell.planned = plan;
        cell.plan_priority = priority;
        cell.work_remaining = self.costs.build_time(plan);
        cell.reserved_by = None;
        self.inventory.wood -= delta;

        let after = TileSnapshot::capture(&self.cells[i]);
        Ok(TileChange { x, y, before, after })
    }

    /// Invoked on any committed plan-history change (§4.F): clears every
    /// reservation without touching `work_remaining`. Agents re-acquire next tick.
    pub fn cancel_all_jobs_and_clear_reservations(&mut self) {
        for cell in &mut self.cells {
            cell.reserved_by = None;
        }
    }

    pub fn restore_snapshot(&mut self, x: i32, y: i32, snapshot: TileSnapshot) {
        if let Some(cell) = self.cell_mut(x, y) {
            snapshot.restore(cell);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_world() -> World {
        World::new(4, 4, 1, Inventory { wood: 10, food: 0.0 }, TileCosts::default())
    }

    #[test]
    fn place_plan_out_of_bounds() {
        let mut w = small_world();
        let err = w.place_plan(10, 10, TileType::Floor, 0).unwrap_err();
        assert_eq!(err, PlanError::OutOfBounds { x: 10, y: 10 });
    }

    #[test]
    fn place_plan_already_built() {
        let mut w = small_world();
        w.cell_mut(1, 1).unwrap().built = TileType::Floor;
        let err = w.place_plan(1, 1, TileType::Floor, 0).unwrap_err();
        assert_eq!(
            err,
            PlanError::AlreadyBuilt { x: 1, y: 1, tile: TileType::Floor }
        );
    }

    #[test]
    fn place_plan_not_enough_wood() {
        let mut w = small_world();
        w.inventory.wood = 1;
        let err = w.place_plan(0, 0, TileType::Wall, 0).unwrap_err();
        assert_eq!(err, PlanError::NotEnoughWood { needed: 5, have: 1 });
    }

    #[test]
    fn place_plan_debits_wood_and_sets_fields() {
        let mut w = small_world();
        w.place_plan(2, 2, TileType::Floor, 1).unwrap();
        let cell = w.cell(2, 2).unwrap();
        assert_eq!(cell.planned, TileType::Floor);
        assert_eq!(cell.plan_priority, 1);
        assert_eq!(cell.work_remaining, w.costs.floor.build_time_seconds);
        assert_eq!(w.inventory.wood, 10 - w.costs.floor.wood_cost);
    }

    #[test]
    fn clearing_plan_refunds_wood() {
        let mut w = small_world();
        w.place_plan(0, 0, TileType::Floor, 0).unwrap();
        let after_place = w.inventory.wood;
        w.place_plan(0, 0, TileType::Empty, 0).unwrap();
        assert_eq!(w.inventory.wood, after_place + w.costs.floor.wood_cost);
    }

    #[test]
    fn planning_over_a_finished_build_charges_full_cost_with_no_leftover_credit() {
        let mut w = small_world();
        w.place_plan(0, 0, TileType::Floor, 0).unwrap();
        w.cell_mut(0, 0).unwrap().built = TileType::Floor;
        w.cell_mut(0, 0).unwrap().work_remaining = 0.0;
        let wood_before = w.inventory.wood;

        w.place_plan(0, 0, TileType::Wall, 0).unwrap();
        assert_eq!(w.inventory.wood, wood_before - w.costs.wall.wood_cost);
    }

    #[test]
    fn cancel_all_jobs_clears_reservations_only() {
        let mut w = small_world();
        w.place_plan(0, 0, TileType::Floor, 0).unwrap();
        w.cell_mut(0, 0).unwrap().reserved_by = None;
        let work_before = w.cell(0, 0).unwrap().work_remaining;
        w.cancel_all_jobs_and_clear_reservations();
        assert!(w.cell(0, 0).unwrap().reserved_by.is_none());
        assert_eq!(w.cell(0, 0).unwrap().work_remaining, work_before);
    }
}
