//! Undoable brush command history (§3 "PlanHistory", §4.F operations).

use super::super::grid::{TileChange, World};

/// One committed brush stroke: every tile edit it made, plus the wood balance
/// on either side so undo/redo can restore it exactly. `wood_after` is not
/// named in §3's `Command { wood_before, changes }` literal, but redo needs
/// some wood target to restore to; deriving it from `changes` alone would
/// require re-deriving per-tile cost deltas instead of just replaying the
/// balance the command actually left behind, so it is tracked alongside.
#[derive(Debug, Clone)]
pub struct Command {
    pub wood_before: i32,
    pub wood_after: i32,
    pub changes: Vec<TileChange>,
}

#[derive(Debug, Default)]
pub struct PlanHistory {
    undo_stack: Vec<Command>,
    redo_stack: Vec<Command>,
    active: Option<Command>,
}

impl PlanHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a new brush-stroke frame. Edits recorded before the next
    /// `commit_command`/`cancel_command` accumulate into it (§4.F).
    pub fn begin_command(&mut self, wood_before: i32) {
        self.active = Some(Command {
            wood_before,
            wood_after: wood_before,
            changes: Vec::new(),
        });
    }

    /// Records one successful `place_plan` edit into the active frame. A no-op
    /// if no command is active (defensive; callers should `begin_command`
    /// first).
    pub fn record_change(&mut self, change: TileChange) {
        if let Some(cmd) = &mut self.active {
            cmd.changes.push(change);
        }
    }

    /// Commits the active frame if it recorded at least one change, clearing
    /// the redo stack (§3: "redo is discarded on new command"). Returns
    /// whether anything was committed; the caller is responsible for invoking
    /// `World::cancel_all_jobs_and_clear_reservations` on `true`.
    pub fn commit_command(&mut self, wood_after: i32) -> bool {
        let Some(mut cmd) = self.active.take() else {
            return false;
        };
        if cmd.changes.is_empty() {
            return false;
        }
        cmd.wood_after = wood_after;
        self.undo_stack.push(cmd);
        self.redo_stack.clear();
        true
    }

    /// Discards the active frame without committing (no-op if empty, §4.F).
    pub fn cancel_command(&mut self) {
        self.active = None;
    }

    /// Restores the most recent committed command's pre-state, pushing it onto
    /// the redo stack. Returns `false` if there is nothing to undo.
    pub fn undo(&mut self, world: &mut World) -> bool {
        let Some(cmd) = self.undo_stack.pop() else {
            return false;
        };
        for change in cmd.changes.iter().rev() {
            world.restore_snapshot(change.x, change.y, change.before);
        }
        world.inventory.wood = cmd.wood_before;
        self.redo_stack.push(cmd);
        true
    }

    /// Re-applies the most recently undone command. Returns `false` if there
    /// is nothing to redo.
    pub fn redo(&mut self, world: &mut World) -> bool {
        let Some(cmd) = self.redo_stack.pop() else {
            return false;
        };
        for change in &cmd.changes {
            world.restore_snapshot(change.x, change.y, change.after);
        }
        world.inventory.wood = cmd.wood_after;
        self.undo_stack.push(cmd);
        true
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }
}
