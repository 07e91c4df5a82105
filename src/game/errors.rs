//! One `thiserror` enum per subsystem boundary, plus the crate-wide union used at
//! the app-wiring layer (§4.J/§7). No subsystem panics on a recoverable fault; a
//! broken internal invariant is a `debug_assert!`/`unreachable!`, not one of these.

use thiserror::Error;

use crate::game::grid::TileType;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PlanError {
    #[error("cell ({x}, {y}) is out of bounds")]
    OutOfBounds { x: i32, y: i32 },
    #[error("cell ({x}, {y}) is already built as {tile:?}")]
    AlreadyBuilt { x: i32, y: i32, tile: TileType },
    #[error("not enough wood: need {needed}, have {have}")]
    NotEnoughWood { needed: i32, have: i32 },
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum NavError {
    #[error("start or goal cell is blocked or out of bounds")]
    BlockedStartOrGoal,
    #[error("no path exists between start and goal")]
    UnreachableGoal,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SaveError {
    #[error("save file is corrupt or from an incompatible version")]
    Corrupt,
    #[error("I/O error: {0}")]
    Io(String),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum GameError {
    #[error(transparent)]
    Plan(#[from] PlanError),
    #[error(transparent)]
    Nav(#[from] NavError),
    #[error(transparent)]
    Save(#[from] SaveError),
}
