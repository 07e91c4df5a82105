//! Tile types and their build costs (§4.C).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TileType {
    #[default]
    Empty,
    Floor,
    Wall,
    Farm,
    Stockpile,
}

impl TileType {
    /// Tiles that block passability once built. Only `Wall` does today; kept as a
    /// match rather than a bitflag so adding an impassable tile later is one arm.
    pub fn blocks_passage(self) -> bool {
        matches!(self, TileType::Wall)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TileCost {
    pub build_time_seconds: f32,
    pub wood_cost: i32,
}

/// Per-`TileType` `(build_time_seconds, wood_cost)` table, populated from
/// `GameConfig` (§4.K). `Empty` always costs nothing and builds instantly, since
/// clearing a plan is a refund, not a job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TileCosts {
    pub floor: TileCost,
    pub wall: TileCost,
    pub farm: TileCost,
    pub stockpile: TileCost,
}

impl Default for TileCosts {
    fn default() -> Self {
        Self {
            floor: TileCost {
                build_time_seconds: 2.0,
                wood_cost: 2,
            },
            wall: TileCost {
                build_time_seconds: 4.0,
                wood_cost: 5,
            },
            farm: TileCost {
                build_time_seconds: 6.0,
                wood_cost: 3,
            },
            stockpile: TileCost {
                build_time_seconds: 3.0,
                wood_cost: 4,
            },
        }
    }
}

impl TileCosts {
    pub fn build_time(&self, t: TileType) -> f32 {
        match t {
            TileType::Empty => 0.0,
            TileType::Floor => self.floor.build_time_seconds,
            TileType::Wall => self.wall.build_time_seconds,
            TileType::Farm => self.farm.build_time_seconds,
            TileType::Stockpile => self.stockpile.build_time_seconds,
        }
    }

    pub fn wood_cost(&self, t: TileType) -> i32 {
        match t {
            TileType::Empty => 0,
            TileType::Floor => self.floor.wood_cost,
            TileType::Wall => self.wall.wood_cost,
            TileType::Farm => self.farm.wood_cost,
            TileType::Stockpile => self.stockpile.wood_cost,
        }
    }
}
