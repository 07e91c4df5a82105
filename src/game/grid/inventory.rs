//! The world's shared resource pool (§3 "World": `Inventory { wood, food, ... }`).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Inventory {
    pub wood: i32,
    pub food: f32,
}
