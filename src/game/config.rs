//! Declarative tunables loaded from a RON asset, with CLI/env seed overrides
//! layered on top (§4.K "Configuration").

use bevy::prelude::*;
use bevy_common_assets::ron::RonAssetPlugin;
use serde::Deserialize;

use crate::game::grid::{Inventory, TileCosts};

#[derive(Deserialize, Asset, TypePath, Clone, Debug)]
pub struct GameConfig {
    pub tick_hz: f32,
    pub cluster_size: i32,
    pub entrance_split_threshold: i32,
    pub allow_diagonal: bool,
    pub enable_smoothing: bool,
    pub max_frame_seconds: f32,
    pub max_steps_per_frame: u32,
    pub tile_costs: TileCosts,
    pub work_rate: f32,
    pub unit_speed: f32,
    pub arrival_threshold: f32,
    pub starting_inventory: Inventory,
    /// Fallback seed read from the config file; overridden by `COLONY_SEED`
    /// and then by `--seed`, in that order (§6).
    pub seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            tick_hz: 30.0,
            cluster_size: 32,
            entrance_split_threshold: 5,
            allow_diagonal: true,
            enable_smoothing: true,
            max_frame_seconds: 0.25,
            max_steps_per_frame: 8,
            tile_costs: TileCosts::default(),
            work_rate: 1.0,
            unit_speed: 3.0,
            arrival_threshold: 0.1,
            starting_inventory: Inventory { wood: 50, food: 0.0 },
            seed: None,
        }
    }
}

/// Resolves the effective world seed following §6's precedence: `--seed` CLI
/// flag, then the `COLONY_SEED` environment variable, then the config file's
/// `seed` field, then a fixed fallback constant (§7 `SeedLoadFailure`: the
/// generator "falls back to a fixed constant seed and logs" rather than
/// failing to start).
pub fn resolve_seed(cli_seed: Option<u64>, config: &GameConfig) -> u64 {
    const FALLBACK_SEED: u64 = 0xC0FF_EE15_5EED_0001;

    if let Some(seed) = cli_seed {
        return seed;
    }
    if let Ok(raw) = std::env::var("COLONY_SEED") {
        if let Ok(seed) = raw.parse() {
            return seed;
        }
        warn!("COLONY_SEED={raw:?} is not a valid u64; ignoring");
    }
    if let Some(seed) = config.seed {
        return seed;
    }
    warn!("no seed supplied via --seed, COLONY_SEED, or config file; using fallback seed");
    FALLBACK_SEED
}

#[derive(Resource)]
pub struct GameConfigHandle(pub Handle<GameConfig>);

pub struct GameConfigPlugin;

impl Plugin for GameConfigPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(RonAssetPlugin::<GameConfig>::new(&["game_config.ron"]))
            .add_systems(Startup, setup_config);
    }
}

fn setup_config(mut commands: Commands, asset_server: Res<AssetServer>) {
    let handle = asset_server.load("game_config.ron");
    commands.insert_resource(GameConfigHandle(handle));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_seed_wins_over_everything() {
        let cfg = GameConfig { seed: Some(5), ..GameConfig::default() };
        assert_eq!(resolve_seed(Some(99), &cfg), 99);
    }

    #[test]
    fn config_file_seed_used_when_no_cli_or_env() {
        std::env::remove_var("COLONY_SEED");
        let cfg = GameConfig { seed: Some(42), ..GameConfig::default() };
        assert_eq!(resolve_seed(None, &cfg), 42);
    }

    #[test]
    fn fallback_seed_when_nothing_supplied() {
        std::env::remove_var("COLONY_SEED");
        let cfg = GameConfig { seed: None, ..GameConfig::default() };
        assert_eq!(resolve_seed(None, &cfg), resolve_seed(None, &cfg));
    }
}
