use std::path::PathBuf;
use std::time::Duration;

use bevy::app::ScheduleRunnerPlugin;
use bevy::prelude::*;
use clap::Parser;
use tracing_subscriber::layer::SubscriberExt;

use frontier::game::config::{resolve_seed, GameConfig};
use frontier::game::context::CorePlugin;
use frontier::game::grid::World;
use frontier::game::worldgen::{generate_terrain, ChunkCoord, TerrainParams};

/// Launcher-level CLI surface (§6); the core itself only ever sees the
/// resolved `seed`.
#[derive(Parser, Debug)]
#[command(name = "frontier", about = "Colony simulation core")]
struct Cli {
    /// Window resolution, e.g. "1280x720". Not consumed by the core.
    #[arg(long = "res")]
    resolution: Option<String>,
    #[arg(long)]
    fullscreen: bool,
    #[arg(long, default_value_t = true)]
    vsync: bool,
    /// World seed, or "random" to draw one from OS entropy.
    #[arg(long)]
    seed: Option<String>,
    #[arg(long = "safe-mode")]
    safe_mode: bool,
    #[arg(long = "skip-intro")]
    skip_intro: bool,
    #[arg(long)]
    lang: Option<String>,
    #[arg(long)]
    profile: Option<String>,
    #[arg(long, default_value = "assets/game_config.ron")]
    config: PathBuf,
    /// Load the config, generate one terrain chunk, and exit without starting
    /// the tick loop. Exit code reflects success/failure.
    #[arg(long)]
    validate: bool,
}

fn init_logging() {
    use tracing_subscriber::util::SubscriberInitExt;
    use tracing_subscriber::{fmt, EnvFilter};

    let file_appender = tracing_appender::rolling::daily("logs", "frontier.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
    // Leaked deliberately: the guard must outlive every log call for the
    // lifetime of the process, and main never returns early past this point.
    Box::leak(Box::new(guard));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(non_blocking).with_ansi(false))
        .with(fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
}

fn load_config(path: &PathBuf) -> GameConfig {
    match std::fs::read_to_string(path) {
        Ok(text) => ron::de::from_str(&text).unwrap_or_else(|e| {
            warn!("failed to parse {path:?} ({e}); using default config");
            GameConfig::default()
        }),
        Err(e) => {
            warn!("could not read {path:?} ({e}); using default config");
            GameConfig::default()
        }
    }
}

fn parse_seed(raw: &str) -> Option<u64> {
    if raw.eq_ignore_ascii_case("random") {
        use std::time::{SystemTime, UNIX_EPOCH};
        let nanos = SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_nanos() as u64;
        Some(frontier::game::rng::hash_ns(nanos, 0, 0, "cli-random-seed"))
    } else {
        raw.parse().ok()
    }
}

fn main() {
    init_logging();
    let cli = Cli::parse();
    let config = load_config(&cli.config);
    let seed = resolve_seed(cli.seed.as_deref().and_then(parse_seed), &config);

    info!(seed, ?cli.config, "starting frontier core");

    let terrain_params = TerrainParams::default();
    let chunk = generate_terrain(seed, ChunkCoord { cx: 0, cy: 0 }, 1.0, &terrain_params);
    info!(size = chunk.size, "generated world chunk 0,0");

    if cli.validate {
        println!("config and world generation OK (seed={seed})");
        std::process::exit(0);
    }

    let width = 128;
    let height = 128;
    let world = World::new(width, height, seed, config.starting_inventory, config.tile_costs.clone());

    App::new()
        .add_plugins(MinimalPlugins.set(ScheduleRunnerPlugin::run_loop(Duration::from_secs_f32(1.0 / config.tick_hz))))
        .add_plugins(CorePlugin { world, config })
        .run();
}
