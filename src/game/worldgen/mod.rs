//! Procedural world generation (§4.B): heightfield, climate, hydrology, biomes and
//! splat masks, all driven by [`crate::game::rng`].

mod biome;
mod rivers;
mod terrain;

pub use biome::{classify_biome, Biome, BiomeThresholds};
pub use rivers::{carve_rivers, compute_flow_accumulation};
pub use terrain::{generate_terrain, ChunkCoord, Splat, TerrainChunk, TerrainParams};
