//! Per-chunk terrain generation: heightfield, climate, and splat masks (§4.B).

use serde::{Deserialize, Serialize};

use super::biome::{classify_biome, Biome, BiomeThresholds};
use super::rivers::{carve_rivers, compute_flow_accumulation};
use crate::game::rng::{make_rng, Perlin};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChunkCoord {
    pub cx: i32,
    pub cy: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TerrainParams {
    pub size: usize,
    pub scale: f32,
    pub octaves: u32,
    pub lacunarity: f32,
    pub gain: f32,

    pub base_height: f32,
    pub elevation_amp: f32,
    pub continent_freq: f32,
    pub ridge_weight: f32,

    pub temp_lapse_rate: f32,
    pub moisture_bias: f32,

    pub flow_threshold: f32,
    pub snowline: f32,
    pub biome_thresholds: BiomeThresholds,
}

impl Default for TerrainParams {
    fn default() -> Self {
        Self {
            size: 256,
            scale: 0.004,
            octaves: 5,
            lacunarity: 2.0,
            gain: 0.5,
            base_height: 0.0,
            elevation_amp: 60.0,
            continent_freq: 0.0008,
            ridge_weight: 0.35,
            temp_lapse_rate: 0.0065,
            moisture_bias: 0.0,
            flow_threshold: 120.0,
            snowline: 45.0,
            biome_thresholds: BiomeThresholds::default(),
        }
    }
}

/// Four-channel splat weights (grass/rock/sand/snow), always summing to 1 per cell.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Splat {
    pub grass: f32,
    pub rock: f32,
    pub sand: f32,
    pub snow: f32,
}

impl Splat {
    fn normalize(mut self) -> Self {
        let sum = self.grass + self.rock + self.sand + self.snow;
        if sum > 1e-6 {
            self.grass /= sum;
            self.rock /= sum;
            self.sand /= sum;
            self.snow /= sum;
        } else {
            self.grass = 1.0;
        }
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TerrainChunk {
    pub size: usize,
    pub cell_size: f32,
    pub height: Vec<f32>,
    pub temp: Vec<f32>,
    pub moisture: Vec<f32>,
    pub flow: Vec<f32>,
    pub rivers: Vec<bool>,
    pub biomes: Vec<Biome>,
    pub splats: Vec<Splat>,
}

impl TerrainChunk {
    pub fn idx(&self, x: usize, y: usize) -> usize {
        y * self.size + x
    }
}

fn clamp01(v: f32) -> f32 {
    v.clamp(0.0, 1.0)
}

/// Generate one chunk deterministically from `(world_seed, cc)`. Two calls with the
/// same inputs, in the same process or a fresh one, produce byte-identical fields.
pub fn generate_terrain(world_seed: u64, cc: ChunkCoord, cell_size: f32, p: &TerrainParams) -> TerrainChunk {
    let n = p.size;
    let mut height = vec![0.0f32; n * n];
    let mut temp = vec![0.0f32; n * n];
    let mut moisture = vec![0.0f32; n * n];

    let n_elev = Perlin::new(make_seed(world_seed, cc, "elev"));
    let n_cont = Perlin::new(make_seed(world_seed, cc, "continent"));
    let n_temp = Perlin::new(make_seed(world_seed, cc, "temp"));
    let n_moist = Perlin::new(make_seed(world_seed, cc, "moist"));

    let base_x = cc.cx as f32 * (n as f32 * cell_size);
    let base_y = cc.cy as f32 * (n as f32 * cell_size);

    // 1) Heightfield: continent mask times a ridge-blended elevation fbm.
    for y in 0..n {
        for x in 0..n {
            let wx = base_x + x as f32 * cell_size;
            let wy = base_y + y as f32 * cell_size;

            let c = n_cont.fbm2(wx * p.continent_freq, wy * p.continent_freq, 4, 2.0, 0.5);
            let c = c * 0.5 + 0.5;

            let mut elev = n_elev.fbm2(wx * p.scale, wy * p.scale, p.octaves, p.lacunarity, p.gain);
            let ridge = 1.0 - elev.abs();
            elev = (1.0 - p.ridge_weight) * elev + p.ridge_weight * ridge;

            height[y * n + x] = p.base_height + p.elevation_amp * (c * elev);
        }
    }

    // 2) Climate: temperature falls with elevation, moisture is its own fbm field.
    let world_y = (cc.cy as f32 * n as f32 + n as f32 * 0.5) * cell_size;
    for y in 0..n {
        for x in 0..n {
            let i = y * n + x;
            let wx = base_x + x as f32 * cell_size;
            let wy = base_y + y as f32 * cell_size;
            let h = height[i];

            let t_noise = n_temp.fbm2(wx * p.scale * 0.7, wy * p.scale * 0.7, 4, 2.05, 0.5);
            let m_noise = n_moist.fbm2(wx * p.scale * 0.9, wy * p.scale * 0.9, 4, 1.95, 0.5);

            let t = 0.7 - p.temp_lapse_rate * h + 0.1 * t_noise - 0.00000005 * world_y;
            let m = 0.5 + 0.3 * m_noise + p.moisture_bias;

            temp[i] = clamp01(t * 0.5 + 0.5);
            moisture[i] = clamp01(m * 0.5 + 0.5);
        }
    }

    // 3) Hydrology
    let flow = compute_flow_accumulation(&height, n, n);
    let rivers = carve_rivers(&mut height, &flow, n, n, p.flow_threshold);

    // 4) Biomes + splats
    let mut biomes = Vec::with_capacity(n * n);
    let mut splats = Vec::with_capacity(n * n);
    for y in 0..n {
        for x in 0..n {
            let i = y * n + x;
            biomes.push(classify_biome(temp[i], moisture[i], &p.biome_thresholds));
            splats.push(splat_weights(&height, n, x, y, p.snowline, biomes[i], rivers[i]));
        }
    }

    TerrainChunk {
        size: n,
        cell_size,
        height,
        temp,
        moisture,
        flow,
        rivers,
        biomes,
        splats,
    }
}

fn make_seed(world_seed: u64, cc: ChunkCoord, ns: &str) -> u64 {
    crate::game::rng::hash_ns(world_seed, cc.cx, cc.cy, ns)
}

/// Derive grass/rock/sand/snow weights from biome, height (snow above `snowline`)
/// and local slope (rock on steep terrain). River cells bias toward sand.
fn splat_weights(height: &[f32], n: usize, x: usize, y: usize, snowline: f32, biome: Biome, is_river: bool) -> Splat {
    let i = y * n + x;
    let h = height[i];

    let hx = if x + 1 < n { height[i + 1] } else { h };
    let hy = if y + 1 < n { height[i + n] } else { h };
    let slope = (hx - h).abs().max((hy - h).abs());

    let mut s = Splat::default();
    match biome {
        Biome::Desert => s.sand += 0.8,
        Biome::Tundra | Biome::Alpine => s.snow += 0.4,
        _ => s.grass += 0.7,
    }
    if is_river {
        s.sand += 0.5;
        s.grass *= 0.5;
    }
    if h > snowline {
        let above = ((h - snowline) / snowline.max(1.0)).clamp(0.0, 1.0);
        s.snow += above;
    }
    if slope > 1.5 {
        s.rock += (slope / 4.0).min(1.0);
    }
    if s.grass + s.rock + s.sand + s.snow < 1e-6 {
        s.grass = 1.0;
    }
    s.normalize()
}
