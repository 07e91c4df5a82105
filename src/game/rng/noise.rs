//! Classic Perlin noise over a seeded permutation table.

use super::xoshiro::Rng;

#[inline]
fn fade(t: f32) -> f32 {
    t * t * t * (t * (t * 6.0 - 15.0) + 10.0)
}

#[inline]
fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + t * (b - a)
}

#[inline]
fn grad(hash: i32, x: f32, y: f32, z: f32) -> f32 {
    let h = hash & 15;
    let u = if h < 8 { x } else { y };
    let v = if h < 4 {
        y
    } else if h == 12 || h == 14 {
        x
    } else {
        z
    };
    (if h & 1 != 0 { -u } else { u }) + (if h & 2 != 0 { -v } else { v })
}

/// A 512-entry permutation table driven Perlin noise source (§4.A/§4.B). Every
/// world-gen channel (elevation, temperature, moisture, ...) builds its own
/// `Perlin` from `rng::make_rng`, so two channels never share a permutation.
pub struct Perlin {
    p: [i32; 512],
}

impl Perlin {
    pub fn new(seed: u64) -> Self {
        let mut perm: [i32; 256] = [0; 256];
        for (i, slot) in perm.iter_mut().enumerate() {
            *slot = i as i32;
        }
        let mut rng = Rng::from_seed(seed);
        for i in (1..256).rev() {
            let j = rng.range_i32(0, i as i32) as usize;
            perm.swap(i, j);
        }
        let mut p = [0i32; 512];
        for (i, slot) in p.iter_mut().enumerate() {
            *slot = perm[i & 255];
        }
        Self { p }
    }

    pub fn noise2(&self, x: f32, y: f32) -> f32 {
        self.noise3(x, y, 0.0)
    }

    pub fn noise3(&self, x: f32, y: f32, z: f32) -> f32 {
        let xi = x.floor() as i32 & 255;
        let yi = y.floor() as i32 & 255;
        let zi = z.floor() as i32 & 255;
        let x = x - x.floor();
        let y = y - y.floor();
        let z = z - z.floor();
        let u = fade(x);
        let v = fade(y);
        let w = fade(z);

        let p = &self.p;
        let a = p[xi as usize] + yi;
        let aa = p[a as usize] + zi;
        let ab = p[(a + 1) as usize] + zi;
        let b = p[(xi + 1) as usize] + yi;
        let ba = p[b as usize] + zi;
        let bb = p[(b + 1) as usize] + zi;

        lerp(
            lerp(
                lerp(
                    grad(p[aa as usize], x, y, z),
                    grad(p[ba as usize], x - 1.0, y, z),
                    u,
                ),
                lerp(
                    grad(p[ab as usize], x, y - 1.0, z),
                    grad(p[bb as usize], x - 1.0, y - 1.0, z),
                    u,
                ),
                v,
            ),
            lerp(
                lerp(
                    grad(p[(aa + 1) as usize], x, y, z - 1.0),
                    grad(p[(ba + 1) as usize], x - 1.0, y, z - 1.0),
                    u,
                ),
                lerp(
                    grad(p[(ab + 1) as usize], x, y - 1.0, z - 1.0),
                    grad(p[(bb + 1) as usize], x - 1.0, y - 1.0, z - 1.0),
                    u,
                ),
                v,
            ),
            w,
        )
    }

    pub fn fbm2(&self, x: f32, y: f32, octaves: u32, lacunarity: f32, gain: f32) -> f32 {
        let mut f = 0.0;
        let mut amp = 0.5;
        let mut freq = 1.0;
        for _ in 0..octaves {
            f += amp * self.noise2(x * freq, y * freq);
            freq *= lacunarity;
            amp *= gain;
        }
        f
    }

    pub fn fbm3(&self, x: f32, y: f32, z: f32, octaves: u32, lacunarity: f32, gain: f32) -> f32 {
        let mut f = 0.0;
        let mut amp = 0.5;
        let mut freq = 1.0;
        for _ in 0..octaves {
            f += amp * self.noise3(x * freq, y * freq, z * freq);
            freq *= lacunarity;
            amp *= gain;
        }
        f
    }

    /// Ridged variant used for mountain ridgelines in the elevation blend (§4.B):
    /// folds each octave around zero so valleys stay shallow and ridges stay sharp.
    pub fn ridged2(&self, x: f32, y: f32, octaves: u32, lacunarity: f32, gain: f32) -> f32 {
        let mut f = 0.0;
        let mut amp = 0.5;
        let mut freq = 1.0;
        for _ in 0..octaves {
            let n = 1.0 - self.noise2(x * freq, y * freq).abs();
            f += amp * n * n;
            freq *= lacunarity;
            amp *= gain;
        }
        f
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_identical_field() {
        let a = Perlin::new(7);
        let b = Perlin::new(7);
        for i in 0..50 {
            let x = i as f32 * 0.37;
            assert_eq!(a.noise2(x, -x), b.noise2(x, -x));
        }
    }

    #[test]
    fn different_seed_diverges() {
        let a = Perlin::new(1);
        let b = Perlin::new(2);
        assert_ne!(a.noise2(1.234, 5.678), b.noise2(1.234, 5.678));
    }

    #[test]
    fn noise_stays_in_range() {
        let p = Perlin::new(42);
        for i in 0..200 {
            let x = i as f32 * 0.123;
            let y = i as f32 * -0.271;
            let v = p.noise2(x, y);
            assert!((-1.01..=1.01).contains(&v), "noise out of range: {v}");
        }
    }

    #[test]
    fn fbm_is_deterministic() {
        let p = Perlin::new(99);
        let a = p.fbm2(3.1, -2.2, 5, 2.0, 0.5);
        let b = p.fbm2(3.1, -2.2, 5, 2.0, 0.5);
        assert_eq!(a, b);
    }
}
