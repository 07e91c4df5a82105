//! Biome classification from normalized temperature and moisture (§4.B step 5).

/// One of ten biome ids, chosen purely from normalized temperature and moisture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Biome {
    Tundra,
    BorealForest,
    TemperateForest,
    Grassland,
    Savanna,
    Desert,
    Shrubland,
    TropicalRainforest,
    TemperateRainforest,
    Alpine,
}

#[derive(Debug, Clone, Copy, serde::Serialize, serde::Deserialize)]
pub struct BiomeThresholds {
    pub cold: f32,
    pub cool: f32,
    pub warm: f32,
    pub wet1: f32,
    pub wet2: f32,
}

impl Default for BiomeThresholds {
    fn default() -> Self {
        Self {
            cold: 0.25,
            cool: 0.45,
            warm: 0.65,
            wet1: 0.3,
            wet2: 0.6,
        }
    }
}

/// Classify a cell from its normalized `(temp01, moist01)` pair. `Alpine` is reserved
/// for the splat-mask pass (§4.B step 6), which overrides this table above the snowline.
pub fn classify_biome(temp01: f32, moist01: f32, t: &BiomeThresholds) -> Biome {
    if temp01 < t.cold {
        if moist01 < t.wet1 {
            Biome::Tundra
        } else if moist01 < t.wet2 {
            Biome::Shrubland
        } else {
            Biome::BorealForest
        }
    } else if temp01 < t.cool {
        if moist01 < t.wet1 {
            Biome::Shrubland
        } else if moist01 < t.wet2 {
            Biome::Grassland
        } else {
            Biome::TemperateForest
        }
    } else if temp01 < t.warm {
        if moist01 < t.wet1 {
            Biome::Desert
        } else if moist01 < t.wet2 {
            Biome::Grassland
        } else {
            Biome::TemperateRainforest
        }
    } else if moist01 < t.wet1 {
        Biome::Desert
    } else if moist01 < t.wet2 {
        Biome::Savanna
    } else {
        Biome::TropicalRainforest
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cold_dry_is_tundra() {
        let t = BiomeThresholds::default();
        assert_eq!(classify_biome(0.1, 0.1, &t), Biome::Tundra);
    }

    #[test]
    fn hot_wet_is_tropical_rainforest() {
        let t = BiomeThresholds::default();
        assert_eq!(classify_biome(0.9, 0.9, &t), Biome::TropicalRainforest);
    }

    #[test]
    fn hot_dry_is_desert() {
        let t = BiomeThresholds::default();
        assert_eq!(classify_biome(0.9, 0.1, &t), Biome::Desert);
    }

    #[test]
    fn cold_boundary_is_exclusive() {
        let t = BiomeThresholds::default();
        // temp01 == cold falls into the `cool` bracket, not `cold`.
        assert_eq!(classify_biome(t.cold, 0.0, &t), Biome::Shrubland);
    }
}
