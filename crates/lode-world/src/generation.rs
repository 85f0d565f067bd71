use std::time::Instant;

use fastnoise_lite::{FastNoiseLite, NoiseType};
use lode_blocks::Voxel;
use lode_blocks::types::ids;
use lode_store::{Heightmap, VoxelStore};
use serde::Deserialize;

use crate::worldgen::GenParams;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TerrainType {
    #[default]
    Noise,
    Sphere,
    Flat,
}

impl TerrainType {
    /// Numeric profile id; anything unknown falls back to `Noise`.
    pub fn from_id(id: u8) -> Self {
        match id {
            1 => TerrainType::Sphere,
            2 => TerrainType::Flat,
            _ => TerrainType::Noise,
        }
    }

    pub fn from_name(name: &str) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "sphere" => TerrainType::Sphere,
            "flat" => TerrainType::Flat,
            _ => TerrainType::Noise,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GenStats {
    pub solid: usize,
    pub ms: u32,
}

fn fractal3(noise: &FastNoiseLite, x: f32, y: f32, z: f32, p: &GenParams) -> f32 {
    let mut amp = 1.0_f32;
    let mut freq = 1.0_f32;
    let mut sum = 0.0_f32;
    let mut max_amp = 0.0_f32;
    for _ in 0..p.octaves.max(1) {
        sum += noise.get_noise_3d(x * freq, y * freq, z * freq) * amp;
        max_amp += amp;
        amp *= p.persistence;
        freq *= p.lacunarity;
    }
    if max_amp > 0.0 { sum / max_amp } else { sum }
}

/// Rainbow ramp over a byte of noise: red → blue → green → red.
pub fn color_from_noise(noise: u8) -> [u8; 3] {
    let n = 255 - noise;
    if n < 85 {
        return [255 - n * 3, 0, n * 3];
    }
    if n < 170 {
        let n = n - 85;
        return [0, n * 3, 255 - n * 3];
    }
    let n = n - 170;
    [n * 3, 255 - n * 3, 0]
}

/// Resets `store` and `heightmap`, then fills them for `seed` and `terrain`.
/// Light is left at zero; the caller relights or fills it.
pub fn generate(
    store: &mut VoxelStore,
    heightmap: &mut Heightmap,
    seed: i32,
    terrain: TerrainType,
    params: &GenParams,
) -> GenStats {
    let t0 = Instant::now();
    store.clear();
    heightmap.clear();
    let mut noise = FastNoiseLite::with_seed(seed);
    noise.set_noise_type(Some(NoiseType::OpenSimplex2));
    noise.set_frequency(Some(params.frequency));

    let d = store.dims();
    let (w, h, dp) = (d.width as i32, d.height as i32, d.depth as i32);
    let margin = params.effective_margin(d.width, d.depth) as i32;
    let flat_top = (params.flat_thickness.max(1) as i32).min(h);
    let mut solid = 0usize;
    for z in 0..dp {
        for y in 0..h {
            for x in 0..w {
                let n = match terrain {
                    TerrainType::Flat => {
                        if y >= flat_top {
                            continue;
                        }
                        fractal3(&noise, x as f32, 0.0, z as f32, params).abs()
                    }
                    TerrainType::Noise | TerrainType::Sphere => {
                        if x < margin || x >= w - margin || z < margin || z >= dp - margin {
                            continue;
                        }
                        let n = fractal3(&noise, x as f32, y as f32, z as f32, params).abs();
                        let keep = if terrain == TerrainType::Noise {
                            y as f32 <= n * h as f32
                        } else {
                            in_sphere(params, w, h, dp, x, y, z, n)
                        };
                        if !keep {
                            continue;
                        }
                        n
                    }
                };
                let [r, g, b] = color_from_noise((n.clamp(0.0, 1.0) * 255.0) as u8);
                // Addresses come from the loop bounds, so the write cannot miss.
                if store.set(x, y, z, Voxel::solid(ids::STONE, r, g, b)).is_ok() {
                    heightmap.raise(x as usize, z as usize, y as u32);
                    solid += 1;
                }
            }
        }
    }
    let ms = t0.elapsed().as_millis() as u32;
    log::info!(target: "perf", "ms={} generate terrain={:?} seed={} dims=({}, {}, {}) solid={}", ms, terrain, seed, w, h, dp, solid);
    GenStats { solid, ms }
}

#[allow(clippy::too_many_arguments)]
fn in_sphere(p: &GenParams, w: i32, h: i32, d: i32, x: i32, y: i32, z: i32, n: f32) -> bool {
    let cx = (w / 2 - x) as f32;
    let cy = (h / 2 - y) as f32;
    let cz = (d / 2 - z) as f32;
    let s = &p.sphere;
    let top_clear = (h / 4).min(32);
    y < h - top_clear
        && n > s.density
        && ((y as usize) < s.floor || (cx * cx + cz * cz).sqrt() >= w as f32 * s.shaft_ratio)
        && (cx * cx + cy * cy + cz * cz).sqrt() <= w as f32 * s.radius_ratio
}

#[cfg(test)]
mod tests {
    use super::*;
    use lode_store::Dims;

    #[test]
    fn ramp_hits_primary_colors() {
        assert_eq!(color_from_noise(255), [255, 0, 0]);
        assert_eq!(color_from_noise(170), [0, 0, 255]);
        assert_eq!(color_from_noise(85), [0, 255, 0]);
    }

    #[test]
    fn unknown_terrain_ids_default_to_noise() {
        assert_eq!(TerrainType::from_id(0), TerrainType::Noise);
        assert_eq!(TerrainType::from_id(1), TerrainType::Sphere);
        assert_eq!(TerrainType::from_id(2), TerrainType::Flat);
        assert_eq!(TerrainType::from_id(77), TerrainType::Noise);
        assert_eq!(TerrainType::from_name("FLAT"), TerrainType::Flat);
        assert_eq!(TerrainType::from_name("??"), TerrainType::Noise);
    }

    #[test]
    fn flat_fills_bottom_layer_only() {
        let dims = Dims::new(8, 8, 8);
        let mut s = VoxelStore::new(dims);
        let mut hm = Heightmap::new(dims);
        let stats = generate(&mut s, &mut hm, 1, TerrainType::Flat, &GenParams::default());
        assert_eq!(stats.solid, 64);
        for z in 0..8 {
            for x in 0..8 {
                assert!(!s.get(x, 0, z).unwrap().is_air());
                assert!(s.get(x, 1, z).unwrap().is_air());
                assert_eq!(hm.get(x as usize, z as usize), 0);
            }
        }
    }

    #[test]
    fn noise_respects_margin() {
        let dims = Dims::new(16, 16, 16);
        let mut s = VoxelStore::new(dims);
        let mut hm = Heightmap::new(dims);
        generate(&mut s, &mut hm, 7, TerrainType::Noise, &GenParams::default());
        // margin clamps to 4 here; the floor row inside it is always solid
        assert!(s.get(3, 0, 8).unwrap().is_air());
        assert!(!s.get(4, 0, 4).unwrap().is_air());
        assert!(!s.get(11, 0, 11).unwrap().is_air());
        assert!(s.get(12, 0, 11).unwrap().is_air());
    }
}
