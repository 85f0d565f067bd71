use serde::Deserialize;
use std::error::Error;
use std::fs;
use std::path::Path;

/// Generator tuning, normally the `[generator]` table of the engine config.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct GenParams {
    #[serde(default = "default_frequency")]
    pub frequency: f32,
    #[serde(default = "default_octaves")]
    pub octaves: u32,
    #[serde(default = "default_lacunarity")]
    pub lacunarity: f32,
    #[serde(default = "default_persistence")]
    pub persistence: f32,
    /// Empty border around noise and sphere terrain, clamped to a quarter of the world.
    #[serde(default = "default_margin")]
    pub margin: usize,
    #[serde(default = "default_flat_thickness")]
    pub flat_thickness: usize,
    #[serde(default = "default_sphere")]
    pub sphere: Sphere,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Sphere {
    #[serde(default = "default_sphere_radius")]
    pub radius_ratio: f32,
    #[serde(default = "default_sphere_shaft")]
    pub shaft_ratio: f32,
    #[serde(default = "default_sphere_density")]
    pub density: f32,
    /// Solid floor under the shaft, in voxels.
    #[serde(default = "default_sphere_floor")]
    pub floor: usize,
}

fn default_frequency() -> f32 {
    0.01
}
fn default_octaves() -> u32 {
    3
}
fn default_lacunarity() -> f32 {
    2.0
}
fn default_persistence() -> f32 {
    0.5
}
fn default_margin() -> usize {
    32
}
fn default_flat_thickness() -> usize {
    1
}
fn default_sphere_radius() -> f32 {
    0.425
}
fn default_sphere_shaft() -> f32 {
    0.05
}
fn default_sphere_density() -> f32 {
    0.1
}
fn default_sphere_floor() -> usize {
    8
}
fn default_sphere() -> Sphere {
    Sphere {
        radius_ratio: default_sphere_radius(),
        shaft_ratio: default_sphere_shaft(),
        density: default_sphere_density(),
        floor: default_sphere_floor(),
    }
}

impl Default for Sphere {
    fn default() -> Self {
        default_sphere()
    }
}

impl Default for GenParams {
    fn default() -> Self {
        Self {
            frequency: default_frequency(),
            octaves: default_octaves(),
            lacunarity: default_lacunarity(),
            persistence: default_persistence(),
            margin: default_margin(),
            flat_thickness: default_flat_thickness(),
            sphere: default_sphere(),
        }
    }
}

impl GenParams {
    /// Margin actually used for a world `width x depth`.
    pub fn effective_margin(&self, width: usize, depth: usize) -> usize {
        self.margin.min(width / 4).min(depth / 4)
    }
}

pub fn load_params_from_path(path: &Path) -> Result<GenParams, Box<dyn Error>> {
    let s = fs::read_to_string(path)?;
    let params: GenParams = toml::from_str(&s)?;
    Ok(params)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_toml_keeps_defaults() {
        let p: GenParams = toml::from_str("octaves = 5\n[sphere]\nfloor = 2\n").unwrap();
        assert_eq!(p.octaves, 5);
        assert_eq!(p.frequency, default_frequency());
        assert_eq!(p.sphere.floor, 2);
        assert_eq!(p.sphere.radius_ratio, default_sphere_radius());
    }

    #[test]
    fn margin_shrinks_for_small_worlds() {
        let p = GenParams::default();
        assert_eq!(p.effective_margin(384, 384), 32);
        assert_eq!(p.effective_margin(8, 16), 2);
    }
}
