use serde::Deserialize;
use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};

use lode_io::ImportLight;
use lode_lighting::LightConfig;
use lode_mesh_cpu::MeshOptions;
use lode_world::GenParams;

/// Engine settings, usually read from a TOML file. Every field has a default.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct EngineConfig {
    #[serde(default = "default_width")]
    pub width: usize,
    #[serde(default = "default_height")]
    pub height: usize,
    #[serde(default = "default_depth")]
    pub depth: usize,
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
    #[serde(default)]
    pub lighting: LightConfig,
    #[serde(default)]
    pub mesh: MeshOptions,
    #[serde(default)]
    pub import_light: ImportLight,
    #[serde(default)]
    pub generator: GenParams,
    /// Optional material table overriding the built-in ids.
    #[serde(default)]
    pub materials: Option<PathBuf>,
    #[serde(default = "default_compression_threads")]
    pub compression_threads: usize,
}

fn default_width() -> usize {
    384
}
fn default_height() -> usize {
    128
}
fn default_depth() -> usize {
    384
}
fn default_chunk_size() -> usize {
    32
}
fn default_compression_threads() -> usize {
    1
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            depth: default_depth(),
            chunk_size: default_chunk_size(),
            lighting: LightConfig::default(),
            mesh: MeshOptions::default(),
            import_light: ImportLight::default(),
            generator: GenParams::default(),
            materials: None,
            compression_threads: default_compression_threads(),
        }
    }
}

impl EngineConfig {
    /// Default settings for a `width x height x depth` world.
    pub fn with_dims(width: usize, height: usize, depth: usize, chunk_size: usize) -> Self {
        Self { width, height, depth, chunk_size, ..Self::default() }
    }

    pub fn from_toml_str(s: &str) -> Result<Self, Box<dyn Error>> {
        let cfg: EngineConfig = toml::from_str(s)?;
        Ok(cfg)
    }

    /// Reads a config file. A relative `materials` path is resolved against the
    /// config file's directory.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, Box<dyn Error>> {
        let path = path.as_ref();
        let s = fs::read_to_string(path)?;
        let mut cfg = Self::from_toml_str(&s)?;
        if let (Some(m), Some(dir)) = (cfg.materials.as_ref(), path.parent()) {
            if m.is_relative() {
                cfg.materials = Some(dir.join(m));
            }
        }
        Ok(cfg)
    }
}
