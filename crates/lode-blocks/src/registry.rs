use std::collections::HashMap;
use std::error::Error;
use std::fs;
use std::path::Path;

use super::config::{MaterialDef, MaterialsConfig};
use super::types::{BlockId, MAX_LIGHT, ids};

#[derive(Clone, Debug)]
pub struct MaterialInfo {
    pub name: String,
    pub emission: u8,
    pub granular: bool,
}

/// Emission and behavior per material id. Ids without an entry are plain solids.
#[derive(Clone, Debug)]
pub struct MaterialTable {
    entries: Vec<Option<MaterialInfo>>,
    emission: [u8; 256],
    by_name: HashMap<String, BlockId>,
}

impl Default for MaterialTable {
    fn default() -> Self {
        Self::builtin()
    }
}

impl MaterialTable {
    pub fn empty() -> Self {
        Self {
            entries: vec![None; 256],
            emission: [0; 256],
            by_name: HashMap::new(),
        }
    }

    /// Air, stone, light and sand with the stock emission levels.
    pub fn builtin() -> Self {
        let mut t = Self::empty();
        t.insert(ids::AIR, "air", 0, false);
        t.insert(ids::STONE, "stone", 0, false);
        t.insert(ids::LIGHT, "light", MAX_LIGHT, false);
        t.insert(ids::SAND, "sand", 0, true);
        t
    }

    fn insert(&mut self, id: BlockId, name: &str, emission: u8, granular: bool) {
        // Air can never emit.
        let emission = if id == ids::AIR { 0 } else { emission.min(MAX_LIGHT) };
        self.emission[id as usize] = emission;
        self.by_name.insert(name.to_string(), id);
        self.entries[id as usize] = Some(MaterialInfo { name: name.to_string(), emission, granular });
    }

    /// Builtins first, then config entries override or extend them.
    pub fn from_config(cfg: MaterialsConfig) -> Self {
        let mut t = Self::builtin();
        for MaterialDef { name, id, emission, granular } in cfg.materials {
            if let Some(prev) = t.entries[id as usize].take() {
                t.by_name.remove(&prev.name);
            }
            t.insert(id, &name, emission.unwrap_or(0), granular.unwrap_or(false));
        }
        t
    }

    pub fn from_toml_str(toml_str: &str) -> Result<Self, Box<dyn Error>> {
        let cfg: MaterialsConfig = toml::from_str(toml_str)?;
        Ok(Self::from_config(cfg))
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, Box<dyn Error>> {
        let s = fs::read_to_string(path)?;
        Self::from_toml_str(&s)
    }

    #[inline]
    pub fn emission(&self, id: BlockId) -> u8 {
        self.emission[id as usize]
    }

    #[inline]
    pub fn is_emitter(&self, id: BlockId) -> bool {
        self.emission[id as usize] > 0
    }

    #[inline]
    pub fn is_granular(&self, id: BlockId) -> bool {
        self.entries[id as usize].as_ref().is_some_and(|m| m.granular)
    }

    pub fn get(&self, id: BlockId) -> Option<&MaterialInfo> {
        self.entries[id as usize].as_ref()
    }

    pub fn id_by_name(&self, name: &str) -> Option<BlockId> {
        self.by_name.get(name).copied()
    }
}
