use serde::Deserialize;

/// `[[materials]]` entries of a material TOML file.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct MaterialsConfig {
    #[serde(default)]
    pub materials: Vec<MaterialDef>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct MaterialDef {
    pub name: String,
    pub id: u8,
    #[serde(default)]
    pub emission: Option<u8>,
    /// Marks granular materials moved by the simulation step.
    #[serde(default)]
    pub granular: Option<bool>,
}
