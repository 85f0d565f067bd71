//! Terrain generation and the falling-sand simulation step.
#![forbid(unsafe_code)]

pub mod generation;
pub mod sim;
pub mod worldgen;

pub use generation::{GenStats, TerrainType, generate};
pub use sim::Simulation;
pub use worldgen::GenParams;
