//! Voxel record and material table crate.
#![forbid(unsafe_code)]

pub mod config;
pub mod registry;
pub mod types;

pub use registry::MaterialTable;
pub use types::{BlockId, MAX_LIGHT, Voxel};
