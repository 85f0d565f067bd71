//! Flat voxel store, column heightmap and chunk windows.
#![forbid(unsafe_code)]

mod chunk;
mod dims;
mod heightmap;

pub use chunk::{ChunkCoord, ChunkWindow};
pub use dims::{Dims, NEIGHBORS};
pub use heightmap::Heightmap;

use lode_blocks::{BlockId, Voxel};

/// Byte offsets inside one voxel record.
pub mod field {
    pub const TYPE: usize = 0;
    pub const R: usize = 1;
    pub const G: usize = 2;
    pub const B: usize = 3;
    pub const LIGHT: usize = 4;
    pub const STRIDE: usize = 5;
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("voxel ({x}, {y}, {z}) is outside the world")]
    OutOfBounds { x: i32, y: i32, z: i32 },
    #[error("chunk ({cx}, {cy}, {cz}) is outside the world")]
    ChunkOutOfBounds { cx: i32, cy: i32, cz: i32 },
    #[error("invalid world dimensions {width}x{height}x{depth} for chunk size {chunk_size}")]
    InvalidDimensions { width: usize, height: usize, depth: usize, chunk_size: usize },
    #[error("expected {expected} store bytes, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },
}

/// Owned contiguous voxel records, `field::STRIDE` bytes each.
#[derive(Clone, Debug)]
pub struct VoxelStore {
    dims: Dims,
    bytes: Vec<u8>,
}

impl VoxelStore {
    pub fn new(dims: Dims) -> Self {
        Self { dims, bytes: vec![0; dims.byte_len()] }
    }

    #[inline]
    pub fn dims(&self) -> Dims {
        self.dims
    }

    #[inline]
    fn offset(index: usize, f: usize) -> usize {
        index * field::STRIDE + f
    }

    pub fn get(&self, x: i32, y: i32, z: i32) -> Result<Voxel, StoreError> {
        self.dims
            .index(x, y, z)
            .map(|i| self.at(i))
            .ok_or(StoreError::OutOfBounds { x, y, z })
    }

    pub fn set(&mut self, x: i32, y: i32, z: i32, v: Voxel) -> Result<(), StoreError> {
        let i = self.dims.index(x, y, z).ok_or(StoreError::OutOfBounds { x, y, z })?;
        self.set_at(i, v);
        Ok(())
    }

    #[inline]
    pub fn at(&self, index: usize) -> Voxel {
        let o = Self::offset(index, 0);
        let r = &self.bytes[o..o + field::STRIDE];
        Voxel { ty: r[field::TYPE], r: r[field::R], g: r[field::G], b: r[field::B], light: r[field::LIGHT] }
    }

    #[inline]
    pub fn set_at(&mut self, index: usize, v: Voxel) {
        let o = Self::offset(index, 0);
        self.bytes[o..o + field::STRIDE].copy_from_slice(&[v.ty, v.r, v.g, v.b, v.light]);
    }

    #[inline]
    pub fn ty_at(&self, index: usize) -> BlockId {
        self.bytes[Self::offset(index, field::TYPE)]
    }

    #[inline]
    pub fn set_ty_at(&mut self, index: usize, ty: BlockId) {
        self.bytes[Self::offset(index, field::TYPE)] = ty;
    }

    #[inline]
    pub fn is_air_at(&self, index: usize) -> bool {
        self.ty_at(index) == 0
    }

    #[inline]
    pub fn light_at(&self, index: usize) -> u8 {
        self.bytes[Self::offset(index, field::LIGHT)]
    }

    #[inline]
    pub fn set_light_at(&mut self, index: usize, level: u8) {
        self.bytes[Self::offset(index, field::LIGHT)] = level;
    }

    pub fn clear(&mut self) {
        self.bytes.fill(0);
    }

    pub fn fill_light(&mut self, level: u8) {
        for rec in self.bytes.chunks_exact_mut(field::STRIDE) {
            rec[field::LIGHT] = level;
        }
    }

    #[inline]
    pub fn raw(&self) -> &[u8] {
        &self.bytes
    }

    /// Replaces every record verbatim. Nothing is written on a length mismatch.
    pub fn replace_bytes(&mut self, bytes: &[u8]) -> Result<(), StoreError> {
        if bytes.len() != self.bytes.len() {
            return Err(StoreError::LengthMismatch { expected: self.bytes.len(), actual: bytes.len() });
        }
        self.bytes.copy_from_slice(bytes);
        Ok(())
    }

    /// Iterates `(index, light)` of every record.
    pub fn lights(&self) -> impl Iterator<Item = (usize, u8)> + '_ {
        self.bytes.chunks_exact(field::STRIDE).enumerate().map(|(i, r)| (i, r[field::LIGHT]))
    }
}
