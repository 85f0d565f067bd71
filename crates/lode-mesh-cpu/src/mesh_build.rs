use lode_geom::{Aabb, Sphere, Vec3};
use lode_store::ChunkCoord;

/// Bytes per vertex: chunk-local position then shaded color.
pub const VERTEX_STRIDE: usize = 6;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MeshIndices {
    U16(Vec<u16>),
    U32(Vec<u32>),
}

impl MeshIndices {
    #[inline]
    pub fn len(&self) -> usize {
        match self {
            MeshIndices::U16(v) => v.len(),
            MeshIndices::U32(v) => v.len(),
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, i: usize) -> Option<u32> {
        match self {
            MeshIndices::U16(v) => v.get(i).map(|&x| x as u32),
            MeshIndices::U32(v) => v.get(i).copied(),
        }
    }
}

/// Renderer-facing geometry for one chunk. Positions are relative to the chunk origin.
#[derive(Clone, Debug, PartialEq)]
pub struct ChunkMesh {
    pub coord: ChunkCoord,
    pub bounds: Sphere,
    pub indices: MeshIndices,
    pub vertices: Vec<u8>,
}

impl ChunkMesh {
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len() / VERTEX_STRIDE
    }

    #[inline]
    pub fn quad_count(&self) -> usize {
        self.indices.len() / 6
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Position bytes of vertex `i`.
    pub fn position(&self, i: usize) -> Option<[u8; 3]> {
        let o = i * VERTEX_STRIDE;
        self.vertices.get(o..o + 3).map(|p| [p[0], p[1], p[2]])
    }

    /// Color bytes of vertex `i`.
    pub fn color(&self, i: usize) -> Option<[u8; 3]> {
        let o = i * VERTEX_STRIDE + 3;
        self.vertices.get(o..o + 3).map(|c| [c[0], c[1], c[2]])
    }
}

#[derive(Default, Clone)]
pub struct MeshBuild {
    pub vertices: Vec<u8>,
    pub idx: Vec<u32>,
    bbox: Aabb,
}

impl MeshBuild {
    /// Pre-reserve capacity for approximately `n_quads` quads worth of data.
    #[inline]
    pub fn reserve_quads(&mut self, n_quads: usize) {
        self.vertices.reserve(n_quads * 4 * VERTEX_STRIDE);
        self.idx.reserve(n_quads * 6);
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len() / VERTEX_STRIDE
    }

    /// Appends a quad given as a corner ring. `flip` moves the split to the
    /// other diagonal, keeping the winding.
    pub fn add_quad(&mut self, pos: [[u8; 3]; 4], col: [[u8; 3]; 4], flip: bool) {
        let base = self.vertex_count() as u32;
        for (p, c) in pos.iter().zip(col.iter()) {
            self.vertices.extend_from_slice(&[p[0], p[1], p[2], c[0], c[1], c[2]]);
            self.bbox.grow(Vec3::new(p[0] as f32, p[1] as f32, p[2] as f32));
        }
        let f = flip as u32;
        self.idx.extend_from_slice(&[
            base + f,
            base + f + 1,
            base + f + 2,
            base + f + 2,
            base + (f + 3) % 4,
            base + f,
        ]);
    }

    /// Picks the narrowest index width that addresses every vertex.
    pub fn finish(self, coord: ChunkCoord) -> ChunkMesh {
        let indices = if self.vertex_count() <= u16::MAX as usize + 1 {
            MeshIndices::U16(self.idx.iter().map(|&i| i as u16).collect())
        } else {
            MeshIndices::U32(self.idx)
        };
        ChunkMesh { coord, bounds: Sphere::from_aabb(&self.bbox), indices, vertices: self.vertices }
    }
}
