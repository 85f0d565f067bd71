use crate::{Dims, StoreError};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChunkCoord {
    pub cx: i32,
    pub cy: i32,
    pub cz: i32,
}

impl ChunkCoord {
    #[inline]
    pub const fn new(cx: i32, cy: i32, cz: i32) -> Self {
        Self { cx, cy, cz }
    }

    /// Chunk holding world voxel `(x, y, z)`.
    #[inline]
    pub fn containing(x: i32, y: i32, z: i32, chunk_size: usize) -> Self {
        let s = chunk_size as i32;
        Self { cx: x.div_euclid(s), cy: y.div_euclid(s), cz: z.div_euclid(s) }
    }
}

/// Read window over one `size³` chunk of the store; holds no voxel data.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChunkWindow {
    pub coord: ChunkCoord,
    pub size: usize,
}

impl ChunkWindow {
    pub fn new(dims: Dims, size: usize, coord: ChunkCoord) -> Result<Self, StoreError> {
        let [nx, ny, nz] = Self::chunk_counts(dims, size);
        let ChunkCoord { cx, cy, cz } = coord;
        if cx < 0 || cy < 0 || cz < 0 || cx >= nx || cy >= ny || cz >= nz {
            return Err(StoreError::ChunkOutOfBounds { cx, cy, cz });
        }
        Ok(Self { coord, size })
    }

    /// Chunks per axis.
    #[inline]
    pub fn chunk_counts(dims: Dims, size: usize) -> [i32; 3] {
        [
            (dims.width / size) as i32,
            (dims.height / size) as i32,
            (dims.depth / size) as i32,
        ]
    }

    /// World position of local `(0, 0, 0)`.
    #[inline]
    pub fn origin(&self) -> (i32, i32, i32) {
        let s = self.size as i32;
        (self.coord.cx * s, self.coord.cy * s, self.coord.cz * s)
    }

    #[inline]
    pub fn contains_world(&self, wx: i32, wy: i32, wz: i32) -> bool {
        let (ox, oy, oz) = self.origin();
        let s = self.size as i32;
        wx >= ox && wx < ox + s && wy >= oy && wy < oy + s && wz >= oz && wz < oz + s
    }

    /// World coordinates of every voxel, z-major like the store.
    pub fn world_positions(&self) -> impl Iterator<Item = (i32, i32, i32)> + use<> {
        let (ox, oy, oz) = self.origin();
        let s = self.size as i32;
        (oz..oz + s).flat_map(move |z| (oy..oy + s).flat_map(move |y| (ox..ox + s).map(move |x| (x, y, z))))
    }
}
