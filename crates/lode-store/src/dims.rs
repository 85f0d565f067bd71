use crate::{StoreError, field};

/// 6-connected steps: +X, -X, +Z, -Z, +Y, -Y.
pub const NEIGHBORS: [(i32, i32, i32); 6] = [
    (1, 0, 0),
    (-1, 0, 0),
    (0, 0, 1),
    (0, 0, -1),
    (0, 1, 0),
    (0, -1, 0),
];

/// World extent. The only owner of the voxel addressing formula.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Dims {
    pub width: usize,
    pub height: usize,
    pub depth: usize,
}

impl Dims {
    #[inline]
    pub const fn new(width: usize, height: usize, depth: usize) -> Self {
        Self { width, height, depth }
    }

    /// Checks every axis is positive and a multiple of `chunk_size`. Vertex positions are
    /// stored as chunk-local bytes, so a chunk edge must fit in a `u8`.
    pub fn validate(width: usize, height: usize, depth: usize, chunk_size: usize) -> Result<Self, StoreError> {
        let ok = chunk_size > 0
            && [width, height, depth].iter().all(|&d| d > 0 && d % chunk_size == 0)
            && chunk_size <= u8::MAX as usize;
        if !ok {
            return Err(StoreError::InvalidDimensions { width, height, depth, chunk_size });
        }
        Ok(Self::new(width, height, depth))
    }

    #[inline]
    pub fn volume(&self) -> usize {
        self.width * self.height * self.depth
    }

    #[inline]
    pub fn byte_len(&self) -> usize {
        self.volume() * field::STRIDE
    }

    #[inline]
    pub fn columns(&self) -> usize {
        self.width * self.depth
    }

    #[inline]
    pub fn contains(&self, x: i32, y: i32, z: i32) -> bool {
        x >= 0 && y >= 0 && z >= 0
            && (x as usize) < self.width
            && (y as usize) < self.height
            && (z as usize) < self.depth
    }

    /// Linear voxel index, `None` outside the world.
    #[inline]
    pub fn index(&self, x: i32, y: i32, z: i32) -> Option<usize> {
        if !self.contains(x, y, z) {
            return None;
        }
        let (x, y, z) = (x as usize, y as usize, z as usize);
        Some(z * self.width * self.height + y * self.width + x)
    }

    /// Inverse of `index`.
    #[inline]
    pub fn coords(&self, index: usize) -> (i32, i32, i32) {
        let layer = self.width * self.height;
        let z = index / layer;
        let rem = index % layer;
        ((rem % self.width) as i32, (rem / self.width) as i32, z as i32)
    }

    /// Index of the `n`th entry of `NEIGHBORS` around `index`.
    #[inline]
    pub fn neighbor(&self, index: usize, n: usize) -> Option<usize> {
        let (x, y, z) = self.coords(index);
        let (dx, dy, dz) = NEIGHBORS[n];
        self.index(x + dx, y + dy, z + dz)
    }

    /// Heightmap slot of column `(x, z)`.
    #[inline]
    pub fn column(&self, x: usize, z: usize) -> usize {
        z * self.width + x
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_rejects_uneven_and_zero() {
        assert!(Dims::validate(8, 8, 8, 8).is_ok());
        assert!(Dims::validate(16, 8, 24, 8).is_ok());
        assert!(Dims::validate(0, 8, 8, 8).is_err());
        assert!(Dims::validate(12, 8, 8, 8).is_err());
        assert!(Dims::validate(8, 8, 8, 0).is_err());
    }

    #[test]
    fn neighbor_stops_at_world_edge() {
        let d = Dims::new(3, 3, 3);
        let corner = d.index(0, 0, 0).unwrap();
        assert_eq!(d.neighbor(corner, 0), d.index(1, 0, 0));
        assert_eq!(d.neighbor(corner, 1), None);
        assert_eq!(d.neighbor(corner, 3), None);
        assert_eq!(d.neighbor(corner, 4), d.index(0, 1, 0));
        assert_eq!(d.neighbor(corner, 5), None);
    }
}
