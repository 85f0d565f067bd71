use crate::{Dims, VoxelStore};

/// Highest solid `y` per `(x, z)` column, `0` for an empty column.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Heightmap {
    dims: Dims,
    heights: Vec<u32>,
}

impl Heightmap {
    pub fn new(dims: Dims) -> Self {
        Self { dims, heights: vec![0; dims.columns()] }
    }

    #[inline]
    pub fn get(&self, x: usize, z: usize) -> u32 {
        self.heights[self.dims.column(x, z)]
    }

    #[inline]
    pub fn set(&mut self, x: usize, z: usize, h: u32) {
        let i = self.dims.column(x, z);
        self.heights[i] = h;
    }

    /// Raises the column to `y` if it is above the recorded top.
    #[inline]
    pub fn raise(&mut self, x: usize, z: usize, y: u32) {
        let i = self.dims.column(x, z);
        if self.heights[i] < y {
            self.heights[i] = y;
        }
    }

    pub fn clear(&mut self) {
        self.heights.fill(0);
    }

    #[inline]
    pub fn as_slice(&self) -> &[u32] {
        &self.heights
    }

    /// Scans column `(x, z)` downward from `from_y` for the first solid voxel.
    pub fn scan_column(store: &VoxelStore, x: usize, z: usize, from_y: i32) -> u32 {
        let mut y = from_y.min(store.dims().height as i32 - 1);
        while y > 0 {
            if let Some(i) = store.dims().index(x as i32, y, z as i32) {
                if !store.is_air_at(i) {
                    return y as u32;
                }
            }
            y -= 1;
        }
        0
    }

    /// Recomputes every column from the store, top-down.
    pub fn rebuild(&mut self, store: &VoxelStore) {
        let d = store.dims();
        for z in 0..d.depth {
            for x in 0..d.width {
                let h = Self::scan_column(store, x, z, d.height as i32 - 1);
                self.set(x, z, h);
            }
        }
    }

    /// Column update after `(x, y, z)` changed. Placement raises; removing the
    /// recorded top rescans downward.
    pub fn on_edit(&mut self, store: &VoxelStore, x: usize, y: usize, z: usize, solid: bool) {
        let top = self.get(x, z);
        if solid {
            self.raise(x, z, y as u32);
        } else if y as u32 == top {
            let h = Self::scan_column(store, x, z, y as i32 - 1);
            self.set(x, z, h);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lode_blocks::Voxel;

    #[test]
    fn rebuild_finds_highest_solid() {
        let dims = Dims::new(2, 8, 2);
        let mut s = VoxelStore::new(dims);
        s.set(0, 3, 0, Voxel::solid(1, 0, 0, 0)).unwrap();
        s.set(0, 6, 0, Voxel::solid(1, 0, 0, 0)).unwrap();
        s.set(1, 0, 1, Voxel::solid(1, 0, 0, 0)).unwrap();
        let mut hm = Heightmap::new(dims);
        hm.rebuild(&s);
        assert_eq!(hm.get(0, 0), 6);
        assert_eq!(hm.get(1, 1), 0);
        assert_eq!(hm.get(1, 0), 0);
    }

    #[test]
    fn removing_top_rescans_down() {
        let dims = Dims::new(1, 8, 1);
        let mut s = VoxelStore::new(dims);
        let mut hm = Heightmap::new(dims);
        for y in [2, 5] {
            s.set(0, y, 0, Voxel::solid(1, 0, 0, 0)).unwrap();
            hm.on_edit(&s, 0, y as usize, 0, true);
        }
        assert_eq!(hm.get(0, 0), 5);
        s.set(0, 5, 0, Voxel::AIR).unwrap();
        hm.on_edit(&s, 0, 5, 0, false);
        assert_eq!(hm.get(0, 0), 2);
        // Last solid gone, column drops to the floor
        s.set(0, 2, 0, Voxel::AIR).unwrap();
        hm.on_edit(&s, 0, 2, 0, false);
        assert_eq!(hm.get(0, 0), 0);
    }
}
