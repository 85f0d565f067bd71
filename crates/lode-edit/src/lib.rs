//! Single-voxel edits with incremental relighting, plus remesh bookkeeping.
#![forbid(unsafe_code)]

mod remesh;

pub use remesh::{RemeshTracker, affected_chunks};

use lode_blocks::{MaterialTable, Voxel};
use lode_lighting::{LightConfig, LightQueues, LightStats, flood, remove};
use lode_store::{Dims, Heightmap, NEIGHBORS, StoreError, VoxelStore};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EditOutcome {
    /// Target lies on the protected outer shell; nothing was written.
    Ignored,
    Applied { prior: Voxel, light: LightStats },
}

/// Outer shell: the four side walls and the top layer.
#[inline]
pub fn on_shell(dims: Dims, x: i32, y: i32, z: i32) -> bool {
    x == 0
        || z == 0
        || x == dims.width as i32 - 1
        || z == dims.depth as i32 - 1
        || y == dims.height as i32 - 1
}

/// Mutable view over everything one edit touches.
pub struct Editor<'a> {
    pub store: &'a mut VoxelStore,
    pub heightmap: &'a mut Heightmap,
    pub materials: &'a MaterialTable,
    pub light: &'a LightConfig,
    pub queues: &'a mut LightQueues,
}

impl Editor<'_> {
    /// Writes `v` at `(x, y, z)` and repairs the heightmap column and light
    /// around it. Work is bounded by the light region the edit disturbs.
    pub fn update(&mut self, x: i32, y: i32, z: i32, v: Voxel) -> Result<EditOutcome, StoreError> {
        let dims = self.store.dims();
        let Some(i) = dims.index(x, y, z) else {
            return Err(StoreError::OutOfBounds { x, y, z });
        };
        if on_shell(dims, x, y, z) {
            log::trace!("edit at ({x}, {y}, {z}) ignored on world shell");
            return Ok(EditOutcome::Ignored);
        }

        let prior = self.store.at(i);
        self.store.set_at(i, Voxel { light: prior.light, ..v });
        self.heightmap.on_edit(self.store, x as usize, y as usize, z as usize, !v.is_air());

        let mut stats = LightStats::default();
        if self.materials.is_emitter(prior.ty) {
            self.store.set_light_at(i, 0);
            stats = stats.merge(remove(self.store, self.materials, self.light, self.queues, i, prior.light));
        } else if !v.is_air() && prior.is_air() && prior.light > 0 {
            self.store.set_light_at(i, 0);
            stats = stats.merge(remove(self.store, self.materials, self.light, self.queues, i, prior.light));
        }

        let emission = self.materials.emission(v.ty);
        if emission > 0 {
            self.store.set_light_at(i, emission);
            stats = stats.merge(flood(self.store, self.light, self.queues, [i]));
        } else if v.is_air() && !prior.is_air() {
            let store = &*self.store;
            let seeds: Vec<usize> = NEIGHBORS
                .iter()
                .filter_map(|&(dx, dy, dz)| dims.index(x + dx, y + dy, z + dz))
                .filter(|&j| store.light_at(j) > 0)
                .collect();
            stats = stats.merge(flood(self.store, self.light, self.queues, seeds));
        }

        Ok(EditOutcome::Applied { prior, light: stats })
    }
}
