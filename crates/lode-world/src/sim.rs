use std::time::Instant;

use lode_blocks::MaterialTable;
use lode_blocks::Voxel;
use lode_blocks::types::ids;
use lode_store::{Heightmap, VoxelStore};

/// Straight down first, then the four diagonals below.
const FALL_OFFSETS: [(i32, i32); 5] = [(0, 0), (1, 0), (-1, 0), (0, 1), (0, -1)];

/// Cellular update over granular materials. The step counter only grows and
/// picks the scan direction of each pass.
#[derive(Debug, Default, Clone)]
pub struct Simulation {
    step: u64,
}

impl Simulation {
    pub fn new() -> Self {
        Self { step: 0 }
    }

    #[inline]
    pub fn step_count(&self) -> u64 {
        self.step
    }

    /// Runs `steps` passes and rebuilds the heightmap once at the end.
    /// Returns the number of voxels that moved.
    pub fn run(
        &mut self,
        store: &mut VoxelStore,
        heightmap: &mut Heightmap,
        materials: &MaterialTable,
        steps: u32,
    ) -> usize {
        let t0 = Instant::now();
        let mut moved = 0;
        for _ in 0..steps {
            moved += self.pass(store, materials);
        }
        heightmap.rebuild(store);
        log::debug!(target: "perf", "ms={} simulate steps={} moved={} step={}", t0.elapsed().as_millis(), steps, moved, self.step);
        moved
    }

    /// One pass, bottom-up, over the region two voxels in from each side wall.
    pub fn pass(&mut self, store: &mut VoxelStore, materials: &MaterialTable) -> usize {
        let d = store.dims();
        let (w, h, dp) = (d.width as i32, d.height as i32, d.depth as i32);
        let inv_z = self.step % 4 < 2;
        let inv_x = self.step % 2 == 0;
        self.step += 1;
        let mut moved = 0;
        for y in 1..h {
            for sz in 2..dp - 2 {
                let z = if inv_z { dp - 1 - sz } else { sz };
                for sx in 2..w - 2 {
                    let x = if inv_x { w - 1 - sx } else { sx };
                    let Some(here) = d.index(x, y, z) else { continue };
                    let v = store.at(here);
                    if !materials.is_granular(v.ty) {
                        continue;
                    }
                    let target = FALL_OFFSETS
                        .iter()
                        .filter_map(|&(dx, dz)| d.index(x + dx, y - 1, z + dz))
                        .find(|&i| store.is_air_at(i));
                    let Some(below) = target else {
                        store.set_ty_at(here, ids::STONE);
                        continue;
                    };
                    store.set_at(below, Voxel { light: store.light_at(below), ..v });
                    store.set_at(here, Voxel { light: v.light, ..Voxel::AIR });
                    moved += 1;
                    // Stone resting on the moved grain loses support and turns granular.
                    for &(dx, dz) in &FALL_OFFSETS {
                        if let Some(up) = d.index(x + dx, y + 1, z + dz) {
                            if store.ty_at(up) == ids::STONE {
                                store.set_ty_at(up, v.ty);
                            }
                        }
                    }
                }
            }
        }
        moved
    }
}
