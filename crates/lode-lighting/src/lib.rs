//! Breadth-first light propagation and retraction over the voxel store.
#![forbid(unsafe_code)]

use std::mem;
use std::time::Instant;

use lode_blocks::{MAX_LIGHT, MaterialTable};
use lode_store::{Dims, NEIGHBORS, VoxelStore};
use serde::Deserialize;

#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq)]
pub struct LightConfig {
    /// Levels lost per step; values below 1 are treated as 1.
    #[serde(default = "default_attenuation")]
    pub attenuation: u8,
    /// Level written everywhere when generation skips lighting.
    #[serde(default = "default_fallback")]
    pub fallback: u8,
}

fn default_attenuation() -> u8 {
    1
}
fn default_fallback() -> u8 {
    MAX_LIGHT
}

impl Default for LightConfig {
    fn default() -> Self {
        Self { attenuation: default_attenuation(), fallback: default_fallback() }
    }
}

impl LightConfig {
    #[inline]
    pub fn step(&self) -> u8 {
        self.attenuation.max(1)
    }
}

/// Scratch frontiers reused across lighting calls. Contents are meaningless
/// between calls; every operation clears what it uses.
#[derive(Debug, Default)]
pub struct LightQueues {
    frontier: Vec<usize>,
    next: Vec<usize>,
    rescue: Vec<usize>,
    dark: Vec<(usize, u8)>,
    dark_next: Vec<(usize, u8)>,
}

impl LightQueues {
    /// Reserves `width * depth * 2` per frontier; they grow past that when a wave needs it.
    pub fn new(dims: Dims) -> Self {
        let cap = dims.columns() * 2;
        Self {
            frontier: Vec::with_capacity(cap),
            next: Vec::with_capacity(cap),
            rescue: Vec::with_capacity(cap),
            dark: Vec::with_capacity(cap),
            dark_next: Vec::with_capacity(cap),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LightStats {
    pub seeds: usize,
    pub lit: usize,
    pub darkened: usize,
}

impl LightStats {
    pub fn merge(self, other: LightStats) -> LightStats {
        LightStats {
            seeds: self.seeds + other.seeds,
            lit: self.lit + other.lit,
            darkened: self.darkened + other.darkened,
        }
    }
}

/// Zeroes every light byte, seeds all emitters at their emission, then floods.
pub fn propagate(
    store: &mut VoxelStore,
    materials: &MaterialTable,
    cfg: &LightConfig,
    q: &mut LightQueues,
) -> LightStats {
    let t0 = Instant::now();
    store.fill_light(0);
    q.frontier.clear();
    for i in 0..store.dims().volume() {
        let em = materials.emission(store.ty_at(i));
        if em > 0 {
            store.set_light_at(i, em.min(MAX_LIGHT));
            q.frontier.push(i);
        }
    }
    let seeds = q.frontier.len();
    let lit = run_flood(store, cfg, q);
    log::debug!(target: "perf", "ms={} light_propagate seeds={} lit={}", t0.elapsed().as_millis(), seeds, lit);
    LightStats { seeds, lit, darkened: 0 }
}

/// Incremental add: spreads light outward from `seeds`, each at its current level.
pub fn flood(
    store: &mut VoxelStore,
    cfg: &LightConfig,
    q: &mut LightQueues,
    seeds: impl IntoIterator<Item = usize>,
) -> LightStats {
    q.frontier.clear();
    q.frontier.extend(seeds);
    let seeds = q.frontier.len();
    let lit = run_flood(store, cfg, q);
    LightStats { seeds, lit, darkened: 0 }
}

/// Incremental remove: retracts light that flowed out of `seed`, which held
/// `level` before the caller zeroed it.
///
/// Phase one walks outward zeroing every empty voxel lit more dimly than the
/// voxel it was reached from. Anything at least as bright, and any emitter on
/// the edge, is lit by another source and goes into the rescue set. Phase two
/// floods from the rescue set to refill the darkened region.
pub fn remove(
    store: &mut VoxelStore,
    materials: &MaterialTable,
    cfg: &LightConfig,
    q: &mut LightQueues,
    seed: usize,
    level: u8,
) -> LightStats {
    let dims = store.dims();
    q.rescue.clear();
    q.dark.clear();
    q.dark.push((seed, level));
    let mut darkened = 0;
    while !q.dark.is_empty() {
        q.dark_next.clear();
        for &(i, l) in &q.dark {
            let (x, y, z) = dims.coords(i);
            for (dx, dy, dz) in NEIGHBORS {
                let Some(j) = dims.index(x + dx, y + dy, z + dz) else { continue };
                let nl = store.light_at(j);
                if nl == 0 {
                    continue;
                }
                if !store.is_air_at(j) {
                    if materials.is_emitter(store.ty_at(j)) {
                        q.rescue.push(j);
                    }
                    continue;
                }
                if nl < l {
                    store.set_light_at(j, 0);
                    q.dark_next.push((j, nl));
                    darkened += 1;
                } else {
                    q.rescue.push(j);
                }
            }
        }
        mem::swap(&mut q.dark, &mut q.dark_next);
    }
    mem::swap(&mut q.frontier, &mut q.rescue);
    let seeds = q.frontier.len();
    let lit = run_flood(store, cfg, q);
    LightStats { seeds, lit, darkened }
}

/// Writes `level` into every voxel without propagation.
pub fn fill(store: &mut VoxelStore, level: u8) {
    store.fill_light(level.min(MAX_LIGHT));
}

/// Level-by-level BFS from `q.frontier`. A neighbor is written only when the
/// incoming level beats what it already holds, so the result is the max over
/// all paths.
fn run_flood(store: &mut VoxelStore, cfg: &LightConfig, q: &mut LightQueues) -> usize {
    let dims = store.dims();
    let step = cfg.step();
    let mut lit = 0;
    while !q.frontier.is_empty() {
        q.next.clear();
        for &i in &q.frontier {
            let l = store.light_at(i);
            if l <= step {
                continue;
            }
            let nl = l - step;
            let (x, y, z) = dims.coords(i);
            for (dx, dy, dz) in NEIGHBORS {
                let Some(j) = dims.index(x + dx, y + dy, z + dz) else { continue };
                if !store.is_air_at(j) || store.light_at(j) >= nl {
                    continue;
                }
                store.set_light_at(j, nl);
                q.next.push(j);
                lit += 1;
            }
        }
        mem::swap(&mut q.frontier, &mut q.next);
    }
    lit
}
