//! CPU meshing crate: per-chunk face culling with baked AO and light.
#![forbid(unsafe_code)]

mod face;
mod mesh_build;

pub use face::Face;
pub use mesh_build::{ChunkMesh, MeshBuild, MeshIndices, VERTEX_STRIDE};

use std::time::Instant;

use lode_blocks::MAX_LIGHT;
use lode_store::{ChunkCoord, ChunkWindow, StoreError, VoxelStore};
use serde::Deserialize;

// Occlusion per solid corner contributor, out of 255.
const AO_STEP: f32 = 20.0;

#[derive(Clone, Copy, Debug, Deserialize, PartialEq)]
pub struct MeshOptions {
    /// When set, a face whose neighbor lies outside the world is hidden.
    #[serde(default = "default_cull_world_boundary")]
    pub cull_world_boundary: bool,
    /// Visual brightness floor for unlit faces, in `[0, 1]`.
    #[serde(default = "default_min_light")]
    pub min_light: f32,
}

fn default_cull_world_boundary() -> bool {
    true
}
fn default_min_light() -> f32 {
    0.1
}

impl Default for MeshOptions {
    fn default() -> Self {
        Self { cull_world_boundary: default_cull_world_boundary(), min_light: default_min_light() }
    }
}

/// What a neighbor lookup found.
#[derive(Clone, Copy, PartialEq, Eq)]
enum Cell {
    Outside,
    Air(u8),
    Solid,
}

#[inline]
fn cell(store: &VoxelStore, x: i32, y: i32, z: i32) -> Cell {
    match store.dims().index(x, y, z) {
        None => Cell::Outside,
        Some(i) if store.is_air_at(i) => Cell::Air(store.light_at(i)),
        Some(_) => Cell::Solid,
    }
}

/// Occlusion amount (0..=60 of 255) and averaged light for one face corner.
/// `base` is the light of the air voxel the face looks into.
fn corner_shade(base: u8, side1: Cell, side2: Cell, diag: Cell) -> (f32, f32) {
    let s1 = side1 == Cell::Solid;
    let s2 = side2 == Cell::Solid;
    let mut ao = 0.0;
    if s1 {
        ao += AO_STEP;
    }
    if s2 {
        ao += AO_STEP;
    }
    if (s1 && s2) || diag == Cell::Solid {
        ao += AO_STEP;
    }

    let mut sum = base as f32;
    let mut n = 1.0;
    let mut open = false;
    for c in [side1, side2] {
        if let Cell::Air(l) = c {
            sum += l as f32;
            n += 1.0;
            open = true;
        }
    }
    if let (true, Cell::Air(l)) = (open, diag) {
        sum += l as f32;
        n += 1.0;
    }
    (ao, sum / n)
}

#[inline]
fn shade(rgb: [u8; 3], ao: f32, light: f32, opts: &MeshOptions) -> [u8; 3] {
    let floor = opts.min_light.clamp(0.0, 1.0);
    let t = (light / MAX_LIGHT as f32).min(1.0);
    let lf = 1.0 - (1.0 - floor) * (1.0 - t);
    let k = (1.0 - ao / 255.0) * lf;
    rgb.map(|c| (c as f32 * k) as u8)
}

/// Meshes one chunk window of `store`. A chunk with no visible faces yields
/// zero indices; only a chunk coordinate outside the world is an error.
pub fn mesh_chunk(
    store: &VoxelStore,
    chunk_size: usize,
    coord: ChunkCoord,
    opts: &MeshOptions,
) -> Result<ChunkMesh, StoreError> {
    let t0 = Instant::now();
    let win = ChunkWindow::new(store.dims(), chunk_size, coord)?;
    let (ox, oy, oz) = win.origin();
    let mut mb = MeshBuild::default();
    mb.reserve_quads(chunk_size * chunk_size * 2);

    for (x, y, z) in win.world_positions() {
        let Some(i) = store.dims().index(x, y, z) else { continue };
        let v = store.at(i);
        if v.is_air() {
            continue;
        }
        for face in Face::ALL {
            let (dx, dy, dz) = face.delta();
            let (ax, ay, az) = (x + dx, y + dy, z + dz);
            let base = match cell(store, ax, ay, az) {
                Cell::Solid => continue,
                Cell::Outside if opts.cull_world_boundary => continue,
                Cell::Outside => MAX_LIGHT,
                Cell::Air(l) => l,
            };
            let (u, w) = face.tangents();
            // Min corner of the face plane, chunk-local.
            let (px, py, pz) = (x - ox + dx.max(0), y - oy + dy.max(0), z - oz + dz.max(0));
            let mut pos = [[0u8; 3]; 4];
            let mut col = [[0u8; 3]; 4];
            let mut occ = [0.0f32; 4];
            for (k, (su, sv)) in face.ring().into_iter().enumerate() {
                let side1 = cell(store, ax + su * u.0, ay + su * u.1, az + su * u.2);
                let side2 = cell(store, ax + sv * w.0, ay + sv * w.1, az + sv * w.2);
                let diag = cell(store, ax + su * u.0 + sv * w.0, ay + su * u.1 + sv * w.1, az + su * u.2 + sv * w.2);
                let (ao, light) = corner_shade(base, side1, side2, diag);
                let (a, b) = ((su + 1) / 2, (sv + 1) / 2);
                // Local coordinates lie in [0, chunk_size] and chunk_size fits a byte.
                pos[k] = [
                    (px + a * u.0 + b * w.0) as u8,
                    (py + a * u.1 + b * w.1) as u8,
                    (pz + a * u.2 + b * w.2) as u8,
                ];
                col[k] = shade(v.rgb(), ao, light, opts);
                occ[k] = ao;
            }
            // Split along the less occluded diagonal.
            mb.add_quad(pos, col, occ[0] + occ[2] > occ[1] + occ[3]);
        }
    }

    let mesh = mb.finish(coord);
    log::debug!(
        target: "perf",
        "ms={} mesh_chunk chunk=({}, {}, {}) quads={} verts={}",
        t0.elapsed().as_millis(),
        coord.cx,
        coord.cy,
        coord.cz,
        mesh.quad_count(),
        mesh.vertex_count()
    );
    Ok(mesh)
}
