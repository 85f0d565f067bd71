//! In-memory voxel world engine: generation, lighting, meshing, edits and snapshots.
#![forbid(unsafe_code)]

pub mod config;

pub use config::EngineConfig;
pub use lode_blocks::{MAX_LIGHT, MaterialTable, Voxel};
pub use lode_edit::EditOutcome;
pub use lode_geom::Sphere;
pub use lode_io::{ImportLight, IoError, Ticket};
pub use lode_lighting::{LightConfig, LightStats};
pub use lode_mesh_cpu::{ChunkMesh, MeshIndices, MeshOptions};
pub use lode_store::{ChunkCoord, Dims, StoreError};
pub use lode_world::{GenStats, TerrainType};

use std::thread;
use std::time::Instant;

use crossbeam_channel::{Receiver, TryRecvError, bounded};
use lode_edit::{Editor, RemeshTracker, affected_chunks};
use lode_io::CompressionWorker;
use lode_lighting::{LightQueues, fill, propagate};
use lode_mesh_cpu::mesh_chunk;
use lode_store::{ChunkWindow, Heightmap, VoxelStore};
use lode_world::{GenParams, Simulation, generate};
use rayon::prelude::*;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Io(#[from] IoError),
    #[error("config: {0}")]
    Config(String),
    #[error("engine load thread exited before signalling readiness")]
    LoadFailed,
}

/// One world: store, heightmap, scratch queues and the services around them.
/// Every operation runs to completion on the calling thread except
/// compression, which goes through a worker.
pub struct Engine {
    dims: Dims,
    chunk_size: usize,
    store: VoxelStore,
    heightmap: Heightmap,
    materials: MaterialTable,
    light: LightConfig,
    mesh_opts: MeshOptions,
    gen_params: GenParams,
    import_light: ImportLight,
    queues: LightQueues,
    sim: Simulation,
    remesh: RemeshTracker,
    worker: CompressionWorker,
}

/// Pending engine construction on a background thread.
pub struct EngineLoad {
    rx: Receiver<Result<Engine, EngineError>>,
}

impl EngineLoad {
    /// Blocks until the engine is ready.
    pub fn wait(self) -> Result<Engine, EngineError> {
        self.rx.recv().map_err(|_| EngineError::LoadFailed)?
    }

    /// Returns the engine once ready, or gives the handle back.
    pub fn try_ready(self) -> Result<Result<Engine, EngineError>, EngineLoad> {
        match self.rx.try_recv() {
            Ok(r) => Ok(r),
            Err(TryRecvError::Empty) => Err(self),
            Err(TryRecvError::Disconnected) => Ok(Err(EngineError::LoadFailed)),
        }
    }
}

impl Engine {
    /// Builds an empty (all air) world after validating the dimensions.
    pub fn new(cfg: EngineConfig) -> Result<Engine, EngineError> {
        let dims = Dims::validate(cfg.width, cfg.height, cfg.depth, cfg.chunk_size)?;
        let materials = match &cfg.materials {
            Some(path) => MaterialTable::from_path(path).map_err(|e| EngineError::Config(format!("{}: {e}", path.display())))?,
            None => MaterialTable::builtin(),
        };
        log::info!(
            "engine world=({}, {}, {}) chunk={} bytes={}",
            dims.width,
            dims.height,
            dims.depth,
            cfg.chunk_size,
            dims.byte_len()
        );
        Ok(Engine {
            dims,
            chunk_size: cfg.chunk_size,
            store: VoxelStore::new(dims),
            heightmap: Heightmap::new(dims),
            materials,
            light: cfg.lighting,
            mesh_opts: cfg.mesh,
            gen_params: cfg.generator,
            import_light: cfg.import_light,
            queues: LightQueues::new(dims),
            sim: Simulation::new(),
            remesh: RemeshTracker::new(),
            worker: CompressionWorker::new(cfg.compression_threads),
        })
    }

    /// Starts construction on a background thread; the engine only becomes
    /// usable through the returned handle.
    pub fn load(cfg: EngineConfig) -> EngineLoad {
        let (tx, rx) = bounded(1);
        let spawned = thread::Builder::new().name("lode-load".into()).spawn(move || {
            let _ = tx.send(Engine::new(cfg));
        });
        if let Err(e) = spawned {
            log::warn!("engine load thread failed to start: {e}");
        }
        EngineLoad { rx }
    }

    #[inline]
    pub fn dims(&self) -> Dims {
        self.dims
    }

    #[inline]
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Chunks per axis.
    pub fn chunk_counts(&self) -> [i32; 3] {
        ChunkWindow::chunk_counts(self.dims, self.chunk_size)
    }

    pub fn store(&self) -> &VoxelStore {
        &self.store
    }

    pub fn heightmap(&self) -> &Heightmap {
        &self.heightmap
    }

    pub fn materials(&self) -> &MaterialTable {
        &self.materials
    }

    pub fn step_count(&self) -> u64 {
        self.sim.step_count()
    }

    fn all_chunks(&self) -> Vec<ChunkCoord> {
        let [nx, ny, nz] = self.chunk_counts();
        let mut out = Vec::with_capacity((nx * ny * nz).max(0) as usize);
        for cz in 0..nz {
            for cy in 0..ny {
                for cx in 0..nx {
                    out.push(ChunkCoord::new(cx, cy, cz));
                }
            }
        }
        out
    }

    fn touch_all(&mut self) {
        let all = self.all_chunks();
        self.remesh.reset();
        self.remesh.bump(&all);
    }

    /// Regenerates the whole world. With `skip_lighting` every voxel gets the
    /// configured fallback level instead of a propagation pass.
    pub fn generate(&mut self, seed: i32, terrain: TerrainType, skip_lighting: bool) -> GenStats {
        let stats = generate(&mut self.store, &mut self.heightmap, seed, terrain, &self.gen_params);
        if skip_lighting {
            fill(&mut self.store, self.light.fallback);
        } else {
            self.propagate();
        }
        self.touch_all();
        stats
    }

    /// Runs `steps` simulation passes, then relights once.
    pub fn simulate(&mut self, steps: u32) -> usize {
        let moved = self.sim.run(&mut self.store, &mut self.heightmap, &self.materials, steps);
        self.propagate();
        if moved > 0 {
            self.touch_all();
        }
        moved
    }

    /// Full relight from every emitter.
    pub fn propagate(&mut self) -> LightStats {
        propagate(&mut self.store, &self.materials, &self.light, &mut self.queues)
    }

    pub fn mesh(&self, cx: i32, cy: i32, cz: i32) -> Result<ChunkMesh, EngineError> {
        Ok(mesh_chunk(&self.store, self.chunk_size, ChunkCoord::new(cx, cy, cz), &self.mesh_opts)?)
    }

    /// Meshes every chunk in parallel, in chunk order.
    pub fn mesh_all(&self) -> Result<Vec<ChunkMesh>, EngineError> {
        let t0 = Instant::now();
        let out = self
            .all_chunks()
            .par_iter()
            .map(|&c| mesh_chunk(&self.store, self.chunk_size, c, &self.mesh_opts))
            .collect::<Result<Vec<_>, _>>()?;
        log::info!(target: "perf", "ms={} mesh_all chunks={}", t0.elapsed().as_millis(), out.len());
        Ok(out)
    }

    /// Chunks stamped by edits or world rebuilds since they were last meshed here.
    pub fn dirty_chunks(&self) -> Vec<ChunkCoord> {
        self.remesh.pending()
    }

    /// Meshes every dirty chunk and marks it built.
    pub fn mesh_dirty(&mut self) -> Result<Vec<ChunkMesh>, EngineError> {
        let pending = self.remesh.pending();
        let meshes = pending
            .par_iter()
            .map(|&c| mesh_chunk(&self.store, self.chunk_size, c, &self.mesh_opts))
            .collect::<Result<Vec<_>, _>>()?;
        for &c in &pending {
            let rev = self.remesh.get_rev(c);
            self.remesh.mark_built(c, rev);
        }
        Ok(meshes)
    }

    /// Places (`ty != 0`) or removes a voxel. Shell coordinates are ignored.
    #[allow(clippy::too_many_arguments)]
    pub fn update(&mut self, x: i32, y: i32, z: i32, ty: u8, r: u8, g: u8, b: u8) -> Result<EditOutcome, EngineError> {
        let v = if ty == 0 { Voxel::AIR } else { Voxel::solid(ty, r, g, b) };
        let outcome = Editor {
            store: &mut self.store,
            heightmap: &mut self.heightmap,
            materials: &self.materials,
            light: &self.light,
            queues: &mut self.queues,
        }
        .update(x, y, z, v)?;
        if let EditOutcome::Applied { .. } = outcome {
            let plan = affected_chunks(self.dims, self.chunk_size, x, y, z);
            self.remesh.bump(&plan);
        }
        Ok(outcome)
    }

    /// Chunks a renderer should remesh after an edit at `(x, y, z)`.
    pub fn affected_chunks(&self, x: i32, y: i32, z: i32) -> Result<Vec<ChunkCoord>, EngineError> {
        if !self.dims.contains(x, y, z) {
            return Err(StoreError::OutOfBounds { x, y, z }.into());
        }
        Ok(affected_chunks(self.dims, self.chunk_size, x, y, z))
    }

    pub fn export(&mut self) -> Result<Vec<u8>, EngineError> {
        Ok(lode_io::export(&self.store, &mut self.worker)?)
    }

    /// Snapshots the store now and compresses in the background; collect
    /// the bytes with [`Engine::finish_export`].
    pub fn begin_export(&mut self) -> Result<Ticket, EngineError> {
        Ok(lode_io::begin_export(&self.store, &mut self.worker)?)
    }

    /// Blocks until the export behind `ticket` is compressed. A ticket from
    /// another engine is rejected with `UnknownTicket`.
    pub fn finish_export(&mut self, ticket: Ticket) -> Result<Vec<u8>, EngineError> {
        Ok(self.worker.wait(ticket)?)
    }

    /// Non-blocking [`Engine::finish_export`]; gives the ticket back while
    /// compression is still running.
    pub fn poll_export(&mut self, ticket: Ticket) -> Result<Result<Vec<u8>, EngineError>, Ticket> {
        self.worker.try_take(ticket).map(|r| r.map_err(EngineError::from))
    }

    /// Replaces the world with an exported snapshot. Nothing changes on error.
    pub fn import(&mut self, bytes: &[u8]) -> Result<(), EngineError> {
        lode_io::import(&mut self.store, &mut self.heightmap, &mut self.worker, bytes)?;
        if self.import_light == ImportLight::Relight {
            self.propagate();
        }
        self.touch_all();
        Ok(())
    }

    pub fn voxel(&self, x: i32, y: i32, z: i32) -> Result<Voxel, EngineError> {
        Ok(self.store.get(x, y, z)?)
    }

    pub fn height_at(&self, x: i32, z: i32) -> Result<u32, EngineError> {
        if !self.dims.contains(x, 0, z) {
            return Err(StoreError::OutOfBounds { x, y: 0, z }.into());
        }
        Ok(self.heightmap.get(x as usize, z as usize))
    }

    /// Standing position above the surface of the centre column.
    pub fn spawn_point(&self) -> (i32, i32, i32) {
        let x = self.dims.width / 2;
        let z = self.dims.depth / 2;
        let y = (self.heightmap.get(x, z) + 1).min(self.dims.height as u32 - 1);
        (x as i32, y as i32, z as i32)
    }
}
