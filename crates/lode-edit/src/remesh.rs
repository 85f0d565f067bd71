use hashbrown::HashMap;
use lode_store::{ChunkCoord, ChunkWindow, Dims};

/// Chunks to remesh after an edit at `(x, y, z)`: the 3×3 planar block around
/// the edited chunk, on every layer from the floor up to one above it.
pub fn affected_chunks(dims: Dims, chunk_size: usize, x: i32, y: i32, z: i32) -> Vec<ChunkCoord> {
    let [nx, ny, nz] = ChunkWindow::chunk_counts(dims, chunk_size);
    let c = ChunkCoord::containing(x, y, z, chunk_size);
    let top = (c.cy + 1).min(ny - 1);
    let mut out = Vec::with_capacity(9 * (top.max(0) as usize + 1));
    for cy in 0..=top {
        for cz in (c.cz - 1).max(0)..=(c.cz + 1).min(nz - 1) {
            for cx in (c.cx - 1).max(0)..=(c.cx + 1).min(nx - 1) {
                out.push(ChunkCoord::new(cx, cy, cz));
            }
        }
    }
    out
}

/// Change tracking per chunk: edits stamp chunks with a rising revision and
/// the mesher records which revision it built.
#[derive(Debug, Default)]
pub struct RemeshTracker {
    rev: HashMap<ChunkCoord, u64>,
    built: HashMap<ChunkCoord, u64>,
    counter: u64,
}

impl RemeshTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stamps every chunk in `chunks` with a new revision and returns it.
    pub fn bump(&mut self, chunks: &[ChunkCoord]) -> u64 {
        self.counter = self.counter.wrapping_add(1).max(1);
        let stamp = self.counter;
        for &c in chunks {
            self.rev.insert(c, stamp);
        }
        stamp
    }

    pub fn get_rev(&self, c: ChunkCoord) -> u64 {
        self.rev.get(&c).copied().unwrap_or(0)
    }

    pub fn get_built_rev(&self, c: ChunkCoord) -> u64 {
        self.built.get(&c).copied().unwrap_or(0)
    }

    pub fn mark_built(&mut self, c: ChunkCoord, rev: u64) {
        // Only update if this is a newer revision
        let e = self.built.entry(c).or_insert(0);
        if rev > *e {
            *e = rev;
        }
    }

    pub fn needs_rebuild(&self, c: ChunkCoord) -> bool {
        self.get_rev(c) > self.get_built_rev(c)
    }

    /// Stale chunks in ascending coordinate order.
    pub fn pending(&self) -> Vec<ChunkCoord> {
        let mut out: Vec<ChunkCoord> = self.rev.keys().copied().filter(|&c| self.needs_rebuild(c)).collect();
        out.sort_unstable();
        out
    }

    /// Forget all stamps, e.g. after the whole world was regenerated.
    pub fn reset(&mut self) {
        self.rev.clear();
        self.built.clear();
    }
}
