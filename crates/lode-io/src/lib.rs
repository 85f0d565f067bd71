//! Whole-world snapshots: raw store bytes through a compression worker.
#![forbid(unsafe_code)]

mod worker;

pub use worker::{
    Codec, CompressionOp, CompressionRequest, CompressionResponse, CompressionWorker, MAX_PARKED, Ticket, Zlib,
};

use std::time::Instant;

use lode_store::{Heightmap, VoxelStore};
use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IoError {
    #[error("import holds {actual} bytes, world needs {expected}")]
    MalformedImport { expected: usize, actual: usize },
    #[error("compression failed: {0}")]
    Compression(String),
    #[error("compression worker is gone")]
    WorkerGone,
    #[error("ticket {0} is not outstanding on this worker")]
    UnknownTicket(u64),
}

/// What import does with the light bytes in the snapshot.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImportLight {
    /// Restore light verbatim.
    #[default]
    Trust,
    /// Discard it and run a full propagation after import.
    Relight,
}

/// Copies the store and queues it for deflate. The store may change while
/// the request is in flight.
pub fn begin_export(store: &VoxelStore, worker: &mut CompressionWorker) -> Result<Ticket, IoError> {
    worker.submit(CompressionOp::Deflate, store.raw().to_vec())
}

pub fn export(store: &VoxelStore, worker: &mut CompressionWorker) -> Result<Vec<u8>, IoError> {
    let t0 = Instant::now();
    let ticket = begin_export(store, worker)?;
    let out = worker.wait(ticket)?;
    log::info!(target: "perf", "ms={} export raw={} packed={}", t0.elapsed().as_millis(), store.raw().len(), out.len());
    Ok(out)
}

/// Inflates `bytes`, checks the length against the store and only then
/// overwrites it and rebuilds the heightmap. On error nothing is touched.
/// Decompression stops one byte past the store size, so an oversized blob
/// reports `actual == expected + 1`.
pub fn import(
    store: &mut VoxelStore,
    heightmap: &mut Heightmap,
    worker: &mut CompressionWorker,
    bytes: &[u8],
) -> Result<(), IoError> {
    let t0 = Instant::now();
    let expected = store.dims().byte_len();
    let raw = worker.request(CompressionOp::Inflate { limit: expected + 1 }, bytes.to_vec())?;
    if raw.len() != expected {
        return Err(IoError::MalformedImport { expected, actual: raw.len() });
    }
    store
        .replace_bytes(&raw)
        .map_err(|_| IoError::MalformedImport { expected, actual: raw.len() })?;
    heightmap.rebuild(store);
    log::info!(target: "perf", "ms={} import packed={} raw={}", t0.elapsed().as_millis(), bytes.len(), raw.len());
    Ok(())
}
