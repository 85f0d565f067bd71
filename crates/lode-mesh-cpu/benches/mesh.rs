use criterion::{Criterion, black_box, criterion_group, criterion_main};
use std::time::Duration;

use lode_blocks::MaterialTable;
use lode_lighting::{LightConfig, LightQueues, propagate};
use lode_mesh_cpu::{MeshOptions, mesh_chunk};
use lode_store::{ChunkCoord, Dims, Heightmap, VoxelStore};
use lode_world::{GenParams, TerrainType, generate};

fn world(terrain: TerrainType) -> VoxelStore {
    let dims = Dims::new(64, 64, 64);
    let mut store = VoxelStore::new(dims);
    let mut hm = Heightmap::new(dims);
    generate(&mut store, &mut hm, 1337, terrain, &GenParams::default());
    let mut q = LightQueues::new(dims);
    propagate(&mut store, &MaterialTable::builtin(), &LightConfig::default(), &mut q);
    store
}

fn bench_mesh_chunk_noise(c: &mut Criterion) {
    let mut group = c.benchmark_group("mesh_chunk_noise");
    let store = world(TerrainType::Noise);
    let opts = MeshOptions::default();
    group.bench_function("noise_64_chunk32", |b| {
        b.iter(|| {
            let out = mesh_chunk(&store, 32, ChunkCoord::new(0, 0, 0), &opts);
            black_box(out)
        })
    });
    group.finish();
}

fn bench_mesh_all_sphere(c: &mut Criterion) {
    let mut group = c.benchmark_group("mesh_all_sphere");
    let store = world(TerrainType::Sphere);
    let opts = MeshOptions::default();
    group.bench_function("sphere_64_chunk16", |b| {
        b.iter(|| {
            let mut quads = 0;
            for cz in 0..4 {
                for cy in 0..4 {
                    for cx in 0..4 {
                        if let Ok(m) = mesh_chunk(&store, 16, ChunkCoord::new(cx, cy, cz), &opts) {
                            quads += m.quad_count();
                        }
                    }
                }
            }
            black_box(quads)
        })
    });
    group.finish();
}

fn long_config() -> Criterion {
    Criterion::default()
        .measurement_time(Duration::from_secs(20))
        .warm_up_time(Duration::from_secs(5))
        .sample_size(20)
}

criterion_group! {
    name = benches;
    config = long_config();
    targets =
        bench_mesh_chunk_noise,
        bench_mesh_all_sphere
}
criterion_main!(benches);
