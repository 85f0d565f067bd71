use lode_blocks::types::ids;
use lode_blocks::{MAX_LIGHT, MaterialTable, Voxel};
use lode_lighting::{LightConfig, LightQueues, flood, propagate, remove};
use lode_store::{Dims, NEIGHBORS, VoxelStore};
use proptest::prelude::*;

const N: usize = 10;

fn world() -> impl Strategy<Value = Vec<(u8, u8)>> {
    // (cell, kind) pairs: kind 0..6 stone, 6 emitter; cell indexes the store
    prop::collection::vec((any::<u8>(), 0u8..7), 0..120)
}

fn build(cells: &[(u8, u8)]) -> VoxelStore {
    let mut s = VoxelStore::new(Dims::new(N, N, N));
    let vol = s.dims().volume();
    for &(c, kind) in cells {
        let i = (c as usize * 7 + kind as usize * 131) % vol;
        let ty = if kind == 6 { ids::LIGHT } else { ids::STONE };
        s.set_at(i, Voxel::solid(ty, 10, 10, 10));
    }
    s
}

fn lit(cells: &[(u8, u8)], cfg: &LightConfig) -> (VoxelStore, LightQueues) {
    let mut s = build(cells);
    let mut q = LightQueues::new(s.dims());
    propagate(&mut s, &MaterialTable::builtin(), cfg, &mut q);
    (s, q)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    // No light byte ever exceeds the cap
    #[test]
    fn light_stays_in_range(cells in world(), att in 1u8..4) {
        let cfg = LightConfig { attenuation: att, ..LightConfig::default() };
        let (s, _) = lit(&cells, &cfg);
        prop_assert!(s.lights().all(|(_, l)| l <= MAX_LIGHT));
    }

    // Adjacent empty voxels never differ by more than one attenuation step
    #[test]
    fn adjacent_air_is_smooth(cells in world(), att in 1u8..4) {
        let cfg = LightConfig { attenuation: att, ..LightConfig::default() };
        let (s, _) = lit(&cells, &cfg);
        let d = s.dims();
        for i in 0..d.volume() {
            if !s.is_air_at(i) { continue; }
            let (x, y, z) = d.coords(i);
            for (dx, dy, dz) in NEIGHBORS {
                let Some(j) = d.index(x + dx, y + dy, z + dz) else { continue };
                if !s.is_air_at(j) { continue; }
                let diff = s.light_at(i).abs_diff(s.light_at(j));
                prop_assert!(diff <= att, "{} vs {} at {:?}", s.light_at(i), s.light_at(j), (x, y, z));
            }
        }
    }

    // Placing an emitter then taking it out incrementally matches a full relight
    #[test]
    fn place_then_remove_matches_full_relight(cells in world(), at in any::<u16>()) {
        let cfg = LightConfig::default();
        let mats = MaterialTable::builtin();
        let (mut s, mut q) = lit(&cells, &cfg);
        let before = s.raw().to_vec();
        let i = at as usize % s.dims().volume();
        prop_assume!(s.is_air_at(i));

        s.set_at(i, Voxel { light: MAX_LIGHT, ..Voxel::solid(ids::LIGHT, 1, 2, 3) });
        flood(&mut s, &cfg, &mut q, [i]);

        let level = s.light_at(i);
        s.set_at(i, Voxel::AIR);
        remove(&mut s, &mats, &cfg, &mut q, i, level);
        let d = s.dims();
        let (x, y, z) = d.coords(i);
        let seeds: Vec<usize> = NEIGHBORS
            .iter()
            .filter_map(|&(dx, dy, dz)| d.index(x + dx, y + dy, z + dz))
            .filter(|&j| s.light_at(j) > 0)
            .collect();
        flood(&mut s, &cfg, &mut q, seeds);

        prop_assert_eq!(s.raw(), &before[..]);
    }
}
