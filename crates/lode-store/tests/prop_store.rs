use lode_blocks::Voxel;
use lode_store::{ChunkCoord, ChunkWindow, Dims, Heightmap, NEIGHBORS, VoxelStore};
use proptest::prelude::*;

fn dim() -> impl Strategy<Value = usize> {
    1usize..=6
}

fn dims() -> impl Strategy<Value = Dims> {
    (dim(), dim(), dim()).prop_map(|(w, h, d)| Dims::new(w, h, d))
}

proptest! {
    // index maps each (x,y,z) within bounds to a unique in-range slot and coords inverts it
    #[test]
    fn index_is_unique_and_invertible(d in dims()) {
        let mut seen = vec![false; d.volume()];
        for z in 0..d.depth as i32 {
            for y in 0..d.height as i32 {
                for x in 0..d.width as i32 {
                    let i = d.index(x, y, z).unwrap();
                    prop_assert!(i < d.volume());
                    prop_assert!(!seen[i]);
                    seen[i] = true;
                    prop_assert_eq!(d.coords(i), (x, y, z));
                }
            }
        }
        prop_assert!(seen.into_iter().all(|b| b));
    }

    // neighbor agrees with stepping coordinates and contains()
    #[test]
    fn neighbor_matches_coordinate_step(d in dims(), seed in any::<u64>()) {
        let i = (seed % d.volume() as u64) as usize;
        let (x, y, z) = d.coords(i);
        for (n, (dx, dy, dz)) in NEIGHBORS.iter().enumerate() {
            let expect = d.index(x + dx, y + dy, z + dz);
            prop_assert_eq!(d.neighbor(i, n), expect);
            prop_assert_eq!(expect.is_some(), d.contains(x + dx, y + dy, z + dz));
        }
    }

    // rebuild equals a brute-force top-down scan for random fills
    #[test]
    fn heightmap_rebuild_matches_scan(d in dims(), cells in prop::collection::vec(any::<bool>(), 216)) {
        let mut s = VoxelStore::new(d);
        for i in 0..d.volume() {
            if cells[i] { s.set_at(i, Voxel::solid(1, 0, 0, 0)); }
        }
        let mut hm = Heightmap::new(d);
        hm.rebuild(&s);
        for z in 0..d.depth {
            for x in 0..d.width {
                let top = (0..d.height as i32).rev()
                    .find(|&y| !s.get(x as i32, y, z as i32).unwrap().is_air())
                    .unwrap_or(0) as u32;
                prop_assert_eq!(hm.get(x, z), top);
            }
        }
    }

    // chunk windows tile the world exactly once
    #[test]
    fn windows_tile_world(n in (1usize..=3, 1usize..=2, 1usize..=3), size in 1usize..=4) {
        let d = Dims::new(n.0 * size, n.1 * size, n.2 * size);
        let mut hits = vec![0u8; d.volume()];
        let [cx, cy, cz] = ChunkWindow::chunk_counts(d, size);
        for z in 0..cz {
            for y in 0..cy {
                for x in 0..cx {
                    let w = ChunkWindow::new(d, size, ChunkCoord::new(x, y, z)).unwrap();
                    for (wx, wy, wz) in w.world_positions() {
                        prop_assert!(w.contains_world(wx, wy, wz));
                        hits[d.index(wx, wy, wz).unwrap()] += 1;
                    }
                }
            }
        }
        prop_assert!(hits.iter().all(|&h| h == 1));
    }
}
