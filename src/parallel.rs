// Copyright (C) 2021 Quentin Kniep <hello@quentinkniep.com>
// Distributed under terms of the MIT license.

//! Leaf-generation work-splitting driver. Each leaf is a pure function of
//! its index and the key's seeds, so leaves can be filled in any order or
//! grouping; `rayon`'s `par_chunks_mut`/`for_each_init` does the splitting,
//! handing each worker a scratch value (built once via `init`) that it
//! reuses across every leaf it processes. Grounded on the goroutine/
//! shared-counter pool in `original_source/channel.go::genChainTreeInto`,
//! adapted to the teacher's own `rayon` usage in
//! `signature_benchmark/examples/forge_wots.rs`.

use rayon::prelude::*;

fn resolve_threads(threads: u32, count: u32) -> u32 {
    let threads = if threads == 0 {
        std::thread::available_parallelism()
            .map(|n| n.get() as u32)
            .unwrap_or(1)
    } else {
        threads
    };
    threads.clamp(1, count.max(1))
}

/// Fills `buf` (`leaf_count * n` bytes) with `leaf_count` leaves of `n`
/// bytes each, calling `gen_leaf(scratch, idx, out)` once per leaf. `init`
/// builds one scratch value per worker, reused across every leaf that
/// worker handles. Runs across `threads` worker threads (`0` selects
/// `available_parallelism()`); `threads == 1` runs single-threaded with a
/// single scratch value and no synchronization overhead.
pub fn fill_leaves<S, I, F>(buf: &mut [u8], leaf_count: u32, n: usize, threads: u32, init: I, gen_leaf: F)
where
    I: Fn() -> S + Sync + Send,
    F: Fn(&mut S, u32, &mut [u8]) + Sync + Send,
{
    assert_eq!(buf.len(), leaf_count as usize * n);
    if leaf_count == 0 {
        return;
    }

    let threads = resolve_threads(threads, leaf_count);
    if threads == 1 {
        let mut scratch = init();
        for idx in 0..leaf_count {
            gen_leaf(&mut scratch, idx, &mut buf[idx as usize * n..(idx as usize + 1) * n]);
        }
        return;
    }

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(threads as usize)
        .build()
        .expect("failed to build leaf-generation thread pool");
    pool.install(|| {
        buf.par_chunks_mut(n)
            .enumerate()
            .for_each_init(&init, |scratch, (idx, out)| gen_leaf(scratch, idx as u32, out));
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn single_threaded_visits_every_index_exactly_once() {
        let mut buf = vec![0u8; 100];
        let seen = Mutex::new(vec![0u32; 100]);
        fill_leaves(&mut buf, 100, 1, 1, || (), |_, idx, out| {
            seen.lock().unwrap()[idx as usize] += 1;
            out[0] = idx as u8;
        });
        assert!(seen.into_inner().unwrap().iter().all(|&c| c == 1));
        for (i, &b) in buf.iter().enumerate() {
            assert_eq!(b, i as u8);
        }
    }

    #[test]
    fn multi_threaded_visits_every_index_exactly_once() {
        let mut buf = vec![0u8; 4000];
        let seen = Mutex::new(vec![0u32; 1000]);
        fill_leaves(&mut buf, 1000, 4, 6, || (), |_, idx, out| {
            seen.lock().unwrap()[idx as usize] += 1;
            out.copy_from_slice(&(idx as u32).to_be_bytes());
        });
        assert!(seen.into_inner().unwrap().iter().all(|&c| c == 1));
        for (i, chunk) in buf.chunks_exact(4).enumerate() {
            assert_eq!(u32::from_be_bytes(chunk.try_into().unwrap()), i as u32);
        }
    }

    #[test]
    fn threads_zero_defaults_to_available_parallelism() {
        let mut buf = vec![0u8; 50];
        let seen = Mutex::new(vec![0u32; 50]);
        fill_leaves(&mut buf, 50, 1, 0, || (), |_, idx, _| {
            seen.lock().unwrap()[idx as usize] += 1;
        });
        assert!(seen.into_inner().unwrap().iter().all(|&c| c == 1));
    }

    #[test]
    fn worker_scratch_is_shared_across_that_workers_leaves() {
        // Each worker's scratch is a counter seeded at 0; if `gen_leaf`
        // always saw a fresh scratch the recorded values would all be 1,
        // whereas a reused, incrementing scratch produces some value > 1.
        let mut buf = vec![0u8; 2000];
        fill_leaves(&mut buf, 2000, 1, 4, || 0u8, |scratch, _, out| {
            *scratch = scratch.wrapping_add(1);
            out[0] = *scratch;
        });
        assert!(buf.iter().any(|&b| b > 1));
    }
}
