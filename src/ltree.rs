// Copyright (C) 2021 Quentin Kniep <hello@quentinkniep.com>
// Distributed under terms of the MIT license.

//! The L-tree compressor: folds a WOTS+ public key (`wots_len` n-byte
//! chains) into a single n-byte leaf via an unbalanced binary tree.

use crate::address::Address;
use crate::hash::{h_into, PrecomputedHashes};
use crate::params::Params;

/// Compresses `wots_pk` (`wots_len * n` bytes) into a single `n`-byte leaf,
/// destroying `wots_pk` in place (the buffer doubles as scratch space for
/// the intermediate tree levels). Writes the leaf into the first `n` bytes
/// of `out` (`out.len() >= n`).
pub fn l_tree_into(params: &Params, wots_pk: &mut [u8], ph: &PrecomputedHashes, addr: &mut Address, out: &mut [u8]) {
    let n = params.n() as usize;
    let mut height = 0u32;
    let mut l = params.wots_len() as usize;

    let mut left = [0u8; 64];
    let mut right = [0u8; 64];
    while l > 1 {
        addr.set_tree_height(height);
        let parent_nodes = l >> 1;
        for i in 0..parent_nodes {
            addr.set_tree_index(i as u32);
            left[..n].copy_from_slice(&wots_pk[2 * i * n..(2 * i + 1) * n]);
            right[..n].copy_from_slice(&wots_pk[(2 * i + 1) * n..(2 * i + 2) * n]);
            h_into(ph, &left[..n], &right[..n], addr, &mut wots_pk[i * n..(i + 1) * n]);
        }
        if l & 1 == 1 {
            // Odd node count: promote the dangling last node unchanged.
            wots_pk.copy_within((l - 1) * n..l * n, (l >> 1) * n);
            l = (l >> 1) + 1;
        } else {
            l >>= 1;
        }
        height += 1;
    }

    out[..n].copy_from_slice(&wots_pk[..n]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address::SubTreeAddress;

    #[test]
    fn deterministic_for_odd_wots_len() {
        // wots_len(w=16, n=32) = 67, an odd chain count, so this exercises
        // the dangling-node promotion path.
        let p = Params::new(32, 16, 10, 1, 0).unwrap();
        let pub_seed = vec![7u8; 32];
        let ph = PrecomputedHashes::new(&p, &pub_seed, None);

        let make_pk = || -> Vec<u8> {
            (0..(p.wots_len() as usize * p.n() as usize))
                .map(|i| i as u8)
                .collect()
        };

        let mut out1 = [0u8; 32];
        let mut addr1 = Address::for_subtree(SubTreeAddress { layer: 0, tree: 0 });
        l_tree_into(&p, &mut make_pk(), &ph, &mut addr1, &mut out1);

        let mut out2 = [0u8; 32];
        let mut addr2 = Address::for_subtree(SubTreeAddress { layer: 0, tree: 0 });
        l_tree_into(&p, &mut make_pk(), &ph, &mut addr2, &mut out2);

        assert_eq!(out1, out2);
    }

    #[test]
    fn matches_spec_vector() {
        let p = Params::new(32, 16, 10, 1, 0).unwrap();
        let pub_seed: Vec<u8> = (0..32u8).map(|i| 2 * i).collect();
        let ph = PrecomputedHashes::new(&p, &pub_seed, None);

        let mut words = [0u32; 8];
        for (i, w) in words.iter_mut().enumerate() {
            *w = 500_000_000u32.wrapping_mul(i as u32);
        }
        let mut addr = Address::from_words(words);

        let mut pk: Vec<u8> = (0..(p.wots_len() as usize * p.n() as usize))
            .map(|i| i as u8)
            .collect();
        let mut out = [0u8; 32];
        l_tree_into(&p, &mut pk, &ph, &mut addr, &mut out);
        assert_eq!(
            hex::encode(out),
            "c6686977111a5ecd45156ddc0230d71a6149fc9d640619e617efa10f406367a9"
        );
    }
}
