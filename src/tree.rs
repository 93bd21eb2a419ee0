// Copyright (C) 2021 Quentin Kniep <hello@quentinkniep.com>
// Distributed under terms of the MIT license.

//! The two Merkle-shaped structures MBPQS builds on top of WOTS+ and the
//! L-tree compressor: the fixed-height root tree (one per key, authenticates
//! channel creation) and the comb-shaped chain tree (one per channel per
//! layer, authenticates messages and the next layer's chain tree).

use crate::address::{AddrType, Address, SubTreeAddress};
use crate::hash::{h_into, PrecomputedHashes};
use crate::ltree::l_tree_into;
use crate::params::Params;
use crate::parallel;
use crate::wots::wots_pk_gen_into;

/// Computes the leaf of a WOTS+/L-tree pair: generates the WOTS+ public key
/// under `ots_addr`, then compresses it with `l_tree_into` under
/// `ltree_addr`, writing the `n`-byte leaf into `out`. `pk_scratch` is a
/// `wotsLen * n`-byte buffer owned by the caller and reused across calls,
/// so no allocation happens on this hot path.
fn gen_leaf_into(
    params: &Params,
    ph: &PrecomputedHashes,
    ltree_addr: &mut Address,
    ots_addr: &mut Address,
    pk_scratch: &mut [u8],
    out: &mut [u8],
) {
    wots_pk_gen_into(params, ph, ots_addr, pk_scratch);
    l_tree_into(params, pk_scratch, ph, ltree_addr, out);
}

/// A full binary Merkle tree of height `rootH` over `2^rootH` WOTS+/L-tree
/// leaves, authenticating channel creation. Stored flattened, level by
/// level, leaves first: `node(h, i)` sits at
/// `n * (2^(H+1) - 2^(H+1-h) + i)`.
pub struct RootTree {
    height: u32,
    n: u32,
    buf: Vec<u8>,
}

impl RootTree {
    fn offset(&self, height: u32, idx: u64) -> usize {
        let n = self.n as u64;
        let total = 1u64 << (self.height + 1);
        let level_start = total - (1u64 << (self.height + 1 - height));
        (n * (level_start + idx)) as usize
    }

    /// Returns the node at (`height`, `idx`), `height` in `0..=rootH`.
    pub fn node(&self, height: u32, idx: u64) -> &[u8] {
        let off = self.offset(height, idx);
        &self.buf[off..off + self.n as usize]
    }

    fn node_mut(&mut self, height: u32, idx: u64) -> &mut [u8] {
        let off = self.offset(height, idx);
        &mut self.buf[off..off + self.n as usize]
    }

    /// The root node, `node(rootH, 0)`.
    pub fn root(&self) -> &[u8] {
        self.node(self.height, 0)
    }

    /// The authentication path for leaf `idx`: `rootH` sibling nodes,
    /// bottom to top.
    pub fn auth_path(&self, idx: u64) -> Vec<u8> {
        let n = self.n as usize;
        let mut path = vec![0u8; n * self.height as usize];
        for h in 0..self.height {
            let sibling = (idx >> h) ^ 1;
            path[h as usize * n..(h as usize + 1) * n].copy_from_slice(self.node(h, sibling));
        }
        path
    }
}

/// Generates a root tree for `ph`'s seeds, using `threads` worker threads
/// for leaf generation (`0` selects `available_parallelism()`).
#[tracing::instrument(level = "debug", skip(params, ph))]
pub fn gen_root_tree(params: &Params, ph: &PrecomputedHashes, threads: u32) -> RootTree {
    let height = params.root_h();
    tracing::debug!(height, leaves = 1u64 << height, "generating root tree");
    let n = params.n();
    let leaf_count = 1u64 << height;
    let buf_len = ((1u64 << (height + 1)) - 1) as usize * n as usize;
    let mut rt = RootTree {
        height,
        n,
        buf: vec![0u8; buf_len],
    };

    let base_addr = Address::for_subtree(SubTreeAddress { layer: 0, tree: 0 });

    {
        let leaves_off = rt.offset(0, 0);
        let leaves_len = leaf_count as usize * n as usize;
        let leaves = &mut rt.buf[leaves_off..leaves_off + leaves_len];
        let pk_len = (params.wots_len() * params.n()) as usize;
        parallel::fill_leaves(
            leaves,
            leaf_count as u32,
            n as usize,
            threads,
            || vec![0u8; pk_len],
            |pk, idx, out| {
                let mut ots_addr = base_addr;
                ots_addr.set_type(AddrType::Ots);
                ots_addr.set_ots(idx);
                let mut ltree_addr = base_addr;
                ltree_addr.set_type(AddrType::LTree);
                ltree_addr.set_ltree(idx);
                gen_leaf_into(params, ph, &mut ltree_addr, &mut ots_addr, pk, out);
            },
        );
    }

    let mut node_addr = base_addr;
    node_addr.set_type(AddrType::Tree);
    for height in 1..=rt.height {
        node_addr.set_tree_height(height - 1);
        for idx in 0..(1u64 << (rt.height - height)) {
            node_addr.set_tree_index(idx as u32);
            let mut left = [0u8; 64];
            let mut right = [0u8; 64];
            let nlen = n as usize;
            left[..nlen].copy_from_slice(rt.node(height - 1, 2 * idx));
            right[..nlen].copy_from_slice(rt.node(height - 1, 2 * idx + 1));
            h_into(ph, &left[..nlen], &right[..nlen], &mut node_addr, rt.node_mut(height, idx));
        }
    }

    rt
}

/// A comb-shaped tree of `height` WOTS+/L-tree leaves, one per channel per
/// layer: `node(0,0)` is the last leaf signed, `node(h,1)` for
/// `h = 0..height-2` are the other leaves in descending signing order, and
/// `node(h,0)` for `h >= 1` is the running combiner
/// `H(node(h-1,0), node(h-1,1))`. See [`leaf`](ChainTree::leaf) and
/// [`next_auth_node`](ChainTree::next_auth_node) for the signing/verifying
/// contract.
pub struct ChainTree {
    height: u32,
    n: u32,
    buf: Vec<u8>,
}

impl ChainTree {
    fn offset(&self, height: u32, idx: u32) -> usize {
        self.n as usize * (2 * height as usize + idx as usize)
    }

    /// Returns the node at (`height`, `idx`).
    pub fn node(&self, height: u32, idx: u32) -> &[u8] {
        let off = self.offset(height, idx);
        &self.buf[off..off + self.n as usize]
    }

    fn node_mut(&mut self, height: u32, idx: u32) -> &mut [u8] {
        let off = self.offset(height, idx);
        &mut self.buf[off..off + self.n as usize]
    }

    /// The number of leaves (signatures) this chain tree can produce.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// The signing leaf for sequence number `s` (`0 <= s < height`):
    /// `node(0, 0)` for the final index `height - 1`, otherwise
    /// `node(height - 2 - s, 1)`.
    pub fn leaf(&self, s: u32) -> &[u8] {
        if s == self.height - 1 {
            self.node(0, 0)
        } else {
            self.node(self.height - 2 - s, 1)
        }
    }

    /// The single node a signature at sequence number `s` must carry to let
    /// a streaming verifier combine it with the signed leaf and advance its
    /// trusted node one level up the comb: `node(0, 1)` for the final index,
    /// otherwise `node(height - 2 - s, 0)`.
    pub fn next_auth_node(&self, s: u32) -> &[u8] {
        if s == self.height - 1 {
            self.node(0, 1)
        } else {
            self.node(self.height - 2 - s, 0)
        }
    }

    /// The root node, `node(height - 1, 0)`.
    pub fn root(&self) -> &[u8] {
        self.node(self.height - 1, 0)
    }
}

/// Generates a chain tree at `chan_layer` for channel `chan_idx`, using
/// `threads` worker threads for leaf generation.
#[tracing::instrument(level = "debug", skip(params, ph))]
pub fn gen_chain_tree(
    params: &Params,
    ph: &PrecomputedHashes,
    chan_idx: u32,
    chan_layer: u32,
    threads: u32,
) -> ChainTree {
    let height = params.chain_tree_height(chan_layer);
    tracing::debug!(height, chan_idx, chan_layer, "generating chain tree");
    let n = params.n();
    let buf_len = (2 * height - 1) as usize * n as usize;
    let mut ct = ChainTree {
        height,
        n,
        buf: vec![0u8; buf_len],
    };

    let base_addr = Address::for_subtree(SubTreeAddress {
        layer: chan_layer,
        tree: chan_idx as u64,
    });

    {
        let nlen = n as usize;
        // Leaves live at node(0,1)..node(height-2,1), plus node(0,0) for
        // the final index; these fill indices 1, 3, 5, ... of the buffer
        // except for index 0 which instead gets the final leaf. We
        // generate them directly by (height, col) rather than through the
        // buffer's physical layout, since they are not contiguous.
        let mut scratch = vec![0u8; height as usize * nlen];
        let pk_len = (params.wots_len() * params.n()) as usize;
        parallel::fill_leaves(
            &mut scratch,
            height,
            nlen,
            threads,
            || vec![0u8; pk_len],
            |pk, idx, out| {
                let mut ots_addr = base_addr;
                ots_addr.set_type(AddrType::Ots);
                ots_addr.set_ots(idx);
                let mut ltree_addr = base_addr;
                ltree_addr.set_type(AddrType::LTree);
                ltree_addr.set_ltree(idx);
                gen_leaf_into(params, ph, &mut ltree_addr, &mut ots_addr, pk, out);
            },
        );
        for s in 0..height {
            let leaf = &scratch[s as usize * nlen..(s as usize + 1) * nlen];
            if s == height - 1 {
                ct.node_mut(0, 0).copy_from_slice(leaf);
            } else {
                let h = height - 2 - s;
                ct.node_mut(h, 1).copy_from_slice(leaf);
            }
        }
    }

    let mut node_addr = base_addr;
    node_addr.set_type(AddrType::Tree);
    for height in 1..ct.height {
        node_addr.set_tree_height(height - 1);
        node_addr.set_tree_index(0);
        let nlen = n as usize;
        let mut left = [0u8; 64];
        let mut right = [0u8; 64];
        left[..nlen].copy_from_slice(ct.node(height - 1, 0));
        right[..nlen].copy_from_slice(ct.node(height - 1, 1));
        h_into(ph, &left[..nlen], &right[..nlen], &mut node_addr, ct.node_mut(height, 0));
    }

    ct
}
