// Copyright (C) 2021 Quentin Kniep <hello@quentinkniep.com>
// Distributed under terms of the MIT license.

//! The 32-byte structured address used to domain-separate every hash call.
//!
//! Logically eight big-endian 32-bit words:
//! `[layer | tree_hi | tree_lo | type | f4 | f5 | f6 | key_and_mask]`.
//! `type` selects how words 4-6 are interpreted:
//! - `Ots`: `(ots, chain, hash)`
//! - `LTree`: `(ltree, tree_height, tree_index)`
//! - `Tree`: `(_, tree_height, tree_index)`

/// The `type` field discriminant, reinterpreting words 4-6 of an [`Address`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum AddrType {
    /// WOTS+ chain-step address: `(ots, chain, hash)`.
    Ots = 0,
    /// L-tree compression address: `(ltree, tree_height, tree_index)`.
    LTree = 1,
    /// Merkle-tree internal-node address: `(_, tree_height, tree_index)`.
    Tree = 2,
}

/// A position in the subtree hierarchy: which layer and which tree (channel
/// index, or 0 for the root tree) an address belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SubTreeAddress {
    /// The root tree has layer 0; channel chain trees start at layer 1.
    pub layer: u32,
    /// The index of the tree within its layer (the channel index for chain
    /// trees; 0 for the root tree).
    pub tree: u64,
}

/// The 32-byte structured address, held as eight big-endian 32-bit words.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Address([u32; 8]);

impl Address {
    /// Builds an address directly from its eight raw words. Exposed for
    /// tests that reproduce fixed test-vector addresses byte-for-byte;
    /// production code should go through the typed setters instead.
    #[cfg(test)]
    pub(crate) fn from_words(words: [u32; 8]) -> Self {
        Self(words)
    }

    /// An address for the given subtree, with all other fields zeroed.
    pub fn for_subtree(sta: SubTreeAddress) -> Self {
        let mut addr = Self::default();
        addr.set_layer(sta.layer);
        addr.set_tree(sta.tree);
        addr
    }

    /// Sets the `layer` field (word 0).
    pub fn set_layer(&mut self, layer: u32) {
        self.0[0] = layer;
    }

    /// Sets the `tree` field (words 1-2) from a 64-bit tree index.
    pub fn set_tree(&mut self, tree: u64) {
        self.0[1] = (tree >> 32) as u32;
        self.0[2] = tree as u32;
    }

    /// Sets the `type` field (word 3).
    pub fn set_type(&mut self, ty: AddrType) {
        self.0[3] = ty as u32;
    }

    /// Sets the `key_and_mask` field (word 7): 0 selects the chain key, 1/2
    /// select bitmasks.
    pub fn set_key_and_mask(&mut self, key_and_mask: u32) {
        self.0[7] = key_and_mask;
    }

    /// Copies the `layer` and `tree` fields from another address, leaving
    /// everything else untouched.
    pub fn set_subtree_from(&mut self, other: &Address) {
        self.0[0] = other.0[0];
        self.0[1] = other.0[1];
        self.0[2] = other.0[2];
    }

    /// Sets the `ots` field (word 4): which WOTS+ key, as a leaf index.
    pub fn set_ots(&mut self, ots: u32) {
        self.0[4] = ots;
    }

    /// Sets the `chain` field (word 5): which of the `wots_len` hash chains.
    pub fn set_chain(&mut self, chain: u32) {
        self.0[5] = chain;
    }

    /// Sets the `hash` field (word 6): the current step within a chain.
    pub fn set_hash(&mut self, hash: u32) {
        self.0[6] = hash;
    }

    /// Sets the `ltree` field (word 4): alias of `ots` under `AddrType::LTree`.
    pub fn set_ltree(&mut self, ltree: u32) {
        self.0[4] = ltree;
    }

    /// Sets the `tree_height` field (word 5).
    pub fn set_tree_height(&mut self, tree_height: u32) {
        self.0[5] = tree_height;
    }

    /// Sets the `tree_index` field (word 6).
    pub fn set_tree_index(&mut self, tree_index: u32) {
        self.0[6] = tree_index;
    }

    /// Writes the big-endian encoding of this address into `buf[..32]`.
    pub fn write_into(&self, buf: &mut [u8]) {
        debug_assert!(buf.len() >= 32);
        for (i, word) in self.0.iter().enumerate() {
            buf[i * 4..(i + 1) * 4].copy_from_slice(&word.to_be_bytes());
        }
    }
}
