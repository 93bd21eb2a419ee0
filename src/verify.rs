// Copyright (C) 2021 Quentin Kniep <hello@quentinkniep.com>
// Distributed under terms of the MIT license.

//! Verification of the three signature flavors. Every routine recovers a
//! WOTS+ public key from the signature, compresses it through the L-tree,
//! climbs the remaining tree structure, and finishes with a constant-time
//! comparison against the caller-supplied anchor -- never a fast-exit
//! byte-by-byte comparison, which would leak how many leading bytes of a
//! forgery attempt matched.

use subtle::ConstantTimeEq;

use crate::address::{AddrType, Address, SubTreeAddress};
use crate::hash::{h_into, h_msg_into, PrecomputedHashes};
use crate::key::PublicKey;
use crate::ltree::l_tree_into;
use crate::signature::{GrowSignature, MsgSignature, RootSignature};
use crate::wots::wots_pk_from_sig_into;

fn recover_leaf(pk: &PublicKey, ots_addr: &mut Address, ltree_addr: &mut Address, sig: &[u8], msg: &[u8]) -> Vec<u8> {
    let params = pk.params();
    let ph = PrecomputedHashes::new(params, pk.pub_seed(), None);
    let mut wots_pk = vec![0u8; (params.wots_len() * params.n()) as usize];
    wots_pk_from_sig_into(params, sig, msg, &ph, ots_addr, &mut wots_pk);
    let mut leaf = vec![0u8; params.n() as usize];
    l_tree_into(params, &mut wots_pk, &ph, ltree_addr, &mut leaf);
    leaf
}

/// Verifies that `sig` authenticates `channel_root` as the root of a
/// channel's chain tree, under `pk`'s root tree.
pub fn verify_channel_root(pk: &PublicKey, sig: &RootSignature, channel_root: &[u8]) -> bool {
    let params = pk.params();
    let n = params.n() as usize;
    if sig.wots_sig.len() != params.wots_sig_bytes() as usize {
        return false;
    }
    if sig.auth_path.len() != n * params.root_h() as usize {
        return false;
    }
    if sig.root_hash.as_slice() != channel_root {
        return false;
    }

    let mut ots_addr = Address::for_subtree(SubTreeAddress { layer: 0, tree: 0 });
    ots_addr.set_type(AddrType::Ots);
    ots_addr.set_ots(sig.seq_no as u32);
    let mut ltree_addr = Address::for_subtree(SubTreeAddress { layer: 0, tree: 0 });
    ltree_addr.set_type(AddrType::LTree);
    ltree_addr.set_ltree(sig.seq_no as u32);

    let ph = PrecomputedHashes::new(params, pk.pub_seed(), None);
    let mut cur = recover_leaf(pk, &mut ots_addr, &mut ltree_addr, &sig.wots_sig, channel_root);

    let mut node_addr = Address::for_subtree(SubTreeAddress { layer: 0, tree: 0 });
    node_addr.set_type(AddrType::Tree);
    for h in 1..=params.root_h() {
        let sibling = &sig.auth_path[(h as usize - 1) * n..h as usize * n];
        node_addr.set_tree_height(h - 1);
        node_addr.set_tree_index((sig.seq_no >> h) as u32);
        let mut combined = vec![0u8; n];
        if (sig.seq_no >> (h - 1)) & 1 == 0 {
            h_into(&ph, &cur, sibling, &mut node_addr, &mut combined);
        } else {
            h_into(&ph, sibling, &cur, &mut node_addr, &mut combined);
        }
        cur = combined;
    }

    cur.ct_eq(pk.root()).into()
}

fn chain_node_height(height: u32, chain_seq_no: u32) -> u32 {
    if chain_seq_no == height - 1 {
        0
    } else {
        height - 2 - chain_seq_no
    }
}

/// Verifies that `sig` authenticates `msg`, combining the recovered leaf
/// with its chain-tree auth node and comparing the result against `anchor`
/// (the trusted node for this channel, per the `NextAuthNode` contract).
pub fn verify_msg(pk: &PublicKey, sig: &MsgSignature, msg: &[u8], anchor: &[u8]) -> bool {
    let params = pk.params();
    let n = params.n() as usize;
    if sig.wots_sig.len() != params.wots_sig_bytes() as usize || sig.auth_path.len() != n || sig.drv.len() != n {
        return false;
    }
    let height = params.chain_tree_height(sig.layer);
    if sig.chain_seq_no >= height {
        return false;
    }

    let idx = ((sig.chan_idx as u64) << 32) | sig.seq_no;
    let mut hashed_msg = vec![0u8; n];
    h_msg_into(params.n(), &sig.drv, pk.root(), idx, msg, &mut hashed_msg);

    let mut ots_addr = Address::for_subtree(SubTreeAddress {
        layer: sig.layer,
        tree: sig.chan_idx as u64,
    });
    ots_addr.set_type(AddrType::Ots);
    ots_addr.set_ots(sig.chain_seq_no);
    let mut ltree_addr = Address::for_subtree(SubTreeAddress {
        layer: sig.layer,
        tree: sig.chan_idx as u64,
    });
    ltree_addr.set_type(AddrType::LTree);
    ltree_addr.set_ltree(sig.chain_seq_no);

    let ph = PrecomputedHashes::new(params, pk.pub_seed(), None);
    let cand = recover_leaf(pk, &mut ots_addr, &mut ltree_addr, &sig.wots_sig, &hashed_msg);

    let mut node_addr = Address::for_subtree(SubTreeAddress {
        layer: sig.layer,
        tree: sig.chan_idx as u64,
    });
    node_addr.set_type(AddrType::Tree);
    node_addr.set_tree_height(chain_node_height(height, sig.chain_seq_no));
    node_addr.set_tree_index(0);

    let mut combined = vec![0u8; n];
    if sig.chain_seq_no == height - 1 {
        h_into(&ph, &cand, &sig.auth_path, &mut node_addr, &mut combined);
    } else {
        h_into(&ph, &sig.auth_path, &cand, &mut node_addr, &mut combined);
    }

    combined.ct_eq(anchor).into()
}

/// Verifies that `sig` authenticates its new chain-tree root. The
/// grow-reserved key always signs from chain position `height - 1`, i.e.
/// node `(0, 0)` of the comb -- the node the streaming verifier already
/// trusts by the time the preceding message signature (at position
/// `height - 2`) has verified, since that signature's auth node *is*
/// `(0, 0)`. Verifying a grow signature therefore reduces to recovering
/// the WOTS+ leaf and comparing it against that trusted `anchor` directly,
/// with no further combine step.
pub fn verify_grow(pk: &PublicKey, sig: &GrowSignature, anchor: &[u8]) -> bool {
    let params = pk.params();
    let n = params.n() as usize;
    if sig.wots_sig.len() != params.wots_sig_bytes() as usize || sig.root_hash.len() != n {
        return false;
    }
    let height = params.chain_tree_height(sig.layer);
    if sig.chain_seq_no != height - 1 {
        // the grow-reserved key is always the chain tree's last leaf
        return false;
    }

    let mut ots_addr = Address::for_subtree(SubTreeAddress {
        layer: sig.layer,
        tree: sig.chan_idx as u64,
    });
    ots_addr.set_type(AddrType::Ots);
    ots_addr.set_ots(sig.chain_seq_no);
    let mut ltree_addr = Address::for_subtree(SubTreeAddress {
        layer: sig.layer,
        tree: sig.chan_idx as u64,
    });
    ltree_addr.set_type(AddrType::LTree);
    ltree_addr.set_ltree(sig.chain_seq_no);

    let cand = recover_leaf(pk, &mut ots_addr, &mut ltree_addr, &sig.wots_sig, &sig.root_hash);

    cand.ct_eq(anchor).into()
}
