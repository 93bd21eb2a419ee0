// Copyright (C) 2021 Quentin Kniep <hello@quentinkniep.com>
// Distributed under terms of the MIT license.

//! The three signature flavors MBPQS produces, and the shared
//! `NextAuthNode` contract that lets a verifier track a channel's trusted
//! anchor across a stream of signatures without replaying it from scratch.

/// Authenticates the creation of a channel: a WOTS+ signature (under a
/// root-tree leaf) over the new channel's first chain-tree root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RootSignature {
    /// The root-tree leaf index (== `PrivateKey.seqNo` at the time of signing).
    pub seq_no: u64,
    /// The WOTS+ signature over `root_hash`.
    pub wots_sig: Vec<u8>,
    /// The root tree's authentication path (`rootH` concatenated siblings).
    pub auth_path: Vec<u8>,
    /// The chain-tree root this signature authenticates.
    pub root_hash: Vec<u8>,
}

impl RootSignature {
    /// The chain-tree root authenticated by this signature.
    pub fn signed_root(&self) -> &[u8] {
        &self.root_hash
    }
}

/// Authenticates a single application message: a WOTS+ signature (under a
/// chain-tree leaf) over `H_msg(drv, root, sigIdx, msg)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MsgSignature {
    /// The channel this signature belongs to.
    pub chan_idx: u32,
    /// The chain-tree layer the signing key was drawn from.
    pub layer: u32,
    /// The leaf index within that chain tree.
    pub chain_seq_no: u32,
    /// The channel-wide signature counter at the time of signing.
    pub seq_no: u64,
    /// The per-signature randomizer fed into `H_msg`.
    pub drv: Vec<u8>,
    /// The WOTS+ signature over the hashed message.
    pub wots_sig: Vec<u8>,
    /// The chain tree's single auth node for this leaf position.
    pub auth_path: Vec<u8>,
}

/// Authenticates the creation of the next chain tree in a channel: a WOTS+
/// signature (under the reserved last leaf of the current chain tree) over
/// the new chain tree's root, signed directly (no `H_msg`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrowSignature {
    /// The chain-tree layer the signing (reserved) key was drawn from.
    pub layer: u32,
    /// The channel this signature belongs to.
    pub chan_idx: u32,
    /// The reserved leaf's index within the old chain tree
    /// (`chainTreeHeight(layer) - 1`).
    pub chain_seq_no: u32,
    /// The WOTS+ signature over `root_hash`.
    pub wots_sig: Vec<u8>,
    /// The new chain tree's root.
    pub root_hash: Vec<u8>,
}

impl GrowSignature {
    /// The chain-tree root authenticated by this signature.
    pub fn signed_root(&self) -> &[u8] {
        &self.root_hash
    }
}

/// Any of the three signature flavors, for code that dispatches over the
/// `NextAuthNode` contract without caring which flavor it holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Signature {
    Root(RootSignature),
    Msg(MsgSignature),
    Grow(GrowSignature),
}

impl Signature {
    /// The anchor a streaming verifier should trust for the *next*
    /// signature in this channel, given the anchor it trusted for this one
    /// (only consulted by the `Msg` variant's last-leaf case).
    ///
    /// - After a `Root` signature: the chain-tree root it signed.
    /// - After a `Grow` signature: the chain-tree root it signed.
    /// - After a `Msg` signature: its auth node, unless it was the chain
    ///   tree's last leaf (`chainSeqNo == height - 1`), in which case the
    ///   anchor is unchanged -- the next signature will be a `Grow`
    ///   authenticated against that same unchanged anchor.
    pub fn next_auth_node(&self, prev_anchor: &[u8], chain_height: u32) -> Vec<u8> {
        match self {
            Signature::Root(sig) => sig.root_hash.clone(),
            Signature::Grow(sig) => sig.root_hash.clone(),
            Signature::Msg(sig) => {
                if sig.chain_seq_no == chain_height - 1 {
                    prev_anchor.to_vec()
                } else {
                    sig.auth_path.clone()
                }
            }
        }
    }
}
