// Copyright (C) 2021 Quentin Kniep <hello@quentinkniep.com>
// Distributed under terms of the MIT license.

//! The key-manager layer: `Context` (parameters, precomputed hashes, and
//! the root tree), `PrivateKey`/`PublicKey`, and the four top-level
//! operations (`GenerateKeyPair`, `AddChannel`, `SignMsg`, `GrowChannel`)
//! that drive them.

use std::sync::{Mutex, RwLock};

use crate::address::{AddrType, Address, SubTreeAddress};
use crate::channel::Channel;
use crate::error::{Error, Result};
use crate::hash::{h_msg_into, prf_uint64_into, PrecomputedHashes};
use crate::params::Params;
use crate::random::RandomSource;
use crate::signature::{GrowSignature, MsgSignature, RootSignature};
use crate::tree::{gen_chain_tree, gen_root_tree, RootTree};
use crate::wots::wots_sign_into;

/// Immutable, shared context: parameters, precomputed hash state, and the
/// worker-thread count used for leaf generation.
pub struct Context {
    params: Params,
    threads: u32,
}

impl Context {
    /// Builds a context for `params`, using `threads` worker threads for
    /// leaf generation (`0` selects `available_parallelism()`).
    pub fn new(params: Params, threads: u32) -> Self {
        Self { params, threads }
    }

    pub fn params(&self) -> &Params {
        &self.params
    }
}

fn sig_idx(chan_idx: u32, seq_no: u64) -> u64 {
    ((chan_idx as u64) << 32) | seq_no
}

/// A MBPQS private key: seeds, the root tree's digest, the root-tree
/// sequence counter, and every channel created so far. Signing mutates
/// `seq_no` (guarded by its own mutex) and the targeted channel's counters
/// (guarded by that channel's own mutex); distinct channels never contend.
pub struct PrivateKey {
    ctx: Context,
    sk_seed: Vec<u8>,
    sk_prf: Vec<u8>,
    pub_seed: Vec<u8>,
    ph: PrecomputedHashes,
    root_tree: RootTree,
    seq_no: Mutex<u64>,
    channels: RwLock<Vec<Channel>>,
}

/// A MBPQS public key: the root digest and the public seed, sufficient to
/// verify any signature produced by the matching `PrivateKey`.
#[derive(Debug, Clone)]
pub struct PublicKey {
    params: Params,
    root: Vec<u8>,
    pub_seed: Vec<u8>,
}

impl PublicKey {
    pub fn params(&self) -> &Params {
        &self.params
    }

    pub fn root(&self) -> &[u8] {
        &self.root
    }

    pub fn pub_seed(&self) -> &[u8] {
        &self.pub_seed
    }
}

/// Generates a fresh `(PrivateKey, PublicKey)` pair for `params`, drawing
/// `skSeed`, `skPrf`, and `pubSeed` from `rng`, and eagerly building the
/// root tree using `threads` worker threads (`0` selects
/// `available_parallelism()`).
pub fn generate_key_pair(
    params: Params,
    threads: u32,
    rng: &mut impl RandomSource,
) -> Result<(PrivateKey, PublicKey)> {
    let n = params.n() as usize;
    let mut sk_seed = vec![0u8; n];
    let mut sk_prf = vec![0u8; n];
    let mut pub_seed = vec![0u8; n];
    rng.fill(&mut sk_seed)?;
    rng.fill(&mut sk_prf)?;
    rng.fill(&mut pub_seed)?;

    let ctx = Context::new(params, threads);
    let ph = PrecomputedHashes::new(&params, &pub_seed, Some(&sk_seed));
    let root_tree = gen_root_tree(&params, &ph, threads);
    let root = root_tree.root().to_vec();
    tracing::info!(root_h = params.root_h(), root_len = root.len(), "generated key pair");

    let public_key = PublicKey {
        params,
        root: root.clone(),
        pub_seed: pub_seed.clone(),
    };
    let private_key = PrivateKey {
        ctx,
        sk_seed,
        sk_prf,
        pub_seed,
        ph,
        root_tree,
        seq_no: Mutex::new(0),
        channels: RwLock::new(Vec::new()),
    };
    Ok((private_key, public_key))
}

impl PrivateKey {
    pub fn params(&self) -> &Params {
        self.ctx.params()
    }

    /// The root tree's digest (identical to the matching `PublicKey`'s).
    pub fn root(&self) -> &[u8] {
        self.root_tree.root()
    }

    /// The number of channels created so far.
    pub fn channel_count(&self) -> u32 {
        self.channels.read().unwrap().len() as u32
    }

    /// The `(chainSeqNo, seqNo)` counters of channel `idx`, for
    /// introspection (mirrors the original `ChannelSeqNos` accessor).
    pub fn channel_seq_nos(&self, idx: u32) -> Result<(u32, u64)> {
        let channels = self.channels.read().unwrap();
        let ch = channels.get(idx as usize).ok_or(Error::ChannelMissing {
            index: idx,
            channel_count: channels.len() as u32,
        })?;
        Ok((ch.chain_seq_no(), ch.seq_no()))
    }

    /// The 1-based layer of channel `idx`'s currently active chain tree.
    pub fn current_layer(&self, idx: u32) -> Result<u32> {
        let channels = self.channels.read().unwrap();
        let ch = channels.get(idx as usize).ok_or(Error::ChannelMissing {
            index: idx,
            channel_count: channels.len() as u32,
        })?;
        Ok(ch.current_layer())
    }

    fn next_root_seq_no(&self) -> Result<u64> {
        let mut seq_no = self.seq_no.lock().unwrap();
        if *seq_no >= self.params().root_capacity() {
            return Err(Error::RootTreeExhausted {
                capacity: self.params().root_capacity(),
            });
        }
        let r = *seq_no;
        *seq_no += 1;
        Ok(r)
    }

    /// Creates a new channel, signing its first chain tree's root with an
    /// unused root-tree leaf. Fails with `RootTreeExhausted` once
    /// `2^rootH` channels have been created.
    pub fn add_channel(&self) -> Result<(u32, RootSignature)> {
        let r = self.next_root_seq_no()?;
        let chan_idx = {
            let mut channels = self.channels.write().unwrap();
            channels.push(Channel::new());
            channels.len() as u32 - 1
        };
        tracing::info!(chan_idx, seq_no = r, "adding channel");

        let chain_tree = gen_chain_tree(self.params(), &self.ph, chan_idx, 1, self.ctx.threads);
        let root_hash = chain_tree.root().to_vec();

        let mut ots_addr = Address::for_subtree(SubTreeAddress { layer: 0, tree: 0 });
        ots_addr.set_type(AddrType::Ots);
        ots_addr.set_ots(r as u32);

        let mut wots_sig = vec![0u8; self.params().wots_sig_bytes() as usize];
        wots_sign_into(self.params(), &root_hash, &self.ph, &mut ots_addr.clone(), &mut wots_sig);

        let auth_path = self.root_tree.auth_path(r);

        Ok((
            chan_idx,
            RootSignature {
                seq_no: r,
                wots_sig,
                auth_path,
                root_hash,
            },
        ))
    }

    /// Signs `msg` under channel `chan_idx`'s active chain tree, consuming
    /// its next leaf. Fails with `ChannelMissing` for an unknown channel,
    /// or `ChainFull` if the active chain tree's last (grow-reserved) leaf
    /// has already been used.
    pub fn sign_msg(&self, chan_idx: u32, msg: &[u8]) -> Result<MsgSignature> {
        let channels = self.channels.read().unwrap();
        let ch = channels.get(chan_idx as usize).ok_or(Error::ChannelMissing {
            index: chan_idx,
            channel_count: channels.len() as u32,
        })?;

        let (layer, cs, s) = ch.reserve_sign(chan_idx, self.params())?;
        drop(channels);
        tracing::debug!(chan_idx, layer, chain_seq_no = cs, seq_no = s, "signing message");

        let idx = sig_idx(chan_idx, s);
        let n = self.params().n() as usize;
        let mut drv = vec![0u8; n];
        prf_uint64_into(self.params().n(), &self.sk_prf, idx, &mut drv);

        let mut hashed_msg = vec![0u8; n];
        h_msg_into(self.params().n(), &drv, self.root(), idx, msg, &mut hashed_msg);

        let chain_tree = gen_chain_tree(self.params(), &self.ph, chan_idx, layer, self.ctx.threads);
        let auth_path = chain_tree.next_auth_node(cs).to_vec();

        let mut ots_addr = Address::for_subtree(SubTreeAddress {
            layer,
            tree: chan_idx as u64,
        });
        ots_addr.set_type(AddrType::Ots);
        ots_addr.set_ots(cs);

        let mut wots_sig = vec![0u8; self.params().wots_sig_bytes() as usize];
        wots_sign_into(self.params(), &hashed_msg, &self.ph, &mut ots_addr, &mut wots_sig);

        Ok(MsgSignature {
            chan_idx,
            layer,
            chain_seq_no: cs,
            seq_no: s,
            drv,
            wots_sig,
            auth_path,
        })
    }

    /// Grows channel `chan_idx` onto a new chain tree, signing its root
    /// with the reserved last leaf of the current one. Fails with
    /// `ChannelMissing` for an unknown channel, or `ChainNotFull` if the
    /// active chain tree has not yet been fully consumed.
    pub fn grow_channel(&self, chan_idx: u32) -> Result<GrowSignature> {
        let channels = self.channels.read().unwrap();
        let ch = channels.get(chan_idx as usize).ok_or(Error::ChannelMissing {
            index: chan_idx,
            channel_count: channels.len() as u32,
        })?;

        let (old_layer, old_cs) = ch.reserve_grow(chan_idx, self.params())?;
        drop(channels);
        tracing::info!(chan_idx, old_layer, new_layer = old_layer + 1, "growing channel");

        let new_layer = old_layer + 1;
        let new_tree = gen_chain_tree(self.params(), &self.ph, chan_idx, new_layer, self.ctx.threads);
        let root_hash = new_tree.root().to_vec();

        let mut ots_addr = Address::for_subtree(SubTreeAddress {
            layer: old_layer,
            tree: chan_idx as u64,
        });
        ots_addr.set_type(AddrType::Ots);
        ots_addr.set_ots(old_cs);

        let mut wots_sig = vec![0u8; self.params().wots_sig_bytes() as usize];
        wots_sign_into(self.params(), &root_hash, &self.ph, &mut ots_addr, &mut wots_sig);

        Ok(GrowSignature {
            layer: old_layer,
            chan_idx,
            chain_seq_no: old_cs,
            wots_sig,
            root_hash,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::test_support::CountingRandom;

    fn small_params() -> Params {
        Params::new(32, 16, 3, 2, 1).unwrap()
    }

    #[test]
    fn add_channel_exhausts_root_tree_capacity() {
        let p = small_params();
        let mut rng = CountingRandom;
        let (sk, _pk) = generate_key_pair(p, 1, &mut rng).unwrap();
        for _ in 0..p.root_capacity() {
            sk.add_channel().unwrap();
        }
        assert!(matches!(sk.add_channel(), Err(Error::RootTreeExhausted { .. })));
    }

    #[test]
    fn sign_msg_fills_chain_then_grow_resets_it() {
        let p = small_params();
        let mut rng = CountingRandom;
        let (sk, _pk) = generate_key_pair(p, 1, &mut rng).unwrap();
        let (chan_idx, _root_sig) = sk.add_channel().unwrap();

        let height = p.chain_tree_height(1);
        for _ in 0..height - 1 {
            sk.sign_msg(chan_idx, b"hello").unwrap();
        }
        assert!(matches!(
            sk.sign_msg(chan_idx, b"one too many"),
            Err(Error::ChainFull { .. })
        ));

        let grow_sig = sk.grow_channel(chan_idx).unwrap();
        assert_eq!(grow_sig.layer, 1);
        let (cs, _) = sk.channel_seq_nos(chan_idx).unwrap();
        assert_eq!(cs, 0);
        assert_eq!(sk.current_layer(chan_idx).unwrap(), 2);

        sk.sign_msg(chan_idx, b"on layer two").unwrap();
    }

    #[test]
    fn unknown_channel_is_reported() {
        let p = small_params();
        let mut rng = CountingRandom;
        let (sk, _pk) = generate_key_pair(p, 1, &mut rng).unwrap();
        assert!(matches!(sk.sign_msg(0, b"x"), Err(Error::ChannelMissing { .. })));
        assert!(matches!(sk.grow_channel(0), Err(Error::ChannelMissing { .. })));
    }
}
