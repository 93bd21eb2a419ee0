// Copyright (C) 2021 Quentin Kniep <hello@quentinkniep.com>
// Distributed under terms of the MIT license.

//! The MBPQS hash framework: four keyed hashes (F, H, H_msg, PRF) built on
//! SHA-256 (n=32) or SHA-512 (n=64), domain-separated by a leading n-byte
//! padding integer, plus the precomputed-prefix optimization for the
//! `pubSeed`/`skSeed`-keyed PRF calls that dominate tree generation.

use sha2::{Digest, Sha256, Sha512};

use crate::address::Address;
use crate::params::Params;

const PAD_F: u8 = 0;
const PAD_H: u8 = 1;
const PAD_HASH_MSG: u8 = 2;
const PAD_PRF: u8 = 3;

/// A running digest over either SHA-256 or SHA-512, selected by `n`.
/// `Clone` is load-bearing: it is what lets us snapshot the state after
/// absorbing a fixed prefix and replay from that snapshot.
#[derive(Clone)]
enum DigestState {
    Sha256(Sha256),
    Sha512(Sha512),
}

impl DigestState {
    fn new(n: u32) -> Self {
        match n {
            32 => DigestState::Sha256(Sha256::new()),
            64 => DigestState::Sha512(Sha512::new()),
            _ => unreachable!("Params::new validates n in {{32, 64}}"),
        }
    }

    fn update(&mut self, data: &[u8]) {
        match self {
            DigestState::Sha256(h) => Digest::update(h, data),
            DigestState::Sha512(h) => Digest::update(h, data),
        }
    }

    fn finalize_into(self, out: &mut [u8]) {
        match self {
            DigestState::Sha256(h) => out[..32].copy_from_slice(&h.finalize()),
            DigestState::Sha512(h) => out[..64].copy_from_slice(&h.finalize()),
        }
    }
}

/// Writes `x` as an `out.len()`-byte big-endian integer (upper bytes zero).
/// Mirrors `original_source/encode.go::encodeUint64Into`.
pub fn encode_uint64_into(x: u64, out: &mut [u8]) {
    out.fill(0);
    let xb = x.to_be_bytes();
    let start = out.len().saturating_sub(8);
    let skip = 8usize.saturating_sub(out.len());
    out[start..].copy_from_slice(&xb[skip..]);
}

fn hash_into(n: u32, pad: u8, parts: &[&[u8]], out: &mut [u8]) {
    let mut state = DigestState::new(n);
    let mut pad_buf = [0u8; 64];
    encode_uint64_into(pad as u64, &mut pad_buf[..n as usize]);
    state.update(&pad_buf[..n as usize]);
    for part in parts {
        state.update(part);
    }
    state.finalize_into(out);
}

/// Precomputed digest-state snapshots for the `pubSeed`/`skSeed`-keyed PRF
/// calls, which never change seed during a signing session. Computed once
/// per `Context`/`PrivateKey` and reused for the lifetime of the key.
pub struct PrecomputedHashes {
    n: u32,
    pub_seed_prefix: DigestState,
    sk_seed_prefix: Option<DigestState>,
}

impl PrecomputedHashes {
    /// Precomputes the `PAD_PRF || pubSeed` prefix, and optionally the
    /// `PAD_PRF || skSeed` prefix when the secret seed is known (signer
    /// side only -- verifiers never construct this).
    pub fn new(params: &Params, pub_seed: &[u8], sk_seed: Option<&[u8]>) -> Self {
        let n = params.n();
        let mut pub_seed_prefix = DigestState::new(n);
        let mut pad_buf = [0u8; 64];
        encode_uint64_into(PAD_PRF as u64, &mut pad_buf[..n as usize]);
        pub_seed_prefix.update(&pad_buf[..n as usize]);
        pub_seed_prefix.update(pub_seed);

        let sk_seed_prefix = sk_seed.map(|seed| {
            let mut state = DigestState::new(n);
            state.update(&pad_buf[..n as usize]);
            state.update(seed);
            state
        });

        Self {
            n,
            pub_seed_prefix,
            sk_seed_prefix,
        }
    }

    /// `PRF_addr(pubSeed, addr)`, writing `n` bytes into `out`.
    pub fn prf_pub_seed_into(&self, addr: &Address, out: &mut [u8]) {
        let mut buf = [0u8; 32];
        addr.write_into(&mut buf);
        let state = self.pub_seed_prefix.clone();
        let mut state = state;
        state.update(&buf);
        state.finalize_into(&mut out[..self.n as usize]);
    }

    /// `PRF_addr(skSeed, addr)`, writing `n` bytes into `out`. Only
    /// available when this instance was built with a known `skSeed`.
    pub fn prf_sk_seed_into(&self, addr: &Address, out: &mut [u8]) {
        let mut buf = [0u8; 32];
        addr.write_into(&mut buf);
        let state = self
            .sk_seed_prefix
            .clone()
            .expect("prf_sk_seed_into requires a PrecomputedHashes built with an skSeed");
        let mut state = state;
        state.update(&buf);
        state.finalize_into(&mut out[..self.n as usize]);
    }
}

/// `F(key, in)`: the WOTS+ chain step. `key` and the bitmask are both
/// derived from `pub_seed` via `addr` with `key_and_mask` set to 0 and 1.
pub fn f_into(ph: &PrecomputedHashes, input: &[u8], addr: &mut Address, out: &mut [u8]) {
    let n = ph.n as usize;
    let mut key = [0u8; 64];
    let mut bitmask = [0u8; 64];

    addr.set_key_and_mask(0);
    ph.prf_pub_seed_into(addr, &mut key[..n]);
    addr.set_key_and_mask(1);
    ph.prf_pub_seed_into(addr, &mut bitmask[..n]);

    let mut masked = [0u8; 64];
    for i in 0..n {
        masked[i] = input[i] ^ bitmask[i];
    }
    hash_into(ph.n, PAD_F, &[&key[..n], &masked[..n]], out);
}

/// `H(key, L || R)`: the binary-tree node combiner. `key` and the two
/// bitmasks are derived from `pub_seed` via `addr` with `key_and_mask` set
/// to 0, 1, and 2.
pub fn h_into(ph: &PrecomputedHashes, left: &[u8], right: &[u8], addr: &mut Address, out: &mut [u8]) {
    let n = ph.n as usize;
    let mut key = [0u8; 64];
    let mut bm_l = [0u8; 64];
    let mut bm_r = [0u8; 64];

    addr.set_key_and_mask(0);
    ph.prf_pub_seed_into(addr, &mut key[..n]);
    addr.set_key_and_mask(1);
    ph.prf_pub_seed_into(addr, &mut bm_l[..n]);
    addr.set_key_and_mask(2);
    ph.prf_pub_seed_into(addr, &mut bm_r[..n]);

    let mut masked_l = [0u8; 64];
    let mut masked_r = [0u8; 64];
    for i in 0..n {
        masked_l[i] = left[i] ^ bm_l[i];
        masked_r[i] = right[i] ^ bm_r[i];
    }
    hash_into(ph.n, PAD_H, &[&key[..n], &masked_l[..n], &masked_r[..n]], out);
}

/// `H_msg(R || root || idx, msg)`: the randomized message hash. `idx` is
/// encoded as an `n`-byte big-endian integer.
pub fn h_msg_into(n: u32, drv: &[u8], root: &[u8], idx: u64, msg: &[u8], out: &mut [u8]) {
    let mut idx_bytes = [0u8; 64];
    encode_uint64_into(idx, &mut idx_bytes[..n as usize]);
    hash_into(n, PAD_HASH_MSG, &[drv, root, &idx_bytes[..n as usize], msg], out);
}

/// `PRF_uint64(key, ctr)`: used to derive WOTS+ secret-key chain starts and
/// the per-signature randomizer `drv`. `ctr` is encoded as an `n`-byte
/// big-endian integer.
pub fn prf_uint64_into(n: u32, key: &[u8], ctr: u64, out: &mut [u8]) {
    let mut ctr_bytes = [0u8; 64];
    encode_uint64_into(ctr, &mut ctr_bytes[..n as usize]);
    hash_into(n, PAD_PRF, &[key, &ctr_bytes[..n as usize]], out);
}
