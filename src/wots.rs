// Copyright (C) 2021 Quentin Kniep <hello@quentinkniep.com>
// Distributed under terms of the MIT license.

//! The Winternitz One-Time Signature scheme (WOTS+) as used by MBPQS:
//! key generation, signing, and public-key recovery from a signature.

use crate::address::{AddrType, Address};
use crate::hash::{f_into, prf_uint64_into, PrecomputedHashes};
use crate::params::Params;

/// Generates the WOTS+ secret-key seed values for `addr` into `out`
/// (`wots_len * n` bytes). `addr`'s chain/hash/key_and_mask fields are
/// overwritten; its subtree/ots fields select which key is generated.
pub fn gen_wots_sk(params: &Params, ph: &PrecomputedHashes, addr: &mut Address, out: &mut [u8]) {
    let n = params.n() as usize;
    addr.set_chain(0);
    addr.set_hash(0);
    addr.set_key_and_mask(0);

    let mut sk_seed_key = [0u8; 64];
    ph.prf_sk_seed_into(addr, &mut sk_seed_key[..n]);

    for i in 0..params.wots_len() {
        prf_uint64_into(
            params.n(),
            &sk_seed_key[..n],
            i as u64,
            &mut out[i as usize * n..(i as usize + 1) * n],
        );
    }
}

/// Converts a message into chain lengths ("positions on the WOTS+ chains").
/// The message must be exactly `n` bytes.
pub fn wots_chain_lengths(params: &Params, msg: &[u8]) -> Vec<u8> {
    let mut ret = vec![0u8; params.wots_len() as usize];
    let len1 = params.wots_len1() as usize;

    to_base_w(params, msg, &mut ret[..len1]);

    let mut csum: u32 = 0;
    for &d in &ret[..len1] {
        csum += params.w() as u32 - 1 - d as u32;
    }
    let log_w = params.wots_log_w();
    let len2 = params.wots_len2();
    csum <<= (8 - ((len2 * log_w) % 8)) % 8;

    let csum_byte_len = (len2 * log_w).div_ceil(8) as usize;
    let mut csum_bytes = vec![0u8; csum_byte_len];
    crate::hash::encode_uint64_into(csum as u64, &mut csum_bytes);

    to_base_w(params, &csum_bytes, &mut ret[len1..]);
    ret
}

/// Converts `input` into `output.len()` base-`w` digits (MSB-first within
/// each input byte). Only valid when `log2(w)` divides 8.
fn to_base_w(params: &Params, input: &[u8], output: &mut [u8]) {
    if params.w() == 256 {
        output.copy_from_slice(&input[..output.len()]);
        return;
    }

    let log_w = params.wots_log_w();
    let mut in_idx = 0usize;
    let mut total: u8 = 0;
    let mut bits: u32 = 0;

    for out in output.iter_mut() {
        if bits == 0 {
            total = input[in_idx];
            in_idx += 1;
            bits = 8;
        }
        bits -= log_w;
        *out = (total >> bits) & (params.w() - 1) as u8;
    }
}

/// Walks the hash chain `steps` times starting from the `start`-th value,
/// writing the `(start+steps)`-th value into `out`. `addr`'s `chain` field
/// must already be set; its `hash` field is overwritten.
pub fn wots_gen_chain_into(
    params: &Params,
    input: &[u8],
    start: u32,
    steps: u32,
    ph: &PrecomputedHashes,
    addr: &mut Address,
    out: &mut [u8],
) {
    let n = params.n() as usize;
    out[..n].copy_from_slice(&input[..n]);
    let w = params.w() as u32;
    let mut scratch = [0u8; 64];
    let mut i = start;
    while i < start + steps && i < w {
        addr.set_hash(i);
        scratch[..n].copy_from_slice(&out[..n]);
        f_into(ph, &scratch[..n], addr, &mut out[..n]);
        i += 1;
    }
}

/// Generates a full WOTS+ public key (`wots_len * n` bytes) for `addr`.
pub fn wots_pk_gen_into(params: &Params, ph: &PrecomputedHashes, addr: &mut Address, out: &mut [u8]) {
    gen_wots_sk(params, ph, addr, out);
    let n = params.n() as usize;
    let mut input = [0u8; 64];
    for i in 0..params.wots_len() {
        addr.set_chain(i);
        let start = i as usize * n;
        let end = start + n;
        input[..n].copy_from_slice(&out[start..end]);
        wots_gen_chain_into(params, &input[..n], 0, params.w() as u32 - 1, ph, addr, &mut out[start..end]);
    }
}

/// Creates a WOTS+ signature of an `n`-byte message, writing
/// `wots_sig_bytes` bytes into `sig`.
pub fn wots_sign_into(params: &Params, msg: &[u8], ph: &PrecomputedHashes, addr: &mut Address, sig: &mut [u8]) {
    let n = params.n() as usize;
    let lengths = wots_chain_lengths(params, msg);
    gen_wots_sk(params, ph, addr, sig);
    let mut input = [0u8; 64];
    for i in 0..params.wots_len() as usize {
        addr.set_chain(i as u32);
        let start = i * n;
        let end = start + n;
        input[..n].copy_from_slice(&sig[start..end]);
        wots_gen_chain_into(params, &input[..n], 0, lengths[i] as u32, ph, addr, &mut sig[start..end]);
    }
}

/// Recovers the WOTS+ public key implied by `sig` over `msg`, writing
/// `wots_len * n` bytes into `pk`. Addr's OTS-identifying fields must be
/// set by the caller; `AddrType::Ots` is set here.
pub fn wots_pk_from_sig_into(params: &Params, sig: &[u8], msg: &[u8], ph: &PrecomputedHashes, addr: &mut Address, pk: &mut [u8]) {
    addr.set_type(AddrType::Ots);
    let n = params.n() as usize;
    let lengths = wots_chain_lengths(params, msg);
    let w = params.w() as u32;
    for i in 0..params.wots_len() as usize {
        addr.set_chain(i as u32);
        let start = i * n;
        let end = start + n;
        wots_gen_chain_into(
            params,
            &sig[start..end],
            lengths[i] as u32,
            w - 1 - lengths[i] as u32,
            ph,
            addr,
            &mut pk[start..end],
        );
    }
}
