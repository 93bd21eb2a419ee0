// Copyright (C) 2021 Quentin Kniep <hello@quentinkniep.com>
// Distributed under terms of the MIT license.

//! MBPQS parameter sets and their derived WOTS+ quantities.

use crate::error::{Error, Result};

/// Immutable MBPQS parameters, validated once at construction.
///
/// - `n`: output length (bytes) of the underlying hash and of every
///   node/key digest. Must be 32 (SHA-256) or 64 (SHA-512).
/// - `w`: the Winternitz chain width. Must be 4, 16, or 256.
/// - `root_h`: height of the root tree (`2^root_h` channels). Must be `<= 20`.
/// - `chan_h`: height of the first chain tree in every channel. Must be `>= 1`.
/// - `ge`: growth exponent. Height of the k-th chain tree is
///   `chan_h + ge*(k-1)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Params {
    n: u32,
    w: u16,
    root_h: u32,
    chan_h: u32,
    ge: u32,
}

impl Params {
    /// Validates and constructs a new parameter set.
    pub fn new(n: u32, w: u16, root_h: u32, chan_h: u32, ge: u32) -> Result<Self> {
        if n != 32 && n != 64 {
            return Err(Error::ParamInvalid {
                reason: format!("n must be 32 or 64, got {n}"),
            });
        }
        if !matches!(w, 4 | 16 | 256) {
            return Err(Error::ParamInvalid {
                reason: format!("w must be 4, 16, or 256, got {w}"),
            });
        }
        if root_h > 20 {
            return Err(Error::ParamInvalid {
                reason: format!("root_h must be <= 20, got {root_h}"),
            });
        }
        if chan_h == 0 {
            return Err(Error::ParamInvalid {
                reason: "chan_h must be >= 1, got 0".to_string(),
            });
        }
        Ok(Self {
            n,
            w,
            root_h,
            chan_h,
            ge,
        })
    }

    /// Output length in bytes of the underlying hash and every digest.
    pub fn n(&self) -> u32 {
        self.n
    }

    /// The Winternitz chain width.
    pub fn w(&self) -> u16 {
        self.w
    }

    /// Height of the root tree (`2^root_h` channels).
    pub fn root_h(&self) -> u32 {
        self.root_h
    }

    /// Height of the first chain tree in every channel.
    pub fn chan_h(&self) -> u32 {
        self.chan_h
    }

    /// Growth exponent.
    pub fn ge(&self) -> u32 {
        self.ge
    }

    /// `2^root_h`, the number of channels the root tree can authenticate.
    pub fn root_capacity(&self) -> u64 {
        1u64 << self.root_h
    }

    /// The height of the chain tree at 1-based layer `layer`
    /// (`chan_h + ge*(layer-1)`).
    pub fn chain_tree_height(&self, layer: u32) -> u32 {
        self.chan_h + self.ge * (layer - 1)
    }

    /// `log2(w)`.
    pub fn wots_log_w(&self) -> u32 {
        match self.w {
            4 => 2,
            16 => 4,
            256 => 8,
            _ => unreachable!("validated at construction"),
        }
    }

    /// `ceil(8n / log2(w))`, the number of WOTS+ message chains.
    pub fn wots_len1(&self) -> u32 {
        (8 * self.n).div_ceil(self.wots_log_w())
    }

    /// The number of WOTS+ checksum chains: 2, 3, or 5 for w = 4, 16, 256.
    pub fn wots_len2(&self) -> u32 {
        match self.w {
            4 => 2,
            16 => 3,
            256 => 5,
            _ => unreachable!("validated at construction"),
        }
    }

    /// Total number of WOTS+ chains (`wots_len1 + wots_len2`).
    pub fn wots_len(&self) -> u32 {
        self.wots_len1() + self.wots_len2()
    }

    /// Size in bytes of a full WOTS+ signature.
    pub fn wots_sig_bytes(&self) -> u32 {
        self.wots_len() * self.n
    }
}

/// A small table of named parameter sets, mirroring
/// `original_source/params.go`'s `paramSets` and `NewContextFromOid`.
/// Index 0 and 1 match the concrete test vectors in the specification.
pub fn param_set(oid: usize) -> Result<Params> {
    PARAM_SETS.get(oid).copied().ok_or_else(|| Error::ParamInvalid {
        reason: format!("no parameter set registered for oid {oid}"),
    })
}

const fn unwrap_params(n: u32, w: u16, root_h: u32, chan_h: u32, ge: u32) -> Params {
    // Params::new cannot be called in a const context (it allocates error
    // strings on the failure path); the bounds below are asserted by the
    // `param_sets_are_valid` test instead.
    Params {
        n,
        w,
        root_h,
        chan_h,
        ge,
    }
}

/// Parameter sets kept for convenience, analogous to the Go original's
/// `paramSets` table.
pub static PARAM_SETS: &[Params] = &[
    unwrap_params(32, 16, 10, 1, 1),
    unwrap_params(32, 16, 16, 1, 1),
    unwrap_params(32, 16, 20, 2, 0),
    unwrap_params(64, 16, 10, 2, 0),
    unwrap_params(64, 16, 16, 2, 0),
];
