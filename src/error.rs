// Copyright (C) 2021 Quentin Kniep <hello@quentinkniep.com>
// Distributed under terms of the MIT license.

//! Error kinds surfaced by the MBPQS core.
//!
//! `Verify*` never returns an error for a signature that simply fails to
//! verify -- that case returns `Ok(false)`. Errors are reserved for
//! malformed parameters, exhausted key material, and state-machine misuse.

use thiserror::Error;

/// Errors produced by MBPQS key generation, signing, growing, and
/// (in rare cases) verification.
#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum Error {
    /// Parameter construction was rejected.
    #[error("invalid parameters: {reason}")]
    ParamInvalid {
        /// Human-readable reason the parameters were rejected.
        reason: String,
    },

    /// The requested channel index has not been created.
    #[error("channel {index} does not exist ({channel_count} channels present)")]
    ChannelMissing {
        /// The channel index that was requested.
        index: u32,
        /// The number of channels that currently exist.
        channel_count: u32,
    },

    /// The root tree has no unused leaves left; `AddChannel` cannot proceed.
    #[error("root tree exhausted: all {capacity} channel slots are in use")]
    RootTreeExhausted {
        /// `2^rootH`, the total number of root-tree leaves.
        capacity: u64,
    },

    /// `SignMsg` was called but the channel's current chain tree has only
    /// its reserved growing key left.
    #[error("channel {index} chain tree is full at layer {layer}; call GrowChannel first")]
    ChainFull {
        /// The channel index.
        index: u32,
        /// The exhausted chain tree's layer.
        layer: u32,
    },

    /// `GrowChannel` was called before the current chain tree was fully
    /// consumed.
    #[error(
        "channel {index} chain tree at layer {layer} is not yet full ({used}/{height} keys used)"
    )]
    ChainNotFull {
        /// The channel index.
        index: u32,
        /// The current chain tree's layer.
        layer: u32,
        /// Keys already consumed in the current chain tree.
        used: u32,
        /// Total keys (leaves) in the current chain tree.
        height: u32,
    },

    /// A channel's signature counter would exceed its 32-bit range.
    #[error("channel {index} signature counter overflowed past {bound}")]
    KeyOverflow {
        /// The channel index.
        index: u32,
        /// The bound that was exceeded.
        bound: u64,
    },

    /// The underlying hash function rejected its input (buffer-size
    /// mismatch). Never expected for SHA-256/SHA-512; kept for defensive
    /// symmetry with the rest of the error surface.
    #[error("hash input/output size mismatch: expected {expected} bytes, got {actual}")]
    HashIo {
        /// The expected buffer length.
        expected: usize,
        /// The buffer length actually supplied.
        actual: usize,
    },
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
