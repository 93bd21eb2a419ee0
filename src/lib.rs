// Copyright (C) 2021 Quentin Kniep <hello@quentinkniep.com>
// Distributed under terms of the MIT license.

//! MBPQS: Multi-tree Blockchained Post-Quantum Signatures.
//!
//! A stateful hash-based signature scheme, derived from XMSS/XMSS-MT and
//! built on WOTS+, optimized for signing long sequences of messages within
//! independent "channels". A fixed-height root tree authenticates channel
//! creation; each channel then grows an unbounded stack of "chain trees",
//! one WOTS+ key per message, the last key of each reserved to authenticate
//! the next chain tree.
//!
//! ```
//! use mbpqs::{params::Params, random::OsRandom};
//!
//! let params = Params::new(32, 16, 10, 4, 1).expect("valid parameters");
//! let mut rng = OsRandom;
//! let (sk, pk) = mbpqs::generate_key_pair(params, 0, &mut rng).expect("key generation");
//!
//! let (channel, root_sig) = sk.add_channel().expect("root tree has capacity");
//! assert!(mbpqs::verify_channel_root(&pk, &root_sig, root_sig.signed_root()));
//!
//! let msg_sig = sk.sign_msg(channel, b"hello, channel").expect("chain tree has capacity");
//! assert!(mbpqs::verify_msg(&pk, &msg_sig, b"hello, channel", root_sig.signed_root()));
//! ```

pub mod address;
pub mod channel;
pub mod error;
pub mod hash;
pub mod key;
pub mod ltree;
pub mod parallel;
pub mod params;
pub mod random;
pub mod signature;
pub mod tree;
pub mod verify;
pub mod wots;

pub use error::{Error, Result};
pub use key::{generate_key_pair, PrivateKey, PublicKey};
pub use params::Params;
pub use signature::{GrowSignature, MsgSignature, RootSignature, Signature};
pub use verify::{verify_channel_root, verify_grow, verify_msg};
