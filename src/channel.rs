// Copyright (C) 2021 Quentin Kniep <hello@quentinkniep.com>
// Distributed under terms of the MIT license.

//! Per-channel state: which chain-tree layer is active, how much of it has
//! been consumed, and the channel-wide signature counter. Each channel owns
//! a mutex over its three counters so that `SignMsg` and `GrowChannel`
//! calls against different channels never contend with each other.

use std::sync::Mutex;

use crate::error::{Error, Result};
use crate::params::Params;

#[derive(Debug, Clone, Copy)]
struct ChannelState {
    /// Number of chain trees materialized so far (>= 1 once created).
    layers: u32,
    /// 0-based position of the next unused leaf in the active chain tree.
    chain_seq_no: u32,
    /// Monotonic signature counter across all layers of this channel.
    seq_no: u64,
}

/// A channel's mutable counters, guarded by a single mutex. Channel
/// identity (its index) lives in the owning `PrivateKey`'s channel vector.
#[derive(Debug)]
pub struct Channel {
    state: Mutex<ChannelState>,
}

impl Channel {
    /// A freshly created channel, its first chain tree (layer 1) already
    /// generated.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(ChannelState {
                layers: 1,
                chain_seq_no: 0,
                seq_no: 0,
            }),
        }
    }

    /// The number of chain trees materialized so far.
    pub fn layers(&self) -> u32 {
        self.state.lock().unwrap().layers
    }

    /// The 1-based layer of the currently active chain tree (`layers()`).
    pub fn current_layer(&self) -> u32 {
        self.layers()
    }

    /// The 0-based position of the next unused leaf in the active chain tree.
    pub fn chain_seq_no(&self) -> u32 {
        self.state.lock().unwrap().chain_seq_no
    }

    /// The channel-wide signature counter.
    pub fn seq_no(&self) -> u64 {
        self.state.lock().unwrap().seq_no
    }

    /// Reserves the next `(chainSeqNo, seqNo)` pair for a `SignMsg` call,
    /// returning `(layer, chainSeqNo, seqNo)` and advancing both counters.
    /// The active chain tree's height is computed from `params` under the
    /// same lock that reserves the counters, so a concurrent
    /// `reserve_grow` can never race the check against a stale height.
    /// Fails with `ChainFull` if only the active chain tree's last leaf
    /// (reserved for `GrowChannel`) remains, or `KeyOverflow` if `seqNo`
    /// would overflow `u32::MAX`.
    pub fn reserve_sign(&self, index: u32, params: &Params) -> Result<(u32, u32, u64)> {
        let mut state = self.state.lock().unwrap();
        let chain_height = params.chain_tree_height(state.layers);
        if state.chain_seq_no == chain_height - 1 {
            return Err(Error::ChainFull {
                index,
                layer: state.layers,
            });
        }
        if state.seq_no >= u32::MAX as u64 {
            return Err(Error::KeyOverflow {
                index,
                bound: u32::MAX as u64,
            });
        }
        let (layer, cs, s) = (state.layers, state.chain_seq_no, state.seq_no);
        state.chain_seq_no += 1;
        state.seq_no += 1;
        Ok((layer, cs, s))
    }

    /// Reserves the channel's reserved last leaf for a `GrowChannel` call,
    /// returning the old `(layer, chainSeqNo)` and resetting the channel
    /// onto the new layer. The active chain tree's height is computed from
    /// `params` under the same lock that reserves the counters. Fails with
    /// `ChainNotFull` if the active chain tree's messages (all leaves but
    /// the last) have not yet all been consumed.
    pub fn reserve_grow(&self, index: u32, params: &Params) -> Result<(u32, u32)> {
        let mut state = self.state.lock().unwrap();
        let chain_height = params.chain_tree_height(state.layers);
        if state.chain_seq_no != chain_height - 1 {
            return Err(Error::ChainNotFull {
                index,
                layer: state.layers,
                used: state.chain_seq_no,
                height: chain_height,
            });
        }
        let (old_layer, old_cs) = (state.layers, state.chain_seq_no);
        state.layers += 1;
        state.chain_seq_no = 0;
        Ok((old_layer, old_cs))
    }
}

impl Default for Channel {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reserve_sign_advances_counters_and_refuses_when_full() {
        // chanH=3, ge=0: chain_tree_height(1) == 3, leaves 0 and 1 are
        // signable, leaf 2 is grow-reserved, at any layer.
        let p = Params::new(32, 16, 4, 3, 0).unwrap();
        let ch = Channel::new();
        for expected_cs in 0..2u32 {
            let (layer, cs, s) = ch.reserve_sign(0, &p).unwrap();
            assert_eq!(layer, 1);
            assert_eq!(cs, expected_cs);
            assert_eq!(s, expected_cs as u64);
        }
        assert!(matches!(ch.reserve_sign(0, &p), Err(Error::ChainFull { .. })));
    }

    #[test]
    fn reserve_grow_requires_full_chain_then_advances_layer() {
        // chanH=2, ge=0: chain_tree_height is 2 at every layer.
        let p = Params::new(32, 16, 4, 2, 0).unwrap();
        let ch = Channel::new();
        assert!(matches!(ch.reserve_grow(0, &p), Err(Error::ChainNotFull { .. })));
        ch.reserve_sign(0, &p).unwrap();
        let (old_layer, old_cs) = ch.reserve_grow(0, &p).unwrap();
        assert_eq!(old_layer, 1);
        assert_eq!(old_cs, 1);
        assert_eq!(ch.layers(), 2);
        assert_eq!(ch.chain_seq_no(), 0);
    }
}
