// Copyright (C) 2021 Quentin Kniep <hello@quentinkniep.com>
// Distributed under terms of the MIT license.

use criterion::*;

use mbpqs::params::Params;
use mbpqs::random::OsRandom;
use mbpqs::{generate_key_pair, verify_msg, PrivateKey, PublicKey};

fn setup() -> (PrivateKey, PublicKey) {
    let params = Params::new(32, 16, 6, 6, 1).unwrap();
    let mut rng = OsRandom;
    generate_key_pair(params, 0, &mut rng).unwrap()
}

fn add_channel(c: &mut Criterion) {
    let (sk, _pk) = setup();
    c.bench_function("AddChannel (rootH=6)", |b| b.iter(|| sk.add_channel().unwrap()));
}

fn sign_msg(c: &mut Criterion) {
    let (sk, _pk) = setup();
    let (chan_idx, _root_sig) = sk.add_channel().unwrap();
    let msg = b"benchmark message";
    c.bench_function("SignMsg (chanH=6)", |b| {
        b.iter_batched(
            || (),
            |_| {
                // Growing keeps the chain from running out mid-benchmark;
                // its cost is amortized across chanH-1 cheap SignMsg calls.
                match sk.sign_msg(chan_idx, msg) {
                    Ok(sig) => Some(sig),
                    Err(_) => {
                        sk.grow_channel(chan_idx).unwrap();
                        None
                    }
                }
            },
            BatchSize::SmallInput,
        )
    });
}

fn verify_msg_bench(c: &mut Criterion) {
    let (sk, pk) = setup();
    let (chan_idx, root_sig) = sk.add_channel().unwrap();
    let msg = b"benchmark message";
    let sig = sk.sign_msg(chan_idx, msg).unwrap();
    let anchor = root_sig.signed_root();
    c.bench_function("VerifyMsg (chanH=6)", |b| {
        b.iter(|| verify_msg(&pk, &sig, msg, anchor))
    });
}

criterion_group!(benches, add_channel, sign_msg, verify_msg_bench);
criterion_main!(benches);
