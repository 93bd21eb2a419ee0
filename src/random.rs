// Copyright (C) 2021 Quentin Kniep <hello@quentinkniep.com>
// Distributed under terms of the MIT license.

//! The random-seed collaborator seam. MBPQS itself only ever consumes
//! three independent n-byte seeds; it does not mandate how they are
//! produced. Mirrors `original_source/random.go`'s `randomBytes` helper.

use getrandom::getrandom;

use crate::error::Error;

/// Supplies cryptographically secure random bytes for MBPQS seed material.
pub trait RandomSource {
    /// Fills `out` with uniform random bytes.
    fn fill(&mut self, out: &mut [u8]) -> Result<(), Error>;
}

/// The default `RandomSource`, backed by the operating system's CSPRNG via
/// `getrandom` (the same crate the teacher depends on for its own key
/// generation).
#[derive(Debug, Default, Clone, Copy)]
pub struct OsRandom;

impl RandomSource for OsRandom {
    fn fill(&mut self, out: &mut [u8]) -> Result<(), Error> {
        getrandom(out).map_err(|_| Error::HashIo {
            expected: out.len(),
            actual: 0,
        })
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    /// A deterministic source used to reproduce fixed test vectors.
    /// Each call fills `out` with `[0, 1, 2, ..., out.len()-1]`, matching
    /// the specification's "bytes(0, 1, ..., 31)" style seeds.
    #[derive(Debug, Default)]
    pub struct CountingRandom;

    impl RandomSource for CountingRandom {
        fn fill(&mut self, out: &mut [u8]) -> Result<(), Error> {
            for (i, b) in out.iter_mut().enumerate() {
                *b = i as u8;
            }
            Ok(())
        }
    }
}
