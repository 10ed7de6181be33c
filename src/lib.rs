#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(unused_must_use)]
#![deny(unused_mut)]

//! seedglyph converts between mnemonic seed words and short glyph sequences. Each word of a
//! 2048 word dictionary maps to exactly one sequence of four glyphs and back, optionally through
//! a permutation derived from a secret key so that the glyphs reveal nothing without the key.

pub mod dictionary;
pub mod drbg;
pub mod error;
pub mod glyphs;
pub mod keypolicy;
pub mod permutation;
pub mod phrase;
pub mod selftest;

use userspace_rng::random256;
use zeroize::{Zeroize, ZeroizeOnDrop};

pub use dictionary::{Dictionary, WordAliases};
pub use error::{Error, Result};
pub use keypolicy::{derive_seed, min_bits_for_context, KdfMode, KeyPolicy};
pub use permutation::Permutation;
pub use phrase::{decode_phrase, encode_verified, verify_round_trip, Codec};

/// SEED_SIZE is the size in bytes of the canonical seed that keys the permutation.
pub const SEED_SIZE: usize = 32;

/// Seed is the canonical key material produced by the KDF. It is the only input the permutation
/// derivation ever sees, and it is wiped from memory when dropped.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct Seed([u8; SEED_SIZE]);

impl Seed {
    /// from_bytes wraps raw seed bytes.
    pub fn from_bytes(bytes: [u8; SEED_SIZE]) -> Seed {
        Seed(bytes)
    }

    /// as_bytes exposes the seed bytes.
    pub fn as_bytes(&self) -> &[u8; SEED_SIZE] {
        &self.0
    }
}

impl std::fmt::Debug for Seed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Seed(<redacted>)")
    }
}

/// random_seed will generate a new random seed using secure userspace entropy from the
/// userspace-random crate.
pub fn random_seed() -> Seed {
    Seed(random256())
}
