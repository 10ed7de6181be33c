#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(unused_must_use)]
#![deny(unused_mut)]

//! permutation derives the keyed ordering of the dictionary.
//!
//! A permutation P maps a position to a dictionary index, and its inverse maps a dictionary index
//! back to its position. Encoding a word uses the inverse, decoding a code uses P. With no seed,
//! P is the identity, which is a supported mode and not a fallback.

use tracing::debug;

use crate::drbg::HashDrbg;
use crate::Seed;

/// Permutation is a bijection over [0, n) together with its inverse. It is never mutated after
/// derivation, so it can be shared freely between threads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Permutation {
    forward: Vec<usize>,
    inverse: Vec<usize>,
}

impl Permutation {
    /// identity returns the permutation that maps every position to itself.
    pub fn identity(n: usize) -> Permutation {
        let forward: Vec<usize> = (0..n).collect();
        Permutation {
            inverse: forward.clone(),
            forward,
        }
    }

    /// derive builds the permutation of [0, n) for a seed. The same (n, seed) always produces the
    /// same permutation. A missing seed produces the identity.
    pub fn derive(n: usize, seed: Option<&Seed>) -> Permutation {
        let seed = match seed {
            Some(seed) => seed,
            None => {
                debug!(n, "no key supplied, using identity permutation");
                return Permutation::identity(n);
            }
        };

        // Fisher-Yates, walking down from the top. Each swap partner is drawn from [0, i]
        // without modulo bias.
        let mut forward: Vec<usize> = (0..n).collect();
        let mut drbg = HashDrbg::new(seed);
        for i in (1..n).rev() {
            let j = drbg.uniform(i as u64 + 1) as usize;
            forward.swap(i, j);
        }
        debug!(n, "derived keyed permutation");

        let inverse = inverse_of(&forward);
        Permutation { forward, inverse }
    }

    /// len returns the size of the permuted domain.
    pub fn len(&self) -> usize {
        self.forward.len()
    }

    /// is_empty reports whether the domain is empty.
    pub fn is_empty(&self) -> bool {
        self.forward.is_empty()
    }

    /// index_at returns the dictionary index assigned to a position.
    pub fn index_at(&self, position: usize) -> Option<usize> {
        self.forward.get(position).copied()
    }

    /// position_of returns the position assigned to a dictionary index.
    pub fn position_of(&self, index: usize) -> Option<usize> {
        self.inverse.get(index).copied()
    }

    /// as_slice exposes the forward mapping, where element i is the index at position i.
    pub fn as_slice(&self) -> &[usize] {
        &self.forward
    }

    /// is_identity reports whether every position maps to itself.
    pub fn is_identity(&self) -> bool {
        self.forward.iter().enumerate().all(|(i, &v)| i == v)
    }
}

/// inverse_of computes the inverse of a permutation by scattering each position into the slot of
/// the value it holds.
pub fn inverse_of(p: &[usize]) -> Vec<usize> {
    let mut inv = vec![0usize; p.len()];
    for (k, &v) in p.iter().enumerate() {
        inv[v] = k;
    }
    inv
}
