#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(unused_must_use)]
#![deny(unused_mut)]

//! drbg contains the deterministic random bit generator used to shuffle the dictionary.
//!
//! The generator is SHA-256 in counter mode. The internal state is SHA-256(seed), and block k of
//! the output stream is SHA-256(state || k) where k is a big-endian u64 starting at zero. Bytes
//! are handed out in stream order, and a u64 is the next eight bytes read big-endian. Nothing
//! here depends on the platform, so the same seed produces the same stream everywhere.

use sha2::{Digest, Sha256};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::Seed;

const BLOCK_SIZE: usize = 32;

/// HashDrbg is a SHA-256 counter-mode generator seeded from a 32 byte seed.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct HashDrbg {
    state: [u8; BLOCK_SIZE],
    block: [u8; BLOCK_SIZE],
    counter: u64,
    offset: usize,
}

impl HashDrbg {
    /// new creates a generator whose output is fully determined by the seed.
    pub fn new(seed: &Seed) -> HashDrbg {
        let mut hasher = Sha256::new();
        hasher.update(seed.as_bytes());
        let mut state = [0u8; BLOCK_SIZE];
        state.copy_from_slice(&hasher.finalize());
        HashDrbg {
            state,
            block: [0u8; BLOCK_SIZE],
            counter: 0,
            // Start exhausted so that the first read produces block zero.
            offset: BLOCK_SIZE,
        }
    }

    // refill replaces the current block with the next block of the stream.
    fn refill(&mut self) {
        let mut hasher = Sha256::new();
        hasher.update(self.state);
        hasher.update(self.counter.to_be_bytes());
        self.block.copy_from_slice(&hasher.finalize());
        self.counter = self.counter.wrapping_add(1);
        self.offset = 0;
    }

    /// uniform returns a value drawn uniformly from [0, bound). Draws that would introduce modulo
    /// bias are thrown away and retried, so the number of bytes consumed per call varies.
    pub fn uniform(&mut self, bound: u64) -> u64 {
        if bound <= 1 {
            return 0;
        }
        // Largest multiple of bound that fits in 2^64. Draws at or above it are rejected.
        let zone = (1u128 << 64) / u128::from(bound) * u128::from(bound);
        loop {
            let x = rand_core::RngCore::next_u64(self);
            if u128::from(x) < zone {
                return x % bound;
            }
        }
    }
}

impl rand_core::CryptoRng for HashDrbg {}

impl rand_core::RngCore for HashDrbg {
    fn next_u32(&mut self) -> u32 {
        let mut buf = [0u8; 4];
        self.fill_bytes(&mut buf);
        u32::from_be_bytes(buf)
    }

    fn next_u64(&mut self) -> u64 {
        let mut buf = [0u8; 8];
        self.fill_bytes(&mut buf);
        u64::from_be_bytes(buf)
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        let mut written = 0;
        while written < dest.len() {
            if self.offset == BLOCK_SIZE {
                self.refill();
            }
            let n = (BLOCK_SIZE - self.offset).min(dest.len() - written);
            dest[written..written + n].copy_from_slice(&self.block[self.offset..self.offset + n]);
            self.offset += n;
            written += n;
        }
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand_core::Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand_core::RngCore;

    // block computes block k of the stream by hand.
    fn block(seed: &Seed, k: u64) -> [u8; 32] {
        let state = Sha256::digest(seed.as_bytes());
        let mut hasher = Sha256::new();
        hasher.update(state);
        hasher.update(k.to_be_bytes());
        let mut out = [0u8; 32];
        out.copy_from_slice(&hasher.finalize());
        out
    }

    #[test]
    // The stream must match the documented construction byte for byte.
    fn check_stream_layout() {
        let seed = Seed::from_bytes([7u8; 32]);
        let mut drbg = HashDrbg::new(&seed);
        let mut stream = [0u8; 96];
        drbg.fill_bytes(&mut stream);
        assert_eq!(&stream[..32], &block(&seed, 0));
        assert_eq!(&stream[32..64], &block(&seed, 1));
        assert_eq!(&stream[64..], &block(&seed, 2));

        // Each block yields exactly four u64 draws.
        let mut drbg = HashDrbg::new(&seed);
        let b0 = block(&seed, 0);
        let b1 = block(&seed, 1);
        for i in 0..4 {
            let mut want = [0u8; 8];
            want.copy_from_slice(&b0[i * 8..i * 8 + 8]);
            assert_eq!(drbg.next_u64(), u64::from_be_bytes(want));
        }
        let mut want = [0u8; 8];
        want.copy_from_slice(&b1[..8]);
        assert_eq!(drbg.next_u64(), u64::from_be_bytes(want));
    }

    #[test]
    // Two generators with the same seed agree, and different seeds diverge.
    fn check_determinism() {
        let mut a = HashDrbg::new(&Seed::from_bytes([1u8; 32]));
        let mut b = HashDrbg::new(&Seed::from_bytes([1u8; 32]));
        let mut c = HashDrbg::new(&Seed::from_bytes([2u8; 32]));
        let mut same = true;
        for _ in 0..100 {
            let (x, y, z) = (a.next_u64(), b.next_u64(), c.next_u64());
            assert_eq!(x, y);
            same &= x == z;
        }
        if same {
            panic!("different seeds produced the same stream");
        }
    }

    #[test]
    // Uniform draws stay in range, and trivial bounds never consume output.
    fn check_uniform() {
        let mut drbg = HashDrbg::new(&Seed::from_bytes([3u8; 32]));
        assert_eq!(drbg.uniform(0), 0);
        assert_eq!(drbg.uniform(1), 0);
        for bound in [2u64, 3, 7, 1000, 2048, u64::MAX] {
            for _ in 0..200 {
                let v = drbg.uniform(bound);
                if v >= bound {
                    panic!("uniform({}) returned {}", bound, v);
                }
            }
        }

        // The first draw after the trivial bounds is still the first u64 of block zero.
        let mut fresh = HashDrbg::new(&Seed::from_bytes([3u8; 32]));
        let mut consumed = HashDrbg::new(&Seed::from_bytes([3u8; 32]));
        consumed.uniform(1);
        assert_eq!(fresh.next_u64(), consumed.next_u64());
    }

    #[test]
    // With a bound just over 2^63, almost half of all draws fall in the rejection zone. For this
    // seed the first three draws do, and the fourth is the one returned.
    fn check_uniform_rejection() {
        let seed = Seed::from_bytes([9u8; 32]);
        let bound = (1u64 << 63) + 1;
        let b0 = block(&seed, 0);
        let raw: Vec<u64> = (0..4)
            .map(|i| {
                let mut word = [0u8; 8];
                word.copy_from_slice(&b0[i * 8..i * 8 + 8]);
                u64::from_be_bytes(word)
            })
            .collect();
        assert_eq!(
            raw,
            vec![
                0xab3f_4f55_f479_2210,
                0xe548_2204_567b_847e,
                0xac97_69de_bdec_b187,
                0x5f9f_aa5c_cd59_f17c
            ]
        );
        for &x in &raw[..3] {
            if x < bound {
                panic!("draw {:#x} was expected to be rejected", x);
            }
        }

        let mut drbg = HashDrbg::new(&seed);
        assert_eq!(drbg.uniform(bound), 0x5f9f_aa5c_cd59_f17c);
        // Exactly four draws were consumed; the next one starts block one.
        let mut word = [0u8; 8];
        word.copy_from_slice(&block(&seed, 1)[..8]);
        assert_eq!(drbg.next_u64(), u64::from_be_bytes(word));

        // A later call keeps rejecting from where the stream stands.
        let mut drbg = HashDrbg::new(&Seed::from_bytes([2u8; 32]));
        assert_eq!(drbg.uniform(bound), 0x63a8_3369_a11b_858f);
        assert_eq!(drbg.uniform(bound), 0x1532_44b7_c46f_bd3c);
    }

    #[test]
    // Every residue of a small bound shows up with a roughly even share.
    fn check_uniform_spread() {
        let mut drbg = HashDrbg::new(&Seed::from_bytes([4u8; 32]));
        let mut counts = [0usize; 6];
        for _ in 0..60_000 {
            counts[drbg.uniform(6) as usize] += 1;
        }
        for (v, &n) in counts.iter().enumerate() {
            if !(9_000..=11_000).contains(&n) {
                panic!("value {} drawn {} times out of 60000", v, n);
            }
        }
    }
}
