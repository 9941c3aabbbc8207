// crates/sv_core/src/rng.rs
//
// Deterministic, integer-only RNG for the randomized searches.
// Fixed seeds keep recorded experiment outputs reproducible for a given
// iteration count; no OS entropy is ever consulted.

use rand_chacha::ChaCha20Rng;
use rand_core::{RngCore, SeedableRng};

/// Seeded RNG used by the IRV hill-climb and the sampling search.
///
/// Internally uses ChaCha20 with an explicit 32-byte seed derived from the
/// 64-bit seed (little-endian bytes in the first 8 positions; the rest 0).
#[derive(Debug, Clone)]
pub struct SearchRng {
    rng: ChaCha20Rng,
    words_consumed: u128,
}

impl SearchRng {
    #[inline]
    pub fn from_seed_u64(seed: u64) -> Self {
        let mut seed32 = [0u8; 32];
        seed32[..8].copy_from_slice(&seed.to_le_bytes());
        Self {
            rng: ChaCha20Rng::from_seed(seed32),
            words_consumed: 0,
        }
    }

    /// Total number of 64-bit words drawn so far (saturating).
    #[inline]
    pub fn words_consumed(&self) -> u128 {
        self.words_consumed
    }

    #[inline]
    fn next_u64(&mut self) -> u64 {
        self.words_consumed = self.words_consumed.saturating_add(1);
        self.rng.next_u64()
    }

    /// Unbiased integer in `[0, n)` via rejection sampling. `None` if `n == 0`.
    ///
    /// Let `threshold = 2^64 mod n`; accept `x` if `x >= threshold`, then
    /// `x % n` is uniformly distributed.
    #[inline]
    pub fn gen_range(&mut self, n: u64) -> Option<u64> {
        if n == 0 {
            return None;
        }
        let threshold = n.wrapping_neg() % n;
        loop {
            let x = self.next_u64();
            if x >= threshold {
                return Some(x % n);
            }
        }
    }

    /// Index in `[0, n)`; `None` if `n == 0`.
    #[inline]
    pub fn choose_index(&mut self, n: usize) -> Option<usize> {
        self.gen_range(n as u64).map(|v| v as usize)
    }

    /// Swap two independently drawn positions. Both draws may land on the same
    /// slot, in which case the slice is unchanged.
    #[inline]
    pub fn swap_random<T>(&mut self, slice: &mut [T]) {
        let n = slice.len();
        if let (Some(i), Some(j)) = (self.choose_index(n), self.choose_index(n)) {
            slice.swap(i, j);
        }
    }

    /// Apply `swaps` random pairwise swaps.
    pub fn perturb<T>(&mut self, slice: &mut [T], swaps: usize) {
        for _ in 0..swaps {
            self.swap_random(slice);
        }
    }
}
