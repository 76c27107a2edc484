// Deterministic, portable pseudo-random number generator.
//
// Implements xoshiro256++ (Blackman & Vigna, 2019) with SplitMix64 seeding.
// Hand-rolled with zero external dependencies so that output is identical
// across platforms and compiler versions.
//
// On top of the raw generator sits the "rand15" family: 15-bit draws scaled
// into a caller-supplied span. The navigation core uses these for random
// wander targets and for scattering fallback waypoints inside a box, where
// the classic engine behavior is a 15-bit draw multiplied by the span and
// shifted down, not an unbiased range sample.
//
// This crate is the single PRNG of the boxnav workspace. `boxnav_sim`
// re-exports it as `boxnav_sim::prng`.
//
// **Critical constraint: determinism.** Every method on `GameRng` must produce
// identical output given the same prior state, regardless of platform.
// No floating-point arithmetic in the core generator, no OS entropy.

use serde::{Deserialize, Serialize};

/// Exclusive upper bound of a 15-bit draw.
pub const RAND15_SPAN: i64 = 1 << 15;

/// Xoshiro256++ PRNG — the workspace's sole source of randomness.
///
/// The simulation owns exactly one `GameRng`; every random decision made
/// during a tick (wander targets, fallback waypoints, spawn facing) draws
/// from it in actor order, so a saved game continues identically.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameRng {
    s: [u64; 4],
}

impl GameRng {
    /// Create a new PRNG seeded from a `u64`.
    ///
    /// Uses SplitMix64 to expand the seed into the 256-bit internal state.
    pub fn new(seed: u64) -> Self {
        let mut sm = seed;
        Self {
            s: [
                splitmix64(&mut sm),
                splitmix64(&mut sm),
                splitmix64(&mut sm),
                splitmix64(&mut sm),
            ],
        }
    }

    /// Generate the next `u64` in the sequence.
    pub fn next_u64(&mut self) -> u64 {
        let result = (self.s[0].wrapping_add(self.s[3]))
            .rotate_left(23)
            .wrapping_add(self.s[0]);

        let t = self.s[1] << 17;

        self.s[2] ^= self.s[0];
        self.s[3] ^= self.s[1];
        self.s[1] ^= self.s[2];
        self.s[0] ^= self.s[3];

        self.s[2] ^= t;
        self.s[3] = self.s[3].rotate_left(45);

        result
    }

    /// Generate a `u32` by taking the upper 32 bits of a `u64`.
    pub fn next_u32(&mut self) -> u32 {
        (self.next_u64() >> 32) as u32
    }

    /// Generate a uniform random integer in `[low, high)`.
    ///
    /// Uses rejection sampling to avoid modulo bias.
    /// Panics if `low >= high`.
    pub fn range_u64(&mut self, low: u64, high: u64) -> u64 {
        assert!(low < high, "range_u64: low must be less than high");
        let range = high - low;
        if range.is_power_of_two() {
            return low + (self.next_u64() & (range - 1));
        }
        let threshold = range.wrapping_neg() % range;
        loop {
            let r = self.next_u64();
            if r >= threshold {
                return low + (r % range);
            }
        }
    }

    /// Generate a uniform random `usize` in `[low, high)`.
    ///
    /// Panics if `low >= high`.
    pub fn range_usize(&mut self, low: usize, high: usize) -> usize {
        self.range_u64(low as u64, high as u64) as usize
    }

    /// A raw 15-bit draw in `[0, 32768)`.
    pub fn rand15(&mut self) -> i32 {
        (self.next_u64() >> 49) as i32
    }

    /// A 15-bit draw scaled into `[0, span)`.
    ///
    /// Non-positive spans yield 0, so a degenerate span collapses onto its
    /// lower edge instead of panicking.
    pub fn rand15_scaled(&mut self, span: i32) -> i32 {
        if span <= 0 {
            return 0;
        }
        let draw = self.rand15() as i64;
        (draw * span as i64 / RAND15_SPAN) as i32
    }

    /// A signed 15-bit draw scaled into `(-span, span)`.
    pub fn rand15_signed(&mut self, span: i32) -> i32 {
        if span <= 0 {
            return 0;
        }
        let draw = self.rand15() as i64 * 2 - RAND15_SPAN;
        (draw * span as i64 / RAND15_SPAN) as i32
    }
}

/// SplitMix64 — used only for seeding xoshiro256++ from a single `u64`.
fn splitmix64(state: &mut u64) -> u64 {
    *state = state.wrapping_add(0x9e37_79b9_7f4a_7c15);
    let mut z = *state;
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn determinism_same_seed_same_output() {
        let mut a = GameRng::new(42);
        let mut b = GameRng::new(42);
        for _ in 0..1000 {
            assert_eq!(a.next_u64(), b.next_u64());
        }
    }

    #[test]
    fn different_seeds_different_output() {
        let mut a = GameRng::new(42);
        let mut b = GameRng::new(43);
        assert_ne!(a.next_u64(), b.next_u64());
    }

    #[test]
    fn range_u64_within_bounds() {
        let mut rng = GameRng::new(999);
        for _ in 0..10_000 {
            let v = rng.range_u64(10, 20);
            assert!((10..20).contains(&v), "range_u64 out of range: {v}");
        }
    }

    #[test]
    fn range_usize_within_bounds() {
        let mut rng = GameRng::new(555);
        for _ in 0..10_000 {
            let v = rng.range_usize(5, 15);
            assert!((5..15).contains(&v), "range_usize out of range: {v}");
        }
    }

    #[test]
    fn rand15_is_fifteen_bits() {
        let mut rng = GameRng::new(7);
        let mut saw_high = false;
        for _ in 0..10_000 {
            let v = rng.rand15();
            assert!((0..32768).contains(&v), "rand15 out of range: {v}");
            saw_high |= v >= 16384;
        }
        assert!(saw_high, "rand15 should use its top bit");
    }

    #[test]
    fn rand15_scaled_within_span() {
        let mut rng = GameRng::new(12345);
        for _ in 0..10_000 {
            let v = rng.rand15_scaled(800);
            assert!((0..800).contains(&v), "rand15_scaled out of range: {v}");
        }
    }

    #[test]
    fn rand15_scaled_degenerate_span_is_zero() {
        let mut rng = GameRng::new(1);
        assert_eq!(rng.rand15_scaled(0), 0);
        assert_eq!(rng.rand15_scaled(-50), 0);
    }

    #[test]
    fn rand15_signed_within_span() {
        let mut rng = GameRng::new(31);
        let mut saw_negative = false;
        for _ in 0..10_000 {
            let v = rng.rand15_signed(16384);
            assert!(v > -16385 && v < 16384, "rand15_signed out of range: {v}");
            saw_negative |= v < 0;
        }
        assert!(saw_negative);
    }

    #[test]
    fn serialization_roundtrip() {
        let mut rng = GameRng::new(42);
        for _ in 0..100 {
            rng.next_u64();
        }
        let json = serde_json::to_string(&rng).unwrap();
        let mut restored: GameRng = serde_json::from_str(&json).unwrap();
        assert_eq!(rng, restored);
        for _ in 0..100 {
            assert_eq!(rng.rand15(), restored.rand15());
        }
    }
}
