/// Pseudo-random draws for the effect engine.
///
/// A tiny xorshift64 generator instead of an external crate: every draw the
/// engine makes flows through one seedable instance, so a fixed seed replays
/// an identical animation frame for frame. Tests lean on that.

use std::time::{SystemTime, UNIX_EPOCH};

/// Fallback state for the all-zero seed (xorshift sticks at zero).
const ZERO_SEED_SUBST: u64 = 0x9E37_79B9_7F4A_7C15;

#[derive(Clone, Debug)]
pub struct RandomSource {
    state: u64,
}

impl RandomSource {
    /// Fixed-seed source for reproducible runs.
    pub fn seeded(seed: u64) -> Self {
        let state = if seed == 0 { ZERO_SEED_SUBST } else { seed };
        RandomSource { state }
    }

    /// Clock-seeded source for normal runs.
    pub fn from_entropy() -> Self {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(ZERO_SEED_SUBST);
        RandomSource::seeded(nanos)
    }

    /// Next raw 64-bit draw (xorshift64: 13/7/17).
    pub fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state = x;
        x
    }

    /// Uniform pick in `0..n`. `n` must be nonzero.
    pub fn below(&mut self, n: u64) -> u64 {
        self.next_u64() % n
    }

    /// Uniform pick in `lo..=hi`.
    pub fn between(&mut self, lo: u64, hi: u64) -> u64 {
        lo + self.below(hi - lo + 1)
    }

    /// Uniform float in `[0, 1)`, from the top 53 bits of a draw.
    pub fn unit_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }
}
