//! Interaction pacer.
//!
//! Responsibilities:
//! - Draw uniform jitter for every wait in the pipeline
//! - Parameterize per-character typing delay
//! - Generate pointer-movement noise points
//!
//! Stateless: nothing is retained between calls. Uniform jitter approximates
//! human timing variance; it is not cryptographically random and need not be.

use rand::Rng;

use crate::config::DelayRange;

/// Interaction pacer.
#[derive(Debug, Clone, Copy, Default)]
pub struct Pacer;

impl Pacer {
    pub fn new() -> Self {
        Self
    }

    /// A duration in milliseconds drawn uniformly from `[min, max]`
    /// inclusive.
    pub fn delay(&self, min: u64, max: u64) -> u64 {
        if min >= max {
            return min;
        }
        rand::rng().random_range(min..=max)
    }

    /// Jitter drawn from a configured range.
    pub fn jitter(&self, range: &DelayRange) -> u64 {
        self.delay(range.min, range.max)
    }

    /// Random in-viewport points for cosmetic pointer movement, 3 to 7 per
    /// burst.
    pub fn pointer_path(&self, width: u32, height: u32) -> Vec<(u32, u32)> {
        let mut rng = rand::rng();
        let moves = rng.random_range(3..=7);
        (0..moves)
            .map(|_| {
                (
                    rng.random_range(0..width.max(1)),
                    rng.random_range(0..height.max(1)),
                )
            })
            .collect()
    }
}
