//! Deterministic simulation-level RNG.
//!
//! The stop cycle runs on a single cooperative thread, so one seeded
//! `SmallRng` drives every random draw (spawn counts, boarding wishes,
//! alight selection, cruise dwell).  Draw order is fixed by the cycle, which
//! makes whole runs reproducible from `SimConfig::seed`.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::config::Range;

/// Simulation-level RNG.
pub struct SimRng(SmallRng);

impl SimRng {
    pub fn new(seed: u64) -> Self {
        SimRng(SmallRng::seed_from_u64(seed))
    }

    /// `true` with probability `p` (clamped to [0, 1]).
    #[inline]
    pub fn gen_bool(&mut self, p: f64) -> bool {
        self.0.gen_bool(p.clamp(0.0, 1.0))
    }

    /// Integer drawn uniformly from the inclusive range `[min, max]`.
    /// An inverted range yields `min` without consuming a draw.
    pub fn count_in(&mut self, range: Range<u32>) -> u32 {
        if range.max < range.min {
            return range.min;
        }
        self.0.gen_range(range.min..=range.max)
    }

    /// Float drawn uniformly from `[min, max)`; `min` when the range is empty.
    pub fn secs_in(&mut self, range: Range<f32>) -> f32 {
        if range.max <= range.min {
            return range.min;
        }
        self.0.gen_range(range.min..range.max)
    }
}
