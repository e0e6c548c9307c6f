//! Deterministic RNG wrapper used by the missing-value generators.

use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};

/// Seed shared by every randomized scenario.
///
/// Each generator call builds a fresh handle from this seed, so the same
/// `(rows, columns, test case)` always yields the same layout.
pub const SCENARIO_SEED: u64 = 58975;

/// Deterministic RNG handle exposed to gapbench consumers.
///
/// The handle is a thin wrapper around `StdRng` that documents the seeding
/// policy: generators never share a handle across calls and never draw from
/// entropy.
#[derive(Debug, Clone)]
pub struct RngHandle {
    rng: StdRng,
}

impl RngHandle {
    /// Creates a new RNG handle from a master seed.
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Creates the handle used by scenario generators.
    pub fn scenario() -> Self {
        Self::from_seed(SCENARIO_SEED)
    }
}

impl RngCore for RngHandle {
    fn next_u32(&mut self) -> u32 {
        self.rng.next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        self.rng.next_u64()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.rng.fill_bytes(dest)
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.rng.try_fill_bytes(dest)
    }
}
