//! Seeded random streams for joint choice sampling.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use siphasher::sip::SipHasher13;
use std::hash::Hasher;

/// Seeded `StdRng` used by every Monte Carlo routine.
///
/// A run is identified by a master seed and a stream number. The stream seed
/// is SipHash-1-3 (zero keys) over both, so it is the same on every platform
/// and distinct streams of one seed do not share draws.
#[derive(Debug, Clone)]
pub struct RngHandle {
    rng: StdRng,
}

impl RngHandle {
    /// Seeds the handle directly.
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Handle for stream `stream` of `master_seed`.
    pub fn substream(master_seed: u64, stream: u64) -> Self {
        Self::from_seed(derive_substream_seed(master_seed, stream))
    }

    /// Uniform draw from `[0, 1)`.
    pub fn unit_f64(&mut self) -> f64 {
        self.rng.gen::<f64>()
    }
}

/// Seed of stream `stream` under `master_seed`.
pub fn derive_substream_seed(master_seed: u64, stream: u64) -> u64 {
    let mut hasher = SipHasher13::new_with_keys(0, 0);
    hasher.write_u64(master_seed);
    hasher.write_u64(stream);
    hasher.finish()
}
