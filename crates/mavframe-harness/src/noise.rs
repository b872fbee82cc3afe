//! Seeded line noise for resynchronization tests.
//!
//! The same seed always produces the same bytes, so a failing stream can be
//! replayed exactly.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Deterministic garbage generator.
#[derive(Debug, Clone)]
pub struct Noise {
    rng: ChaCha8Rng,
}

impl Noise {
    /// Generator seeded with `seed`
    pub fn new(seed: u64) -> Self {
        Self { rng: ChaCha8Rng::seed_from_u64(seed) }
    }

    /// `len` random bytes. Marker bytes are included.
    pub fn garbage(&mut self, len: usize) -> Vec<u8> {
        let mut bytes = vec![0u8; len];
        self.rng.fill(&mut bytes[..]);
        bytes
    }

    /// Concatenate `frames` with up to `max_gap` random bytes before each one
    /// and after the last.
    pub fn interleave<'a>(&mut self, frames: impl IntoIterator<Item = &'a [u8]>, max_gap: usize) -> Vec<u8> {
        let mut stream = Vec::new();
        for frame in frames {
            let gap = self.rng.gen_range(0..=max_gap);
            stream.extend(self.garbage(gap));
            stream.extend_from_slice(frame);
        }
        let tail = self.rng.gen_range(0..=max_gap);
        stream.extend(self.garbage(tail));
        stream
    }
}
