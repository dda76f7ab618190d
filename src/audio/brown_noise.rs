use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rodio::Source;
use std::time::Duration;

pub(crate) const SAMPLE_RATE: u32 = 44100;

/// Leaky integrated white noise. Shared by every generated texture.
pub(crate) struct BrownWalk {
    last_value: f32,
    rng: StdRng,
}

impl BrownWalk {
    pub(crate) fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    #[cfg(test)]
    pub(crate) fn seeded(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        Self {
            last_value: 0.0,
            rng,
        }
    }

    pub(crate) fn next_sample(&mut self) -> f32 {
        let white: f32 = self.rng.gen_range(-1.0..1.0);
        self.last_value = (self.last_value + white * 0.02).clamp(-1.0, 1.0);
        // Decay keeps DC offset from building up
        self.last_value *= 0.9999;
        self.last_value
    }
}

/// Brown noise: power falls 6 dB per octave. Used for the cafe murmur.
pub struct BrownNoise {
    walk: BrownWalk,
}

impl BrownNoise {
    pub fn new() -> Self {
        Self {
            walk: BrownWalk::new(),
        }
    }

    #[cfg(test)]
    pub(crate) fn seeded(seed: u64) -> Self {
        Self {
            walk: BrownWalk::seeded(seed),
        }
    }
}

impl Iterator for BrownNoise {
    type Item = f32;

    fn next(&mut self) -> Option<Self::Item> {
        Some(self.walk.next_sample() * 0.3)
    }
}

impl Source for BrownNoise {
    fn current_frame_len(&self) -> Option<usize> {
        None
    }

    fn channels(&self) -> u16 {
        1
    }

    fn sample_rate(&self) -> u32 {
        SAMPLE_RATE
    }

    fn total_duration(&self) -> Option<Duration> {
        None
    }
}
