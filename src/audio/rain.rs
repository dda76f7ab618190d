use rodio::Source;
use std::f32::consts::TAU;
use std::time::Duration;

use super::brown_noise::{BrownWalk, SAMPLE_RATE};

/// Rain: band-passed brown noise with a slow swell in loudness.
pub struct RainSound {
    walk: BrownWalk,
    // 2nd order bandpass state
    x1: f32,
    x2: f32,
    y1: f32,
    y2: f32,
    modulation_phase: f32,
}

impl RainSound {
    pub fn new() -> Self {
        Self::with_walk(BrownWalk::new())
    }

    #[cfg(test)]
    pub(crate) fn seeded(seed: u64) -> Self {
        Self::with_walk(BrownWalk::seeded(seed))
    }

    fn with_walk(walk: BrownWalk) -> Self {
        Self {
            walk,
            x1: 0.0,
            x2: 0.0,
            y1: 0.0,
            y2: 0.0,
            modulation_phase: 0.0,
        }
    }

    // Approximate Butterworth bandpass, centre ~3kHz, Q ~0.7
    fn bandpass(&mut self, input: f32) -> f32 {
        const B0: f32 = 0.1;
        const B2: f32 = -0.1;
        const A1: f32 = -1.8;
        const A2: f32 = 0.85;

        let output = B0 * input + B2 * self.x2 - A1 * self.y1 - A2 * self.y2;

        self.x2 = self.x1;
        self.x1 = input;
        self.y2 = self.y1;
        self.y1 = output;

        output
    }
}

impl Iterator for RainSound {
    type Item = f32;

    fn next(&mut self) -> Option<Self::Item> {
        let brown = self.walk.next_sample();
        let filtered = self.bandpass(brown);

        self.modulation_phase += 0.3 / SAMPLE_RATE as f32;
        if self.modulation_phase > TAU {
            self.modulation_phase -= TAU;
        }
        let modulation = 0.7 + 0.3 * self.modulation_phase.sin();

        let mix = filtered * 0.8 + brown * 0.2;
        Some(mix * modulation * 0.4)
    }
}

impl Source for RainSound {
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
