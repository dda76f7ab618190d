use rodio::Source;
use std::f32::consts::TAU;
use std::time::Duration;

use super::brown_noise::{BrownWalk, SAMPLE_RATE};

/// Seconds between two wave crests.
const SWELL_PERIOD_SECS: f32 = 9.0;

/// Surf: stereo brown noise under a slow crest/trough envelope. The right
/// channel lags the left slightly so the swell drifts across the field.
pub struct WavesSound {
    left: BrownWalk,
    right: BrownWalk,
    swell_phase: f32,
    num_sample: usize,
}

impl WavesSound {
    pub fn new() -> Self {
        Self {
            left: BrownWalk::new(),
            right: BrownWalk::new(),
            swell_phase: 0.0,
            num_sample: 0,
        }
    }

    #[cfg(test)]
    pub(crate) fn seeded(seed: u64) -> Self {
        Self {
            left: BrownWalk::seeded(seed),
            right: BrownWalk::seeded(seed.wrapping_add(1)),
            swell_phase: 0.0,
            num_sample: 0,
        }
    }

    fn envelope(phase: f32) -> f32 {
        // 0 at trough, 1 at crest, sharpened so crests are brief
        let swell = 0.5 - 0.5 * phase.cos();
        0.15 + 0.85 * swell * swell
    }
}

impl Iterator for WavesSound {
    type Item = f32;

    fn next(&mut self) -> Option<Self::Item> {
        self.num_sample = self.num_sample.wrapping_add(1);

        // Interleaved stereo: advance the envelope once per frame
        let sample = if self.num_sample % 2 == 0 {
            self.swell_phase += TAU / (SWELL_PERIOD_SECS * SAMPLE_RATE as f32);
            if self.swell_phase > TAU {
                self.swell_phase -= TAU;
            }
            self.left.next_sample() * Self::envelope(self.swell_phase)
        } else {
            self.right.next_sample() * Self::envelope(self.swell_phase - 0.4)
        };

        Some(sample * 0.35)
    }
}

impl Source for WavesSound {
    fn current_frame_len(&self) -> Option<usize> {
        None
    }

    fn channels(&self) -> u16 {
        2
    }

    fn sample_rate(&self) -> u32 {
        SAMPLE_RATE
    }

    fn total_duration(&self) -> Option<Duration> {
        None
    }
}
