//! Synthetic reverb impulse response.
//!
//! Two channels of independent white noise under a `(1 - i/N)^5` decay,
//! two seconds long. Built once per output and shared by every voice.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Length of the generated response in seconds.
pub const IMPULSE_SECONDS: f64 = 2.0;

const DECAY_EXPONENT: i32 = 5;

// Convolution gain normalization, matching the browser ConvolverNode.
const GAIN_CALIBRATION: f32 = 0.00125;
const GAIN_CALIBRATION_SAMPLE_RATE: f64 = 44100.0;
const MIN_POWER: f32 = 0.000125;

#[derive(Debug, Clone, PartialEq)]
pub struct ImpulseResponse {
    sample_rate: f64,
    left: Vec<f32>,
    right: Vec<f32>,
}

impl ImpulseResponse {
    /// Fresh random response.
    pub fn generate(sample_rate: f64) -> Self {
        Self::generate_with(sample_rate, &mut rand::thread_rng())
    }

    /// Reproducible response for offline renders and tests.
    pub fn seeded(sample_rate: f64, seed: u64) -> Self {
        Self::generate_with(sample_rate, &mut StdRng::seed_from_u64(seed))
    }

    pub fn generate_with<R: Rng + ?Sized>(sample_rate: f64, rng: &mut R) -> Self {
        let len = (sample_rate * IMPULSE_SECONDS).max(0.0) as usize;
        let mut channel = || -> Vec<f32> {
            (0..len)
                .map(|i| {
                    let noise = rng.gen::<f32>() * 2.0 - 1.0;
                    noise * (1.0 - i as f32 / len as f32).powi(DECAY_EXPONENT)
                })
                .collect()
        };
        let left = channel();
        let right = channel();
        Self {
            sample_rate,
            left,
            right,
        }
    }

    /// Response from explicit channel data.
    pub fn from_channels(sample_rate: f64, left: Vec<f32>, right: Vec<f32>) -> Self {
        Self {
            sample_rate,
            left,
            right,
        }
    }

    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    pub fn left(&self) -> &[f32] {
        &self.left
    }

    pub fn right(&self) -> &[f32] {
        &self.right
    }

    /// Frames per channel.
    pub fn len(&self) -> usize {
        self.left.len().max(self.right.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Gain applied to the response before convolution so that loud and
    /// quiet responses produce a similar wet level.
    pub fn normalization_gain(&self) -> f32 {
        let samples = self.left.len() + self.right.len();
        if samples == 0 {
            return 1.0;
        }
        let energy: f32 = self.left.iter().chain(&self.right).map(|s| s * s).sum();
        let power = (energy / samples as f32).sqrt().max(MIN_POWER);

        let mut scale = GAIN_CALIBRATION / power;
        if self.sample_rate > 0.0 {
            scale *= (GAIN_CALIBRATION_SAMPLE_RATE / self.sample_rate) as f32;
        }
        scale
    }
}
