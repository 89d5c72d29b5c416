//! Test helpers and fixtures for Cadence integration tests.
//!
//! Every engine built here is headless: notes go to a [`VoiceLog`], time is
//! a [`ManualClock`] advanced by the test, and the microphone is a
//! [`ReplayCapture`]. Nothing touches audio hardware, so tests run in CI.

#![allow(dead_code)]

use cadence::prelude::*;
use std::time::{Duration, Instant};

/// Sample rate for offline renders (low keeps tests fast).
pub const TEST_SAMPLE_RATE: f64 = 8000.0;

/// Silence threshold (~-80dB).
pub const SILENCE_THRESHOLD: f32 = 0.0001;

/// Seconds per step at the default 120 BPM.
pub const STEP_120: f64 = 0.125;

/// Headless engine plus handles to everything it talks to.
pub struct Headless {
    pub engine: CadenceEngine,
    pub voices: Arc<VoiceLog>,
    pub clock: Arc<ManualClock>,
    pub mic: ReplayCapture,
}

pub fn headless() -> Headless {
    headless_with(CadenceEngine::builder(), test_mic())
}

pub fn headless_with(builder: CadenceEngineBuilder, mic: ReplayCapture) -> Headless {
    init_tracing();
    let voices = Arc::new(VoiceLog::new());
    let clock = Arc::new(ManualClock::default());
    let engine = builder
        .voice_sink(voices.clone())
        .clock(clock.clone())
        .capture_backend(Arc::new(mic.clone()))
        .build()
        .expect("Failed to create headless engine");
    Headless {
        engine,
        voices,
        clock,
        mic,
    }
}

/// Route engine logs to the test harness. Safe to call repeatedly.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}

/// Mono 8 kHz microphone that delivers 300 frames.
pub fn test_mic() -> ReplayCapture {
    ReplayCapture::new(
        CaptureFormat {
            sample_rate: 8000,
            channels: 1,
        },
        vec![generate_sine(440.0, 8000.0, 100), generate_sine(440.0, 8000.0, 200)],
    )
}

/// Poll `done` every 2 ms until it holds or `timeout` passes.
pub fn wait_until(timeout: Duration, mut done: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if done() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(2));
    }
    done()
}

/// Generate a test signal: sine wave at given frequency for specified samples.
pub fn generate_sine(frequency: f64, sample_rate: f64, num_samples: usize) -> Vec<f32> {
    (0..num_samples)
        .map(|i| {
            let t = i as f64 / sample_rate;
            (0.5 * (2.0 * std::f64::consts::PI * frequency * t).sin()) as f32
        })
        .collect()
}

/// Index of the first sample above the silence threshold.
pub fn first_sound(samples: &[f32]) -> Option<usize> {
    samples.iter().position(|s| s.abs() > SILENCE_THRESHOLD)
}

pub fn peak(samples: &[f32]) -> f32 {
    samples.iter().fold(0.0f32, |max, s| max.max(s.abs()))
}
