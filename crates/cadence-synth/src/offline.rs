//! Faster-than-realtime bounce of an arrangement.
//!
//! Runs the same lookahead scheduler as live playback, but polls it from the
//! bus's frame counter instead of a timer thread, one lookahead interval of
//! audio per poll. The result is interleaved stereo.

use crate::bus::MasterBus;
use crate::convolver::{ConvolutionReverb, DEFAULT_BLOCK_SIZE};
use crate::error::{validate_sample_rate, Result};
use crate::impulse::ImpulseResponse;
use cadence_core::{
    dispatch_step, seconds_per_bar, seconds_per_step, AudioClock, LookaheadScheduler,
    SchedulerConfig, Track,
};

/// Seed of the impulse response used when none is supplied.
pub const DEFAULT_IMPULSE_SEED: u64 = 0x5EED;

/// Offline render settings.
///
/// # Example
///
/// ```ignore
/// let audio = OfflineRenderer::new(48000.0).bars(2).render(&tracks, &config)?;
/// ```
#[derive(Debug, Clone)]
pub struct OfflineRenderer {
    sample_rate: f64,
    bars: usize,
    tail_seconds: f64,
    impulse: Option<ImpulseResponse>,
    reverb_block: usize,
}

impl OfflineRenderer {
    pub fn new(sample_rate: f64) -> Self {
        Self {
            sample_rate,
            bars: 1,
            tail_seconds: 0.0,
            impulse: None,
            reverb_block: DEFAULT_BLOCK_SIZE,
        }
    }

    pub fn bars(mut self, bars: usize) -> Self {
        self.bars = bars;
        self
    }

    /// Extra seconds rendered after the last bar so voices and reverb can
    /// ring out. No steps are scheduled in the tail.
    pub fn tail(mut self, seconds: f64) -> Self {
        self.tail_seconds = seconds.max(0.0);
        self
    }

    /// Use `impulse` for the reverb instead of the seeded default.
    pub fn impulse(mut self, impulse: ImpulseResponse) -> Self {
        self.impulse = Some(impulse);
        self
    }

    pub fn reverb_block_size(mut self, block: usize) -> Self {
        self.reverb_block = block;
        self
    }

    pub fn render(&self, tracks: &[Track], config: &SchedulerConfig) -> Result<Vec<f32>> {
        config.validate()?;
        validate_sample_rate(self.sample_rate)?;

        let impulse = match &self.impulse {
            Some(ir) => ir.clone(),
            None => ImpulseResponse::seeded(self.sample_rate, DEFAULT_IMPULSE_SEED),
        };
        let reverb = ConvolutionReverb::with_block_size(&impulse, self.reverb_block);
        let (mut bus, synth) = MasterBus::with_reverb(self.sample_rate, reverb)?;

        let music_seconds = self.bars as f64 * seconds_per_bar(config.bpm);
        let music_frames = (music_seconds * self.sample_rate).round() as usize;
        let total_frames =
            music_frames + (self.tail_seconds * self.sample_rate).round() as usize;
        let block = ((config.lookahead_interval.as_secs_f64() * self.sample_rate).round()
            as usize)
            .max(1);
        let step_len = seconds_per_step(config.bpm);

        let mut scheduler = LookaheadScheduler::new(config);
        scheduler.reset(0.0);

        let mut out = vec![0.0f32; total_frames * 2];
        for chunk in out.chunks_mut(block * 2) {
            let now = synth.now();
            if now < music_seconds {
                scheduler.poll(now, step_len, |step| {
                    if step.time < music_seconds {
                        dispatch_step(tracks, step.step, step.time, &synth);
                    }
                });
            }
            bus.render(chunk);
        }

        tracing::debug!(
            tracks = tracks.len(),
            bars = self.bars,
            frames = total_frames,
            "offline render finished"
        );
        Ok(out)
    }
}

/// Render `bars` bars of `tracks` at `sample_rate` with the default reverb.
pub fn render_offline(
    tracks: &[Track],
    config: &SchedulerConfig,
    sample_rate: f64,
    bars: usize,
) -> Result<Vec<f32>> {
    OfflineRenderer::new(sample_rate).bars(bars).render(tracks, config)
}
