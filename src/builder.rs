//! Builder for configuring and constructing a `CadenceEngine`.

use crate::{CadenceEngine, Result};
use cadence_core::{AudioClock, SchedulerConfig, Sequencer, SystemClock, VoiceSink};
use cadence_sampler::{CaptureBackend, Recorder};
use std::sync::Arc;

/// By default the engine opens the system output device, plays notes through
/// the built-in synthesizer and stamps steps against the output's sample
/// clock. Supplying a [`VoiceSink`] skips the output device entirely; the
/// scheduler then runs on a [`SystemClock`] unless a clock is given too.
///
/// # Example
///
/// ```ignore
/// use cadence::prelude::*;
///
/// let engine = CadenceEngine::builder()
///     .bpm(100.0)
///     .build()?;
///
/// // Headless: notes go to a log, time is driven by hand.
/// let engine = CadenceEngine::builder()
///     .voice_sink(Arc::new(VoiceLog::new()))
///     .clock(Arc::new(ManualClock::default()))
///     .capture_backend(Arc::new(ReplayCapture::denied()))
///     .build()?;
/// ```
#[derive(Default)]
pub struct CadenceEngineBuilder {
    config: SchedulerConfig,
    #[cfg_attr(not(feature = "audio"), allow(dead_code))]
    output_device: Option<usize>,
    input_device: Option<usize>,
    clock: Option<Arc<dyn AudioClock>>,
    voice_sink: Option<Arc<dyn VoiceSink>>,
    capture_backend: Option<Arc<dyn CaptureBackend>>,
}

impl CadenceEngineBuilder {
    /// Default: 120
    pub fn bpm(mut self, bpm: f64) -> Self {
        self.config.bpm = bpm;
        self
    }

    pub fn scheduler_config(mut self, config: SchedulerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn output_device(mut self, index: usize) -> Self {
        self.output_device = Some(index);
        self
    }

    pub fn input_device(mut self, index: usize) -> Self {
        self.input_device = Some(index);
        self
    }

    pub fn clock(mut self, clock: Arc<dyn AudioClock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Send notes here instead of the built-in synthesizer.
    pub fn voice_sink(mut self, sink: Arc<dyn VoiceSink>) -> Self {
        self.voice_sink = Some(sink);
        self
    }

    /// Record from this backend instead of the default input device.
    pub fn capture_backend(mut self, backend: Arc<dyn CaptureBackend>) -> Self {
        self.capture_backend = Some(backend);
        self
    }

    pub fn build(self) -> Result<CadenceEngine> {
        self.config.validate()?;

        #[cfg(feature = "audio")]
        let (output, sink, clock) = match self.voice_sink {
            Some(sink) => (None, sink, self.clock),
            None => {
                let (output, synth) = cadence_synth::AudioOutput::open(self.output_device)?;
                let clock = self
                    .clock
                    .unwrap_or_else(|| Arc::new(synth.clone()) as Arc<dyn AudioClock>);
                (Some(output), Arc::new(synth) as Arc<dyn VoiceSink>, Some(clock))
            }
        };

        #[cfg(not(feature = "audio"))]
        let (sink, clock) = match self.voice_sink {
            Some(sink) => (sink, self.clock),
            None => {
                return Err(crate::Error::InvalidConfig(
                    "no voice sink: enable the `audio` feature or call `voice_sink`".into(),
                ))
            }
        };

        let clock = clock.unwrap_or_else(|| Arc::new(SystemClock::new()) as Arc<dyn AudioClock>);
        let sequencer = Sequencer::new(self.config, clock, sink)?;

        let capture = match self.capture_backend {
            Some(backend) => backend,
            None => default_capture(self.input_device),
        };

        Ok(CadenceEngine::from_parts(
            sequencer,
            Recorder::new(capture),
            #[cfg(feature = "audio")]
            output,
        ))
    }
}

#[cfg(feature = "audio")]
fn default_capture(device: Option<usize>) -> Arc<dyn CaptureBackend> {
    Arc::new(cadence_sampler::CpalCapture::new(device))
}

#[cfg(not(feature = "audio"))]
fn default_capture(device: Option<usize>) -> Arc<dyn CaptureBackend> {
    if device.is_some() {
        tracing::warn!("input_device ignored: built without the `audio` feature");
    }
    Arc::new(cadence_sampler::ReplayCapture::denied())
}
