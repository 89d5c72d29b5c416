//! Master bus: mixes running voices and the shared reverb.
//!
//! The bus lives on the audio thread. [`SynthHandle`] is the control side:
//! it turns notes into [`VoiceParams`] and queues them with a start frame.
//! The bus's rendered frame count doubles as the audio clock.

use crate::convolver::ConvolutionReverb;
use crate::error::{validate_sample_rate, Result};
use crate::impulse::ImpulseResponse;
use crate::voice::{Voice, VoiceParams};
use cadence_core::{AudioClock, Note, Track, VoiceSink};
use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Voices that may wait for the audio thread before new ones are dropped.
pub const VOICE_QUEUE_CAPACITY: usize = 1024;

/// Voices sounding at once. Reserved up front; the render path never grows it.
pub const MAX_ACTIVE_VOICES: usize = VOICE_QUEUE_CAPACITY;

#[derive(Debug, Clone, Copy)]
struct VoiceRequest {
    params: VoiceParams,
    start_frame: u64,
}

/// Control handle for the synthesizer. Cheap to clone.
///
/// Implements [`VoiceSink`] for the scheduler and [`AudioClock`] backed by
/// the bus's frame counter.
#[derive(Clone)]
pub struct SynthHandle {
    sender: Sender<VoiceRequest>,
    frames: Arc<AtomicU64>,
    sample_rate: f64,
}

impl SynthHandle {
    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    /// Frames rendered so far.
    pub fn frames(&self) -> u64 {
        self.frames.load(Ordering::Acquire)
    }

    /// Queue a voice starting at audio-clock time `at`.
    ///
    /// Times already in the past start on the next rendered frame.
    pub fn trigger(&self, params: VoiceParams, at: f64) {
        let start_frame = (at.max(0.0) * self.sample_rate).round() as u64;
        match self.sender.try_send(VoiceRequest {
            params,
            start_frame,
        }) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => tracing::warn!("voice queue full, note dropped"),
            Err(TrySendError::Disconnected(_)) => {
                tracing::trace!("synth bus gone, note dropped")
            }
        }
    }
}

impl VoiceSink for SynthHandle {
    fn play(&self, track: &Track, note: &Note, at: f64) {
        self.trigger(VoiceParams::from_note(track, note), at);
    }
}

impl AudioClock for SynthHandle {
    fn now(&self) -> f64 {
        self.frames() as f64 / self.sample_rate
    }
}

pub struct MasterBus {
    receiver: Receiver<VoiceRequest>,
    voices: Vec<Voice>,
    dropped_voices: u64,
    reverb: ConvolutionReverb,
    frames: Arc<AtomicU64>,
    position: u64,
    sample_rate: f64,
    send_l: Vec<f32>,
    send_r: Vec<f32>,
}

impl MasterBus {
    /// New bus and its control handle, using `impulse` for the reverb.
    pub fn new(sample_rate: f64, impulse: &ImpulseResponse) -> Result<(Self, SynthHandle)> {
        Self::with_reverb(sample_rate, ConvolutionReverb::new(impulse))
    }

    pub fn with_reverb(
        sample_rate: f64,
        reverb: ConvolutionReverb,
    ) -> Result<(Self, SynthHandle)> {
        validate_sample_rate(sample_rate)?;
        let (sender, receiver) = bounded(VOICE_QUEUE_CAPACITY);
        let frames = Arc::new(AtomicU64::new(0));

        let bus = Self {
            receiver,
            voices: Vec::with_capacity(MAX_ACTIVE_VOICES),
            dropped_voices: 0,
            reverb,
            frames: Arc::clone(&frames),
            position: 0,
            sample_rate,
            send_l: Vec::new(),
            send_r: Vec::new(),
        };
        let handle = SynthHandle {
            sender,
            frames,
            sample_rate,
        };
        Ok((bus, handle))
    }

    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    pub fn active_voices(&self) -> usize {
        self.voices.len()
    }

    /// Voices discarded because [`MAX_ACTIVE_VOICES`] were already sounding.
    pub fn dropped_voices(&self) -> u64 {
        self.dropped_voices
    }

    /// Render interleaved stereo into `output`, overwriting it.
    pub fn render(&mut self, output: &mut [f32]) {
        let frames = output.len() / 2;
        output.fill(0.0);

        while let Ok(request) = self.receiver.try_recv() {
            if self.voices.len() == MAX_ACTIVE_VOICES {
                self.dropped_voices += 1;
                continue;
            }
            let start = request.start_frame.max(self.position);
            self.voices
                .push(Voice::new(&request.params, start, self.sample_rate));
        }

        if self.send_l.len() < frames {
            self.send_l.resize(frames, 0.0);
            self.send_r.resize(frames, 0.0);
        }
        self.send_l[..frames].fill(0.0);
        self.send_r[..frames].fill(0.0);

        let base = self.position;
        for voice in &mut self.voices {
            let send = voice.send();
            for i in 0..frames {
                let (l, r) = voice.tick(base + i as u64);
                output[i * 2] += l;
                output[i * 2 + 1] += r;
                self.send_l[i] += l * send;
                self.send_r[i] += r * send;
            }
        }

        for i in 0..frames {
            let (wet_l, wet_r) = self.reverb.process(self.send_l[i], self.send_r[i]);
            output[i * 2] += wet_l;
            output[i * 2 + 1] += wet_r;
        }

        self.position += frames as u64;
        let end = self.position;
        self.voices.retain(|v| !v.is_finished(end));
        self.frames.store(end, Ordering::Release);
    }
}
