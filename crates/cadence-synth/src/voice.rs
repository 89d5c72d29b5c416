//! One synthesized note.
//!
//! Oscillator, then a percussive gain envelope, then an equal-power stereo
//! panner. The panned signal goes to the dry mix and, scaled by the send
//! amount, to the shared reverb. A voice is dropped by the bus once it passes
//! its stop time; there is no pool and no stealing.
//!
//! The envelope is fixed: the gain starts at its peak and ramps
//! exponentially to 0.01 over `duration * 0.1` seconds, and the oscillator
//! stops at `duration * 0.15` seconds, with `duration` in steps.

use crate::waveform::{playback_frequency, Waveform};
use cadence_core::{Note, Track, DEFAULT_VELOCITY_GAIN};
use std::f32::consts::FRAC_PI_2;

/// Level the envelope decays to.
pub const ENVELOPE_FLOOR: f32 = 0.01;

/// Decay length per step of note duration, in seconds.
pub const DECAY_SECONDS_PER_STEP: f64 = 0.1;

/// Oscillator lifetime per step of note duration, in seconds.
pub const STOP_SECONDS_PER_STEP: f64 = 0.15;

/// Everything needed to render one note, independent of sample rate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VoiceParams {
    pub waveform: Waveform,
    pub frequency: f64,
    /// Envelope peak.
    pub gain: f32,
    pub decay_seconds: f64,
    pub stop_seconds: f64,
    /// -1 (left) ..= 1 (right)
    pub pan: f32,
    /// Reverb send level, 0..=1
    pub send: f32,
}

impl VoiceParams {
    pub fn from_note(track: &Track, note: &Note) -> Self {
        let pitch = note.clamped_pitch();
        let velocity = note
            .effective_velocity()
            .map(|v| v as f32 / 127.0)
            .unwrap_or(DEFAULT_VELOCITY_GAIN);
        let volume = (track.volume.max(0.0) / 100.0) as f32;
        let duration = if note.duration.is_finite() {
            note.duration.max(0.0)
        } else {
            0.0
        };

        Self {
            waveform: Waveform::for_note(track.instrument, pitch),
            frequency: playback_frequency(pitch),
            gain: volume * velocity,
            decay_seconds: duration * DECAY_SECONDS_PER_STEP,
            stop_seconds: duration * STOP_SECONDS_PER_STEP,
            pan: ((track.pan / 50.0) as f32).clamp(-1.0, 1.0),
            send: ((track.reverb / 100.0) as f32).clamp(0.0, 1.0),
        }
    }

    /// Envelope value `t` seconds after the note starts.
    ///
    /// Closed form of the per-sample ramp used by [`Voice`].
    pub fn envelope_at(&self, t: f64) -> f32 {
        if t < 0.0 || t >= self.stop_seconds || self.gain <= 0.0 {
            return 0.0;
        }
        if t >= self.decay_seconds {
            return ENVELOPE_FLOOR;
        }
        let progress = (t / self.decay_seconds) as f32;
        self.gain * (ENVELOPE_FLOOR / self.gain).powf(progress)
    }

    /// Left/right gains of the equal-power panner.
    pub fn pan_gains(&self) -> (f32, f32) {
        let x = (self.pan + 1.0) * 0.5 * FRAC_PI_2;
        (x.cos(), x.sin())
    }
}

/// A running voice on the audio thread.
#[derive(Debug, Clone)]
pub struct Voice {
    waveform: Waveform,
    start_frame: u64,
    decay_end: u64,
    stop_frame: u64,
    phase: f64,
    phase_step: f64,
    level: f32,
    decay_ratio: f32,
    gain_l: f32,
    gain_r: f32,
    send: f32,
}

impl Voice {
    /// Voice starting at absolute frame `start_frame`.
    pub fn new(params: &VoiceParams, start_frame: u64, sample_rate: f64) -> Self {
        let decay_frames = (params.decay_seconds * sample_rate).round() as u64;
        let stop_frames = (params.stop_seconds * sample_rate).round() as u64;
        let silent = params.gain <= 0.0;

        let decay_ratio = if decay_frames > 0 && !silent {
            (ENVELOPE_FLOOR / params.gain).powf(1.0 / decay_frames as f32)
        } else {
            1.0
        };
        let (gain_l, gain_r) = params.pan_gains();

        Self {
            waveform: params.waveform,
            start_frame,
            decay_end: start_frame + decay_frames,
            stop_frame: if silent {
                start_frame
            } else {
                start_frame + stop_frames
            },
            phase: 0.0,
            phase_step: params.frequency / sample_rate,
            level: if decay_frames > 0 {
                params.gain
            } else {
                ENVELOPE_FLOOR
            },
            decay_ratio,
            gain_l,
            gain_r,
            send: params.send,
        }
    }

    pub fn start_frame(&self) -> u64 {
        self.start_frame
    }

    pub fn stop_frame(&self) -> u64 {
        self.stop_frame
    }

    pub fn send(&self) -> f32 {
        self.send
    }

    /// True once `frame` is at or past the stop time.
    #[inline]
    pub fn is_finished(&self, frame: u64) -> bool {
        frame >= self.stop_frame
    }

    /// Panned output at absolute `frame`. Frames must be visited in order.
    #[inline]
    pub fn tick(&mut self, frame: u64) -> (f32, f32) {
        if frame < self.start_frame || frame >= self.stop_frame {
            return (0.0, 0.0);
        }
        let value = self.waveform.sample(self.phase) * self.level;

        self.phase += self.phase_step;
        self.phase -= self.phase.floor();
        if frame + 1 < self.decay_end {
            self.level *= self.decay_ratio;
        } else {
            self.level = ENVELOPE_FLOOR;
        }

        (value * self.gain_l, value * self.gain_r)
    }
}
