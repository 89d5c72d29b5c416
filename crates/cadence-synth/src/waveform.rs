//! Oscillator shapes and pitch mapping.

use cadence_core::InstrumentType;
use std::f64::consts::TAU;

/// Frequency of a MIDI pitch in equal temperament, A4 (69) = 440 Hz.
#[inline]
pub fn playback_frequency(pitch: u8) -> f64 {
    440.0 * 2f64.powf((pitch as f64 - 69.0) / 12.0)
}

/// Pitches below this play drums as a sine (kick), above as a square.
pub const DRUM_SINE_BELOW: u8 = 40;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Waveform {
    Sine,
    Square,
    Sawtooth,
    Triangle,
}

impl Waveform {
    /// Oscillator used for a note of `pitch` on an `instrument` track.
    pub fn for_note(instrument: InstrumentType, pitch: u8) -> Self {
        match instrument {
            InstrumentType::Drums if pitch < DRUM_SINE_BELOW => Waveform::Sine,
            InstrumentType::Drums => Waveform::Square,
            InstrumentType::Bass => Waveform::Sawtooth,
            InstrumentType::Synth | InstrumentType::Vocal => Waveform::Triangle,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Waveform::Sine => "sine",
            Waveform::Square => "square",
            Waveform::Sawtooth => "sawtooth",
            Waveform::Triangle => "triangle",
        }
    }

    /// Value at `phase` in cycles, `[0, 1)`. Range is `[-1, 1]`.
    #[inline]
    pub fn sample(self, phase: f64) -> f32 {
        let value = match self {
            Waveform::Sine => (TAU * phase).sin(),
            Waveform::Square => {
                if phase < 0.5 {
                    1.0
                } else {
                    -1.0
                }
            }
            Waveform::Sawtooth => {
                if phase < 0.5 {
                    2.0 * phase
                } else {
                    2.0 * phase - 2.0
                }
            }
            Waveform::Triangle => {
                if phase < 0.25 {
                    4.0 * phase
                } else if phase < 0.75 {
                    2.0 - 4.0 * phase
                } else {
                    4.0 * phase - 4.0
                }
            }
        };
        value as f32
    }
}

impl std::fmt::Display for Waveform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
