//! Musical time: steps, beats and seconds at a fixed tempo.
//!
//! A step is a sixteenth note. Sixteen steps make one bar of 4/4.

/// Steps per bar; the playback step counter wraps at this value.
pub const STEPS_PER_BAR: usize = 16;

/// Steps per quarter note.
pub const STEPS_PER_BEAT: usize = 4;

pub const MIN_BPM: f64 = 20.0;
pub const MAX_BPM: f64 = 999.0;

/// Length of one step in seconds: `60 / bpm / 4`, i.e. `15 / bpm`.
#[inline]
pub fn seconds_per_step(bpm: f64) -> f64 {
    60.0 / bpm / STEPS_PER_BEAT as f64
}

/// Convert a step count to seconds at `bpm`.
#[inline]
pub fn steps_to_seconds(steps: f64, bpm: f64) -> f64 {
    steps * seconds_per_step(bpm)
}

/// Length of one bar in seconds.
#[inline]
pub fn seconds_per_bar(bpm: f64) -> f64 {
    steps_to_seconds(STEPS_PER_BAR as f64, bpm)
}
