//! Arrangement data model shared by the scheduler, the synthesizer and the
//! MIDI writer.
//!
//! Everything here is a plain value type. Subsystems read tracks, they never
//! mutate them; edits happen in the host (see [`crate::Project`]).

use serde::{Deserialize, Deserializer, Serialize};

/// Velocity used when a note carries none.
pub const DEFAULT_VELOCITY: u8 = 80;

/// Gain factor applied by the synthesizer when a note carries no velocity.
pub const DEFAULT_VELOCITY_GAIN: f32 = 0.8;

/// Instrument family of a track. Selects the oscillator in the synthesizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InstrumentType {
    Drums,
    Bass,
    Synth,
    Vocal,
}

impl InstrumentType {
    /// Display color used by the arrangement view.
    pub fn color(self) -> &'static str {
        match self {
            InstrumentType::Drums => "#f87171",
            InstrumentType::Bass => "#60a5fa",
            InstrumentType::Synth => "#c084fc",
            InstrumentType::Vocal => "#4ade80",
        }
    }
}

/// A single note, addressed in steps (sixteenth notes).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: String,
    /// Step offset within the bar. Fractional values are allowed.
    pub start: f64,
    /// Length in steps, > 0.
    pub duration: f64,
    /// MIDI pitch, 69 = A4 = 440 Hz.
    #[serde(deserialize_with = "midi_byte")]
    pub pitch: u8,
    #[serde(
        default,
        deserialize_with = "optional_midi_byte",
        skip_serializing_if = "Option::is_none"
    )]
    pub velocity: Option<u8>,
}

/// Any JSON number, rounded and clamped into 0..=127.
fn midi_byte<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u8, D::Error> {
    f64::deserialize(deserializer).map(clamp_midi)
}

fn optional_midi_byte<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u8>, D::Error> {
    Option::<f64>::deserialize(deserializer).map(|v| v.map(clamp_midi))
}

fn clamp_midi(value: f64) -> u8 {
    // NaN casts to 0.
    value.round().clamp(0.0, 127.0) as u8
}

impl Note {
    pub fn new(id: impl Into<String>, start: f64, duration: f64, pitch: u8) -> Self {
        Self {
            id: id.into(),
            start,
            duration,
            pitch,
            velocity: None,
        }
    }

    pub fn with_velocity(mut self, velocity: u8) -> Self {
        self.velocity = Some(velocity);
        self
    }

    /// Step on which this note fires during playback.
    ///
    /// Negative starts never fire.
    pub fn start_step(&self) -> Option<usize> {
        let step = self.start.floor();
        (step >= 0.0).then_some(step as usize)
    }

    /// Pitch clamped into the MIDI range.
    pub fn clamped_pitch(&self) -> u8 {
        self.pitch.min(127)
    }

    /// Velocity if present and audible. Zero counts as absent.
    pub fn effective_velocity(&self) -> Option<u8> {
        self.velocity.filter(|v| *v > 0).map(|v| v.min(127))
    }
}

/// Mix metadata carried with every track.
///
/// Not applied by the synthesizer; it only round-trips through
/// serialization.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EqSettings {
    pub low_cut: f64,
    pub low_gain: f64,
    pub mid_freq: f64,
    pub mid_gain: f64,
    pub high_gain: f64,
}

impl Default for EqSettings {
    fn default() -> Self {
        Self {
            low_cut: 0.0,
            low_gain: 0.0,
            mid_freq: 1000.0,
            mid_gain: 0.0,
            high_gain: 0.0,
        }
    }
}

/// An encoded audio capture attached to a vocal track.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioClip {
    pub bytes: Vec<u8>,
    pub mime: String,
}

impl AudioClip {
    pub fn new(bytes: Vec<u8>, mime: impl Into<String>) -> Self {
        Self {
            bytes,
            mime: mime.into(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// One instrument lane of an arrangement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Track {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub instrument: InstrumentType,
    /// 0..=100
    pub volume: f64,
    /// -50..=50
    pub pan: f64,
    /// Reverb send, 0..=100
    pub reverb: f64,
    #[serde(default)]
    pub eq: EqSettings,
    #[serde(default)]
    pub muted: bool,
    #[serde(default)]
    pub solo: bool,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub notes: Vec<Note>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clip: Option<AudioClip>,
}

impl Track {
    /// New empty track with instrument defaults.
    pub fn new(id: impl Into<String>, name: impl Into<String>, instrument: InstrumentType) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            instrument,
            volume: 80.0,
            pan: 0.0,
            reverb: 0.0,
            eq: EqSettings::default(),
            muted: false,
            solo: false,
            color: instrument.color().to_string(),
            notes: Vec::new(),
            clip: None,
        }
    }

    /// Vocal track holding a recorded clip.
    pub fn vocal_from_clip(id: impl Into<String>, name: impl Into<String>, clip: AudioClip) -> Self {
        let mut track = Self::new(id, name, InstrumentType::Vocal);
        track.clip = Some(clip);
        track
    }

    pub fn with_notes(mut self, notes: Vec<Note>) -> Self {
        self.notes = notes;
        self
    }

    pub fn with_mix(mut self, volume: f64, pan: f64, reverb: f64) -> Self {
        self.volume = volume;
        self.pan = pan;
        self.reverb = reverb;
        self
    }

    pub fn with_eq(mut self, eq: EqSettings) -> Self {
        self.eq = eq;
        self
    }

    /// Notes whose start step equals `step`.
    pub fn notes_at_step(&self, step: usize) -> impl Iterator<Item = &Note> {
        self.notes
            .iter()
            .filter(move |n| n.start_step() == Some(step))
    }
}

/// Whether `track` is heard, given the whole set it plays in.
///
/// Muted tracks are always silent. If any track in the set is soloed, only
/// tracks with their own solo flag set are heard. There are no solo groups.
pub fn is_audible(track: &Track, tracks: &[Track]) -> bool {
    if track.muted {
        return false;
    }
    !any_solo(tracks) || track.solo
}

/// Tracks of `tracks` that pass [`is_audible`].
pub fn audible_tracks(tracks: &[Track]) -> impl Iterator<Item = &Track> {
    let solo_active = any_solo(tracks);
    tracks
        .iter()
        .filter(move |t| !t.muted && (!solo_active || t.solo))
}

fn any_solo(tracks: &[Track]) -> bool {
    tracks.iter().any(|t| t.solo)
}
