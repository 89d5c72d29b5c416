//! A/B arrangement versions and host-side edits.

use crate::model::{EqSettings, InstrumentType, Note, Track};
use crate::transport::timing::STEPS_PER_BAR;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Which arrangement of a project is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Version {
    #[default]
    A,
    B,
}

/// Two independent arrangements plus the active selection.
///
/// Switching versions only changes which collection is handed to the
/// scheduler and the MIDI writer; the two never share state.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Project {
    version: Version,
    a: Vec<Track>,
    b: Vec<Track>,
}

impl Project {
    pub fn new(a: Vec<Track>, b: Vec<Track>) -> Self {
        Self {
            version: Version::A,
            a,
            b,
        }
    }

    /// Starter project with one arrangement per version.
    pub fn demo() -> Self {
        Self::new(demo_tracks_a(), demo_tracks_b())
    }

    pub fn version(&self) -> Version {
        self.version
    }

    pub fn switch_to(&mut self, version: Version) {
        self.version = version;
    }

    /// Tracks of the active version.
    pub fn tracks(&self) -> &[Track] {
        self.tracks_of(self.version)
    }

    pub fn tracks_mut(&mut self) -> &mut Vec<Track> {
        match self.version {
            Version::A => &mut self.a,
            Version::B => &mut self.b,
        }
    }

    pub fn tracks_of(&self, version: Version) -> &[Track] {
        match version {
            Version::A => &self.a,
            Version::B => &self.b,
        }
    }

    /// Replace the active arrangement, e.g. with generated content.
    pub fn replace_tracks(&mut self, tracks: Vec<Track>) {
        *self.tracks_mut() = tracks;
    }

    /// Apply `edit` to one track of the active version.
    pub fn update_track<F>(&mut self, track_id: &str, edit: F) -> Result<()>
    where
        F: FnOnce(&mut Track),
    {
        let track = self
            .tracks_mut()
            .iter_mut()
            .find(|t| t.id == track_id)
            .ok_or_else(|| Error::UnknownTrack(track_id.to_string()))?;
        edit(track);
        Ok(())
    }

    /// Drag edit: move one note to a new start step and pitch.
    ///
    /// Start is clamped into the bar, pitch into the MIDI range.
    pub fn move_note(&mut self, track_id: &str, note_id: &str, start: f64, pitch: i32) -> Result<()> {
        let mut found = false;
        self.update_track(track_id, |track| {
            if let Some(note) = track.notes.iter_mut().find(|n| n.id == note_id) {
                note.start = start.clamp(0.0, (STEPS_PER_BAR - 1) as f64);
                note.pitch = pitch.clamp(0, 127) as u8;
                found = true;
            }
        })?;
        if found {
            Ok(())
        } else {
            Err(Error::UnknownNote(note_id.to_string()))
        }
    }
}

fn demo_tracks_a() -> Vec<Track> {
    vec![
        Track::new("t1", "Kick & Snare", InstrumentType::Drums)
            .with_mix(80.0, 0.0, 10.0)
            .with_eq(EqSettings {
                low_gain: 3.0,
                ..EqSettings::default()
            })
            .with_notes(vec![
                Note::new("n1", 0.0, 1.0, 36).with_velocity(100),
                Note::new("n2", 4.0, 1.0, 38).with_velocity(90),
                Note::new("n3", 8.0, 1.0, 36).with_velocity(100),
                Note::new("n4", 12.0, 1.0, 38).with_velocity(90),
            ]),
        Track::new("t2", "Deep Bass", InstrumentType::Bass)
            .with_mix(75.0, 0.0, 5.0)
            .with_eq(EqSettings {
                low_gain: 5.0,
                high_gain: -2.0,
                ..EqSettings::default()
            })
            .with_notes(vec![
                Note::new("n5", 0.0, 3.0, 24).with_velocity(80),
                Note::new("n6", 8.0, 3.0, 24).with_velocity(80),
            ]),
        Track::new("t3", "Topline Melody", InstrumentType::Synth)
            .with_mix(70.0, 10.0, 40.0)
            .with_eq(EqSettings {
                mid_gain: 2.0,
                mid_freq: 2500.0,
                ..EqSettings::default()
            })
            .with_notes(vec![
                Note::new("n7", 0.0, 2.0, 60).with_velocity(70),
                Note::new("n8", 2.0, 2.0, 64).with_velocity(75),
                Note::new("n9", 4.0, 4.0, 67).with_velocity(80),
            ]),
    ]
}

fn demo_tracks_b() -> Vec<Track> {
    vec![
        Track::new("t1", "Indie Drums", InstrumentType::Drums)
            .with_mix(60.0, 0.0, 30.0)
            .with_notes(vec![
                Note::new("n1b", 0.0, 1.0, 36),
                Note::new("n2b", 2.0, 1.0, 42),
                Note::new("n3b", 4.0, 1.0, 38),
                Note::new("n4b", 6.0, 1.0, 42),
            ]),
        Track::new("t2", "Fuzzy Bass", InstrumentType::Bass)
            .with_mix(85.0, 0.0, 20.0)
            .with_notes(vec![
                Note::new("n5b", 0.0, 2.0, 36),
                Note::new("n6b", 2.0, 2.0, 36),
                Note::new("n7b", 4.0, 4.0, 41),
            ]),
        Track::new("t3", "Dreamy Synth", InstrumentType::Synth)
            .with_mix(65.0, 10.0, 60.0)
            .with_notes(vec![
                Note::new("n8b", 0.0, 8.0, 72),
                Note::new("n9b", 8.0, 4.0, 71),
            ]),
    ]
}
