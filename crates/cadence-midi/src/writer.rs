//! Standard MIDI File writer.
//!
//! Produces a format 1 file at 96 ticks per quarter note: one track chunk per
//! [`Track`], each holding the track name, its notes as note-on/note-off
//! pairs on channel 0, and the end-of-track marker. Output depends only on the
//! input, so exporting an unchanged arrangement twice yields identical bytes.

use crate::error::{Error, Result};
use crate::vlq::{write_vlq, VLQ_MAX};
use cadence_core::{validate_bpm, Track, DEFAULT_VELOCITY};
use tracing::debug;

/// Ticks per quarter note written in the header.
pub const TICKS_PER_QUARTER: u16 = 96;

/// Ticks per step (a sixteenth note).
pub const TICKS_PER_STEP: u32 = TICKS_PER_QUARTER as u32 / 4;

/// Suggested file name for an exported project.
pub const MIDI_FILE_NAME: &str = "project.mid";

pub const MIDI_MIME: &str = "audio/midi";

const HEADER_MAGIC: &[u8; 4] = b"MThd";
const TRACK_MAGIC: &[u8; 4] = b"MTrk";
const FORMAT_MULTI_TRACK: u16 = 1;

const NOTE_ON: u8 = 0x90;
const NOTE_OFF: u8 = 0x80;
const META: u8 = 0xFF;
const META_TRACK_NAME: u8 = 0x03;
const META_TEMPO: u8 = 0x51;
const META_END_OF_TRACK: u8 = 0x2F;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum EventKind {
    // Declaration order is the tie-break at equal ticks: offs first.
    Off,
    On,
}

#[derive(Debug, Clone, Copy)]
struct NoteEvent {
    tick: u32,
    kind: EventKind,
    pitch: u8,
    velocity: u8,
}

/// MIDI export settings.
///
/// # Example
///
/// ```ignore
/// let bytes = MidiExport::new(120.0).with_tempo_event(true).write(&tracks)?;
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MidiExport {
    bpm: f64,
    tempo_event: bool,
}

impl Default for MidiExport {
    fn default() -> Self {
        Self::new(120.0)
    }
}

impl MidiExport {
    pub fn new(bpm: f64) -> Self {
        Self {
            bpm,
            tempo_event: false,
        }
    }

    /// Write a set-tempo meta event at tick 0 of the first track.
    ///
    /// Off by default; without it readers assume 120 BPM.
    pub fn with_tempo_event(mut self, enabled: bool) -> Self {
        self.tempo_event = enabled;
        self
    }

    pub fn bpm(&self) -> f64 {
        self.bpm
    }

    /// Serialize `tracks` into a complete file.
    pub fn write(&self, tracks: &[Track]) -> Result<Vec<u8>> {
        let track_count =
            u16::try_from(tracks.len()).map_err(|_| Error::TooManyTracks(tracks.len()))?;
        let tempo = if self.tempo_event {
            validate_bpm(self.bpm).map_err(|_| Error::InvalidTempo(self.bpm))?;
            Some((60_000_000.0 / self.bpm).round() as u32)
        } else {
            None
        };

        let mut out = Vec::with_capacity(14 + tracks.len() * 64);
        out.extend_from_slice(HEADER_MAGIC);
        out.extend_from_slice(&6u32.to_be_bytes());
        out.extend_from_slice(&FORMAT_MULTI_TRACK.to_be_bytes());
        out.extend_from_slice(&track_count.to_be_bytes());
        out.extend_from_slice(&TICKS_PER_QUARTER.to_be_bytes());

        for (i, track) in tracks.iter().enumerate() {
            let tempo = if i == 0 { tempo } else { None };
            let body = track_events(track, tempo)?;
            let len = u32::try_from(body.len()).map_err(|_| Error::ChunkTooLarge(body.len()))?;
            out.extend_from_slice(TRACK_MAGIC);
            out.extend_from_slice(&len.to_be_bytes());
            out.extend_from_slice(&body);
        }

        debug!(
            "Exported MIDI file: {} tracks, {} bytes",
            tracks.len(),
            out.len()
        );
        Ok(out)
    }
}

/// Serialize `tracks` at `bpm` with default settings.
///
/// No tempo event is written, so `bpm` only matters for
/// [`MidiExport::with_tempo_event`].
pub fn export_to_midi(tracks: &[Track], bpm: f64) -> Result<Vec<u8>> {
    MidiExport::new(bpm).write(tracks)
}

/// Tick of a step position: `floor(steps * 24)`, never negative.
pub fn step_to_tick(steps: f64) -> Result<u32> {
    // f64::max maps NaN to 0.
    let tick = (steps * TICKS_PER_STEP as f64).floor().max(0.0);
    if tick > VLQ_MAX as f64 {
        return Err(Error::VlqOverflow(tick as u64));
    }
    Ok(tick as u32)
}

fn note_events(track: &Track) -> Result<Vec<NoteEvent>> {
    let mut events = Vec::with_capacity(track.notes.len() * 2);
    for note in &track.notes {
        let start = note.start.max(0.0);
        let on = step_to_tick(start)?;
        // A note always spans at least one tick, so its own off sorts after its on.
        let off = step_to_tick(start + note.duration)?.max(on + 1);
        let pitch = note.clamped_pitch();
        let velocity = note.effective_velocity().unwrap_or(DEFAULT_VELOCITY);

        events.push(NoteEvent {
            tick: on,
            kind: EventKind::On,
            pitch,
            velocity,
        });
        events.push(NoteEvent {
            tick: off,
            kind: EventKind::Off,
            pitch,
            velocity: 0,
        });
    }
    // Stable: insertion order survives within a (tick, kind) group.
    events.sort_by_key(|e| (e.tick, e.kind));
    Ok(events)
}

fn track_events(track: &Track, tempo: Option<u32>) -> Result<Vec<u8>> {
    let mut body = Vec::new();

    let name = track.name.as_bytes();
    let name_len = u32::try_from(name.len()).map_err(|_| Error::VlqOverflow(name.len() as u64))?;
    body.extend_from_slice(&[0x00, META, META_TRACK_NAME]);
    write_vlq(&mut body, name_len)?;
    body.extend_from_slice(name);

    if let Some(us_per_quarter) = tempo {
        body.extend_from_slice(&[0x00, META, META_TEMPO, 0x03]);
        body.extend_from_slice(&us_per_quarter.to_be_bytes()[1..]);
    }

    let mut last_tick = 0;
    for event in note_events(track)? {
        write_vlq(&mut body, event.tick - last_tick)?;
        last_tick = event.tick;
        let status = match event.kind {
            EventKind::On => NOTE_ON,
            EventKind::Off => NOTE_OFF,
        };
        body.extend_from_slice(&[status, event.pitch, event.velocity]);
    }

    body.extend_from_slice(&[0x00, META, META_END_OF_TRACK, 0x00]);
    Ok(body)
}
