//! MIDI export from the engine, validated with midly.

use crate::helpers::*;
use cadence::prelude::*;
use midly::{MetaMessage, MidiMessage, Smf, TrackEventKind};
use std::time::Duration;

/// Absolute ticks of every note-on in a parsed track.
fn note_on_ticks(track: &[midly::TrackEvent]) -> Vec<(u32, u8)> {
    let mut tick = 0;
    let mut out = Vec::new();
    for event in track {
        tick += event.delta.as_int();
        if let TrackEventKind::Midi {
            message: MidiMessage::NoteOn { key, .. },
            ..
        } = event.kind
        {
            out.push((tick, key.as_int()));
        }
    }
    out
}

#[test]
fn test_engine_export_matches_free_function() {
    let h = headless();
    let project = Project::demo();
    h.engine.set_tracks(project.tracks().to_vec());

    let from_engine = h.engine.export_midi().unwrap();
    let direct = export_to_midi(project.tracks(), 120.0).unwrap();
    assert_eq!(from_engine, direct);
}

#[test]
fn test_export_during_playback() {
    let h = headless();
    h.engine.set_tracks(Project::demo().tracks().to_vec());
    let idle = h.engine.export_midi().unwrap();

    h.engine.start().unwrap();
    assert!(wait_until(Duration::from_secs(2), || !h.voices.is_empty()));
    let playing = h.engine.export_midi().unwrap();
    assert_eq!(idle, playing);
}

#[test]
fn test_empty_arrangement_exports_header_only() {
    let h = headless();
    let bytes = h.engine.export_midi().unwrap();
    assert_eq!(bytes.len(), 14);
    assert_eq!(&bytes[..4], b"MThd");
    assert_eq!(&bytes[10..12], &[0, 0]);
}

#[test]
fn test_version_b_export() {
    let h = headless();
    let mut project = Project::demo();
    project.switch_to(Version::B);
    h.engine.set_tracks(project.tracks().to_vec());

    let bytes = h.engine.export_midi().unwrap();
    let smf = Smf::parse(&bytes).unwrap();
    assert_eq!(smf.tracks.len(), 3);

    assert!(matches!(
        smf.tracks[0][0].kind,
        TrackEventKind::Meta(MetaMessage::TrackName(b"Indie Drums"))
    ));
    // Steps 0, 2, 4, 6 at 24 ticks per step.
    assert_eq!(
        note_on_ticks(&smf.tracks[0]),
        [(0, 36), (48, 42), (96, 38), (144, 42)]
    );
}

#[test]
fn test_muted_tracks_still_export() {
    let h = headless();
    let mut project = Project::demo();
    project.update_track("t1", |t| t.muted = true).unwrap();
    h.engine.set_tracks(project.tracks().to_vec());

    let smf_bytes = h.engine.export_midi().unwrap();
    let smf = Smf::parse(&smf_bytes).unwrap();
    assert_eq!(smf.tracks.len(), 3);
    assert_eq!(note_on_ticks(&smf.tracks[0]).len(), 4);
}

#[test]
fn test_tempo_change_does_not_alter_ticks() {
    let h = headless();
    h.engine.set_tracks(Project::demo().tracks().to_vec());
    let at_120 = h.engine.export_midi().unwrap();
    h.engine.set_tempo(90.0).unwrap();
    let at_90 = h.engine.export_midi().unwrap();
    assert_eq!(at_120, at_90);
}
