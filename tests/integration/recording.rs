//! Recording sessions through the engine.

use crate::helpers::*;
use cadence::prelude::*;
use cadence::{sampler, Error};
use std::io::Cursor;

#[test]
fn test_record_round_trip() {
    let h = headless();
    h.engine.start_recording().unwrap();
    assert!(h.engine.is_recording());
    assert!(h.mic.is_open());

    let clip = h.engine.stop_recording().unwrap();
    assert!(!h.engine.is_recording());
    assert!(!h.mic.is_open());
    assert_eq!(clip.mime, sampler::WAV_MIME);

    let mut reader = hound::WavReader::new(Cursor::new(clip.bytes)).unwrap();
    let spec = reader.spec();
    assert_eq!(spec.channels, 1);
    assert_eq!(spec.sample_rate, 8000);
    assert_eq!(spec.bits_per_sample, 16);
    assert_eq!(reader.duration(), 300);

    let recorded: Vec<i16> = reader.samples::<i16>().map(|s| s.unwrap()).collect();
    let expected = generate_sine(440.0, 8000.0, 100);
    for (got, want) in recorded.iter().zip(&expected) {
        let got = *got as f32 / i16::MAX as f32;
        assert!((got - want).abs() < 1e-3, "{got} vs {want}");
    }
}

#[test]
fn test_stop_without_start_is_empty() {
    let h = headless();
    let clip = h.engine.stop_recording().unwrap();
    assert!(clip.is_empty());
}

#[test]
fn test_denied_input_reports_permission() {
    let h = headless_with(CadenceEngine::builder(), ReplayCapture::denied());
    let result = h.engine.start_recording();
    assert!(matches!(
        result,
        Err(Error::Sampler(sampler::Error::PermissionDenied(_)))
    ));
    assert!(!h.engine.is_recording());
}

#[test]
fn test_double_start_rejected() {
    let h = headless();
    h.engine.start_recording().unwrap();
    assert!(matches!(
        h.engine.start_recording(),
        Err(Error::Sampler(sampler::Error::AlreadyRecording))
    ));
    assert!(h.engine.stop_recording().unwrap().bytes.len() > 44);
}

#[test]
fn test_recording_while_playing() {
    let h = headless();
    h.engine.set_tracks(Project::demo().tracks().to_vec());
    h.engine.start().unwrap();
    h.engine.start_recording().unwrap();
    let clip = h.engine.stop_recording().unwrap();
    assert!(h.engine.is_playing());
    assert!(!clip.is_empty());
}

#[test]
fn test_clip_becomes_vocal_track() {
    let h = headless();
    h.engine.start_recording().unwrap();
    let clip = h.engine.stop_recording().unwrap();

    let mut project = Project::demo();
    project
        .tracks_mut()
        .push(Track::vocal_from_clip("t4", "Vocals", clip.clone()));
    h.engine.set_tracks(project.tracks().to_vec());

    let tracks = h.engine.tracks();
    let vocal = &tracks[3];
    assert_eq!(vocal.instrument, InstrumentType::Vocal);
    assert_eq!(vocal.clip.as_ref(), Some(&clip));
    assert!(vocal.notes.is_empty());
}

#[test]
fn test_engine_drop_releases_input() {
    let h = headless();
    h.engine.start_recording().unwrap();
    let mic = h.mic.clone();
    drop(h);
    assert!(!mic.is_open());
}
