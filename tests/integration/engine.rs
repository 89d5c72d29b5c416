//! Engine lifecycle integration tests.

use crate::helpers::*;
use cadence::prelude::*;
use cadence::Error;

#[test]
fn test_headless_engine_defaults() {
    let h = headless();
    assert!(!h.engine.is_playing());
    assert!(!h.engine.is_recording());
    assert_eq!(h.engine.tempo(), 120.0);
    assert!(h.engine.tracks().is_empty());
    // No output stream when a voice sink is supplied.
    assert_eq!(h.engine.sample_rate(), None);
    assert_eq!(h.engine.output_device_name(), None);
}

#[test]
fn test_builder_bpm() {
    let h = headless_with(CadenceEngine::builder().bpm(90.0), test_mic());
    assert_eq!(h.engine.tempo(), 90.0);
}

#[test]
fn test_builder_rejects_invalid_config() {
    let config = SchedulerConfig {
        steps_per_bar: 0,
        ..SchedulerConfig::default()
    };
    let result = CadenceEngine::builder()
        .scheduler_config(config)
        .voice_sink(Arc::new(VoiceLog::new()))
        .build();
    assert!(matches!(result, Err(Error::Core(_))));
}

#[test]
fn test_set_tempo_bounds() {
    let h = headless();
    h.engine.set_tempo(140.0).unwrap();
    assert_eq!(h.engine.tempo(), 140.0);

    for bad in [0.0, -10.0, f64::NAN, 5000.0] {
        assert!(h.engine.set_tempo(bad).is_err(), "{bad} accepted");
    }
    assert_eq!(h.engine.tempo(), 140.0);
}

#[test]
fn test_start_stop_lifecycle() {
    let h = headless();
    h.engine.stop();
    assert!(!h.engine.is_playing());

    h.engine.start().unwrap();
    assert!(h.engine.is_playing());

    h.engine.stop();
    h.engine.stop();
    assert!(!h.engine.is_playing());

    h.engine.start().unwrap();
    assert!(h.engine.is_playing());
}

#[test]
fn test_sequential_engines() {
    for _ in 0..3 {
        let h = headless();
        h.engine.set_tracks(Project::demo().tracks().to_vec());
        h.engine.start().unwrap();
        // Dropped while playing.
    }
}

#[test]
fn test_set_tracks_replaces_arrangement() {
    let h = headless();
    let mut project = Project::demo();
    h.engine.set_tracks(project.tracks().to_vec());
    assert_eq!(h.engine.tracks()[0].name, "Kick & Snare");

    project.switch_to(Version::B);
    h.engine.set_tracks(project.tracks().to_vec());
    assert_eq!(h.engine.tracks()[0].name, "Indie Drums");
    assert_eq!(h.engine.tracks().len(), 3);
}

#[test]
fn test_generated_json_arrangement_plays() {
    // Shape produced by the external track generator.
    let json = r#"[
        {"id": "g1", "name": "Gen Drums", "type": "Drums",
         "volume": 70, "pan": 0, "reverb": 10,
         "eq": {"lowCut": 0, "lowGain": 2, "midFreq": 1000, "midGain": 0, "highGain": 0},
         "notes": [{"id": "a", "start": 0, "duration": 1, "pitch": 36, "velocity": 110}]},
        {"id": "g2", "name": "Gen Bass", "type": "Bass",
         "volume": 80, "pan": 0, "reverb": 0,
         "notes": [{"id": "b", "start": 0, "duration": 4, "pitch": 28}]}
    ]"#;
    let tracks: Vec<Track> = serde_json::from_str(json).unwrap();

    let h = headless();
    h.engine.set_tracks(tracks);
    h.engine.start().unwrap();
    assert!(wait_until(std::time::Duration::from_secs(2), || h.voices.len() == 2));

    let back = serde_json::to_value(&*h.engine.tracks()).unwrap();
    assert_eq!(back[1]["name"], "Gen Bass");
    assert_eq!(back[0]["eq"]["lowGain"], 2.0);
}
