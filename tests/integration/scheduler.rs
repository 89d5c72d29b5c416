//! Step dispatch through the engine, driven by a manual clock.

use crate::helpers::*;
use approx::assert_relative_eq;
use cadence::prelude::*;
use parking_lot::Mutex;
use std::time::Duration;

const TIMEOUT: Duration = Duration::from_secs(2);

fn demo_engine() -> Headless {
    let h = headless();
    h.engine.set_tracks(Project::demo().tracks().to_vec());
    h
}

#[test]
fn test_first_step_fires_at_start() {
    let h = demo_engine();
    h.engine.start().unwrap();

    // Version A has kick, bass and melody on step 0.
    assert!(wait_until(TIMEOUT, || h.voices.len() == 3));
    let mut ids: Vec<_> = h.voices.snapshot().into_iter().map(|v| v.note_id).collect();
    ids.sort();
    assert_eq!(ids, ["n1", "n5", "n7"]);
    for voice in h.voices.snapshot() {
        assert_relative_eq!(voice.at, 0.0);
    }
}

#[test]
fn test_steps_follow_the_clock() {
    let h = demo_engine();
    h.engine.start().unwrap();
    assert!(wait_until(TIMEOUT, || h.voices.len() == 3));
    h.voices.take();

    // Step 1 is empty; step 2 carries melody note n8.
    h.clock.set(2.0 * STEP_120);
    assert!(wait_until(TIMEOUT, || !h.voices.is_empty()));

    let voices = h.voices.take();
    assert_eq!(voices.len(), 1);
    assert_eq!(voices[0].note_id, "n8");
    assert_relative_eq!(voices[0].at, 2.0 * STEP_120, epsilon = 1e-9);
}

#[test]
fn test_observer_sees_each_step() {
    let h = demo_engine();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    h.engine.set_observer(move |step| sink.lock().push(step));

    h.engine.start().unwrap();
    for step in 1..4 {
        h.clock.set(step as f64 * STEP_120);
        assert!(wait_until(TIMEOUT, || seen.lock().len() > step));
    }
    assert_eq!(seen.lock()[..4], [0, 1, 2, 3]);
}

#[test]
fn test_cleared_observer_is_silent() {
    let h = demo_engine();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    h.engine.set_observer(move |step| sink.lock().push(step));
    h.engine.clear_observer();

    h.engine.start().unwrap();
    assert!(wait_until(TIMEOUT, || h.voices.len() == 3));
    std::thread::sleep(Duration::from_millis(50));
    assert!(seen.lock().is_empty());
}

#[test]
fn test_muted_track_never_fires() {
    let h = headless();
    let mut project = Project::demo();
    project.update_track("t1", |t| t.muted = true).unwrap();
    h.engine.set_tracks(project.tracks().to_vec());

    h.engine.start().unwrap();
    assert!(wait_until(TIMEOUT, || h.voices.len() == 2));
    std::thread::sleep(Duration::from_millis(50));
    assert!(h.voices.snapshot().iter().all(|v| v.track_id != "t1"));
}

#[test]
fn test_solo_isolates_track() {
    let h = headless();
    let mut project = Project::demo();
    project.update_track("t2", |t| t.solo = true).unwrap();
    h.engine.set_tracks(project.tracks().to_vec());

    h.engine.start().unwrap();
    assert!(wait_until(TIMEOUT, || !h.voices.is_empty()));
    std::thread::sleep(Duration::from_millis(50));
    let voices = h.voices.snapshot();
    assert_eq!(voices.len(), 1);
    assert_eq!(voices[0].track_id, "t2");
}

#[test]
fn test_edits_apply_while_playing() {
    let h = demo_engine();
    h.engine.start().unwrap();
    assert!(wait_until(TIMEOUT, || h.voices.len() == 3));
    h.voices.take();

    // Move the step-2 melody note to step 1 before the clock gets there.
    let mut project = Project::demo();
    project.move_note("t3", "n8", 1.0, 65).unwrap();
    h.engine.set_tracks(project.tracks().to_vec());

    h.clock.set(STEP_120);
    assert!(wait_until(TIMEOUT, || !h.voices.is_empty()));
    let voices = h.voices.snapshot();
    assert_eq!(voices[0].note_id, "n8");
    assert_eq!(voices[0].pitch, 65);
}

#[test]
fn test_stop_halts_dispatch() {
    let h = demo_engine();
    h.engine.start().unwrap();
    assert!(wait_until(TIMEOUT, || h.voices.len() == 3));
    h.engine.stop();
    std::thread::sleep(Duration::from_millis(20));
    h.voices.take();

    h.clock.set(4.0 * STEP_120);
    std::thread::sleep(Duration::from_millis(80));
    assert!(h.voices.is_empty());
}
