//! Lookahead step scheduling.
//!
//! The scheduler is polled on a coarse timer but stamps each step with an
//! exact audio-clock time. Every poll schedules all steps that begin within
//! `schedule_ahead` seconds of the clock, so each step is committed a little
//! before it is heard and timer jitter never reaches the audio.
//!
//! This type holds only the step cursor. Threads, observers and track
//! snapshots live in [`super::Sequencer`]; offline rendering drives the same
//! cursor from a sample counter.

use crate::config::SchedulerConfig;
use crate::model::{audible_tracks, Track};
use crate::sink::VoiceSink;

/// A step committed for playback at `time` on the audio clock.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScheduledStep {
    pub step: usize,
    pub time: f64,
}

#[derive(Debug, Clone)]
pub struct LookaheadScheduler {
    steps_per_bar: usize,
    schedule_ahead: f64,
    current_step: usize,
    next_step_time: f64,
}

impl LookaheadScheduler {
    pub fn new(config: &SchedulerConfig) -> Self {
        Self {
            steps_per_bar: config.steps_per_bar.max(1),
            schedule_ahead: config.schedule_ahead,
            current_step: 0,
            next_step_time: 0.0,
        }
    }

    /// Rewind to step 0, anchored at `now`.
    pub fn reset(&mut self, now: f64) {
        self.current_step = 0;
        self.next_step_time = now;
    }

    /// Step that will be scheduled next.
    pub fn current_step(&self) -> usize {
        self.current_step
    }

    pub fn next_step_time(&self) -> f64 {
        self.next_step_time
    }

    /// Schedule every step starting before `now + schedule_ahead`.
    ///
    /// `seconds_per_step` is read per poll so tempo changes land on the next
    /// step boundary.
    pub fn poll<F>(&mut self, now: f64, seconds_per_step: f64, mut on_step: F)
    where
        F: FnMut(ScheduledStep),
    {
        if seconds_per_step.is_nan() || seconds_per_step <= 0.0 {
            return;
        }
        let horizon = now + self.schedule_ahead;
        while self.next_step_time < horizon {
            on_step(ScheduledStep {
                step: self.current_step,
                time: self.next_step_time,
            });
            self.current_step = (self.current_step + 1) % self.steps_per_bar;
            self.next_step_time += seconds_per_step;
        }
    }
}

/// Send every audible note starting on `step` to `sink` at time `at`.
///
/// Returns the number of notes dispatched.
pub fn dispatch_step(tracks: &[Track], step: usize, at: f64, sink: &dyn VoiceSink) -> usize {
    let mut fired = 0;
    for track in audible_tracks(tracks) {
        for note in track.notes_at_step(step) {
            sink.play(track, note, at);
            fired += 1;
        }
    }
    fired
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{InstrumentType, Note};
    use crate::sink::VoiceLog;
    use crate::transport::timing::seconds_per_step;
    use approx::assert_relative_eq;

    fn collect(scheduler: &mut LookaheadScheduler, now: f64) -> Vec<ScheduledStep> {
        let mut steps = Vec::new();
        scheduler.poll(now, seconds_per_step(120.0), |s| steps.push(s));
        steps
    }

    #[test]
    fn test_first_poll_fills_horizon() {
        let mut scheduler = LookaheadScheduler::new(&SchedulerConfig::default());
        scheduler.reset(10.0);

        // 100 ms horizon, 125 ms steps: only the anchor step fits.
        let steps = collect(&mut scheduler, 10.0);
        assert_eq!(steps, [ScheduledStep { step: 0, time: 10.0 }]);
        assert_relative_eq!(scheduler.next_step_time(), 10.125);

        // Nothing new until the next step enters the horizon.
        assert!(collect(&mut scheduler, 10.02).is_empty());
        let steps = collect(&mut scheduler, 10.03);
        assert_eq!(steps.len(), 1);
        assert_eq!(steps[0].step, 1);
        assert_relative_eq!(steps[0].time, 10.125);
    }

    #[test]
    fn test_steps_wrap_at_bar() {
        let mut scheduler = LookaheadScheduler::new(&SchedulerConfig::default());
        scheduler.reset(0.0);
        let steps = collect(&mut scheduler, 2.1);
        let indices: Vec<_> = steps.iter().map(|s| s.step).collect();
        let expected: Vec<_> = (0..16).chain(0..2).collect();
        assert_eq!(indices, expected);
        assert_relative_eq!(steps[16].time, 2.0);
    }

    #[test]
    fn test_reset_restarts_at_zero() {
        let mut scheduler = LookaheadScheduler::new(&SchedulerConfig::default());
        scheduler.reset(0.0);
        collect(&mut scheduler, 0.9);
        assert_ne!(scheduler.current_step(), 0);

        scheduler.reset(5.0);
        assert_eq!(scheduler.current_step(), 0);
        assert_eq!(collect(&mut scheduler, 5.0)[0], ScheduledStep { step: 0, time: 5.0 });
    }

    #[test]
    fn test_dispatch_respects_solo_and_floor() {
        let mut lead = Track::new("lead", "Lead", InstrumentType::Synth)
            .with_notes(vec![Note::new("a", 2.6, 1.0, 60), Note::new("b", 3.0, 1.0, 62)]);
        lead.solo = true;
        let bass = Track::new("bass", "Bass", InstrumentType::Bass)
            .with_notes(vec![Note::new("c", 2.0, 1.0, 36)]);
        let tracks = vec![lead, bass];

        let log = VoiceLog::new();
        assert_eq!(dispatch_step(&tracks, 2, 1.5, &log), 1);
        let voices = log.take();
        assert_eq!(voices[0].note_id, "a");
        assert_eq!(voices[0].at, 1.5);

        assert_eq!(dispatch_step(&[], 2, 1.5, &log), 0);
        assert!(log.is_empty());
    }
}
