//! Threaded driver for the lookahead scheduler.
//!
//! A [`Sequencer`] runs one scheduling thread per playback run and a single
//! notifier thread that delivers step notifications when the step becomes
//! audible. The host owns the sequencer; there is no global instance.

use super::clock::AudioClock;
use super::fsm::{TransitionResult, TransportEvent, TransportFsm};
use super::lookahead::{dispatch_step, LookaheadScheduler};
use super::timing::seconds_per_step;
use crate::config::{validate_bpm, SchedulerConfig};
use crate::model::Track;
use crate::sink::VoiceSink;
use crate::{Error, Result};
use arc_swap::ArcSwap;
use atomic_float::AtomicF64;
use crossbeam_channel::{bounded, unbounded, Receiver, RecvTimeoutError, Sender};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Callback receiving the step that is currently audible.
pub type StepObserver = Arc<dyn Fn(usize) + Send + Sync>;

/// Longest delay a step notification may be held for.
const MAX_NOTIFY_DELAY: f64 = 10.0;

struct StepNotice {
    step: usize,
    due: Instant,
    run: u64,
}

struct Shared {
    config: SchedulerConfig,
    bpm: AtomicF64,
    clock: Arc<dyn AudioClock>,
    sink: Arc<dyn VoiceSink>,
    tracks: ArcSwap<Vec<Track>>,
    observer: Mutex<Option<StepObserver>>,
    /// Id of the live run; 0 while stopped.
    run: AtomicU64,
    last_scheduled: AtomicUsize,
}

impl Shared {
    #[inline]
    fn is_live(&self, run: u64) -> bool {
        run != 0 && self.run.load(Ordering::Acquire) == run
    }
}

struct Worker {
    handle: JoinHandle<()>,
    /// Dropping this wakes the worker out of its sleep.
    _wake: Sender<()>,
}

struct Notifier {
    handle: JoinHandle<()>,
    sender: Sender<StepNotice>,
}

struct Control {
    fsm: TransportFsm,
    next_run: u64,
    worker: Option<Worker>,
    notifier: Option<Notifier>,
}

/// Step sequencer: start/stop transport over a shared track list.
///
/// # Example
///
/// ```ignore
/// let sequencer = Sequencer::new(SchedulerConfig::default(), clock, synth)?;
/// sequencer.set_tracks(project.tracks().to_vec());
/// sequencer.set_observer(Arc::new(|step| println!("step {step}")));
/// sequencer.start()?;
/// ```
pub struct Sequencer {
    shared: Arc<Shared>,
    control: Mutex<Control>,
}

impl Sequencer {
    pub fn new(
        config: SchedulerConfig,
        clock: Arc<dyn AudioClock>,
        sink: Arc<dyn VoiceSink>,
    ) -> Result<Self> {
        config.validate()?;
        let bpm = config.bpm;
        Ok(Self {
            shared: Arc::new(Shared {
                config,
                bpm: AtomicF64::new(bpm),
                clock,
                sink,
                tracks: ArcSwap::from_pointee(Vec::new()),
                observer: Mutex::new(None),
                run: AtomicU64::new(0),
                last_scheduled: AtomicUsize::new(0),
            }),
            control: Mutex::new(Control {
                fsm: TransportFsm::new(),
                next_run: 1,
                worker: None,
                notifier: None,
            }),
        })
    }

    /// Replace the track list. The running loop picks it up on its next pass.
    pub fn set_tracks(&self, tracks: Vec<Track>) {
        self.shared.tracks.store(Arc::new(tracks));
    }

    pub fn tracks(&self) -> Arc<Vec<Track>> {
        self.shared.tracks.load_full()
    }

    /// Register the step observer, replacing any previous one.
    pub fn set_observer(&self, observer: StepObserver) {
        *self.shared.observer.lock() = Some(observer);
    }

    pub fn clear_observer(&self) {
        *self.shared.observer.lock() = None;
    }

    pub fn tempo(&self) -> f64 {
        self.shared.bpm.load(Ordering::Acquire)
    }

    /// Change tempo; applies from the next scheduled step.
    pub fn set_tempo(&self, bpm: f64) -> Result<()> {
        validate_bpm(bpm)?;
        self.shared.bpm.store(bpm, Ordering::Release);
        Ok(())
    }

    pub fn is_playing(&self) -> bool {
        self.shared.run.load(Ordering::Acquire) != 0
    }

    /// Step the scheduler last committed to the audio clock.
    ///
    /// Runs ahead of what is audible by up to the scheduling horizon.
    pub fn last_scheduled_step(&self) -> usize {
        self.shared.last_scheduled.load(Ordering::Acquire)
    }

    /// Start playback from step 0, anchored at the clock's current time.
    ///
    /// Starting while running restarts the bar. On failure the sequencer is
    /// left stopped.
    pub fn start(&self) -> Result<()> {
        let mut control = self.control.lock();

        let restarted = matches!(
            control.fsm.transition(TransportEvent::Start),
            TransitionResult::Restarted
        );
        if restarted {
            self.halt(&mut control);
        }

        let notices = match self.notifier_sender(&mut control) {
            Ok(sender) => sender,
            Err(e) => {
                control.fsm.transition(TransportEvent::Stop);
                return Err(e);
            }
        };

        let run = control.next_run;
        control.next_run += 1;

        let mut scheduler = LookaheadScheduler::new(&self.shared.config);
        scheduler.reset(self.shared.clock.now());
        self.shared.last_scheduled.store(0, Ordering::Release);
        self.shared.run.store(run, Ordering::Release);

        let (wake_tx, wake_rx) = bounded::<()>(0);
        let shared = Arc::clone(&self.shared);
        let spawned = thread::Builder::new()
            .name("cadence-scheduler".into())
            .spawn(move || run_scheduler(shared, scheduler, run, wake_rx, notices));

        match spawned {
            Ok(handle) => {
                control.worker = Some(Worker {
                    handle,
                    _wake: wake_tx,
                });
                tracing::debug!(run, bpm = self.tempo(), restarted, "sequencer started");
                Ok(())
            }
            Err(e) => {
                self.shared.run.store(0, Ordering::Release);
                control.fsm.transition(TransportEvent::Stop);
                Err(Error::SchedulerSpawn(e))
            }
        }
    }

    /// Stop dispatching steps. Idempotent.
    ///
    /// Voices already handed to the sink play out; pending step
    /// notifications of the stopped run are dropped.
    pub fn stop(&self) {
        let mut control = self.control.lock();
        if control.fsm.transition(TransportEvent::Stop) == TransitionResult::Stopped {
            self.halt(&mut control);
            tracing::debug!("sequencer stopped");
        }
    }

    fn halt(&self, control: &mut Control) {
        self.shared.run.store(0, Ordering::Release);
        if let Some(Worker { handle, _wake: wake }) = control.worker.take() {
            drop(wake);
            if handle.join().is_err() {
                tracing::warn!("scheduler thread panicked");
            }
        }
    }

    fn notifier_sender(&self, control: &mut Control) -> Result<Sender<StepNotice>> {
        if let Some(notifier) = &control.notifier {
            return Ok(notifier.sender.clone());
        }
        let (sender, receiver) = unbounded();
        let shared = Arc::clone(&self.shared);
        let handle = thread::Builder::new()
            .name("cadence-step-notifier".into())
            .spawn(move || run_notifier(shared, receiver))
            .map_err(Error::SchedulerSpawn)?;
        control.notifier = Some(Notifier {
            handle,
            sender: sender.clone(),
        });
        Ok(sender)
    }
}

impl Drop for Sequencer {
    fn drop(&mut self) {
        let mut control = self.control.lock();
        control.fsm.transition(TransportEvent::Stop);
        self.halt(&mut control);
        if let Some(Notifier { handle, sender }) = control.notifier.take() {
            drop(sender);
            let _ = handle.join();
        }
    }
}

fn run_scheduler(
    shared: Arc<Shared>,
    mut scheduler: LookaheadScheduler,
    run: u64,
    wake: Receiver<()>,
    notices: Sender<StepNotice>,
) {
    let interval = shared.config.lookahead_interval;

    while shared.is_live(run) {
        let now = shared.clock.now();
        let tracks = shared.tracks.load();
        let step_len = seconds_per_step(shared.bpm.load(Ordering::Acquire));

        scheduler.poll(now, step_len, |scheduled| {
            dispatch_step(&tracks, scheduled.step, scheduled.time, shared.sink.as_ref());

            let delay = (scheduled.time - now).max(0.0).min(MAX_NOTIFY_DELAY);
            let notice = StepNotice {
                step: scheduled.step,
                due: Instant::now() + Duration::from_secs_f64(delay),
                run,
            };
            let _ = notices.send(notice);
            shared
                .last_scheduled
                .store(scheduled.step, Ordering::Release);
        });
        drop(tracks);

        match wake.recv_timeout(interval) {
            Err(RecvTimeoutError::Timeout) => {}
            _ => break,
        }
    }
}

fn run_notifier(shared: Arc<Shared>, notices: Receiver<StepNotice>) {
    let mut pending = VecDeque::new();
    loop {
        let notice = match pending.pop_front() {
            Some(notice) => notice,
            None => match notices.recv() {
                Ok(notice) => notice,
                Err(_) => return,
            },
        };
        if !shared.is_live(notice.run) {
            continue;
        }

        // Wait on the channel rather than sleeping, so a newer run cuts the wait short.
        while shared.is_live(notice.run) {
            match notices.recv_deadline(notice.due) {
                Ok(next) => pending.push_back(next),
                Err(RecvTimeoutError::Timeout) => break,
                Err(RecvTimeoutError::Disconnected) => {
                    let now = Instant::now();
                    if notice.due > now {
                        thread::sleep(notice.due - now);
                    }
                    break;
                }
            }
        }
        if !shared.is_live(notice.run) {
            continue;
        }

        let observer = shared.observer.lock().clone();
        if let Some(observer) = observer {
            if catch_unwind(AssertUnwindSafe(|| observer(notice.step))).is_err() {
                tracing::warn!(step = notice.step, "step observer panicked");
            }
        }
    }
}
