//! Arrangement model and transport for the Cadence sequencer.
//!
//! # Primary API
//!
//! - [`Track`] / [`Note`]: Arrangement data
//! - [`Project`]: A/B versions of an arrangement with editing helpers
//! - [`Sequencer`]: Lookahead step scheduler (start/stop/tempo/observer)
//! - [`VoiceSink`]: Where firing notes go
//! - [`AudioClock`]: Timeline the scheduler stamps against
//!
//! # Example
//!
//! ```ignore
//! use cadence_core::*;
//!
//! let project = Project::demo();
//! let sequencer = Sequencer::new(SchedulerConfig::default(), clock, synth)?;
//! sequencer.set_tracks(project.tracks().to_vec());
//! sequencer.start()?;
//! ```

pub mod error;
pub use error::{Error, Result};

pub mod config;
pub use config::{validate_bpm, SchedulerConfig};

pub mod model;
pub use model::{
    audible_tracks, is_audible, AudioClip, EqSettings, InstrumentType, Note, Track,
    DEFAULT_VELOCITY, DEFAULT_VELOCITY_GAIN,
};

mod project;
pub use project::{Project, Version};

pub mod sink;
pub use sink::{LoggedVoice, VoiceLog, VoiceSink};

pub mod transport;
pub use transport::timing::{
    seconds_per_bar, seconds_per_step, steps_to_seconds, MAX_BPM, MIN_BPM, STEPS_PER_BAR,
    STEPS_PER_BEAT,
};
pub use transport::{
    dispatch_step, AudioClock, LookaheadScheduler, ManualClock, PlaybackState, ScheduledStep,
    Sequencer, StepObserver, SystemClock, TransitionResult, TransportEvent, TransportFsm,
};
