//! # Cadence - Step Sequencer Engine
//!
//! A 16-step, one-bar loop sequencer with a built-in synthesizer, microphone
//! recording and Standard MIDI File export.
//!
//! ## Architecture
//!
//! Cadence is an umbrella crate that coordinates:
//! - **cadence-core** - Arrangement model, A/B project versions, lookahead scheduler
//! - **cadence-synth** - Oscillator voices, equal-power panning, convolution reverb
//! - **cadence-midi** - Standard MIDI File writer
//! - **cadence-sampler** - Recording sessions encoded as WAV clips
//!
//! ## Quick Start
//!
//! ```ignore
//! use cadence::prelude::*;
//!
//! let engine = CadenceEngine::builder().bpm(120.0).build()?;
//! let project = Project::demo();
//!
//! engine.set_tracks(project.tracks().to_vec());
//! engine.set_observer(|step| println!("step {step}"));
//! engine.start()?;
//!
//! std::fs::write(MIDI_FILE_NAME, engine.export_midi()?)?;
//! ```
//!
//! ## Feature Flags
//!
//! - `audio` (default) - CPAL output for the synthesizer and CPAL microphone input.
//!   Without it the engine needs an explicit [`core::VoiceSink`].

/// Re-export of cadence-core for direct access
pub use cadence_core as core;

/// Re-export of cadence-synth
pub use cadence_synth as synth;

/// Re-export of cadence-midi
pub use cadence_midi as midi;

/// Re-export of cadence-sampler
pub use cadence_sampler as sampler;

pub mod error;
pub use error::{Error, Result};

mod builder;
mod engine;

pub use builder::CadenceEngineBuilder;
pub use engine::CadenceEngine;

/// Convenience prelude for common imports
pub mod prelude {
    // Main engine
    pub use crate::{CadenceEngine, CadenceEngineBuilder};

    // Arrangement
    pub use crate::core::{
        AudioClip, EqSettings, InstrumentType, Note, Project, Track, Version, STEPS_PER_BAR,
    };

    // Transport
    pub use crate::core::{AudioClock, ManualClock, SchedulerConfig, SystemClock};

    // Voices
    pub use crate::core::{VoiceLog, VoiceSink};
    pub use crate::synth::render_offline;

    // Export
    pub use crate::midi::{export_to_midi, MIDI_FILE_NAME};

    // Recording
    pub use crate::sampler::{CaptureBackend, CaptureFormat, ReplayCapture};

    pub use std::sync::Arc;
}
