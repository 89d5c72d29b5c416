//! Centralized error type for the cadence umbrella crate.
//!
//! Wraps all subsystem errors so `?` propagates naturally across crate boundaries.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Core(#[from] cadence_core::Error),

    #[error("Synth: {0}")]
    Synth(#[from] cadence_synth::Error),

    #[error("MIDI: {0}")]
    Midi(#[from] cadence_midi::Error),

    #[error("Recording: {0}")]
    Sampler(#[from] cadence_sampler::Error),

    #[error("Invalid config: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, Error>;
