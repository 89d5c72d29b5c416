//! Error types for cadence-core.

use thiserror::Error;

/// Error type for cadence-core operations.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Invalid tempo: {0}. Must be between 20.0 and 999.0 BPM")]
    InvalidTempo(f64),

    #[error("Unknown track: {0}")]
    UnknownTrack(String),

    #[error("Unknown note: {0}")]
    UnknownNote(String),

    #[error("Failed to spawn scheduler thread: {0}")]
    SchedulerSpawn(#[source] std::io::Error),
}

/// Result type alias.
pub type Result<T> = std::result::Result<T, Error>;
