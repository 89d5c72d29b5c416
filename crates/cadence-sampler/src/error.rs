//! Error types.

use thiserror::Error;

/// Error type.
#[derive(Error, Debug)]
pub enum Error {
    /// Input access was refused or no input device exists.
    #[error("Input device access denied: {0}")]
    PermissionDenied(String),

    /// A recording session is already active.
    #[error("A recording session is already active")]
    AlreadyRecording,

    /// Capture backend failure after the device was granted.
    #[error("Capture error: {0}")]
    Capture(String),

    /// Failed to enumerate devices.
    #[cfg(feature = "audio-input")]
    #[error("Failed to enumerate audio devices")]
    DevicesError(#[from] cpal::DevicesError),

    /// Failed to get device config.
    #[cfg(feature = "audio-input")]
    #[error("Failed to get audio device config")]
    DeviceConfigError(#[from] cpal::DefaultStreamConfigError),

    /// Failed to build stream.
    #[cfg(feature = "audio-input")]
    #[error("Failed to build audio stream")]
    BuildStreamError(#[from] cpal::BuildStreamError),

    /// Failed to play stream.
    #[cfg(feature = "audio-input")]
    #[error("Failed to play audio stream")]
    PlayStreamError(#[from] cpal::PlayStreamError),

    /// WAV encoding failed.
    #[error("Hound error: {0}")]
    HoundError(#[from] hound::Error),
}

/// Result type.
pub type Result<T> = std::result::Result<T, Error>;
