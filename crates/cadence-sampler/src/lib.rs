//! Recording sessions for Cadence.
//!
//! A [`Recorder`] acquires an input through a [`CaptureBackend`], buffers
//! captured chunks while the session runs, and on stop returns one WAV
//! encoded [`cadence_core::AudioClip`].
//!
//! Feature gates: `audio-input` (CPAL input device, enabled by default).

pub mod error;
pub use error::{Error, Result};

pub mod backend;
pub use backend::{CaptureBackend, CaptureChunk, CaptureFormat, CaptureStream, ReplayCapture};

#[cfg(feature = "audio-input")]
mod input;
#[cfg(feature = "audio-input")]
pub use input::{CpalCapture, InputDeviceInfo};

mod recorder;
pub use recorder::Recorder;

mod wav;
pub use wav::{encode_wav, WAV_MIME};
