//! Voice synthesizer for Cadence.
//!
//! Every firing note becomes an independent voice: an oscillator picked by
//! instrument, a short exponential envelope, an equal-power panner, and a
//! send into one shared convolution reverb built from a synthetic impulse
//! response.
//!
//! # Primary API
//!
//! - [`AudioOutput`]: CPAL stream running the master bus (feature `output`)
//! - [`SynthHandle`]: [`cadence_core::VoiceSink`] + [`cadence_core::AudioClock`]
//! - [`MasterBus`]: The mixer itself, for custom hosts
//! - [`render_offline`] / [`OfflineRenderer`]: Deterministic bounce
//!
//! # Example
//!
//! ```ignore
//! let (output, synth) = AudioOutput::open(None)?;
//! let sequencer = Sequencer::new(config, Arc::new(synth.clone()), Arc::new(synth))?;
//! ```

pub mod error;
pub use error::{Error, Result};

pub mod impulse;
pub use impulse::{ImpulseResponse, IMPULSE_SECONDS};

pub mod convolver;
pub use convolver::{ConvolutionReverb, PartitionedConvolver};

pub mod waveform;
pub use waveform::{playback_frequency, Waveform};

pub mod voice;
pub use voice::{Voice, VoiceParams};

mod bus;
pub use bus::{MasterBus, SynthHandle, MAX_ACTIVE_VOICES, VOICE_QUEUE_CAPACITY};

mod offline;
pub use offline::{render_offline, OfflineRenderer, DEFAULT_IMPULSE_SEED};

#[cfg(feature = "output")]
mod output;
#[cfg(feature = "output")]
pub use output::AudioOutput;
