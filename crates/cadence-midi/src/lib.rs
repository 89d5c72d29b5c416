//! Standard MIDI File export for Cadence arrangements.
//!
//! - [`export_to_midi`]: Tracks + tempo to file bytes
//! - [`MidiExport`]: Same, with optional tempo meta event
//! - [`vlq`]: Variable-length quantity codec used for delta-times
//!
//! The writer is a pure function of its input and may run concurrently with
//! playback.

pub mod error;
pub use error::{Error, Result};

pub mod vlq;
pub use vlq::{encode_vlq, read_vlq, write_vlq, VLQ_MAX};

mod writer;
pub use writer::{
    export_to_midi, step_to_tick, MidiExport, MIDI_FILE_NAME, MIDI_MIME, TICKS_PER_QUARTER,
    TICKS_PER_STEP,
};
