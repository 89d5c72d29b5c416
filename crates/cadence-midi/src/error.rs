//! Error types for the MIDI writer.

use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum Error {
    #[error("Value {0} does not fit a variable-length quantity (max 0x0FFFFFFF)")]
    VlqOverflow(u64),

    #[error("Truncated variable-length quantity")]
    VlqTruncated,

    #[error("Track chunk of {0} bytes exceeds the SMF size limit")]
    ChunkTooLarge(usize),

    #[error("Too many tracks: {0} (max 65535)")]
    TooManyTracks(usize),

    #[error("Invalid tempo: {0}")]
    InvalidTempo(f64),
}

pub type Result<T> = std::result::Result<T, Error>;
