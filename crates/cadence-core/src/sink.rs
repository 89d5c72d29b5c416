//! Where the scheduler sends firing notes.

use crate::model::{Note, Track};
use parking_lot::Mutex;

/// Receives every note the scheduler fires.
///
/// Implementations must not block: the call happens on the scheduling
/// thread and each note is expected to become an independent, self-disposing
/// voice.
pub trait VoiceSink: Send + Sync {
    /// Start `note` of `track` at audio-clock time `at` (seconds).
    fn play(&self, track: &Track, note: &Note, at: f64);
}

/// One note handed to a [`VoiceLog`].
#[derive(Debug, Clone, PartialEq)]
pub struct LoggedVoice {
    pub track_id: String,
    pub note_id: String,
    pub pitch: u8,
    pub at: f64,
}

/// Sink that only records what it was asked to play.
///
/// Used by headless hosts and tests.
#[derive(Debug, Default)]
pub struct VoiceLog {
    voices: Mutex<Vec<LoggedVoice>>,
}

impl VoiceLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> Vec<LoggedVoice> {
        self.voices.lock().clone()
    }

    pub fn take(&self) -> Vec<LoggedVoice> {
        std::mem::take(&mut *self.voices.lock())
    }

    pub fn len(&self) -> usize {
        self.voices.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl VoiceSink for VoiceLog {
    fn play(&self, track: &Track, note: &Note, at: f64) {
        self.voices.lock().push(LoggedVoice {
            track_id: track.id.clone(),
            note_id: note.id.clone(),
            pitch: note.pitch,
            at,
        });
    }
}
