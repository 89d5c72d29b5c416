//! Scoped recording sessions.
//!
//! At most one session is active per [`Recorder`]. The input device is held
//! only while a session is active and is released on every exit path: stop,
//! a failed start, and dropping the recorder.

use crate::backend::{CaptureBackend, CaptureChunk, CaptureFormat, CaptureStream};
use crate::wav::{encode_wav, WAV_MIME};
use crate::{Error, Result};
use cadence_core::AudioClip;
use crossbeam_channel::{unbounded, Receiver};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Instant;

struct ActiveSession {
    stream: Box<dyn CaptureStream>,
    chunks: Receiver<CaptureChunk>,
    started: Instant,
}

pub struct Recorder {
    backend: Arc<dyn CaptureBackend>,
    session: Mutex<Option<ActiveSession>>,
}

impl Recorder {
    pub fn new(backend: Arc<dyn CaptureBackend>) -> Self {
        Self {
            backend,
            session: Mutex::new(None),
        }
    }

    /// Recorder on the default CPAL input device.
    #[cfg(feature = "audio-input")]
    pub fn default_input() -> Self {
        Self::new(Arc::new(crate::input::CpalCapture::default()))
    }

    pub fn is_recording(&self) -> bool {
        self.session.lock().is_some()
    }

    /// Acquire the input and start buffering.
    ///
    /// Fails with [`Error::PermissionDenied`] if the backend refuses, and
    /// with [`Error::AlreadyRecording`] while a session is active.
    pub fn start_recording(&self) -> Result<()> {
        let mut session = self.session.lock();
        if session.is_some() {
            return Err(Error::AlreadyRecording);
        }

        let (sender, receiver) = unbounded();
        let stream = self.backend.open(sender)?;
        let format = stream.format();
        tracing::debug!(
            sample_rate = format.sample_rate,
            channels = format.channels,
            "recording started"
        );

        *session = Some(ActiveSession {
            stream,
            chunks: receiver,
            started: Instant::now(),
        });
        Ok(())
    }

    /// Stop capture, release the device and return the recorded clip.
    ///
    /// Without an active session this returns an empty clip.
    pub fn stop_recording(&self) -> Result<AudioClip> {
        let Some(session) = self.session.lock().take() else {
            return Ok(AudioClip::default());
        };

        let ActiveSession {
            stream,
            chunks,
            started,
        } = session;
        let format = stream.format();
        drop(stream);

        let samples: Vec<f32> = chunks.try_iter().flatten().collect();
        let bytes = encode_wav(&samples, format)?;

        tracing::debug!(
            seconds = started.elapsed().as_secs_f64(),
            frames = frame_count(samples.len(), format),
            bytes = bytes.len(),
            "recording stopped"
        );
        Ok(AudioClip::new(bytes, WAV_MIME))
    }
}

impl Drop for Recorder {
    fn drop(&mut self) {
        if self.session.get_mut().take().is_some() {
            tracing::debug!("recording abandoned, input released");
        }
    }
}

fn frame_count(samples: usize, format: CaptureFormat) -> usize {
    samples / format.channels.max(1) as usize
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::ReplayCapture;

    fn stereo(chunks: Vec<CaptureChunk>) -> ReplayCapture {
        ReplayCapture::new(
            CaptureFormat {
                sample_rate: 8000,
                channels: 2,
            },
            chunks,
        )
    }

    #[test]
    fn test_stop_without_session_is_empty() {
        let recorder = Recorder::new(Arc::new(stereo(vec![])));
        let clip = recorder.stop_recording().unwrap();
        assert!(clip.is_empty());
    }

    #[test]
    fn test_session_lifecycle() {
        let mic = stereo(vec![vec![0.1, -0.1, 0.2, -0.2], vec![0.3, -0.3]]);
        let recorder = Recorder::new(Arc::new(mic.clone()));

        recorder.start_recording().unwrap();
        assert!(recorder.is_recording());
        assert!(mic.is_open());

        let clip = recorder.stop_recording().unwrap();
        assert!(!recorder.is_recording());
        assert!(!mic.is_open());
        assert_eq!(clip.mime, WAV_MIME);

        let reader = hound::WavReader::new(std::io::Cursor::new(clip.bytes)).unwrap();
        assert_eq!(reader.spec().channels, 2);
        assert_eq!(reader.duration(), 3);
    }

    #[test]
    fn test_second_start_is_rejected() {
        let recorder = Recorder::new(Arc::new(stereo(vec![])));
        recorder.start_recording().unwrap();
        assert!(matches!(
            recorder.start_recording(),
            Err(Error::AlreadyRecording)
        ));
        assert!(recorder.is_recording());
    }

    #[test]
    fn test_denied_never_starts() {
        let recorder = Recorder::new(Arc::new(ReplayCapture::denied()));
        assert!(matches!(
            recorder.start_recording(),
            Err(Error::PermissionDenied(_))
        ));
        assert!(!recorder.is_recording());
        assert!(recorder.stop_recording().unwrap().is_empty());
    }

    #[test]
    fn test_drop_releases_device() {
        let mic = stereo(vec![]);
        let recorder = Recorder::new(Arc::new(mic.clone()));
        recorder.start_recording().unwrap();
        assert!(mic.is_open());
        drop(recorder);
        assert!(!mic.is_open());
    }

    #[test]
    fn test_sessions_are_independent() {
        let mic = stereo(vec![vec![0.5, 0.5]]);
        let recorder = Recorder::new(Arc::new(mic));
        recorder.start_recording().unwrap();
        let first = recorder.stop_recording().unwrap();
        recorder.start_recording().unwrap();
        let second = recorder.stop_recording().unwrap();
        assert_eq!(first, second);
    }
}
