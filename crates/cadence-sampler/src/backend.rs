//! Capture backends: where recorded audio comes from.

use crate::Result;
use crossbeam_channel::Sender;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Block of interleaved samples in the stream's native channel layout.
pub type CaptureChunk = Vec<f32>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureFormat {
    pub sample_rate: u32,
    pub channels: u16,
}

/// Source of input audio.
pub trait CaptureBackend: Send + Sync {
    /// Acquire the input and start delivering chunks to `sink`.
    ///
    /// Fails with [`crate::Error::PermissionDenied`] when access is refused
    /// or no device exists. On failure nothing stays acquired.
    fn open(&self, sink: Sender<CaptureChunk>) -> Result<Box<dyn CaptureStream>>;
}

/// An acquired input. Dropping it stops capture and releases the device.
pub trait CaptureStream: Send {
    fn format(&self) -> CaptureFormat;
}

/// Backend that delivers a fixed recording, for headless hosts and tests.
///
/// ```ignore
/// let mic = ReplayCapture::new(format, vec![samples]);
/// let recorder = Recorder::new(Arc::new(mic.clone()));
/// ```
#[derive(Debug, Clone)]
pub struct ReplayCapture {
    format: CaptureFormat,
    chunks: Vec<CaptureChunk>,
    denied: bool,
    open: Arc<AtomicBool>,
}

impl ReplayCapture {
    pub fn new(format: CaptureFormat, chunks: Vec<CaptureChunk>) -> Self {
        Self {
            format,
            chunks,
            denied: false,
            open: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Backend whose every `open` is refused.
    pub fn denied() -> Self {
        Self {
            denied: true,
            ..Self::new(
                CaptureFormat {
                    sample_rate: 44100,
                    channels: 1,
                },
                Vec::new(),
            )
        }
    }

    /// True while a stream from this backend is alive.
    pub fn is_open(&self) -> bool {
        self.open.load(Ordering::Acquire)
    }
}

impl CaptureBackend for ReplayCapture {
    fn open(&self, sink: Sender<CaptureChunk>) -> Result<Box<dyn CaptureStream>> {
        if self.denied {
            return Err(crate::Error::PermissionDenied("input access refused".into()));
        }
        for chunk in &self.chunks {
            if sink.send(chunk.clone()).is_err() {
                break;
            }
        }
        self.open.store(true, Ordering::Release);
        Ok(Box::new(ReplayStream {
            format: self.format,
            open: Arc::clone(&self.open),
        }))
    }
}

struct ReplayStream {
    format: CaptureFormat,
    open: Arc<AtomicBool>,
}

impl CaptureStream for ReplayStream {
    fn format(&self) -> CaptureFormat {
        self.format
    }
}

impl Drop for ReplayStream {
    fn drop(&mut self) {
        self.open.store(false, Ordering::Release);
    }
}
