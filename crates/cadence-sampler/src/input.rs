//! Hardware audio input via CPAL.

use crate::backend::{CaptureBackend, CaptureChunk, CaptureFormat, CaptureStream};
use crate::{Error, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use crossbeam_channel::Sender;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

/// Input device information
#[derive(Debug, Clone)]
pub struct InputDeviceInfo {
    pub index: usize,
    pub name: String,
    pub channels: u16,
    pub sample_rate: u32,
}

/// Wrapper to hold `cpal::Stream` in a `Send` context.
///
/// # Safety
/// `cpal::Stream` is `!Send` due to platform internals. The stream is owned
/// by one [`CaptureStream`], which the recorder keeps behind a `Mutex`.
struct StreamHandle(#[allow(dead_code)] cpal::Stream);

unsafe impl Send for StreamHandle {}

/// Captures from a CPAL input device (`None` = system default).
#[derive(Debug, Clone, Default)]
pub struct CpalCapture {
    device_index: Option<usize>,
    dropped_chunks: Arc<AtomicU32>,
}

impl CpalCapture {
    pub fn new(device_index: Option<usize>) -> Self {
        Self {
            device_index,
            dropped_chunks: Arc::new(AtomicU32::new(0)),
        }
    }

    /// Chunks lost because the recorder had already gone away.
    pub fn dropped_chunks(&self) -> u32 {
        self.dropped_chunks.load(Ordering::Relaxed)
    }

    pub fn list_input_devices() -> Vec<InputDeviceInfo> {
        let host = cpal::default_host();
        let mut devices = Vec::new();

        if let Ok(input_devices) = host.input_devices() {
            for (index, device) in input_devices.enumerate() {
                let name = device.name().unwrap_or_else(|_| "Unknown".to_string());
                let Ok(config) = device.default_input_config() else {
                    continue;
                };
                devices.push(InputDeviceInfo {
                    index,
                    name,
                    channels: config.channels(),
                    sample_rate: config.sample_rate().0,
                });
            }
        }

        devices
    }

    fn device(&self) -> Result<cpal::Device> {
        let host = cpal::default_host();
        match self.device_index {
            Some(i) => host.input_devices()?.nth(i).ok_or_else(|| {
                Error::PermissionDenied(format!("input device {i} not found"))
            }),
            None => host
                .default_input_device()
                .ok_or_else(|| Error::PermissionDenied("no input device available".into())),
        }
    }
}

impl CaptureBackend for CpalCapture {
    fn open(&self, sink: Sender<CaptureChunk>) -> Result<Box<dyn CaptureStream>> {
        let device = self.device()?;
        let config = device.default_input_config()?;
        let format = CaptureFormat {
            sample_rate: config.sample_rate().0,
            channels: config.channels(),
        };
        let dropped = Arc::clone(&self.dropped_chunks);

        let stream = match config.sample_format() {
            cpal::SampleFormat::F32 => build_stream::<f32>(&device, &config.into(), sink, dropped),
            cpal::SampleFormat::I16 => build_stream::<i16>(&device, &config.into(), sink, dropped),
            cpal::SampleFormat::U16 => build_stream::<u16>(&device, &config.into(), sink, dropped),
            format => {
                return Err(Error::Capture(format!(
                    "Unsupported sample format: {format:?}"
                )));
            }
        };
        let stream = stream.map_err(|e| match e {
            Error::BuildStreamError(cpal::BuildStreamError::DeviceNotAvailable) => {
                Error::PermissionDenied("input device not available".into())
            }
            other => other,
        })?;
        stream.play()?;

        tracing::debug!(
            sample_rate = format.sample_rate,
            channels = format.channels,
            "audio input opened"
        );

        Ok(Box::new(CpalCaptureStream {
            format,
            _stream: StreamHandle(stream),
        }))
    }
}

struct CpalCaptureStream {
    format: CaptureFormat,
    _stream: StreamHandle,
}

impl CaptureStream for CpalCaptureStream {
    fn format(&self) -> CaptureFormat {
        self.format
    }
}

impl Drop for CpalCaptureStream {
    fn drop(&mut self) {
        tracing::debug!("audio input released");
    }
}

fn build_stream<T>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    sink: Sender<CaptureChunk>,
    dropped: Arc<AtomicU32>,
) -> Result<cpal::Stream>
where
    T: cpal::SizedSample,
    f32: cpal::FromSample<T>,
{
    let stream = device.build_input_stream(
        config,
        move |data: &[T], _: &cpal::InputCallbackInfo| {
            let chunk: CaptureChunk = data
                .iter()
                .map(|s| cpal::Sample::to_sample::<f32>(*s))
                .collect();
            if sink.try_send(chunk).is_err() {
                dropped.fetch_add(1, Ordering::Relaxed);
            }
        },
        |err| tracing::warn!("input stream error: {err}"),
        None,
    )?;

    Ok(stream)
}
