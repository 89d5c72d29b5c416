//! CPAL audio output running the master bus.

use crate::bus::{MasterBus, SynthHandle};
use crate::impulse::ImpulseResponse;
use crate::{Error, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};

/// Wrapper to hold `cpal::Stream` in a `Send` context.
///
/// # Safety
/// `cpal::Stream` is `!Send` due to platform internals. The stream is only
/// created, kept and dropped by its owning [`AudioOutput`], which the engine
/// keeps behind a `Mutex`.
struct StreamHandle(#[allow(dead_code)] cpal::Stream);

unsafe impl Send for StreamHandle {}

/// A playing output stream. Dropping it stops audio.
pub struct AudioOutput {
    sample_rate: f64,
    channels: usize,
    device_name: String,
    _stream: StreamHandle,
}

impl AudioOutput {
    /// Open the output device (`None` = system default) and start the bus.
    ///
    /// The reverb impulse response is generated here, once per output.
    pub fn open(device_index: Option<usize>) -> Result<(Self, SynthHandle)> {
        let device = get_device(device_index)?;
        let config = device.default_output_config()?;
        let sample_rate = config.sample_rate().0 as f64;
        let channels = config.channels() as usize;
        let device_name = device.name()?;

        let (bus, handle) = MasterBus::new(sample_rate, &ImpulseResponse::generate(sample_rate))?;

        let stream = match config.sample_format() {
            cpal::SampleFormat::F32 => build_stream::<f32>(&device, &config.into(), bus)?,
            cpal::SampleFormat::I16 => build_stream::<i16>(&device, &config.into(), bus)?,
            cpal::SampleFormat::U16 => build_stream::<u16>(&device, &config.into(), bus)?,
            format => {
                return Err(Error::InvalidConfig(format!(
                    "Unsupported sample format: {format:?}"
                )));
            }
        };
        stream.play()?;

        tracing::debug!(
            device = %device_name,
            sample_rate,
            channels,
            "audio output started"
        );

        Ok((
            Self {
                sample_rate,
                channels,
                device_name,
                _stream: StreamHandle(stream),
            },
            handle,
        ))
    }

    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    pub fn device_name(&self) -> &str {
        &self.device_name
    }

    pub fn list_devices() -> Result<Vec<String>> {
        cpal::default_host()
            .output_devices()?
            .enumerate()
            .map(|(i, d)| Ok(format!("{i}: {}", d.name()?)))
            .collect()
    }
}

fn get_device(index: Option<usize>) -> Result<cpal::Device> {
    let host = cpal::default_host();

    match index {
        Some(i) => {
            let devices: Vec<_> = host.output_devices()?.collect();
            let count = devices.len();
            devices.into_iter().nth(i).ok_or_else(|| {
                Error::InvalidDevice(format!("Device index {i} out of range ({count} available)"))
            })
        }
        None => host
            .default_output_device()
            .ok_or_else(|| Error::InvalidDevice("No output device available".into())),
    }
}

fn build_stream<T>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    mut bus: MasterBus,
) -> Result<cpal::Stream>
where
    T: cpal::SizedSample + cpal::FromSample<f32>,
{
    let channels = config.channels as usize;

    // Grows on the first callback, then stays put.
    let mut stereo = Vec::<f32>::new();

    let stream = device.build_output_stream(
        config,
        move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
            let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                let frames = data.len() / channels;
                let needed = frames * 2;
                if stereo.len() < needed {
                    stereo.resize(needed, 0.0);
                }
                bus.render(&mut stereo[..needed]);
                write_output(data, channels, &stereo[..needed]);
            }));

            if result.is_err() {
                output_silence(data);
            }
        },
        |err| tracing::warn!("output stream error: {err}"),
        None,
    )?;

    Ok(stream)
}

/// Convert stereo f32 to the device format. Mono devices get the left
/// channel; channels past the second are silent.
#[inline]
fn write_output<T: cpal::SizedSample + cpal::FromSample<f32>>(
    data: &mut [T],
    channels: usize,
    stereo: &[f32],
) {
    for (i, sample) in data.iter_mut().enumerate() {
        let frame = i / channels;
        let ch = i % channels;
        let value = if ch < 2 { stereo[frame * 2 + ch] } else { 0.0 };
        *sample = T::from_sample(value);
    }
}

/// Output silence (panic recovery).
#[inline]
fn output_silence<T: cpal::SizedSample + cpal::FromSample<f32>>(data: &mut [T]) {
    for sample in data.iter_mut() {
        *sample = T::from_sample(0.0);
    }
}
