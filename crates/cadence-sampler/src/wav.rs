//! In-memory WAV encoding of captured audio.

use crate::backend::CaptureFormat;
use crate::Result;
use hound::{SampleFormat, WavSpec, WavWriter};

/// Mime label of recorded clips.
pub const WAV_MIME: &str = "audio/wav";

#[inline]
fn float_to_i16(sample: f32) -> i16 {
    (sample.clamp(-1.0, 1.0) * i16::MAX as f32) as i16
}

/// Encode interleaved `samples` as a 16-bit PCM WAV file.
pub fn encode_wav(samples: &[f32], format: CaptureFormat) -> Result<Vec<u8>> {
    let spec = WavSpec {
        channels: format.channels.max(1),
        sample_rate: format.sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };

    let mut buffer = Vec::new();
    {
        let cursor = std::io::Cursor::new(&mut buffer);
        let mut writer = WavWriter::new(cursor, spec)?;
        for &sample in samples {
            writer.write_sample(float_to_i16(sample))?;
        }
        writer.finalize()?;
    }

    Ok(buffer)
}
