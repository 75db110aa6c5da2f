// WAV decoding through hound

use std::path::Path;

use hound::{SampleFormat, WavReader};

use super::{DecodeError, downmix_into};
use crate::audio::sample_buffer::SampleBuffer;

pub fn decode_wav(path: &Path) -> Result<SampleBuffer, DecodeError> {
    let reader = WavReader::open(path)?;
    let spec = reader.spec();
    let channels = spec.channels as usize;
    if channels == 0 {
        return Err(DecodeError::Malformed("WAV header declares zero channels".to_string()));
    }

    // Read errors abort the decode instead of being skipped
    let interleaved: Vec<f32> = match spec.sample_format {
        SampleFormat::Float => reader.into_samples::<f32>().collect::<Result<_, _>>()?,
        SampleFormat::Int => {
            if spec.bits_per_sample == 0 || spec.bits_per_sample > 32 {
                return Err(DecodeError::Unsupported(format!(
                    "{}-bit integer WAV",
                    spec.bits_per_sample
                )));
            }
            let scale = 1.0 / (1u64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .into_samples::<i32>()
                .map(|s| s.map(|s| s as f32 * scale))
                .collect::<Result<_, _>>()?
        }
    };

    let mut mono = Vec::with_capacity(interleaved.len() / channels);
    downmix_into(&interleaved, channels, &mut mono);

    log::debug!(
        "Decoded WAV: {} frames, {} channel(s), {} Hz",
        mono.len(),
        channels,
        spec.sample_rate
    );
    SampleBuffer::new(mono, spec.sample_rate)
}
