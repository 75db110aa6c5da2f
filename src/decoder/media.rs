// Compressed/container media decoding through symphonia

use std::fs::File;
use std::path::Path;

use symphonia::core::audio::{SampleBuffer as PcmBuffer, SignalSpec};
use symphonia::core::codecs::{CODEC_TYPE_NULL, DecoderOptions};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use super::{DecodeError, downmix_into};
use crate::audio::sample_buffer::SampleBuffer;

/// Decode the first audio track of `path` to mono f32
pub fn decode_media(path: &Path) -> Result<SampleBuffer, DecodeError> {
    let file = File::open(path)?;
    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    if let Some(extension) = path.extension().and_then(|s| s.to_str()) {
        hint.with_extension(extension);
    }

    let probed = symphonia::default::get_probe()
        .format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|e| match e {
            SymphoniaError::Unsupported(what) => DecodeError::Unsupported(what.to_string()),
            other => DecodeError::Codec(other),
        })?;
    let mut format = probed.format;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or(DecodeError::NoAudioTrack)?;
    let track_id = track.id;
    let sample_rate = track
        .codec_params
        .sample_rate
        .ok_or(DecodeError::MissingSampleRate)?;

    let mut decoder =
        symphonia::default::get_codecs().make(&track.codec_params, &DecoderOptions::default())?;

    let mut samples = Vec::new();
    let mut pcm: Option<PcmBuffer<f32>> = None;

    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                break;
            }
            Err(SymphoniaError::ResetRequired) => {
                // Chained streams: only the first one is decoded
                log::warn!("Track list changed mid-stream, stopping decode");
                break;
            }
            Err(e) => return Err(e.into()),
        };

        if packet.track_id() != track_id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(decoded) => decoded,
            Err(SymphoniaError::DecodeError(msg)) => {
                return Err(DecodeError::Malformed(msg.to_string()));
            }
            Err(e) => return Err(e.into()),
        };

        let spec: SignalSpec = *decoded.spec();
        let channels = spec.channels.count();
        if channels == 0 {
            return Err(DecodeError::Malformed("packet without channels".to_string()));
        }

        let frames = decoded.capacity();
        if pcm
            .as_ref()
            .is_some_and(|buffer| buffer.capacity() < frames * channels)
        {
            pcm = None;
        }
        let buffer = pcm.get_or_insert_with(|| PcmBuffer::<f32>::new(frames as u64, spec));
        buffer.copy_interleaved_ref(decoded);
        downmix_into(buffer.samples(), channels, &mut samples);
    }

    log::debug!(
        "Decoded {}: {} frames @ {} Hz",
        path.display(),
        samples.len(),
        sample_rate
    );
    SampleBuffer::new(samples, sample_rate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_unrecognized_container() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("noise.bin");
        std::fs::write(&path, vec![0x42u8; 4096]).unwrap();

        let err = decode_media(&path).unwrap_err();
        assert!(matches!(
            err,
            DecodeError::Unsupported(_) | DecodeError::Codec(_)
        ));
    }

    #[test]
    fn test_wav_through_probe() {
        // symphonia also reads WAV, which gives a second path to cross-check hound
        let dir = tempdir().unwrap();
        let path = dir.path().join("probe.wav");
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: 16000,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(&path, spec).unwrap();
        for i in 0..1600 {
            writer.write_sample(if i % 2 == 0 { 8192i16 } else { -8192 }).unwrap();
        }
        writer.finalize().unwrap();

        let buffer = decode_media(&path).unwrap();
        assert_eq!(buffer.sample_rate(), 16000);
        assert_eq!(buffer.len(), 1600);
        assert!((buffer.as_slice()[0] - 0.25).abs() < 1e-3);
    }
}
