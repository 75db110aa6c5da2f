// Decoder - Sample sources feeding the page buffer
//
// A source is decoded fully into memory as mono f32. WAV files go through
// hound, everything else through symphonia's probe. Any failure is surfaced
// to the caller; nothing is ever replaced by an empty or zero-filled buffer.

pub mod media;
pub mod wav;

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::audio::sample_buffer::SampleBuffer;

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unsupported audio format: {0}")]
    Unsupported(String),

    #[error("No decodable audio track found")]
    NoAudioTrack,

    #[error("Audio track does not declare a sample rate")]
    MissingSampleRate,

    #[error("Malformed audio data: {0}")]
    Malformed(String),

    #[error("Non-finite sample at index {index}")]
    NonFinite { index: usize },

    #[error("WAV error: {0}")]
    Wav(#[from] hound::Error),

    #[error("Codec error: {0}")]
    Codec(#[from] symphonia::core::errors::Error),
}

/// Anything that can produce a complete mono sample buffer
pub trait SampleSource {
    fn decode(&self) -> Result<SampleBuffer, DecodeError>;

    /// Short human-readable description, used in logs
    fn describe(&self) -> String;
}

/// Local media file, decoded according to its extension
#[derive(Debug, Clone)]
pub struct MediaFile {
    path: PathBuf,
}

impl MediaFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SampleSource for MediaFile {
    fn decode(&self) -> Result<SampleBuffer, DecodeError> {
        let extension = self
            .path
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or("")
            .to_lowercase();

        log::debug!("Decoding audio file: {}", self.path.display());
        match extension.as_str() {
            "wav" | "wave" => wav::decode_wav(&self.path),
            _ => media::decode_media(&self.path),
        }
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// PCM already in memory (for hosts that run their own decoder)
#[derive(Debug, Clone)]
pub struct PcmSource {
    samples: Vec<f32>,
    sample_rate: u32,
}

impl PcmSource {
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate,
        }
    }
}

impl SampleSource for PcmSource {
    fn decode(&self) -> Result<SampleBuffer, DecodeError> {
        SampleBuffer::new(self.samples.clone(), self.sample_rate)
    }

    fn describe(&self) -> String {
        format!("{} in-memory samples @ {} Hz", self.samples.len(), self.sample_rate)
    }
}

/// Average interleaved frames down to mono, appending to `out`
pub(crate) fn downmix_into(interleaved: &[f32], channels: usize, out: &mut Vec<f32>) {
    if channels <= 1 {
        out.extend_from_slice(interleaved);
        return;
    }

    let scale = 1.0 / channels as f32;
    out.extend(
        interleaved
            .chunks_exact(channels)
            .map(|frame| frame.iter().sum::<f32>() * scale),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_downmix_stereo() {
        let mut out = Vec::new();
        downmix_into(&[1.0, 0.0, 0.5, 0.5, -1.0, 1.0], 2, &mut out);
        assert_eq!(out, vec![0.5, 0.5, 0.0]);
    }

    #[test]
    fn test_downmix_mono_passthrough() {
        let mut out = vec![0.1];
        downmix_into(&[0.2, 0.3], 1, &mut out);
        assert_eq!(out, vec![0.1, 0.2, 0.3]);
    }

    #[test]
    fn test_pcm_source_validates() {
        let ok = PcmSource::new(vec![0.0, 0.5], 44100).decode().unwrap();
        assert_eq!(ok.len(), 2);
        assert_eq!(ok.sample_rate(), 44100);

        let err = PcmSource::new(vec![0.0, f32::NAN], 44100).decode().unwrap_err();
        assert!(matches!(err, DecodeError::NonFinite { index: 1 }));
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let err = MediaFile::new("/definitely/not/here.mp3").decode().unwrap_err();
        assert!(matches!(err, DecodeError::Io(_)));
    }
}
