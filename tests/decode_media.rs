//! Media decoding integration tests
//!
//! Writes fixture files with hound into a temp dir and decodes them through
//! MediaFile, alone and through a pipeline.

use std::path::{Path, PathBuf};

use audio_haptics::{
    DecodeError, HapticPipeline, ManualOutput, MediaFile, NullActuator, PipelineConfig,
    PipelineError, PipelineState, SampleSource, SignalProvider,
};
use tempfile::{TempDir, tempdir};

fn write_int_wav(dir: &Path, name: &str, channels: u16, frames: &[Vec<i16>]) -> PathBuf {
    let path = dir.join(name);
    let spec = hound::WavSpec {
        channels,
        sample_rate: 44100,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(&path, spec).unwrap();
    for frame in frames {
        for sample in frame {
            writer.write_sample(*sample).unwrap();
        }
    }
    writer.finalize().unwrap();
    path
}

fn write_float_wav(dir: &Path, name: &str, samples: &[f32]) -> PathBuf {
    let path = dir.join(name);
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: 48000,
        bits_per_sample: 32,
        sample_format: hound::SampleFormat::Float,
    };
    let mut writer = hound::WavWriter::create(&path, spec).unwrap();
    for sample in samples {
        writer.write_sample(*sample).unwrap();
    }
    writer.finalize().unwrap();
    path
}

fn fixture_dir() -> TempDir {
    tempdir().unwrap()
}

#[test]
fn test_stereo_wav_is_downmixed() {
    let dir = fixture_dir();
    let frames = vec![vec![16384, 0], vec![-16384, -16384], vec![0, 16384]];
    let path = write_int_wav(dir.path(), "stereo.wav", 2, &frames);

    let buffer = MediaFile::new(&path).decode().unwrap();
    assert_eq!(buffer.sample_rate(), 44100);
    assert_eq!(buffer.len(), 3);

    let expected = [0.25, -0.5, 0.25];
    for (got, want) in buffer.as_slice().iter().zip(expected) {
        assert!((got - want).abs() < 1e-4, "got {} want {}", got, want);
    }
}

#[test]
fn test_float_wav_keeps_values() {
    let dir = fixture_dir();
    let path = write_float_wav(dir.path(), "float.wav", &[0.5, -0.25, 1.0]);

    let buffer = MediaFile::new(&path).decode().unwrap();
    assert_eq!(buffer.as_slice(), &[0.5, -0.25, 1.0]);
    assert_eq!(buffer.sample_rate(), 48000);
}

#[test]
fn test_nan_in_float_wav_is_rejected() {
    let dir = fixture_dir();
    let path = write_float_wav(dir.path(), "nan.wav", &[0.1, f32::NAN, 0.2]);

    assert!(matches!(
        MediaFile::new(&path).decode(),
        Err(DecodeError::NonFinite { index: 1 })
    ));
}

#[test]
fn test_missing_file() {
    let dir = fixture_dir();
    let wav = MediaFile::new(dir.path().join("missing.wav"));
    let mp3 = MediaFile::new(dir.path().join("missing.mp3"));

    assert!(wav.decode().is_err());
    assert!(matches!(mp3.decode(), Err(DecodeError::Io(_))));
}

#[test]
fn test_truncated_wav_is_an_error() {
    let dir = fixture_dir();
    let frames: Vec<Vec<i16>> = (0..1000).map(|i| vec![i as i16]).collect();
    let path = write_int_wav(dir.path(), "truncated.wav", 1, &frames);

    let bytes = std::fs::read(&path).unwrap();
    std::fs::write(&path, &bytes[..bytes.len() - 501]).unwrap();

    assert!(MediaFile::new(&path).decode().is_err());
}

#[test]
fn test_pipeline_loads_wav_pages() {
    let dir = fixture_dir();
    let frames: Vec<Vec<i16>> = (0..3000).map(|_| vec![8192]).collect();
    let path = write_int_wav(dir.path(), "pages.wav", 1, &frames);

    let mut pipeline = HapticPipeline::new(
        PipelineConfig::default(),
        NullActuator,
        ManualOutput::new(),
    );
    pipeline.load(&MediaFile::new(&path)).unwrap();

    assert_eq!(pipeline.state(), PipelineState::Loaded);
    assert!(!pipeline.haptics_enabled());
    assert_eq!(pipeline.get_signal().len(), 1024);
    assert_eq!(pipeline.get_signal().len(), 1024);
    assert_eq!(pipeline.get_signal().len(), 952);
    assert_eq!(pipeline.get_signal().len(), 1024);
}

#[test]
fn test_pipeline_rejects_garbage_file() {
    let dir = fixture_dir();
    let path = dir.path().join("garbage.ogg");
    std::fs::write(&path, vec![0x13u8; 2048]).unwrap();

    let mut pipeline = HapticPipeline::new(
        PipelineConfig::default(),
        NullActuator,
        ManualOutput::new(),
    );
    assert!(matches!(
        pipeline.load(&MediaFile::new(&path)),
        Err(PipelineError::Decode(_))
    ));
    assert_eq!(pipeline.state(), PipelineState::Uninitialized);
}
