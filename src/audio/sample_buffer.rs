// Sample buffer - Immutable decoded PCM owned by one pipeline
//
// A buffer is produced once per load and replaced wholesale on the next one.
// Construction rejects NaN/Inf so downstream code never has to check.

use crate::decoder::DecodeError;

/// Mono f32 samples in temporal order, plus the rate they were decoded at.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SampleBuffer {
    samples: Vec<f32>,
    sample_rate: u32,
}

impl SampleBuffer {
    /// Build a buffer, failing on the first non-finite sample
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Result<Self, DecodeError> {
        if let Some(index) = samples.iter().position(|s| !s.is_finite()) {
            return Err(DecodeError::NonFinite { index });
        }

        Ok(Self {
            samples,
            sample_rate,
        })
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Duration in seconds (0.0 when the rate is unknown)
    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f64 / self.sample_rate as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_nan() {
        let err = SampleBuffer::new(vec![0.0, 0.5, f32::NAN], 48000).unwrap_err();
        assert!(matches!(err, DecodeError::NonFinite { index: 2 }));
    }

    #[test]
    fn test_rejects_infinity() {
        let err = SampleBuffer::new(vec![f32::NEG_INFINITY], 48000).unwrap_err();
        assert!(matches!(err, DecodeError::NonFinite { index: 0 }));
    }

    #[test]
    fn test_duration() {
        let buffer = SampleBuffer::new(vec![0.0; 24000], 48000).unwrap();
        assert_eq!(buffer.len(), 24000);
        assert!((buffer.duration_secs() - 0.5).abs() < 1e-9);
        assert_eq!(SampleBuffer::empty().duration_secs(), 0.0);
    }
}
