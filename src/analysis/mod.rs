// Parameter derivation - Audio samples to haptic intensity/sharpness
//
// Two strategies coexist: whole-buffer mean amplitude for live capture, and a
// thresholded pick for page-driven playback. Both are pure and allocation-free
// so they can run inside the render callback.

pub mod strategies;

use serde::{Deserialize, Serialize};

pub use strategies::{page_pick, page_pick_value, whole_buffer, whole_buffer_from};

/// Intensity and sharpness for one haptic update, both in [0, 1]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct HapticParameters {
    pub intensity: f32,
    pub sharpness: f32,
}

impl HapticParameters {
    /// Clamp both values into [0, 1]
    pub fn new(intensity: f32, sharpness: f32) -> Self {
        Self {
            intensity: clamp_unit(intensity),
            sharpness: clamp_unit(sharpness),
        }
    }

    /// Sharpness follows intensity at half strength
    pub fn from_intensity(intensity: f32) -> Self {
        Self::new(intensity, intensity / 2.0)
    }

    pub fn silent() -> Self {
        Self::default()
    }
}

#[inline]
fn clamp_unit(value: f32) -> f32 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

/// Which derivation to apply to a block of samples
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DerivationStrategy {
    /// Mean absolute amplitude over the whole block
    WholeBuffer,
    /// Thresholded pick of a non-negative sample from the page
    #[default]
    PagePick,
}

impl DerivationStrategy {
    #[inline]
    pub fn derive(self, samples: &[f32]) -> HapticParameters {
        match self {
            DerivationStrategy::WholeBuffer => whole_buffer(samples),
            DerivationStrategy::PagePick => page_pick(samples),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parameters_are_clamped() {
        let p = HapticParameters::new(1.7, -0.2);
        assert_eq!(p.intensity, 1.0);
        assert_eq!(p.sharpness, 0.0);

        let p = HapticParameters::new(f32::NAN, 0.5);
        assert_eq!(p.intensity, 0.0);
        assert_eq!(p.sharpness, 0.5);
    }

    #[test]
    fn test_strategy_dispatch() {
        let samples = [1.0, -1.0, 1.0, -1.0];
        assert_eq!(
            DerivationStrategy::WholeBuffer.derive(&samples),
            HapticParameters::new(1.0, 0.5)
        );
        // Two non-negative samples: the last one is picked
        assert_eq!(
            DerivationStrategy::PagePick.derive(&samples),
            HapticParameters::new(1.0, 0.5)
        );
    }

    #[test]
    fn test_strategy_serde_names() {
        let json = serde_json::to_string(&DerivationStrategy::WholeBuffer).unwrap();
        assert_eq!(json, "\"whole_buffer\"");
        let parsed: DerivationStrategy = serde_json::from_str("\"page_pick\"").unwrap();
        assert_eq!(parsed, DerivationStrategy::PagePick);
    }
}
