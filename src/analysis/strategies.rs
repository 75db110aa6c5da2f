// Derivation strategies
//
// No allocation here: the page pick streams through a filter instead of
// collecting the non-negative samples first.

use super::HapticParameters;

/// Ordinal position (within the non-negative samples) that the page pick reads
pub const PAGE_PICK_POSITION: usize = 50;

/// Mean absolute amplitude over the whole buffer
///
/// Intensity is the mean of |x|, sharpness is half of it. An empty buffer
/// yields silence rather than a division by zero.
#[inline]
pub fn whole_buffer(samples: &[f32]) -> HapticParameters {
    whole_buffer_from(samples.iter().copied())
}

/// Same as [`whole_buffer`], over any sample iterator
///
/// Lets the capture callback convert integer formats on the fly.
#[inline]
pub fn whole_buffer_from<I>(samples: I) -> HapticParameters
where
    I: IntoIterator<Item = f32>,
{
    let mut sum = 0.0f32;
    let mut count = 0usize;
    for sample in samples {
        sum += sample.abs();
        count += 1;
    }

    if count == 0 {
        return HapticParameters::silent();
    }

    HapticParameters::from_intensity(sum / count as f32)
}

/// Raw value selected by the page pick
///
/// Keeps only non-negative samples and reads position
/// `min(PAGE_PICK_POSITION, count - 1)` of that filtered sequence, i.e. the
/// 51st non-negative sample or the last one if there are fewer. Returns 0.0
/// when the page has no non-negative sample.
#[inline]
pub fn page_pick_value(page: &[f32]) -> f32 {
    page.iter()
        .copied()
        .filter(|s| *s >= 0.0)
        .take(PAGE_PICK_POSITION + 1)
        .last()
        .unwrap_or(0.0)
}

/// Page pick mapped to haptic parameters (sharpness = intensity / 2)
#[inline]
pub fn page_pick(page: &[f32]) -> HapticParameters {
    HapticParameters::from_intensity(page_pick_value(page))
}
