// Parameter slot - Latest-value-wins mailbox between audio and dispatcher
//
// Intensity and sharpness are stored as f32 bits packed in one AtomicU64 so a
// reader never sees a torn pair. A sequence counter tells the reader whether
// anything newer was published. Intermediate values may be skipped, but a
// value older than one already taken is never returned.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::analysis::HapticParameters;

pub struct ParameterSlot {
    packed: AtomicU64,
    sequence: AtomicU64,
}

#[inline]
fn pack(parameters: HapticParameters) -> u64 {
    ((parameters.intensity.to_bits() as u64) << 32) | parameters.sharpness.to_bits() as u64
}

#[inline]
fn unpack(bits: u64) -> HapticParameters {
    HapticParameters {
        intensity: f32::from_bits((bits >> 32) as u32),
        sharpness: f32::from_bits(bits as u32),
    }
}

impl ParameterSlot {
    pub fn new() -> Self {
        Self {
            packed: AtomicU64::new(pack(HapticParameters::silent())),
            sequence: AtomicU64::new(0),
        }
    }

    /// Publish a new value (real-time safe: two atomic stores)
    #[inline]
    pub fn publish(&self, parameters: HapticParameters) {
        self.packed.store(pack(parameters), Ordering::Release);
        self.sequence.fetch_add(1, Ordering::Release);
    }

    /// Most recent value, regardless of whether it was already taken
    pub fn latest(&self) -> HapticParameters {
        unpack(self.packed.load(Ordering::Acquire))
    }

    /// Number of values published so far
    pub fn sequence(&self) -> u64 {
        self.sequence.load(Ordering::Acquire)
    }

    /// Take the latest value if something was published since `seen`
    ///
    /// `seen` is updated to the sequence observed.
    pub fn take_newer(&self, seen: &mut u64) -> Option<HapticParameters> {
        let sequence = self.sequence.load(Ordering::Acquire);
        if sequence == *seen {
            return None;
        }
        *seen = sequence;
        Some(self.latest())
    }
}

impl Default for ParameterSlot {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_nothing_published() {
        let slot = ParameterSlot::new();
        let mut seen = 0;
        assert_eq!(slot.take_newer(&mut seen), None);
    }

    #[test]
    fn test_latest_value_wins() {
        let slot = ParameterSlot::new();
        let mut seen = 0;

        slot.publish(HapticParameters::from_intensity(0.2));
        slot.publish(HapticParameters::from_intensity(0.4));
        slot.publish(HapticParameters::from_intensity(0.8));

        let taken = slot.take_newer(&mut seen).unwrap();
        assert_eq!(taken, HapticParameters::from_intensity(0.8));
        assert_eq!(seen, 3);
        assert_eq!(slot.take_newer(&mut seen), None);
    }

    #[test]
    fn test_pair_is_not_torn() {
        let p = HapticParameters::new(0.25, 0.75);
        assert_eq!(unpack(pack(p)), p);
    }

    #[test]
    fn test_reader_never_goes_backwards() {
        let slot = Arc::new(ParameterSlot::new());
        let writer_slot = Arc::clone(&slot);

        // Strictly increasing intensities: the reader must observe a non-decreasing sequence
        let writer = thread::spawn(move || {
            for i in 1..=10_000u32 {
                writer_slot.publish(HapticParameters::new(i as f32 / 10_000.0, 0.0));
            }
        });

        let mut seen = 0;
        let mut last = 0.0f32;
        while !writer.is_finished() || slot.sequence() != seen {
            if let Some(p) = slot.take_newer(&mut seen) {
                assert!(p.intensity >= last, "{} went back to {}", last, p.intensity);
                last = p.intensity;
            }
        }
        writer.join().unwrap();
        assert_eq!(slot.latest().intensity, 1.0);
    }
}
